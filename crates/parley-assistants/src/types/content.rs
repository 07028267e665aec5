use serde::Deserialize;

/// One content item of a thread message.
///
/// Only text and refusal items carry something we can show to a user. Every
/// other variant the API may return (`image_file`, `image_url`, ...) is kept
/// as `Unsupported` with its wire type name so callers can decide whether to
/// skip it or report it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawContent")]
pub enum MessageContent {
    Text(String),
    Refusal(String),
    Unsupported(String),
}

impl MessageContent {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn refusal(value: impl Into<String>) -> Self {
        Self::Refusal(value.into())
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::Unsupported(kind.into())
    }

    /// Wire type name (`text`, `refusal`, or whatever the API sent)
    pub fn kind(&self) -> &str {
        match self {
            MessageContent::Text(_) => "text",
            MessageContent::Refusal(_) => "refusal",
            MessageContent::Unsupported(kind) => kind,
        }
    }

    /// Readable text of a text or refusal item
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(value) | MessageContent::Refusal(value) => Some(value),
            MessageContent::Unsupported(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct RawContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Deserialize)]
struct RawText {
    value: String,
}

impl From<RawContent> for MessageContent {
    fn from(raw: RawContent) -> Self {
        match (raw.kind.as_str(), raw.text, raw.refusal) {
            ("text", Some(text), _) => MessageContent::Text(text.value),
            ("refusal", _, Some(refusal)) => MessageContent::Refusal(refusal),
            _ => MessageContent::Unsupported(raw.kind),
        }
    }
}
