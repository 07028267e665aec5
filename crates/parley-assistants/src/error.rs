use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid {kind} id: {id:?}")]
    InvalidId { kind: &'static str, id: String },
}

impl AssistantsError {
    /// True when the remote service reported the resource as missing (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssistantsError::NotFound(_))
    }

    /// True when an id was refused locally, before any request was sent.
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, AssistantsError::InvalidId { .. })
    }
}

pub type Result<T> = std::result::Result<T, AssistantsError>;
