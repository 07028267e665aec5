use parley_assistants::{Role, ThreadMessage};

use crate::error::{ExchangeError, Result};
use crate::exchange::SimpleMessage;

/// Text of the newest message matching `role` (any role when `None`).
///
/// `messages` must be newest first. The first content item of the chosen
/// message decides: text and refusal are returned as is, anything else is an
/// `UnsupportedContent` error. Messages without content are skipped.
pub fn latest_text(messages: &[ThreadMessage], role: Option<Role>) -> Result<String> {
    let candidates = messages
        .iter()
        .filter(|message| role.map_or(true, |wanted| message.role == wanted));

    for message in candidates {
        if let Some(content) = message.first_content() {
            return content
                .as_text()
                .map(str::to_string)
                .ok_or_else(|| ExchangeError::UnsupportedContent(content.kind().to_string()));
        }
    }

    Err(ExchangeError::NoMessageFound)
}

/// Reduce thread messages to role/text pairs, dropping any message whose
/// first content item is not text or refusal.
pub fn simplify(messages: Vec<ThreadMessage>) -> Vec<SimpleMessage> {
    messages
        .into_iter()
        .filter_map(|message| {
            let text = message.first_content()?.as_text()?.to_string();
            Some(SimpleMessage::new(message.role, text))
        })
        .collect()
}
