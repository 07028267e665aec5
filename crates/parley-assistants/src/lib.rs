pub mod error;
pub mod types;
pub mod traits;
pub mod openai;

pub use error::{AssistantsError, Result};
pub use traits::ConversationClient;
pub use openai::{OpenAIAssistantsClient, OpenAIAssistantsClientBuilder};
pub use types::{
    MessageContent, NewMessage, Role, Run, RunLastError, RunStatus, SortOrder, ThreadDeleted,
    ThreadMessage,
};
