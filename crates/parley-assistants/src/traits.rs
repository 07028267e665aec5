use crate::error::Result;
use crate::types::{NewMessage, Run, SortOrder, ThreadDeleted, ThreadMessage};
use async_trait::async_trait;

/// Capability interface for a remote assistant service that keeps
/// conversations as threads and answers through asynchronous runs.
///
/// Every method may fail with [`AssistantsError::NotFound`] when the
/// referenced thread (or assistant) does not exist, or with a generic
/// transport/service error otherwise.
///
/// [`AssistantsError::NotFound`]: crate::AssistantsError::NotFound
#[async_trait]
pub trait ConversationClient: Send + Sync {
    /// Create a thread seeded with `messages` and start a run on it
    async fn create_thread_and_run(
        &self,
        messages: Vec<NewMessage>,
        assistant_id: &str,
    ) -> Result<Run>;

    /// Append a message to an existing thread
    async fn append_message(&self, thread_id: &str, message: NewMessage) -> Result<ThreadMessage>;

    /// Start a new run on an existing thread
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run>;

    /// Current status snapshot of a run
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// All messages of a thread in the given creation order
    async fn list_messages(&self, thread_id: &str, order: SortOrder) -> Result<Vec<ThreadMessage>>;

    async fn delete_thread(&self, thread_id: &str) -> Result<ThreadDeleted>;
}
