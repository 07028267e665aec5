use anyhow::{anyhow, Result};
use parley_assistants::ConversationClient;
use std::sync::Arc;

use crate::orchestrator::{ExchangeOrchestrator, DEFAULT_GREETING};
use crate::poll::PollSchedule;

/// Builder for constructing an ExchangeOrchestrator
pub struct ExchangeOrchestratorBuilder {
    client: Option<Arc<dyn ConversationClient>>,
    assistant_id: Option<String>,
    greeting: Option<String>,
    schedule: PollSchedule,
}

impl ExchangeOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            assistant_id: None,
            greeting: None,
            schedule: PollSchedule::default(),
        }
    }

    /// Set the remote conversation client
    pub fn client(mut self, client: Arc<dyn ConversationClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the assistant every run is started with
    pub fn assistant_id(mut self, assistant_id: impl Into<String>) -> Self {
        self.assistant_id = Some(assistant_id.into());
        self
    }

    /// Override the assistant greeting that opens new threads
    pub fn greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn poll_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn build(self) -> Result<ExchangeOrchestrator> {
        let client = self
            .client
            .ok_or_else(|| anyhow!("Conversation client is required"))?;
        let assistant_id = self
            .assistant_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("Assistant ID is required"))?;
        let greeting = self
            .greeting
            .unwrap_or_else(|| DEFAULT_GREETING.to_string());

        Ok(ExchangeOrchestrator::new_with_config(
            client,
            assistant_id,
            greeting,
            self.schedule,
        ))
    }
}

impl Default for ExchangeOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
