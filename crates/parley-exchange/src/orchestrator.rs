use parley_assistants::{ConversationClient, NewMessage, Role, Run, SortOrder, ThreadMessage};
use std::sync::Arc;

use crate::builder::ExchangeOrchestratorBuilder;
use crate::error::{ExchangeError, Result};
use crate::exchange::{Exchange, SimpleMessage, ThreadResolution};
use crate::extract::{latest_text, simplify};
use crate::poll::{CompletionState, PollSchedule};

/// Assistant line every new thread is seeded with, ahead of the user's message
pub const DEFAULT_GREETING: &str = "Olá, bem vindo! Eu sou a Pri, sua assistente virtual especialista em privacidade e proteção de dados. Como posso ajudar você hoje?";

/// Turns user messages into conversation turns against a remote assistant.
///
/// Holds no conversation state: every call addresses the remote service by
/// thread id, so one orchestrator can be shared by all requests.
pub struct ExchangeOrchestrator {
    client: Arc<dyn ConversationClient>,
    assistant_id: String,
    greeting: String,
    schedule: PollSchedule,
}

impl ExchangeOrchestrator {
    pub fn new(client: Arc<dyn ConversationClient>, assistant_id: impl Into<String>) -> Self {
        Self::new_with_config(
            client,
            assistant_id.into(),
            DEFAULT_GREETING.to_string(),
            PollSchedule::default(),
        )
    }

    pub(crate) fn new_with_config(
        client: Arc<dyn ConversationClient>,
        assistant_id: String,
        greeting: String,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            client,
            assistant_id,
            greeting,
            schedule,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> ExchangeOrchestratorBuilder {
        ExchangeOrchestratorBuilder::new()
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn poll_schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    /// Send `message` to the assistant and wait for its reply.
    ///
    /// Without a thread id a new thread is opened. With one, the message is
    /// appended to that thread; if that fails for any reason the stale id is
    /// dropped and a new thread is opened instead, which the returned
    /// [`ThreadResolution::Recovered`] reports.
    pub async fn ask(&self, message: Option<&str>, thread_id: Option<&str>) -> Result<Exchange> {
        let message = validate_message(message)?;

        match thread_id {
            None => {
                let (thread_id, answer) = self.start_conversation(message).await?;
                Ok(Exchange::new(ThreadResolution::Created(thread_id), answer))
            }
            Some(thread_id) => self.continue_or_recover(thread_id, message).await,
        }
    }

    /// Transcript of a thread as role/text pairs
    pub async fn list_messages(&self, thread_id: &str, ascending: bool) -> Result<Vec<SimpleMessage>> {
        let messages = self
            .fetch_messages(thread_id, SortOrder::from_ascending(ascending))
            .await?;
        Ok(simplify(messages))
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let response = self
            .client
            .delete_thread(thread_id)
            .await
            .map_err(|e| not_found_as_thread(e, thread_id))?;

        if !response.deleted {
            tracing::error!(thread_id = %thread_id, "Remote service did not delete thread");
            return Err(ExchangeError::DeletionNotConfirmed(thread_id.to_string()));
        }

        tracing::info!(thread_id = %thread_id, "Thread deleted");
        Ok(())
    }

    /// Newest message text of a thread, optionally limited to one role
    pub async fn latest_message(&self, thread_id: &str, role: Option<Role>) -> Result<String> {
        let messages = self.fetch_messages(thread_id, SortOrder::Desc).await?;
        latest_text(&messages, role)
    }

    async fn start_conversation(&self, message: &str) -> Result<(String, String)> {
        let seed = vec![
            NewMessage::assistant(self.greeting.as_str()),
            NewMessage::user(message),
        ];

        let run = self
            .client
            .create_thread_and_run(seed, &self.assistant_id)
            .await?;

        tracing::info!(thread_id = %run.thread_id, run_id = %run.id, "Started new conversation");

        let answer = self.wait_for_answer(&run.thread_id, &run).await?;
        Ok((run.thread_id, answer))
    }

    async fn continue_or_recover(&self, thread_id: &str, message: &str) -> Result<Exchange> {
        match self.continue_conversation(thread_id, message).await {
            Ok(answer) => Ok(Exchange::new(
                ThreadResolution::Continued(thread_id.to_string()),
                answer,
            )),
            Err(cause) => {
                tracing::warn!(
                    stale_thread_id = %thread_id,
                    error = %cause,
                    "Could not continue conversation, starting a new thread"
                );

                let (new_thread_id, answer) = self.start_conversation(message).await?;
                Ok(Exchange::new(
                    ThreadResolution::Recovered {
                        thread_id: new_thread_id,
                        stale_thread_id: thread_id.to_string(),
                    },
                    answer,
                ))
            }
        }
    }

    async fn continue_conversation(&self, thread_id: &str, message: &str) -> Result<String> {
        self.client
            .append_message(thread_id, NewMessage::user(message))
            .await?;

        let run = self.client.start_run(thread_id, &self.assistant_id).await?;
        tracing::debug!(thread_id = %thread_id, run_id = %run.id, "Continuing conversation");

        self.wait_for_answer(thread_id, &run).await
    }

    /// Wait for `run` to finish and return the assistant's reply.
    ///
    /// A run that already completed is answered without polling. Otherwise the
    /// run is re-fetched right away and after each backoff sleep, at most
    /// `max_attempts` sleeps in total.
    async fn wait_for_answer(&self, thread_id: &str, run: &Run) -> Result<String> {
        if run.status.is_success() {
            return self.latest_message(thread_id, Some(Role::Assistant)).await;
        }

        let mut attempt = 0;

        loop {
            let current = self.client.get_run(thread_id, &run.id).await?;

            match CompletionState::observe(current.status, attempt, &self.schedule) {
                CompletionState::Succeeded => {
                    tracing::debug!(run_id = %current.id, attempts = attempt, "Run completed");
                    return self.latest_message(thread_id, Some(Role::Assistant)).await;
                }
                CompletionState::Failed => {
                    if let Some(last_error) = &current.last_error {
                        tracing::warn!(
                            run_id = %current.id,
                            code = %last_error.code,
                            "Run failed: {}",
                            last_error.message
                        );
                    }
                    return Err(ExchangeError::RunFailed {
                        run_id: current.id,
                        status: current.status,
                    });
                }
                CompletionState::TimedOut => {
                    tracing::warn!(run_id = %current.id, attempts = attempt, "Run still pending, giving up");
                    return Err(ExchangeError::RunTimedOut {
                        run_id: current.id,
                        attempts: attempt,
                    });
                }
                CompletionState::Pending => {
                    let delay = self.schedule.delay(attempt);
                    tracing::debug!(
                        run_id = %current.id,
                        status = %current.status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Run pending"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn fetch_messages(&self, thread_id: &str, order: SortOrder) -> Result<Vec<ThreadMessage>> {
        self.client
            .list_messages(thread_id, order)
            .await
            .map_err(|e| not_found_as_thread(e, thread_id))
    }
}

fn validate_message(message: Option<&str>) -> Result<&str> {
    match message {
        Some(message) if message.chars().count() > 1 => Ok(message),
        _ => Err(ExchangeError::BadRequest(
            "Message must have more than one character".to_string(),
        )),
    }
}

/// A malformed id names no thread, so it reads the same as a missing one
fn not_found_as_thread(error: parley_assistants::AssistantsError, thread_id: &str) -> ExchangeError {
    if error.is_not_found() || error.is_invalid_id() {
        ExchangeError::ThreadNotFound(thread_id.to_string())
    } else {
        ExchangeError::Remote(error)
    }
}
