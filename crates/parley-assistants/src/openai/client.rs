// OpenAI Assistants v2 client (threads, messages, runs)
// https://platform.openai.com/docs/api-reference/threads

use crate::error::{AssistantsError, Result};
use crate::traits::ConversationClient;
use crate::types::{NewMessage, Run, SortOrder, ThreadDeleted, ThreadMessage};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const ASSISTANTS_BETA: &str = "assistants=v2";
const PAGE_LIMIT: &str = "100";

/// Assistants API client (HTTP direct, no SDK)
pub struct OpenAIAssistantsClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl OpenAIAssistantsClient {
    /// Create new client with API key against the public OpenAI endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    pub fn builder() -> OpenAIAssistantsClientBuilder {
        OpenAIAssistantsClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append `segments` to the base path, each percent-encoded as a single
    /// segment so ids can never address another resource.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AssistantsError::InvalidConfig(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Decode a successful body, or turn a failed response into an error.
    /// 404 becomes `NotFound` so callers can tell a missing thread apart from
    /// an outage.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| AssistantsError::Decode(format!("{}: {}", resource, e)));
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response body".to_string());
        let message = error_message(status, &body);

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("OpenAI reported {} as missing: {}", resource, message);
            return Err(AssistantsError::NotFound(format!("{}: {}", resource, message)));
        }

        tracing::error!(
            "OpenAI API request failed: resource={}, status={}, body={}",
            resource,
            status,
            body
        );

        Err(AssistantsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_message_page(
        &self,
        thread_id: &str,
        order: SortOrder,
        after: Option<&str>,
    ) -> Result<MessagePage> {
        let thread_id = checked_id("thread", thread_id)?;
        let mut query = vec![("order", order.as_str()), ("limit", PAGE_LIMIT)];
        if let Some(after) = after {
            query.push(("after", after));
        }

        let response = self
            .http_client
            .get(self.endpoint(&["threads", thread_id, "messages"])?)
            .query(&query)
            .send()
            .await?;

        self.handle_response(response, &format!("thread {}", thread_id))
            .await
    }
}

#[async_trait]
impl ConversationClient for OpenAIAssistantsClient {
    async fn create_thread_and_run(
        &self,
        messages: Vec<NewMessage>,
        assistant_id: &str,
    ) -> Result<Run> {
        tracing::debug!(
            assistant_id = %assistant_id,
            seed_messages = messages.len(),
            "Creating thread and run"
        );

        let payload = serde_json::json!({
            "assistant_id": assistant_id,
            "thread": { "messages": messages },
        });

        let response = self
            .http_client
            .post(self.endpoint(&["threads", "runs"])?)
            .json(&payload)
            .send()
            .await?;

        self.handle_response(response, &format!("assistant {}", assistant_id))
            .await
    }

    async fn append_message(&self, thread_id: &str, message: NewMessage) -> Result<ThreadMessage> {
        let thread_id = checked_id("thread", thread_id)?;
        tracing::debug!(thread_id = %thread_id, role = %message.role, "Appending message");

        let response = self
            .http_client
            .post(self.endpoint(&["threads", thread_id, "messages"])?)
            .json(&message)
            .send()
            .await?;

        self.handle_response(response, &format!("thread {}", thread_id))
            .await
    }

    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run> {
        let thread_id = checked_id("thread", thread_id)?;
        tracing::debug!(thread_id = %thread_id, assistant_id = %assistant_id, "Starting run");

        let payload = serde_json::json!({ "assistant_id": assistant_id });

        let response = self
            .http_client
            .post(self.endpoint(&["threads", thread_id, "runs"])?)
            .json(&payload)
            .send()
            .await?;

        self.handle_response(response, &format!("thread {}", thread_id))
            .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let thread_id = checked_id("thread", thread_id)?;
        let run_id = checked_id("run", run_id)?;
        let response = self
            .http_client
            .get(self.endpoint(&["threads", thread_id, "runs", run_id])?)
            .send()
            .await?;

        let run: Run = self
            .handle_response(response, &format!("run {}", run_id))
            .await?;

        tracing::debug!(run_id = %run.id, status = %run.status, "Fetched run");
        Ok(run)
    }

    async fn list_messages(&self, thread_id: &str, order: SortOrder) -> Result<Vec<ThreadMessage>> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let page = self
                .fetch_message_page(thread_id, order, after.as_deref())
                .await?;
            messages.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more => after = Some(last_id),
                _ => break,
            }
        }

        tracing::debug!(
            thread_id = %thread_id,
            order = order.as_str(),
            count = messages.len(),
            "Listed messages"
        );
        Ok(messages)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<ThreadDeleted> {
        let thread_id = checked_id("thread", thread_id)?;
        tracing::debug!(thread_id = %thread_id, "Deleting thread");

        let response = self
            .http_client
            .delete(self.endpoint(&["threads", thread_id])?)
            .send()
            .await?;

        self.handle_response(response, &format!("thread {}", thread_id))
            .await
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for OpenAIAssistantsClient
#[derive(Default)]
pub struct OpenAIAssistantsClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    organization: Option<String>,
    timeout: Option<Duration>,
}

impl OpenAIAssistantsClientBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API base URL (defaults to https://api.openai.com/v1)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Per-request timeout for every call made by the client
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<OpenAIAssistantsClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AssistantsError::InvalidConfig("API key is required".to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENAI_API_BASE.to_string());
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            AssistantsError::InvalidConfig(format!("Invalid base URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AssistantsError::InvalidConfig(format!(
                "{} cannot be a base URL",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| AssistantsError::InvalidConfig("Invalid API key format".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_static(ASSISTANTS_BETA),
        );
        if let Some(organization) = self.organization {
            headers.insert(
                HeaderName::from_static("openai-organization"),
                HeaderValue::from_str(&organization).map_err(|_| {
                    AssistantsError::InvalidConfig("Invalid organization format".to_string())
                })?,
            );
        }

        let mut http_client = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            http_client = http_client.timeout(timeout);
        }
        let http_client = http_client.build()?;

        Ok(OpenAIAssistantsClient {
            http_client,
            base_url,
        })
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct MessagePage {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Thread and run ids are opaque tokens like `thread_abc123`; anything else
/// is refused before it reaches a request path.
fn checked_id<'a>(kind: &'static str, id: &'a str) -> Result<&'a str> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(id)
    } else {
        Err(AssistantsError::InvalidId {
            kind,
            id: id.to_string(),
        })
    }
}

/// Prefer the message from OpenAI's `{"error": {"message": ..}}` envelope
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string();
    }
    body.to_string()
}
