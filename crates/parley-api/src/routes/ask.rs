use axum::{extract::State, Form, Json};
use parley_exchange::ThreadResolution;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct AskForm {
    #[serde(rename = "thread-id")]
    pub thread_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    #[serde(rename = "thread-id")]
    pub thread_id: String,
    pub answer: String,
}

/// Send a message, opening a new thread when no usable thread id is given
pub async fn ask(
    State(state): State<Arc<AppState>>,
    form: Option<Form<AskForm>>,
) -> ApiResult<Json<AskResponse>> {
    // a missing or non-form body carries no message either
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let message = form
        .message
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;
    // an empty field means the client has no thread yet
    let thread_id = form
        .thread_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    let exchange = state.orchestrator.ask(Some(&message), thread_id).await?;

    if let ThreadResolution::Recovered {
        thread_id,
        stale_thread_id,
    } = &exchange.thread
    {
        tracing::info!(
            thread_id = %thread_id,
            stale_thread_id = %stale_thread_id,
            "Conversation moved to a new thread"
        );
    }

    Ok(Json(AskResponse {
        thread_id: exchange.thread_id().to_string(),
        answer: exchange.answer,
    }))
}
