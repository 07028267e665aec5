use axum::{
    extract::{Query, State},
    http::StatusCode,
    Form, Json,
};
use parley_exchange::SimpleMessage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ThreadParams {
    #[serde(rename = "thread-id")]
    pub thread_id: Option<String>,
    pub order: Option<String>,
}

impl ThreadParams {
    /// Only `asc` (any case) asks for oldest first
    pub fn ascending(&self) -> bool {
        self.order
            .as_deref()
            .map_or(false, |order| order.eq_ignore_ascii_case("asc"))
    }
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    #[serde(rename = "thread-id")]
    pub thread_id: String,
    pub messages: Vec<SimpleMessage>,
}

fn required_thread_id(thread_id: Option<String>) -> ApiResult<String> {
    thread_id.ok_or_else(|| ApiError::BadRequest("Thread ID is required".to_string()))
}

/// Transcript of a thread
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ThreadParams>,
) -> ApiResult<Json<ThreadResponse>> {
    let ascending = params.ascending();
    let thread_id = required_thread_id(params.thread_id)?;

    let messages = state
        .orchestrator
        .list_messages(&thread_id, ascending)
        .await?;

    Ok(Json(ThreadResponse {
        thread_id,
        messages,
    }))
}

/// Delete a thread; the id may come in the query string or a form body
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThreadParams>,
    form: Option<Form<ThreadParams>>,
) -> ApiResult<StatusCode> {
    let from_form = form.and_then(|Form(params)| params.thread_id);
    let thread_id = required_thread_id(from_form.or(query.thread_id))?;

    state.orchestrator.delete_thread(&thread_id).await?;

    Ok(StatusCode::OK)
}
