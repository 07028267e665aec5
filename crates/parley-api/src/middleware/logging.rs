use axum::{
    extract::{Query, Request},
    http::Uri,
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::routes::thread::ThreadParams;

/// Request logging middleware
///
/// Conversation requests are tagged with the `thread-id` from the query
/// string when there is one; form bodies are left unread.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let thread_id = thread_id_of(&uri);
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %uri.path(),
            thread_id = thread_id.as_deref().unwrap_or("-"),
            status = status.as_u16(),
            duration_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %uri.path(),
            thread_id = thread_id.as_deref().unwrap_or("-"),
            status = status.as_u16(),
            duration_ms,
            "Request processed"
        );
    }

    response
}

fn thread_id_of(uri: &Uri) -> Option<String> {
    Query::<ThreadParams>::try_from_uri(uri)
        .ok()
        .and_then(|Query(params)| params.thread_id)
}
