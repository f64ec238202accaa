//! Task-local trace id.
//!
//! `RequestTrace` scopes each request's future with its id; anything running
//! inside that future (error rendering, store error translation) can read it
//! without threading it through signatures.

use std::future::Future;

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

/// The current request's trace id, or "unknown" outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| "unknown".to_string())
}

pub async fn with_trace_id<F: Future>(trace_id: String, future: F) -> F::Output {
    TRACE_ID.scope(trace_id, future).await
}
