//! Task-local trace id for the request currently being served.
//!
//! `TraceSpan` opens the scope; `AppError` reads it when rendering problem
//! details. Match actors run outside any request and report "unknown".

use std::cell::RefCell;

use tokio::task_local;

task_local! {
    static TRACE_ID: RefCell<Option<String>>;
}

const UNKNOWN: &str = "unknown";

pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(RefCell::new(Some(trace_id)), future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_outside_a_request() {
        assert_eq!(trace_id(), UNKNOWN);
    }

    #[tokio::test]
    async fn scope_is_visible_inside_and_restored_after() {
        let seen = with_trace_id("req-42".to_string(), async { trace_id() }).await;
        assert_eq!(seen, "req-42");
        assert_eq!(trace_id(), UNKNOWN);
    }
}
