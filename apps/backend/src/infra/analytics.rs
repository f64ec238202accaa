//! Fire-and-forget analytics events.

use serde_json::Value;
use tracing::info;

pub trait Analytics: Send + Sync {
    /// Record an event. Must not block and must not fail the caller.
    fn log_event(&self, name: &str, params: Value);
}

/// Writes each event as a structured `tracing` record on target `analytics`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn log_event(&self, name: &str, params: Value) {
        info!(target: "analytics", event = name, params = %params, "analytics event");
    }
}
