//! The event-stream observer set is, per spec §1, an external collaborator —
//! only its interface matters here. [`FetchEvents`] is that narrow seam;
//! [`TracingFetchEvents`] is the default implementation, emitting `tracing`
//! events instead of forwarding to a telemetry sink.

/// Events the Web Fetcher posts during a call (spec §4.2).
pub trait FetchEvents: Send + Sync {
    fn offline_detected(&self) {}
    fn using_alt_client(&self, reason: &str) {
        let _ = reason;
    }
    fn suppressed_error(&self, context: &str, error: &str) {
        let _ = (context, error);
    }
}

#[derive(Debug, Default)]
pub struct TracingFetchEvents;

impl FetchEvents for TracingFetchEvents {
    fn offline_detected(&self) {
        tracing::warn!("OfflineDetected");
    }

    fn using_alt_client(&self, reason: &str) {
        tracing::warn!(reason, "UsingAltClient");
    }

    fn suppressed_error(&self, context: &str, error: &str) {
        tracing::debug!(context, error, "SuppressedError");
    }
}
