//! Telemetry sink that writes lifecycle events to the tracing log

use async_trait::async_trait;
use extman_core::{ExtensionEvent, TelemetrySink};

/// Records each event as a `debug!` line under the `extman::telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetrySink;

#[async_trait]
impl TelemetrySink for TracingTelemetrySink {
    async fn record(&self, event: ExtensionEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::debug!(target: "extman::telemetry", event = %json),
            Err(e) => tracing::debug!(target: "extman::telemetry", error = %e, "Unserializable event"),
        }
    }
}
