//! Lifecycle telemetry as an asynchronous side channel.
//!
//! The manager pushes events into an unbounded channel and never waits on
//! the consumer, so a slow or failing sink cannot affect an operation's
//! result.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::enablement::EnablementScope;
use crate::extension::{LoadedExtension, extension_id};
use crate::install::{InstallMetadata, InstallType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExtensionEventKind {
    Install,
    Update { previous_version: String },
    Uninstall,
    Enable { scope: EnablementScope },
    Disable { scope: EnablementScope },
    Error { operation: String, message: String },
}

/// One telemetry record. Carries the hashed id, never the raw source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionEvent {
    #[serde(flatten)]
    pub kind: ExtensionEventKind,
    pub extension_id: String,
    pub extension_name: String,
    pub version: Option<String>,
    pub source_kind: Option<InstallType>,
    pub status: EventStatus,
    pub timestamp: DateTime<Utc>,
}

impl ExtensionEvent {
    pub fn new(
        kind: ExtensionEventKind,
        status: EventStatus,
        name: &str,
        version: Option<&str>,
        install_metadata: Option<&InstallMetadata>,
    ) -> Self {
        Self {
            kind,
            extension_id: extension_id(name, install_metadata),
            extension_name: name.to_string(),
            version: version.map(str::to_string),
            source_kind: install_metadata.map(|m| m.install_type),
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn for_extension(
        kind: ExtensionEventKind,
        status: EventStatus,
        extension: &LoadedExtension,
    ) -> Self {
        Self::new(
            kind,
            status,
            &extension.name,
            Some(&extension.version),
            extension.install_metadata.as_ref(),
        )
    }
}

/// Receives telemetry events.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record(&self, event: ExtensionEvent);
}

/// Cheap, cloneable handle for emitting events.
#[derive(Debug, Clone, Default)]
pub struct TelemetryEmitter {
    tx: Option<mpsc::UnboundedSender<ExtensionEvent>>,
}

impl TelemetryEmitter {
    /// An emitter that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Forward events to `sink` from a background task.
    ///
    /// Must be called inside a tokio runtime. The task ends once every
    /// clone of the emitter is dropped.
    pub fn spawn(sink: Arc<dyn TelemetrySink>) -> Self {
        let (emitter, mut rx) = Self::channel();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                sink.record(event).await;
            }
        });
        emitter
    }

    /// An emitter paired with the raw receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExtensionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Queue an event. Never blocks and never fails.
    pub fn emit(&self, event: ExtensionEvent) {
        if let Some(tx) = &self.tx
            && tx.send(event).is_err()
        {
            tracing::trace!("Telemetry consumer has stopped; event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn install_event() -> ExtensionEvent {
        let metadata = InstallMetadata::new(InstallType::Local, "/private/path/ext");
        ExtensionEvent::new(
            ExtensionEventKind::Install,
            EventStatus::Success,
            "ext",
            Some("1.0.0"),
            Some(&metadata),
        )
    }

    #[test]
    fn event_never_carries_raw_source() {
        let json = serde_json::to_string(&install_event()).unwrap();
        assert!(!json.contains("/private/path"));
        assert!(json.contains("\"event\":\"install\""));
        assert!(json.contains("\"source_kind\":\"local\""));
    }

    #[test]
    fn disabled_emitter_drops_events() {
        TelemetryEmitter::disabled().emit(install_event());
    }

    #[test]
    fn emit_after_receiver_dropped_is_silent() {
        let (emitter, rx) = TelemetryEmitter::channel();
        drop(rx);
        emitter.emit(install_event());
    }

    struct Collect(Mutex<Vec<ExtensionEvent>>, tokio::sync::Notify);

    #[async_trait]
    impl TelemetrySink for Collect {
        async fn record(&self, event: ExtensionEvent) {
            self.0.lock().unwrap().push(event);
            self.1.notify_one();
        }
    }

    #[tokio::test]
    async fn spawned_consumer_forwards_to_sink() {
        let sink = Arc::new(Collect(Mutex::new(Vec::new()), tokio::sync::Notify::new()));
        let emitter = TelemetryEmitter::spawn(sink.clone());

        emitter.emit(install_event());
        sink.1.notified().await;

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ExtensionEventKind::Install);
    }
}
