//! Fire-and-forget telemetry.
//!
//! Sinks never block the caller and never report failures back to it: a
//! telemetry problem must not get in the way of delivering a reply.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Queue depth of [`FileTelemetry`]; events beyond it are dropped.
const FILE_QUEUE_CAPACITY: usize = 256;

/// A named telemetry event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Event name.
    pub name: String,
    /// Extra properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Creates an event stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Destination for telemetry events.
///
/// Implementations must return quickly and swallow their own failures.
pub trait TelemetrySink: Send + Sync {
    /// Records an event.
    fn track_event(&self, event: TelemetryEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn track_event(&self, _event: TelemetryEvent) {}
}

/// Emits events as structured `tracing` records under the `telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track_event(&self, event: TelemetryEvent) {
        info!(target: "telemetry", name = %event.name, properties = ?event.properties, "event");
    }
}

/// Appends events as JSON lines to a file from a background task.
///
/// `track_event` only enqueues; when the queue is full or the writer is gone
/// the event is dropped.
#[derive(Debug, Clone)]
pub struct FileTelemetry {
    tx: mpsc::Sender<TelemetryEvent>,
}

impl FileTelemetry {
    /// Spawns the writer task. Must be called inside a Tokio runtime.
    pub fn spawn(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel(FILE_QUEUE_CAPACITY);
        tokio::spawn(write_events(path, rx));
        Self { tx }
    }
}

impl TelemetrySink for FileTelemetry {
    fn track_event(&self, event: TelemetryEvent) {
        if let Err(e) = self.tx.try_send(event) {
            debug!(error = %e, "Telemetry event dropped");
        }
    }
}

async fn write_events(path: PathBuf, mut rx: mpsc::Receiver<TelemetryEvent>) {
    if let Some(parent) = path.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            warn!(error = %e, path = %parent.display(), "Failed to create telemetry directory");
        }
    }

    while let Some(event) = rx.recv().await {
        let mut line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to serialize telemetry event");
                continue;
            }
        };
        line.push('\n');

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await;
        match file {
            Ok(mut file) => {
                if let Err(e) = file.write_all(line.as_bytes()).await {
                    warn!(error = %e, path = %path.display(), "Failed to write telemetry event");
                }
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to open telemetry file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_event_properties() {
        let event = TelemetryEvent::new("builds").with_property("channel", "telegram");
        assert_eq!(event.name, "builds");
        assert_eq!(event.properties.get("channel").map(String::as_str), Some("telegram"));
    }

    #[test]
    fn test_noop_and_tracing_do_not_panic() {
        NoopTelemetry.track_event(TelemetryEvent::new("a"));
        TracingTelemetry.track_event(TelemetryEvent::new("b"));
    }

    #[tokio::test]
    async fn test_file_telemetry_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("telemetry.jsonl");
        let sink = FileTelemetry::spawn(&path);

        sink.track_event(TelemetryEvent::new("builds"));
        sink.track_event(TelemetryEvent::new("approvals"));

        let mut content = String::new();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            content = tokio::fs::read_to_string(&path).await.unwrap_or_default();
            if content.lines().count() == 2 {
                break;
            }
        }

        let names: Vec<String> = content
            .lines()
            .map(|l| serde_json::from_str::<TelemetryEvent>(l).unwrap().name)
            .collect();
        assert_eq!(names, vec!["builds", "approvals"]);
    }
}
