//! Progress/Session Bus (C9): a process-wide registry of session-scoped event
//! queues, with heartbeats and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use prometheus::IntCounter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::Stream;

use crate::error::{Error, Result};

/// Idle duration after which `subscribe` emits a synthetic heartbeat event.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Bound on each session's event queue; producers use try-send and drop on
/// overflow rather than block (§9 DESIGN NOTES).
const QUEUE_CAPACITY: usize = 256;

static DROPPED_EVENTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "truce_progress_dropped_events_total",
        "Progress events dropped because a session's queue was full",
    )
    .expect("valid counter metadata")
});

/// A single progress update delivered to a session's subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The pipeline stage this event describes (see §6 reserved stage list).
    pub stage: String,
    /// Human-readable message.
    pub message: String,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// Arbitrary structured details.
    pub details: serde_json::Value,
}

impl ProgressEvent {
    fn new(stage: impl Into<String>, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            timestamp: Utc::now(),
            details,
        }
    }

    fn heartbeat() -> Self {
        Self::new("keepalive", "heartbeat", serde_json::Value::Null)
    }

    fn cancelled() -> Self {
        Self::new("cancelled", "session cancelled", serde_json::Value::Null)
    }

    /// Whether this event's stage terminates the subscriber stream (§4.C9).
    fn is_terminal(&self) -> bool {
        matches!(self.stage.as_str(), "complete" | "error" | "cancelled")
    }
}

struct Session {
    sender: mpsc::Sender<ProgressEvent>,
    receiver: parking_lot::Mutex<Option<mpsc::Receiver<ProgressEvent>>>,
    cancelled: AtomicBool,
}

/// Process-wide registry of session event queues (C9).
#[derive(Default)]
pub struct ProgressBus {
    sessions: DashMap<String, Session>,
}

impl ProgressBus {
    /// Construct an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a session's event queue.
    pub fn open(&self, session_id: impl Into<String>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        self.sessions.insert(
            session_id.into(),
            Session {
                sender,
                receiver: parking_lot::Mutex::new(Some(receiver)),
                cancelled: AtomicBool::new(false),
            },
        );
    }

    /// Emit an event to a session's queue. Silent no-op if the session does
    /// not exist or its queue is full (dropped events are counted).
    pub fn emit(&self, session_id: &str, stage: &str, message: &str, details: serde_json::Value) {
        let Some(session) = self.sessions.get(session_id) else {
            return;
        };
        let event = ProgressEvent::new(stage, message, details);
        if session.sender.try_send(event).is_err() {
            DROPPED_EVENTS.inc();
            tracing::warn!(session_id, stage, "progress event dropped: queue full or closed");
        }
    }

    /// Take the single-consumer event stream for a session. Returns `None` if
    /// the session is unknown or has already been subscribed to.
    pub fn subscribe(&self, session_id: &str) -> Option<impl Stream<Item = ProgressEvent>> {
        let session = self.sessions.get(session_id)?;
        let mut receiver = session.receiver.lock();
        let receiver = receiver.take()?;
        Some(subscribe_stream(receiver))
    }

    /// Mark a session cancelled and emit a terminal `cancelled` event.
    pub fn cancel(&self, session_id: &str) -> Result<()> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;
        session.cancelled.store(true, Ordering::SeqCst);
        let _ = session.sender.try_send(ProgressEvent::cancelled());
        Ok(())
    }

    /// Cooperative cancellation check used at pipeline stage boundaries.
    pub fn check_cancelled(&self, session_id: &str) -> Result<()> {
        let cancelled = self
            .sessions
            .get(session_id)
            .map(|s| s.cancelled.load(Ordering::SeqCst))
            .unwrap_or(false);
        if cancelled {
            return Err(Error::Cancelled(session_id.to_string()));
        }
        Ok(())
    }

    /// Drop a session's queue, releasing its resources.
    pub fn close(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

fn subscribe_stream(mut receiver: mpsc::Receiver<ProgressEvent>) -> impl Stream<Item = ProgressEvent> {
    async_stream::stream! {
        loop {
            match timeout(HEARTBEAT_INTERVAL, receiver.recv()).await {
                Ok(Some(event)) => {
                    let terminal = event.is_terminal();
                    yield event;
                    if terminal {
                        break;
                    }
                }
                Ok(None) => break,
                Err(_) => yield ProgressEvent::heartbeat(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn emit_and_subscribe_delivers_fifo() {
        let bus = ProgressBus::new();
        bus.open("s1");
        bus.emit("s1", "searching", "looking", serde_json::json!({}));
        bus.emit("s1", "complete", "done", serde_json::json!({}));

        let mut stream = bus.subscribe("s1").unwrap();
        let first = stream.next().await.unwrap();
        assert_eq!(first.stage, "searching");
        let second = stream.next().await.unwrap();
        assert_eq!(second.stage, "complete");
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn emit_to_unknown_session_is_noop() {
        let bus = ProgressBus::new();
        bus.emit("ghost", "searching", "x", serde_json::json!({}));
    }

    #[test]
    fn check_cancelled_unknown_session_is_false() {
        let bus = ProgressBus::new();
        assert!(bus.check_cancelled("ghost").is_ok());
    }

    #[test]
    fn cancel_marks_session_and_emits_terminal_event() {
        let bus = ProgressBus::new();
        bus.open("s1");
        bus.cancel("s1").unwrap();
        assert!(bus.check_cancelled("s1").is_err());
    }

    #[test]
    fn cancel_unknown_session_errors() {
        let bus = ProgressBus::new();
        assert!(bus.cancel("ghost").is_err());
    }

    #[tokio::test]
    async fn heartbeat_emitted_after_idle_period() {
        tokio::time::pause();
        let bus = ProgressBus::new();
        bus.open("s1");
        let mut stream = bus.subscribe("s1").unwrap();

        let handle = tokio::spawn(async move { stream.next().await });
        tokio::time::advance(HEARTBEAT_INTERVAL + Duration::from_secs(1)).await;
        let event = handle.await.unwrap().unwrap();
        assert_eq!(event.stage, "keepalive");
    }
}
