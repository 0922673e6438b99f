//! Event delivery seam between the link and its consumers.
//!
//! The link reports everything it learns through the four callbacks of
//! [`EventSink`]: parsed readings, status tokens, connection failure, and
//! disconnection. Concrete sinks forward these wherever the embedding
//! application needs them (UI state, a telemetry store, a log); the link
//! itself is execution-context-agnostic and only guarantees ordering and
//! the at-most-once lifecycle properties.
//!
//! [`ChannelSink`] adapts the callbacks onto a broadcast channel for
//! consumers that prefer to receive [`LinkEvent`]s as a stream.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use feedflow_types::{Reading, StatusEvent};

use crate::error::Error;

/// Consumer of link events.
///
/// Callbacks are invoked from the link's background tasks and must return
/// promptly; marshal to another execution context (a UI thread, an
/// uploader task) inside the implementation if the work is slow.
pub trait EventSink: Send + Sync {
    /// A telemetry sample arrived and decoded.
    fn on_reading(&self, reading: Reading);

    /// A status token arrived.
    fn on_status(&self, status: StatusEvent);

    /// A connection attempt gave up after exhausting its retries.
    ///
    /// Fires at most once per attempt, with the last error observed.
    fn on_connection_failed(&self, error: Error);

    /// An established or in-progress connection ended.
    ///
    /// Fires at most once per connection, whether the end came from an
    /// explicit `disconnect()` or a mid-session stream failure.
    fn on_disconnected(&self);
}

/// Events emitted by a link, as plain data.
///
/// All events are serializable for logging, persistence, and IPC. Errors
/// are carried as display strings since transport errors are not `Clone`.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum LinkEvent {
    /// A telemetry sample.
    Reading {
        /// The decoded sample.
        reading: Reading,
    },
    /// A status token.
    Status {
        /// The token event.
        status: StatusEvent,
    },
    /// The connection attempt failed for good.
    ConnectionFailed {
        /// Rendered form of the last error.
        error: String,
    },
    /// The connection ended.
    Disconnected,
}

/// Sender for link events.
pub type EventSender = broadcast::Sender<LinkEvent>;

/// Receiver for link events.
pub type EventReceiver = broadcast::Receiver<LinkEvent>;

/// An [`EventSink`] that fans events out over a broadcast channel.
///
/// Slow subscribers can lag and miss events (broadcast semantics); the
/// channel capacity bounds how far behind they may fall.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: EventSender,
}

impl ChannelSink {
    /// Create a channel sink with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, event: LinkEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventSink for ChannelSink {
    fn on_reading(&self, reading: Reading) {
        self.send(LinkEvent::Reading { reading });
    }

    fn on_status(&self, status: StatusEvent) {
        self.send(LinkEvent::Status { status });
    }

    fn on_connection_failed(&self, error: Error) {
        self.send(LinkEvent::ConnectionFailed {
            error: error.to_string(),
        });
    }

    fn on_disconnected(&self) {
        self.send(LinkEvent::Disconnected);
    }
}

/// An [`EventSink`] that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_reading(&self, _reading: Reading) {}
    fn on_status(&self, _status: StatusEvent) {}
    fn on_connection_failed(&self, _error: Error) {}
    fn on_disconnected(&self) {}
}
