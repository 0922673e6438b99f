//! The feeder link: connection lifecycle, retry, and the reader loop.
//!
//! [`FeederLink`] owns exactly one transport at a time, a three-state
//! connection state machine, and the two background tasks of the design:
//! a connect supervisor that dials (and re-dials) the peer, and a reader
//! task that turns the inbound byte stream into [`EventSink`] callbacks.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected --connect()--> Connecting --success--> Connected
//!      ^                          |  ^                    |
//!      |        retries exhausted |  | retry wait         | read error / EOF
//!      |        (on_connection_   |  |                    | (on_disconnected)
//!      |         failed)          v  |                    v
//!      +<-------------------------+--+--------------------+
//!                    disconnect() from anywhere (on_disconnected)
//! ```
//!
//! A `connect()` call on a link that is already `Connecting` or
//! `Connected` is rejected with [`Error::AlreadyConnected`]; tear the old
//! connection down first if that is what you want. A failed attempt is
//! retried per [`RetryConfig`]; a failure on an established link is not,
//! and surfaces once as `on_disconnected` so the caller decides whether to
//! dial again.
//!
//! # Concurrency
//!
//! Every state change and every use of the transport goes through one
//! `RwLock`: command writes hold it shared, transitions hold it
//! exclusively. A `send()` therefore cannot race a `disconnect()` closing
//! the socket out from under it, and lifecycle callbacks fire at most once
//! per connection no matter which side noticed the end first. Stale tasks
//! from an earlier connection are fenced off by a generation counter.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use feedflow_types::ParsedFrame;

use crate::command::CommandChannel;
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::framing::FrameReader;
use crate::retry::RetryConfig;
use crate::transport::{Connector, Transport};

/// Connection state of a link.
///
/// Exactly one per link, mutated only by the link itself; readers observe
/// it via [`FeederLink::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport is open.
    Disconnected,
    /// A connect attempt (possibly a retry) is in flight.
    Connecting,
    /// The transport is established and the reader loop is running.
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

pub(crate) struct Shared {
    pub(crate) state: ConnectionState,
    /// Bumped on every transition that invalidates outstanding tasks.
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
    pub(crate) transport: Option<Arc<dyn Transport>>,
}

pub(crate) struct LinkInner {
    pub(crate) connector: Box<dyn Connector>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) retry: RetryConfig,
    pub(crate) shared: RwLock<Shared>,
}

/// Handle to one feeder link.
///
/// Create once per peer, `connect()` with the target address, and observe
/// the outcome through the [`EventSink`] and [`state`](Self::state). The
/// handle intentionally does not implement `Clone` (one owner per
/// transport); wrap it in an `Arc` to share across tasks.
pub struct FeederLink {
    inner: Arc<LinkInner>,
}

/// Type alias for a shared link reference.
pub type SharedLink = Arc<FeederLink>;

impl FeederLink {
    /// Create a link with the default retry profile.
    pub fn new(connector: impl Connector + 'static, sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(connector, sink, RetryConfig::default())
    }

    /// Create a link with a custom retry profile.
    pub fn with_config(
        connector: impl Connector + 'static,
        sink: Arc<dyn EventSink>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            inner: Arc::new(LinkInner {
                connector: Box::new(connector),
                sink,
                retry,
                shared: RwLock::new(Shared {
                    state: ConnectionState::Disconnected,
                    generation: 0,
                    cancel: CancellationToken::new(),
                    transport: None,
                }),
            }),
        }
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.inner.shared.read().await.state
    }

    /// Whether the link is currently connected.
    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// The command channel for this link.
    pub fn commands(&self) -> CommandChannel {
        CommandChannel::new(Arc::clone(&self.inner))
    }

    /// Begin connecting to `address`.
    ///
    /// Moves the link to `Connecting` and returns; the attempt (and its
    /// retries) run on a background task. Success is observable through
    /// [`state`](Self::state); exhausted retries surface once through
    /// `on_connection_failed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyConnected`] if the link is not
    /// `Disconnected`; the existing connection attempt is left untouched.
    pub async fn connect(&self, address: &str) -> Result<()> {
        self.inner.retry.validate()?;

        let (cancel, generation) = {
            let mut shared = self.inner.shared.write().await;
            if shared.state != ConnectionState::Disconnected {
                return Err(Error::AlreadyConnected {
                    state: shared.state,
                });
            }
            shared.state = ConnectionState::Connecting;
            shared.generation += 1;
            shared.cancel = CancellationToken::new();
            (shared.cancel.clone(), shared.generation)
        };

        debug!(address, "starting connection attempt");
        let inner = Arc::clone(&self.inner);
        let address = address.to_string();
        tokio::spawn(run_supervisor(inner, address, cancel, generation));
        Ok(())
    }

    /// Tear the link down.
    ///
    /// Idempotent: on an already-disconnected link this is a no-op and no
    /// callback fires. Otherwise the transport is closed (close errors are
    /// ignored), outstanding tasks are signalled to stop, and
    /// `on_disconnected` fires exactly once. Safe to call from any task at
    /// any time, including mid-retry; the retry wait is interrupted.
    pub async fn disconnect(&self) {
        let transport = {
            let mut shared = self.inner.shared.write().await;
            if shared.state == ConnectionState::Disconnected {
                return;
            }
            shared.state = ConnectionState::Disconnected;
            shared.generation += 1;
            shared.cancel.cancel();
            shared.transport.take()
        };

        if let Some(transport) = transport {
            let _ = transport.close().await;
        }
        info!("feeder link disconnected");
        self.inner.sink.on_disconnected();
    }
}

impl std::fmt::Debug for FeederLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeederLink").finish_non_exhaustive()
    }
}

impl Drop for FeederLink {
    fn drop(&mut self) {
        // Best-effort stop for the background tasks when the handle is
        // dropped without an explicit disconnect(). The transport itself is
        // released when the last task drops its reference.
        if let Ok(shared) = self.inner.shared.try_read() {
            shared.cancel.cancel();
        }
    }
}

/// Dial the peer, retrying per the link's config, then hand off to the
/// reader loop.
async fn run_supervisor(
    inner: Arc<LinkInner>,
    address: String,
    cancel: CancellationToken,
    generation: u64,
) {
    let retry = inner.retry.clone();
    let mut last_error: Option<Error> = None;

    for attempt in 0..=retry.max_retries {
        if attempt > 0 {
            let delay = retry.delay_for_attempt(attempt - 1);
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = sleep(delay) => {}
            }
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = inner.connector.connect(&address) => result,
        };

        match result {
            Ok(transport) => {
                let reader_cancel = {
                    let mut shared = inner.shared.write().await;
                    if shared.generation != generation
                        || shared.state != ConnectionState::Connecting
                    {
                        // disconnect() won the race; release the socket we
                        // just opened and bow out.
                        drop(shared);
                        let _ = transport.close().await;
                        return;
                    }
                    shared.state = ConnectionState::Connected;
                    shared.transport = Some(Arc::clone(&transport));
                    shared.cancel.clone()
                };

                info!(address = %address, attempts = attempt + 1, "feeder link established");
                tokio::spawn(run_reader(inner, transport, reader_cancel, generation));
                return;
            }
            Err(error) => {
                warn!(
                    address = %address,
                    attempt = attempt + 1,
                    max = retry.max_retries + 1,
                    error = %error,
                    "connect attempt failed"
                );
                let retryable = error.is_retryable();
                last_error = Some(error);
                if !retryable {
                    break;
                }
            }
        }
    }

    // Retries exhausted. Surface the last error exactly once, unless a
    // disconnect() already took this attempt down.
    {
        let mut shared = inner.shared.write().await;
        if shared.generation != generation || shared.state != ConnectionState::Connecting {
            return;
        }
        shared.state = ConnectionState::Disconnected;
        shared.generation += 1;
    }

    let error = last_error.unwrap_or_else(|| {
        Error::connection_failed_str(Some(address.clone()), "no connection attempt completed")
    });
    warn!(address = %address, "giving up on connection");
    inner.sink.on_connection_failed(error);
}

/// Pump frames off the transport until the connection ends.
async fn run_reader(
    inner: Arc<LinkInner>,
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
    generation: u64,
) {
    let mut frames = FrameReader::new(Arc::clone(&transport));

    // `None` means a deliberate stop (disconnect() owns the callback);
    // `Some` means the stream ended on its own and we run the teardown.
    let ended: Option<&str> = loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break None,
            next = frames.next_frame() => next,
        };

        match next {
            // Deliveries hold the state lock shared, so each callback is
            // strictly ordered before any on_disconnected from a
            // concurrent teardown.
            Ok(Some(frame)) => match ParsedFrame::classify(&frame) {
                ParsedFrame::Unparseable => {
                    debug!(frame = %frame, "dropping unparseable frame");
                }
                ParsedFrame::Reading(reading) => {
                    let shared = inner.shared.read().await;
                    if shared.generation != generation {
                        break None;
                    }
                    let reading = reading.captured_at(time::OffsetDateTime::now_utc());
                    inner.sink.on_reading(reading);
                }
                ParsedFrame::Status(status) => {
                    let shared = inner.shared.read().await;
                    if shared.generation != generation {
                        break None;
                    }
                    debug!(code = %status.code, "status event");
                    inner.sink.on_status(status);
                }
            },
            Ok(None) => break Some("end of stream"),
            Err(error) => {
                debug!(error = %error, "read failed");
                break Some("read error");
            }
        }
    };

    let Some(reason) = ended else {
        return;
    };

    let transport = {
        let mut shared = inner.shared.write().await;
        if shared.generation != generation || shared.state != ConnectionState::Connected {
            return;
        }
        shared.state = ConnectionState::Disconnected;
        shared.generation += 1;
        shared.cancel.cancel();
        shared.transport.take()
    };

    if let Some(transport) = transport {
        let _ = transport.close().await;
    }
    info!(reason, "feeder link lost");
    inner.sink.on_disconnected();
}
