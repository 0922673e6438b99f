//! Mock transport and connector for testing.
//!
//! This module provides in-memory stand-ins for the serial channel so the
//! link layer can be exercised without hardware:
//!
//! - **Scripted input**: queue inbound byte chunks, split anywhere, to
//!   drive the frame reassembly paths
//! - **Failure injection**: make the next N connection attempts fail
//! - **Write recording**: every outbound write is captured for assertion
//!
//! The same types are exported publicly so embedding applications can test
//! their own [`EventSink`](crate::events::EventSink) implementations
//! against a deterministic link.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{ConnectionFailureReason, Error, Result};
use crate::events::EventSink;
use crate::events::LinkEvent;
use crate::transport::{Connector, Transport};

use feedflow_types::{Reading, StatusEvent};

enum Chunk {
    Data(Vec<u8>),
    Eof,
}

/// An in-memory [`Transport`] fed by the test.
///
/// Reads block until a chunk is pushed, an EOF is queued, or the transport
/// is closed; writes are recorded. Created behind an `Arc` because that is
/// how transports are shared in the link.
pub struct MockTransport {
    inbound: StdMutex<VecDeque<Chunk>>,
    notify: Notify,
    written: StdMutex<Vec<Vec<u8>>>,
    closed: AtomicBool,
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inbound: StdMutex::new(VecDeque::new()),
            notify: Notify::new(),
            written: StdMutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        })
    }

    /// Queue raw inbound bytes.
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.inbound
            .lock()
            .unwrap()
            .push_back(Chunk::Data(bytes.to_vec()));
        self.notify.notify_one();
    }

    /// Queue one newline-terminated inbound line.
    pub fn push_line(&self, line: &str) {
        self.push_bytes(format!("{line}\n").as_bytes());
    }

    /// Queue an end-of-stream marker.
    pub fn push_eof(&self) {
        self.inbound.lock().unwrap().push_back(Chunk::Eof);
        self.notify.notify_one();
    }

    /// Everything written so far, one entry per `write_all` call.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.written.lock().unwrap().clone()
    }

    /// Number of `write_all` calls observed.
    pub fn write_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        loop {
            {
                let mut inbound = self.inbound.lock().unwrap();
                match inbound.pop_front() {
                    Some(Chunk::Data(mut data)) => {
                        let n = data.len().min(buf.len());
                        buf[..n].copy_from_slice(&data[..n]);
                        if n < data.len() {
                            let rest = data.split_off(n);
                            inbound.push_front(Chunk::Data(rest));
                        }
                        return Ok(n);
                    }
                    Some(Chunk::Eof) => return Ok(0),
                    None => {}
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(Error::Closed);
            }
            self.notify.notified().await;
        }
    }

    async fn write_all(&self, buf: &[u8]) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        self.written.lock().unwrap().push(buf.to_vec());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
        Ok(())
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("closed", &self.is_closed())
            .field("write_count", &self.write_count())
            .finish()
    }
}

/// A [`Connector`] handing out prepared [`MockTransport`]s.
///
/// Each successful `connect()` pops the next queued transport. Transient
/// connect failures can be injected ahead of the successes, mirroring a
/// feeder that needs a few attempts to accept.
pub struct MockConnector {
    transports: StdMutex<VecDeque<Arc<MockTransport>>>,
    remaining_failures: AtomicU32,
    attempts: AtomicU32,
}

impl MockConnector {
    /// A connector that will hand out the given transport once.
    pub fn with_transport(transport: Arc<MockTransport>) -> Self {
        Self::with_transports(vec![transport])
    }

    /// A connector handing out the given transports in order.
    pub fn with_transports(transports: Vec<Arc<MockTransport>>) -> Self {
        Self {
            transports: StdMutex::new(transports.into()),
            remaining_failures: AtomicU32::new(0),
            attempts: AtomicU32::new(0),
        }
    }

    /// A connector whose every attempt fails.
    pub fn always_failing() -> Self {
        let connector = Self::with_transports(Vec::new());
        connector.remaining_failures.store(u32::MAX, Ordering::SeqCst);
        connector
    }

    /// Fail the next `n` connection attempts before succeeding.
    #[must_use]
    pub fn failing_first(self, n: u32) -> Self {
        self.remaining_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Number of connection attempts observed.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.remaining_failures.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(Error::connection_failed(
                Some(address.to_string()),
                ConnectionFailureReason::Unreachable,
            ));
        }

        match self.transports.lock().unwrap().pop_front() {
            Some(transport) => Ok(transport),
            None => Err(Error::connection_failed(
                Some(address.to_string()),
                ConnectionFailureReason::Other("no transport scripted".to_string()),
            )),
        }
    }
}

impl std::fmt::Debug for MockConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnector")
            .field("attempts", &self.attempts())
            .finish_non_exhaustive()
    }
}

/// An [`EventSink`] that records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: StdMutex<Vec<LinkEvent>>,
    disconnected: AtomicU32,
    failed: AtomicU32,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of all recorded events, in delivery order.
    pub fn events(&self) -> Vec<LinkEvent> {
        self.events.lock().unwrap().clone()
    }

    /// How many times `on_disconnected` fired.
    pub fn disconnected_count(&self) -> u32 {
        self.disconnected.load(Ordering::SeqCst)
    }

    /// How many times `on_connection_failed` fired.
    pub fn connection_failed_count(&self) -> u32 {
        self.failed.load(Ordering::SeqCst)
    }

    /// Readings received so far, in delivery order.
    pub fn readings(&self) -> Vec<Reading> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LinkEvent::Reading { reading } => Some(reading),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn on_reading(&self, reading: Reading) {
        self.events
            .lock()
            .unwrap()
            .push(LinkEvent::Reading { reading });
    }

    fn on_status(&self, status: StatusEvent) {
        self.events
            .lock()
            .unwrap()
            .push(LinkEvent::Status { status });
    }

    fn on_connection_failed(&self, error: Error) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(LinkEvent::ConnectionFailed {
            error: error.to_string(),
        });
    }

    fn on_disconnected(&self) {
        self.disconnected.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(LinkEvent::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_reads_and_eof() {
        let transport = MockTransport::new();
        transport.push_bytes(b"abc");
        transport.push_eof();

        let mut buf = [0u8; 8];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abc");
        assert_eq!(transport.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn oversized_chunk_is_split_across_reads() {
        let transport = MockTransport::new();
        transport.push_bytes(b"abcdef");

        let mut buf = [0u8; 4];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abcd");
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ef");
    }

    #[tokio::test]
    async fn blocked_read_fails_on_close() {
        let transport = MockTransport::new();
        let reader = Arc::clone(&transport);
        let task = tokio::spawn(async move {
            let mut buf = [0u8; 8];
            reader.read(&mut buf).await
        });

        // Give the read a chance to park before closing.
        tokio::task::yield_now().await;
        transport.close().await.unwrap();

        assert!(matches!(task.await.unwrap(), Err(Error::Closed)));
    }

    #[tokio::test]
    async fn writes_are_recorded_and_refused_after_close() {
        let transport = MockTransport::new();
        transport.write_all(b"FEED_NOW:5\n").await.unwrap();
        assert_eq!(transport.written(), vec![b"FEED_NOW:5\n".to_vec()]);

        transport.close().await.unwrap();
        assert!(matches!(
            transport.write_all(b"x").await,
            Err(Error::Closed)
        ));
        assert_eq!(transport.write_count(), 1);
    }

    #[tokio::test]
    async fn connector_failure_injection() {
        let transport = MockTransport::new();
        let connector = MockConnector::with_transport(transport).failing_first(2);

        assert!(connector.connect("feeder").await.is_err());
        assert!(connector.connect("feeder").await.is_err());
        assert!(connector.connect("feeder").await.is_ok());
        assert_eq!(connector.attempts(), 3);

        // The queue is exhausted now.
        assert!(connector.connect("feeder").await.is_err());
    }
}
