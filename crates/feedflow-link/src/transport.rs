//! Transport abstraction over the feeder's byte channel.
//!
//! The feeder speaks a newline-delimited ASCII protocol over whatever byte
//! stream happens to carry it: the RFCOMM socket of the companion app, a
//! TCP bridge, or a physical UART. The [`Transport`] trait captures the
//! minimal contract the link layer needs (`read` / `write_all` / `close`),
//! and [`Connector`] captures how one is established from an opaque peer
//! address. The address is never interpreted here; its format is a
//! per-implementation concern.
//!
//! [`TcpTransport`] is the in-tree implementation, used by the CLI and by
//! feeder simulators. RFCOMM and UART transports can be provided by
//! embedders without touching the rest of the crate.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::error::{ConnectionFailureReason, Error, Result};

/// A connected byte channel to a feeder.
///
/// All methods take `&self` so one transport can be shared between the
/// reader task and command writers behind an `Arc`. Implementations must
/// make [`close`](Self::close) callable from any task at any time; after
/// it returns, in-flight and subsequent reads and writes fail with
/// [`Error::Closed`] or an I/O error rather than blocking forever.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Read up to `buf.len()` bytes. Returns `Ok(0)` on end of stream.
    async fn read(&self, buf: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer to the outbound side.
    async fn write_all(&self, buf: &[u8]) -> Result<()>;

    /// Close both directions and release the underlying channel.
    ///
    /// Closing is idempotent; errors from the underlying channel are
    /// ignored by callers per the link contract.
    async fn close(&self) -> Result<()>;
}

/// Establishes a [`Transport`] to an opaque peer address.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the peer identified by `address`.
    async fn connect(&self, address: &str) -> Result<Arc<dyn Transport>>;
}

#[async_trait]
impl<C: Connector + ?Sized> Connector for Arc<C> {
    async fn connect(&self, address: &str) -> Result<Arc<dyn Transport>> {
        (**self).connect(address).await
    }
}

/// TCP implementation of [`Transport`].
///
/// The split halves live behind separate locks so reads and writes, which
/// are independent directions of the same socket, never contend with each
/// other.
pub struct TcpTransport {
    reader: Mutex<Option<OwnedReadHalf>>,
    writer: Mutex<Option<OwnedWriteHalf>>,
}

impl TcpTransport {
    /// Wrap an already-connected stream.
    pub fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: Mutex::new(Some(read_half)),
            writer: Mutex::new(Some(write_half)),
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let mut guard = self.reader.lock().await;
        let half = guard.as_mut().ok_or(Error::Closed)?;
        let n = half.read(buf).await?;
        Ok(n)
    }

    async fn write_all(&self, buf: &[u8]) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let half = guard.as_mut().ok_or(Error::Closed)?;
        half.write_all(buf).await?;
        half.flush().await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        // Shut the write side down first so the peer sees a clean FIN, then
        // drop both halves. The read half may still be borrowed by a read
        // in flight; the link cancels the reader task before closing, so
        // this lock is uncontended by the time we get here.
        if let Some(mut half) = self.writer.lock().await.take() {
            let _ = half.shutdown().await;
        }
        self.reader.lock().await.take();
        Ok(())
    }
}

/// [`Connector`] dialing feeders over TCP.
///
/// The address is anything `TcpStream::connect` accepts, e.g.
/// `"192.168.4.1:3333"` for an ESP32 serial-over-WiFi bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    /// Create a TCP connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn Transport>> {
        let stream = TcpStream::connect(address).await.map_err(|e| {
            Error::connection_failed(
                Some(address.to_string()),
                ConnectionFailureReason::from_io(&e),
            )
        })?;
        Ok(Arc::new(TcpTransport::new(stream)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    #[tokio::test]
    async fn tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut peer, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let n = peer.read(&mut buf).await.unwrap();
            peer.write_all(&buf[..n]).await.unwrap();
        });

        let transport = TcpConnector::new().connect(&addr.to_string()).await.unwrap();
        transport.write_all(b"FEED_NOW:2\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = transport.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"FEED_NOW:2\n");

        transport.close().await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn operations_after_close_fail() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap() });

        let transport = TcpConnector::new().connect(&addr.to_string()).await.unwrap();
        transport.close().await.unwrap();
        // Closing again is a no-op.
        transport.close().await.unwrap();

        assert!(matches!(
            transport.write_all(b"x").await,
            Err(Error::Closed)
        ));
        let mut buf = [0u8; 8];
        assert!(matches!(transport.read(&mut buf).await, Err(Error::Closed)));
        drop(accept);
    }

    #[tokio::test]
    async fn connect_to_unreachable_peer_fails() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = match TcpConnector::new().connect(&addr.to_string()).await {
            Ok(_) => panic!("expected connection failure"),
            Err(e) => e,
        };
        assert!(matches!(err, Error::ConnectionFailed { .. }));
    }
}
