//! Outbound command channel.
//!
//! Commands share the transport with the reader loop (writes and reads are
//! independent directions of the same socket), but must never race a
//! `disconnect()` closing that transport. [`CommandChannel::send`] holds
//! the link's state lock shared for the whole check-then-write, and
//! `disconnect()` takes it exclusively, so a write either completes on an
//! open transport or observes `Disconnected` and touches nothing.

use std::sync::Arc;

use tracing::debug;

use feedflow_types::FeedCommand;

use crate::error::{Error, Result};
use crate::link::{ConnectionState, LinkInner};

/// Writer half of a feeder link.
///
/// Obtained from [`FeederLink::commands`](crate::link::FeederLink::commands);
/// cheap to clone and safe to use from any task.
#[derive(Clone)]
pub struct CommandChannel {
    inner: Arc<LinkInner>,
}

impl CommandChannel {
    pub(crate) fn new(inner: Arc<LinkInner>) -> Self {
        Self { inner }
    }

    /// Send a feed command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] without touching the transport when
    /// the link is not `Connected`; I/O errors from the write are passed
    /// through.
    pub async fn send(&self, command: &FeedCommand) -> Result<()> {
        self.send_raw(&command.to_wire()).await
    }

    /// Send one raw command line.
    ///
    /// The line is written as UTF-8 followed by the `\n` terminator. No
    /// escaping is performed; callers own the wire format of anything sent
    /// through here.
    pub async fn send_raw(&self, line: &str) -> Result<()> {
        let shared = self.inner.shared.read().await;
        if shared.state != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }
        let transport = shared.transport.as_ref().ok_or(Error::NotConnected)?;

        let mut wire = String::with_capacity(line.len() + 1);
        wire.push_str(line);
        wire.push('\n');

        debug!(command = %line, "sending command");
        transport.write_all(wire.as_bytes()).await
    }
}

impl std::fmt::Debug for CommandChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandChannel").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::time::sleep;

    use crate::events::EventSink;
    use crate::link::FeederLink;
    use crate::mock::{MockConnector, MockTransport, RecordingSink};

    async fn connected_link() -> (FeederLink, Arc<MockTransport>) {
        let transport = MockTransport::new();
        let sink = RecordingSink::new();
        let link = FeederLink::new(
            MockConnector::with_transport(Arc::clone(&transport)),
            sink as Arc<dyn EventSink>,
        );
        link.connect("AA:BB:CC:DD:EE:FF").await.unwrap();
        for _ in 0..200 {
            if link.is_connected().await {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        assert!(link.is_connected().await);
        (link, transport)
    }

    #[tokio::test]
    async fn send_while_disconnected_touches_nothing() {
        let transport = MockTransport::new();
        let sink = RecordingSink::new();
        let link = FeederLink::new(
            MockConnector::with_transport(Arc::clone(&transport)),
            sink as Arc<dyn EventSink>,
        );

        let command = FeedCommand::new(5.0).unwrap();
        let err = link.commands().send(&command).await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
        assert_eq!(transport.write_count(), 0);
    }

    #[tokio::test]
    async fn send_writes_newline_terminated_ascii() {
        let (link, transport) = connected_link().await;
        let commands = link.commands();

        commands.send(&FeedCommand::new(2.5).unwrap()).await.unwrap();
        commands.send(&FeedCommand::new(25.0).unwrap()).await.unwrap();
        commands.send_raw("PING").await.unwrap();

        assert_eq!(
            transport.written(),
            vec![
                b"FEED_NOW:2.5\n".to_vec(),
                b"FEED_NOW:25\n".to_vec(),
                b"PING\n".to_vec(),
            ]
        );
    }

    #[tokio::test]
    async fn send_after_disconnect_is_rejected() {
        let (link, transport) = connected_link().await;
        let commands = link.commands();

        link.disconnect().await;
        let err = commands
            .send(&FeedCommand::new(1.0).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));
        assert_eq!(transport.write_count(), 0);
    }

    #[tokio::test]
    async fn channel_outlives_reconnects() {
        let first = MockTransport::new();
        first.push_eof();
        let second = MockTransport::new();

        let sink = RecordingSink::new();
        let link = FeederLink::new(
            MockConnector::with_transports(vec![first, Arc::clone(&second)]),
            sink.clone() as Arc<dyn EventSink>,
        );
        let commands = link.commands();

        link.connect("feeder").await.unwrap();
        for _ in 0..200 {
            if sink.disconnected_count() == 1 {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(sink.disconnected_count(), 1);

        link.connect("feeder").await.unwrap();
        for _ in 0..200 {
            if link.is_connected().await {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }

        commands.send_raw("PING").await.unwrap();
        assert_eq!(second.written(), vec![b"PING\n".to_vec()]);
    }
}
