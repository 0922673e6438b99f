//! CLI subcommands.

pub mod feed;
pub mod status;
pub mod watch;

use std::time::Duration;

use anyhow::{Result, bail};
use tokio::time::sleep;

use feedflow_link::{EventReceiver, FeederLink, LinkEvent};

/// Wait until the link reports `Connected`, surfacing a connection
/// failure from the event stream as an error.
pub(crate) async fn await_connected(link: &FeederLink, events: &mut EventReceiver) -> Result<()> {
    loop {
        if link.is_connected().await {
            return Ok(());
        }
        tokio::select! {
            event = events.recv() => {
                if let Ok(LinkEvent::ConnectionFailed { error }) = event {
                    bail!("connection failed: {error}");
                }
            }
            _ = sleep(Duration::from_millis(50)) => {}
        }
    }
}
