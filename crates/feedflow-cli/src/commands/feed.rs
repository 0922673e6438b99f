//! Dispense feed and wait for the feeder to confirm.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::time::timeout;

use feedflow_link::{ChannelSink, FeederLink, LinkEvent, TcpConnector};
use feedflow_types::{FeedCommand, StatusKind};

use crate::config::Config;

pub async fn run(address: &str, config: &Config, amount: f64, confirm_within: Duration) -> Result<()> {
    let command = FeedCommand::new(amount).context("invalid feed amount")?;

    let sink = Arc::new(ChannelSink::default());
    let mut events = sink.subscribe();
    let link = FeederLink::with_config(TcpConnector::new(), sink, config.retry_config());

    link.connect(address).await?;
    super::await_connected(&link, &mut events).await?;

    link.commands().send(&command).await?;
    println!("Requested feed of {command}, waiting for the feeder...");

    let outcome = timeout(confirm_within, async {
        loop {
            match events.recv().await {
                Ok(LinkEvent::Status { status }) => match status.kind() {
                    StatusKind::FeedingStarted => println!("Feeder started dispensing."),
                    StatusKind::FeedingDone => return Ok(()),
                    StatusKind::FeedTimeout => bail!("feeder timed out before dispensing finished"),
                    _ => {}
                },
                Ok(LinkEvent::Disconnected) => bail!("feeder disconnected before confirming"),
                Ok(_) => {}
                Err(_) => bail!("event stream ended before the feeder confirmed"),
            }
        }
    })
    .await;

    link.disconnect().await;

    match outcome {
        Ok(result) => result.map(|()| println!("Feed of {command} dispensed.")),
        Err(_) => bail!("no confirmation from the feeder within {confirm_within:?}"),
    }
}
