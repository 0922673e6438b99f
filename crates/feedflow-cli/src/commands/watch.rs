//! Stream live telemetry to stdout until interrupted.

use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use feedflow_link::{ChannelSink, FeederLink, LinkEvent, TcpConnector};

use crate::config::Config;
use crate::format;

pub async fn run(address: &str, config: &Config) -> Result<()> {
    let sink = Arc::new(ChannelSink::default());
    let mut events = sink.subscribe();
    let link = FeederLink::with_config(TcpConnector::new(), sink, config.retry_config());
    let thresholds = config.thresholds();

    link.connect(address).await?;
    println!("Connecting to {address} (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                link.disconnect().await;
                println!("Stopped.");
                return Ok(());
            }
            event = events.recv() => match event {
                Ok(LinkEvent::Reading { reading }) => {
                    println!("{}", format::reading_line(&reading, &thresholds));
                }
                Ok(LinkEvent::Status { status }) => {
                    println!("{}", format::status_line(&status));
                }
                Ok(LinkEvent::ConnectionFailed { error }) => {
                    bail!("connection failed: {error}");
                }
                Ok(LinkEvent::Disconnected) => {
                    println!("Feeder disconnected.");
                    return Ok(());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged, some frames not shown");
                }
                Err(RecvError::Closed) => return Ok(()),
            }
        }
    }
}
