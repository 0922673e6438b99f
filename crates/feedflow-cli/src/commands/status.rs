//! Read one telemetry snapshot and print it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio::time::timeout;

use feedflow_link::{ChannelSink, FeederLink, LinkEvent, TcpConnector};

use crate::config::Config;
use crate::format;

pub async fn run(address: &str, config: &Config, output: &str) -> Result<()> {
    let sink = Arc::new(ChannelSink::default());
    let mut events = sink.subscribe();
    let link = FeederLink::with_config(TcpConnector::new(), sink, config.retry_config());

    link.connect(address).await?;
    super::await_connected(&link, &mut events).await?;

    let reading = timeout(Duration::from_secs(30), async {
        loop {
            match events.recv().await {
                Ok(LinkEvent::Reading { reading }) => return Ok(reading),
                Ok(LinkEvent::Disconnected) => bail!("feeder disconnected before sending telemetry"),
                Ok(_) => {}
                Err(_) => bail!("event stream ended before telemetry arrived"),
            }
        }
    })
    .await;

    link.disconnect().await;

    let reading = match reading {
        Ok(result) => result?,
        Err(_) => bail!("no telemetry from the feeder within 30s"),
    };

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&reading)?),
        _ => {
            let thresholds = config.thresholds();
            println!("{}", format::reading_line(&reading, &thresholds));
        }
    }
    Ok(())
}
