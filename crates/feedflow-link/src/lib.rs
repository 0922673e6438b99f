//! Device link layer for FeedFlow aquaculture feeders.
//!
//! This crate maintains a serial connection to a feeder that streams
//! newline-terminated ASCII telemetry and accepts simple commands. It
//! owns the hard parts of that link: retrying failed connection attempts,
//! reassembling the raw byte stream into frames, decoding frames into
//! typed events without ever letting malformed input kill the link, and
//! serializing outbound commands against a concurrently-consumed socket.
//!
//! # Features
//!
//! - **Transport-agnostic**: the feeder's RFCOMM socket, a TCP bridge, or
//!   a UART all fit behind the [`Transport`] trait; TCP ships in-tree
//! - **Supervised connection lifecycle**: one state machine, bounded
//!   retries, at-most-once failure and disconnect notifications
//! - **Robust framing**: partial chunks reassembled, blank lines and
//!   unparseable frames dropped, the stream keeps going
//! - **Safe concurrent commands**: writes are gated on connection state
//!   and can never race a disconnect closing the socket
//! - **Banding and totals**: temperature/feed-level evaluation and a
//!   dispensed-feed ledger for the surrounding application
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use feedflow_link::{ChannelSink, FeederLink, LinkEvent, TcpConnector};
//! use feedflow_types::FeedCommand;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = Arc::new(ChannelSink::default());
//!     let mut events = sink.subscribe();
//!
//!     let link = FeederLink::new(TcpConnector::new(), sink);
//!     link.connect("192.168.4.1:3333").await?;
//!
//!     // React to telemetry as it arrives.
//!     while let Ok(event) = events.recv().await {
//!         match event {
//!             LinkEvent::Reading { reading } => {
//!                 println!("water {:.1} °C", reading.temperature_c);
//!             }
//!             LinkEvent::Disconnected => break,
//!             _ => {}
//!         }
//!     }
//!
//!     // Dispense from anywhere that holds the command channel.
//!     let commands = link.commands();
//!     commands.send(&FeedCommand::new(2.5)?).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod events;
pub mod framing;
pub mod ledger;
pub mod link;
pub mod mock;
pub mod retry;
pub mod thresholds;
pub mod transport;

pub use command::CommandChannel;
pub use error::{ConnectionFailureReason, Error, Result};
pub use events::{ChannelSink, EventReceiver, EventSender, EventSink, LinkEvent, NullSink};
pub use framing::FrameReader;
pub use ledger::{FeedLedger, FeedRecord};
pub use link::{ConnectionState, FeederLink, SharedLink};
pub use mock::{MockConnector, MockTransport, RecordingSink};
pub use retry::RetryConfig;
pub use thresholds::{FeedLevel, ThresholdConfig, Thresholds, WaterTempLevel};
pub use transport::{Connector, TcpConnector, TcpTransport, Transport};

// Re-export the wire types so most embedders need only this crate.
pub use feedflow_types as types;
pub use feedflow_types::{FeedCommand, ParsedFrame, Reading, StatusEvent, StatusKind};
