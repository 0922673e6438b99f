//! Platform-agnostic types for the FeedFlow feeder line protocol.
//!
//! This crate provides the shared wire types used by the link layer and
//! any embedding application. It contains no I/O and no async runtime, so
//! it can be reused by simulators and test harnesses.
//!
//! # Features
//!
//! - Telemetry and status frame types with CSV decoding
//! - Outbound command serialization
//! - Error types for frame parsing
//!
//! # Example
//!
//! ```
//! use feedflow_types::{ParsedFrame, Reading};
//!
//! match ParsedFrame::classify("26.5,42.0,90,1") {
//!     ParsedFrame::Reading(r) => assert!(r.feeding_active),
//!     _ => unreachable!(),
//! }
//! ```

pub mod error;
pub mod types;

pub use error::ParseError;
pub use types::{
    FeedCommand, ParsedFrame, Reading, StatusEvent, StatusKind, FEED_NOW_PREFIX, TELEMETRY_FIELDS,
    tokens,
};
