//! Core types for the FeedFlow line protocol.
//!
//! The feeder emits newline-terminated ASCII frames of two shapes:
//!
//! - Telemetry: `<temperature>,<weight>,<servo>,<feeding>` (4-field CSV)
//! - Status: a single bare token such as `FEEDING_DONE`
//!
//! [`ParsedFrame::classify`] is the single entry point for turning a
//! trimmed frame into a typed value. Frames that fit neither shape are
//! classified as [`ParsedFrame::Unparseable`] so a misbehaving device can
//! never take the reader loop down.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Number of fields in a telemetry frame.
pub const TELEMETRY_FIELDS: usize = 4;

/// Wire prefix of the feed command.
pub const FEED_NOW_PREFIX: &str = "FEED_NOW";

/// Status tokens the feeder firmware is known to emit.
///
/// The device vocabulary is open: unknown tokens are still valid status
/// events and are forwarded verbatim.
pub mod tokens {
    /// The auger started dispensing.
    pub const FEEDING_STARTED: &str = "FEEDING_STARTED";
    /// The requested amount was dispensed.
    pub const FEEDING_DONE: &str = "FEEDING_DONE";
    /// Dispensing aborted before the target weight was reached.
    pub const FEED_TIMEOUT: &str = "FEED_TIMEOUT";
}

/// One telemetry sample from the feeder.
///
/// Produced only by [`Reading::from_csv`]; immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Water temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Remaining feed in the hopper, in kilograms.
    pub weight_kg: f64,
    /// Dispenser servo position in degrees.
    pub servo_position: i32,
    /// Whether the feeder is currently dispensing.
    pub feeding_active: bool,
    /// Timestamp when the reading was captured.
    ///
    /// The parser leaves this as `None`; the link layer stamps it when the
    /// frame arrives off the wire.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub captured_at: Option<time::OffsetDateTime>,
}

impl Reading {
    /// Parse a `Reading` from a 4-field CSV telemetry frame.
    ///
    /// The field layout is:
    /// - field 0: temperature in °C (float)
    /// - field 1: hopper weight in kg (float)
    /// - field 2: servo position in degrees (integer)
    /// - field 3: feeding-active flag, `"1"` for active, anything else idle
    ///
    /// Fields are trimmed individually, so `"26.5, 42.0, 90, 1"` parses the
    /// same as the canonical `"26.5,42.0,90,1"`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyFrame`] when the frame is blank,
    /// [`ParseError::FieldCount`] when it does not have exactly
    /// [`TELEMETRY_FIELDS`] fields, and [`ParseError::InvalidField`] when a
    /// numeric field fails to parse.
    #[must_use = "parsing returns a Result that should be handled"]
    pub fn from_csv(frame: &str) -> Result<Self, ParseError> {
        if frame.trim().is_empty() {
            return Err(ParseError::EmptyFrame);
        }
        let fields: Vec<&str> = frame.split(',').collect();
        if fields.len() != TELEMETRY_FIELDS {
            return Err(ParseError::FieldCount {
                expected: TELEMETRY_FIELDS,
                actual: fields.len(),
            });
        }

        let temperature_c = parse_field::<f64>(fields[0], "temperature")?;
        let weight_kg = parse_field::<f64>(fields[1], "weight")?;
        let servo_position = parse_field::<i32>(fields[2], "servo")?;
        let feeding_active = fields[3].trim() == "1";

        Ok(Reading {
            temperature_c,
            weight_kg,
            servo_position,
            feeding_active,
            captured_at: None,
        })
    }

    /// Return a copy of this reading stamped with a capture time.
    #[must_use]
    pub fn captured_at(mut self, at: time::OffsetDateTime) -> Self {
        self.captured_at = Some(at);
        self
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, field: &'static str) -> Result<T, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidField {
        field,
        value: raw.trim().to_string(),
    })
}

/// Coarse classification of a status token.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new kinds as
/// firmware revisions introduce tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum StatusKind {
    /// Dispensing started.
    FeedingStarted,
    /// Dispensing completed.
    FeedingDone,
    /// Dispensing timed out.
    FeedTimeout,
    /// A token this library does not recognize.
    Other,
}

/// A single-token device event without numeric payload.
///
/// The raw token is kept verbatim in [`code`](Self::code); [`kind`](Self::kind)
/// offers a lossy classification for callers that only care about the
/// well-known tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatusEvent {
    /// The device-emitted token, exactly as received.
    pub code: String,
}

impl StatusEvent {
    /// Create a status event from a token.
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Classify the token.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedflow_types::{StatusEvent, StatusKind};
    ///
    /// assert_eq!(StatusEvent::new("FEEDING_DONE").kind(), StatusKind::FeedingDone);
    /// assert_eq!(StatusEvent::new("HOPPER_JAM").kind(), StatusKind::Other);
    /// ```
    #[must_use]
    pub fn kind(&self) -> StatusKind {
        match self.code.as_str() {
            tokens::FEEDING_STARTED => StatusKind::FeedingStarted,
            tokens::FEEDING_DONE => StatusKind::FeedingDone,
            tokens::FEED_TIMEOUT => StatusKind::FeedTimeout,
            _ => StatusKind::Other,
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// A request to dispense a quantity of feed.
///
/// Serialized as `FEED_NOW:<amount>`; the line terminator is the
/// transport layer's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeedCommand {
    amount_kg: f64,
}

impl FeedCommand {
    /// Create a feed command for the given amount in kilograms.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAmount`] unless the amount is finite
    /// and strictly positive.
    pub fn new(amount_kg: f64) -> Result<Self, ParseError> {
        if !amount_kg.is_finite() || amount_kg <= 0.0 {
            return Err(ParseError::InvalidAmount(amount_kg));
        }
        Ok(Self { amount_kg })
    }

    /// The amount to dispense, in kilograms.
    #[must_use]
    pub fn amount_kg(&self) -> f64 {
        self.amount_kg
    }

    /// Serialize to the wire format, without the trailing newline.
    ///
    /// Integral amounts are printed without a fractional part, matching
    /// what the firmware expects from the companion app.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedflow_types::FeedCommand;
    ///
    /// assert_eq!(FeedCommand::new(25.0).unwrap().to_wire(), "FEED_NOW:25");
    /// assert_eq!(FeedCommand::new(2.5).unwrap().to_wire(), "FEED_NOW:2.5");
    /// ```
    #[must_use]
    pub fn to_wire(&self) -> String {
        if self.amount_kg.fract() == 0.0 {
            format!("{}:{}", FEED_NOW_PREFIX, self.amount_kg as i64)
        } else {
            format!("{}:{}", FEED_NOW_PREFIX, self.amount_kg)
        }
    }
}

impl fmt::Display for FeedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.amount_kg)
    }
}

/// Result of classifying one trimmed frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedFrame {
    /// A 4-field telemetry sample.
    Reading(Reading),
    /// A bare status token.
    Status(StatusEvent),
    /// A frame that fit neither shape; dropped by the link layer.
    Unparseable,
}

impl ParsedFrame {
    /// Classify and decode one frame.
    ///
    /// The classification rule: a frame containing a comma is telemetry,
    /// anything else is a status token. Telemetry frames that fail to
    /// decode are `Unparseable`; status tokens are never rejected because
    /// the device vocabulary is open.
    ///
    /// # Examples
    ///
    /// ```
    /// use feedflow_types::{ParsedFrame, StatusEvent};
    ///
    /// assert!(matches!(ParsedFrame::classify("26.5,42.0,90,1"), ParsedFrame::Reading(_)));
    /// assert_eq!(
    ///     ParsedFrame::classify("FEEDING_DONE"),
    ///     ParsedFrame::Status(StatusEvent::new("FEEDING_DONE")),
    /// );
    /// assert_eq!(ParsedFrame::classify("one,two"), ParsedFrame::Unparseable);
    /// ```
    #[must_use]
    pub fn classify(frame: &str) -> Self {
        let frame = frame.trim();
        if frame.is_empty() {
            return ParsedFrame::Unparseable;
        }
        if frame.contains(',') {
            match Reading::from_csv(frame) {
                Ok(reading) => ParsedFrame::Reading(reading),
                Err(_) => ParsedFrame::Unparseable,
            }
        } else {
            ParsedFrame::Status(StatusEvent::new(frame))
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Classifying arbitrary frame text should never panic.
        /// It may yield Unparseable, but must always be safe.
        #[test]
        fn classify_never_panics(frame: String) {
            let _ = ParsedFrame::classify(&frame);
        }

        /// Every well-formed 4-field frame decodes to exactly its fields.
        #[test]
        fn valid_telemetry_round_trips(
            t in -50.0..80.0f64,
            w in 0.0..500.0f64,
            s in -360..=360i32,
            f in 0..=1u8,
        ) {
            let frame = format!("{t},{w},{s},{f}");
            match ParsedFrame::classify(&frame) {
                ParsedFrame::Reading(r) => {
                    prop_assert_eq!(r.temperature_c, t);
                    prop_assert_eq!(r.weight_kg, w);
                    prop_assert_eq!(r.servo_position, s);
                    prop_assert_eq!(r.feeding_active, f == 1);
                }
                other => prop_assert!(false, "expected Reading, got {:?}", other),
            }
        }

        /// Any comma-free token is a status event, forwarded verbatim.
        #[test]
        fn comma_free_tokens_pass_through(token in "[A-Z0-9_]{1,24}") {
            match ParsedFrame::classify(&token) {
                ParsedFrame::Status(s) => prop_assert_eq!(s.code, token),
                other => prop_assert!(false, "expected Status, got {:?}", other),
            }
        }

        /// Numeric frames with the wrong field count are dropped, not
        /// misread as readings or status tokens.
        #[test]
        fn wrong_arity_telemetry_is_unparseable(
            fields in proptest::collection::vec(-100.0..100.0f64, 2..8)
                .prop_filter("exactly 4 fields is a valid frame", |v| v.len() != 4),
        ) {
            let frame = fields
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            prop_assert_eq!(ParsedFrame::classify(&frame), ParsedFrame::Unparseable);
        }
    }
}
