//! Accumulation of dispensed-feed totals.
//!
//! Every confirmed feed is recorded against the day it happened: a
//! per-day running total that resets at the first feed of a new day, an
//! all-time total, and a count of days with at least one feed. Embedders
//! persist and restore the ledger (it is serializable) wherever their
//! stats live.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// One dispensed feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedRecord {
    /// Amount dispensed, in kilograms.
    pub amount_kg: f64,
    /// When the feed happened.
    pub at: OffsetDateTime,
}

/// Running totals of dispensed feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedLedger {
    today_kg: f64,
    total_kg: f64,
    days_active: u32,
    current_day: Option<Date>,
    last_feed: Option<FeedRecord>,
}

impl FeedLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispensed feed.
    ///
    /// The timestamp is supplied by the caller so restored ledgers and
    /// tests replay deterministically. A feed on a calendar day different
    /// from the previous one rolls the daily total over.
    pub fn record(&mut self, amount_kg: f64, at: OffsetDateTime) {
        let day = at.date();
        if self.current_day != Some(day) {
            self.today_kg = 0.0;
            self.days_active += 1;
            self.current_day = Some(day);
        }
        self.today_kg += amount_kg;
        self.total_kg += amount_kg;
        self.last_feed = Some(FeedRecord { amount_kg, at });
    }

    /// Feed dispensed on the most recent active day, in kilograms.
    pub fn today_kg(&self) -> f64 {
        self.today_kg
    }

    /// All-time dispensed feed, in kilograms.
    pub fn total_kg(&self) -> f64 {
        self.total_kg
    }

    /// Number of days with at least one feed.
    pub fn days_active(&self) -> u32 {
        self.days_active
    }

    /// Average feed per active day, in kilograms.
    pub fn daily_average_kg(&self) -> f64 {
        if self.days_active == 0 {
            0.0
        } else {
            self.total_kg / f64::from(self.days_active)
        }
    }

    /// The most recent feed, if any.
    pub fn last_feed(&self) -> Option<&FeedRecord> {
        self.last_feed.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use time::macros::datetime;

    #[test]
    fn empty_ledger() {
        let ledger = FeedLedger::new();
        assert_eq!(ledger.today_kg(), 0.0);
        assert_eq!(ledger.total_kg(), 0.0);
        assert_eq!(ledger.days_active(), 0);
        assert_eq!(ledger.daily_average_kg(), 0.0);
        assert!(ledger.last_feed().is_none());
    }

    #[test]
    fn same_day_feeds_accumulate() {
        let mut ledger = FeedLedger::new();
        ledger.record(2.0, datetime!(2026-08-05 06:00 UTC));
        ledger.record(3.0, datetime!(2026-08-05 18:00 UTC));

        assert_eq!(ledger.today_kg(), 5.0);
        assert_eq!(ledger.total_kg(), 5.0);
        assert_eq!(ledger.days_active(), 1);
    }

    #[test]
    fn day_rollover_resets_the_daily_total() {
        let mut ledger = FeedLedger::new();
        ledger.record(2.0, datetime!(2026-08-05 06:00 UTC));
        ledger.record(3.0, datetime!(2026-08-06 06:00 UTC));

        assert_eq!(ledger.today_kg(), 3.0);
        assert_eq!(ledger.total_kg(), 5.0);
        assert_eq!(ledger.days_active(), 2);
        assert_eq!(ledger.daily_average_kg(), 2.5);
    }

    #[test]
    fn days_without_feeds_do_not_count() {
        let mut ledger = FeedLedger::new();
        ledger.record(1.0, datetime!(2026-08-01 12:00 UTC));
        ledger.record(1.0, datetime!(2026-08-10 12:00 UTC));

        assert_eq!(ledger.days_active(), 2);
        assert_eq!(ledger.daily_average_kg(), 1.0);
    }

    #[test]
    fn last_feed_is_tracked() {
        let mut ledger = FeedLedger::new();
        let at = datetime!(2026-08-05 06:30 UTC);
        ledger.record(2.5, at);

        let last = ledger.last_feed().unwrap();
        assert_eq!(last.amount_kg, 2.5);
        assert_eq!(last.at, at);
    }

    #[test]
    fn ledger_round_trips_through_serde() {
        let mut ledger = FeedLedger::new();
        ledger.record(2.0, datetime!(2026-08-05 06:00 UTC));

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: FeedLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.today_kg(), 2.0);
        assert_eq!(restored.days_active(), 1);
    }
}
