//! Water temperature and feed level banding.
//!
//! The companion UI colors its gauges from these bands; keeping the
//! evaluation here means every frontend agrees on what "optimal" means
//! for the stock being fed.
//!
//! # Example
//!
//! ```
//! use feedflow_link::{Thresholds, WaterTempLevel};
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.evaluate_temperature(27.0), WaterTempLevel::Optimal);
//! assert_eq!(thresholds.evaluate_temperature(34.5), WaterTempLevel::Critical);
//! ```

use serde::{Deserialize, Serialize};

use feedflow_types::Reading;

/// Water temperature band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterTempLevel {
    /// Below the optimal range; feeding response slows down.
    TooCold,
    /// Within the optimal range for warm-water stock.
    Optimal,
    /// Above optimal; watch oxygen levels.
    AboveOptimal,
    /// Dangerously hot.
    Critical,
}

impl WaterTempLevel {
    /// Human-readable description of the band.
    pub fn description(&self) -> &'static str {
        match self {
            WaterTempLevel::TooCold => "Too Cold",
            WaterTempLevel::Optimal => "Optimal",
            WaterTempLevel::AboveOptimal => "Above Optimal",
            WaterTempLevel::Critical => "Critical - Too Hot",
        }
    }
}

/// Hopper feed level band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedLevel {
    /// Enough feed for normal operation.
    Sufficient,
    /// Running low; plan a refill.
    RefillSoon,
    /// Nearly empty.
    Critical,
}

impl FeedLevel {
    /// Human-readable description of the band.
    pub fn description(&self) -> &'static str {
        match self {
            FeedLevel::Sufficient => "Sufficient",
            FeedLevel::RefillSoon => "Refill Soon",
            FeedLevel::Critical => "Critical - Refill Now",
        }
    }
}

/// Configurable band boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Lower bound of the optimal temperature range, °C.
    pub temp_optimal_min: f64,
    /// Upper bound of the optimal temperature range, °C.
    pub temp_optimal_max: f64,
    /// Upper bound of the above-optimal range, °C; hotter is critical.
    pub temp_above_max: f64,
    /// Minimum hopper weight considered sufficient, kg.
    pub feed_sufficient_min: f64,
    /// Minimum hopper weight before the refill warning, kg.
    pub feed_refill_min: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_optimal_min: 26.0,
            temp_optimal_max: 30.0,
            temp_above_max: 33.0,
            feed_sufficient_min: 5.0,
            feed_refill_min: 2.0,
        }
    }
}

/// Threshold evaluator for feeder readings.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create an evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Band a water temperature.
    pub fn evaluate_temperature(&self, temperature_c: f64) -> WaterTempLevel {
        if temperature_c < self.config.temp_optimal_min {
            WaterTempLevel::TooCold
        } else if temperature_c <= self.config.temp_optimal_max {
            WaterTempLevel::Optimal
        } else if temperature_c <= self.config.temp_above_max {
            WaterTempLevel::AboveOptimal
        } else {
            WaterTempLevel::Critical
        }
    }

    /// Band a hopper weight.
    pub fn evaluate_feed_level(&self, weight_kg: f64) -> FeedLevel {
        if weight_kg >= self.config.feed_sufficient_min {
            FeedLevel::Sufficient
        } else if weight_kg >= self.config.feed_refill_min {
            FeedLevel::RefillSoon
        } else {
            FeedLevel::Critical
        }
    }

    /// Band both axes of a reading.
    pub fn evaluate_reading(&self, reading: &Reading) -> (WaterTempLevel, FeedLevel) {
        (
            self.evaluate_temperature(reading.temperature_c),
            self.evaluate_feed_level(reading.weight_kg),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_temperature_bands() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate_temperature(20.0), WaterTempLevel::TooCold);
        assert_eq!(t.evaluate_temperature(25.9), WaterTempLevel::TooCold);
        assert_eq!(t.evaluate_temperature(26.0), WaterTempLevel::Optimal);
        assert_eq!(t.evaluate_temperature(30.0), WaterTempLevel::Optimal);
        assert_eq!(t.evaluate_temperature(30.1), WaterTempLevel::AboveOptimal);
        assert_eq!(t.evaluate_temperature(33.0), WaterTempLevel::AboveOptimal);
        assert_eq!(t.evaluate_temperature(33.1), WaterTempLevel::Critical);
    }

    #[test]
    fn default_feed_bands() {
        let t = Thresholds::default();
        assert_eq!(t.evaluate_feed_level(42.0), FeedLevel::Sufficient);
        assert_eq!(t.evaluate_feed_level(5.0), FeedLevel::Sufficient);
        assert_eq!(t.evaluate_feed_level(4.9), FeedLevel::RefillSoon);
        assert_eq!(t.evaluate_feed_level(2.0), FeedLevel::RefillSoon);
        assert_eq!(t.evaluate_feed_level(1.9), FeedLevel::Critical);
        assert_eq!(t.evaluate_feed_level(0.0), FeedLevel::Critical);
    }

    #[test]
    fn evaluate_reading_covers_both_axes() {
        let t = Thresholds::default();
        let reading = feedflow_types::Reading::from_csv("28.0,1.5,90,0").unwrap();
        assert_eq!(
            t.evaluate_reading(&reading),
            (WaterTempLevel::Optimal, FeedLevel::Critical)
        );
    }

    #[test]
    fn custom_bands() {
        let t = Thresholds::new(ThresholdConfig {
            temp_optimal_min: 10.0,
            temp_optimal_max: 15.0,
            temp_above_max: 18.0,
            feed_sufficient_min: 20.0,
            feed_refill_min: 10.0,
        });
        assert_eq!(t.evaluate_temperature(12.0), WaterTempLevel::Optimal);
        assert_eq!(t.evaluate_feed_level(15.0), FeedLevel::RefillSoon);
    }

    #[test]
    fn descriptions() {
        assert_eq!(WaterTempLevel::Optimal.description(), "Optimal");
        assert!(FeedLevel::Critical.description().contains("Refill Now"));
    }
}
