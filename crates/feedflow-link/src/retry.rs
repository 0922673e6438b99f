//! Retry policy for connection attempts.
//!
//! The feeder firmware needs about a second to recover between RFCOMM
//! accept attempts, so the default profile is the one the companion app
//! shipped with: three retries with a fixed one-second delay. Exponential
//! backoff and jitter are available through the same config for
//! deployments where the fixed delay proves too aggressive.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use feedflow_link::RetryConfig;
//!
//! // The stock profile: 3 retries, fixed 1 s apart.
//! let config = RetryConfig::default();
//! assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
//! assert_eq!(config.delay_for_attempt(2), Duration::from_secs(1));
//!
//! // Opt in to backoff for flaky RF environments.
//! let config = RetryConfig::exponential();
//! assert!(config.delay_for_attempt(2) > config.delay_for_attempt(0));
//! ```

use std::time::Duration;

use rand::Rng;

use crate::error::{Error, Result};

/// Configuration for connection retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt (0 means a
    /// single attempt).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the delay between retries when backoff is enabled.
    pub max_delay: Duration,
    /// Backoff multiplier (1.0 = fixed delay, 2.0 = double each time).
    pub backoff_multiplier: f64,
    /// Whether to add up to 25% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a config with a custom retry count and default delays.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// No retries: a single attempt, then failure.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Fixed delay between attempts.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            backoff_multiplier: 1.0,
            ..Default::default()
        }
    }

    /// Exponential backoff with jitter, for noisy RF environments.
    pub fn exponential() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    // ==================== Builder Methods ====================

    /// Set maximum number of retries.
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the delay cap.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Validate the config.
    ///
    /// Checks that `backoff_multiplier` is >= 1.0 and `max_delay` is not
    /// below `initial_delay`.
    pub fn validate(&self) -> Result<()> {
        if self.backoff_multiplier < 1.0 {
            return Err(Error::invalid_config("backoff_multiplier must be >= 1.0"));
        }
        if self.max_delay < self.initial_delay {
            return Err(Error::invalid_config("max_delay must be >= initial_delay"));
        }
        Ok(())
    }

    /// Calculate the delay before retry number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let final_delay = if self.jitter {
            capped * (1.0 + rand::rng().random::<f64>() * 0.25)
        } else {
            capped
        };

        Duration::from_secs_f64(final_delay)
    }
}
