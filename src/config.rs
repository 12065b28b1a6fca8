use crate::error::Error;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tuning knobs of the pinch detector.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Squared distance below which two fingertips count as touching.
    pub pinch_distance_threshold: f64,
    /// Samples retained per finger.
    pub ring_capacity: usize,
    /// Samples a finger must have seen before it can take part in a pinch.
    pub min_history_for_judgment: usize,
    /// A finger updated within this window is considered present.
    pub liveness_window_ms: u64,
    /// Fingers not updated within this window are evicted.
    pub stale_eviction_ms: u64,
    /// Oldest retained samples inspected for the convergence trend.
    pub convergence_window: usize,
    pub convergence_stride: usize,
    /// Upward distance steps tolerated before a pair is rejected.
    pub convergence_fail_threshold: usize,
    /// Pinch events buffered for the consumer before new ones are dropped.
    pub pinch_sink_capacity: usize,
    /// Tear down hands that have not been seen for this long. `None` keeps
    /// every hand for the lifetime of the router.
    pub hand_idle_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pinch_distance_threshold: 1800.0,
            ring_capacity: 15,
            min_history_for_judgment: 8,
            liveness_window_ms: 50,
            stale_eviction_ms: 60,
            convergence_window: 15,
            convergence_stride: 2,
            convergence_fail_threshold: 4,
            pinch_sink_capacity: 64,
            hand_idle_timeout_ms: None,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;

        Self::from_json_str(&contents)
    }

    pub fn from_json_str(src: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.ring_capacity == 0 {
            return Err(Error::InvalidConfig("ring_capacity must be positive".into()));
        }

        if self.convergence_stride == 0 {
            return Err(Error::InvalidConfig(
                "convergence_stride must be positive".into(),
            ));
        }

        if self.pinch_sink_capacity == 0 {
            return Err(Error::InvalidConfig(
                "pinch_sink_capacity must be positive".into(),
            ));
        }

        Ok(())
    }

    #[inline]
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.liveness_window_ms)
    }

    #[inline]
    pub fn stale_eviction(&self) -> Duration {
        Duration::from_millis(self.stale_eviction_ms)
    }

    #[inline]
    pub fn hand_idle_timeout(&self) -> Option<Duration> {
        self.hand_idle_timeout_ms.map(Duration::from_millis)
    }
}
