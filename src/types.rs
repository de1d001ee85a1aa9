//! Shared primitive aliases and the playback delay newtype.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Element value held by arrays under visualization.
pub type Value = i64;
/// Position inside an array under visualization.
pub type Index = usize;

/// Smallest accepted inter-tick delay in milliseconds.
pub const MIN_DELAY_MS: u64 = 1;
/// Largest accepted inter-tick delay in milliseconds.
pub const MAX_DELAY_MS: u64 = 200;

/// Inter-tick delay of the playback timer, always within
/// [`MIN_DELAY_MS`]..=[`MAX_DELAY_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Delay(u64);

impl Delay {
    /// Default playback delay.
    pub const DEFAULT: Self = Self(80);

    /// Validates a literal millisecond delay.
    pub fn from_millis(ms: u64) -> Option<Self> {
        (MIN_DELAY_MS..=MAX_DELAY_MS).contains(&ms).then_some(Self(ms))
    }

    /// Delay in milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Delay as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl TryFrom<u64> for Delay {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_millis(value)
            .ok_or_else(|| format!("delay {value}ms outside {MIN_DELAY_MS}..={MAX_DELAY_MS}"))
    }
}

impl From<Delay> for u64 {
    fn from(value: Delay) -> Self {
        value.0
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_bounds_are_inclusive() {
        assert!(Delay::from_millis(0).is_none());
        assert_eq!(Delay::from_millis(1).map(Delay::as_millis), Some(1));
        assert_eq!(Delay::from_millis(200).map(Delay::as_millis), Some(200));
        assert!(Delay::from_millis(201).is_none());
    }

    #[test]
    fn delay_deserializes_through_validation() {
        let ok: Delay = serde_json::from_str("80").expect("valid delay");
        assert_eq!(ok.as_duration(), Duration::from_millis(80));
        assert!(serde_json::from_str::<Delay>("500").is_err());
    }
}
