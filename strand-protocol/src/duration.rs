//! Stable duration type for result and error payloads.
//!
//! [`DurationMs`] serializes as a plain integer (milliseconds) rather than
//! serde's internal `{"secs": N, "nanos": N}` representation, giving a
//! portable, human-readable format that cannot break under us.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Duration in milliseconds with a stable JSON serialization format.
///
/// # Examples
///
/// ```
/// use strand_protocol::DurationMs;
///
/// let d = DurationMs::from_secs(2);
/// assert_eq!(d.as_millis(), 2000);
/// assert_eq!(serde_json::to_string(&d).unwrap(), "2000");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DurationMs(u64);

impl DurationMs {
    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create from seconds, saturating on overflow.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// The value in milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// The value in (fractional) seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// True if the duration is zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating addition.
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Convert to `std::time::Duration`.
    pub const fn to_std(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl From<Duration> for DurationMs {
    fn from(d: Duration) -> Self {
        Self(d.as_millis() as u64)
    }
}

impl From<DurationMs> for Duration {
    fn from(d: DurationMs) -> Self {
        d.to_std()
    }
}

impl std::fmt::Display for DurationMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_integer() {
        let d = DurationMs::from_millis(1500);
        assert_eq!(serde_json::to_string(&d).unwrap(), "1500");
        let back: DurationMs = serde_json::from_str("1500").unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn std_conversions() {
        let d: DurationMs = Duration::from_secs(3).into();
        assert_eq!(d.as_millis(), 3000);
        assert_eq!(Duration::from(d), Duration::from_secs(3));
    }

    #[test]
    fn saturating_arithmetic() {
        let max = DurationMs::from_millis(u64::MAX);
        assert_eq!(max.saturating_add(DurationMs::from_millis(1)), max);
        assert_eq!(DurationMs::from_secs(u64::MAX).as_millis(), u64::MAX);
    }
}
