//! Duration rendering and slow-call thresholds.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Renders a duration as an ISO-8601 duration string, truncated to
/// millisecond precision.
///
/// Hours and minutes are split out; days are expressed as hours. A zero
/// duration renders as `PT0S`.
///
/// ```
/// use std::time::Duration;
/// use calltrace_core::format_iso8601;
///
/// assert_eq!(format_iso8601(Duration::from_nanos(2_000_000)), "PT0.002S");
/// assert_eq!(format_iso8601(Duration::from_millis(61_500)), "PT1M1.5S");
/// ```
#[must_use]
pub fn format_iso8601(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "PT0S".to_string();
    }

    let total_secs = millis / 1000;
    let frac_millis = millis % 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut out = String::from("PT");
    if hours != 0 {
        let _ = write!(out, "{hours}H");
    }
    if minutes != 0 {
        let _ = write!(out, "{minutes}M");
    }
    if secs == 0 && frac_millis == 0 {
        return out;
    }

    let _ = write!(out, "{secs}");
    if frac_millis != 0 {
        let frac = format!("{frac_millis:03}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('S');
    out
}

/// Unit for a slow-call threshold magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    #[default]
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Converts `magnitude` of this unit to whole milliseconds.
    ///
    /// Sub-millisecond units truncate; large values saturate.
    #[must_use]
    pub const fn to_millis(self, magnitude: u64) -> u64 {
        match self {
            Self::Nanoseconds => magnitude / 1_000_000,
            Self::Microseconds => magnitude / 1_000,
            Self::Milliseconds => magnitude,
            Self::Seconds => magnitude.saturating_mul(1_000),
            Self::Minutes => magnitude.saturating_mul(60_000),
            Self::Hours => magnitude.saturating_mul(3_600_000),
            Self::Days => magnitude.saturating_mul(86_400_000),
        }
    }
}

/// How long a call may run before it is reported as slow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlowCallThreshold {
    /// Number of `unit`s.
    pub magnitude: u64,

    /// Unit of `magnitude`.
    #[serde(default)]
    pub unit: TimeUnit,
}

impl SlowCallThreshold {
    /// Creates a threshold of `magnitude` `unit`s.
    #[must_use]
    pub const fn new(magnitude: u64, unit: TimeUnit) -> Self {
        Self { magnitude, unit }
    }

    /// The threshold at millisecond precision.
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.unit.to_millis(self.magnitude))
    }

    /// Returns `true` once `elapsed` has gone past the threshold.
    #[must_use]
    pub fn is_exceeded_by(&self, elapsed: Duration) -> bool {
        elapsed > self.as_duration()
    }

    /// The threshold as rendered into `${method.warn.duration}`.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        format_iso8601(self.as_duration())
    }
}
