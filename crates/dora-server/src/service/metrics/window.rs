//! Time windows and reporting granularity.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Window length used when the caller gives no lower bound.
pub const DEFAULT_WINDOW: SignedDuration = SignedDuration::from_hours(30 * 24);

/// Unit in which deployment frequency is reported.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, JsonSchema, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    /// Deployments per day.
    #[default]
    Day,
    /// Deployments per week.
    Week,
}

impl Granularity {
    /// Returns the length of one unit in seconds.
    #[inline]
    pub const fn seconds(self) -> i64 {
        match self {
            Self::Day => 86_400,
            Self::Week => 604_800,
        }
    }
}

/// Rejected window bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// `from` is not strictly before `to`.
    #[error("window start {from} must be before its end {to}")]
    Empty { from: Timestamp, to: Timestamp },

    /// The default lower bound falls outside the supported range.
    #[error("window start cannot be derived from {to}")]
    OutOfRange { to: Timestamp },
}

/// Half-open time window `[from, to)` over deployment timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsWindow {
    from: Timestamp,
    to: Timestamp,
}

impl MetricsWindow {
    /// Creates a window, rejecting empty or inverted bounds.
    pub fn new(from: Timestamp, to: Timestamp) -> Result<Self, WindowError> {
        if from >= to {
            return Err(WindowError::Empty { from, to });
        }

        Ok(Self { from, to })
    }

    /// Resolves optional bounds: `to` defaults to `now`, `from` to
    /// [`DEFAULT_WINDOW`] before `to`.
    pub fn resolve(
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<Self, WindowError> {
        let to = to.unwrap_or(now);
        let from = match from {
            Some(from) => from,
            None => to
                .checked_sub(DEFAULT_WINDOW)
                .map_err(|_| WindowError::OutOfRange { to })?,
        };

        Self::new(from, to)
    }

    /// Inclusive lower bound.
    #[inline]
    pub fn from(&self) -> Timestamp {
        self.from
    }

    /// Exclusive upper bound.
    #[inline]
    pub fn to(&self) -> Timestamp {
        self.to
    }

    /// Returns the window length in seconds (always positive).
    #[inline]
    pub fn length_seconds(&self) -> i64 {
        self.to.as_second() - self.from.as_second()
    }

    /// Returns the window length expressed in granularity units.
    #[inline]
    pub fn units(&self, granularity: Granularity) -> f64 {
        self.to.duration_since(self.from).as_secs_f64() / granularity.seconds() as f64
    }

    /// Returns whether the timestamp falls inside the window.
    #[inline]
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.from <= timestamp && timestamp < self.to
    }
}

impl fmt::Display for MetricsWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    #[test]
    fn rejects_empty_windows() {
        assert!(MetricsWindow::new(ts(10), ts(20)).is_ok());
        assert_eq!(
            MetricsWindow::new(ts(20), ts(20)),
            Err(WindowError::Empty {
                from: ts(20),
                to: ts(20)
            })
        );
        assert!(MetricsWindow::new(ts(30), ts(20)).is_err());
    }

    #[test]
    fn resolves_defaults() {
        let now = ts(100 * 86_400);

        let window = MetricsWindow::resolve(None, None, now).unwrap();
        assert_eq!(window.to(), now);
        assert_eq!(window.length_seconds(), 30 * 86_400);

        let to = ts(50 * 86_400);
        let window = MetricsWindow::resolve(None, Some(to), now).unwrap();
        assert_eq!(window.to(), to);
        assert_eq!(window.from(), ts(20 * 86_400));

        let window = MetricsWindow::resolve(Some(ts(99 * 86_400)), None, now).unwrap();
        assert_eq!(window.length_seconds(), 86_400);

        assert!(MetricsWindow::resolve(Some(now), None, now).is_err());
    }

    #[test]
    fn window_units() {
        let window = MetricsWindow::new(ts(0), ts(7 * 86_400)).unwrap();
        assert_eq!(window.units(Granularity::Day), 7.0);
        assert_eq!(window.units(Granularity::Week), 1.0);
    }

    #[test]
    fn window_is_half_open() {
        let window = MetricsWindow::new(ts(10), ts(20)).unwrap();
        assert!(window.contains(ts(10)));
        assert!(window.contains(ts(19)));
        assert!(!window.contains(ts(20)));
        assert!(!window.contains(ts(9)));
    }

    #[test]
    fn granularity_parses_lowercase() {
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert!("month".parse::<Granularity>().is_err());
        assert_eq!(Granularity::Week.to_string(), "week");
    }
}
