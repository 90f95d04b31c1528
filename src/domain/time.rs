//! Wall-clock time-of-day value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A wall-clock "HH:MM" time, stored as minutes since midnight.
///
/// Appointment times and business hours are plain wall-clock values with no
/// timezone attached; each branch interprets them locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("time must be formatted as HH:MM")]
    Format,
    #[error("time {0} is out of range")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub fn new(hour: u16, minute: u16) -> Result<Self, TimeParseError> {
        if hour > 23 || minute > 59 {
            return Err(TimeParseError::OutOfRange(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Const constructor for known-valid literals (default business hours).
    pub const fn at(hour: u16, minute: u16) -> Self {
        assert!(hour < 24 && minute < 60);
        Self(hour * 60 + minute)
    }

    pub fn parse(value: &str) -> Result<Self, TimeParseError> {
        let (hh, mm) = value.split_once(':').ok_or(TimeParseError::Format)?;
        if hh.len() != 2 || mm.len() != 2 {
            return Err(TimeParseError::Format);
        }
        let hour: u16 = hh.parse().map_err(|_| TimeParseError::Format)?;
        let minute: u16 = mm.parse().map_err(|_| TimeParseError::Format)?;
        Self::new(hour, minute)
    }

    /// Minutes since midnight, widened for interval arithmetic that may
    /// step outside the 00:00..24:00 range.
    pub fn minute_of_day(self) -> i32 {
        i32::from(self.0)
    }

    pub fn from_minute_of_day(minutes: i32) -> Option<Self> {
        u16::try_from(minutes).ok().filter(|m| *m < 24 * 60).map(Self)
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let t = TimeOfDay::parse("08:30").unwrap();
        assert_eq!(t.minute_of_day(), 510);
        assert_eq!(t.to_string(), "08:30");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(TimeOfDay::parse("830").is_err());
        assert!(TimeOfDay::parse("8:30").is_err());
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("ab:cd").is_err());
    }

    #[test]
    fn orders_chronologically() {
        let a = TimeOfDay::parse("08:00").unwrap();
        let b = TimeOfDay::parse("14:30").unwrap();
        assert!(a < b);
    }

    #[test]
    fn minute_of_day_round_trips() {
        let t = TimeOfDay::from_minute_of_day(750).unwrap();
        assert_eq!(t.to_string(), "12:30");
        assert!(TimeOfDay::from_minute_of_day(-30).is_none());
        assert!(TimeOfDay::from_minute_of_day(24 * 60).is_none());
    }
}
