//! Per-branch calendar configuration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::branch::BranchName;
use super::time::TimeOfDay;

pub const DEFAULT_OPEN: TimeOfDay = TimeOfDay::at(8, 0);
pub const DEFAULT_CLOSE: TimeOfDay = TimeOfDay::at(15, 0);
pub const DEFAULT_BUFFER_MINUTES: i32 = 120;

/// Daily opening window, wall-clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHours {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self { start: DEFAULT_OPEN, end: DEFAULT_CLOSE }
    }
}

/// A fully unbookable date, with audit info on who closed it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosedDate {
    pub date: NaiveDate,
    pub reason: String,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

/// Effective calendar configuration for one branch.
///
/// A branch without a stored settings record is a valid state and resolves
/// to [`CalendarSettings::defaults`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    pub branch: BranchName,
    pub business_hours: BusinessHours,
    pub buffer_minutes: i32,
    pub disable_sundays: bool,
    pub closed_dates: Vec<ClosedDate>,
}

impl CalendarSettings {
    pub fn defaults(branch: BranchName) -> Self {
        Self {
            branch,
            business_hours: BusinessHours::default(),
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            disable_sundays: true,
            closed_dates: Vec::new(),
        }
    }

    pub fn closure_for(&self, date: NaiveDate) -> Option<&ClosedDate> {
        self.closed_dates.iter().find(|c| c.date == date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = CalendarSettings::defaults(BranchName::new("main").unwrap());
        assert_eq!(s.business_hours.start.to_string(), "08:00");
        assert_eq!(s.business_hours.end.to_string(), "15:00");
        assert_eq!(s.buffer_minutes, 120);
        assert!(s.disable_sundays);
        assert!(s.closed_dates.is_empty());
    }

    #[test]
    fn closure_lookup_matches_exact_date() {
        let mut s = CalendarSettings::defaults(BranchName::new("main").unwrap());
        s.closed_dates.push(ClosedDate {
            date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            reason: "stock take".into(),
            added_by: "admin".into(),
            added_at: Utc::now(),
        });
        assert!(s.closure_for(NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()).is_some());
        assert!(s.closure_for(NaiveDate::from_ymd_opt(2026, 8, 11).unwrap()).is_none());
    }
}
