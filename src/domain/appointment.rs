//! Appointment records and their lifecycle rules.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Minimum whole calendar days between "today" and the appointment date for
/// a customer cancellation to be accepted.
pub const MIN_CANCEL_LEAD_DAYS: i64 = 2;

/// Appointments whose date is at least this many days in the past are swept
/// into `auto-completed`.
pub const AUTO_COMPLETE_AFTER_DAYS: i64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    AutoCompleted,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown appointment status: {0}")]
pub struct UnknownStatus(String);

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        Self::Scheduled,
        Self::Completed,
        Self::AutoCompleted,
        Self::Cancelled,
        Self::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::AutoCompleted => "auto-completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Active appointments hold their slot on the calendar.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Rejected)
    }

    /// Terminal states are never touched by the auto-complete sweep.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Scheduled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// One row of the appointment ledger.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub branch: String,
    pub preferred_date: NaiveDate,
    pub preferred_time: String,
    pub purpose: String,
    pub status: String,
    pub user_id: String,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub completed_by: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn parsed_status(&self) -> Result<AppointmentStatus, UnknownStatus> {
        self.status.parse()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Day-granularity cancellation window: the appointment date must be at
/// least [`MIN_CANCEL_LEAD_DAYS`] whole days away. Time of day is ignored.
pub fn meets_cancellation_lead_time(preferred: NaiveDate, today: NaiveDate) -> bool {
    preferred.signed_duration_since(today).num_days() >= MIN_CANCEL_LEAD_DAYS
}

/// Latest appointment date the auto-complete sweep considers overdue.
pub fn overdue_cutoff(today: NaiveDate) -> NaiveDate {
    today - Duration::days(AUTO_COMPLETE_AFTER_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert_eq!(AppointmentStatus::AutoCompleted.as_str(), "auto-completed");
        assert!("confirmed".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn active_and_terminal_sets() {
        assert!(AppointmentStatus::Scheduled.is_active());
        assert!(AppointmentStatus::Completed.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
        assert!(!AppointmentStatus::Rejected.is_active());

        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::AutoCompleted.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::Rejected.is_terminal());
    }

    #[test]
    fn cancellation_window_boundary() {
        let today = date(2026, 8, 5);
        assert!(!meets_cancellation_lead_time(date(2026, 8, 5), today));
        assert!(!meets_cancellation_lead_time(date(2026, 8, 6), today));
        assert!(meets_cancellation_lead_time(date(2026, 8, 7), today));
        assert!(meets_cancellation_lead_time(date(2026, 8, 8), today));
    }

    #[test]
    fn overdue_cutoff_is_two_days_back() {
        assert_eq!(overdue_cutoff(date(2026, 8, 5)), date(2026, 8, 3));
    }
}
