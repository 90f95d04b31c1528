//! Open-slot computation for a branch day.
//!
//! Existing bookings become inclusive exclusion intervals, so "slot is
//! taken" and "slot is too close to a booking" collapse into one
//! interval-membership test.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::calendar::{BusinessHours, CalendarSettings};
use super::time::TimeOfDay;

pub const SLOT_INTERVAL_MINUTES: i32 = 30;

/// Inclusive exclusion interval around an existing booking.
///
/// Windows may extend before opening or past closing; clipping them would
/// allow a booking adjacent to an appointment at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferWindow {
    start: i32,
    end: i32,
}

impl BufferWindow {
    pub fn around(time: TimeOfDay, buffer_minutes: i32) -> Self {
        let center = time.minute_of_day();
        Self { start: center - buffer_minutes, end: center + buffer_minutes }
    }

    pub fn contains(&self, candidate: TimeOfDay) -> bool {
        let m = candidate.minute_of_day();
        self.start <= m && m <= self.end
    }
}

/// Outcome of an availability query for one (branch, date).
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DayAvailability {
    #[serde(rename_all = "camelCase")]
    Open {
        available_slots: Vec<TimeOfDay>,
        booked_count: usize,
        business_hours: BusinessHours,
    },
    #[serde(rename_all = "camelCase")]
    Unavailable {
        error: String,
        available_slots: Vec<TimeOfDay>,
    },
}

impl DayAvailability {
    fn unavailable(reason: String) -> Self {
        Self::Unavailable { error: reason, available_slots: Vec::new() }
    }
}

/// Reason the whole day is unbookable, if any.
pub fn closure_reason(settings: &CalendarSettings, date: NaiveDate) -> Option<String> {
    if settings.disable_sundays && date.weekday() == Weekday::Sun {
        return Some("appointments are not available on Sundays".to_string());
    }
    if let Some(closed) = settings.closure_for(date) {
        return Some(if closed.reason.is_empty() {
            "the branch is closed on this date".to_string()
        } else {
            format!("the branch is closed on this date: {}", closed.reason)
        });
    }
    None
}

/// Candidate slots at fixed 30-minute increments within business hours,
/// keeping those that fall inside no buffer window. The enumeration stops
/// before any slot that would start at or after closing.
pub fn open_slots(
    hours: BusinessHours,
    buffer_minutes: i32,
    booked: &[TimeOfDay],
) -> Vec<TimeOfDay> {
    let windows: Vec<BufferWindow> = booked
        .iter()
        .map(|t| BufferWindow::around(*t, buffer_minutes))
        .collect();

    let mut slots = Vec::new();
    let mut minute = hours.start.minute_of_day();
    while minute < hours.end.minute_of_day() {
        if let Some(slot) = TimeOfDay::from_minute_of_day(minute) {
            if !windows.iter().any(|w| w.contains(slot)) {
                slots.push(slot);
            }
        }
        minute += SLOT_INTERVAL_MINUTES;
    }
    slots
}

/// Full availability computation per the booking rules: day-level gates
/// first, then slot enumeration against the active bookings.
pub fn day_availability(
    settings: &CalendarSettings,
    date: NaiveDate,
    booked: &[TimeOfDay],
) -> DayAvailability {
    if let Some(reason) = closure_reason(settings, date) {
        return DayAvailability::unavailable(reason);
    }
    DayAvailability::Open {
        available_slots: open_slots(settings.business_hours, settings.buffer_minutes, booked),
        booked_count: booked.len(),
        business_hours: settings.business_hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::branch::BranchName;
    use crate::domain::calendar::ClosedDate;
    use chrono::Utc;

    fn settings() -> CalendarSettings {
        CalendarSettings::defaults(BranchName::new("main").unwrap())
    }

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn as_strings(slots: &[TimeOfDay]) -> Vec<String> {
        slots.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_day_yields_fifteen_default_slots() {
        let s = settings();
        let slots = open_slots(s.business_hours, s.buffer_minutes, &[]);
        assert_eq!(slots.len(), 15);
        assert_eq!(slots.first().unwrap().to_string(), "08:00");
        assert_eq!(slots.last().unwrap().to_string(), "14:30");
        assert!(!as_strings(&slots).contains(&"15:00".to_string()));
    }

    #[test]
    fn buffer_excludes_inclusive_range_around_booking() {
        let s = settings();
        let slots = as_strings(&open_slots(s.business_hours, 120, &[t("10:00")]));
        // [08:00, 12:00] inclusive is gone, 12:30 onward survives.
        assert_eq!(slots, vec!["12:30", "13:00", "13:30", "14:00", "14:30"]);
    }

    #[test]
    fn buffer_boundary_is_inclusive_on_both_sides() {
        // With hours widened to 07:00, the half-hour marks just outside the
        // [08:00, 12:00] window survive while the window itself is gone.
        let hours = BusinessHours { start: t("07:00"), end: t("15:00") };
        let slots = as_strings(&open_slots(hours, 120, &[t("10:00")]));
        assert!(slots.contains(&"07:30".to_string()));
        assert!(slots.contains(&"12:30".to_string()));
        assert!(!slots.contains(&"08:00".to_string()));
        assert!(!slots.contains(&"12:00".to_string()));
    }

    #[test]
    fn zero_buffer_excludes_only_the_booked_slot() {
        let s = settings();
        let slots = as_strings(&open_slots(s.business_hours, 0, &[t("10:00")]));
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"10:30".to_string()));
        assert_eq!(slots.len(), 14);
    }

    #[test]
    fn windows_are_not_clipped_to_business_hours() {
        let s = settings();
        // Booking at opening: its window reaches back before 08:00 without
        // panicking and forward to 10:00 inclusive.
        let slots = as_strings(&open_slots(s.business_hours, 120, &[t("08:00")]));
        assert_eq!(slots.first().unwrap(), "10:30");
        // Booking near closing blocks the tail end of the day.
        let slots = as_strings(&open_slots(s.business_hours, 120, &[t("14:30")]));
        assert_eq!(slots.last().unwrap(), "12:00");
    }

    #[test]
    fn window_far_before_midnight_boundary_is_harmless() {
        let w = BufferWindow::around(t("00:30"), 120);
        assert!(w.contains(t("00:00")));
        assert!(w.contains(t("02:30")));
        assert!(!w.contains(t("03:00")));
    }

    #[test]
    fn unaligned_closing_time_stops_short() {
        let hours = BusinessHours { start: t("08:00"), end: t("14:45") };
        let slots = open_slots(hours, 0, &[]);
        assert_eq!(slots.last().unwrap().to_string(), "14:30");
        assert_eq!(slots.len(), 14);
    }

    #[test]
    fn multiple_bookings_merge_their_exclusions() {
        let s = settings();
        let slots = as_strings(&open_slots(s.business_hours, 30, &[t("09:00"), t("13:00")]));
        for gone in ["08:30", "09:00", "09:30", "12:30", "13:00", "13:30"] {
            assert!(!slots.contains(&gone.to_string()), "{gone} should be excluded");
        }
        assert!(slots.contains(&"08:00".to_string()));
        assert!(slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"14:00".to_string()));
    }

    #[test]
    fn sundays_are_gated_when_disabled() {
        let s = settings();
        let sunday = date(2026, 8, 9);
        assert!(closure_reason(&s, sunday).is_some());
        assert!(matches!(
            day_availability(&s, sunday, &[]),
            DayAvailability::Unavailable { .. }
        ));

        let mut open_sundays = settings();
        open_sundays.disable_sundays = false;
        assert!(closure_reason(&open_sundays, sunday).is_none());
    }

    #[test]
    fn closed_dates_win_regardless_of_bookings() {
        let mut s = settings();
        let day = date(2026, 8, 10);
        s.closed_dates.push(ClosedDate {
            date: day,
            reason: "inventory audit".into(),
            added_by: "admin".into(),
            added_at: Utc::now(),
        });
        match day_availability(&s, day, &[t("10:00")]) {
            DayAvailability::Unavailable { error, available_slots } => {
                assert!(error.contains("inventory audit"));
                assert!(available_slots.is_empty());
            }
            DayAvailability::Open { .. } => panic!("closed date must be unavailable"),
        }
    }

    #[test]
    fn open_day_reports_booking_count_and_hours() {
        let s = settings();
        match day_availability(&s, date(2026, 8, 10), &[t("10:00")]) {
            DayAvailability::Open { booked_count, business_hours, .. } => {
                assert_eq!(booked_count, 1);
                assert_eq!(business_hours.start.to_string(), "08:00");
                assert_eq!(business_hours.end.to_string(), "15:00");
            }
            DayAvailability::Unavailable { .. } => panic!("weekday should be open"),
        }
    }
}
