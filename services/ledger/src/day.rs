//! Calendar-day windows in the register's display timezone.
//!
//! # Purpose
//! The listing endpoint and the presence sweep both reason about "a calendar
//! day", while visits are stored with UTC timestamps. A `DayWindow` pins down
//! the conversion once: the day is interpreted in the configured fixed
//! timezone and becomes the half-open UTC range `[local 00:00, next local
//! 00:00)`, so midnight-adjacent entries land in exactly one day.
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window for a specific calendar day in `tz`.
    pub fn for_day(day: NaiveDate, tz: Tz) -> Self {
        Self {
            start: local_to_utc(day.and_time(NaiveTime::MIN), tz),
            end: local_to_utc((day + Duration::days(1)).and_time(NaiveTime::MIN), tz),
        }
    }

    /// Window for the day containing `now` as seen from `tz`.
    pub fn containing(now: DateTime<Utc>, tz: Tz) -> Self {
        Self::for_day(now.with_timezone(&tz).date_naive(), tz)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn local_to_utc(mut naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    // Local midnight can fall inside a DST gap in some zones; walk forward to
    // the first representable instant.
    loop {
        if let Some(resolved) = tz.from_local_datetime(&naive).earliest() {
            return resolved.with_timezone(&Utc);
        }
        naive += Duration::hours(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Rome;

    #[test]
    fn window_is_half_open_in_local_time() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).expect("date");
        let window = DayWindow::for_day(day, Rome);

        // 10 June, Rome is UTC+2: local midnight is 22:00 UTC the day before.
        let start = Utc.with_ymd_and_hms(2025, 6, 9, 22, 0, 0).single().expect("start");
        assert_eq!(window.start, start);
        assert_eq!(window.end - window.start, Duration::days(1));

        assert!(window.contains(start));
        assert!(window.contains(window.end - Duration::seconds(1)));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn containing_uses_the_local_calendar() {
        // 23:30 UTC on 9 June is already 10 June in Rome.
        let now = Utc.with_ymd_and_hms(2025, 6, 9, 23, 30, 0).single().expect("now");
        let window = DayWindow::containing(now, Rome);
        let expected = DayWindow::for_day(NaiveDate::from_ymd_opt(2025, 6, 10).expect("date"), Rome);
        assert_eq!(window, expected);
    }

    #[test]
    fn winter_window_uses_standard_offset() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).expect("date");
        let window = DayWindow::for_day(day, Rome);
        let start = Utc.with_ymd_and_hms(2025, 1, 14, 23, 0, 0).single().expect("start");
        assert_eq!(window.start, start);
    }

    #[test]
    fn dst_transition_day_is_23_hours() {
        // Europe/Rome springs forward on 30 March 2025.
        let day = NaiveDate::from_ymd_opt(2025, 3, 30).expect("date");
        let window = DayWindow::for_day(day, Rome);
        assert_eq!(window.end - window.start, Duration::hours(23));
    }
}
