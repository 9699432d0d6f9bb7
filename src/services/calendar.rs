//! Calendario de schedules
//!
//! Decide si un schedule circula en una fecha concreta. Función pura.

use chrono::{Datelike, NaiveDate};

use crate::models::schedule::Schedule;

/// Día ISO de la semana: 1 = lunes ... 7 = domingo
pub fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// El schedule está vigente y su recurrencia incluye el día de `date`
pub fn is_active_on(schedule: &Schedule, date: NaiveDate) -> bool {
    if !schedule.is_active() {
        return false;
    }

    if schedule.valid_from.is_some_and(|from| date < from) {
        return false;
    }
    if schedule.valid_to.is_some_and(|to| date > to) {
        return false;
    }

    schedule.days_of_week.contains(&iso_weekday(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::schedule::tests::{new_schedule, ts};
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_sunday_is_seven() {
        assert_eq!(iso_weekday(d(2025, 1, 19)), 7);
        assert_eq!(iso_weekday(d(2025, 1, 20)), 1);
        assert_eq!(iso_weekday(d(2025, 1, 18)), 6);
    }

    #[test]
    fn test_weekend_schedule() {
        let schedule = Schedule::create(new_schedule(&[6, 7]), ts()).unwrap();
        assert!(is_active_on(&schedule, d(2025, 1, 18)));
        assert!(is_active_on(&schedule, d(2025, 1, 19)));
        assert!(!is_active_on(&schedule, d(2025, 1, 20)));
    }

    #[test]
    fn test_single_day_window() {
        let day = d(2025, 1, 22);
        let mut new = new_schedule(&[1, 2, 3, 4, 5, 6, 7]);
        new.valid_from = Some(day);
        new.valid_to = Some(day);
        let schedule = Schedule::create(new, ts()).unwrap();

        assert!(is_active_on(&schedule, day));
        assert!(!is_active_on(&schedule, day - Duration::days(1)));
        assert!(!is_active_on(&schedule, day + Duration::days(1)));
    }

    #[test]
    fn test_open_ended_windows() {
        let mut new = new_schedule(&[1, 2, 3, 4, 5, 6, 7]);
        new.valid_from = Some(d(2025, 1, 10));
        let from_only = Schedule::create(new, ts()).unwrap();
        assert!(!is_active_on(&from_only, d(2025, 1, 9)));
        assert!(is_active_on(&from_only, d(2030, 1, 9)));

        let mut new = new_schedule(&[1, 2, 3, 4, 5, 6, 7]);
        new.valid_to = Some(d(2025, 1, 10));
        let to_only = Schedule::create(new, ts()).unwrap();
        assert!(is_active_on(&to_only, d(2020, 1, 1)));
        assert!(!is_active_on(&to_only, d(2025, 1, 11)));
    }

    #[test]
    fn test_inactive_or_deleted_never_runs() {
        let monday = d(2025, 1, 20);
        let mut schedule = Schedule::create(new_schedule(&[1]), ts()).unwrap();
        assert!(is_active_on(&schedule, monday));

        schedule.deactivate(ts());
        assert!(!is_active_on(&schedule, monday));

        schedule.activate(ts());
        schedule.soft_delete(ts());
        assert!(!is_active_on(&schedule, monday));
    }

    #[test]
    fn test_empty_recurrence_never_runs() {
        let schedule = Schedule::create(new_schedule(&[]), ts()).unwrap();
        assert!(!is_active_on(&schedule, d(2025, 1, 20)));
    }
}
