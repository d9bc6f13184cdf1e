use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::{HeatmarkError, HeatmarkResult};

/// Days covered by the rolling window used when no year is requested.
pub const ROLLING_WINDOW_DAYS: u64 = 365;

/// Years accepted for `--year`; git and the contribution graph both start at the epoch.
pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 9999;

/// Pins a calendar day to 12:00 so day arithmetic never crosses a DST boundary.
pub fn at_noon(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + TimeDelta::hours(12)
}

pub fn today_local() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn first_sunday_on_or_before(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date - Days::new(back)
}

/// Most recent Sunday on or before the day that lies `days_ago` days before `today`.
pub fn first_sunday_on_or_before_days_ago(
    days_ago: u64,
    today: NaiveDate,
) -> HeatmarkResult<NaiveDate> {
    let anchor = today.checked_sub_days(Days::new(days_ago)).ok_or_else(|| {
        HeatmarkError::input(format!("{days_ago} days before {today} is out of range"))
    })?;
    Ok(first_sunday_on_or_before(anchor))
}

/// First Sunday on or after January 1 of `year`.
pub fn first_sunday_of_year(year: i32) -> HeatmarkResult<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| HeatmarkError::input(format!("year {year} is out of range")))?;
    let ahead = (7 - jan1.weekday().num_days_from_sunday()) % 7;
    Ok(jan1 + Days::new(u64::from(ahead)))
}

/// Canonical `YYYY-MM-DD` key. Only the calendar day participates, never the time of day.
pub fn format_date<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Inclusive range of days the artwork may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarWindow {
    /// A requested year spans its first Sunday to December 31. Otherwise the window
    /// rolls back [`ROLLING_WINDOW_DAYS`] from `today` and includes `today`.
    pub fn resolve(year: Option<i32>, today: NaiveDate) -> HeatmarkResult<Self> {
        match year {
            Some(year) => {
                validate_year(year)?;
                let start = first_sunday_of_year(year)?;
                let end = NaiveDate::from_ymd_opt(year, 12, 31)
                    .ok_or_else(|| HeatmarkError::input(format!("year {year} is out of range")))?;
                Ok(Self { start, end })
            }
            None => Ok(Self {
                start: first_sunday_on_or_before_days_ago(ROLLING_WINDOW_DAYS, today)?,
                end: today,
            }),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar years touched by the window, deduplicated, in ascending order.
    pub fn years(&self) -> Vec<i32> {
        let (first, last) = (self.start.year(), self.end.year());
        if first == last {
            vec![first]
        } else {
            (first..=last).collect()
        }
    }
}

pub fn validate_year(year: i32) -> HeatmarkResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(HeatmarkError::input(format!(
            "year must be within {MIN_YEAR}..={MAX_YEAR}, got {year}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Weekday};

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_sunday_of_year_known_values() {
        // 2024-01-01 is a Monday, 2023-01-01 a Sunday, 2022-01-01 a Saturday.
        assert_eq!(first_sunday_of_year(2024).unwrap(), ymd(2024, 1, 7));
        assert_eq!(first_sunday_of_year(2023).unwrap(), ymd(2023, 1, 1));
        assert_eq!(first_sunday_of_year(2022).unwrap(), ymd(2022, 1, 2));
    }

    #[test]
    fn first_sunday_of_year_is_always_a_sunday_in_first_week() {
        for year in 1990..2040 {
            let d = first_sunday_of_year(year).unwrap();
            assert_eq!(d.weekday(), Weekday::Sun);
            assert_eq!(d.year(), year);
            assert!(d.day() <= 7);
        }
    }

    #[test]
    fn sunday_on_or_before_days_ago() {
        // 2025-01-08 minus 365 days is 2024-01-09 (Tuesday) -> 2024-01-07.
        let got = first_sunday_on_or_before_days_ago(365, ymd(2025, 1, 8)).unwrap();
        assert_eq!(got, ymd(2024, 1, 7));

        // Already a Sunday stays put.
        let got = first_sunday_on_or_before_days_ago(0, ymd(2024, 1, 7)).unwrap();
        assert_eq!(got, ymd(2024, 1, 7));
    }

    #[test]
    fn sunday_on_or_before_crosses_year_boundary() {
        // 2022-01-01 is a Saturday.
        assert_eq!(first_sunday_on_or_before(ymd(2022, 1, 1)), ymd(2021, 12, 26));
    }

    #[test]
    fn format_date_ignores_time_of_day() {
        let day = ymd(2024, 3, 9);
        let midnight = day.and_time(NaiveTime::MIN);
        let late = day.and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(format_date(&midnight), "2024-03-09");
        assert_eq!(format_date(&midnight), format_date(&late));
        assert_eq!(format_date(&day), format_date(&at_noon(day)));
    }

    #[test]
    fn at_noon_keeps_the_day() {
        let dt = at_noon(ymd(2024, 2, 29));
        assert_eq!(dt.date(), ymd(2024, 2, 29));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn window_for_year() {
        let w = CalendarWindow::resolve(Some(2024), ymd(2026, 5, 1)).unwrap();
        assert_eq!(w.start, ymd(2024, 1, 7));
        assert_eq!(w.end, ymd(2024, 12, 31));
        assert_eq!(w.years(), vec![2024]);
    }

    #[test]
    fn rolling_window_spans_two_years_and_includes_today() {
        let today = ymd(2025, 1, 8);
        let w = CalendarWindow::resolve(None, today).unwrap();
        assert_eq!(w.start, ymd(2024, 1, 7));
        assert_eq!(w.end, today);
        assert!(w.contains(today));
        assert!(!w.contains(ymd(2024, 1, 6)));
        assert_eq!(w.years(), vec![2024, 2025]);
    }

    #[test]
    fn window_rejects_absurd_years() {
        assert!(CalendarWindow::resolve(Some(1969), ymd(2025, 1, 1)).is_err());
        assert!(CalendarWindow::resolve(Some(10_000), ymd(2025, 1, 1)).is_err());
    }
}
