//! # Monthly Calendar
//!
//! Monday-first month grids and completion statistics over the intake log.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A calendar month, identified by its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Month { first })
            .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))
    }

    pub fn containing(date: NaiveDate) -> Self {
        Month {
            first: date - chrono::Duration::days(i64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Previous month; saturates at the earliest representable month
    pub fn prev(&self) -> Self {
        self.first.pred_opt().map(Month::containing).unwrap_or(*self)
    }

    /// Next month; saturates at the latest representable month
    pub fn next(&self) -> Self {
        self.last_day()
            .succ_opt()
            .map(Month::containing)
            .unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl std::str::FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("Invalid month '{}', expected YYYY-MM", s))?;
        let year: i32 = year.parse().map_err(|_| anyhow!("Invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| anyhow!("Invalid month in '{}'", s))?;
        Month::new(year, month)
    }
}

/// One cell of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Day of month, 1-31
    pub day: u32,
    /// False for the leading/trailing days borrowed from adjacent months
    pub in_month: bool,
}

/// Whole weeks (Monday to Sunday) covering `month`
pub fn calendar_days(month: Month) -> Vec<CalendarDay> {
    let first = month.first_day();
    let last = month.last_day();

    let lead = i64::from(first.weekday().num_days_from_monday());
    let trail = 6 - i64::from(last.weekday().num_days_from_monday());
    // Clamped at the edges of the representable date range
    let start = first
        .checked_sub_signed(chrono::Duration::days(lead))
        .unwrap_or(NaiveDate::MIN);
    let end = last
        .checked_add_signed(chrono::Duration::days(trail))
        .unwrap_or(NaiveDate::MAX);

    std::iter::successors(Some(start), |date| date.succ_opt())
        .take_while(|date| *date <= end)
        .map(|date| CalendarDay {
            date,
            day: date.day(),
            in_month: month.contains(date),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub days_tracked: u32,
    pub days_in_month: u32,
    /// Rounded percentage of in-month days tracked
    pub completion_rate: u32,
}

impl MonthlyStats {
    pub fn compute(taken: &BTreeSet<NaiveDate>, month: Month) -> Self {
        let days_in_month = month.days_in_month();
        let days_tracked = taken
            .range(month.first_day()..=month.last_day())
            .count() as u32;

        let completion_rate = if days_in_month > 0 {
            (f64::from(days_tracked) / f64::from(days_in_month) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            days_tracked,
            days_in_month,
            completion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_navigation() {
        let month = Month::new(2024, 1).unwrap();
        assert_eq!(month.prev(), Month::new(2023, 12).unwrap());
        assert_eq!(month.next(), Month::new(2024, 2).unwrap());
        assert_eq!(month.next().days_in_month(), 29);
        assert_eq!(Month::containing(date(2024, 7, 31)), Month::new(2024, 7).unwrap());
    }

    #[test]
    fn test_month_parse_and_display() {
        let month: Month = "2024-05".parse().unwrap();
        assert_eq!(month.to_string(), "2024-05");
        assert!("2024-13".parse::<Month>().is_err());
        assert!("May".parse::<Month>().is_err());
    }

    #[test]
    fn test_calendar_grid_is_monday_first_whole_weeks() {
        // February 2024 starts on a Thursday and ends on a Thursday
        let days = calendar_days(Month::new(2024, 2).unwrap());

        assert_eq!(days.len() % 7, 0);
        assert_eq!(days.len(), 35);
        assert_eq!(days[0].date, date(2024, 1, 29));
        assert!(!days[0].in_month);
        assert_eq!(days[3].date, date(2024, 2, 1));
        assert!(days[3].in_month);
        assert_eq!(days.last().unwrap().date, date(2024, 3, 3));
        assert_eq!(days.iter().filter(|d| d.in_month).count(), 29);
    }

    #[test]
    fn test_calendar_grid_month_starting_monday() {
        // April 2024 starts on a Monday and ends on a Tuesday
        let days = calendar_days(Month::new(2024, 4).unwrap());
        assert_eq!(days[0].date, date(2024, 4, 1));
        assert_eq!(days.len(), 35);
    }

    #[test]
    fn test_monthly_stats() {
        let taken: BTreeSet<NaiveDate> = [
            date(2024, 3, 31),
            date(2024, 4, 1),
            date(2024, 4, 2),
            date(2024, 4, 30),
            date(2024, 5, 1),
        ]
        .into_iter()
        .collect();

        let stats = MonthlyStats::compute(&taken, Month::new(2024, 4).unwrap());
        assert_eq!(stats.days_tracked, 3);
        assert_eq!(stats.days_in_month, 30);
        assert_eq!(stats.completion_rate, 10);

        let empty = MonthlyStats::compute(&BTreeSet::new(), Month::new(2024, 4).unwrap());
        assert_eq!(empty.days_tracked, 0);
        assert_eq!(empty.completion_rate, 0);
    }

    #[test]
    fn test_completion_rate_rounds() {
        let taken: BTreeSet<NaiveDate> = (1..=2).map(|d| date(2024, 2, d)).collect();
        // 2 / 29 = 6.9%
        let stats = MonthlyStats::compute(&taken, Month::new(2024, 2).unwrap());
        assert_eq!(stats.completion_rate, 7);
    }

    #[test]
    fn test_calendar_grid_at_date_range_edges() {
        let latest: Month = "262142-12".parse().unwrap();
        let days = calendar_days(latest);
        assert_eq!(days.last().unwrap().date, NaiveDate::MAX);
        assert_eq!(days.iter().filter(|d| d.in_month).count(), 31);

        let earliest = Month::containing(NaiveDate::MIN);
        let days = calendar_days(earliest);
        assert_eq!(days[0].date, NaiveDate::MIN);
        assert_eq!(
            days.iter().filter(|d| d.in_month).count() as u32,
            earliest.days_in_month()
        );
    }
}
