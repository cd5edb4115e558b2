//! Month arithmetic shared by the billing resolver, the installment expander,
//! and the monthly aggregations.
//!
//! Day-of-month overflow is always clamped to the last day of the target
//! month: day 31 in April becomes April 30, day 30 in February becomes the
//! 28th (or 29th in leap years).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{PlannerError, Result};

/// A calendar month. Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(PlannerError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Moves by `months` calendar months (negative values go back).
    ///
    /// Fails when the target year does not fit the calendar.
    pub fn shift(&self, months: i32) -> Result<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(months);
        let year = i32::try_from(index.div_euclid(12)).map_err(|_| {
            PlannerError::InvalidDate(format!("{self} shifted by {months} months is out of range"))
        })?;
        Ok(Self {
            year,
            month: index.rem_euclid(12) as u32 + 1,
        })
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Date inside this month on `day`, clamped to the month's last day.
    pub fn day_clamped(&self, day: u32) -> Result<NaiveDate> {
        let day = day.clamp(1, self.days());
        NaiveDate::from_ymd_opt(self.year, self.month, day).ok_or_else(|| {
            PlannerError::InvalidDate(format!("{self} is outside the supported calendar range"))
        })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PlannerError::InvalidInput(format!("expected YYYY-MM, got `{s}`"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month)
    }
}

/// Shifts `date` by `months`, keeping its day of month where possible.
pub fn shift_month(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    YearMonth::of(date).shift(months)?.day_clamped(date.day())
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
