use std::fmt;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::{FlowError, Result};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(FlowError::InvalidDateRange(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn from_strs(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

const PERIOD_PATTERN: &str = r"^(\d{4})(?:-(?:(\d{2})(?:-(\d{2}))?|[Qq]([1-4])))?$";
const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| FlowError::Other(format!("Invalid pattern {re:?}: {e}")))
}

fn checked_year(raw: &str) -> Result<i32> {
    let year: i32 = raw
        .parse()
        .map_err(|_| FlowError::InvalidPeriod(format!("invalid year: {raw}")))?;
    if !(1900..=2100).contains(&year) {
        return Err(FlowError::InvalidPeriod(format!(
            "invalid year: {year}. Must be between 1900 and 2100"
        )));
    }
    Ok(year)
}

fn checked_month(raw: &str) -> Result<u32> {
    let month: u32 = raw
        .parse()
        .map_err(|_| FlowError::InvalidPeriod(format!("invalid month: {raw}")))?;
    if !(1..=12).contains(&month) {
        return Err(FlowError::InvalidPeriod(format!(
            "invalid month: {month}. Must be between 01 and 12"
        )));
    }
    Ok(month)
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| FlowError::InvalidPeriod(format!("invalid date: {year:04}-{month:02}-{day:02}")))
}

/// First and last day of a month. Handles leap years.
fn month_range(year: i32, month: u32) -> Result<DateRange> {
    let start = ymd(year, month, 1)?;
    let next = if month == 12 { ymd(year + 1, 1, 1)? } else { ymd(year, month + 1, 1)? };
    let end = next
        .pred_opt()
        .ok_or_else(|| FlowError::InvalidPeriod(format!("invalid month: {year}-{month:02}")))?;
    Ok(DateRange { start, end })
}

/// Parse `YYYY`, `YYYY-MM`, `YYYY-QN` or `YYYY-MM-DD` into a date range.
pub fn parse_period(period: &str) -> Result<DateRange> {
    let re = pattern(PERIOD_PATTERN)?;
    let caps = re.captures(period.trim()).ok_or_else(|| {
        FlowError::InvalidPeriod(format!(
            "\"{period}\". Expected YYYY, YYYY-MM, YYYY-QX, or YYYY-MM-DD"
        ))
    })?;
    let year = checked_year(&caps[1])?;

    match (caps.get(2), caps.get(3), caps.get(4)) {
        (Some(month), Some(day), _) => {
            let month = checked_month(month.as_str())?;
            let day: u32 = day
                .as_str()
                .parse()
                .map_err(|_| FlowError::InvalidPeriod(format!("invalid date: {period}")))?;
            let date = ymd(year, month, day)?;
            Ok(DateRange { start: date, end: date })
        }
        (Some(month), None, _) => month_range(year, checked_month(month.as_str())?),
        (None, _, Some(quarter)) => {
            let q: u32 = quarter
                .as_str()
                .parse()
                .map_err(|_| FlowError::InvalidPeriod(format!("invalid quarter: {period}")))?;
            let first = month_range(year, (q - 1) * 3 + 1)?;
            let last = month_range(year, q * 3)?;
            Ok(DateRange { start: first.start, end: last.end })
        }
        _ => Ok(DateRange { start: ymd(year, 1, 1)?, end: ymd(year, 12, 31)? }),
    }
}

/// The month containing `today`.
pub fn current_month(today: NaiveDate) -> Result<DateRange> {
    month_range(today.year(), today.month())
}

/// Strict `YYYY-MM-DD` that names a real calendar day.
pub fn is_valid_date(s: &str) -> bool {
    pattern(DATE_PATTERN).is_ok_and(|re| re.is_match(s)) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    if !is_valid_date(s) {
        return Err(FlowError::InvalidDateRange(format!(
            "invalid date \"{s}\", expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| FlowError::InvalidDateRange(e.to_string()))
}
