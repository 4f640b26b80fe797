//! Month grids of Sunday-first weeks.
//!
//! A grid covers every day of its month plus the lead days borrowed from the
//! previous month and the trail days borrowed from the next one, so the first
//! cell is always a Sunday and the last cell a Saturday.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u32),
    #[error("year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),
    #[error("invalid year-month '{0}' (expected YYYY-MM)")]
    Parse(String),
}

pub type GridResult<T> = Result<T, GridError>;

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> GridResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(GridError::InvalidMonth(month));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(GridError::YearOutOfRange(year))?;
        Ok(Self { first })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
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
        self.first + Days::new(u64::from(self.days_in_month() - 1))
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month() {
            4 | 6 | 9 | 11 => 30,
            2 if self.first.leap_year() => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// The following month, rolling into January of the next year.
    pub fn succ(&self) -> GridResult<Self> {
        match self.month() {
            12 => Self::new(self.year() + 1, 1),
            month => Self::new(self.year(), month + 1),
        }
    }

    /// The preceding month, rolling back into December of the previous year.
    pub fn pred(&self) -> GridResult<Self> {
        match self.month() {
            1 => Self::new(self.year() - 1, 12),
            month => Self::new(self.year(), month - 1),
        }
    }

    /// Human title such as "October 2026".
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parse_err = || GridError::Parse(trimmed.to_string());
        let (year, month) = trimmed.rsplit_once('-').ok_or_else(parse_err)?;
        let year: i32 = year.parse().map_err(|_| parse_err())?;
        let month: u32 = month.parse().map_err(|_| parse_err())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// How many weeks a month grid spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    /// Just enough weeks to cover the month (four to six).
    #[default]
    Variable,
    /// Always six weeks (42 cells).
    SixWeeks,
}

/// One date in a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
}

/// Grid for the month containing `anchor`.
pub fn generate(anchor: NaiveDate, layout: GridLayout) -> Vec<GridDay> {
    month_grid(YearMonth::from_date(anchor), layout)
}

pub fn month_grid(month: YearMonth, layout: GridLayout) -> Vec<GridDay> {
    let first = month.first_day();
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);

    let last = month.last_day();
    let end = match layout {
        GridLayout::Variable => {
            let trail = 6 - u64::from(last.weekday().num_days_from_sunday());
            last.checked_add_days(Days::new(trail))
        }
        GridLayout::SixWeeks => start.checked_add_days(Days::new(41)),
    }
    .unwrap_or(last);

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| GridDay {
            date,
            is_current_month: month.contains(date),
        })
        .collect()
}
