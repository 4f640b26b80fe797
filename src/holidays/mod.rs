use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod rules;

pub use cache::HolidayCache;
pub use rules::{LunarComponents, generate_holidays_for_year, last_weekday, nth_weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayType {
    National,
    International,
    Religious,
    Observance,
}

impl HolidayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidayType::National => "national",
            HolidayType::International => "international",
            HolidayType::Religious => "religious",
            HolidayType::Observance => "observance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: HolidayType,
}

impl Holiday {
    pub fn new(name: impl Into<String>, date: NaiveDate, kind: HolidayType) -> Self {
        Self {
            name: name.into(),
            date,
            kind,
        }
    }
}

/// What to do with the approximate lunar dates when their raw month/day
/// components do not name a real calendar day (for example January 34th).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LunarPolicy {
    /// Keep the formula as-is and omit entries whose components are not a
    /// valid date.
    #[default]
    Faithful,
    /// Carry overflowing days and months forward (January 34th becomes
    /// February 3rd). Entries that land outside the requested year are omitted.
    Rollover,
}
