use chrono::{Datelike, Days, Duration, NaiveDate, Weekday};

use super::{Holiday, HolidayType, LunarPolicy};
use crate::grid::YearMonth;

struct FixedHoliday {
    name: &'static str,
    month: u32,
    day: u32,
    kind: HolidayType,
}

const FIXED_HOLIDAYS: [FixedHoliday; 11] = [
    FixedHoliday { name: "New Year's Day", month: 1, day: 1, kind: HolidayType::National },
    FixedHoliday { name: "Valentine's Day", month: 2, day: 14, kind: HolidayType::Observance },
    FixedHoliday { name: "St. Patrick's Day", month: 3, day: 17, kind: HolidayType::Observance },
    FixedHoliday { name: "Earth Day", month: 4, day: 22, kind: HolidayType::International },
    FixedHoliday { name: "Independence Day", month: 7, day: 4, kind: HolidayType::National },
    FixedHoliday { name: "International Day of Peace", month: 9, day: 21, kind: HolidayType::International },
    FixedHoliday { name: "Halloween", month: 10, day: 31, kind: HolidayType::Observance },
    FixedHoliday { name: "Veterans Day", month: 11, day: 11, kind: HolidayType::National },
    FixedHoliday { name: "Christmas Eve", month: 12, day: 24, kind: HolidayType::Observance },
    FixedHoliday { name: "Christmas Day", month: 12, day: 25, kind: HolidayType::National },
    FixedHoliday { name: "New Year's Eve", month: 12, day: 31, kind: HolidayType::Observance },
];

enum Rule {
    Nth { month: u32, weekday: Weekday, n: u32 },
    Last { month: u32, weekday: Weekday },
}

// Emission order matters: it is the order holidays appear on a cell.
const WEEKDAY_HOLIDAYS: [(&str, Rule, HolidayType); 8] = [
    ("Martin Luther King Jr. Day", Rule::Nth { month: 1, weekday: Weekday::Mon, n: 3 }, HolidayType::National),
    ("Presidents Day", Rule::Nth { month: 2, weekday: Weekday::Mon, n: 3 }, HolidayType::National),
    ("Mother's Day", Rule::Nth { month: 5, weekday: Weekday::Sun, n: 2 }, HolidayType::Observance),
    ("Memorial Day", Rule::Last { month: 5, weekday: Weekday::Mon }, HolidayType::National),
    ("Father's Day", Rule::Nth { month: 6, weekday: Weekday::Sun, n: 3 }, HolidayType::Observance),
    ("Labor Day", Rule::Nth { month: 9, weekday: Weekday::Mon, n: 1 }, HolidayType::National),
    ("Columbus Day", Rule::Nth { month: 10, weekday: Weekday::Mon, n: 2 }, HolidayType::National),
    ("Thanksgiving", Rule::Nth { month: 11, weekday: Weekday::Thu, n: 4 }, HolidayType::National),
];

/// Raw month/day produced by the approximate lunar formula. The values are
/// not guaranteed to name a real day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LunarComponents {
    pub month: i64,
    pub day: i64,
}

impl LunarComponents {
    /// Lunar New Year: month `1 + floor(s / 30)`, day `20 + s rem 30` where
    /// `s = floor((year - 2000) * 0.2) rem 30`.
    pub fn lunar_new_year(year: i32) -> Self {
        let offset = lunar_offset(year, 0.2);
        Self {
            month: 1 + offset.div_euclid(30),
            day: 20 + offset % 30,
        }
    }

    /// Mid-Autumn Festival: month `8 + floor(a / 30)`, day `10 + a rem 30`
    /// where `a = floor((year - 2000) * 0.3) rem 30`.
    pub fn mid_autumn(year: i32) -> Self {
        let offset = lunar_offset(year, 0.3);
        Self {
            month: 8 + offset.div_euclid(30),
            day: 10 + offset % 30,
        }
    }

    pub fn resolve(&self, year: i32, policy: LunarPolicy) -> Option<NaiveDate> {
        match policy {
            LunarPolicy::Faithful => {
                let month = u32::try_from(self.month).ok()?;
                let day = u32::try_from(self.day).ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            }
            LunarPolicy::Rollover => {
                let months = i64::from(year) * 12 + (self.month - 1);
                let rolled_year = i32::try_from(months.div_euclid(12)).ok()?;
                let rolled_month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
                let first = NaiveDate::from_ymd_opt(rolled_year, rolled_month, 1)?;
                let date = first.checked_add_signed(Duration::try_days(self.day - 1)?)?;
                (date.year() == year).then_some(date)
            }
        }
    }
}

// `%` truncates toward zero, matching the remainder the formula was written
// against; years before 2000 therefore give negative offsets.
fn lunar_offset(year: i32, factor: f64) -> i64 {
    let scaled = (i64::from(year) - 2000) as f64 * factor;
    (scaled.floor() as i64) % 30
}

/// The `n`th (1-based) `weekday` of `month`: the first occurrence advanced by
/// `n - 1` weeks. `None` when that lands outside the month.
pub fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let first = YearMonth::new(year, month).ok()?.first_day();
    let offset = (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
    let day = 1 + offset + (n - 1) * 7;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The last `weekday` of `month`, found by stepping back from the month's
/// final day.
pub fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = YearMonth::new(year, month).ok()?.last_day();
    let back = (last.weekday().num_days_from_sunday() + 7 - weekday.num_days_from_sunday()) % 7;
    last.checked_sub_days(Days::new(u64::from(back)))
}

/// Every holiday of `year`, in emission order: fixed dates, weekday rules,
/// then the approximate lunar dates.
pub fn generate_holidays_for_year(year: i32, policy: LunarPolicy) -> Vec<Holiday> {
    let mut holidays = Vec::with_capacity(FIXED_HOLIDAYS.len() + WEEKDAY_HOLIDAYS.len() + 2);

    for fixed in &FIXED_HOLIDAYS {
        if let Some(date) = NaiveDate::from_ymd_opt(year, fixed.month, fixed.day) {
            holidays.push(Holiday::new(fixed.name, date, fixed.kind));
        }
    }

    for (name, rule, kind) in &WEEKDAY_HOLIDAYS {
        let date = match *rule {
            Rule::Nth { month, weekday, n } => nth_weekday(year, month, weekday, n),
            Rule::Last { month, weekday } => last_weekday(year, month, weekday),
        };
        if let Some(date) = date {
            holidays.push(Holiday::new(*name, date, *kind));
        }
    }

    let lunar = [
        ("Lunar New Year", LunarComponents::lunar_new_year(year)),
        ("Mid-Autumn Festival", LunarComponents::mid_autumn(year)),
    ];
    for (name, components) in lunar {
        match components.resolve(year, policy) {
            Some(date) => holidays.push(Holiday::new(name, date, HolidayType::International)),
            None => tracing::debug!(
                year,
                holiday = name,
                month = components.month,
                day = components.day,
                ?policy,
                "lunar approximation is not a calendar date; omitted"
            ),
        }
    }

    holidays
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lunar_offsets_use_truncating_remainder() {
        assert_eq!(lunar_offset(2000, 0.2), 0);
        assert_eq!(lunar_offset(2025, 0.2), 5);
        assert_eq!(lunar_offset(2025, 0.3), 7);
        assert_eq!(lunar_offset(1990, 0.2), -2);
        assert_eq!(lunar_offset(2160, 0.2), 2);
    }

    #[test]
    fn fifth_weekday_past_month_end_is_none() {
        // February 2025 has only four Mondays.
        assert_eq!(nth_weekday(2025, 2, Weekday::Mon, 5), None);
        assert_eq!(nth_weekday(2025, 2, Weekday::Mon, 0), None);
    }
}
