use chrono::{Datelike, NaiveDate, Weekday};
use task_calendar::grid::{self, GridLayout, YearMonth};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn grid_is_consecutive_and_week_aligned() {
    for (year, month) in [(2024, 2), (2025, 5), (2025, 12), (2026, 2), (2000, 1)] {
        let month = YearMonth::new(year, month).unwrap();
        for layout in [GridLayout::Variable, GridLayout::SixWeeks] {
            let days = grid::month_grid(month, layout);
            assert_eq!(days.len() % 7, 0, "{month} {layout:?}");
            assert_eq!(days.first().unwrap().date.weekday(), Weekday::Sun);
            assert_eq!(days.last().unwrap().date.weekday(), Weekday::Sat);
            for pair in days.windows(2) {
                assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
            }
            assert!(days.iter().any(|d| d.date == month.first_day()));
            assert!(days.iter().any(|d| d.date == month.last_day()));
        }
    }
}

#[test]
fn current_month_flag_marks_exactly_the_month() {
    let month = YearMonth::new(2024, 2).unwrap();
    let days = grid::month_grid(month, GridLayout::Variable);
    let current: Vec<_> = days.iter().filter(|d| d.is_current_month).collect();
    assert_eq!(current.len(), 29);
    assert!(current.iter().any(|d| d.date == date(2024, 2, 29)));
    assert_eq!(days.len(), 35);
    assert_eq!(days[0].date, date(2024, 1, 28));
    assert!(!days[0].is_current_month);
}

#[test]
fn month_starting_sunday_and_ending_saturday_needs_no_padding() {
    let days = grid::month_grid(YearMonth::new(2026, 2).unwrap(), GridLayout::Variable);
    assert_eq!(days.len(), 28);
    assert!(days.iter().all(|d| d.is_current_month));

    let six = grid::month_grid(YearMonth::new(2026, 2).unwrap(), GridLayout::SixWeeks);
    assert_eq!(six.len(), 42);
    assert_eq!(six.last().unwrap().date, date(2026, 3, 14));
}

#[test]
fn december_grid_rolls_into_next_year() {
    let days = grid::generate(date(2025, 12, 17), GridLayout::Variable);
    assert_eq!(days.first().unwrap().date, date(2025, 11, 30));
    assert_eq!(days.last().unwrap().date, date(2026, 1, 3));
    assert_eq!(days.len(), 35);
}

#[test]
fn year_month_navigation_and_parsing() {
    let dec = YearMonth::new(2025, 12).unwrap();
    assert_eq!(dec.succ().unwrap(), YearMonth::new(2026, 1).unwrap());
    assert_eq!(YearMonth::new(2026, 1).unwrap().pred().unwrap(), dec);
    assert_eq!("2025-12".parse::<YearMonth>().unwrap(), dec);
    assert_eq!(dec.to_string(), "2025-12");
    assert_eq!(dec.title(), "December 2025");
    assert!("2025-13".parse::<YearMonth>().is_err());
    assert!("december".parse::<YearMonth>().is_err());
    assert!(YearMonth::new(2025, 0).is_err());
}

#[test]
fn year_month_serializes_as_string() {
    let month = YearMonth::new(2024, 3).unwrap();
    let json = serde_json::to_string(&month).unwrap();
    assert_eq!(json, "\"2024-03\"");
    let back: YearMonth = serde_json::from_str(&json).unwrap();
    assert_eq!(back, month);
}
