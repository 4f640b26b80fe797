use chrono::{Local, NaiveDate};
use std::sync::Arc;
use task_calendar::{
    CalendarAssembler, CalendarConfig, GridLayout, HolidayCache, LunarPolicy, Task, YearMonth,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn cells_carry_sorted_tasks_and_holidays() {
    let assembler = CalendarAssembler::default();
    let memorial = date(2025, 5, 26);
    let tasks = vec![
        Task::new("b", "Second", memorial, 1),
        Task::new("a", "First", memorial, 0),
        Task::new("c", "Elsewhere", date(2025, 6, 20), 0),
    ];

    let cells = assembler.assemble_on(date(2025, 5, 14), &tasks, date(2025, 5, 20));
    assert_eq!(cells.len(), 35);

    let cell = cells.iter().find(|c| c.date == memorial).unwrap();
    let titles: Vec<_> = cell.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(cell.holidays.len(), 1);
    assert_eq!(cell.holidays[0].name, "Memorial Day");
    assert!(cell.is_current_month);

    let today: Vec<_> = cells.iter().filter(|c| c.is_today).collect();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].date, date(2025, 5, 20));

    assert!(cells.iter().all(|c| c.tasks.iter().all(|t| t.id != "c")));
}

#[test]
fn trailing_days_get_next_years_holidays() {
    let assembler = CalendarAssembler::default();
    let view = assembler.month_view(YearMonth::new(2025, 12).unwrap(), &[], date(2000, 1, 1));
    assert_eq!(view.title, "December 2025");

    let new_year = view.cells.iter().find(|c| c.date == date(2026, 1, 1)).unwrap();
    assert!(!new_year.is_current_month);
    assert_eq!(new_year.holidays[0].name, "New Year's Day");
    assert!(view.cells.iter().all(|c| !c.is_today));
    assert_eq!(assembler.holidays().cached_years(), vec![2025, 2026]);
}

#[test]
fn today_outside_grid_marks_nothing() {
    let assembler = CalendarAssembler::default();
    let cells = assembler.assemble_on(date(2025, 2, 1), &[], date(2025, 8, 1));
    assert!(cells.iter().all(|c| !c.is_today));
}

#[test]
fn weeks_split_cells_into_rows_of_seven() {
    let holidays = Arc::new(HolidayCache::new(LunarPolicy::Faithful));
    let assembler = CalendarAssembler::new(holidays, GridLayout::SixWeeks);
    let view = assembler.month_view(YearMonth::new(2026, 2).unwrap(), &[], date(2026, 2, 14));
    assert_eq!(view.weeks().count(), 6);
    assert!(view.weeks().all(|week| week.len() == 7));

    let valentines = view.cells.iter().find(|c| c.date == date(2026, 2, 14)).unwrap();
    assert!(valentines.is_today);
    assert_eq!(valentines.holidays[0].name, "Valentine's Day");
}

#[test]
fn assembler_follows_config() {
    let config = CalendarConfig {
        grid_layout: GridLayout::SixWeeks,
        lunar_policy: LunarPolicy::Rollover,
        prefetch_years: 0,
    };
    let assembler = CalendarAssembler::from_config(&config);
    assert_eq!(assembler.layout(), GridLayout::SixWeeks);
    assert_eq!(assembler.holidays().policy(), LunarPolicy::Rollover);

    let view = assembler.month_view(YearMonth::new(2070, 2).unwrap(), &[], date(2070, 1, 1));
    let lunar = view.cells.iter().find(|c| c.date == date(2070, 2, 3)).unwrap();
    assert!(lunar.holidays.iter().any(|h| h.name == "Lunar New Year"));
}

#[test]
fn month_view_serializes_camel_case() {
    let assembler = CalendarAssembler::default();
    let tasks = vec![Task::new("a", "Write", date(2025, 5, 2), 0)];
    let view = assembler.month_view(YearMonth::new(2025, 5).unwrap(), &tasks, date(2025, 5, 2));
    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["month"], "2025-05");
    let cell = &value["cells"][5];
    assert_eq!(cell["date"], "2025-05-02");
    assert_eq!(cell["isCurrentMonth"], true);
    assert_eq!(cell["isToday"], true);
    assert_eq!(cell["tasks"][0]["title"], "Write");
}

#[test]
fn assemble_marks_the_wall_clock_today() {
    let assembler = CalendarAssembler::default();
    let before = Local::now().date_naive();
    let cells = assembler.assemble(before, &[]);
    let after = Local::now().date_naive();

    let today: Vec<_> = cells.iter().filter(|c| c.is_today).collect();
    assert_eq!(today.len(), 1);
    // A run straddling midnight may land on either side.
    assert!(today[0].date == before || today[0].date == after);

    let last_year = before - chrono::Days::new(400);
    let cells = assembler.assemble(last_year, &[]);
    assert!(cells.iter().all(|c| !c.is_today));
}
