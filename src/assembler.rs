use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::CalendarConfig;
use crate::grid::{self, GridLayout, YearMonth};
use crate::holidays::{Holiday, HolidayCache};
use crate::task::Task;

/// One day of a rendered month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub tasks: Vec<Task>,
    pub holidays: Vec<Holiday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthView {
    pub month: YearMonth,
    pub title: String,
    pub cells: Vec<CalendarCell>,
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

/// Joins a month grid, the holiday cache and an externally owned task set.
#[derive(Debug, Clone)]
pub struct CalendarAssembler {
    holidays: Arc<HolidayCache>,
    layout: GridLayout,
}

impl CalendarAssembler {
    pub fn new(holidays: Arc<HolidayCache>, layout: GridLayout) -> Self {
        Self { holidays, layout }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        let holidays = Arc::new(HolidayCache::new(config.lunar_policy));
        Self::new(holidays, config.grid_layout)
    }

    pub fn holidays(&self) -> &Arc<HolidayCache> {
        &self.holidays
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Cells for the month containing `anchor`, with `isToday` taken from the
    /// local wall clock.
    pub fn assemble(&self, anchor: NaiveDate, tasks: &[Task]) -> Vec<CalendarCell> {
        self.assemble_on(anchor, tasks, Local::now().date_naive())
    }

    pub fn assemble_on(&self, anchor: NaiveDate, tasks: &[Task], today: NaiveDate) -> Vec<CalendarCell> {
        let days = grid::generate(anchor, self.layout);

        let mut by_date: HashMap<NaiveDate, Vec<&Task>> = HashMap::new();
        for task in tasks {
            by_date.entry(task.date).or_default().push(task);
        }

        // Lead and trail days may belong to another year.
        let mut years: HashMap<i32, Arc<[Holiday]>> = HashMap::new();

        days.into_iter()
            .map(|day| {
                let mut day_tasks: Vec<Task> = by_date
                    .get(&day.date)
                    .map(|found| found.iter().map(|task| (*task).clone()).collect())
                    .unwrap_or_default();
                day_tasks.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

                let year_holidays = years
                    .entry(day.date.year())
                    .or_insert_with(|| self.holidays.holidays_for_year(day.date.year()));
                let holidays = year_holidays
                    .iter()
                    .filter(|holiday| holiday.date == day.date)
                    .cloned()
                    .collect();

                CalendarCell {
                    date: day.date,
                    is_current_month: day.is_current_month,
                    is_today: day.date == today,
                    tasks: day_tasks,
                    holidays,
                }
            })
            .collect()
    }

    pub fn month_view(&self, month: YearMonth, tasks: &[Task], today: NaiveDate) -> MonthView {
        MonthView {
            month,
            title: month.title(),
            cells: self.assemble_on(month.first_day(), tasks, today),
        }
    }
}

impl Default for CalendarAssembler {
    fn default() -> Self {
        Self::from_config(&CalendarConfig::default())
    }
}
