use chrono::{Datelike, NaiveDate};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::rules::generate_holidays_for_year;
use super::{Holiday, LunarPolicy};
use crate::grid::YearMonth;

/// Get-or-compute store of holidays per year.
///
/// A year is derived on its first lookup and kept for the lifetime of the
/// cache. Misses hold the upgradable lock while computing, so concurrent
/// callers never derive the same year twice.
#[derive(Debug, Default)]
pub struct HolidayCache {
    policy: LunarPolicy,
    years: RwLock<HashMap<i32, Arc<[Holiday]>>>,
    computations: AtomicUsize,
}

impl HolidayCache {
    pub fn new(policy: LunarPolicy) -> Self {
        Self {
            policy,
            years: RwLock::new(HashMap::new()),
            computations: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> LunarPolicy {
        self.policy
    }

    pub fn holidays_for_year(&self, year: i32) -> Arc<[Holiday]> {
        if let Some(holidays) = self.years.read().get(&year) {
            return Arc::clone(holidays);
        }

        let guard = self.years.upgradable_read();
        if let Some(holidays) = guard.get(&year) {
            return Arc::clone(holidays);
        }
        let holidays = self.compute(year);
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.insert(year, Arc::clone(&holidays));
        holidays
    }

    pub fn holidays_for_month(&self, month: YearMonth) -> Vec<Holiday> {
        self.holidays_for_year(month.year())
            .iter()
            .filter(|holiday| holiday.date.month() == month.month())
            .cloned()
            .collect()
    }

    pub fn holidays_for_date(&self, date: NaiveDate) -> Vec<Holiday> {
        self.holidays_for_year(date.year())
            .iter()
            .filter(|holiday| holiday.date == date)
            .cloned()
            .collect()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays_for_year(date.year())
            .iter()
            .any(|holiday| holiday.date == date)
    }

    /// Derive every missing year in parallel. Returns how many years were
    /// added; years already cached are left untouched.
    pub fn prefetch<I>(&self, years: I) -> usize
    where
        I: IntoIterator<Item = i32>,
    {
        let missing: Vec<i32> = {
            let guard = self.years.read();
            let mut missing: Vec<i32> = years
                .into_iter()
                .filter(|year| !guard.contains_key(year))
                .collect();
            missing.sort_unstable();
            missing.dedup();
            missing
        };
        if missing.is_empty() {
            return 0;
        }

        let computed: Vec<(i32, Arc<[Holiday]>)> = missing
            .par_iter()
            .map(|year| (*year, self.compute(*year)))
            .collect();

        let mut guard = self.years.write();
        let mut added = 0;
        for (year, holidays) in computed {
            if let std::collections::hash_map::Entry::Vacant(slot) = guard.entry(year) {
                slot.insert(holidays);
                added += 1;
            }
        }
        tracing::debug!(added, "prefetched holiday years");
        added
    }

    pub fn cached_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.years.read().keys().copied().collect();
        years.sort_unstable();
        years
    }

    /// Number of times a year has been derived from the rules.
    pub fn computation_count(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    fn compute(&self, year: i32) -> Arc<[Holiday]> {
        self.computations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(year, policy = ?self.policy, "deriving holidays");
        generate_holidays_for_year(year, self.policy).into()
    }
}
