//! Month calendar and per-day activity grouping for the agenda screens.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

use crate::{
    errors::{ApiError, Result},
    models::Task,
};

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

pub const WEEKDAY_SHORT_NAMES: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// A calendar month. Months are 1-12, as the tasks endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| ApiError::InvalidRequest(format!("Invalid month {}-{}", year, month)))
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - chrono::Days::new(u64::from(date.day0())),
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

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[self.first.month0() as usize]
    }

    pub fn days_in_month(&self) -> u32 {
        match self.first.checked_add_months(Months::new(1)) {
            Some(next) => (next - self.first).num_days() as u32,
            // Only reachable for the last month chrono can represent.
            None => 31,
        }
    }

    /// Weekday of the 1st, 0 = Sunday
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    pub fn shift(&self, delta: i32) -> Result<Self> {
        let months = Months::new(delta.unsigned_abs());
        let first = if delta >= 0 {
            self.first.checked_add_months(months)
        } else {
            self.first.checked_sub_months(months)
        };
        first
            .map(|first| Self { first })
            .ok_or_else(|| ApiError::InvalidRequest(format!("Cannot move {} months from {}", delta, self.first)))
    }

    /// Sunday-first grid cells: leading blanks, then days 1..=N.
    pub fn calendar_grid(&self) -> Vec<Option<u32>> {
        let blanks = self.first_weekday() as usize;
        let mut cells = vec![None; blanks];
        cells.extend((1..=self.days_in_month()).map(Some));
        cells
    }

    /// Keep a selected day valid after moving to this month.
    pub fn clamp_day(&self, day: u32) -> u32 {
        day.clamp(1, self.days_in_month())
    }
}

/// One month of tasks grouped by day, each day ordered by time.
#[derive(Debug, Clone)]
pub struct AgendaMonth {
    cursor: MonthCursor,
    by_day: BTreeMap<u32, Vec<Task>>,
}

impl AgendaMonth {
    pub fn new(cursor: MonthCursor, tasks: Vec<Task>) -> Self {
        let mut by_day: BTreeMap<u32, Vec<Task>> = BTreeMap::new();
        for task in tasks {
            if !cursor.contains(task.date) {
                debug!("Skipping task {} dated {} outside {}-{}", task.id, task.date, cursor.year(), cursor.month());
                continue;
            }
            by_day.entry(task.date.day()).or_default().push(task);
        }
        for day in by_day.values_mut() {
            day.sort_by_key(|task| task.time);
        }
        Self { cursor, by_day }
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn activities_on(&self, day: u32) -> &[Task] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn activity_count(&self, day: u32) -> usize {
        self.activities_on(day).len()
    }

    /// Days with at least one activity, ascending
    pub fn busy_days(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.by_day.iter().map(|(day, tasks)| (*day, tasks.len()))
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }

    /// e.g. "Sábado, 9 de Março"
    pub fn day_title(&self, day: u32) -> Option<String> {
        let date = self.cursor.date(day)?;
        let weekday = WEEKDAY_NAMES[date.weekday().num_days_from_sunday() as usize];
        Some(format!("{}, {} de {}", weekday, day, self.cursor.name()))
    }
}

/// Home screen reminders: the month's tasks in date order.
pub fn upcoming_reminders(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| (task.date, task.time));
    tasks
}
