//! Derived statistics over a task snapshot.
//!
//! Every function here is pure over an immutable snapshot of the task
//! collection (already filtered to one category where that matters) plus
//! "today". Nothing caches and nothing counts incrementally; recomputation is
//! cheap and cannot drift from the records.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::datekey::{add_days, day_key, label_date, week_keys_mon_sun, WeekdayKey};
use crate::error::{Error, Result};
use crate::plan::WeeklyPlan;
use crate::task::Task;

/// Number of days in the cumulative completion window.
pub const CUMULATIVE_WINDOW_DAYS: usize = 14;

// =============================================================================
// Counts
// =============================================================================

/// Simple snapshot counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub done: usize,
    pub active: usize,
}

pub fn counts(tasks: &[Task]) -> Counts {
    let total = tasks.len();
    let done = tasks.iter().filter(|t| t.done).count();
    Counts {
        total,
        done,
        active: total - done,
    }
}

// =============================================================================
// Streak
// =============================================================================

/// Count consecutive calendar days ending today that each have at least one
/// completed task. Today without a completion means a streak of zero; there
/// is no grace day.
pub fn streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let done_days: HashSet<&str> = tasks
        .iter()
        .filter(|t| t.done)
        .filter_map(|t| t.done_day.as_deref())
        .collect();

    let mut run = 0;
    let mut day = today;
    while done_days.contains(day_key(day).as_str()) {
        run += 1;
        day = add_days(day, -1);
    }
    run
}

// =============================================================================
// Weekly aggregates
// =============================================================================

/// Per-day summary for the Monday-start week containing "today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    /// The day key
    pub day_key: String,
    /// Tasks whose effective due day is this day
    pub planned: usize,
    /// Tasks completed on this day
    pub done: usize,
    /// Planned workout label when the weekly plan enables this weekday
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_label: Option<String>,
}

/// Planned/done counts per day of the current week, with the weekly plan's
/// label attached where that weekday is enabled.
pub fn week_overview(
    tasks: &[Task],
    plan: Option<&WeeklyPlan>,
    today: NaiveDate,
) -> Vec<DaySummary> {
    let today_key = day_key(today);
    week_keys_mon_sun(today)
        .into_iter()
        .zip(WeekdayKey::ALL)
        .map(|(key, weekday)| {
            let planned = tasks
                .iter()
                .filter(|t| t.effective_due_day(&today_key) == key)
                .count();
            let done = tasks
                .iter()
                .filter(|t| t.done && t.done_day.as_deref() == Some(key.as_str()))
                .count();
            let plan_label = plan.and_then(|p| {
                let row = p.row(weekday);
                row.enabled.then(|| row.part.label().to_string())
            });
            DaySummary {
                day_key: key,
                planned,
                done,
                plan_label,
            }
        })
        .collect()
}

/// Partition tasks by effective due day across the current Mon..Sun week.
///
/// Within each day: incomplete before complete, then newest-created first.
pub fn group_week(tasks: &[Task], today: NaiveDate) -> Vec<(String, Vec<Task>)> {
    let today_key = day_key(today);
    week_keys_mon_sun(today)
        .into_iter()
        .map(|key| {
            let mut day_tasks: Vec<Task> = tasks
                .iter()
                .filter(|t| t.effective_due_day(&today_key) == key)
                .cloned()
                .collect();
            day_tasks.sort_by(|left, right| {
                left.done
                    .cmp(&right.done)
                    .then_with(|| right.created_at.cmp(&left.created_at))
            });
            (key, day_tasks)
        })
        .collect()
}

// =============================================================================
// 14-day cumulative series
// =============================================================================

/// Cumulative completion series: one value and one `DD.MM.` label per day,
/// oldest day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionSeries {
    pub values: Vec<u32>,
    pub labels: Vec<String>,
}

/// Running cumulative count of completions over the 14 calendar days ending
/// today.
pub fn cumulative_14d(tasks: &[Task], today: NaiveDate) -> CompletionSeries {
    let mut values = Vec::with_capacity(CUMULATIVE_WINDOW_DAYS);
    let mut labels = Vec::with_capacity(CUMULATIVE_WINDOW_DAYS);
    let mut running = 0u32;

    for offset in (0..CUMULATIVE_WINDOW_DAYS).rev() {
        let key = day_key(add_days(today, -(offset as i64)));
        running += tasks
            .iter()
            .filter(|t| t.done && t.done_day.as_deref() == Some(key.as_str()))
            .count() as u32;
        values.push(running);
        labels.push(label_date(&key));
    }

    CompletionSeries { values, labels }
}

// =============================================================================
// Filtering
// =============================================================================

/// Filter for the flat task list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Today,
    Tomorrow,
    Week,
    Active,
    Done,
}

impl Default for TaskFilter {
    fn default() -> Self {
        TaskFilter::All
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFilter::All => write!(f, "all"),
            TaskFilter::Today => write!(f, "today"),
            TaskFilter::Tomorrow => write!(f, "tomorrow"),
            TaskFilter::Week => write!(f, "week"),
            TaskFilter::Active => write!(f, "active"),
            TaskFilter::Done => write!(f, "done"),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "today" => Ok(TaskFilter::Today),
            "tomorrow" => Ok(TaskFilter::Tomorrow),
            "week" => Ok(TaskFilter::Week),
            "active" => Ok(TaskFilter::Active),
            "done" => Ok(TaskFilter::Done),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid filter '{}'. Expected: all, today, tomorrow, week, active, done",
                s
            ))),
        }
    }
}

/// Apply a filter and the default list ordering: ascending effective due day,
/// then incomplete before complete, then newest-created first.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter, today: NaiveDate) -> Vec<Task> {
    let today_key = day_key(today);
    let tomorrow_key = day_key(add_days(today, 1));
    let week = week_keys_mon_sun(today);

    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|t| match filter {
            TaskFilter::All => true,
            TaskFilter::Today => t.effective_due_day(&today_key) == today_key,
            TaskFilter::Tomorrow => t.effective_due_day(&today_key) == tomorrow_key,
            TaskFilter::Week => week.contains(&t.effective_due_day(&today_key)),
            TaskFilter::Active => !t.done,
            TaskFilter::Done => t.done,
        })
        .cloned()
        .collect();

    out.sort_by(|left, right| {
        left.effective_due_day(&today_key)
            .cmp(&right.effective_due_day(&today_key))
            .then_with(|| left.done.cmp(&right.done))
            .then_with(|| right.created_at.cmp(&left.created_at))
    });
    out
}

// =============================================================================
// Tests
// =============================================================================
