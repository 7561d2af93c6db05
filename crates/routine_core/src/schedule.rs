//! Due-date and progress computation for a routine relative to a reference day.
//!
//! Every function here is pure: the caller supplies `today` at day granularity
//! and receives a value derived only from the routine's frequency and
//! completion history.

use crate::model::{Frequency, Routine, Weekday};
use std::fmt;
use time::macros::date;
use time::{Date, Duration};

/// How far ahead a weekly routine is searched for an uncompleted occurrence.
pub const WEEKLY_SCAN_DAYS: i64 = 365;

/// Stand-in for "last completed" when an interval routine has no history.
const NEVER_COMPLETED: Date = date!(1970 - 01 - 01);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutineStatus {
    pub next_due_date: Option<Date>,
    pub progress_percent: f64,
    pub is_completed_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    CompletedToday,
    Unscheduled,
    DueToday,
    DueTomorrow,
    DueInDays(i64),
}

impl DueStatus {
    pub fn code(&self) -> &'static str {
        match self {
            DueStatus::CompletedToday => "completed_today",
            DueStatus::Unscheduled => "unscheduled",
            DueStatus::DueToday => "due_today",
            DueStatus::DueTomorrow => "due_tomorrow",
            DueStatus::DueInDays(_) => "due_later",
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueStatus::CompletedToday => write!(f, "completed today"),
            DueStatus::Unscheduled => write!(f, "unscheduled"),
            DueStatus::DueToday => write!(f, "due today"),
            DueStatus::DueTomorrow => write!(f, "due tomorrow"),
            DueStatus::DueInDays(days) => write!(f, "due in {days} days"),
        }
    }
}

pub fn is_completed_on(routine: &Routine, date: Date) -> bool {
    routine
        .completions
        .iter()
        .any(|completion| completion.date == date)
}

pub fn next_due_date(routine: &Routine, today: Date) -> Option<Date> {
    match &routine.frequency {
        Frequency::Weekly { days } => {
            if days.is_empty() {
                return None;
            }

            (0..WEEKLY_SCAN_DAYS)
                .filter_map(|offset| today.checked_add(Duration::days(offset)))
                .find(|day| days.contains(&Weekday::of(*day)) && !is_completed_on(routine, *day))
        }
        Frequency::Interval { days } => {
            let last = routine.last_completed().unwrap_or(NEVER_COMPLETED);
            let candidate = last
                .checked_add(Duration::days(i64::from(*days)))
                .unwrap_or(Date::MAX);
            // Overdue routines are due now, never in the past.
            Some(candidate.max(today))
        }
    }
}

pub fn progress_percent(routine: &Routine, today: Date) -> f64 {
    if let Frequency::Weekly { days } = &routine.frequency
        && days.is_empty()
    {
        return 0.0;
    }

    if is_completed_on(routine, today) {
        return 100.0;
    }

    match &routine.frequency {
        Frequency::Weekly { days } => {
            let since_sunday = i64::from(Weekday::of(today).number());
            let Some(week_start) = today.checked_sub(Duration::days(since_sunday)) else {
                return 0.0;
            };

            let mut total_due = 0u32;
            let mut completed_due = 0u32;
            for offset in 0..7 {
                let Some(day) = week_start.checked_add(Duration::days(offset)) else {
                    break;
                };
                if days.contains(&Weekday::of(day)) {
                    total_due += 1;
                    if is_completed_on(routine, day) {
                        completed_due += 1;
                    }
                }
            }

            if total_due == 0 {
                0.0
            } else {
                100.0 * f64::from(completed_due) / f64::from(total_due)
            }
        }
        Frequency::Interval { days } => {
            let last = routine.last_completed().unwrap_or(NEVER_COMPLETED);
            let elapsed_days = (today - last).whole_days();
            let cadence = f64::from((*days).max(1));
            (100.0 * elapsed_days as f64 / cadence).clamp(0.0, 100.0)
        }
    }
}

pub fn compute_status(routine: &Routine, today: Date) -> RoutineStatus {
    let next_due_date = next_due_date(routine, today);
    let is_completed_today = is_completed_on(routine, today);
    let progress_percent = match next_due_date {
        Some(_) => progress_percent(routine, today),
        None => 0.0,
    };

    RoutineStatus {
        next_due_date,
        progress_percent,
        is_completed_today,
    }
}

pub fn due_status(routine: &Routine, today: Date) -> DueStatus {
    due_status_from(&compute_status(routine, today), today)
}

pub fn due_status_from(status: &RoutineStatus, today: Date) -> DueStatus {
    if status.is_completed_today {
        return DueStatus::CompletedToday;
    }

    let Some(next_due) = status.next_due_date else {
        return DueStatus::Unscheduled;
    };

    if next_due <= today {
        return DueStatus::DueToday;
    }

    match (next_due - today).whole_days() {
        1 => DueStatus::DueTomorrow,
        days => DueStatus::DueInDays(days),
    }
}
