use std::{collections::BTreeSet, slice::Chunks};

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use strum::AsRefStr;

use crate::{WorkoutRecord, temporal};

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "snake_case")]
pub enum CalendarIntensity {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl CalendarIntensity {
    #[must_use]
    pub fn from_workouts(workouts: usize) -> Self {
        match workouts {
            0 => CalendarIntensity::None,
            1 => CalendarIntensity::Low,
            2 => CalendarIntensity::Medium,
            3 => CalendarIntensity::High,
            _ => CalendarIntensity::VeryHigh,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub workouts: Vec<&'a WorkoutRecord>,
    pub volume: f32,
    pub intensity: CalendarIntensity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth<'a> {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay<'a>>,
    pub days_with_workouts: usize,
    pub total_workouts: usize,
}

impl<'a> CalendarMonth<'a> {
    /// Rows of seven days, starting on Monday.
    pub fn weeks(&self) -> Chunks<'_, CalendarDay<'a>> {
        self.days.chunks(7)
    }
}

/// Build the grid of a month, padded with the days of the adjacent months to full weeks.
#[must_use]
pub fn calendar_month<'a>(
    records: &[&'a WorkoutRecord],
    year: i32,
    month: u32,
) -> Option<CalendarMonth<'a>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first
        .checked_add_months(Months::new(1))?
        .pred_opt()?;
    let grid_start = temporal::week_of(first, Weekday::Mon).first;
    let grid_end = temporal::week_of(last, Weekday::Mon).last;

    let by_date = temporal::group_by_date(records);
    let days = grid_start
        .iter_days()
        .take_while(|d| *d <= grid_end)
        .map(|date| {
            let workouts = by_date.get(&date).cloned().unwrap_or_default();
            CalendarDay {
                date,
                in_month: date.month() == month && date.year() == year,
                volume: workouts.iter().map(|r| r.volume()).sum(),
                intensity: CalendarIntensity::from_workouts(workouts.len()),
                workouts,
            }
        })
        .collect::<Vec<_>>();

    let month_records = temporal::in_month(records, year, month);

    Some(CalendarMonth {
        year,
        month,
        days,
        days_with_workouts: temporal::unique_days(&month_records),
        total_workouts: month_records.len(),
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutStreaks {
    pub current: u32,
    pub longest: u32,
    pub average: u32,
}

/// Runs of consecutive training days.
///
/// The current streak is only non-zero if the last run ends `today`.
#[must_use]
pub fn workout_streaks(records: &[&WorkoutRecord], today: NaiveDate) -> WorkoutStreaks {
    let dates = records.iter().map(|r| r.date).collect::<BTreeSet<_>>();

    let mut streaks: Vec<u32> = vec![];
    let mut previous: Option<NaiveDate> = None;

    for date in &dates {
        match (previous, streaks.last_mut()) {
            (Some(p), Some(run)) if p.checked_add_days(Days::new(1)) == Some(*date) => *run += 1,
            _ => streaks.push(1),
        }
        previous = Some(*date);
    }

    let Some(last_run) = streaks.last().copied() else {
        return WorkoutStreaks::default();
    };

    #[allow(clippy::cast_precision_loss)]
    let mean = streaks.iter().sum::<u32>() as f32 / streaks.len() as f32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let average = mean.round() as u32;

    WorkoutStreaks {
        current: if previous == Some(today) { last_run } else { 0 },
        longest: streaks.iter().copied().max().unwrap_or_default(),
        average,
    }
}
