use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{Property, WorkoutRecord, statistics::Interval};

/// Records of the last `days` days, including `today`.
#[must_use]
pub fn within_last_days<'a>(
    records: &[&'a WorkoutRecord],
    today: NaiveDate,
    days: u32,
) -> Vec<&'a WorkoutRecord> {
    within_day_range(records, today, 0, days)
}

/// Records whose distance to `today` in days is between `min` and `max`.
#[must_use]
pub fn within_day_range<'a>(
    records: &[&'a WorkoutRecord],
    today: NaiveDate,
    min: u32,
    max: u32,
) -> Vec<&'a WorkoutRecord> {
    records
        .iter()
        .filter(|r| {
            let days_ago = (today - r.date).num_days();
            days_ago >= i64::from(min) && days_ago <= i64::from(max)
        })
        .copied()
        .collect()
}

#[must_use]
pub fn within_interval<'a>(
    records: &[&'a WorkoutRecord],
    interval: &Interval,
) -> Vec<&'a WorkoutRecord> {
    records
        .iter()
        .filter(|r| interval.contains(r.date))
        .copied()
        .collect()
}

/// Records of the week containing `target`, with weeks starting on Sunday.
#[must_use]
pub fn in_week_of<'a>(records: &[&'a WorkoutRecord], target: NaiveDate) -> Vec<&'a WorkoutRecord> {
    within_interval(records, &week_of(target, Weekday::Sun))
}

#[must_use]
pub fn in_month<'a>(records: &[&'a WorkoutRecord], year: i32, month: u32) -> Vec<&'a WorkoutRecord> {
    records
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .copied()
        .collect()
}

#[must_use]
pub fn on_weekday<'a>(records: &[&'a WorkoutRecord], weekday: Weekday) -> Vec<&'a WorkoutRecord> {
    records
        .iter()
        .filter(|r| r.date.weekday() == weekday)
        .copied()
        .collect()
}

#[must_use]
pub fn on_day<'a>(records: &[&'a WorkoutRecord], today: NaiveDate) -> Vec<&'a WorkoutRecord> {
    records
        .iter()
        .filter(|r| r.date == today)
        .copied()
        .collect()
}

/// Week containing `date`.
#[must_use]
pub fn week_of(date: NaiveDate, week_start: Weekday) -> Interval {
    let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    let first = date - Days::new(u64::from(offset));
    Interval {
        first,
        last: first + Days::new(6),
    }
}

/// Period relative to the latest record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    Week,
    Month,
    #[default]
    All,
}

impl TimeFilter {
    #[must_use]
    pub fn apply<'a>(self, records: &[&'a WorkoutRecord]) -> Vec<&'a WorkoutRecord> {
        let Some(latest) = latest_date(records) else {
            return vec![];
        };

        match self {
            TimeFilter::Week => within_interval(records, &week_of(latest, Weekday::Mon)),
            TimeFilter::Month => in_month(records, latest.year(), latest.month()),
            TimeFilter::All => records.to_vec(),
        }
    }
}

#[must_use]
pub fn latest_date(records: &[&WorkoutRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.date).max()
}

#[must_use]
pub fn earliest_date(records: &[&WorkoutRecord]) -> Option<NaiveDate> {
    records.iter().map(|r| r.date).min()
}

/// Sort records by date. Records of the same date keep their order.
#[must_use]
pub fn sorted_by_date<'a>(records: &[&'a WorkoutRecord]) -> Vec<&'a WorkoutRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);
    sorted
}

#[must_use]
pub fn unique_days(records: &[&WorkoutRecord]) -> usize {
    records
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .len()
}

#[derive(Debug, PartialEq)]
pub struct ChronologicalSplit<T> {
    pub first_half: Vec<T>,
    pub second_half: Vec<T>,
}

/// Split records into an older and a more recent half.
///
/// The boundary is the midpoint in time between the first and last record. If one side would
/// be empty, e.g. because all records share a date, the sorted records are split by index
/// instead.
#[must_use]
pub fn split_by_midpoint<'a>(
    records: &[&'a WorkoutRecord],
) -> ChronologicalSplit<&'a WorkoutRecord> {
    split_by_midpoint_with(records, |r| r.date)
}

/// Split arbitrary dated items the same way as [`split_by_midpoint`].
#[must_use]
pub fn split_by_midpoint_with<T: Clone>(
    items: &[T],
    date_of: impl Fn(&T) -> NaiveDate,
) -> ChronologicalSplit<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| date_of(item));

    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return ChronologicalSplit {
            first_half: vec![],
            second_half: vec![],
        };
    };

    let span = (date_of(last) - date_of(first)).num_days().unsigned_abs();
    let midpoint = date_of(first) + Days::new(span / 2);
    let (first_half, second_half): (Vec<T>, Vec<T>) = sorted
        .iter()
        .cloned()
        .partition(|item| date_of(item) <= midpoint);

    if first_half.is_empty() || second_half.is_empty() {
        let index = (sorted.len() / 2).max(1).min(sorted.len());
        let (first_half, second_half) = sorted.split_at(index);
        return ChronologicalSplit {
            first_half: first_half.to_vec(),
            second_half: second_half.to_vec(),
        };
    }

    ChronologicalSplit {
        first_half,
        second_half,
    }
}

#[must_use]
pub fn group_by_date<'a>(
    records: &[&'a WorkoutRecord],
) -> BTreeMap<NaiveDate, Vec<&'a WorkoutRecord>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&WorkoutRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.date).or_default().push(record);
    }
    groups
}

/// Group records by the weekday of their date, starting on Monday.
///
/// All seven weekdays are contained in the result.
#[must_use]
pub fn group_by_weekday<'a>(
    records: &[&'a WorkoutRecord],
) -> Vec<(Weekday, Vec<&'a WorkoutRecord>)> {
    Weekday::iter()
        .map(|weekday| (*weekday, on_weekday(records, *weekday)))
        .collect()
}

/// Number of training days per week, keyed by the Monday of the week.
#[must_use]
pub fn unique_days_per_week(records: &[&WorkoutRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut weeks: BTreeMap<NaiveDate, BTreeSet<NaiveDate>> = BTreeMap::new();
    for record in records {
        weeks
            .entry(week_of(record.date, Weekday::Mon).first)
            .or_default()
            .insert(record.date);
    }
    weeks.into_iter().map(|(week, days)| (week, days.len())).collect()
}

/// Number of records per week, keyed by the Monday of the week.
#[must_use]
pub fn records_per_week(records: &[&WorkoutRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut weeks: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for record in records {
        *weeks
            .entry(week_of(record.date, Weekday::Mon).first)
            .or_default() += 1;
    }
    weeks
}
