use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
    ops::RangeInclusive,
};

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Interval {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Number of days covered by the interval, including both boundaries.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.last - self.first).num_days() + 1
    }
}

impl From<RangeInclusive<NaiveDate>> for Interval {
    fn from(value: RangeInclusive<NaiveDate>) -> Self {
        Interval {
            first: *value.start(),
            last: *value.end(),
        }
    }
}

#[must_use]
pub fn average(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f32;
    values.iter().sum::<f32>() / len
}

#[must_use]
pub fn max(values: &[f32]) -> f32 {
    values.iter().copied().reduce(f32::max).unwrap_or(0.0)
}

#[must_use]
pub fn min(values: &[f32]) -> f32 {
    values.iter().copied().reduce(f32::min).unwrap_or(0.0)
}

/// Most frequent item.
///
/// On ties, the item encountered first wins. `None` is returned for an empty input.
#[must_use]
pub fn most_frequent<T: Eq + Hash + Clone>(items: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order: Vec<T> = vec![];

    for item in items {
        let count = counts.entry(item.clone()).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    let mut result: Option<(T, usize)> = None;

    for item in order {
        let count = counts.get(&item).copied().unwrap_or_default();
        match result {
            Some((_, best)) if best >= count => {}
            _ => result = Some((item, count)),
        }
    }

    result.map(|(item, _)| item)
}

#[must_use]
pub fn count_unique_by<T, K: Eq + Hash>(items: &[T], key: impl Fn(&T) -> K) -> usize {
    items.iter().map(key).collect::<HashSet<_>>().len()
}

/// Item with the latest date. On ties, the first such item is returned.
#[must_use]
pub fn find_most_recent<T>(items: &[T], date: impl Fn(&T) -> NaiveDate) -> Option<&T> {
    items.iter().fold(None, |latest: Option<&T>, item| match latest {
        Some(l) if date(l) >= date(item) => Some(l),
        _ => Some(item),
    })
}

#[must_use]
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10_f32.powi(decimals);
    (value * factor).round() / factor
}

/// Relative change from `old` to `new` in percent.
///
/// A change starting from zero counts as 100 % if the new value is positive.
#[must_use]
pub fn percentage_change(old: f32, new: f32) -> f32 {
    if old == 0.0 {
        if new > 0.0 { 100.0 } else { 0.0 }
    } else {
        (new - old) / old * 100.0
    }
}

/// Slope of the least-squares line through the values, using their index as x.
#[must_use]
pub fn linear_slope(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f32;
    #[allow(clippy::cast_precision_loss)]
    let (sum_x, sum_y, sum_xy, sum_xx) = values.iter().enumerate().fold(
        (0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxy, sxx), (i, y)| {
            let x = i as f32;
            (sx + x, sy + y, sxy + x * y, sxx + x * x)
        },
    );
    let denominator = n * sum_xx - sum_x * sum_x;

    if denominator == 0.0 {
        return 0.0;
    }

    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Population standard deviation divided by the mean.
#[must_use]
pub fn coefficient_of_variation(values: &[f32]) -> f32 {
    let mean = average(values);

    if mean == 0.0 {
        return 0.0;
    }

    let variance = average(
        &values
            .iter()
            .map(|v| (v - mean).powi(2))
            .collect::<Vec<_>>(),
    );

    variance.sqrt() / mean
}

#[must_use]
pub fn clamp_score(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}
