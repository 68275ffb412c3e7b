use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::WorkoutRecord;

/// Reps above this limit do not increase the estimate any further.
pub const MAX_ESTIMATION_REPS: u32 = 20;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OneRepMaxFormula {
    #[default]
    Epley,
    Brzycki,
}

impl OneRepMaxFormula {
    #[must_use]
    pub fn estimate(self, weight: f32, reps: u32) -> f32 {
        match self {
            OneRepMaxFormula::Epley => epley(weight, reps),
            OneRepMaxFormula::Brzycki => brzycki(weight, reps),
        }
    }
}

#[must_use]
pub fn epley(weight: f32, reps: u32) -> f32 {
    if reps <= 1 {
        return weight;
    }

    #[allow(clippy::cast_precision_loss)]
    let reps = reps.min(MAX_ESTIMATION_REPS) as f32;
    weight * (1.0 + reps / 30.0)
}

#[must_use]
pub fn brzycki(weight: f32, reps: u32) -> f32 {
    if reps <= 1 {
        return weight;
    }

    #[allow(clippy::cast_precision_loss)]
    let reps = reps.min(MAX_ESTIMATION_REPS) as f32;
    let denominator = 1.0278 - 0.0278 * reps;

    if denominator <= 0.0 {
        return weight;
    }

    weight / denominator
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneRepMaxProgress {
    pub first: f32,
    pub last: f32,
    pub absolute: f32,
    pub percent: f32,
}

/// Compare the estimated 1RM of the chronologically first and last record.
///
/// Among records of the same date, the first one in input order counts as first and the last one
/// as last.
#[must_use]
pub fn one_rep_max_progress(
    records: &[&WorkoutRecord],
    formula: OneRepMaxFormula,
) -> Option<OneRepMaxProgress> {
    let first = records.iter().min_by_key(|r| r.date)?;
    let last = records.iter().max_by_key(|r| r.date)?;

    let first = first.estimated_one_rep_max(formula);
    let last = last.estimated_one_rep_max(formula);
    let absolute = last - first;

    Some(OneRepMaxProgress {
        first,
        last,
        absolute,
        percent: if first > 0.0 {
            absolute / first * 100.0
        } else {
            0.0
        },
    })
}

/// Number of records that set a new weight maximum, in chronological order.
#[must_use]
pub fn personal_records(records: &[&WorkoutRecord]) -> usize {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|r| r.date);

    let mut current_max = 0.0;
    let mut count = 0;

    for record in sorted {
        let weight = record.max_weight();
        if weight > current_max {
            current_max = weight;
            count += 1;
        }
    }

    count
}

#[must_use]
pub fn max_one_rep_max(records: &[&WorkoutRecord], formula: OneRepMaxFormula) -> f32 {
    records
        .iter()
        .map(|r| r.estimated_one_rep_max(formula))
        .fold(0.0, f32::max)
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum StrengthLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl StrengthLevel {
    pub const INTERMEDIATE_THRESHOLD: f32 = 50.0;
    pub const ADVANCED_THRESHOLD: f32 = 100.0;

    #[must_use]
    pub fn from_one_rep_max(one_rep_max: f32) -> Self {
        if one_rep_max > Self::ADVANCED_THRESHOLD {
            StrengthLevel::Advanced
        } else if one_rep_max > Self::INTERMEDIATE_THRESHOLD {
            StrengthLevel::Intermediate
        } else {
            StrengthLevel::Beginner
        }
    }
}
