use chrono::{Datelike, NaiveDate, Weekday};
use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{ExerciseID, OneRepMaxFormula};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRecord {
    pub id: WorkoutRecordID,
    pub exercise_id: ExerciseID,
    pub weight: Weight,
    pub reps: Reps,
    pub sets: Sets,
    pub date: NaiveDate,
    pub day_of_week: Weekday,
    pub individual_sets: Vec<IndividualSet>,
}

impl WorkoutRecord {
    /// Create a record whose day of week is derived from its date.
    #[must_use]
    pub fn new(
        id: WorkoutRecordID,
        exercise_id: ExerciseID,
        weight: Weight,
        reps: Reps,
        sets: Sets,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            exercise_id,
            weight,
            reps,
            sets,
            date,
            day_of_week: date.weekday(),
            individual_sets: vec![],
        }
    }

    #[must_use]
    pub fn with_individual_sets(mut self, individual_sets: Vec<IndividualSet>) -> Self {
        self.individual_sets = individual_sets;
        self
    }

    /// Override the day of week, e.g. for a workout of a routine day performed on another day.
    #[must_use]
    pub fn with_day_of_week(mut self, day_of_week: Weekday) -> Self {
        self.day_of_week = day_of_week;
        self
    }

    #[must_use]
    pub fn has_individual_sets(&self) -> bool {
        !self.individual_sets.is_empty()
    }

    /// Sets as actually performed.
    ///
    /// Without a per-set breakdown, the aggregate weight and reps are repeated for each set.
    #[must_use]
    pub fn effective_sets(&self) -> Vec<IndividualSet> {
        if self.has_individual_sets() {
            self.individual_sets.clone()
        } else {
            (0..*self.sets)
                .map(|_| IndividualSet {
                    weight: self.weight,
                    reps: self.reps,
                })
                .collect()
        }
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        if self.has_individual_sets() {
            self.individual_sets.iter().map(IndividualSet::volume).sum()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let repetitions = (*self.reps * *self.sets) as f32;
            *self.weight * repetitions
        }
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        if self.has_individual_sets() {
            u32::try_from(self.individual_sets.len()).unwrap_or(u32::MAX)
        } else {
            *self.sets
        }
    }

    #[must_use]
    pub fn total_reps(&self) -> u32 {
        if self.has_individual_sets() {
            self.individual_sets.iter().map(|s| *s.reps).sum()
        } else {
            *self.reps * *self.sets
        }
    }

    #[must_use]
    pub fn max_weight(&self) -> f32 {
        if self.has_individual_sets() {
            self.individual_sets
                .iter()
                .map(|s| *s.weight)
                .fold(0.0, f32::max)
        } else {
            *self.weight
        }
    }

    /// Estimated one-repetition maximum of the best set.
    #[must_use]
    pub fn estimated_one_rep_max(&self, formula: OneRepMaxFormula) -> f32 {
        if self.has_individual_sets() {
            self.individual_sets
                .iter()
                .map(|s| formula.estimate(*s.weight, *s.reps))
                .fold(0.0, f32::max)
        } else {
            formula.estimate(*self.weight, *self.reps)
        }
    }
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutRecordID(Uuid);

impl WorkoutRecordID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutRecordID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutRecordID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndividualSet {
    pub weight: Weight,
    pub reps: Reps,
}

impl IndividualSet {
    #[must_use]
    pub fn volume(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let reps = *self.reps as f32;
        *self.weight * reps
    }
}

#[derive(Deref, Debug, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if value.is_nan() || value <= 0.0 || value >= 1000.0 {
            return Err(WeightError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be greater than 0 and less than 1000 kg")]
    OutOfRange,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Deref, Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Deref, Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub fn new(value: u32) -> Result<Self, SetsError> {
        if !(1..100).contains(&value) {
            return Err(SetsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Sets {
    type Error = SetsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Sets::new(parsed_value),
            Err(_) => Err(SetsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetsError {
    #[error("Sets must be in the range 1 to 99")]
    OutOfRange,
    #[error("Sets must be an integer")]
    ParseError,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RecordError {
    #[error(transparent)]
    Weight(#[from] WeightError),
    #[error(transparent)]
    Reps(#[from] RepsError),
    #[error(transparent)]
    Sets(#[from] SetsError),
}

/// Build a record from unvalidated values.
pub fn workout_record(
    id: WorkoutRecordID,
    exercise_id: ExerciseID,
    (weight, reps, sets): (f32, u32, u32),
    date: NaiveDate,
    individual_sets: &[(f32, u32)],
) -> Result<WorkoutRecord, RecordError> {
    let individual_sets = individual_sets
        .iter()
        .map(|(weight, reps)| {
            Ok(IndividualSet {
                weight: Weight::new(*weight)?,
                reps: Reps::new(*reps)?,
            })
        })
        .collect::<Result<Vec<_>, RecordError>>()?;
    Ok(WorkoutRecord::new(
        id,
        exercise_id,
        Weight::new(weight)?,
        Reps::new(reps)?,
        Sets::new(sets)?,
        date,
    )
    .with_individual_sets(individual_sets))
}
