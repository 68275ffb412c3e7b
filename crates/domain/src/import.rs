use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use strum::AsRefStr;
use uuid::Uuid;

use crate::{
    Category, CategoryPercentages, Exercise, ExerciseAssignment, Name, Settings, WorkoutRecord,
    parse_weekday, workout_record,
};

/// Data of an export of the workout tracker.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub exercises: Vec<Exercise>,
    pub assignments: Vec<ExerciseAssignment>,
    pub records: Vec<WorkoutRecord>,
    pub settings: Settings,
    pub rejections: Vec<Rejection>,
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum EntryKind {
    Exercise,
    Assignment,
    Record,
}

/// An entry that was skipped because it contained invalid values.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub kind: EntryKind,
    pub id: Option<String>,
    pub reason: String,
}

impl Dataset {
    /// Parse an exported JSON document.
    ///
    /// Identifiers which are not UUIDs are replaced by generated UUIDs. References between
    /// entries are preserved. Invalid entries are skipped and reported as rejections.
    pub fn from_json(json: &str) -> Result<Self, anyhow::Error> {
        let raw: RawDataset = serde_json::from_str(json).context("failed to parse dataset")?;
        let settings = match raw.settings {
            Some(settings) => {
                let settings: Settings =
                    serde_json::from_value(settings).context("failed to parse settings")?;
                settings.validate().context("invalid settings")?;
                settings
            }
            None => Settings::default(),
        };

        let mut ids = IdMap::default();
        let mut dataset = Dataset {
            settings,
            ..Dataset::default()
        };

        for value in raw.exercises {
            match exercise(&mut ids, &value) {
                Ok(exercise) => dataset.exercises.push(exercise),
                Err(err) => dataset.reject(EntryKind::Exercise, &value, &err),
            }
        }

        for value in raw.assignments {
            match assignment(&mut ids, &value) {
                Ok(assignment) => dataset.assignments.push(assignment),
                Err(err) => dataset.reject(EntryKind::Assignment, &value, &err),
            }
        }

        for value in raw.workout_records {
            match record(&mut ids, &value) {
                Ok(record) => dataset.records.push(record),
                Err(err) => dataset.reject(EntryKind::Record, &value, &err),
            }
        }

        info!(
            "imported {} exercises, {} assignments and {} records ({} rejected)",
            dataset.exercises.len(),
            dataset.assignments.len(),
            dataset.records.len(),
            dataset.rejections.len()
        );

        Ok(dataset)
    }

    fn reject(&mut self, kind: EntryKind, value: &Value, err: &anyhow::Error) {
        let rejection = Rejection {
            kind,
            id: value.get("id").and_then(Value::as_str).map(str::to_string),
            reason: format!("{err:#}"),
        };
        warn!(
            "skipping invalid {} {}: {}",
            rejection.kind.as_ref(),
            rejection.id.as_deref().unwrap_or("without id"),
            rejection.reason
        );
        self.rejections.push(rejection);
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    #[serde(default)]
    exercises: Vec<Value>,
    #[serde(default)]
    assignments: Vec<Value>,
    #[serde(default, alias = "records")]
    workout_records: Vec<Value>,
    #[serde(default)]
    settings: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExercise {
    id: String,
    name: String,
    categories: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    category_percentages: Option<BTreeMap<String, f32>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssignment {
    id: String,
    exercise_id: String,
    day_of_week: String,
    #[serde(default)]
    order: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    exercise_id: String,
    weight: f32,
    reps: u32,
    sets: u32,
    date: String,
    #[serde(default)]
    day_of_week: Option<String>,
    #[serde(default)]
    individual_sets: Vec<RawSet>,
}

#[derive(Deserialize)]
struct RawSet {
    weight: f32,
    reps: u32,
}

/// Assigns UUIDs to the identifiers of the document.
#[derive(Default)]
struct IdMap(HashMap<String, Uuid>);

impl IdMap {
    fn get(&mut self, id: &str) -> Uuid {
        if let Ok(uuid) = Uuid::parse_str(id) {
            return uuid;
        }
        *self.0.entry(id.to_string()).or_insert_with(Uuid::new_v4)
    }
}

fn exercise(ids: &mut IdMap, value: &Value) -> Result<Exercise, anyhow::Error> {
    let raw = RawExercise::deserialize(value).context("malformed exercise")?;
    let name = Name::new(&raw.name).context("invalid name")?;
    let categories = raw
        .categories
        .iter()
        .map(|c| Category::try_from(c.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid categories")?;
    let percentages = raw
        .category_percentages
        .filter(|p| !p.is_empty())
        .map(|percentages| {
            percentages
                .iter()
                .map(|(category, value)| {
                    Ok::<_, anyhow::Error>((Category::try_from(category.as_str())?, *value))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .and_then(|p| CategoryPercentages::new(p).map_err(anyhow::Error::from))
        })
        .transpose()
        .context("invalid category percentages")?;

    let mut exercise = Exercise::new(ids.get(&raw.id).into(), name, categories, percentages)?;

    if let Some(description) = raw.description.filter(|d| !d.trim().is_empty()) {
        exercise = exercise.with_description(description);
    }
    if let Some(url) = raw.url.filter(|u| !u.trim().is_empty()) {
        exercise = exercise.with_url(url);
    }

    Ok(exercise)
}

fn assignment(ids: &mut IdMap, value: &Value) -> Result<ExerciseAssignment, anyhow::Error> {
    let raw = RawAssignment::deserialize(value).context("malformed assignment")?;

    Ok(ExerciseAssignment {
        id: ids.get(&raw.id).into(),
        exercise_id: ids.get(&raw.exercise_id).into(),
        day_of_week: parse_weekday(&raw.day_of_week)?,
        order: raw.order,
    })
}

fn record(ids: &mut IdMap, value: &Value) -> Result<WorkoutRecord, anyhow::Error> {
    let raw = RawRecord::deserialize(value).context("malformed record")?;
    let date = parse_date(&raw.date)?;
    let individual_sets = raw
        .individual_sets
        .iter()
        .map(|s| (s.weight, s.reps))
        .collect::<Vec<_>>();

    let mut record = workout_record(
        ids.get(&raw.id).into(),
        ids.get(&raw.exercise_id).into(),
        (raw.weight, raw.reps, raw.sets),
        date,
        &individual_sets,
    )?;

    if let Some(day_of_week) = raw.day_of_week {
        record = record.with_day_of_week(parse_weekday(&day_of_week)?);
    }

    Ok(record)
}

/// Parse the date part of an ISO 8601 date or timestamp.
fn parse_date(value: &str) -> Result<NaiveDate, anyhow::Error> {
    value
        .get(..10)
        .unwrap_or(value)
        .parse::<NaiveDate>()
        .map_err(|err| anyhow!("invalid date \"{value}\": {err}"))
}
