use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use strum::AsRefStr;

use crate::{
    Category, Exercise, ExerciseID, OneRepMaxFormula, OneRepMaxProgress, StrengthLevel,
    WorkoutRecord, max_one_rep_max, one_rep_max_progress, personal_records,
    statistics::{self, average, clamp_score, percentage_change},
    temporal,
};

#[must_use]
pub fn exercises_by_id(exercises: &[Exercise]) -> HashMap<ExerciseID, &Exercise> {
    exercises.iter().map(|e| (e.id, e)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseAnalysis {
    pub exercise_id: ExerciseID,
    pub name: String,
    pub workouts: usize,
    pub total_volume: f32,
    pub max_weight: f32,
    pub average_weight: f32,
    pub progress: Option<OneRepMaxProgress>,
    pub personal_records: usize,
    pub last_workout: Option<NaiveDate>,
}

/// Summarize the records of each exercise, ordered by total volume with the largest first.
///
/// Exercises without records are omitted.
#[must_use]
pub fn exercise_analysis(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
    formula: OneRepMaxFormula,
) -> Vec<ExerciseAnalysis> {
    let mut result = exercises
        .iter()
        .filter_map(|exercise| {
            let exercise_records = records
                .iter()
                .filter(|r| r.exercise_id == exercise.id)
                .copied()
                .collect::<Vec<_>>();

            if exercise_records.is_empty() {
                return None;
            }

            let weights = exercise_records
                .iter()
                .map(|r| r.max_weight())
                .collect::<Vec<_>>();

            Some(ExerciseAnalysis {
                exercise_id: exercise.id,
                name: exercise.name.to_string(),
                workouts: exercise_records.len(),
                total_volume: exercise_records.iter().map(|r| r.volume()).sum(),
                max_weight: statistics::max(&weights),
                average_weight: average(&weights),
                progress: one_rep_max_progress(&exercise_records, formula),
                personal_records: personal_records(&exercise_records),
                last_workout: temporal::latest_date(&exercise_records),
            })
        })
        .collect::<Vec<_>>();

    result.sort_by(|a, b| b.total_volume.total_cmp(&a.total_volume));
    result
}

/// Volume of a record attributed to each category of its exercise.
#[must_use]
pub fn category_volumes(record: &WorkoutRecord, exercise: &Exercise) -> Vec<(Category, f32)> {
    let volume = record.volume();
    exercise
        .category_shares()
        .into_iter()
        .map(|(category, share)| (category, volume * share))
        .collect()
}

/// Attributed volume per category over all records with a known exercise.
#[must_use]
pub fn category_volume_totals(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
) -> BTreeMap<Category, f32> {
    let exercises = exercises_by_id(exercises);
    let mut totals: BTreeMap<Category, f32> = BTreeMap::new();

    for record in records {
        if let Some(exercise) = exercises.get(&record.exercise_id) {
            for (category, volume) in category_volumes(record, exercise) {
                *totals.entry(category).or_default() += volume;
            }
        }
    }

    totals
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    #[must_use]
    pub fn from_progression(weight_progression: f32, volume_progression: f32) -> Self {
        if weight_progression > 5.0 || volume_progression > 10.0 {
            Trend::Improving
        } else if weight_progression < -5.0 || volume_progression < -10.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMetric {
    pub category: Category,
    pub workouts: usize,
    pub total_volume: f32,
    pub percentage: f32,
    pub average_weight: f32,
    pub max_weight: f32,
    pub min_weight: f32,
    pub average_sets: f32,
    pub average_reps: f32,
    pub total_sets: u32,
    pub total_reps: u32,
    pub personal_records: usize,
    pub estimated_one_rep_max: f32,
    pub weight_progression: f32,
    pub volume_progression: f32,
    pub average_workouts_per_week: f32,
    pub recent_improvement: bool,
    pub intensity_score: f32,
    pub efficiency_score: f32,
    pub consistency_score: f32,
    pub last_workout: NaiveDate,
    pub days_since_last_workout: i64,
    pub trend: Trend,
    pub strength_level: StrengthLevel,
    pub recommendations: Vec<String>,
    pub warnings: Vec<String>,
}

impl CategoryMetric {
    pub const WEIGHT_PROGRESSION_LIMIT: f32 = 200.0;
    pub const VOLUME_PROGRESSION_LIMIT: f32 = 300.0;
    pub const TARGET_WORKOUTS_PER_WEEK: f32 = 3.0;
}

#[derive(Clone, Copy)]
struct CategoryRecord<'a> {
    record: &'a WorkoutRecord,
    volume: f32,
}

/// Compute metrics for every category that has records, ordered by total volume with the
/// largest first.
///
/// Records of unknown exercises are ignored.
#[must_use]
pub fn category_metrics(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
    formula: OneRepMaxFormula,
) -> Vec<CategoryMetric> {
    let exercises = exercises_by_id(exercises);
    let mut by_category: BTreeMap<Category, Vec<CategoryRecord>> = BTreeMap::new();

    for &record in records {
        if let Some(exercise) = exercises.get(&record.exercise_id) {
            for (category, volume) in category_volumes(record, exercise) {
                by_category
                    .entry(category)
                    .or_default()
                    .push(CategoryRecord { record, volume });
            }
        }
    }

    let total_volume = by_category
        .values()
        .flat_map(|c| c.iter().map(|r| r.volume))
        .sum::<f32>();
    let Some(current_date) = by_category
        .values()
        .flat_map(|c| c.iter().map(|r| r.record.date))
        .max()
    else {
        return vec![];
    };

    let mut result = by_category
        .into_iter()
        .filter_map(|(category, category_records)| {
            category_metric(category, &category_records, total_volume, current_date, formula)
        })
        .collect::<Vec<_>>();

    result.sort_by(|a, b| b.total_volume.total_cmp(&a.total_volume));
    result
}

fn category_metric(
    category: Category,
    category_records: &[CategoryRecord],
    total_volume: f32,
    current_date: NaiveDate,
    formula: OneRepMaxFormula,
) -> Option<CategoryMetric> {
    let records = category_records.iter().map(|c| c.record).collect::<Vec<_>>();
    let last_workout = temporal::latest_date(&records)?;

    let volume = category_records.iter().map(|c| c.volume).sum::<f32>();
    let weights = records.iter().map(|r| r.max_weight()).collect::<Vec<_>>();
    #[allow(clippy::cast_precision_loss)]
    let sets = records.iter().map(|r| r.total_sets() as f32).collect::<Vec<_>>();
    #[allow(clippy::cast_precision_loss)]
    let reps_per_set = records
        .iter()
        .map(|r| r.total_reps() as f32 / r.total_sets().max(1) as f32)
        .collect::<Vec<_>>();
    let total_sets = records.iter().map(|r| r.total_sets()).sum::<u32>();

    #[allow(clippy::cast_precision_loss)]
    let weeks = temporal::unique_days_per_week(&records)
        .into_values()
        .map(|days| days as f32)
        .collect::<Vec<_>>();
    let (average_workouts_per_week, recent_improvement) = weekly_frequency(&weeks);

    let average_weight = average(&weights);
    let max_weight = statistics::max(&weights);
    let estimated_one_rep_max = max_one_rep_max(&records, formula);
    let weight_progression = weight_progression(&records, formula);
    let volume_progression = volume_progression(category_records);
    let days_since_last_workout = (current_date - last_workout).num_days();

    let mut metric = CategoryMetric {
        category,
        workouts: records.len(),
        total_volume: volume,
        percentage: if total_volume > 0.0 {
            volume / total_volume * 100.0
        } else {
            0.0
        },
        average_weight,
        max_weight,
        min_weight: statistics::min(&weights),
        average_sets: average(&sets),
        average_reps: average(&reps_per_set),
        total_sets,
        total_reps: records.iter().map(|r| r.total_reps()).sum(),
        personal_records: personal_records(&records),
        estimated_one_rep_max,
        weight_progression,
        volume_progression,
        average_workouts_per_week,
        recent_improvement,
        intensity_score: intensity_score(average_weight, max_weight),
        efficiency_score: efficiency_score(volume, total_sets),
        consistency_score: consistency_score(average_workouts_per_week, days_since_last_workout),
        last_workout,
        days_since_last_workout,
        trend: Trend::from_progression(weight_progression, volume_progression),
        strength_level: StrengthLevel::from_one_rep_max(estimated_one_rep_max),
        recommendations: vec![],
        warnings: vec![],
    };
    metric.recommendations = recommendations(&metric);
    metric.warnings = warnings(&metric);

    Some(metric)
}

/// Change of the average estimated 1RM between the older and the more recent half in percent.
fn weight_progression(records: &[&WorkoutRecord], formula: OneRepMaxFormula) -> f32 {
    if records.len() < 2 {
        return 0.0;
    }

    let split = temporal::split_by_midpoint(records);
    let one_rep_max = |half: &[&WorkoutRecord]| {
        average(
            &half
                .iter()
                .map(|r| r.estimated_one_rep_max(formula))
                .collect::<Vec<_>>(),
        )
    };

    percentage_change(one_rep_max(&split.first_half), one_rep_max(&split.second_half)).clamp(
        -CategoryMetric::WEIGHT_PROGRESSION_LIMIT,
        CategoryMetric::WEIGHT_PROGRESSION_LIMIT,
    )
}

fn volume_progression(category_records: &[CategoryRecord]) -> f32 {
    if category_records.len() < 2 {
        return 0.0;
    }

    let split = temporal::split_by_midpoint_with(category_records, |c| c.record.date);
    let average_volume = |half: &[CategoryRecord]| {
        average(&half.iter().map(|c| c.volume).collect::<Vec<_>>())
    };

    percentage_change(
        average_volume(&split.first_half),
        average_volume(&split.second_half),
    )
    .clamp(
        -CategoryMetric::VOLUME_PROGRESSION_LIMIT,
        CategoryMetric::VOLUME_PROGRESSION_LIMIT,
    )
}

/// Average training days per week, weighted towards the recent weeks if they show a clear
/// improvement.
fn weekly_frequency(weeks: &[f32]) -> (f32, bool) {
    let historical = average(weeks);

    match weeks.len() {
        n if n >= 4 => {
            let (older, recent) = weeks.split_at(n - 2);
            let recent = average(recent);
            if recent > average(older) * 1.4 {
                (recent * 0.7 + historical * 0.3, true)
            } else {
                (historical, false)
            }
        }
        n @ (2 | 3) => {
            let (previous, last) = weeks.split_at(n - 1);
            let last = last[0];
            if last > average(previous) * 1.5 && last >= 2.0 {
                (last * 0.6 + historical * 0.4, true)
            } else {
                (historical, false)
            }
        }
        _ => (historical, false),
    }
}

fn intensity_score(average_weight: f32, max_weight: f32) -> f32 {
    if max_weight > 0.0 {
        (average_weight / max_weight * 100.0).round()
    } else {
        0.0
    }
}

fn efficiency_score(volume: f32, total_sets: u32) -> f32 {
    if total_sets == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let volume_per_set = volume / total_sets as f32;
    (volume_per_set / 10.0).min(100.0).round()
}

fn consistency_score(workouts_per_week: f32, days_since_last_workout: i64) -> f32 {
    let frequency =
        (workouts_per_week / CategoryMetric::TARGET_WORKOUTS_PER_WEEK * 100.0).min(100.0);
    #[allow(clippy::cast_precision_loss)]
    let recency = (100.0 - 10.0 * days_since_last_workout as f32).max(0.0);
    clamp_score(frequency * 0.7 + recency * 0.3).round()
}

fn recommendations(metric: &CategoryMetric) -> Vec<String> {
    let name = metric.category.to_string().to_lowercase();
    let mut recommendations = vec![];

    if metric.days_since_last_workout > 7 {
        recommendations.push(format!(
            "Retomar entrenamientos de {name} - {} días sin actividad",
            metric.days_since_last_workout
        ));
    }
    if metric.average_workouts_per_week > 0.0 && metric.average_workouts_per_week < 2.0 {
        recommendations.push(format!(
            "Aumentar frecuencia de {name} a 2-3 sesiones por semana"
        ));
    }
    if metric.weight_progression < 0.0 {
        recommendations.push(format!(
            "Revisar progresión de peso en {name} - tendencia negativa"
        ));
    }
    if metric.consistency_score > 0.0 && metric.consistency_score < 60.0 {
        recommendations.push(format!(
            "Mejorar consistencia en entrenamientos de {name}"
        ));
    }
    if metric.strength_level == StrengthLevel::Beginner && metric.workouts > 20 {
        recommendations.push(format!("Considerar aumentar intensidad en {name}"));
    }

    recommendations
}

fn warnings(metric: &CategoryMetric) -> Vec<String> {
    let name = metric.category.to_string().to_lowercase();
    let mut warnings = vec![];

    if metric.days_since_last_workout > 14 {
        warnings.push(format!(
            "{} sin actividad por {} días",
            metric.category, metric.days_since_last_workout
        ));
    }
    if metric.trend == Trend::Declining {
        warnings.push(format!("Tendencia negativa en {name}"));
    }
    if metric.weight_progression < -10.0 {
        warnings.push(format!("Pérdida significativa de fuerza en {name}"));
    }
    if metric.average_workouts_per_week > 0.0 && metric.average_workouts_per_week < 1.0 {
        warnings.push(format!("Frecuencia muy baja en {name}"));
    }

    warnings
}
