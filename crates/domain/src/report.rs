use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use log::{info, warn};
use strum::AsRefStr;

use crate::{
    AntagonistRatio, Category, CategoryMetric, Exercise, ExerciseAnalysis, FatigueAnalysis,
    IntensityMetrics, MuscleBalance, OneRepMaxFormula, PeriodComparison, ProgressPrediction,
    Property, Settings, TrainingDensity, WorkoutRecord, WorkoutStreaks, antagonist_ratios,
    balance_score, capitalized_weekday_name, category_metrics, compare_periods, exercise_analysis,
    exercises_by_id, fatigue_analysis, intensity_metrics, muscle_balance, predict_progress,
    statistics::{self, average, clamp_score, coefficient_of_variation, percentage_change},
    temporal, time_efficiency_score, training_consistency, training_density, workout_streaks,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DayMetrics {
    pub weekday: Weekday,
    pub workouts: usize,
    pub total_volume: f32,
    pub average_volume: f32,
    /// Share of the volume of all days.
    pub percentage: f32,
    pub max_weight: f32,
    pub average_weight: f32,
    pub unique_exercises: usize,
    pub average_reps: f32,
    pub average_sets: f32,
    pub total_sets: u32,
    pub consistency: f32,
    pub trend: f32,
    pub performance_score: f32,
    pub top_exercise: Option<String>,
    pub recommendations: Vec<String>,
}

impl DayMetrics {
    /// A day with a seventh of the total volume reaches the full volume score.
    pub const VOLUME_SCORE_FACTOR: f32 = 700.0;

    fn empty(weekday: Weekday) -> Self {
        Self {
            weekday,
            workouts: 0,
            total_volume: 0.0,
            average_volume: 0.0,
            percentage: 0.0,
            max_weight: 0.0,
            average_weight: 0.0,
            unique_exercises: 0,
            average_reps: 0.0,
            average_sets: 0.0,
            total_sets: 0,
            consistency: 0.0,
            trend: 0.0,
            performance_score: 0.0,
            top_exercise: None,
            recommendations: vec!["Considera añadir entrenamientos en este día".to_string()],
        }
    }
}

/// Metrics of every weekday, starting on Monday.
#[must_use]
pub fn day_metrics(records: &[&WorkoutRecord], exercises: &[Exercise]) -> Vec<DayMetrics> {
    let exercises = exercises_by_id(exercises);
    let total_volume = records.iter().map(|r| r.volume()).sum::<f32>();

    temporal::group_by_weekday(records)
        .into_iter()
        .map(|(weekday, day_records)| {
            if day_records.is_empty() {
                return DayMetrics::empty(weekday);
            }

            let volumes = day_records.iter().map(|r| r.volume()).collect::<Vec<_>>();
            let weights = day_records
                .iter()
                .map(|r| r.max_weight())
                .collect::<Vec<_>>();
            #[allow(clippy::cast_precision_loss)]
            let reps_per_set = day_records
                .iter()
                .map(|r| r.total_reps() as f32 / r.total_sets().max(1) as f32)
                .collect::<Vec<_>>();
            #[allow(clippy::cast_precision_loss)]
            let sets = day_records
                .iter()
                .map(|r| r.total_sets() as f32)
                .collect::<Vec<_>>();

            let day_volume = volumes.iter().sum::<f32>();
            let percentage = if total_volume > 0.0 {
                day_volume / total_volume * 100.0
            } else {
                0.0
            };
            let average_volume = average(&volumes);
            let consistency = if average_volume > 0.0 {
                clamp_score(100.0 - coefficient_of_variation(&volumes) * 100.0)
            } else {
                0.0
            };
            let unique_exercises = statistics::count_unique_by(&day_records, |r| r.exercise_id);
            let trend = day_trend(&temporal::sorted_by_date(&day_records));

            #[allow(clippy::cast_precision_loss)]
            let variety_score = clamp_score(unique_exercises as f32 * 20.0);
            let performance_score = ((clamp_score(
                percentage / 100.0 * DayMetrics::VOLUME_SCORE_FACTOR,
            ) + clamp_score(consistency * 2.0)
                + variety_score)
                / 3.0)
                .round();

            let top_exercise = statistics::most_frequent(day_records.iter().map(|r| r.exercise_id))
                .map(|id| {
                    exercises.get(&id).map_or_else(
                        || "Ejercicio desconocido".to_string(),
                        |e| e.name.to_string(),
                    )
                });

            DayMetrics {
                weekday,
                workouts: day_records.len(),
                total_volume: day_volume,
                average_volume,
                percentage,
                max_weight: statistics::max(&weights),
                average_weight: average(&weights),
                unique_exercises,
                average_reps: average(&reps_per_set),
                average_sets: average(&sets),
                total_sets: day_records.iter().map(|r| r.total_sets()).sum(),
                consistency,
                trend,
                performance_score,
                top_exercise,
                recommendations: day_recommendations(
                    day_records.len(),
                    trend,
                    consistency,
                    unique_exercises,
                ),
            }
        })
        .collect()
}

/// Volume trend of a weekday in percent, damped by the number of available workouts.
fn day_trend(sorted: &[&WorkoutRecord]) -> f32 {
    match sorted {
        [] => 0.0,
        [_] => 20.0,
        [first, last] => {
            let first = first.volume();
            if first > 0.0 {
                (percentage_change(first, last.volume()) * 0.3)
                    .round()
                    .clamp(0.0, 15.0)
            } else {
                3.0
            }
        }
        [first, _, last] => {
            if temporal::unique_days(sorted) <= 1 {
                8.0
            } else if first.volume() > 0.0 {
                (percentage_change(first.volume(), last.volume()) * 0.5)
                    .round()
                    .clamp(-20.0, 20.0)
            } else {
                0.0
            }
        }
        _ => {
            let (older, recent) = sorted.split_at(sorted.len() / 2);
            let older = average(&older.iter().map(|r| r.volume()).collect::<Vec<_>>());
            let recent = average(&recent.iter().map(|r| r.volume()).collect::<Vec<_>>());
            if older > 0.0 {
                (percentage_change(older, recent) * 0.6)
                    .round()
                    .clamp(-30.0, 30.0)
            } else {
                0.0
            }
        }
    }
}

fn day_recommendations(
    workouts: usize,
    trend: f32,
    consistency: f32,
    unique_exercises: usize,
) -> Vec<String> {
    let mut recommendations = vec![];

    if workouts >= 3 {
        recommendations.push("Excelente frecuencia en este día".to_string());
    } else if trend > 10.0 {
        recommendations.push("Tendencia positiva - mantén el momentum".to_string());
    } else if trend < -10.0 {
        recommendations.push("Considera ajustar la intensidad".to_string());
    }

    if consistency < 50.0 {
        recommendations.push("Varía la intensidad para mejor consistencia".to_string());
    }

    if unique_exercises < 2 {
        recommendations.push("Considera más variedad de ejercicios".to_string());
    }

    recommendations
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum SummaryPeriod {
    Week,
    Month,
}

impl SummaryPeriod {
    #[must_use]
    pub fn days(self) -> u32 {
        match self {
            SummaryPeriod::Week => 7,
            SummaryPeriod::Month => 30,
        }
    }
}

#[derive(AsRefStr, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    #[default]
    Stable,
    Declining,
}

impl TrendDirection {
    /// Sign of the least-squares slope through the values.
    #[must_use]
    pub fn from_series(values: &[f32]) -> Self {
        let slope = statistics::linear_slope(values);

        if slope > 0.0 {
            TrendDirection::Improving
        } else if slope < 0.0 {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub period: SummaryPeriod,
    pub workouts: usize,
    pub training_days: usize,
    pub unique_exercises: usize,
    pub total_volume: f32,
    pub average_volume: f32,
    pub weekly_frequency: f32,
    pub consistency: f32,
    pub best_day: Option<Weekday>,
    pub worst_day: Option<Weekday>,
    pub trend: TrendDirection,
    pub recommendations: Vec<String>,
}

impl PeriodSummary {
    pub const MIN_WEEKLY_FREQUENCY: f32 = 3.0;
    pub const MAX_WEEKLY_FREQUENCY: f32 = 6.0;
    pub const MIN_CONSISTENCY: f32 = 60.0;
    pub const MIN_UNIQUE_EXERCISES: usize = 3;

    fn empty(period: SummaryPeriod) -> Self {
        Self {
            period,
            workouts: 0,
            training_days: 0,
            unique_exercises: 0,
            total_volume: 0.0,
            average_volume: 0.0,
            weekly_frequency: 0.0,
            consistency: 0.0,
            best_day: None,
            worst_day: None,
            trend: TrendDirection::Stable,
            recommendations: vec![],
        }
    }
}

/// Summary of the trailing week or month ending `today`.
#[must_use]
pub fn period_summary(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
    today: NaiveDate,
    period: SummaryPeriod,
) -> PeriodSummary {
    let window_days = period.days() - 1;
    let window = temporal::within_last_days(records, today, window_days);

    if window.is_empty() {
        return PeriodSummary::empty(period);
    }

    let training_days = temporal::unique_days(&window);
    let unique_exercises = statistics::count_unique_by(&window, |r| r.exercise_id);
    let total_volume = window.iter().map(|r| r.volume()).sum::<f32>();
    let daily_volumes = temporal::group_by_date(&window)
        .values()
        .map(|day| day.iter().map(|r| r.volume()).sum::<f32>())
        .collect::<Vec<_>>();

    let days = day_metrics(&window, exercises)
        .into_iter()
        .filter(|d| d.workouts > 0)
        .collect::<Vec<_>>();
    let best_day = days
        .iter()
        .reduce(|best, d| {
            if d.performance_score > best.performance_score {
                d
            } else {
                best
            }
        })
        .map(|d| d.weekday);
    let worst_day = days
        .iter()
        .reduce(|worst, d| {
            if d.performance_score < worst.performance_score {
                d
            } else {
                worst
            }
        })
        .map(|d| d.weekday);

    #[allow(clippy::cast_precision_loss)]
    let (average_volume, weekly_frequency) = (
        total_volume / window.len() as f32,
        training_days as f32 / (period.days() as f32 / 7.0),
    );
    let consistency = training_consistency(records, today, window_days);

    let mut recommendations = vec![];

    if weekly_frequency < PeriodSummary::MIN_WEEKLY_FREQUENCY {
        recommendations.push("Intenta aumentar a 3-4 entrenamientos por semana".to_string());
    } else if weekly_frequency > PeriodSummary::MAX_WEEKLY_FREQUENCY {
        recommendations.push("Incluye al menos 1-2 días de descanso por semana".to_string());
    }

    if consistency < PeriodSummary::MIN_CONSISTENCY {
        recommendations.push("Mantén un horario de entrenamiento más regular".to_string());
    }

    if unique_exercises < PeriodSummary::MIN_UNIQUE_EXERCISES {
        recommendations.push("Añade más variedad de ejercicios a tu rutina".to_string());
    }

    PeriodSummary {
        period,
        workouts: window.len(),
        training_days,
        unique_exercises,
        total_volume,
        average_volume,
        weekly_frequency,
        consistency,
        best_day,
        worst_day,
        trend: TrendDirection::from_series(&daily_volumes),
        recommendations,
    }
}

/// The weakest category of the week and its development.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryInsight {
    pub weekday: Option<Weekday>,
    pub category: Option<Category>,
    pub max_weight: f32,
    pub trend: f32,
    pub message: String,
}

impl CategoryInsight {
    pub const IMPROVING_THRESHOLD: f32 = 10.0;
    pub const PREFERRED_TREND_MARGIN: f32 = 5.0;
    pub const MIN_TREND_RECORDS: usize = 3;
}

impl Default for CategoryInsight {
    fn default() -> Self {
        Self {
            weekday: None,
            category: None,
            max_weight: 0.0,
            trend: 0.0,
            message: "Sin datos suficientes".to_string(),
        }
    }
}

/// Find the weekday whose primary category has the lowest maximum weight.
///
/// A category whose weight trend is clearly better than the one of the current candidate does
/// not replace it.
#[must_use]
pub fn category_insight(records: &[&WorkoutRecord], exercises: &[Exercise]) -> CategoryInsight {
    let exercises = exercises_by_id(exercises);
    let categorized = temporal::sorted_by_date(records)
        .into_iter()
        .filter_map(|r| {
            exercises
                .get(&r.exercise_id)
                .map(|e| (r, e.primary_category()))
        })
        .collect::<Vec<_>>();

    let mut weights: BTreeMap<Category, Vec<f32>> = BTreeMap::new();
    for &(record, category) in &categorized {
        weights
            .entry(category)
            .or_default()
            .push(record.max_weight());
    }
    let trends = weights
        .iter()
        .map(|(category, weights)| (*category, weight_trend(weights)))
        .collect::<BTreeMap<_, _>>();
    let trend = |category: Category| trends.get(&category).copied().unwrap_or_default();

    let weakest = Weekday::iter()
        .filter_map(|weekday| {
            let mut maxima: BTreeMap<Category, f32> = BTreeMap::new();
            for &(record, category) in categorized
                .iter()
                .filter(|(r, _)| r.date.weekday() == *weekday)
            {
                let max = maxima.entry(category).or_insert(0.0);
                *max = max.max(record.max_weight());
            }
            maxima
                .into_iter()
                .reduce(|lowest, current| if current.1 < lowest.1 { current } else { lowest })
                .map(|(category, max_weight)| (*weekday, category, max_weight))
        })
        .reduce(|weakest, current| {
            if trend(current.1) > trend(weakest.1) + CategoryInsight::PREFERRED_TREND_MARGIN {
                weakest
            } else if current.2 < weakest.2 {
                current
            } else {
                weakest
            }
        });

    let Some((weekday, category, max_weight)) = weakest else {
        return CategoryInsight::default();
    };

    let trend = trend(category);
    let prefix = format!(
        "{} - {category} ({max_weight} kg)",
        capitalized_weekday_name(weekday)
    );
    let message = if trend > CategoryInsight::IMPROVING_THRESHOLD {
        format!("{prefix} mejorando (+{trend:.1}%)")
    } else if trend > 0.0 {
        format!("{prefix} estable")
    } else {
        format!("{prefix} necesita mejora")
    };

    CategoryInsight {
        weekday: Some(weekday),
        category: Some(category),
        max_weight,
        trend,
        message,
    }
}

/// Change between the average weights of the older and the recent half in percent.
fn weight_trend(weights: &[f32]) -> f32 {
    if weights.len() < CategoryInsight::MIN_TREND_RECORDS {
        return 0.0;
    }

    let (older, recent) = weights.split_at(weights.len() / 2);
    let older = average(older);

    if older > 0.0 {
        percentage_change(older, average(recent))
    } else {
        0.0
    }
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestDayPattern {
    #[strum(serialize = "4+ días descanso")]
    Frequent,
    #[strum(serialize = "1-2 días descanso")]
    Occasional,
    #[strum(serialize = "Entrenamiento diario")]
    Daily,
}

impl RestDayPattern {
    #[must_use]
    pub fn from_training_weekdays(weekdays: usize) -> Self {
        if weekdays <= 3 {
            RestDayPattern::Frequent
        } else if weekdays <= 5 {
            RestDayPattern::Occasional
        } else {
            RestDayPattern::Daily
        }
    }
}

#[derive(AsRefStr, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HabitStrength {
    #[default]
    #[strum(serialize = "Muy Débil")]
    VeryWeak,
    #[strum(serialize = "Débil")]
    Weak,
    #[strum(serialize = "Moderado")]
    Moderate,
    #[strum(serialize = "Fuerte")]
    Strong,
    #[strum(serialize = "Muy Fuerte")]
    VeryStrong,
}

impl HabitStrength {
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        if score >= 80.0 {
            HabitStrength::VeryStrong
        } else if score >= 65.0 {
            HabitStrength::Strong
        } else if score >= 45.0 {
            HabitStrength::Moderate
        } else if score >= 25.0 {
            HabitStrength::Weak
        } else {
            HabitStrength::VeryWeak
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutHabits {
    pub preferred_day: Option<Weekday>,
    pub best_performance_day: Option<Weekday>,
    /// Average number of records per week.
    pub weekly_frequency: f32,
    /// Ratio between the least and the most trained weekday.
    pub consistency_score: f32,
    pub rest_day_pattern: Option<RestDayPattern>,
    pub habit_strength: HabitStrength,
    pub streaks: WorkoutStreaks,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
}

#[must_use]
pub fn workout_habits(records: &[&WorkoutRecord], today: NaiveDate) -> WorkoutHabits {
    if records.is_empty() {
        return WorkoutHabits::default();
    }

    let weekdays = temporal::group_by_weekday(records);
    let trained = weekdays
        .iter()
        .filter(|(_, r)| !r.is_empty())
        .collect::<Vec<_>>();

    // first maximum in week order
    let preferred_day = trained
        .iter()
        .rev()
        .max_by_key(|(_, r)| r.len())
        .map(|(weekday, _)| *weekday);
    let best_performance_day = trained
        .iter()
        .map(|(weekday, r)| {
            (
                *weekday,
                average(&r.iter().map(|r| r.volume()).collect::<Vec<_>>()),
            )
        })
        .reduce(|best, current| if current.1 > best.1 { current } else { best })
        .map(|(weekday, _)| weekday);

    let most = trained.iter().map(|(_, r)| r.len()).max().unwrap_or_default();
    let least = trained.iter().map(|(_, r)| r.len()).min().unwrap_or_default();
    #[allow(clippy::cast_precision_loss)]
    let consistency_score = if most > 0 {
        (least as f32 / most as f32 * 100.0).round()
    } else {
        0.0
    };

    #[allow(clippy::cast_precision_loss)]
    let weekly_frequency = average(
        &temporal::records_per_week(records)
            .into_values()
            .map(|n| n as f32)
            .collect::<Vec<_>>(),
    );

    let streaks = workout_streaks(records, today);

    let mut recommendations = vec![];
    if consistency_score < 50.0 {
        recommendations.push("Establece horarios fijos para crear rutina".to_string());
    }
    if weekly_frequency < PeriodSummary::MIN_WEEKLY_FREQUENCY {
        recommendations.push("Intenta aumentar a 3-4 entrenamientos por semana".to_string());
    } else if weekly_frequency > PeriodSummary::MAX_WEEKLY_FREQUENCY {
        recommendations.push("Incluye al menos 1-2 días de descanso por semana".to_string());
    }
    if streaks.current == 0 {
        recommendations.push("Enfócate en crear una nueva racha de entrenamientos".to_string());
    }

    let mut risk_factors = vec![];
    if consistency_score < 30.0 {
        risk_factors.push("Baja consistencia puede llevar a pérdida de progreso".to_string());
    }
    if weekly_frequency < 2.0 {
        risk_factors.push("Frecuencia muy baja puede no generar adaptaciones".to_string());
    }
    if streaks.current == 0 && streaks.longest > 7 {
        risk_factors.push("Has perdido rachas largas anteriores".to_string());
    }

    WorkoutHabits {
        preferred_day,
        best_performance_day,
        weekly_frequency,
        consistency_score,
        rest_day_pattern: Some(RestDayPattern::from_training_weekdays(trained.len())),
        habit_strength: HabitStrength::from_score(
            (consistency_score + weekly_frequency * 20.0) / 2.0,
        ),
        streaks,
        recommendations,
        risk_factors,
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OrphanStatistics {
    pub total_records: usize,
    pub orphaned_records: usize,
    pub valid_records: usize,
    pub exercises: usize,
}

#[derive(Debug, PartialEq)]
pub struct OrphanPartition<'a> {
    pub valid: Vec<&'a WorkoutRecord>,
    pub orphaned: Vec<&'a WorkoutRecord>,
    pub statistics: OrphanStatistics,
}

/// Separate records of existing exercises from records whose exercise has been deleted.
#[must_use]
pub fn partition_orphans<'a>(
    records: &[&'a WorkoutRecord],
    exercises: &[Exercise],
) -> OrphanPartition<'a> {
    let by_id = exercises_by_id(exercises);
    let (valid, orphaned): (Vec<&WorkoutRecord>, Vec<&WorkoutRecord>) = records
        .iter()
        .copied()
        .partition(|r| by_id.contains_key(&r.exercise_id));

    let statistics = OrphanStatistics {
        total_records: records.len(),
        orphaned_records: orphaned.len(),
        valid_records: valid.len(),
        exercises: exercises.len(),
    };

    if orphaned.is_empty() {
        info!(
            "all {} records refer to one of {} exercises",
            statistics.total_records, statistics.exercises
        );
    } else {
        warn!(
            "{} of {} records refer to missing exercises: {}",
            statistics.orphaned_records,
            statistics.total_records,
            orphaned
                .iter()
                .map(|r| format!("{} (exercise {})", *r.id, *r.exercise_id))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    OrphanPartition {
        valid,
        orphaned,
        statistics,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedAnalysis {
    pub fatigue: FatigueAnalysis,
    pub intensity: IntensityMetrics,
    pub density: Vec<TrainingDensity>,
    pub time_efficiency: f32,
    pub period_comparisons: Vec<PeriodComparison>,
    pub progress_prediction: ProgressPrediction,
}

#[must_use]
pub fn advanced_analysis(
    records: &[&WorkoutRecord],
    today: NaiveDate,
    formula: OneRepMaxFormula,
) -> AdvancedAnalysis {
    AdvancedAnalysis {
        fatigue: fatigue_analysis(records, today),
        intensity: intensity_metrics(records, today),
        density: training_density(records, today),
        time_efficiency: time_efficiency_score(records, today),
        period_comparisons: compare_periods(records, today, formula),
        progress_prediction: predict_progress(records, today, formula),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub weekly_summary: PeriodSummary,
    pub monthly_summary: PeriodSummary,
    pub exercises: Vec<ExerciseAnalysis>,
    pub categories: Vec<CategoryMetric>,
    pub balance: Vec<MuscleBalance>,
    pub balance_score: f32,
    pub antagonists: Vec<AntagonistRatio>,
    pub days: Vec<DayMetrics>,
    pub habits: WorkoutHabits,
    pub category_insight: CategoryInsight,
    pub advanced: AdvancedAnalysis,
    pub orphans: OrphanStatistics,
}

/// Compute all analyses of the dashboard.
///
/// Records of deleted exercises are excluded from every analysis and only reported in the
/// orphan statistics.
#[must_use]
pub fn dashboard(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
    settings: &Settings,
    today: NaiveDate,
) -> Dashboard {
    let OrphanPartition {
        valid, statistics, ..
    } = partition_orphans(records, exercises);
    let balance = muscle_balance(&valid, exercises, &settings.ideal_distribution);

    Dashboard {
        weekly_summary: period_summary(&valid, exercises, today, SummaryPeriod::Week),
        monthly_summary: period_summary(&valid, exercises, today, SummaryPeriod::Month),
        exercises: exercise_analysis(&valid, exercises, settings.one_rep_max_formula),
        categories: category_metrics(&valid, exercises, settings.one_rep_max_formula),
        balance_score: balance_score(&balance),
        balance,
        antagonists: antagonist_ratios(&valid, exercises, &settings.ideal_distribution),
        days: day_metrics(&valid, exercises),
        habits: workout_habits(&valid, today),
        category_insight: category_insight(&valid, exercises),
        advanced: advanced_analysis(&valid, today, settings.one_rep_max_formula),
        orphans: statistics,
    }
}
