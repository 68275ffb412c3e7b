use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Weekday};
use strum::AsRefStr;

use crate::{
    OneRepMaxFormula, WorkoutRecord, max_one_rep_max,
    statistics::{self, Interval, average, coefficient_of_variation, linear_slope, round_to},
    temporal,
};

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonPeriod {
    #[strum(serialize = "Esta semana")]
    ThisWeek,
    #[strum(serialize = "Últimas 2 semanas")]
    LastTwoWeeks,
    #[strum(serialize = "Último mes")]
    LastMonth,
    #[strum(serialize = "Últimos 3 meses")]
    LastThreeMonths,
}

impl ComparisonPeriod {
    pub const ALL: [ComparisonPeriod; 4] = [
        ComparisonPeriod::ThisWeek,
        ComparisonPeriod::LastTwoWeeks,
        ComparisonPeriod::LastMonth,
        ComparisonPeriod::LastThreeMonths,
    ];

    #[must_use]
    pub fn weeks(self) -> u64 {
        match self {
            ComparisonPeriod::ThisWeek => 1,
            ComparisonPeriod::LastTwoWeeks => 2,
            ComparisonPeriod::LastMonth => 4,
            ComparisonPeriod::LastThreeMonths => 12,
        }
    }

    /// Days between the first and the last record needed to report any change.
    #[must_use]
    pub fn required_days(self) -> i64 {
        match self {
            ComparisonPeriod::ThisWeek => 14,
            ComparisonPeriod::LastTwoWeeks => 28,
            ComparisonPeriod::LastMonth => 56,
            ComparisonPeriod::LastThreeMonths => 168,
        }
    }

    /// Whole Monday-start weeks ending with the week of `today`.
    #[must_use]
    pub fn current(self, today: NaiveDate) -> Interval {
        let week = temporal::week_of(today, Weekday::Mon);
        Interval {
            first: week.first - Days::new(7 * (self.weeks() - 1)),
            last: week.last,
        }
    }

    /// Weeks of the same length directly preceding the current ones.
    #[must_use]
    pub fn previous(self, today: NaiveDate) -> Interval {
        let current = self.current(today);
        Interval {
            first: current.first - Days::new(7 * self.weeks()),
            last: current.first - Days::new(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodComparison {
    pub period: ComparisonPeriod,
    pub workouts: usize,
    pub total_volume: f32,
    pub average_one_rep_max: f32,
    /// Mean of the volume and strength change.
    pub improvement: f32,
    pub volume_change: f32,
    pub strength_change: f32,
}

impl PeriodComparison {
    /// Records required in both periods to compute a change.
    pub const MIN_RECORDS: usize = 2;
}

/// Compare recent periods of increasing length with the preceding period of the same length.
///
/// Changes are reported as zero unless the records span enough days for the period and both
/// periods contain at least [`PeriodComparison::MIN_RECORDS`] records.
#[must_use]
pub fn compare_periods(
    records: &[&WorkoutRecord],
    today: NaiveDate,
    formula: OneRepMaxFormula,
) -> Vec<PeriodComparison> {
    let (Some(first), Some(last)) = (
        temporal::earliest_date(records),
        temporal::latest_date(records),
    ) else {
        return vec![];
    };
    let span = (last - first).num_days();

    ComparisonPeriod::ALL
        .iter()
        .map(|period| {
            let current = temporal::within_interval(records, &period.current(today));
            let previous = temporal::within_interval(records, &period.previous(today));

            let total_volume = current.iter().map(|r| r.volume()).sum::<f32>();
            let one_rep_max = average_one_rep_max(&current, formula);

            let comparable = span >= period.required_days()
                && current.len() >= PeriodComparison::MIN_RECORDS
                && previous.len() >= PeriodComparison::MIN_RECORDS;

            let (volume_change, strength_change) = if comparable {
                #[allow(clippy::cast_precision_loss)]
                let current_volume = total_volume / current.len() as f32;
                #[allow(clippy::cast_precision_loss)]
                let previous_volume =
                    previous.iter().map(|r| r.volume()).sum::<f32>() / previous.len() as f32;
                (
                    relative_change(previous_volume, current_volume),
                    relative_change(average_one_rep_max(&previous, formula), one_rep_max),
                )
            } else {
                (0.0, 0.0)
            };

            PeriodComparison {
                period: *period,
                workouts: current.len(),
                total_volume,
                average_one_rep_max: one_rep_max,
                improvement: (volume_change + strength_change) / 2.0,
                volume_change,
                strength_change,
            }
        })
        .collect()
}

fn average_one_rep_max(records: &[&WorkoutRecord], formula: OneRepMaxFormula) -> f32 {
    average(
        &records
            .iter()
            .map(|r| r.estimated_one_rep_max(formula))
            .collect::<Vec<_>>(),
    )
}

/// Change in percent, zero if there is no positive baseline.
fn relative_change(old: f32, new: f32) -> f32 {
    if old > 0.0 {
        (new - old) / old * 100.0
    } else {
        0.0
    }
}

#[derive(AsRefStr, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTrend {
    #[strum(serialize = "mejorando")]
    Improving,
    #[strum(serialize = "estable")]
    Stable,
    #[strum(serialize = "empeorando")]
    Declining,
    #[default]
    #[strum(serialize = "insuficiente")]
    Insufficient,
}

impl ProgressTrend {
    pub const MIN_RECORDS: usize = 7;
    /// Weekly change of the average weight in kg.
    pub const STRENGTH_THRESHOLD: f32 = 0.5;
    /// Weekly change of the volume in kg.
    pub const VOLUME_THRESHOLD: f32 = 50.0;

    fn classify(records: usize, strength_trend: f32, volume_trend: f32) -> Self {
        if records < Self::MIN_RECORDS {
            return ProgressTrend::Insufficient;
        }

        let strength_up = strength_trend > Self::STRENGTH_THRESHOLD;
        let strength_down = strength_trend < -Self::STRENGTH_THRESHOLD;
        let volume_up = volume_trend > Self::VOLUME_THRESHOLD;
        let volume_down = volume_trend < -Self::VOLUME_THRESHOLD;

        if strength_down && volume_down {
            ProgressTrend::Declining
        } else if strength_up || volume_up {
            ProgressTrend::Improving
        } else if strength_down || volume_down {
            ProgressTrend::Declining
        } else {
            ProgressTrend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingExperience {
    Beginner,
    Intermediate,
    Advanced,
}

impl TrainingExperience {
    #[must_use]
    pub fn from_volume_and_frequency(average_volume: f32, workouts_per_week: f32) -> Self {
        if average_volume > 2000.0 && workouts_per_week > 3.0 {
            TrainingExperience::Advanced
        } else if average_volume > 1000.0 && workouts_per_week > 2.0 {
            TrainingExperience::Intermediate
        } else {
            TrainingExperience::Beginner
        }
    }

    fn base_confidence(self) -> f32 {
        match self {
            TrainingExperience::Beginner => 0.6,
            TrainingExperience::Intermediate => 0.7,
            TrainingExperience::Advanced => 0.8,
        }
    }

    fn base_plateau_risk(self) -> f32 {
        match self {
            TrainingExperience::Beginner => 10.0,
            TrainingExperience::Intermediate => 30.0,
            TrainingExperience::Advanced => 50.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PredictedPersonalRecord {
    pub weight: f32,
    /// Between 0 and 1.
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPrediction {
    pub next_week_volume: f32,
    pub next_week_weight: f32,
    pub monthly_growth_rate: f32,
    pub predicted_personal_record: PredictedPersonalRecord,
    /// Between 0 and 100.
    pub plateau_risk: f32,
    pub trend: ProgressTrend,
    pub weeks_to_next_personal_record: f32,
    /// Between 0 and 1.
    pub confidence: f32,
    /// Slope of the weekly volume.
    pub volume_trend: f32,
    /// Slope of the weekly average weight.
    pub strength_trend: f32,
    pub recommendations: Vec<String>,
}

impl ProgressPrediction {
    pub const MIN_RECORDS: usize = 5;
    pub const MIN_DAYS: f32 = 7.0;

    fn insufficient() -> Self {
        Self {
            next_week_volume: 0.0,
            next_week_weight: 0.0,
            monthly_growth_rate: 0.0,
            predicted_personal_record: PredictedPersonalRecord::default(),
            plateau_risk: 0.0,
            trend: ProgressTrend::Insufficient,
            weeks_to_next_personal_record: 0.0,
            confidence: 0.0,
            volume_trend: 0.0,
            strength_trend: 0.0,
            recommendations: vec!["Datos insuficientes para predicción".to_string()],
        }
    }
}

impl Default for ProgressPrediction {
    fn default() -> Self {
        Self::insufficient()
    }
}

/// Extrapolate the weekly volume and strength trends of the records.
///
/// At least [`ProgressPrediction::MIN_RECORDS`] records spanning
/// [`ProgressPrediction::MIN_DAYS`] days are required. The current 1RM is taken from the last
/// complete week before `today` if it contains records, otherwise from all records.
#[must_use]
pub fn predict_progress(
    records: &[&WorkoutRecord],
    today: NaiveDate,
    formula: OneRepMaxFormula,
) -> ProgressPrediction {
    let records = temporal::sorted_by_date(
        &records
            .iter()
            .filter(|r| r.volume() > 0.0)
            .copied()
            .collect::<Vec<_>>(),
    );
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return ProgressPrediction::insufficient();
    };

    #[allow(clippy::cast_precision_loss)]
    let days = ((last.date - first.date).num_days() as f32).max(1.0);
    if records.len() < ProgressPrediction::MIN_RECORDS || days < ProgressPrediction::MIN_DAYS {
        return ProgressPrediction::insufficient();
    }

    let weights = records.iter().map(|r| r.max_weight()).collect::<Vec<_>>();
    let volumes = records.iter().map(|r| r.volume()).collect::<Vec<_>>();
    let average_volume = average(&volumes);
    let average_weight = average(&weights);
    let max_weight = statistics::max(&weights);
    #[allow(clippy::cast_precision_loss)]
    let workouts_per_week = records.len() as f32 / (days / 7.0).max(1.0);
    let experience =
        TrainingExperience::from_volume_and_frequency(average_volume, workouts_per_week);

    let last_week = temporal::week_of(today - Days::new(7), Weekday::Mon);
    let last_week_records = temporal::within_interval(&records, &last_week);
    let current_one_rep_max = if last_week_records.is_empty() {
        max_one_rep_max(&records, formula)
    } else {
        max_one_rep_max(&last_week_records, formula)
    };

    let weeks = weekly_volume_and_weight(&records);
    let (volume_trend, strength_trend, week_count) = if weeks.len() < 2 {
        (0.0, 0.0, 0)
    } else {
        let (volumes, weights): (Vec<f32>, Vec<f32>) = weeks.into_iter().unzip();
        (linear_slope(&volumes), linear_slope(&weights), volumes.len())
    };

    let trend = ProgressTrend::classify(records.len(), strength_trend, volume_trend);
    let confidence = confidence(experience, &weights, week_count);
    let plateau_risk = plateau_risk(experience, &weights, strength_trend);

    let next_week_volume = (average_volume * (1.0 + volume_trend * 0.01)).max(0.0);
    let next_week_weight = (average_weight * (1.0 + strength_trend * 0.01)).max(0.0);
    let personal_record_weight = current_one_rep_max * (1.0 + strength_trend * 0.02);
    let weeks_to_next_personal_record = if strength_trend > 0.0 {
        (8.0 - strength_trend * 2.0).clamp(2.0, 12.0)
    } else {
        12.0
    };

    ProgressPrediction {
        next_week_volume: round_to(next_week_volume, 2).clamp(0.0, average_volume * 1.5),
        next_week_weight: round_to(next_week_weight, 2).clamp(0.0, max_weight * 1.1),
        monthly_growth_rate: round_to(strength_trend * 4.0, 2),
        predicted_personal_record: PredictedPersonalRecord {
            weight: round_to(personal_record_weight, 2)
                .clamp(current_one_rep_max, current_one_rep_max * 1.3),
            confidence: round_to((confidence * 0.8).clamp(0.3, 0.9), 2),
        },
        plateau_risk: round_to(plateau_risk, 2),
        trend,
        weeks_to_next_personal_record: round_to(weeks_to_next_personal_record, 2),
        confidence: round_to(confidence, 2),
        volume_trend: round_to(volume_trend, 2),
        strength_trend: round_to(strength_trend, 2),
        recommendations: recommendations(trend, week_count, plateau_risk),
    }
}

/// Total volume and average weight per Monday-start week, in chronological order.
fn weekly_volume_and_weight(records: &[&WorkoutRecord]) -> Vec<(f32, f32)> {
    let mut weeks: BTreeMap<NaiveDate, Vec<&WorkoutRecord>> = BTreeMap::new();
    for &record in records {
        weeks
            .entry(temporal::week_of(record.date, Weekday::Mon).first)
            .or_default()
            .push(record);
    }

    weeks
        .values()
        .map(|week| {
            (
                week.iter().map(|r| r.volume()).sum::<f32>(),
                average(&week.iter().map(|r| r.max_weight()).collect::<Vec<_>>()),
            )
        })
        .collect()
}

fn confidence(experience: TrainingExperience, weights: &[f32], weeks: usize) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let data = (weights.len() as f32 / 50.0 * 0.2).min(0.2);
    #[allow(clippy::cast_precision_loss)]
    let consistency = (weeks as f32 / 12.0 * 0.1).min(0.1);
    let quality = (0.1 - coefficient_of_variation(weights) * 0.1).clamp(0.0, 0.1);

    (experience.base_confidence() + data + consistency + quality).clamp(0.3, 0.9)
}

/// `weights` must be in chronological order.
fn plateau_risk(experience: TrainingExperience, weights: &[f32], strength_trend: f32) -> f32 {
    let mut risk = experience.base_plateau_risk();

    let half = weights.len() / 2;
    let overall_progress = relative_change(average(&weights[..half]), average(&weights[half..]));
    if overall_progress < 5.0 {
        risk += 20.0;
    } else if overall_progress < 10.0 {
        risk += 10.0;
    }

    if strength_trend < 0.0 {
        risk += 15.0;
    } else if strength_trend < ProgressTrend::STRENGTH_THRESHOLD {
        risk += 5.0;
    }

    let recent = &weights[weights.len().saturating_sub(10)..];
    if recent
        .first()
        .zip(recent.last())
        .is_some_and(|(first, last)| last < first)
    {
        risk += 25.0;
    }

    risk.clamp(0.0, 100.0)
}

fn recommendations(trend: ProgressTrend, weeks: usize, plateau_risk: f32) -> Vec<String> {
    let mut recommendations = match trend {
        ProgressTrend::Improving => vec![
            "¡Excelente progreso! Mantén la consistencia",
            "Considera aumentar gradualmente la intensidad",
        ],
        ProgressTrend::Stable if plateau_risk > 50.0 => vec![
            "Progreso estable, evalúa si necesitas más desafío",
            "Riesgo de meseta detectado - varía tu rutina",
        ],
        ProgressTrend::Stable => vec!["Progreso estable, evalúa si necesitas más desafío"],
        ProgressTrend::Declining => vec![
            "Revisa tu rutina y descanso",
            "Considera reducir volumen temporalmente",
        ],
        ProgressTrend::Insufficient => vec![
            "Necesitas más datos para análisis preciso",
            "Mantén consistencia en tus entrenamientos",
        ],
    };

    if weeks < 4 {
        recommendations.push("Más semanas de datos mejorarán las predicciones");
    }
    if plateau_risk > 70.0 {
        recommendations.push("Alto riesgo de meseta - cambia tu rutina");
    }

    recommendations.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::data::{date, record, refs};

    use super::*;

    #[rstest]
    #[case(ComparisonPeriod::ThisWeek, (date(2024, 3, 11), date(2024, 3, 17)), (date(2024, 3, 4), date(2024, 3, 10)))]
    #[case(ComparisonPeriod::LastTwoWeeks, (date(2024, 3, 4), date(2024, 3, 17)), (date(2024, 2, 19), date(2024, 3, 3)))]
    #[case(ComparisonPeriod::LastMonth, (date(2024, 2, 19), date(2024, 3, 17)), (date(2024, 1, 22), date(2024, 2, 18)))]
    #[case(ComparisonPeriod::LastThreeMonths, (date(2023, 12, 25), date(2024, 3, 17)), (date(2023, 10, 2), date(2023, 12, 24)))]
    fn test_comparison_period_intervals(
        #[case] period: ComparisonPeriod,
        #[case] current: (NaiveDate, NaiveDate),
        #[case] previous: (NaiveDate, NaiveDate),
    ) {
        let today = date(2024, 3, 14);

        assert_eq!(period.current(today), Interval::from(current.0..=current.1));
        assert_eq!(period.previous(today), Interval::from(previous.0..=previous.1));
    }

    #[test]
    fn test_compare_periods() {
        let records = [
            record(1, 100.0, 1, 10, date(2024, 2, 26)),
            record(1, 100.0, 1, 10, date(2024, 2, 28)),
            record(1, 100.0, 1, 10, date(2024, 3, 4)),
            record(1, 100.0, 1, 10, date(2024, 3, 6)),
            record(1, 110.0, 1, 12, date(2024, 3, 11)),
            record(1, 110.0, 1, 12, date(2024, 3, 13)),
        ];

        let comparisons = compare_periods(
            &refs(&records),
            date(2024, 3, 14),
            OneRepMaxFormula::Epley,
        );

        assert_eq!(
            comparisons.iter().map(|c| c.period).collect::<Vec<_>>(),
            ComparisonPeriod::ALL.to_vec()
        );

        let this_week = &comparisons[0];
        assert_eq!(this_week.workouts, 2);
        assert_approx_eq!(this_week.total_volume, 2640.0);
        assert_approx_eq!(this_week.average_one_rep_max, 110.0);
        assert_approx_eq!(this_week.volume_change, 32.0, 1e-3);
        assert_approx_eq!(this_week.strength_change, 10.0, 1e-3);
        assert_approx_eq!(this_week.improvement, 21.0, 1e-3);

        let last_two_weeks = &comparisons[1];
        assert_eq!(last_two_weeks.workouts, 4);
        assert_approx_eq!(last_two_weeks.volume_change, 0.0);
        assert_approx_eq!(last_two_weeks.strength_change, 0.0);
    }

    #[test]
    fn test_compare_periods_too_few_records() {
        let records = [
            record(1, 100.0, 1, 10, date(2024, 2, 26)),
            record(1, 100.0, 1, 10, date(2024, 3, 4)),
            record(1, 120.0, 1, 10, date(2024, 3, 11)),
            record(1, 120.0, 1, 10, date(2024, 3, 12)),
        ];

        let comparisons = compare_periods(
            &refs(&records),
            date(2024, 3, 14),
            OneRepMaxFormula::Epley,
        );

        assert_eq!(comparisons[0].workouts, 2);
        assert_approx_eq!(comparisons[0].improvement, 0.0);
    }

    #[test]
    fn test_compare_periods_empty() {
        assert_eq!(
            compare_periods(&[], date(2024, 3, 14), OneRepMaxFormula::Epley),
            vec![]
        );
    }

    #[rstest]
    #[case(6, 1.0, 100.0, ProgressTrend::Insufficient)]
    #[case(7, 1.0, 100.0, ProgressTrend::Improving)]
    #[case(7, -1.0, -100.0, ProgressTrend::Declining)]
    #[case(7, 0.2, 20.0, ProgressTrend::Stable)]
    #[case(7, 1.0, -100.0, ProgressTrend::Improving)]
    #[case(7, 0.0, -100.0, ProgressTrend::Declining)]
    fn test_progress_trend(
        #[case] records: usize,
        #[case] strength: f32,
        #[case] volume: f32,
        #[case] expected: ProgressTrend,
    ) {
        assert_eq!(ProgressTrend::classify(records, strength, volume), expected);
    }

    #[rstest]
    #[case(2500.0, 4.0, TrainingExperience::Advanced)]
    #[case(2500.0, 3.0, TrainingExperience::Intermediate)]
    #[case(1500.0, 2.5, TrainingExperience::Intermediate)]
    #[case(1500.0, 2.0, TrainingExperience::Beginner)]
    fn test_training_experience(
        #[case] volume: f32,
        #[case] frequency: f32,
        #[case] expected: TrainingExperience,
    ) {
        assert_eq!(
            TrainingExperience::from_volume_and_frequency(volume, frequency),
            expected
        );
    }

    #[test]
    fn test_predict_progress() {
        let records = [
            record(1, 100.0, 5, 3, date(2024, 2, 19)),
            record(1, 100.0, 5, 3, date(2024, 2, 21)),
            record(1, 102.5, 5, 3, date(2024, 2, 26)),
            record(1, 102.5, 5, 3, date(2024, 2, 28)),
            record(1, 105.0, 5, 3, date(2024, 3, 4)),
            record(1, 105.0, 5, 3, date(2024, 3, 6)),
            record(1, 107.5, 5, 3, date(2024, 3, 11)),
            record(1, 107.5, 5, 3, date(2024, 3, 13)),
        ];

        let prediction = predict_progress(
            &refs(&records),
            date(2024, 3, 14),
            OneRepMaxFormula::Epley,
        );

        assert_approx_eq!(prediction.strength_trend, 2.5);
        assert_approx_eq!(prediction.volume_trend, 75.0);
        assert_approx_eq!(prediction.monthly_growth_rate, 10.0);
        assert_eq!(prediction.trend, ProgressTrend::Improving);
        assert_approx_eq!(prediction.weeks_to_next_personal_record, 3.0);
        // 105 kg x 5 in the last complete week
        assert_approx_eq!(prediction.predicted_personal_record.weight, 128.63, 0.02);
        assert!(prediction.next_week_weight <= 107.5 * 1.1);
        assert!((0.3..=0.9).contains(&prediction.confidence));
        assert_approx_eq!(prediction.plateau_risk, 50.0);
        assert_eq!(
            prediction.recommendations,
            vec![
                "¡Excelente progreso! Mantén la consistencia".to_string(),
                "Considera aumentar gradualmente la intensidad".to_string(),
            ]
        );
    }

    #[test]
    fn test_predict_progress_plateau() {
        let records = (0..8)
            .map(|week| record(1, 100.0, 5, 3, date(2024, 1, 1) + Days::new(7 * week)))
            .collect::<Vec<_>>();

        let prediction = predict_progress(
            &refs(&records),
            date(2024, 3, 14),
            OneRepMaxFormula::Epley,
        );

        assert_eq!(prediction.trend, ProgressTrend::Stable);
        assert_approx_eq!(prediction.strength_trend, 0.0);
        assert_approx_eq!(prediction.weeks_to_next_personal_record, 12.0);
        assert_approx_eq!(prediction.plateau_risk, 35.0);
        assert_approx_eq!(prediction.next_week_volume, 1500.0);
        assert_approx_eq!(prediction.next_week_weight, 100.0);
    }

    #[rstest]
    #[case::too_few_records(4, 7)]
    #[case::too_short(6, 1)]
    fn test_predict_progress_insufficient(#[case] count: u64, #[case] interval_days: u64) {
        let records = (0..count)
            .map(|i| record(1, 100.0, 5, 3, date(2024, 3, 1) + Days::new(i * interval_days)))
            .collect::<Vec<_>>();

        let prediction = predict_progress(
            &refs(&records),
            date(2024, 3, 14),
            OneRepMaxFormula::Epley,
        );

        assert_eq!(prediction, ProgressPrediction::default());
        assert_eq!(prediction.trend.as_ref(), "insuficiente");
    }
}
