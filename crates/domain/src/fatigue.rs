use chrono::{Days, NaiveDate, Weekday};
use strum::AsRefStr;

use crate::{WorkoutRecord, statistics, temporal};

/// Length of the trailing window used for load based analyses.
pub const LOAD_WINDOW_DAYS: u32 = 6;

/// Average training days per week within the last `window_days` days.
#[must_use]
pub fn training_frequency(records: &[&WorkoutRecord], today: NaiveDate, window_days: u32) -> f32 {
    if window_days == 0 {
        return 0.0;
    }

    let days = temporal::unique_days(&temporal::within_last_days(records, today, window_days));

    #[allow(clippy::cast_precision_loss)]
    let (days, weeks) = (days as f32, window_days as f32 / 7.0);
    days / weeks
}

/// Share of the expected training days that were hit within the last `window_days` days.
///
/// The expectation is derived from the historical frequency between the first record and
/// `today`.
#[must_use]
pub fn training_consistency(
    records: &[&WorkoutRecord],
    today: NaiveDate,
    window_days: u32,
) -> f32 {
    let Some(first) = temporal::earliest_date(records) else {
        return 0.0;
    };

    #[allow(clippy::cast_precision_loss)]
    let span_weeks = ((today - first).num_days() as f32 / 7.0).max(1.0);
    #[allow(clippy::cast_precision_loss)]
    let historical_frequency = temporal::unique_days(records) as f32 / span_weeks;
    #[allow(clippy::cast_precision_loss)]
    let expected = historical_frequency * window_days as f32 / 7.0;

    if expected <= 0.0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let actual =
        temporal::unique_days(&temporal::within_last_days(records, today, window_days)) as f32;
    (actual / expected * 100.0).min(100.0)
}

#[derive(AsRefStr, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OverreachingRisk {
    #[default]
    #[strum(serialize = "Bajo")]
    Low,
    #[strum(serialize = "Medio")]
    Medium,
    #[strum(serialize = "Alto")]
    High,
}

#[derive(AsRefStr, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FatigueLevel {
    #[default]
    #[strum(serialize = "Muy Baja")]
    VeryLow,
    #[strum(serialize = "Baja")]
    Low,
    #[strum(serialize = "Moderada")]
    Moderate,
    #[strum(serialize = "Alta")]
    High,
    #[strum(serialize = "Muy Alta")]
    VeryHigh,
}

impl FatigueLevel {
    #[must_use]
    pub fn from_index(fatigue_index: f32) -> Self {
        if fatigue_index < 20.0 {
            FatigueLevel::VeryLow
        } else if fatigue_index < 40.0 {
            FatigueLevel::Low
        } else if fatigue_index < 60.0 {
            FatigueLevel::Moderate
        } else if fatigue_index < 80.0 {
            FatigueLevel::High
        } else {
            FatigueLevel::VeryHigh
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FatigueAnalysis {
    pub total_volume: f32,
    pub workout_days: usize,
    pub volume_stress: f32,
    pub frequency_stress: f32,
    pub fatigue_index: f32,
    pub overreaching_risk: OverreachingRisk,
    pub fatigue_level: FatigueLevel,
    pub recovery_rate: f32,
    pub recovery_score: f32,
    pub plateau_risk: f32,
    pub recovery_days: usize,
    pub recommendation: String,
}

impl FatigueAnalysis {
    pub const VOLUME_CAPACITY: f32 = 10_000.0;
    pub const HIGH_RISK_THRESHOLD: f32 = 70.0;
    pub const MEDIUM_RISK_THRESHOLD: f32 = 40.0;

    #[must_use]
    pub fn from_load(total_volume: f32, workout_days: usize, recent_days: usize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let frequency_stress = (workout_days as f32 / 7.0 * 100.0).min(100.0);
        let volume_stress = (total_volume / Self::VOLUME_CAPACITY * 100.0).min(100.0);
        let fatigue_index = ((volume_stress + frequency_stress) / 2.0).min(100.0);

        let (overreaching_risk, recommendation) = if fatigue_index > Self::HIGH_RISK_THRESHOLD {
            (
                OverreachingRisk::High,
                "Considera tomar 2-3 días de descanso completo",
            )
        } else if fatigue_index > Self::MEDIUM_RISK_THRESHOLD {
            (
                OverreachingRisk::Medium,
                "Reduce la intensidad en tu próximo entrenamiento",
            )
        } else {
            (OverreachingRisk::Low, "Tu recuperación está en buen estado")
        };

        Self {
            total_volume,
            workout_days,
            volume_stress,
            frequency_stress,
            fatigue_index,
            overreaching_risk,
            fatigue_level: FatigueLevel::from_index(fatigue_index),
            recovery_rate: (100.0 - fatigue_index).max(0.0),
            recovery_score: (100.0 - fatigue_index * 1.2).max(0.0),
            plateau_risk: (fatigue_index * 0.8).min(100.0),
            recovery_days: 7_usize.saturating_sub(recent_days),
            recommendation: recommendation.to_string(),
        }
    }
}

impl Default for FatigueAnalysis {
    fn default() -> Self {
        Self {
            total_volume: 0.0,
            workout_days: 0,
            volume_stress: 0.0,
            frequency_stress: 0.0,
            fatigue_index: 0.0,
            overreaching_risk: OverreachingRisk::default(),
            fatigue_level: FatigueLevel::default(),
            recovery_rate: 0.0,
            recovery_score: 0.0,
            plateau_risk: 0.0,
            recovery_days: 0,
            recommendation: "Datos insuficientes para análisis".to_string(),
        }
    }
}

/// Fatigue caused by the load of the trailing week.
#[must_use]
pub fn fatigue_analysis(records: &[&WorkoutRecord], today: NaiveDate) -> FatigueAnalysis {
    if records.is_empty() {
        return FatigueAnalysis::default();
    }

    let recent = temporal::within_last_days(records, today, LOAD_WINDOW_DAYS);
    let days = temporal::unique_days(&recent);

    FatigueAnalysis::from_load(recent.iter().map(|r| r.volume()).sum(), days, days)
}

#[derive(AsRefStr, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OverallIntensity {
    #[default]
    #[strum(serialize = "Baja")]
    Low,
    #[strum(serialize = "Óptima")]
    Optimal,
    #[strum(serialize = "Alta")]
    High,
    #[strum(serialize = "Excesiva")]
    Excessive,
}

impl OverallIntensity {
    #[must_use]
    pub fn from_score(score: f32) -> Self {
        if score > 80.0 {
            OverallIntensity::Excessive
        } else if score > 60.0 {
            OverallIntensity::High
        } else if score > 40.0 {
            OverallIntensity::Optimal
        } else {
            OverallIntensity::Low
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct IntensityMetrics {
    pub average: f32,
    pub volume: f32,
    pub frequency: f32,
    pub overall: OverallIntensity,
}

impl IntensityMetrics {
    pub const VOLUME_REFERENCE: f32 = 5000.0;
    pub const FREQUENCY_REFERENCE: f32 = 5.0;

    #[must_use]
    pub fn from_records(records: &[&WorkoutRecord]) -> Self {
        let weights = records.iter().map(|r| r.max_weight()).collect::<Vec<_>>();
        let volume = records.iter().map(|r| r.volume()).sum::<f32>();
        #[allow(clippy::cast_precision_loss)]
        let days = temporal::unique_days(records) as f32;

        let average = statistics::average(&weights).min(100.0);
        let volume = (volume / Self::VOLUME_REFERENCE * 100.0).min(100.0);
        let frequency = (days / Self::FREQUENCY_REFERENCE * 100.0).min(100.0);

        Self {
            average,
            volume,
            frequency,
            overall: OverallIntensity::from_score((average + volume + frequency) / 3.0),
        }
    }
}

/// Intensity of the trailing week.
#[must_use]
pub fn intensity_metrics(records: &[&WorkoutRecord], today: NaiveDate) -> IntensityMetrics {
    IntensityMetrics::from_records(&temporal::within_last_days(records, today, LOAD_WINDOW_DAYS))
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DensityLevel {
    #[strum(serialize = "Baja")]
    Low,
    #[strum(serialize = "Media")]
    Medium,
    #[strum(serialize = "Alta")]
    High,
    #[strum(serialize = "Muy Alta")]
    VeryHigh,
}

impl DensityLevel {
    #[must_use]
    pub fn from_workouts_per_week(workouts_per_week: f32) -> Self {
        if workouts_per_week >= 6.0 {
            DensityLevel::VeryHigh
        } else if workouts_per_week >= 4.0 {
            DensityLevel::High
        } else if workouts_per_week >= 2.0 {
            DensityLevel::Medium
        } else {
            DensityLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingDensity {
    pub period: &'static str,
    pub weeks: u32,
    pub workouts_per_week: f32,
    pub volume_per_workout: f32,
    pub density_score: f32,
    pub level: DensityLevel,
}

impl TrainingDensity {
    pub const MINUTES_PER_WORKOUT: f32 = 60.0;
    pub const PERIODS: [(&'static str, u32); 4] = [
        ("Esta semana", 1),
        ("Últimas 2 semanas", 2),
        ("Último mes", 4),
        ("Últimos 2 meses", 8),
    ];
}

/// Training density of periods of full weeks ending with the current week.
///
/// Periods without records are omitted.
#[must_use]
pub fn training_density(records: &[&WorkoutRecord], today: NaiveDate) -> Vec<TrainingDensity> {
    let current_week = temporal::week_of(today, Weekday::Mon);

    TrainingDensity::PERIODS
        .iter()
        .filter_map(|&(period, weeks)| {
            let first = current_week
                .first
                .checked_sub_days(Days::new(7 * u64::from(weeks - 1)))?;
            let period_records = temporal::within_interval(
                records,
                &(first..=current_week.last).into(),
            );

            if period_records.is_empty() {
                return None;
            }

            #[allow(clippy::cast_precision_loss)]
            let workouts_per_week =
                temporal::unique_days(&period_records) as f32 / weeks as f32;
            #[allow(clippy::cast_precision_loss)]
            let volume_per_workout = period_records.iter().map(|r| r.volume()).sum::<f32>()
                / period_records.len() as f32;

            Some(TrainingDensity {
                period,
                weeks,
                workouts_per_week,
                volume_per_workout,
                density_score: volume_per_workout / TrainingDensity::MINUTES_PER_WORKOUT,
                level: DensityLevel::from_workouts_per_week(workouts_per_week),
            })
        })
        .collect()
}

/// Training days of the trailing week relative to four days per week.
#[must_use]
pub fn time_efficiency_score(records: &[&WorkoutRecord], today: NaiveDate) -> f32 {
    let recent = temporal::within_last_days(records, today, LOAD_WINDOW_DAYS);

    #[allow(clippy::cast_precision_loss)]
    let days = temporal::unique_days(&recent) as f32;
    (days / 4.0 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        statistics::round_to,
        tests::data::{date, record, refs},
    };

    use super::*;

    fn records_on(days: &[(u32, u32)], weight: f32) -> Vec<WorkoutRecord> {
        days.iter()
            .map(|(m, d)| record(1, weight, 10, 3, date(2024, *m, *d)))
            .collect()
    }

    #[rstest]
    #[case::window(7, 4.0)]
    #[case::two_weeks(14, 2.5)]
    #[case::zero_window(0, 0.0)]
    fn test_training_frequency(#[case] window: u32, #[case] expected: f32) {
        let records = records_on(&[(3, 6), (3, 8), (3, 13), (3, 14), (3, 15), (3, 15)], 50.0);

        assert_approx_eq!(
            training_frequency(&refs(&records), date(2024, 3, 15), window),
            expected
        );
    }

    #[test]
    fn test_training_consistency() {
        // 8 training days in 4 weeks, 2 of them within the last week
        let records = records_on(
            &[(2, 16), (2, 19), (2, 23), (2, 26), (3, 1), (3, 5), (3, 12), (3, 14)],
            50.0,
        );

        assert_approx_eq!(
            training_consistency(&refs(&records), date(2024, 3, 15), 7),
            100.0
        );
        assert_approx_eq!(
            training_consistency(&refs(&records), date(2024, 3, 22), 7),
            0.0
        );
        assert_approx_eq!(
            training_consistency(&refs(&records[..7]), date(2024, 3, 15), 7),
            100.0 / 1.75,
            1e-3
        );
    }

    #[test]
    fn test_training_consistency_empty() {
        assert_approx_eq!(training_consistency(&[], date(2024, 3, 15), 7), 0.0);
    }

    #[test]
    fn test_fatigue_from_load() {
        let analysis = FatigueAnalysis::from_load(12_000.0, 5, 5);

        assert_approx_eq!(analysis.volume_stress, 100.0);
        assert_approx_eq!(round_to(analysis.frequency_stress, 2), 71.43, 1e-3);
        assert_approx_eq!(round_to(analysis.fatigue_index, 2), 85.71, 1e-3);
        assert_eq!(analysis.overreaching_risk, OverreachingRisk::High);
        assert_eq!(analysis.overreaching_risk.as_ref(), "Alto");
        assert_eq!(analysis.fatigue_level, FatigueLevel::VeryHigh);
        assert_approx_eq!(round_to(analysis.recovery_rate, 2), 14.29, 1e-3);
        assert_approx_eq!(analysis.recovery_score, 0.0);
        assert_approx_eq!(round_to(analysis.plateau_risk, 2), 68.57, 1e-3);
        assert_eq!(analysis.recovery_days, 2);
        assert_eq!(
            analysis.recommendation,
            "Considera tomar 2-3 días de descanso completo"
        );
    }

    #[rstest]
    #[case::high(14_000.0, 5, OverreachingRisk::High, "Considera tomar 2-3 días de descanso completo")]
    #[case::medium(5000.0, 3, OverreachingRisk::Medium, "Reduce la intensidad en tu próximo entrenamiento")]
    #[case::low(2000.0, 2, OverreachingRisk::Low, "Tu recuperación está en buen estado")]
    #[case::idle(0.0, 0, OverreachingRisk::Low, "Tu recuperación está en buen estado")]
    fn test_overreaching_risk(
        #[case] volume: f32,
        #[case] days: usize,
        #[case] risk: OverreachingRisk,
        #[case] recommendation: &str,
    ) {
        let analysis = FatigueAnalysis::from_load(volume, days, days);

        assert_eq!(analysis.overreaching_risk, risk);
        assert_eq!(analysis.recommendation, recommendation);
    }

    #[rstest]
    #[case(0.0, FatigueLevel::VeryLow)]
    #[case(19.9, FatigueLevel::VeryLow)]
    #[case(20.0, FatigueLevel::Low)]
    #[case(40.0, FatigueLevel::Moderate)]
    #[case(60.0, FatigueLevel::High)]
    #[case(80.0, FatigueLevel::VeryHigh)]
    fn test_fatigue_level(#[case] index: f32, #[case] expected: FatigueLevel) {
        assert_eq!(FatigueLevel::from_index(index), expected);
    }

    #[test]
    fn test_fatigue_analysis() {
        // 4000 volume on each of three days, one day outside the window
        let records = records_on(&[(3, 7), (3, 10), (3, 12), (3, 14)], 400.0 / 3.0);

        let analysis = fatigue_analysis(&refs(&records), date(2024, 3, 14));

        assert_eq!(analysis.workout_days, 3);
        assert_approx_eq!(analysis.total_volume, 12_000.0, 1e-1);
        assert_eq!(analysis.recovery_days, 4);
        assert_eq!(analysis.overreaching_risk, OverreachingRisk::High);
    }

    #[test]
    fn test_fatigue_analysis_empty() {
        let analysis = fatigue_analysis(&[], date(2024, 3, 14));

        assert_eq!(analysis, FatigueAnalysis::default());
        assert_approx_eq!(analysis.fatigue_index, 0.0);
        assert_eq!(analysis.overreaching_risk, OverreachingRisk::Low);
    }

    #[test]
    fn test_intensity_metrics() {
        let records = [
            record(1, 60.0, 5, 3, date(2024, 3, 12)),
            record(1, 80.0, 5, 3, date(2024, 3, 13)),
            record(1, 500.0, 10, 3, date(2024, 3, 1)),
        ];

        let metrics = intensity_metrics(&refs(&records), date(2024, 3, 14));

        assert_approx_eq!(metrics.average, 70.0);
        assert_approx_eq!(metrics.volume, 42.0, 1e-4);
        assert_approx_eq!(metrics.frequency, 40.0);
        assert_eq!(metrics.overall, OverallIntensity::Optimal);
        assert_eq!(metrics.overall.as_ref(), "Óptima");
    }

    #[rstest]
    #[case(80.1, OverallIntensity::Excessive)]
    #[case(80.0, OverallIntensity::High)]
    #[case(60.1, OverallIntensity::High)]
    #[case(41.0, OverallIntensity::Optimal)]
    #[case(40.0, OverallIntensity::Low)]
    fn test_overall_intensity(#[case] score: f32, #[case] expected: OverallIntensity) {
        assert_eq!(OverallIntensity::from_score(score), expected);
    }

    #[test]
    fn test_intensity_metrics_empty() {
        assert_eq!(
            intensity_metrics(&[], date(2024, 3, 14)),
            IntensityMetrics::default()
        );
    }

    #[test]
    fn test_training_density() {
        // today is Wednesday 2024-03-13, the current week starts on 2024-03-11
        let records = records_on(&[(3, 11), (3, 12), (3, 13), (3, 13), (3, 5), (2, 1)], 20.0);

        let density = training_density(&refs(&records), date(2024, 3, 13));

        assert_eq!(
            density
                .iter()
                .map(|d| (d.period, d.weeks, d.level))
                .collect::<Vec<_>>(),
            vec![
                ("Esta semana", 1, DensityLevel::Medium),
                ("Últimas 2 semanas", 2, DensityLevel::Medium),
                ("Último mes", 4, DensityLevel::Low),
                ("Últimos 2 meses", 8, DensityLevel::Low),
            ]
        );
        assert_approx_eq!(density[0].workouts_per_week, 3.0);
        assert_approx_eq!(density[0].volume_per_workout, 600.0);
        assert_approx_eq!(density[0].density_score, 10.0);
        assert_approx_eq!(density[1].workouts_per_week, 2.0);
        assert_approx_eq!(density[2].workouts_per_week, 1.0);
        assert_approx_eq!(density[3].workouts_per_week, 5.0 / 8.0);
    }

    #[test]
    fn test_training_density_skips_empty_periods() {
        let records = records_on(&[(1, 29)], 20.0);

        let density = training_density(&refs(&records), date(2024, 3, 13));

        assert_eq!(
            density.iter().map(|d| d.period).collect::<Vec<_>>(),
            vec!["Últimos 2 meses"]
        );
        assert!(training_density(&[], date(2024, 3, 13)).is_empty());
    }

    #[rstest]
    #[case(&[(3, 13)], 25.0)]
    #[case(&[(3, 8), (3, 10), (3, 13), (3, 13)], 75.0)]
    #[case(&[(3, 7), (3, 8), (3, 9), (3, 10), (3, 13)], 100.0)]
    #[case(&[(3, 1)], 0.0)]
    fn test_time_efficiency_score(#[case] days: &[(u32, u32)], #[case] expected: f32) {
        let records = records_on(days, 20.0);

        assert_approx_eq!(
            time_efficiency_score(&refs(&records), date(2024, 3, 13)),
            expected
        );
    }
}
