use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::{Category, Exercise, Property, WorkoutRecord, category_volume_totals, statistics};

/// Target share of the total volume per category in percent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct IdealDistribution(BTreeMap<Category, f32>);

impl IdealDistribution {
    /// Used for categories missing in both the distribution and the default distribution.
    pub const FALLBACK_PERCENTAGE: f32 = 15.0;

    /// Categories missing in a custom distribution take their share from the default one.
    #[must_use]
    pub fn get(&self, category: Category) -> f32 {
        self.0
            .get(&category)
            .copied()
            .or_else(|| Self::default().0.get(&category).copied())
            .unwrap_or(Self::FALLBACK_PERCENTAGE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f32)> + '_ {
        self.0.iter().map(|(c, p)| (*c, *p))
    }
}

impl Default for IdealDistribution {
    fn default() -> Self {
        Self::from_iter([
            (Category::Chest, 20.0),
            (Category::Back, 25.0),
            (Category::Legs, 30.0),
            (Category::Shoulders, 10.0),
            (Category::Arms, 10.0),
            (Category::Core, 5.0),
        ])
    }
}

impl FromIterator<(Category, f32)> for IdealDistribution {
    fn from_iter<T: IntoIterator<Item = (Category, f32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum BalancePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl BalancePriority {
    #[must_use]
    pub fn from_deviation(deviation: f32) -> Self {
        if deviation < -15.0 {
            BalancePriority::Critical
        } else if deviation < -5.0 || deviation > 15.0 {
            BalancePriority::High
        } else if deviation.abs() <= 3.0 {
            BalancePriority::Low
        } else {
            BalancePriority::Medium
        }
    }
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum BalanceTier {
    Optimal,
    Good,
    NeedsImprovement,
    Overdeveloped,
}

impl BalanceTier {
    #[must_use]
    pub fn from_percentages(actual: f32, ideal: f32) -> Self {
        if ideal <= 0.0 {
            return if actual > 0.0 {
                BalanceTier::Overdeveloped
            } else {
                BalanceTier::Optimal
            };
        }

        let ratio = actual / ideal;

        if (0.9..=1.2).contains(&ratio) {
            BalanceTier::Optimal
        } else if (0.7..=1.5).contains(&ratio) {
            BalanceTier::Good
        } else if ratio < 0.7 {
            BalanceTier::NeedsImprovement
        } else {
            BalanceTier::Overdeveloped
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MuscleBalance {
    pub category: Category,
    pub volume: f32,
    pub percentage: f32,
    pub ideal_percentage: f32,
    pub deviation: f32,
    pub is_balanced: bool,
    pub priority: BalancePriority,
    pub ratio: f32,
    pub tier: BalanceTier,
    pub recommendation: String,
}

impl MuscleBalance {
    pub const BALANCED_DEVIATION: f32 = 10.0;
}

/// Compare the volume share of every category with its ideal share.
///
/// The shares of all categories sum up to 100 % if any volume was recorded. Records of unknown
/// exercises are ignored.
#[must_use]
pub fn muscle_balance(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
    ideal: &IdealDistribution,
) -> Vec<MuscleBalance> {
    if records.is_empty() {
        return vec![];
    }

    let volumes = category_volume_totals(records, exercises);
    let total = volumes.values().sum::<f32>();

    Category::iter()
        .map(|category| {
            let volume = volumes.get(category).copied().unwrap_or_default();
            let percentage = if total > 0.0 {
                volume / total * 100.0
            } else {
                0.0
            };
            let ideal_percentage = ideal.get(*category);
            let deviation = percentage - ideal_percentage;
            let is_balanced = deviation.abs() <= MuscleBalance::BALANCED_DEVIATION;

            MuscleBalance {
                category: *category,
                volume,
                percentage,
                ideal_percentage,
                deviation,
                is_balanced,
                priority: BalancePriority::from_deviation(deviation),
                ratio: if ideal_percentage > 0.0 {
                    percentage / ideal_percentage
                } else {
                    0.0
                },
                tier: BalanceTier::from_percentages(percentage, ideal_percentage),
                recommendation: recommendation(*category, deviation, is_balanced),
            }
        })
        .collect()
}

fn recommendation(category: Category, deviation: f32, is_balanced: bool) -> String {
    if is_balanced {
        format!("{category} está bien balanceado")
    } else if deviation > 0.0 {
        format!("Reducir volumen de {}", category.to_string().to_lowercase())
    } else {
        format!("Aumentar volumen de {}", category.to_string().to_lowercase())
    }
}

/// Overall balance between 0 and 100, where 100 means every category matches its ideal share.
#[must_use]
pub fn balance_score(entries: &[MuscleBalance]) -> f32 {
    if entries.is_empty() {
        return 0.0;
    }

    let mean_deviation = statistics::average(
        &entries
            .iter()
            .map(|e| e.deviation.abs())
            .collect::<Vec<_>>(),
    );

    (100.0 - mean_deviation / 50.0 * 100.0).max(0.0).round()
}

impl Category {
    /// Opposing muscle group whose volume should be kept in proportion.
    #[must_use]
    pub fn antagonist(self) -> Category {
        match self {
            Category::Chest => Category::Back,
            Category::Back => Category::Chest,
            Category::Legs => Category::Arms,
            Category::Arms => Category::Legs,
            Category::Shoulders => Category::Core,
            Category::Core => Category::Shoulders,
        }
    }
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum AntagonistImbalance {
    Balanced,
    TooMuch,
    TooLittle,
}

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum ImbalanceSeverity {
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AntagonistRatio {
    pub category: Category,
    pub antagonist: Category,
    /// Volume of the category divided by the volume of its antagonist, zero if the antagonist
    /// was not trained.
    pub ratio: f32,
    pub ideal_ratio: f32,
    /// Deviation from the ideal ratio in percent.
    pub deviation: f32,
    pub imbalance: AntagonistImbalance,
    pub severity: ImbalanceSeverity,
}

impl AntagonistRatio {
    pub const MILD_DEVIATION: f32 = 20.0;
    pub const MODERATE_DEVIATION: f32 = 40.0;

    #[must_use]
    pub fn new(category: Category, ratio: f32, ideal: &IdealDistribution) -> Self {
        let antagonist = category.antagonist();
        let antagonist_ideal = ideal.get(antagonist);
        let ideal_ratio = if antagonist_ideal > 0.0 {
            ideal.get(category) / antagonist_ideal
        } else {
            1.0
        };
        let deviation = if ideal_ratio > 0.0 {
            (ratio - ideal_ratio) / ideal_ratio * 100.0
        } else {
            0.0
        };

        let (imbalance, severity) = if deviation.abs() <= Self::MILD_DEVIATION {
            (AntagonistImbalance::Balanced, ImbalanceSeverity::Mild)
        } else {
            (
                if deviation > 0.0 {
                    AntagonistImbalance::TooMuch
                } else {
                    AntagonistImbalance::TooLittle
                },
                if deviation.abs() > Self::MODERATE_DEVIATION {
                    ImbalanceSeverity::Severe
                } else {
                    ImbalanceSeverity::Moderate
                },
            )
        };

        Self {
            category,
            antagonist,
            ratio,
            ideal_ratio,
            deviation,
            imbalance,
            severity,
        }
    }

    #[must_use]
    pub fn has_imbalance(&self) -> bool {
        self.imbalance != AntagonistImbalance::Balanced
    }
}

/// Compare the volume of every trained category with the volume of its antagonist.
#[must_use]
pub fn antagonist_ratios(
    records: &[&WorkoutRecord],
    exercises: &[Exercise],
    ideal: &IdealDistribution,
) -> Vec<AntagonistRatio> {
    let volumes = category_volume_totals(records, exercises);
    let volume = |category: Category| volumes.get(&category).copied().unwrap_or_default();

    Category::iter()
        .filter(|category| volume(**category) > 0.0)
        .map(|category| {
            let antagonist_volume = volume(category.antagonist());
            let ratio = if antagonist_volume > 0.0 {
                statistics::round_to(volume(*category) / antagonist_volume, 2)
            } else {
                0.0
            };
            AntagonistRatio::new(*category, ratio, ideal)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::tests::data::{EXERCISES, date, exercise, record, refs};

    use super::*;

    #[test]
    fn test_ideal_distribution_default() {
        let ideal = IdealDistribution::default();

        assert_approx_eq!(ideal.get(Category::Chest), 20.0);
        assert_approx_eq!(ideal.get(Category::Legs), 30.0);
        assert_approx_eq!(ideal.get(Category::Core), 5.0);
        assert_approx_eq!(ideal.iter().map(|(_, p)| p).sum::<f32>(), 100.0);
    }

    #[rstest]
    #[case(Category::Chest, 30.0)]
    #[case(Category::Back, 25.0)]
    #[case(Category::Legs, 30.0)]
    #[case(Category::Core, 5.0)]
    fn test_ideal_distribution_partial(#[case] category: Category, #[case] expected: f32) {
        let ideal: IdealDistribution = serde_json::from_str(r#"{"Pecho": 30}"#).unwrap();

        assert_approx_eq!(ideal.get(category), expected);
    }

    #[test]
    fn test_ideal_distribution_fallback() {
        let ideal = IdealDistribution(BTreeMap::new());

        for category in Category::iter() {
            assert_approx_eq!(ideal.get(*category), IdealDistribution::default().get(*category));
        }
    }

    #[test]
    fn test_ideal_distribution_serde() {
        let ideal: IdealDistribution =
            serde_json::from_str(r#"{"Pecho": 30, "Piernas": 70}"#).unwrap();

        assert_eq!(
            ideal,
            IdealDistribution::from_iter([(Category::Chest, 30.0), (Category::Legs, 70.0)])
        );
        assert_eq!(
            serde_json::to_string(&ideal).unwrap(),
            r#"{"Pecho":30.0,"Piernas":70.0}"#
        );
    }

    #[rstest]
    #[case(-20.0, BalancePriority::Critical)]
    #[case(-10.0, BalancePriority::High)]
    #[case(20.0, BalancePriority::High)]
    #[case(-3.0, BalancePriority::Low)]
    #[case(3.0, BalancePriority::Low)]
    #[case(-5.0, BalancePriority::Medium)]
    #[case(15.0, BalancePriority::Medium)]
    fn test_balance_priority(#[case] deviation: f32, #[case] expected: BalancePriority) {
        assert_eq!(BalancePriority::from_deviation(deviation), expected);
    }

    #[rstest]
    #[case(20.0, 20.0, BalanceTier::Optimal)]
    #[case(18.0, 20.0, BalanceTier::Optimal)]
    #[case(24.0, 20.0, BalanceTier::Optimal)]
    #[case(14.0, 20.0, BalanceTier::Good)]
    #[case(30.0, 20.0, BalanceTier::Good)]
    #[case(10.0, 20.0, BalanceTier::NeedsImprovement)]
    #[case(31.0, 20.0, BalanceTier::Overdeveloped)]
    #[case(0.0, 0.0, BalanceTier::Optimal)]
    #[case(5.0, 0.0, BalanceTier::Overdeveloped)]
    fn test_balance_tier(#[case] actual: f32, #[case] ideal: f32, #[case] expected: BalanceTier) {
        assert_eq!(BalanceTier::from_percentages(actual, ideal), expected);
    }

    #[test]
    fn test_muscle_balance() {
        let records = [
            record(1, 100.0, 10, 6, date(2024, 3, 1)),
            record(3, 100.0, 10, 4, date(2024, 3, 2)),
            record(99, 100.0, 10, 4, date(2024, 3, 2)),
        ];

        let balance = muscle_balance(&refs(&records), &EXERCISES, &IdealDistribution::default());

        assert_eq!(
            balance.iter().map(|b| b.category).collect::<Vec<_>>(),
            Category::iter().copied().collect::<Vec<_>>()
        );
        assert_approx_eq!(balance.iter().map(|b| b.percentage).sum::<f32>(), 100.0, 1e-3);

        let chest = &balance[0];
        assert_approx_eq!(chest.volume, 6000.0);
        assert_approx_eq!(chest.percentage, 60.0, 1e-4);
        assert_approx_eq!(chest.deviation, 40.0, 1e-4);
        assert!(!chest.is_balanced);
        assert_eq!(chest.priority, BalancePriority::High);
        assert_approx_eq!(chest.ratio, 3.0, 1e-4);
        assert_eq!(chest.tier, BalanceTier::Overdeveloped);
        assert_eq!(chest.recommendation, "Reducir volumen de pecho");

        let legs = &balance[2];
        assert_approx_eq!(legs.percentage, 40.0, 1e-4);
        assert!(legs.is_balanced);
        assert_eq!(legs.tier, BalanceTier::Good);
        assert_eq!(legs.recommendation, "Piernas está bien balanceado");

        let back = &balance[1];
        assert_approx_eq!(back.percentage, 0.0);
        assert_eq!(back.priority, BalancePriority::Critical);
        assert_eq!(back.tier, BalanceTier::NeedsImprovement);
        assert_eq!(back.recommendation, "Aumentar volumen de espalda");
    }

    #[rstest]
    #[case(Category::Chest, 0.8, AntagonistImbalance::Balanced, ImbalanceSeverity::Mild)]
    #[case(Category::Chest, 0.9, AntagonistImbalance::Balanced, ImbalanceSeverity::Mild)]
    #[case(Category::Chest, 1.04, AntagonistImbalance::TooMuch, ImbalanceSeverity::Moderate)]
    #[case(Category::Chest, 0.6, AntagonistImbalance::TooLittle, ImbalanceSeverity::Moderate)]
    #[case(Category::Chest, 0.4, AntagonistImbalance::TooLittle, ImbalanceSeverity::Severe)]
    #[case(Category::Chest, 0.0, AntagonistImbalance::TooLittle, ImbalanceSeverity::Severe)]
    #[case(Category::Core, 0.5, AntagonistImbalance::Balanced, ImbalanceSeverity::Mild)]
    fn test_antagonist_ratio(
        #[case] category: Category,
        #[case] ratio: f32,
        #[case] imbalance: AntagonistImbalance,
        #[case] severity: ImbalanceSeverity,
    ) {
        let result = AntagonistRatio::new(category, ratio, &IdealDistribution::default());

        assert_eq!(result.imbalance, imbalance);
        assert_eq!(result.severity, severity);
        assert_eq!(result.has_imbalance(), imbalance != AntagonistImbalance::Balanced);
    }

    #[test]
    fn test_antagonist_ratio_partial_distribution() {
        let ideal: IdealDistribution = serde_json::from_str(r#"{"Pecho": 25}"#).unwrap();

        let result = AntagonistRatio::new(Category::Chest, 1.0, &ideal);

        assert_approx_eq!(result.ideal_ratio, 1.0);
        assert_eq!(result.imbalance, AntagonistImbalance::Balanced);
    }

    #[test]
    fn test_antagonist_ratios() {
        let records = [
            record(1, 100.0, 10, 1, date(2024, 3, 1)),
            record(2, 100.0, 10, 1, date(2024, 3, 2)),
            record(3, 50.0, 10, 1, date(2024, 3, 3)),
        ];

        let ratios = antagonist_ratios(&refs(&records), &EXERCISES, &IdealDistribution::default());

        assert_eq!(
            ratios
                .iter()
                .map(|r| (r.category, r.antagonist))
                .collect::<Vec<_>>(),
            vec![
                (Category::Chest, Category::Back),
                (Category::Back, Category::Chest),
                (Category::Legs, Category::Arms),
                (Category::Arms, Category::Legs),
            ]
        );
        // chest 1000, back 700, arms 300, legs 500
        assert_approx_eq!(ratios[0].ratio, 1.43);
        assert_approx_eq!(ratios[0].ideal_ratio, 0.8);
        assert_eq!(ratios[0].imbalance, AntagonistImbalance::TooMuch);
        assert_approx_eq!(ratios[1].ratio, 0.7);
        assert_approx_eq!(ratios[1].deviation, -44.0, 1e-3);
        assert_eq!(ratios[1].imbalance, AntagonistImbalance::TooLittle);
        assert_approx_eq!(ratios[2].ratio, 1.67);
        assert_approx_eq!(ratios[3].ratio, 0.6);
        assert!(ratios.iter().all(|r| r.severity == ImbalanceSeverity::Severe));
    }

    #[test]
    fn test_antagonist_ratios_without_antagonist() {
        let records = [record(1, 100.0, 10, 1, date(2024, 3, 1))];

        let ratios = antagonist_ratios(&refs(&records), &EXERCISES, &IdealDistribution::default());

        assert_eq!(ratios.len(), 1);
        assert_approx_eq!(ratios[0].ratio, 0.0);
        assert_approx_eq!(ratios[0].deviation, -100.0);
        assert_eq!(ratios[0].severity, ImbalanceSeverity::Severe);
    }

    #[test]
    fn test_muscle_balance_empty() {
        assert_eq!(
            muscle_balance(&[], &EXERCISES, &IdealDistribution::default()),
            vec![]
        );
        assert_approx_eq!(balance_score(&[]), 0.0);
    }

    #[test]
    fn test_balance_score_at_ideal() {
        let exercises = Category::iter()
            .zip(11..)
            .map(|(category, id)| exercise(id, &category.to_string(), &[*category], None))
            .collect::<Vec<_>>();
        // 20/25/30/10/10/5 of a total volume of 20000
        let records = [
            record(11, 100.0, 10, 4, date(2024, 3, 1)),
            record(12, 100.0, 10, 5, date(2024, 3, 1)),
            record(13, 100.0, 10, 6, date(2024, 3, 1)),
            record(14, 100.0, 10, 2, date(2024, 3, 1)),
            record(15, 100.0, 10, 2, date(2024, 3, 1)),
            record(16, 50.0, 10, 2, date(2024, 3, 1)),
        ];

        let balance = muscle_balance(&refs(&records), &exercises, &IdealDistribution::default());

        assert!(balance.iter().all(|b| b.deviation.abs() < 1e-3), "{balance:#?}");
        assert!(balance.iter().all(|b| b.tier == BalanceTier::Optimal));
        assert_approx_eq!(balance_score(&balance), 100.0);
    }

    #[rstest]
    #[case(&[0.0, 0.0], 100.0)]
    #[case(&[10.0, -10.0], 80.0)]
    #[case(&[50.0, -50.0], 0.0)]
    #[case(&[80.0, -80.0], 0.0)]
    fn test_balance_score(#[case] deviations: &[f32], #[case] expected: f32) {
        let entries = deviations
            .iter()
            .map(|deviation| MuscleBalance {
                category: Category::Chest,
                volume: 0.0,
                percentage: 20.0 + deviation,
                ideal_percentage: 20.0,
                deviation: *deviation,
                is_balanced: false,
                priority: BalancePriority::Low,
                ratio: 1.0,
                tier: BalanceTier::Optimal,
                recommendation: String::new(),
            })
            .collect::<Vec<_>>();

        assert_approx_eq!(balance_score(&entries), expected);
    }
}
