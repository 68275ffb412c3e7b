use serde::{Deserialize, Serialize};

use crate::{Category, IdealDistribution, OneRepMaxFormula};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub one_rep_max_formula: OneRepMaxFormula,
    pub ideal_distribution: IdealDistribution,
}

impl Settings {
    /// Parse settings, using the defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self
            .ideal_distribution
            .iter()
            .find(|(_, percentage)| !(0.0..=100.0).contains(percentage))
        {
            Some((category, percentage)) => Err(SettingsError::InvalidIdealPercentage(
                category, percentage,
            )),
            None => Ok(()),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    Parse(String),
    #[error("Ideal percentage of {0} must be in the range 0 to 100 ({1})")]
    InvalidIdealPercentage(Category, f32),
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();

        assert_eq!(settings.one_rep_max_formula, OneRepMaxFormula::Epley);
        assert_eq!(settings.ideal_distribution, IdealDistribution::default());
    }

    #[test]
    fn test_settings_from_json_partial() {
        let settings = Settings::from_json(r#"{"one_rep_max_formula": "brzycki"}"#).unwrap();

        assert_eq!(settings.one_rep_max_formula, OneRepMaxFormula::Brzycki);
        assert_eq!(settings.ideal_distribution, IdealDistribution::default());
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_from_json_custom_distribution() {
        let settings =
            Settings::from_json(r#"{"ideal_distribution": {"Pecho": 50, "Espalda": 50}}"#)
                .unwrap();

        assert_eq!(settings.one_rep_max_formula, OneRepMaxFormula::Epley);
        assert_approx_eq!(settings.ideal_distribution.get(Category::Chest), 50.0);
        assert_approx_eq!(
            settings.ideal_distribution.get(Category::Legs),
            IdealDistribution::FALLBACK_PERCENTAGE
        );
    }

    #[test]
    fn test_settings_from_json_invalid_percentage() {
        assert_eq!(
            Settings::from_json(r#"{"ideal_distribution": {"Core": 120}}"#),
            Err(SettingsError::InvalidIdealPercentage(Category::Core, 120.0))
        );
    }

    #[test]
    fn test_settings_from_json_invalid() {
        assert!(matches!(
            Settings::from_json(r#"{"one_rep_max_formula": "lombardi"}"#),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_json("[1, 2"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = Settings {
            one_rep_max_formula: OneRepMaxFormula::Brzycki,
            ..Settings::default()
        };

        assert_eq!(
            Settings::from_json(&serde_json::to_string(&settings).unwrap()).unwrap(),
            settings
        );
    }
}
