use std::{collections::BTreeMap, fmt, slice::Iter};

use derive_more::{AsRef, Deref, Display};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait Property: Sized + 'static {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub description: Option<String>,
    pub url: Option<String>,
    categories: Vec<Category>,
    category_percentages: Option<CategoryPercentages>,
}

impl Exercise {
    /// Create an exercise.
    ///
    /// Duplicate categories are removed, keeping the order in which they first appear. The
    /// percentages, if given, must only refer to categories of the exercise.
    pub fn new(
        id: ExerciseID,
        name: Name,
        categories: Vec<Category>,
        category_percentages: Option<CategoryPercentages>,
    ) -> Result<Self, ExerciseError> {
        let mut unique_categories: Vec<Category> = Vec::with_capacity(categories.len());
        for category in categories {
            if !unique_categories.contains(&category) {
                unique_categories.push(category);
            }
        }

        if unique_categories.is_empty() {
            return Err(ExerciseError::NoCategories);
        }

        if let Some(percentages) = &category_percentages {
            if let Some(category) = percentages
                .categories()
                .find(|c| !unique_categories.contains(c))
            {
                return Err(ExerciseError::UnknownCategory(category));
            }
        }

        Ok(Self {
            id,
            name,
            description: None,
            url: None,
            categories: unique_categories,
            category_percentages,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn primary_category(&self) -> Category {
        self.categories[0]
    }

    #[must_use]
    pub fn category_percentages(&self) -> Option<&CategoryPercentages> {
        self.category_percentages.as_ref()
    }

    /// Fraction of a record's volume attributed to each category.
    ///
    /// Exercises spanning several categories split their volume according to the category
    /// percentages. Without percentages, the full volume is attributed to every category.
    #[must_use]
    pub fn category_shares(&self) -> Vec<(Category, f32)> {
        match &self.category_percentages {
            Some(percentages) if self.categories.len() > 1 => self
                .categories
                .iter()
                .map(|c| (*c, percentages.get(*c) / 100.0))
                .collect(),
            _ => self.categories.iter().map(|c| (*c, 1.0)).collect(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseError {
    #[error("Exercise must belong to at least one category")]
    NoCategories,
    #[error("Category percentages refer to {0}, which is not a category of the exercise")]
    UnknownCategory(Category),
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(Uuid);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for ExerciseID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub const MAX_LENGTH: usize = 100;

    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > Self::MAX_LENGTH {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }
}

impl TryFrom<&str> for Name {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Name::new(value)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 100 characters or fewer ({0} > 100)")]
    TooLong(usize),
}

#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    #[serde(rename = "Pecho")]
    Chest,
    #[serde(rename = "Espalda")]
    Back,
    #[serde(rename = "Piernas")]
    Legs,
    #[serde(rename = "Hombros")]
    Shoulders,
    #[serde(rename = "Brazos")]
    Arms,
    #[serde(rename = "Core")]
    Core,
}

impl Property for Category {
    fn iter() -> Iter<'static, Category> {
        static CATEGORIES: [Category; 6] = [
            Category::Chest,
            Category::Back,
            Category::Legs,
            Category::Shoulders,
            Category::Arms,
            Category::Core,
        ];
        CATEGORIES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Category::Chest => "Pecho",
            Category::Back => "Espalda",
            Category::Legs => "Piernas",
            Category::Shoulders => "Hombros",
            Category::Arms => "Brazos",
            Category::Core => "Core",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for Category {
    type Error = CategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        Category::iter()
            .find(|c| c.name().eq_ignore_ascii_case(value))
            .copied()
            .ok_or_else(|| CategoryError::Unknown(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CategoryError {
    #[error("Unknown category \"{0}\"")]
    Unknown(String),
}

/// Split of an exercise's effort across its categories, in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPercentages(BTreeMap<Category, f32>);

impl CategoryPercentages {
    pub const SUM_TOLERANCE: f32 = 0.01;

    pub fn new(percentages: BTreeMap<Category, f32>) -> Result<Self, CategoryPercentagesError> {
        if percentages.is_empty() {
            return Err(CategoryPercentagesError::Empty);
        }

        if let Some((category, value)) = percentages
            .iter()
            .find(|(_, v)| !(0.0..=100.0).contains(*v))
        {
            return Err(CategoryPercentagesError::OutOfRange(*category, *value));
        }

        let sum = percentages.values().sum::<f32>();

        if (sum - 100.0).abs() > Self::SUM_TOLERANCE {
            return Err(CategoryPercentagesError::InvalidSum(sum));
        }

        Ok(Self(percentages))
    }

    #[must_use]
    pub fn get(&self, category: Category) -> f32 {
        self.0.get(&category).copied().unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.keys().copied()
    }
}

impl<const N: usize> TryFrom<[(Category, f32); N]> for CategoryPercentages {
    type Error = CategoryPercentagesError;

    fn try_from(value: [(Category, f32); N]) -> Result<Self, Self::Error> {
        CategoryPercentages::new(value.into_iter().collect())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CategoryPercentagesError {
    #[error("Category percentages must not be empty")]
    Empty,
    #[error("Percentage of {0} must be in the range 0 to 100 ({1})")]
    OutOfRange(Category, f32),
    #[error("Category percentages must sum to 100 ({0})")]
    InvalidSum(f32),
}
