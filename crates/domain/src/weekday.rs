use std::slice::Iter;

use chrono::Weekday;

use crate::Property;

impl Property for Weekday {
    /// Iterate over all weekdays, starting on Monday.
    fn iter() -> Iter<'static, Weekday> {
        static WEEKDAYS: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        WEEKDAYS.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Weekday::Mon => "lunes",
            Weekday::Tue => "martes",
            Weekday::Wed => "miércoles",
            Weekday::Thu => "jueves",
            Weekday::Fri => "viernes",
            Weekday::Sat => "sábado",
            Weekday::Sun => "domingo",
        }
    }
}

#[must_use]
pub fn weekday_name(weekday: Weekday) -> &'static str {
    weekday.name()
}

pub fn parse_weekday(value: &str) -> Result<Weekday, WeekdayError> {
    let value = value.trim().to_lowercase();
    Weekday::iter()
        .find(|d| d.name() == value)
        .copied()
        .ok_or(WeekdayError::Unknown(value))
}

/// Weekday name with a leading capital letter.
#[must_use]
pub fn capitalized_weekday_name(weekday: Weekday) -> String {
    let name = weekday.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeekdayError {
    #[error("Unknown day of week \"{0}\"")]
    Unknown(String),
}
