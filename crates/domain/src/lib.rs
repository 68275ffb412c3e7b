#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod logger;
pub mod statistics;
pub mod temporal;

mod balance;
mod calendar;
mod category;
mod error;
mod exercise;
mod fatigue;
mod import;
mod progress;
mod record;
mod report;
mod routine;
mod service;
mod settings;
mod strength;
mod weekday;

pub use balance::*;
pub use calendar::*;
pub use category::*;
pub use error::*;
pub use exercise::*;
pub use fatigue::*;
pub use import::*;
pub use progress::*;
pub use record::*;
pub use report::*;
pub use routine::*;
pub use service::*;
pub use settings::*;
pub use strength::*;
pub use weekday::*;

#[cfg(test)]
mod tests {
    pub mod data;
}
