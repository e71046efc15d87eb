//! Configuration types for the engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Metadata identifying the deployed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Human-readable name of this engine deployment.
    pub name: String,
    /// Version or effective date of the configuration.
    pub version: String,
}

/// Settings that shape every calculation pass.
///
/// # Example
///
/// ```
/// use payroll_engine::config::CalculationSettings;
/// use rust_decimal::Decimal;
///
/// let settings = CalculationSettings::default();
/// assert_eq!(settings.overtime_multiplier, Decimal::new(15, 1));
/// assert_eq!(settings.money_decimal_places, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalculationSettings {
    /// Multiplier on the hourly rate used to derive overtime when neither the
    /// shift, the date nor the worker provides one.
    #[serde(default = "default_overtime_multiplier")]
    pub overtime_multiplier: Decimal,
    /// Date assigned to shifts whose date cannot be determined.
    #[serde(default = "default_fallback_date")]
    pub fallback_date: NaiveDate,
    /// Decimal places for presented money amounts.
    #[serde(default = "default_money_decimal_places")]
    pub money_decimal_places: u32,
    /// Decimal places for presented hour figures.
    #[serde(default = "default_hours_decimal_places")]
    pub hours_decimal_places: u32,
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            overtime_multiplier: default_overtime_multiplier(),
            fallback_date: default_fallback_date(),
            money_decimal_places: default_money_decimal_places(),
            hours_decimal_places: default_hours_decimal_places(),
        }
    }
}

fn default_overtime_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

fn default_fallback_date() -> NaiveDate {
    NaiveDate::default()
}

fn default_money_decimal_places() -> u32 {
    2
}

fn default_hours_decimal_places() -> u32 {
    2
}

/// The complete engine configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Deployment metadata.
    pub engine: EngineMetadata,
    /// Calculation settings.
    #[serde(default)]
    pub calculation: CalculationSettings,
}

impl EngineConfig {
    /// Creates a configuration from its parts.
    pub fn new(engine: EngineMetadata, calculation: CalculationSettings) -> Self {
        Self { engine, calculation }
    }
}
