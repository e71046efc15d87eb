//! Resolved rate types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::RateOverrides;

/// Date-level rate overrides, applied to every shift on the date unless the
/// shift carries its own override.
pub type DateRateOverrides = BTreeMap<NaiveDate, RateOverrides>;

/// Where an effective rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Set on the shift itself.
    Shift,
    /// Set for every shift on the date.
    Date,
    /// The worker's global rate.
    Worker,
    /// Overtime derived from the hourly rate and the overtime multiplier.
    Derived,
    /// Nothing was set anywhere; the rate is zero.
    Missing,
}

/// The effective rates applied to a shift or a date bucket.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{RateSource, ResolvedRates};
/// use rust_decimal::Decimal;
///
/// let rates = ResolvedRates {
///     daily_wages_rate: Decimal::new(160, 0),
///     hourly_rate: Decimal::new(20, 0),
///     overtime_rate: Decimal::new(30, 0),
///     daily_wages_source: RateSource::Worker,
///     hourly_source: RateSource::Worker,
///     overtime_source: RateSource::Derived,
/// };
/// assert!(rates.same_values(&rates));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRates {
    /// Effective daily wage.
    pub daily_wages_rate: Decimal,
    /// Effective hourly rate.
    pub hourly_rate: Decimal,
    /// Effective overtime hourly rate.
    pub overtime_rate: Decimal,
    /// Source of the daily wage.
    pub daily_wages_source: RateSource,
    /// Source of the hourly rate.
    pub hourly_source: RateSource,
    /// Source of the overtime rate.
    pub overtime_source: RateSource,
}

impl ResolvedRates {
    /// All-zero rates, used for empty buckets.
    pub fn zero() -> Self {
        Self {
            daily_wages_rate: Decimal::ZERO,
            hourly_rate: Decimal::ZERO,
            overtime_rate: Decimal::ZERO,
            daily_wages_source: RateSource::Missing,
            hourly_source: RateSource::Missing,
            overtime_source: RateSource::Missing,
        }
    }

    /// Compares the rate values, ignoring where they came from.
    pub fn same_values(&self, other: &ResolvedRates) -> bool {
        self.daily_wages_rate == other.daily_wages_rate
            && self.hourly_rate == other.hourly_rate
            && self.overtime_rate == other.overtime_rate
    }
}
