//! Shift models.
//!
//! [`RawShift`] is the loosely-typed record received from the remote data
//! source; [`ShiftRecord`] is its canonical form after normalization, owned by
//! the invoice draft and edited in place by operator adjustments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::lenient;

/// A shift as it arrives from the remote data source.
///
/// Every field is optional and decoded leniently: unreadable values become
/// `None` and are replaced with safe defaults during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShift {
    /// Shift identifier.
    #[serde(default, deserialize_with = "lenient::optional_integer")]
    pub shift_id: Option<i64>,
    /// Explicit calendar date for the shift.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub date: Option<String>,
    /// Full check-in timestamp.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub check_in_timestamp: Option<String>,
    /// Full check-out timestamp.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub check_out_timestamp: Option<String>,
    /// Local check-in time of day.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub check_in: Option<String>,
    /// Local check-out time of day.
    #[serde(default, deserialize_with = "lenient::optional_string")]
    pub check_out: Option<String>,
    /// System-calculated duration in hours.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub total_hours: Option<Decimal>,
    /// Previously adjusted hours, if the shift was already edited.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub adjusted_hours: Option<Decimal>,
    /// Shift-level daily wage override.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub daily_wages_rate: Option<Decimal>,
    /// Shift-level hourly rate override.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub hourly_rate: Option<Decimal>,
    /// Shift-level overtime rate override.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub overtime_rate: Option<Decimal>,
}

/// One of the three rates the engine resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateKind {
    /// The daily wage, which governs regular pay.
    DailyWages,
    /// The hourly rate, the base for derived overtime.
    Hourly,
    /// The overtime hourly rate.
    Overtime,
}

impl RateKind {
    /// The wire name of the field this rate is stored in.
    pub fn field_name(self) -> &'static str {
        match self {
            RateKind::DailyWages => "dailyWagesRate",
            RateKind::Hourly => "hourlyRate",
            RateKind::Overtime => "overtimeRate",
        }
    }
}

/// A set of optional rate overrides.
///
/// Used as the shift-level tier (flattened into [`ShiftRecord`]) and as the
/// date-level tier. `None` means "not overridden here", which is distinct from
/// an explicit zero rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOverrides {
    /// Daily wage override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_wages_rate: Option<Decimal>,
    /// Hourly rate override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Decimal>,
    /// Overtime rate override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overtime_rate: Option<Decimal>,
}

impl RateOverrides {
    /// Returns the override for one rate kind.
    pub fn get(&self, kind: RateKind) -> Option<Decimal> {
        match kind {
            RateKind::DailyWages => self.daily_wages_rate,
            RateKind::Hourly => self.hourly_rate,
            RateKind::Overtime => self.overtime_rate,
        }
    }

    /// Sets or clears the override for one rate kind.
    pub fn set(&mut self, kind: RateKind, value: Option<Decimal>) {
        match kind {
            RateKind::DailyWages => self.daily_wages_rate = value,
            RateKind::Hourly => self.hourly_rate = value,
            RateKind::Overtime => self.overtime_rate = value,
        }
    }

    /// Returns true if no rate is overridden.
    pub fn is_empty(&self) -> bool {
        self.daily_wages_rate.is_none()
            && self.hourly_rate.is_none()
            && self.overtime_rate.is_none()
    }
}

/// A canonical worked shift.
///
/// # Examples
///
/// ```
/// use payroll_engine::models::{RateOverrides, ShiftRecord};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let shift = ShiftRecord {
///     shift_id: 1,
///     date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     check_in: "09:00".to_string(),
///     check_out: "17:30".to_string(),
///     total_hours: Decimal::new(85, 1),
///     adjusted_hours: None,
///     rates: RateOverrides::default(),
/// };
/// assert_eq!(shift.effective_adjusted_hours(), Decimal::new(85, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    /// Identifier, unique within a worker's shift set.
    pub shift_id: i64,
    /// Calendar date the shift belongs to. Fixed at normalization.
    pub date: NaiveDate,
    /// Local check-in time of day, display only.
    #[serde(default)]
    pub check_in: String,
    /// Local check-out time of day, display only.
    #[serde(default)]
    pub check_out: String,
    /// System-calculated duration in hours.
    pub total_hours: Decimal,
    /// Operator-adjusted hours; when absent, `total_hours` applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_hours: Option<Decimal>,
    /// Shift-level rate overrides.
    #[serde(flatten)]
    pub rates: RateOverrides,
}

impl ShiftRecord {
    /// The hours figure that feeds pay calculation.
    pub fn effective_adjusted_hours(&self) -> Decimal {
        self.adjusted_hours.unwrap_or(self.total_hours)
    }

    /// Checks a shift received back from a client before it is edited.
    ///
    /// # Errors
    ///
    /// - `InvalidAdjustment` if total or adjusted hours are negative
    /// - `InvalidRate` if any rate override is negative
    pub fn validate(&self) -> EngineResult<()> {
        let hours = [
            ("totalHours", Some(self.total_hours)),
            ("adjustedHours", self.adjusted_hours),
        ];
        for (field, value) in hours {
            if let Some(negative) = value.filter(|h| *h < Decimal::ZERO) {
                return Err(EngineError::InvalidAdjustment {
                    date: self.date,
                    message: format!(
                        "shift {} has negative {} ({})",
                        self.shift_id, field, negative
                    ),
                });
            }
        }

        for kind in [RateKind::DailyWages, RateKind::Hourly, RateKind::Overtime] {
            if let Some(negative) = self.rates.get(kind).filter(|r| *r < Decimal::ZERO) {
                return Err(EngineError::InvalidRate {
                    field: kind.field_name().to_string(),
                    message: format!(
                        "shift {} rate cannot be negative (got {})",
                        self.shift_id, negative
                    ),
                });
            }
        }

        Ok(())
    }
}
