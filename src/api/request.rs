//! Request types for the Payroll Invoice Engine API.
//!
//! Invoice requests carry raw shifts straight from the check-in system and are
//! normalized before aggregation. Edit requests carry shifts the engine has
//! already normalized and returned.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{NormalizedBatch, normalize_shifts, parse_hours_input};
use crate::config::CalculationSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    DateRange, DateRateOverrides, RateKind, RawShift, ShiftRecord, WorkerRateProfile,
};

/// Request body for `/invoices/calculate` and `/invoices/payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    /// The worker's global rates.
    pub worker: WorkerRateProfile,
    /// Raw shift records.
    pub shifts: Vec<RawShift>,
    /// Date-level rate overrides keyed by date.
    #[serde(default)]
    pub date_overrides: DateRateOverrides,
    /// Optional inclusive date filter.
    #[serde(default)]
    pub range: DateRange,
}

impl InvoiceRequest {
    /// Normalizes the raw shifts into engine records.
    pub fn normalize(&self, settings: &CalculationSettings) -> NormalizedBatch {
        normalize_shifts(&self.shifts, settings)
    }
}

/// Request body for `/invoices/redistribute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributeRequest {
    /// The invoice's shifts.
    pub shifts: Vec<ShiftRecord>,
    /// The date whose total is being edited.
    pub date: NaiveDate,
    /// The new total, as a number or as operator-entered text.
    pub target_hours: serde_json::Value,
}

impl RedistributeRequest {
    /// Parses `target_hours` into a decimal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHoursInput` when the value is neither a number nor
    /// numeric text.
    pub fn target(&self) -> EngineResult<Decimal> {
        match &self.target_hours {
            serde_json::Value::Number(n) => parse_hours_input(&n.to_string()),
            serde_json::Value::String(s) => parse_hours_input(s),
            other => Err(EngineError::InvalidHoursInput {
                input: other.to_string(),
            }),
        }
    }
}

/// Request body for `/invoices/date-rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRateRequest {
    /// The invoice's shifts.
    pub shifts: Vec<ShiftRecord>,
    /// The date to set the rate on.
    pub date: NaiveDate,
    /// Which rate to set.
    pub kind: RateKind,
    /// The new rate; `null` or absent clears it.
    #[serde(default)]
    pub value: Option<Decimal>,
}
