//! Worker rate profile.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;

/// A worker's global fallback rates.
///
/// Passed explicitly into every aggregation call; the engine holds no
/// ambient worker state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRateProfile {
    /// Identifier of the worker the invoice is for.
    #[serde(default, deserialize_with = "lenient::string")]
    pub worker_id: String,
    /// Global daily wage.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub daily_wages_rate: Option<Decimal>,
    /// Global hourly rate.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub hourly_rate: Option<Decimal>,
    /// Multiplier applied to the hourly rate to derive overtime when no
    /// overtime rate is set. Falls back to the configured default.
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub overtime_multiplier: Option<Decimal>,
}

impl WorkerRateProfile {
    /// Creates a profile with the two global rates set.
    pub fn new(
        worker_id: impl Into<String>,
        daily_wages_rate: Decimal,
        hourly_rate: Decimal,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            daily_wages_rate: Some(daily_wages_rate),
            hourly_rate: Some(hourly_rate),
            overtime_multiplier: None,
        }
    }
}
