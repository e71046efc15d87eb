//! Response types for the Payroll Invoice Engine API.
//!
//! This module defines the success bodies returned by each endpoint and the
//! error response structures shared by all of them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::RedistributionResult;
use crate::error::EngineError;
use crate::models::{AuditStep, InvoiceComputation, InvoiceTotals, ShiftRecord};

/// Response body for `/invoices/calculate`.
///
/// The computation's own fields are inlined; `roundedTotals` is the same
/// totals block rounded for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponse {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the result.
    pub engine_version: String,
    /// The unrounded computation.
    #[serde(flatten)]
    pub computation: InvoiceComputation,
    /// Totals rounded to the configured precision.
    pub rounded_totals: InvoiceTotals,
}

/// Response body for `/invoices/redistribute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributeResponse {
    /// The shifts after the edit.
    pub shifts: Vec<ShiftRecord>,
    /// What changed.
    pub result: RedistributionResult,
}

/// Response body for `/invoices/date-rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRateResponse {
    /// The shifts after the edit.
    pub shifts: Vec<ShiftRecord>,
    /// Number of shifts that were changed.
    pub shifts_updated: usize,
    /// The audit step recording the edit.
    pub audit_step: AuditStep,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::InvalidAdjustment { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_ADJUSTMENT",
                    message,
                    "Target hours must be zero or greater; no shift was changed",
                ),
            },
            EngineError::InvalidHoursInput { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_ADJUSTMENT",
                    message,
                    "Target hours must be a number; no shift was changed",
                ),
            },
            EngineError::InvalidRate { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_RATE",
                    message,
                    "Rates must be zero or greater; no shift was changed",
                ),
            },
            EngineError::DateNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("DATE_NOT_FOUND", message),
            },
            EngineError::SerializationError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "SERIALIZATION_ERROR",
                    "Failed to build invoice payload",
                    message,
                ),
            },
        }
    }
}
