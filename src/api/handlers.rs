//! HTTP request handlers for the Payroll Invoice Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    aggregate_invoice, apply_date_rate_override, build_invoice_payload, redistribute_hours,
};
use crate::config::CalculationSettings;
use crate::error::EngineError;
use crate::models::{InvoiceComputation, ShiftRecord};

use super::request::{DateRateRequest, InvoiceRequest, RedistributeRequest};
use super::response::{
    ApiError, ApiErrorResponse, CalculationResponse, DateRateResponse, RedistributeResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/invoices/calculate", post(calculate_handler))
        .route("/invoices/payload", post(payload_handler))
        .route("/invoices/redistribute", post(redistribute_handler))
        .route("/invoices/date-rate", post(date_rate_handler))
        .with_state(state)
}

/// Handler for POST /invoices/calculate.
///
/// Normalizes the raw shifts and returns the full invoice computation.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<InvoiceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing invoice calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let settings = state.config().settings();
    let computation = compute_invoice(&request, settings);

    info!(
        correlation_id = %correlation_id,
        worker_id = %computation.worker_id,
        shifts_count = computation.totals.total_shifts,
        total_pay = %computation.totals.total_pay,
        warnings = computation.audit_trace.warnings.len(),
        duration_us = computation.audit_trace.duration_us,
        "Invoice calculation completed"
    );

    let rounded_totals = computation
        .totals
        .rounded(settings.money_decimal_places, settings.hours_decimal_places);

    json_response(
        StatusCode::OK,
        &CalculationResponse {
            calculation_id: correlation_id,
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            computation,
            rounded_totals,
        },
    )
}

/// Handler for POST /invoices/payload.
///
/// Computes the invoice and returns it in the shape the persistence API takes.
async fn payload_handler(
    State(state): State<AppState>,
    payload: Result<Json<InvoiceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing invoice payload request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let settings = state.config().settings();
    let computation = compute_invoice(&request, settings);

    match build_invoice_payload(&computation, &request.worker, settings) {
        Ok(invoice) => {
            info!(
                correlation_id = %correlation_id,
                worker_id = %invoice.worker_id,
                shifts_count = invoice.breakdown.len(),
                total_amount = %invoice.total_amount,
                "Invoice payload built"
            );
            json_response(StatusCode::OK, &invoice)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /invoices/redistribute.
///
/// Sets a date's total adjusted hours and returns the updated shifts.
async fn redistribute_handler(
    payload: Result<Json<RedistributeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing hours redistribution request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let target = match request.target() {
        Ok(target) => target,
        Err(err) => return engine_error_response(correlation_id, err),
    };
    if let Err(err) = request.shifts.iter().try_for_each(ShiftRecord::validate) {
        return engine_error_response(correlation_id, err);
    }

    let RedistributeRequest { mut shifts, date, .. } = request;
    match redistribute_hours(&mut shifts, date, target, 1) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                %date,
                previous_total = %result.previous_total,
                new_total = %result.new_total,
                shifts_updated = result.shifts_updated,
                "Hours redistributed"
            );
            json_response(StatusCode::OK, &RedistributeResponse { shifts, result })
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /invoices/date-rate.
///
/// Sets or clears one rate on every shift of a date.
async fn date_rate_handler(payload: Result<Json<DateRateRequest>, JsonRejection>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing date rate request");

    let DateRateRequest {
        mut shifts,
        date,
        kind,
        value,
    } = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    if let Err(err) = shifts.iter().try_for_each(ShiftRecord::validate) {
        return engine_error_response(correlation_id, err);
    }

    match apply_date_rate_override(&mut shifts, date, kind, value, 1) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                %date,
                field = kind.field_name(),
                shifts_updated = result.shifts_updated,
                "Date rate applied"
            );
            json_response(
                StatusCode::OK,
                &DateRateResponse {
                    shifts,
                    shifts_updated: result.shifts_updated,
                    audit_step: result.audit_step,
                },
            )
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Normalizes and aggregates an invoice request.
///
/// Normalization warnings lead the audit trace, ahead of aggregation warnings.
fn compute_invoice(
    request: &InvoiceRequest,
    settings: &CalculationSettings,
) -> InvoiceComputation {
    let batch = request.normalize(settings);
    let mut computation = aggregate_invoice(
        &request.worker,
        &batch.shifts,
        &request.date_overrides,
        &request.range,
        settings,
    );

    let mut warnings = batch.warnings;
    warnings.append(&mut computation.audit_trace.warnings);
    computation.audit_trace.warnings = warnings;
    computation
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "Request rejected");
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}
