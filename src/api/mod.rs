//! HTTP API module for the Payroll Invoice Engine.
//!
//! This module provides the REST endpoints for computing invoices, building
//! persistence payloads, and applying operator edits to a shift set.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DateRateRequest, InvoiceRequest, RedistributeRequest};
pub use response::{ApiError, CalculationResponse, DateRateResponse, RedistributeResponse};
pub use state::AppState;
