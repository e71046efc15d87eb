//! Core data models for the Payroll Invoice Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod invoice;
pub(crate) mod lenient;
mod rates;
mod shift;
mod worker;

pub use audit::{AuditStep, AuditTrace, AuditWarning, WarningSeverity};
pub use invoice::{
    DateBucket, DateRange, InvoiceComputation, InvoicePayload, InvoiceTotals,
    PayloadBreakdownEntry, ShiftBreakdownRow, round_half_up,
};
pub use rates::{DateRateOverrides, RateSource, ResolvedRates};
pub use shift::{RateKind, RateOverrides, RawShift, ShiftRecord};
pub use worker::WorkerRateProfile;
