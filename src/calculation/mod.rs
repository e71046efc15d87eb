//! Calculation logic for the Payroll Invoice Engine.
//!
//! This module contains the calculation pipeline: normalizing raw shift
//! records, resolving effective rates, splitting hours at the daily overtime
//! threshold, calculating pay, aggregating shifts into date buckets and
//! invoices, and the operator edits (hour redistribution and date rate
//! overrides) that feed back into recomputation.

mod daily_aggregation;
mod invoice;
mod normalization;
mod overtime;
mod pay;
mod rate_resolution;
mod redistribution;

pub use daily_aggregation::{DailyAggregation, aggregate_date, group_by_date};
pub use invoice::{aggregate_invoice, build_invoice_payload, recompute};
pub use normalization::{
    NormalizedBatch, NormalizedShift, hours_between, normalize_shift, normalize_shifts,
    parse_time_of_day,
};
pub use overtime::{DAILY_OVERTIME_THRESHOLD, OvertimeScope, OvertimeSplit, split_overtime};
pub use pay::{PayResult, ShiftPayResult, calculate_pay, calculate_shift_pay};
pub use rate_resolution::{
    RateOverrideResult, RateResolution, apply_date_rate_override, clear_date_rate_override,
    resolve_rates,
};
pub use redistribution::{RedistributionResult, parse_hours_input, redistribute_hours};
