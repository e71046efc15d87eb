//! Payroll Invoice Engine
//!
//! This crate turns raw per-shift check-in/check-out records into date-grouped,
//! rate-resolved, overtime-aware invoice totals, and supports operator edits of
//! pay rates and daily hours that keep every downstream sum exact.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
