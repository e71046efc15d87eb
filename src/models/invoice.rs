//! Invoice models: date buckets, totals, breakdown rows and the persistence payload.
//!
//! Everything here is a derived view over a collection of [`ShiftRecord`]s.
//! Nothing holds independent state; all of it is recomputed on every edit.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{AuditTrace, ResolvedRates, ShiftRecord};

/// An inclusive date filter. Absent bounds are unbounded.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
/// let range = DateRange::between(day(2), day(4));
/// assert!(range.contains(day(2)));
/// assert!(range.contains(day(4)));
/// assert!(!range.contains(day(5)));
/// assert!(DateRange::all().contains(day(31)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First included date.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last included date.
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// A range that includes every date.
    pub fn all() -> Self {
        Self::default()
    }

    /// A closed range `[from, to]`.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Returns true if the date falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Returns true if `from` is after `to`, which selects nothing.
    pub fn is_inverted(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }
}

/// All shifts sharing one date, with the daily regular/overtime split and pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket {
    /// The shared date.
    pub date: NaiveDate,
    /// The date's shifts in ingestion order.
    pub shifts: Vec<ShiftRecord>,
    /// Sum of raw system-calculated hours.
    pub total_hours: Decimal,
    /// Sum of effective adjusted hours.
    pub total_adjusted_hours: Decimal,
    /// Adjusted hours up to the daily threshold.
    pub regular_hours: Decimal,
    /// Adjusted hours beyond the daily threshold.
    pub overtime_hours: Decimal,
    /// Rates taken from the representative (first) shift.
    pub rates: ResolvedRates,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Regular plus overtime pay.
    pub total_pay: Decimal,
}

/// Invoice-level totals over a date-filtered set of buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    /// Number of shifts inside the date filter.
    pub total_shifts: usize,
    /// Sum of raw, unadjusted hours (audit trail).
    pub total_hours: Decimal,
    /// Sum of per-date regular hours.
    pub total_regular_hours: Decimal,
    /// Sum of per-date overtime hours.
    pub total_overtime_hours: Decimal,
    /// Sum of per-date regular pay.
    pub total_regular_pay: Decimal,
    /// Sum of per-date overtime pay.
    pub total_overtime_pay: Decimal,
    /// Regular plus overtime pay.
    pub total_pay: Decimal,
}

impl InvoiceTotals {
    /// Adjusted hours paid on the invoice (regular plus overtime).
    pub fn adjusted_hours(&self) -> Decimal {
        self.total_regular_hours
            .checked_add(self.total_overtime_hours)
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns these totals with `bucket` added, or `None` if any sum
    /// (including paid hours and total pay) would overflow.
    pub fn checked_add_bucket(&self, bucket: &DateBucket) -> Option<InvoiceTotals> {
        let total_regular_hours = self.total_regular_hours.checked_add(bucket.regular_hours)?;
        let total_overtime_hours = self.total_overtime_hours.checked_add(bucket.overtime_hours)?;
        let total_regular_pay = self.total_regular_pay.checked_add(bucket.regular_pay)?;
        let total_overtime_pay = self.total_overtime_pay.checked_add(bucket.overtime_pay)?;
        total_regular_hours.checked_add(total_overtime_hours)?;

        Some(InvoiceTotals {
            total_shifts: self.total_shifts + bucket.shifts.len(),
            total_hours: self.total_hours.checked_add(bucket.total_hours)?,
            total_regular_hours,
            total_overtime_hours,
            total_regular_pay,
            total_overtime_pay,
            total_pay: total_regular_pay.checked_add(total_overtime_pay)?,
        })
    }

    /// Returns a copy rounded for presentation.
    ///
    /// Rounding happens only here, never during the computation itself.
    pub fn rounded(&self, money_dp: u32, hours_dp: u32) -> InvoiceTotals {
        InvoiceTotals {
            total_shifts: self.total_shifts,
            total_hours: round_half_up(self.total_hours, hours_dp),
            total_regular_hours: round_half_up(self.total_regular_hours, hours_dp),
            total_overtime_hours: round_half_up(self.total_overtime_hours, hours_dp),
            total_regular_pay: round_half_up(self.total_regular_pay, money_dp),
            total_overtime_pay: round_half_up(self.total_overtime_pay, money_dp),
            total_pay: round_half_up(self.total_pay, money_dp),
        }
    }
}

/// Rounds half away from zero, as money is presented on an invoice.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// A per-shift pay line for document generation and persistence.
///
/// Computed with the per-shift overtime threshold, independently of the
/// daily bucket totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBreakdownRow {
    /// Shift identifier.
    pub shift_id: i64,
    /// Shift date.
    pub date: NaiveDate,
    /// Check-in time of day.
    pub check_in: String,
    /// Check-out time of day.
    pub check_out: String,
    /// Raw system-calculated hours.
    pub total_hours: Decimal,
    /// Effective adjusted hours.
    pub adjusted_hours: Decimal,
    /// Rates resolved for this shift.
    pub rates: ResolvedRates,
    /// Shift hours up to the threshold.
    pub regular_hours: Decimal,
    /// Shift hours beyond the threshold.
    pub overtime_hours: Decimal,
    /// Pay for regular hours.
    pub regular_pay: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Regular plus overtime pay.
    pub total_pay: Decimal,
}

/// The full result of one aggregation pass.
///
/// This is the shape a report renderer iterates over: ordered date groups
/// followed by the flat per-shift rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceComputation {
    /// The worker the invoice is for.
    pub worker_id: String,
    /// Date buckets in ascending date order.
    pub date_groups: Vec<DateBucket>,
    /// Invoice totals, unrounded.
    pub totals: InvoiceTotals,
    /// Per-shift breakdown rows in the same order as the buckets' shifts.
    pub breakdown: Vec<ShiftBreakdownRow>,
    /// Every rule application and warning from this pass.
    pub audit_trace: AuditTrace,
}

/// One breakdown row as stored with a persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadBreakdownEntry {
    /// The computed row.
    #[serde(flatten)]
    pub row: ShiftBreakdownRow,
    /// JSON copy of the source shift for the audit trail.
    pub source_shift: String,
}

/// The invoice as handed to the persistence API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    /// The worker the invoice is for.
    pub worker_id: String,
    /// The worker's global daily wage.
    pub daily_wages_rate: Decimal,
    /// The worker's global hourly rate.
    pub hourly_wages_rate: Decimal,
    /// Comma-joined ids of the included shifts.
    pub shift_ids: String,
    /// Sum of raw hours.
    pub total_hours: Decimal,
    /// Regular plus overtime hours.
    pub adjusted_hours: Decimal,
    /// Invoice total, rounded to money precision.
    pub total_amount: Decimal,
    /// Per-shift rows with their source shifts.
    pub breakdown: Vec<PayloadBreakdownEntry>,
}
