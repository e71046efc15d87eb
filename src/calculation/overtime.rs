//! Overtime split functionality.
//!
//! Splits worked hours into regular hours (up to the threshold) and overtime
//! hours (the excess). The same split is applied to a whole date in the daily
//! summary and to a single shift in the per-shift breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AuditStep;

/// Standard workday threshold in hours. Fixed; not configurable per worker.
pub const DAILY_OVERTIME_THRESHOLD: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Whether a split covers a whole date or a single shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeScope {
    /// The threshold applies to the sum of a date's adjusted hours.
    Daily,
    /// The threshold applies to one shift's adjusted hours.
    PerShift,
}

/// The result of splitting hours at the overtime threshold.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{split_overtime, OvertimeScope, DAILY_OVERTIME_THRESHOLD};
/// use rust_decimal::Decimal;
///
/// let split = split_overtime(
///     Decimal::new(10, 0),
///     DAILY_OVERTIME_THRESHOLD,
///     OvertimeScope::Daily,
///     1,
/// );
/// assert_eq!(split.regular_hours, Decimal::new(8, 0));
/// assert_eq!(split.overtime_hours, Decimal::new(2, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeSplit {
    /// Hours up to the threshold.
    pub regular_hours: Decimal,
    /// Hours beyond the threshold (never negative).
    pub overtime_hours: Decimal,
    /// The audit step recording this split.
    pub audit_step: AuditStep,
}

/// Splits worked hours into regular and overtime portions.
///
/// `overtime = max(0, hours - threshold)` and `regular = hours - overtime`.
///
/// # Arguments
///
/// * `worked_hours` - Adjusted hours for the date or shift
/// * `threshold` - The overtime threshold, normally [`DAILY_OVERTIME_THRESHOLD`]
/// * `scope` - Whether this is a daily or per-shift split (recorded in the audit)
/// * `step_number` - The step number for audit trail sequencing
pub fn split_overtime(
    worked_hours: Decimal,
    threshold: Decimal,
    scope: OvertimeScope,
    step_number: u32,
) -> OvertimeSplit {
    let overtime_hours = (worked_hours - threshold).max(Decimal::ZERO);
    let regular_hours = worked_hours - overtime_hours;

    let reasoning = if overtime_hours > Decimal::ZERO {
        format!(
            "{} hours exceeds the {} hour threshold by {} hours",
            worked_hours.normalize(),
            threshold.normalize(),
            overtime_hours.normalize()
        )
    } else if worked_hours == threshold {
        format!(
            "{} hours equals the {} hour threshold, no overtime",
            worked_hours.normalize(),
            threshold.normalize()
        )
    } else {
        format!(
            "{} hours is under the {} hour threshold, no overtime",
            worked_hours.normalize(),
            threshold.normalize()
        )
    };

    let (rule_id, rule_name) = match scope {
        OvertimeScope::Daily => ("daily_overtime_split", "Daily Overtime Split"),
        OvertimeScope::PerShift => ("shift_overtime_split", "Per-Shift Overtime Split"),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: serde_json::json!({
            "worked_hours": worked_hours.normalize().to_string(),
            "threshold": threshold.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string()
        }),
        reasoning,
    };

    OvertimeSplit {
        regular_hours,
        overtime_hours,
        audit_step,
    }
}
