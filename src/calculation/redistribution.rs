//! Hour redistribution.
//!
//! When the operator edits a date's total hours, the new total is spread over
//! the date's shifts in proportion to their current adjusted hours. The last
//! shift in ingestion order absorbs the remainder so the shifts sum exactly to
//! the target.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::lenient::parse_decimal;
use crate::models::{AuditStep, ShiftRecord};

use super::pay::checked_sum;

/// The outcome of a redistribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionResult {
    /// The edited date.
    pub date: NaiveDate,
    /// Sum of adjusted hours before the edit.
    pub previous_total: Decimal,
    /// Sum of adjusted hours after the edit.
    pub new_total: Decimal,
    /// `target / previous_total`, or 1 when the previous total was zero.
    pub ratio: Decimal,
    /// Number of shifts on the date.
    pub shifts_updated: usize,
    /// The audit step recording the edit.
    pub audit_step: AuditStep,
}

/// Parses operator-entered hours text.
///
/// # Errors
///
/// Returns `InvalidHoursInput` if the text is not a number.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::parse_hours_input;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_hours_input(" 7.5 ").unwrap(), Decimal::new(75, 1));
/// assert!(parse_hours_input("seven").is_err());
/// ```
pub fn parse_hours_input(input: &str) -> EngineResult<Decimal> {
    parse_decimal(input).ok_or_else(|| EngineError::InvalidHoursInput {
        input: input.to_string(),
    })
}

/// Sets the total adjusted hours for `date`, scaling each shift proportionally.
///
/// Every shift except the last gets `old * ratio`; the last gets
/// `target - sum(others)`, clamped at zero. When the date's current total is
/// zero there is nothing to scale against, so every shift keeps its value.
///
/// New values are computed first and written back only once all of them are
/// known, so a rejected edit leaves `shifts` untouched.
///
/// # Errors
///
/// - `InvalidAdjustment` if `target` is negative or the arithmetic overflows
/// - `DateNotFound` if no shift falls on `date`
pub fn redistribute_hours(
    shifts: &mut [ShiftRecord],
    date: NaiveDate,
    target: Decimal,
    step_number: u32,
) -> EngineResult<RedistributionResult> {
    if target < Decimal::ZERO {
        return Err(EngineError::InvalidAdjustment {
            date,
            message: format!("target hours cannot be negative (got {})", target),
        });
    }

    let indices: Vec<usize> = shifts
        .iter()
        .enumerate()
        .filter(|(_, s)| s.date == date)
        .map(|(i, _)| i)
        .collect();

    let Some((&last, others)) = indices.split_last() else {
        return Err(EngineError::DateNotFound { date });
    };

    let overflow = || EngineError::InvalidAdjustment {
        date,
        message: format!("hours or target {} are out of range", target),
    };

    let previous: Vec<Decimal> = indices
        .iter()
        .map(|&i| shifts[i].effective_adjusted_hours())
        .collect();
    let previous_total = checked_sum(previous.iter().copied()).ok_or_else(overflow)?;

    let (ratio, new_values) = if previous_total.is_zero() {
        (Decimal::ONE, previous.clone())
    } else {
        let ratio = target.checked_div(previous_total).ok_or_else(overflow)?;

        let mut scaled = Vec::with_capacity(indices.len());
        for &i in others {
            let value = shifts[i]
                .effective_adjusted_hours()
                .checked_mul(ratio)
                .ok_or_else(overflow)?;
            scaled.push(value);
        }

        let assigned = checked_sum(scaled.iter().copied()).ok_or_else(overflow)?;
        scaled.push((target - assigned).max(Decimal::ZERO));
        (ratio, scaled)
    };
    let new_total = checked_sum(new_values.iter().copied()).ok_or_else(overflow)?;

    for (&i, value) in indices.iter().zip(&new_values) {
        shifts[i].adjusted_hours = Some(*value);
    }

    tracing::debug!(
        %date,
        previous_total = %previous_total,
        new_total = %new_total,
        shifts = indices.len(),
        "Redistributed hours"
    );

    let reasoning = if previous_total.is_zero() {
        format!(
            "Shifts on {} have no hours to scale; target {}h left all {} shift(s) unchanged",
            date,
            target.normalize(),
            indices.len()
        )
    } else {
        format!(
            "Scaled {} shift(s) on {} from {}h to {}h (ratio {}); shift {} took the remainder",
            indices.len(),
            date,
            previous_total.normalize(),
            target.normalize(),
            ratio.normalize(),
            shifts[last].shift_id
        )
    };

    Ok(RedistributionResult {
        date,
        previous_total,
        new_total,
        ratio,
        shifts_updated: indices.len(),
        audit_step: AuditStep {
            step_number,
            rule_id: "hours_redistribution".to_string(),
            rule_name: "Hours Redistribution".to_string(),
            input: serde_json::json!({
                "date": date.to_string(),
                "target_hours": target.normalize().to_string(),
                "previous_hours": hours_json(&previous)
            }),
            output: serde_json::json!({
                "ratio": ratio.normalize().to_string(),
                "new_hours": hours_json(&new_values),
                "new_total": new_total.normalize().to_string()
            }),
            reasoning,
        },
    })
}

fn hours_json(hours: &[Decimal]) -> Vec<String> {
    hours.iter().map(|h| h.normalize().to_string()).collect()
}
