//! Pay calculation.
//!
//! Regular hours are paid from the daily wage, normalized to an implied hourly
//! rate of `daily_wage / 8`; overtime hours are paid at the overtime rate. The
//! hourly rate only matters through the overtime rate derived from it.

use std::fmt::Display;

use rust_decimal::Decimal;

use crate::models::{
    AuditStep, AuditWarning, ResolvedRates, ShiftBreakdownRow, ShiftRecord, WarningSeverity,
};

use super::overtime::{DAILY_OVERTIME_THRESHOLD, OvertimeScope, split_overtime};

/// The result of a pay calculation.
#[derive(Debug, Clone)]
pub struct PayResult {
    /// `(regular_hours / 8) * daily_wage`.
    pub regular_pay: Decimal,
    /// `overtime_hours * overtime_rate`.
    pub overtime_pay: Decimal,
    /// Regular plus overtime pay.
    pub total_pay: Decimal,
    /// True when the amounts did not fit in a `Decimal` and were zeroed.
    pub overflowed: bool,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// The per-shift breakdown row for one shift, with its audit steps.
#[derive(Debug, Clone)]
pub struct ShiftPayResult {
    /// The breakdown row.
    pub row: ShiftBreakdownRow,
    /// Audit steps in order: overtime split, pay calculation.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised while pricing the shift.
    pub warnings: Vec<AuditWarning>,
}

/// Converts a regular/overtime split and rates into pay.
///
/// No rounding is applied; amounts are rounded only for presentation. If any
/// amount overflows, the whole line is zeroed and `overflowed` is set so the
/// caller can flag it.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_pay;
/// use rust_decimal::Decimal;
///
/// let result = calculate_pay(
///     Decimal::new(8, 0),
///     Decimal::new(2, 0),
///     Decimal::new(160, 0),
///     Decimal::new(30, 0),
///     1,
/// );
/// assert_eq!(result.regular_pay, Decimal::new(160, 0));
/// assert_eq!(result.overtime_pay, Decimal::new(60, 0));
/// assert_eq!(result.total_pay, Decimal::new(220, 0));
/// ```
pub fn calculate_pay(
    regular_hours: Decimal,
    overtime_hours: Decimal,
    daily_wages_rate: Decimal,
    overtime_rate: Decimal,
    step_number: u32,
) -> PayResult {
    let amounts = regular_hours
        .checked_mul(daily_wages_rate)
        .and_then(|pay| pay.checked_div(DAILY_OVERTIME_THRESHOLD))
        .zip(overtime_hours.checked_mul(overtime_rate))
        .and_then(|(regular, overtime)| {
            regular.checked_add(overtime).map(|total| (regular, overtime, total))
        });
    let overflowed = amounts.is_none();
    let (regular_pay, overtime_pay, total_pay) =
        amounts.unwrap_or((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));

    let reasoning = if overflowed {
        format!(
            "{}h regular at ${}/8 and {}h overtime at ${} overflow; pay set to $0",
            regular_hours.normalize(),
            daily_wages_rate.normalize(),
            overtime_hours.normalize(),
            overtime_rate.normalize()
        )
    } else {
        format!(
            "{}h regular at ${}/8 per hour = ${}; {}h overtime at ${} = ${}; total ${}",
            regular_hours.normalize(),
            daily_wages_rate.normalize(),
            regular_pay.normalize(),
            overtime_hours.normalize(),
            overtime_rate.normalize(),
            overtime_pay.normalize(),
            total_pay.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "pay_calculation".to_string(),
        rule_name: "Pay Calculation".to_string(),
        input: serde_json::json!({
            "regular_hours": regular_hours.normalize().to_string(),
            "overtime_hours": overtime_hours.normalize().to_string(),
            "daily_wages_rate": daily_wages_rate.normalize().to_string(),
            "overtime_rate": overtime_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular_pay": regular_pay.normalize().to_string(),
            "overtime_pay": overtime_pay.normalize().to_string(),
            "total_pay": total_pay.normalize().to_string(),
            "overflowed": overflowed
        }),
        reasoning,
    };

    PayResult {
        regular_pay,
        overtime_pay,
        total_pay,
        overflowed,
        audit_step,
    }
}

/// Sums decimals, returning `None` on overflow.
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(value))
}

/// The warning recorded when a figure is too large to compute and is zeroed.
pub(crate) fn overflow_warning(subject: impl Display) -> AuditWarning {
    AuditWarning::new(
        "ARITHMETIC_OVERFLOW",
        format!("{} is too large to compute; it has been set to zero", subject),
        WarningSeverity::High,
    )
}

/// Computes the breakdown row for a single shift.
///
/// The overtime threshold is applied to this shift's adjusted hours alone:
/// `regular = min(adjusted, 8)`, `overtime = max(0, adjusted - 8)`. This can
/// disagree with the daily bucket when a date has several shifts; the daily
/// bucket remains the source of invoice totals.
pub fn calculate_shift_pay(
    shift: &ShiftRecord,
    rates: &ResolvedRates,
    step_number: u32,
) -> ShiftPayResult {
    let adjusted_hours = shift.effective_adjusted_hours();

    let split = split_overtime(
        adjusted_hours,
        DAILY_OVERTIME_THRESHOLD,
        OvertimeScope::PerShift,
        step_number,
    );
    let pay = calculate_pay(
        split.regular_hours,
        split.overtime_hours,
        rates.daily_wages_rate,
        rates.overtime_rate,
        step_number + 1,
    );

    let mut warnings = Vec::new();
    if pay.overflowed {
        tracing::debug!(shift_id = shift.shift_id, "Shift pay overflowed");
        warnings.push(overflow_warning(format_args!(
            "Pay for shift {} on {}",
            shift.shift_id, shift.date
        )));
    }

    let row = ShiftBreakdownRow {
        shift_id: shift.shift_id,
        date: shift.date,
        check_in: shift.check_in.clone(),
        check_out: shift.check_out.clone(),
        total_hours: shift.total_hours,
        adjusted_hours,
        rates: *rates,
        regular_hours: split.regular_hours,
        overtime_hours: split.overtime_hours,
        regular_pay: pay.regular_pay,
        overtime_pay: pay.overtime_pay,
        total_pay: pay.total_pay,
    };

    ShiftPayResult {
        row,
        audit_steps: vec![split.audit_step, pay.audit_step],
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RateOverrides, RateSource};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates(daily: &str, overtime: &str) -> ResolvedRates {
        ResolvedRates {
            daily_wages_rate: dec(daily),
            hourly_rate: dec("20"),
            overtime_rate: dec(overtime),
            daily_wages_source: RateSource::Worker,
            hourly_source: RateSource::Worker,
            overtime_source: RateSource::Derived,
        }
    }

    fn make_shift(adjusted: &str) -> ShiftRecord {
        ShiftRecord {
            shift_id: 5,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            check_in: "07:00".to_string(),
            check_out: "19:00".to_string(),
            total_hours: dec("12"),
            adjusted_hours: Some(dec(adjusted)),
            rates: RateOverrides::default(),
        }
    }

    #[test]
    fn test_regular_pay_uses_daily_wage_over_eight() {
        let result = calculate_pay(dec("6"), Decimal::ZERO, dec("160"), dec("30"), 1);
        assert_eq!(result.regular_pay, dec("120"));
        assert_eq!(result.overtime_pay, Decimal::ZERO);
        assert_eq!(result.total_pay, dec("120"));
    }

    #[test]
    fn test_overtime_pay() {
        let result = calculate_pay(dec("8"), dec("2"), dec("160"), dec("30"), 1);
        assert_eq!(result.regular_pay, dec("160"));
        assert_eq!(result.overtime_pay, dec("60"));
        assert_eq!(result.total_pay, dec("220"));
    }

    #[test]
    fn test_no_intermediate_rounding() {
        let result =
            calculate_pay(dec("7.3333333333"), Decimal::ZERO, dec("100"), Decimal::ZERO, 1);
        assert_eq!(result.regular_pay, dec("91.66666666625"));
    }

    #[test]
    fn test_overflowing_pay_is_zeroed() {
        let result = calculate_pay(dec("8"), dec("2"), Decimal::MAX, dec("30"), 1);

        assert!(result.overflowed);
        assert_eq!(result.regular_pay, Decimal::ZERO);
        assert_eq!(result.overtime_pay, Decimal::ZERO);
        assert_eq!(result.total_pay, Decimal::ZERO);
        assert_eq!(result.audit_step.output["overflowed"], true);
    }

    #[test]
    fn test_overflowing_total_is_zeroed() {
        let result = calculate_pay(dec("1"), dec("1"), Decimal::MAX, Decimal::MAX, 1);

        assert!(result.overflowed);
        assert_eq!(result.total_pay, Decimal::ZERO);
    }

    #[test]
    fn test_shift_pay_overflow_raises_warning() {
        let result = calculate_shift_pay(&make_shift("10"), &rates("160", "30"), 1);
        assert!(result.warnings.is_empty());

        let huge = ResolvedRates {
            daily_wages_rate: Decimal::MAX,
            ..rates("160", "30")
        };
        let result = calculate_shift_pay(&make_shift("10"), &huge, 1);

        assert_eq!(result.row.total_pay, Decimal::ZERO);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "ARITHMETIC_OVERFLOW");
        assert_eq!(result.warnings[0].severity, WarningSeverity::High);
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum([dec("1.5"), dec("2")]), Some(dec("3.5")));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
        assert_eq!(checked_sum(Vec::new()), Some(Decimal::ZERO));
    }

    #[test]
    fn test_zero_rates_give_zero_pay() {
        let result = calculate_pay(dec("8"), dec("2"), Decimal::ZERO, Decimal::ZERO, 1);
        assert_eq!(result.total_pay, Decimal::ZERO);
    }

    #[test]
    fn test_pay_audit_step() {
        let result = calculate_pay(dec("8"), dec("2"), dec("160"), dec("30"), 6);
        assert_eq!(result.audit_step.step_number, 6);
        assert_eq!(result.audit_step.rule_id, "pay_calculation");
        assert_eq!(result.audit_step.output["total_pay"].as_str().unwrap(), "220");
    }

    #[test]
    fn test_shift_pay_applies_threshold_per_shift() {
        let result = calculate_shift_pay(&make_shift("10"), &rates("160", "30"), 1);

        assert_eq!(result.row.adjusted_hours, dec("10"));
        assert_eq!(result.row.total_hours, dec("12"));
        assert_eq!(result.row.regular_hours, dec("8"));
        assert_eq!(result.row.overtime_hours, dec("2"));
        assert_eq!(result.row.regular_pay, dec("160"));
        assert_eq!(result.row.overtime_pay, dec("60"));
        assert_eq!(result.row.total_pay, dec("220"));
        assert_eq!(result.audit_steps.len(), 2);
        assert_eq!(result.audit_steps[0].rule_id, "shift_overtime_split");
        assert_eq!(result.audit_steps[1].step_number, 2);
    }

    #[test]
    fn test_short_shift_has_no_overtime() {
        let result = calculate_shift_pay(&make_shift("5"), &rates("160", "30"), 1);
        assert_eq!(result.row.regular_hours, dec("5"));
        assert_eq!(result.row.overtime_hours, Decimal::ZERO);
        assert_eq!(result.row.total_pay, dec("100"));
    }
}
