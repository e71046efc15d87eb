//! Rate resolution functionality.
//!
//! Resolves the effective daily wage, hourly rate and overtime rate for a
//! shift using the precedence shift override → date override → worker rate,
//! and implements the "set rate for this date" operator action.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::CalculationSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, RateKind, RateOverrides, RateSource, ResolvedRates, ShiftRecord,
    WorkerRateProfile,
};

use super::pay::overflow_warning;

/// The result of resolving a shift's rates, including the audit step.
#[derive(Debug, Clone)]
pub struct RateResolution {
    /// The effective rates.
    pub rates: ResolvedRates,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
    /// Warnings raised while resolving.
    pub warnings: Vec<AuditWarning>,
}

/// The result of writing a date-level rate override onto a date's shifts.
#[derive(Debug, Clone)]
pub struct RateOverrideResult {
    /// Number of shifts that received the value.
    pub shifts_updated: usize,
    /// The audit step recording the change.
    pub audit_step: AuditStep,
}

/// Resolves the effective rates for a shift.
///
/// Precedence, highest first:
/// 1. The shift's own override
/// 2. The date-level override for the shift's date
/// 3. The worker's global rate
///
/// Anything still unset resolves to zero rather than failing, so a malformed
/// invoice produces a zero-pay line that can be inspected and corrected. When
/// no overtime rate is set at shift or date level it is derived as the
/// effective hourly rate times the overtime multiplier (the worker's own, else
/// the configured default). A derived rate too large to represent resolves to
/// zero with an `ARITHMETIC_OVERFLOW` warning.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_rates;
/// use payroll_engine::config::CalculationSettings;
/// use payroll_engine::models::{RateOverrides, RateSource, ShiftRecord, WorkerRateProfile};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let shift = ShiftRecord {
///     shift_id: 1,
///     date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     check_in: "09:00".to_string(),
///     check_out: "17:00".to_string(),
///     total_hours: Decimal::new(8, 0),
///     adjusted_hours: None,
///     rates: RateOverrides::default(),
/// };
/// let worker = WorkerRateProfile::new("w-1", Decimal::new(160, 0), Decimal::new(20, 0));
///
/// let result = resolve_rates(&shift, None, &worker, &CalculationSettings::default(), 1);
/// assert_eq!(result.rates.hourly_rate, Decimal::new(20, 0));
/// assert_eq!(result.rates.overtime_rate, Decimal::new(30, 0));
/// assert_eq!(result.rates.overtime_source, RateSource::Derived);
/// ```
pub fn resolve_rates(
    shift: &ShiftRecord,
    date_override: Option<&RateOverrides>,
    worker: &WorkerRateProfile,
    settings: &CalculationSettings,
    step_number: u32,
) -> RateResolution {
    let date_rates = date_override.copied().unwrap_or_default();

    let (daily_wages_rate, daily_wages_source) = pick(
        shift.rates.daily_wages_rate,
        date_rates.daily_wages_rate,
        worker.daily_wages_rate,
    );
    let (hourly_rate, hourly_source) =
        pick(shift.rates.hourly_rate, date_rates.hourly_rate, worker.hourly_rate);

    let multiplier = worker
        .overtime_multiplier
        .filter(|m| *m >= Decimal::ZERO)
        .unwrap_or(settings.overtime_multiplier);

    let mut warnings = Vec::new();
    let (overtime_rate, overtime_source) =
        match (shift.rates.overtime_rate, date_rates.overtime_rate) {
            (Some(rate), _) => (rate, RateSource::Shift),
            (None, Some(rate)) => (rate, RateSource::Date),
            (None, None) if hourly_source == RateSource::Missing => {
                (Decimal::ZERO, RateSource::Missing)
            }
            (None, None) => match hourly_rate.checked_mul(multiplier) {
                Some(rate) => (rate, RateSource::Derived),
                None => {
                    warnings.push(overflow_warning(format_args!(
                        "The overtime rate derived for shift {} on {}",
                        shift.shift_id, shift.date
                    )));
                    (Decimal::ZERO, RateSource::Derived)
                }
            },
        };

    let rates = ResolvedRates {
        daily_wages_rate,
        hourly_rate,
        overtime_rate,
        daily_wages_source,
        hourly_source,
        overtime_source,
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "rate_resolution".to_string(),
        rule_name: "Rate Resolution".to_string(),
        input: serde_json::json!({
            "shift_id": shift.shift_id,
            "date": shift.date.to_string(),
            "shift_rates": overrides_json(&shift.rates),
            "date_rates": overrides_json(&date_rates),
            "worker_rates": {
                "daily_wages_rate": worker.daily_wages_rate.map(|r| r.normalize().to_string()),
                "hourly_rate": worker.hourly_rate.map(|r| r.normalize().to_string()),
            },
            "overtime_multiplier": multiplier.normalize().to_string()
        }),
        output: serde_json::json!({
            "daily_wages_rate": daily_wages_rate.normalize().to_string(),
            "hourly_rate": hourly_rate.normalize().to_string(),
            "overtime_rate": overtime_rate.normalize().to_string(),
            "daily_wages_source": daily_wages_source,
            "hourly_source": hourly_source,
            "overtime_source": overtime_source
        }),
        reasoning: format!(
            "Shift {} on {}: daily wage ${} ({}), hourly ${} ({}), overtime ${} ({})",
            shift.shift_id,
            shift.date,
            daily_wages_rate.normalize(),
            source_label(daily_wages_source),
            hourly_rate.normalize(),
            source_label(hourly_source),
            overtime_rate.normalize(),
            source_label(overtime_source),
        ),
    };

    RateResolution {
        rates,
        audit_step,
        warnings,
    }
}

/// Writes a rate onto every shift on `date`, or clears it when `value` is `None`.
///
/// This is the operator's "set rate for this date" action: after the write,
/// resolution for those shifts is a single shift-level lookup. The collection
/// is only touched once the value has been validated.
///
/// # Errors
///
/// - `InvalidRate` if `value` is negative (no shift is modified)
/// - `DateNotFound` if no shift falls on `date`
pub fn apply_date_rate_override(
    shifts: &mut [ShiftRecord],
    date: NaiveDate,
    kind: RateKind,
    value: Option<Decimal>,
    step_number: u32,
) -> EngineResult<RateOverrideResult> {
    if let Some(rate) = value {
        if rate < Decimal::ZERO {
            return Err(EngineError::InvalidRate {
                field: kind.field_name().to_string(),
                message: format!("rate cannot be negative (got {})", rate),
            });
        }
    }

    let mut previous_values = Vec::new();
    for shift in shifts.iter_mut().filter(|s| s.date == date) {
        previous_values.push(shift.rates.get(kind).map(|r| r.normalize().to_string()));
        shift.rates.set(kind, value);
    }
    let shifts_updated = previous_values.len();

    if shifts_updated == 0 {
        return Err(EngineError::DateNotFound { date });
    }

    tracing::debug!(%date, field = kind.field_name(), shifts_updated, "Applied date rate override");

    let reasoning = match value {
        Some(rate) => format!(
            "Set {} to ${} on all {} shift(s) dated {}",
            kind.field_name(),
            rate.normalize(),
            shifts_updated,
            date
        ),
        None => format!(
            "Cleared {} on all {} shift(s) dated {}",
            kind.field_name(),
            shifts_updated,
            date
        ),
    };

    Ok(RateOverrideResult {
        shifts_updated,
        audit_step: AuditStep {
            step_number,
            rule_id: "date_rate_override".to_string(),
            rule_name: "Date Rate Override".to_string(),
            input: serde_json::json!({
                "date": date.to_string(),
                "field": kind.field_name(),
                "value": value.map(|r| r.normalize().to_string()),
                "previous_values": previous_values
            }),
            output: serde_json::json!({ "shifts_updated": shifts_updated }),
            reasoning,
        },
    })
}

/// Clears a rate on every shift on `date`, so resolution falls through again.
pub fn clear_date_rate_override(
    shifts: &mut [ShiftRecord],
    date: NaiveDate,
    kind: RateKind,
    step_number: u32,
) -> EngineResult<RateOverrideResult> {
    apply_date_rate_override(shifts, date, kind, None, step_number)
}

fn pick(
    shift: Option<Decimal>,
    date: Option<Decimal>,
    worker: Option<Decimal>,
) -> (Decimal, RateSource) {
    shift
        .map(|r| (r, RateSource::Shift))
        .or_else(|| date.map(|r| (r, RateSource::Date)))
        .or_else(|| worker.map(|r| (r, RateSource::Worker)))
        .unwrap_or((Decimal::ZERO, RateSource::Missing))
}

fn overrides_json(rates: &RateOverrides) -> serde_json::Value {
    serde_json::json!({
        "daily_wages_rate": rates.daily_wages_rate.map(|r| r.normalize().to_string()),
        "hourly_rate": rates.hourly_rate.map(|r| r.normalize().to_string()),
        "overtime_rate": rates.overtime_rate.map(|r| r.normalize().to_string()),
    })
}

fn source_label(source: RateSource) -> &'static str {
    match source {
        RateSource::Shift => "shift override",
        RateSource::Date => "date override",
        RateSource::Worker => "worker rate",
        RateSource::Derived => "hourly x multiplier",
        RateSource::Missing => "not set",
    }
}
