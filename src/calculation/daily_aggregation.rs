//! Daily aggregation.
//!
//! Groups shifts by calendar date and computes, per date, the regular/overtime
//! split and pay from the sum of the date's adjusted hours.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::CalculationSettings;
use crate::models::{
    AuditStep, AuditWarning, DateBucket, DateRange, RateOverrides, ResolvedRates, ShiftRecord,
    WarningSeverity, WorkerRateProfile,
};

use super::overtime::{DAILY_OVERTIME_THRESHOLD, OvertimeScope, split_overtime};
use super::pay::{calculate_pay, checked_sum, overflow_warning};
use super::rate_resolution::resolve_rates;

/// One date's bucket together with the audit entries produced while building it.
#[derive(Debug, Clone)]
pub struct DailyAggregation {
    /// The computed bucket.
    pub bucket: DateBucket,
    /// Audit steps in order: rate resolution, overtime split, pay.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised for this date.
    pub warnings: Vec<AuditWarning>,
}

/// Groups shifts inside `range` by date.
///
/// Dates come out in ascending order; shifts within a date keep their
/// ingestion order.
pub fn group_by_date(
    shifts: &[ShiftRecord],
    range: &DateRange,
) -> BTreeMap<NaiveDate, Vec<ShiftRecord>> {
    let mut groups: BTreeMap<NaiveDate, Vec<ShiftRecord>> = BTreeMap::new();
    for shift in shifts.iter().filter(|s| range.contains(s.date)) {
        groups.entry(shift.date).or_default().push(shift.clone());
    }
    groups
}

/// Builds the bucket for one date.
///
/// Rates come from the first shift on the date. The threshold is applied to
/// the summed adjusted hours, so two 5 hour shifts on one date produce 2 hours
/// of overtime even though neither shift exceeds 8 hours on its own. Hour sums
/// or pay too large to represent are zeroed with an `ARITHMETIC_OVERFLOW`
/// warning.
///
/// # Arguments
///
/// * `date` - The bucket date
/// * `shifts` - The date's shifts in ingestion order
/// * `date_override` - Date-level rate overrides for `date`, if any
/// * `worker` - The worker's global rates
/// * `settings` - Calculation settings (overtime multiplier)
/// * `step_number` - The first step number for audit trail sequencing
pub fn aggregate_date(
    date: NaiveDate,
    shifts: &[ShiftRecord],
    date_override: Option<&RateOverrides>,
    worker: &WorkerRateProfile,
    settings: &CalculationSettings,
    step_number: u32,
) -> DailyAggregation {
    let mut audit_steps = Vec::new();
    let mut warnings = Vec::new();

    let total_hours = checked_sum(shifts.iter().map(|s| s.total_hours)).unwrap_or_else(|| {
        warnings.push(overflow_warning(format_args!("Total hours on {}", date)));
        Decimal::ZERO
    });
    let total_adjusted_hours = checked_sum(shifts.iter().map(ShiftRecord::effective_adjusted_hours))
        .unwrap_or_else(|| {
            warnings.push(overflow_warning(format_args!("Adjusted hours on {}", date)));
            Decimal::ZERO
        });

    let rates = match shifts.first() {
        Some(representative) => {
            let resolution =
                resolve_rates(representative, date_override, worker, settings, step_number);
            audit_steps.push(resolution.audit_step);
            warnings.extend(resolution.warnings);

            let mixed: Vec<i64> = shifts[1..]
                .iter()
                .filter(|other| {
                    let other_rates = resolve_rates(other, date_override, worker, settings, 0);
                    !other_rates.rates.same_values(&resolution.rates)
                })
                .map(|other| other.shift_id)
                .collect();
            if !mixed.is_empty() {
                warnings.push(AuditWarning::new(
                    "MIXED_RATES_ON_DATE",
                    format!(
                        concat!(
                            "Shifts {:?} on {} resolve to different rates than shift {}; ",
                            "the daily total uses shift {}'s rates"
                        ),
                        mixed, date, representative.shift_id, representative.shift_id
                    ),
                    WarningSeverity::Medium,
                ));
            }

            resolution.rates
        }
        None => ResolvedRates::zero(),
    };

    let split = split_overtime(
        total_adjusted_hours,
        DAILY_OVERTIME_THRESHOLD,
        OvertimeScope::Daily,
        step_number + audit_steps.len() as u32,
    );
    audit_steps.push(split.audit_step);

    let pay = calculate_pay(
        split.regular_hours,
        split.overtime_hours,
        rates.daily_wages_rate,
        rates.overtime_rate,
        step_number + audit_steps.len() as u32,
    );
    audit_steps.push(pay.audit_step);

    if pay.overflowed {
        tracing::debug!(%date, "Daily pay overflowed");
        warnings.push(overflow_warning(format_args!("Pay on {}", date)));
    }

    let unpaid_regular = split.regular_hours > Decimal::ZERO && rates.daily_wages_rate.is_zero();
    let unpaid_overtime = split.overtime_hours > Decimal::ZERO && rates.overtime_rate.is_zero();
    if unpaid_regular || unpaid_overtime {
        tracing::debug!(%date, "Hours worked with a zero rate");
        warnings.push(AuditWarning::new(
            "ZERO_RATE",
            format!(
                "Hours on {} are paid at a zero rate; check the worker and override rates",
                date
            ),
            WarningSeverity::High,
        ));
    }

    DailyAggregation {
        bucket: DateBucket {
            date,
            shifts: shifts.to_vec(),
            total_hours,
            total_adjusted_hours,
            regular_hours: split.regular_hours,
            overtime_hours: split.overtime_hours,
            rates,
            regular_pay: pay.regular_pay,
            overtime_pay: pay.overtime_pay,
            total_pay: pay.total_pay,
        },
        audit_steps,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn make_shift(id: i64, date: NaiveDate, hours: &str) -> ShiftRecord {
        ShiftRecord {
            shift_id: id,
            date,
            check_in: "09:00".to_string(),
            check_out: "14:00".to_string(),
            total_hours: dec(hours),
            adjusted_hours: Some(dec(hours)),
            rates: RateOverrides::default(),
        }
    }

    fn worker() -> WorkerRateProfile {
        WorkerRateProfile::new("w-1", dec("160"), dec("20"))
    }

    fn settings() -> CalculationSettings {
        CalculationSettings::default()
    }

    #[test]
    fn test_group_by_date_orders_dates_and_keeps_shift_order() {
        let shifts = vec![
            make_shift(1, day(4), "5"),
            make_shift(2, day(2), "5"),
            make_shift(3, day(4), "3"),
        ];

        let groups = group_by_date(&shifts, &DateRange::all());
        let dates: Vec<NaiveDate> = groups.keys().copied().collect();
        assert_eq!(dates, vec![day(2), day(4)]);

        let ids: Vec<i64> = groups[&day(4)].iter().map(|s| s.shift_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_group_by_date_applies_range() {
        let shifts = vec![make_shift(1, day(2), "5"), make_shift(2, day(3), "5")];
        let groups = group_by_date(&shifts, &DateRange::between(day(3), day(3)));
        assert_eq!(groups.len(), 1);
        assert!(groups.contains_key(&day(3)));
    }

    #[test]
    fn test_two_five_hour_shifts_produce_daily_overtime() {
        let shifts = vec![make_shift(1, day(2), "5"), make_shift(2, day(2), "5")];
        let result = aggregate_date(day(2), &shifts, None, &worker(), &settings(), 1);

        assert_eq!(result.bucket.total_adjusted_hours, dec("10"));
        assert_eq!(result.bucket.regular_hours, dec("8"));
        assert_eq!(result.bucket.overtime_hours, dec("2"));
        assert_eq!(result.bucket.regular_pay, dec("160"));
        assert_eq!(result.bucket.overtime_pay, dec("60"));
        assert_eq!(result.bucket.total_pay, dec("220"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_adjusted_hours_drive_pay_not_raw_hours() {
        let mut shift = make_shift(1, day(2), "9");
        shift.adjusted_hours = Some(dec("4"));

        let result = aggregate_date(day(2), &[shift], None, &worker(), &settings(), 1);
        assert_eq!(result.bucket.total_hours, dec("9"));
        assert_eq!(result.bucket.total_adjusted_hours, dec("4"));
        assert_eq!(result.bucket.overtime_hours, Decimal::ZERO);
        assert_eq!(result.bucket.total_pay, dec("80"));
    }

    #[test]
    fn test_audit_steps_are_sequential() {
        let shifts = vec![make_shift(1, day(2), "5")];
        let result = aggregate_date(day(2), &shifts, None, &worker(), &settings(), 10);

        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![10, 11, 12]);
        assert_eq!(result.audit_steps[0].rule_id, "rate_resolution");
        assert_eq!(result.audit_steps[1].rule_id, "daily_overtime_split");
        assert_eq!(result.audit_steps[2].rule_id, "pay_calculation");
    }

    #[test]
    fn test_representative_shift_rates_and_mixed_rate_warning() {
        let first = make_shift(1, day(2), "5");
        let mut second = make_shift(2, day(2), "5");
        second.rates.daily_wages_rate = Some(dec("200"));

        let result = aggregate_date(
            day(2),
            &[first, second],
            None,
            &worker(),
            &CalculationSettings::default(),
            1,
        );

        assert_eq!(result.bucket.rates.daily_wages_rate, dec("160"));
        assert_eq!(result.bucket.regular_pay, dec("160"));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "MIXED_RATES_ON_DATE");
    }

    #[test]
    fn test_date_override_applies_to_bucket() {
        let shifts = vec![make_shift(1, day(2), "8")];
        let overrides = RateOverrides {
            daily_wages_rate: Some(dec("200")),
            ..RateOverrides::default()
        };

        let result = aggregate_date(
            day(2),
            &shifts,
            Some(&overrides),
            &worker(),
            &CalculationSettings::default(),
            1,
        );
        assert_eq!(result.bucket.total_pay, dec("200"));
    }

    #[test]
    fn test_zero_rate_warning() {
        let shifts = vec![make_shift(1, day(2), "6")];
        let result = aggregate_date(
            day(2),
            &shifts,
            None,
            &WorkerRateProfile::default(),
            &CalculationSettings::default(),
            1,
        );

        assert_eq!(result.bucket.total_pay, Decimal::ZERO);
        assert_eq!(result.warnings[0].code, "ZERO_RATE");
        assert_eq!(result.warnings[0].severity, WarningSeverity::High);
    }

    #[test]
    fn test_overflowing_daily_pay_is_zeroed_with_warning() {
        let shifts = vec![make_shift(1, day(2), "10")];
        let worker = WorkerRateProfile::new("w-1", Decimal::MAX, dec("20"));

        let result = aggregate_date(day(2), &shifts, None, &worker, &settings(), 1);

        assert_eq!(result.bucket.overtime_hours, dec("2"));
        assert_eq!(result.bucket.regular_pay, Decimal::ZERO);
        assert_eq!(result.bucket.total_pay, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.code == "ARITHMETIC_OVERFLOW"));
    }

    #[test]
    fn test_overflowing_hours_sum_is_zeroed_with_warning() {
        let mut first = make_shift(1, day(2), "5");
        first.adjusted_hours = Some(Decimal::MAX);
        let mut second = make_shift(2, day(2), "5");
        second.adjusted_hours = Some(Decimal::MAX);

        let result = aggregate_date(day(2), &[first, second], None, &worker(), &settings(), 1);

        assert_eq!(result.bucket.total_hours, dec("10"));
        assert_eq!(result.bucket.total_adjusted_hours, Decimal::ZERO);
        assert_eq!(result.bucket.total_pay, Decimal::ZERO);
        assert_eq!(result.warnings[0].code, "ARITHMETIC_OVERFLOW");
    }

    #[test]
    fn test_empty_date_gives_zero_bucket() {
        let result = aggregate_date(day(2), &[], None, &worker(), &settings(), 1);

        assert_eq!(result.bucket.total_adjusted_hours, Decimal::ZERO);
        assert_eq!(result.bucket.total_pay, Decimal::ZERO);
        assert_eq!(result.bucket.rates, ResolvedRates::zero());
        assert!(result.warnings.is_empty());
    }
}
