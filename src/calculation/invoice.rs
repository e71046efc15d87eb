//! Invoice aggregation.
//!
//! Builds the full invoice view for a worker over an optional date range:
//! date buckets, totals, per-shift breakdown rows and the audit trace. Also
//! builds the payload handed to persistence.

use std::time::Instant;

use rust_decimal::Decimal;

use crate::config::CalculationSettings;
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, AuditWarning, DateRange, DateRateOverrides, InvoiceComputation, InvoicePayload,
    InvoiceTotals, PayloadBreakdownEntry, ShiftRecord, WarningSeverity, WorkerRateProfile,
    round_half_up,
};

use super::daily_aggregation::{aggregate_date, group_by_date};
use super::normalization::non_negative_overrides;
use super::pay::{calculate_shift_pay, overflow_warning};
use super::rate_resolution::resolve_rates;

/// Aggregates a worker's shifts into an invoice.
///
/// Totals are the sums of the daily buckets. The per-shift breakdown rows
/// apply the overtime threshold per shift and are reported alongside; when
/// the two disagree on a date's overtime pay an `OVERTIME_MODE_DISAGREEMENT`
/// warning is recorded and the daily figures stand.
///
/// Negative date-level rates are ignored with a `NEGATIVE_RATE_IGNORED`
/// warning. A date whose figures would overflow the invoice totals is kept in
/// `date_groups` but left out of the totals with an `ARITHMETIC_OVERFLOW`
/// warning.
///
/// # Arguments
///
/// * `worker` - The worker's global rates
/// * `shifts` - Every shift on the invoice, in ingestion order
/// * `date_overrides` - Date-level rate overrides
/// * `range` - Inclusive date filter
/// * `settings` - Calculation settings
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_invoice;
/// use payroll_engine::config::CalculationSettings;
/// use payroll_engine::models::{
///     DateRange, DateRateOverrides, RateOverrides, ShiftRecord, WorkerRateProfile,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let shift = |id| ShiftRecord {
///     shift_id: id,
///     date,
///     check_in: String::new(),
///     check_out: String::new(),
///     total_hours: Decimal::new(5, 0),
///     adjusted_hours: None,
///     rates: RateOverrides::default(),
/// };
/// let worker = WorkerRateProfile::new("w-1", Decimal::new(160, 0), Decimal::new(20, 0));
///
/// let invoice = aggregate_invoice(
///     &worker,
///     &[shift(1), shift(2)],
///     &DateRateOverrides::new(),
///     &DateRange::all(),
///     &CalculationSettings::default(),
/// );
/// assert_eq!(invoice.totals.total_pay, Decimal::new(220, 0));
/// ```
pub fn aggregate_invoice(
    worker: &WorkerRateProfile,
    shifts: &[ShiftRecord],
    date_overrides: &DateRateOverrides,
    range: &DateRange,
    settings: &CalculationSettings,
) -> InvoiceComputation {
    let start = Instant::now();
    let mut audit_trace = AuditTrace::default();
    let mut totals = InvoiceTotals::default();
    let mut date_groups = Vec::new();
    let mut breakdown = Vec::new();
    let mut step_number = 1;

    if range.is_inverted() {
        audit_trace.warnings.push(AuditWarning::new(
            "EMPTY_DATE_RANGE",
            format!(
                "Date range starts after it ends ({:?} to {:?}); no shifts selected",
                range.from, range.to
            ),
            WarningSeverity::Medium,
        ));
    }

    for (date, day_shifts) in group_by_date(shifts, range) {
        let date_override = date_overrides
            .get(&date)
            .map(|o| {
                let subject = format!("Date override for {}", date);
                non_negative_overrides(*o, &subject, &mut audit_trace.warnings)
            })
            .filter(|o| !o.is_empty());
        let date_override = date_override.as_ref();

        let daily = aggregate_date(date, &day_shifts, date_override, worker, settings, step_number);
        step_number += daily.audit_steps.len() as u32;
        audit_trace.steps.extend(daily.audit_steps);
        audit_trace.warnings.extend(daily.warnings);

        let mut per_shift_overtime_pay = Some(Decimal::ZERO);
        for shift in &day_shifts {
            let rates = resolve_rates(shift, date_override, worker, settings, step_number);
            step_number += 1;
            audit_trace.steps.push(rates.audit_step);
            for warning in rates.warnings {
                if !audit_trace.warnings.contains(&warning) {
                    audit_trace.warnings.push(warning);
                }
            }

            let shift_pay = calculate_shift_pay(shift, &rates.rates, step_number);
            step_number += shift_pay.audit_steps.len() as u32;
            audit_trace.steps.extend(shift_pay.audit_steps);
            audit_trace.warnings.extend(shift_pay.warnings);

            per_shift_overtime_pay =
                per_shift_overtime_pay.and_then(|sum| sum.checked_add(shift_pay.row.overtime_pay));
            breakdown.push(shift_pay.row);
        }

        let bucket = daily.bucket;
        let per_shift_disagrees = per_shift_overtime_pay.filter(|p| *p != bucket.overtime_pay);
        if let Some(per_shift) = per_shift_disagrees {
            audit_trace.warnings.push(AuditWarning::new(
                "OVERTIME_MODE_DISAGREEMENT",
                format!(
                    concat!(
                        "On {} the daily overtime pay is ${} but the per-shift rows ",
                        "total ${}; the invoice uses the daily figure"
                    ),
                    date,
                    bucket.overtime_pay.normalize(),
                    per_shift.normalize()
                ),
                WarningSeverity::Low,
            ));
        }

        match totals.checked_add_bucket(&bucket) {
            Some(updated) => totals = updated,
            None => {
                tracing::debug!(%date, "Date left out of invoice totals on overflow");
                audit_trace
                    .warnings
                    .push(overflow_warning(format_args!("The invoice total including {}", date)));
            }
        }
        date_groups.push(bucket);
    }

    audit_trace.duration_us = start.elapsed().as_micros() as u64;

    tracing::debug!(
        worker_id = %worker.worker_id,
        dates = date_groups.len(),
        total_shifts = totals.total_shifts,
        total_pay = %totals.total_pay,
        duration_us = audit_trace.duration_us,
        "Invoice aggregated"
    );

    InvoiceComputation {
        worker_id: worker.worker_id.clone(),
        date_groups,
        totals,
        breakdown,
        audit_trace,
    }
}

/// Recomputes the invoice totals.
///
/// Call this after any edit to shifts, overrides or the range; it holds no
/// state between calls.
pub fn recompute(
    worker: &WorkerRateProfile,
    shifts: &[ShiftRecord],
    date_overrides: &DateRateOverrides,
    range: &DateRange,
    settings: &CalculationSettings,
) -> InvoiceTotals {
    aggregate_invoice(worker, shifts, date_overrides, range, settings).totals
}

/// Builds the persistence payload from a computed invoice.
///
/// `total_amount` is the invoice total rounded to the configured money
/// precision. Each breakdown row carries a JSON copy of its source shift.
///
/// # Errors
///
/// Returns `SerializationError` if a source shift cannot be serialized.
pub fn build_invoice_payload(
    computation: &InvoiceComputation,
    worker: &WorkerRateProfile,
    settings: &CalculationSettings,
) -> EngineResult<InvoicePayload> {
    let sources = computation.date_groups.iter().flat_map(|bucket| bucket.shifts.iter());

    let mut breakdown = Vec::with_capacity(computation.breakdown.len());
    for (row, shift) in computation.breakdown.iter().zip(sources) {
        breakdown.push(PayloadBreakdownEntry {
            row: row.clone(),
            source_shift: serde_json::to_string(shift)?,
        });
    }

    let shift_ids = computation
        .breakdown
        .iter()
        .map(|row| row.shift_id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    Ok(InvoicePayload {
        worker_id: computation.worker_id.clone(),
        daily_wages_rate: worker.daily_wages_rate.unwrap_or(Decimal::ZERO),
        hourly_wages_rate: worker.hourly_rate.unwrap_or(Decimal::ZERO),
        shift_ids,
        total_hours: computation.totals.total_hours,
        adjusted_hours: computation.totals.adjusted_hours(),
        total_amount: round_half_up(computation.totals.total_pay, settings.money_decimal_places),
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateOverrides;
    use chrono::NaiveDate;
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
            adjusted_hours: None,
            rates: RateOverrides::default(),
        }
    }

    fn worker() -> WorkerRateProfile {
        WorkerRateProfile::new("w-1", dec("160"), dec("20"))
    }

    fn two_days() -> Vec<ShiftRecord> {
        vec![
            make_shift(1, day(2), "5"),
            make_shift(2, day(2), "5"),
            make_shift(3, day(3), "5"),
            make_shift(4, day(3), "5"),
        ]
    }

    fn aggregate(shifts: &[ShiftRecord], range: &DateRange) -> InvoiceComputation {
        aggregate_invoice(
            &worker(),
            shifts,
            &DateRateOverrides::new(),
            range,
            &CalculationSettings::default(),
        )
    }

    #[test]
    fn test_single_day_end_to_end() {
        let shifts = vec![make_shift(1, day(2), "5"), make_shift(2, day(2), "5")];
        let result = aggregate(&shifts, &DateRange::all());

        assert_eq!(result.totals.total_shifts, 2);
        assert_eq!(result.totals.total_hours, dec("10"));
        assert_eq!(result.totals.total_regular_hours, dec("8"));
        assert_eq!(result.totals.total_overtime_hours, dec("2"));
        assert_eq!(result.totals.total_regular_pay, dec("160"));
        assert_eq!(result.totals.total_overtime_pay, dec("60"));
        assert_eq!(result.totals.total_pay, dec("220"));
        assert_eq!(result.worker_id, "w-1");
    }

    #[test]
    fn test_range_filter() {
        let all = aggregate(&two_days(), &DateRange::all());
        assert_eq!(all.totals.total_pay, dec("440"));
        assert_eq!(all.date_groups.len(), 2);

        let one = aggregate(&two_days(), &DateRange::between(day(3), day(3)));
        assert_eq!(one.totals.total_pay, dec("220"));
        assert_eq!(one.totals.total_shifts, 2);
        assert_eq!(one.date_groups[0].date, day(3));
    }

    #[test]
    fn test_inverted_range_selects_nothing() {
        let result = aggregate(&two_days(), &DateRange::between(day(3), day(2)));

        assert!(result.date_groups.is_empty());
        assert_eq!(result.totals, InvoiceTotals::default());
        assert!(result.audit_trace.has_warning("EMPTY_DATE_RANGE"));
    }

    #[test]
    fn test_breakdown_rows_use_per_shift_threshold() {
        let result = aggregate(&two_days(), &DateRange::all());

        assert_eq!(result.breakdown.len(), 4);
        let ids: Vec<i64> = result.breakdown.iter().map(|r| r.shift_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(result.breakdown.iter().all(|r| r.overtime_hours.is_zero()));
        assert_eq!(result.breakdown[0].total_pay, dec("100"));
        assert!(result.audit_trace.has_warning("OVERTIME_MODE_DISAGREEMENT"));
    }

    #[test]
    fn test_single_long_shift_modes_agree() {
        let shifts = vec![make_shift(1, day(2), "10")];
        let result = aggregate(&shifts, &DateRange::all());

        assert_eq!(result.breakdown[0].overtime_pay, result.date_groups[0].overtime_pay);
        assert!(!result.audit_trace.has_warning("OVERTIME_MODE_DISAGREEMENT"));
    }

    #[test]
    fn test_date_overrides_are_used() {
        let mut overrides = DateRateOverrides::new();
        overrides.insert(
            day(2),
            RateOverrides {
                overtime_rate: Some(dec("40")),
                ..RateOverrides::default()
            },
        );

        let result = aggregate_invoice(
            &worker(),
            &two_days(),
            &overrides,
            &DateRange::all(),
            &CalculationSettings::default(),
        );
        assert_eq!(result.date_groups[0].overtime_pay, dec("80"));
        assert_eq!(result.date_groups[1].overtime_pay, dec("60"));
        assert_eq!(result.totals.total_pay, dec("460"));
    }

    #[test]
    fn test_negative_date_override_is_ignored() {
        let mut overrides = DateRateOverrides::new();
        overrides.insert(
            day(2),
            RateOverrides {
                daily_wages_rate: Some(dec("-160")),
                overtime_rate: Some(dec("40")),
                ..RateOverrides::default()
            },
        );
        let shifts = vec![make_shift(1, day(2), "10")];

        let result = aggregate_invoice(
            &worker(),
            &shifts,
            &overrides,
            &DateRange::all(),
            &CalculationSettings::default(),
        );

        assert_eq!(result.date_groups[0].rates.daily_wages_rate, dec("160"));
        assert_eq!(result.date_groups[0].overtime_pay, dec("80"));
        assert_eq!(result.totals.total_pay, dec("240"));
        assert_eq!(result.breakdown[0].total_pay, dec("240"));
        assert!(result.audit_trace.has_warning("NEGATIVE_RATE_IGNORED"));
    }

    #[test]
    fn test_huge_rate_does_not_abort_aggregation() {
        let worker = WorkerRateProfile::new(
            "w-1",
            Decimal::from_str("79228162514264337593543950335").unwrap(),
            dec("20"),
        );
        let shifts = vec![make_shift(1, day(2), "10"), make_shift(2, day(3), "1")];

        let result = aggregate_invoice(
            &worker,
            &shifts,
            &DateRateOverrides::new(),
            &DateRange::all(),
            &CalculationSettings::default(),
        );

        assert_eq!(result.date_groups.len(), 2);
        assert_eq!(result.date_groups[0].total_pay, Decimal::ZERO);
        assert_eq!(result.breakdown[0].total_pay, Decimal::ZERO);
        assert!(result.audit_trace.has_warning("ARITHMETIC_OVERFLOW"));
        assert_eq!(result.totals.total_overtime_hours, dec("2"));
        assert!(result.date_groups[1].total_pay > Decimal::ZERO);
        assert_eq!(result.totals.total_pay, result.date_groups[1].total_pay);
    }

    #[test]
    fn test_overflowing_totals_leave_date_out() {
        let two_thirds_of_max = Decimal::MAX / dec("3") * dec("2");
        let mut overrides = DateRateOverrides::new();
        for d in [2, 3] {
            overrides.insert(
                day(d),
                RateOverrides {
                    overtime_rate: Some(two_thirds_of_max),
                    ..RateOverrides::default()
                },
            );
        }
        let shifts = vec![make_shift(1, day(2), "9"), make_shift(2, day(3), "9")];

        let result = aggregate_invoice(
            &worker(),
            &shifts,
            &overrides,
            &DateRange::all(),
            &CalculationSettings::default(),
        );

        assert_eq!(result.date_groups.len(), 2);
        assert_eq!(result.date_groups[1].overtime_pay, two_thirds_of_max);
        assert_eq!(result.totals.total_shifts, 1);
        assert_eq!(result.totals.total_pay, result.date_groups[0].total_pay);
        assert!(result.audit_trace.has_warning("ARITHMETIC_OVERFLOW"));
    }

    #[test]
    fn test_audit_steps_numbered_in_sequence() {
        let result = aggregate(&two_days(), &DateRange::all());
        for (i, step) in result.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
    }

    #[test]
    fn test_recompute_after_edit() {
        let mut shifts = two_days();
        let before = recompute(
            &worker(),
            &shifts,
            &DateRateOverrides::new(),
            &DateRange::all(),
            &CalculationSettings::default(),
        );
        assert_eq!(before.total_pay, dec("440"));

        shifts[0].adjusted_hours = Some(dec("3"));
        let after = recompute(
            &worker(),
            &shifts,
            &DateRateOverrides::new(),
            &DateRange::all(),
            &CalculationSettings::default(),
        );
        assert_eq!(after.total_overtime_hours, dec("2"));
        assert_eq!(after.total_pay, dec("380"));
    }

    #[test]
    fn test_build_payload() {
        let computation = aggregate(&two_days(), &DateRange::all());
        let settings = CalculationSettings::default();
        let payload = build_invoice_payload(&computation, &worker(), &settings).unwrap();

        assert_eq!(payload.worker_id, "w-1");
        assert_eq!(payload.shift_ids, "1,2,3,4");
        assert_eq!(payload.daily_wages_rate, dec("160"));
        assert_eq!(payload.hourly_wages_rate, dec("20"));
        assert_eq!(payload.total_hours, dec("20"));
        assert_eq!(payload.adjusted_hours, dec("20"));
        assert_eq!(payload.total_amount, dec("440"));
        assert_eq!(payload.breakdown.len(), 4);

        let source: ShiftRecord = serde_json::from_str(&payload.breakdown[2].source_shift).unwrap();
        assert_eq!(source.shift_id, 3);
        assert_eq!(source.date, day(3));
    }

    #[test]
    fn test_payload_total_amount_is_rounded() {
        let shifts = vec![make_shift(1, day(2), "1")];
        let worker = WorkerRateProfile::new("w-2", dec("100.01"), dec("20"));
        let computation = aggregate_invoice(
            &worker,
            &shifts,
            &DateRateOverrides::new(),
            &DateRange::all(),
            &CalculationSettings::default(),
        );

        assert_eq!(computation.totals.total_pay, dec("12.50125"));
        let payload =
            build_invoice_payload(&computation, &worker, &CalculationSettings::default()).unwrap();
        assert_eq!(payload.total_amount, dec("12.50"));
    }
}
