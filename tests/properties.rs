//! Property-based tests for hour redistribution and daily aggregation.
//!
//! These tests check the arithmetic invariants operator edits and
//! recomputation rely on, using proptest.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use payroll_engine::calculation::{DAILY_OVERTIME_THRESHOLD, aggregate_invoice, redistribute_hours};
use payroll_engine::config::CalculationSettings;
use payroll_engine::models::{
    DateRange, DateRateOverrides, RateOverrides, ShiftRecord, WorkerRateProfile,
};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn other_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
}

/// Strategy for shift hours in hundredths, 0 to 24 hours.
fn hours() -> impl Strategy<Value = Decimal> {
    (0i64..=2400).prop_map(|h| Decimal::new(h, 2))
}

/// Strategy for a non-negative target in hundredths, 0 to 60 hours.
fn target() -> impl Strategy<Value = Decimal> {
    (0i64..=6000).prop_map(|h| Decimal::new(h, 2))
}

fn make_shifts(hours: &[Decimal], date: NaiveDate, first_id: i64) -> Vec<ShiftRecord> {
    hours
        .iter()
        .enumerate()
        .map(|(i, h)| ShiftRecord {
            shift_id: first_id + i as i64,
            date,
            check_in: String::new(),
            check_out: String::new(),
            total_hours: *h,
            adjusted_hours: None,
            rates: RateOverrides::default(),
        })
        .collect()
}

fn on_date(shifts: &[ShiftRecord], date: NaiveDate) -> Vec<ShiftRecord> {
    shifts.iter().filter(|s| s.date == date).cloned().collect()
}

fn adjusted_on(shifts: &[ShiftRecord], date: NaiveDate) -> Vec<Decimal> {
    shifts
        .iter()
        .filter(|s| s.date == date)
        .map(ShiftRecord::effective_adjusted_hours)
        .collect()
}

proptest! {
    /// Property: after redistribution the date's hours sum to the target.
    #[test]
    fn prop_redistribution_sums_to_target(
        shift_hours in prop::collection::vec(hours(), 1..8),
        target in target(),
    ) {
        let current: Decimal = shift_hours.iter().copied().sum();
        prop_assume!(current > Decimal::ZERO);

        let mut shifts = make_shifts(&shift_hours, date(), 1);
        redistribute_hours(&mut shifts, date(), target, 1).unwrap();

        let sum: Decimal = adjusted_on(&shifts, date()).into_iter().sum();
        prop_assert!((sum - target).abs() <= Decimal::new(1, 6), "sum {} target {}", sum, target);
        prop_assert!(shifts.iter().all(|s| s.effective_adjusted_hours() >= Decimal::ZERO));
    }

    /// Property: setting the current total again changes nothing.
    #[test]
    fn prop_redistribution_to_current_total_is_identity(
        shift_hours in prop::collection::vec(hours(), 1..8),
    ) {
        let current: Decimal = shift_hours.iter().copied().sum();
        let mut shifts = make_shifts(&shift_hours, date(), 1);

        redistribute_hours(&mut shifts, date(), current, 1).unwrap();

        prop_assert_eq!(adjusted_on(&shifts, date()), shift_hours);
    }

    /// Property: a date whose shifts are all zero stays at zero for any target.
    #[test]
    fn prop_all_zero_date_stays_zero(
        count in 1usize..8,
        target in target(),
    ) {
        let mut shifts = make_shifts(&vec![Decimal::ZERO; count], date(), 1);

        let result = redistribute_hours(&mut shifts, date(), target, 1).unwrap();

        prop_assert!(adjusted_on(&shifts, date()).iter().all(|h| h.is_zero()));
        prop_assert_eq!(result.ratio, Decimal::ONE);
    }

    /// Property: redistribution never touches shifts on other dates.
    #[test]
    fn prop_redistribution_leaves_other_dates_alone(
        edited in prop::collection::vec(hours(), 1..5),
        untouched in prop::collection::vec(hours(), 1..5),
        target in target(),
    ) {
        let mut shifts = make_shifts(&edited, date(), 1);
        shifts.extend(make_shifts(&untouched, other_date(), 100));
        let before = on_date(&shifts, other_date());

        redistribute_hours(&mut shifts, date(), target, 1).unwrap();

        let after = on_date(&shifts, other_date());
        prop_assert_eq!(before, after);
    }

    /// Property: each date splits into regular hours capped at the threshold
    /// plus overtime, and invoice totals are the sum of the buckets.
    #[test]
    fn prop_daily_split_and_totals(
        first_day in prop::collection::vec(hours(), 1..5),
        second_day in prop::collection::vec(hours(), 1..5),
    ) {
        let mut shifts = make_shifts(&first_day, date(), 1);
        shifts.extend(make_shifts(&second_day, other_date(), 100));
        let worker = WorkerRateProfile::new("w-1", Decimal::new(160, 0), Decimal::new(20, 0));

        let invoice = aggregate_invoice(
            &worker,
            &shifts,
            &DateRateOverrides::new(),
            &DateRange::all(),
            &CalculationSettings::default(),
        );

        for bucket in &invoice.date_groups {
            prop_assert!(bucket.regular_hours <= DAILY_OVERTIME_THRESHOLD);
            prop_assert!(bucket.overtime_hours >= Decimal::ZERO);
            prop_assert_eq!(
                bucket.regular_hours + bucket.overtime_hours,
                bucket.total_adjusted_hours
            );
            prop_assert_eq!(bucket.regular_pay + bucket.overtime_pay, bucket.total_pay);
        }

        let bucket_pay: Decimal = invoice.date_groups.iter().map(|b| b.total_pay).sum();
        prop_assert_eq!(invoice.totals.total_pay, bucket_pay);
        prop_assert_eq!(invoice.totals.total_shifts, shifts.len());
    }
}
