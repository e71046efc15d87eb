//! Shift normalization.
//!
//! Converts a [`RawShift`] from the remote data source into a canonical
//! [`ShiftRecord`]. Normalization never fails: anything missing or unreadable
//! is replaced with a safe default and reported as an [`AuditWarning`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

use crate::config::CalculationSettings;
use crate::models::{
    AuditWarning, RateKind, RateOverrides, RawShift, ShiftRecord, WarningSeverity,
};

const MINUTES_PER_DAY: i64 = 24 * 60;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const TIME_OF_DAY_FORMATS: [&str; 5] = ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

/// A normalized shift together with the defaults substituted to produce it.
#[derive(Debug, Clone)]
pub struct NormalizedShift {
    /// The canonical shift.
    pub shift: ShiftRecord,
    /// One warning per substituted default.
    pub warnings: Vec<AuditWarning>,
}

/// A batch of normalized shifts in ingestion order.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// The canonical shifts, in the same order as the input.
    pub shifts: Vec<ShiftRecord>,
    /// Warnings from every shift in the batch.
    pub warnings: Vec<AuditWarning>,
}

/// Normalizes a single raw shift.
///
/// - `date` is the explicit date if readable, else the calendar date of the
///   check-in timestamp, else `settings.fallback_date`.
/// - `total_hours` is the system-calculated duration if present and
///   non-negative; otherwise it is derived from the check-in/check-out time of
///   day, wrapping past midnight when check-out is earlier than check-in.
/// - `adjusted_hours` is the supplied adjusted value if non-negative, else
///   `total_hours`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::normalize_shift;
/// use payroll_engine::config::CalculationSettings;
/// use payroll_engine::models::RawShift;
/// use rust_decimal::Decimal;
///
/// let raw = RawShift {
///     shift_id: Some(1),
///     check_in_timestamp: Some("2026-03-02T22:00:00".to_string()),
///     check_in: Some("22:00".to_string()),
///     check_out: Some("06:00".to_string()),
///     ..RawShift::default()
/// };
/// let normalized = normalize_shift(&raw, &CalculationSettings::default());
///
/// assert_eq!(normalized.shift.total_hours, Decimal::new(8, 0));
/// assert_eq!(normalized.shift.date.to_string(), "2026-03-02");
/// assert!(normalized.warnings.is_empty());
/// ```
pub fn normalize_shift(raw: &RawShift, settings: &CalculationSettings) -> NormalizedShift {
    let mut warnings = Vec::new();
    let shift_id = raw.shift_id.unwrap_or_default();

    if raw.shift_id.is_none() {
        warnings.push(AuditWarning::new(
            "MISSING_SHIFT_ID",
            "Shift has no readable id; using 0",
            WarningSeverity::Medium,
        ));
    }

    let check_in_at = raw.check_in_timestamp.as_deref().and_then(parse_timestamp);
    let check_out_at = raw.check_out_timestamp.as_deref().and_then(parse_timestamp);

    let date = match raw
        .date
        .as_deref()
        .and_then(parse_date)
        .or_else(|| check_in_at.map(|t| t.date()))
    {
        Some(date) => date,
        None => {
            tracing::debug!(
                shift_id,
                fallback = %settings.fallback_date,
                "Shift has no readable date"
            );
            warnings.push(AuditWarning::new(
                "FALLBACK_DATE",
                format!(
                    "Shift {} has no readable date or check-in; assigned {}",
                    shift_id, settings.fallback_date
                ),
                WarningSeverity::High,
            ));
            settings.fallback_date
        }
    };

    let check_in = raw
        .check_in
        .clone()
        .or_else(|| check_in_at.map(|t| t.format("%H:%M").to_string()))
        .unwrap_or_default();
    let check_out = raw
        .check_out
        .clone()
        .or_else(|| check_out_at.map(|t| t.format("%H:%M").to_string()))
        .unwrap_or_default();

    let total_hours = match raw.total_hours {
        Some(hours) if hours >= Decimal::ZERO => hours,
        provided => {
            if provided.is_some() {
                warnings.push(AuditWarning::new(
                    "NEGATIVE_HOURS_IGNORED",
                    format!("Shift {} reported negative total hours; recomputing", shift_id),
                    WarningSeverity::Medium,
                ));
            }
            match hours_between(&check_in, &check_out) {
                Some(hours) => hours,
                None => {
                    warnings.push(AuditWarning::new(
                        "HOURS_DEFAULTED",
                        format!(
                            concat!(
                                "Shift {} has no usable duration or check-in/check-out times; ",
                                "using 0 hours"
                            ),
                            shift_id
                        ),
                        WarningSeverity::High,
                    ));
                    Decimal::ZERO
                }
            }
        }
    };

    let adjusted_hours = match raw.adjusted_hours {
        Some(hours) if hours >= Decimal::ZERO => hours,
        Some(_) => {
            warnings.push(AuditWarning::new(
                "NEGATIVE_HOURS_IGNORED",
                format!("Shift {} has negative adjusted hours; using total hours", shift_id),
                WarningSeverity::Medium,
            ));
            total_hours
        }
        None => total_hours,
    };

    let rates = non_negative_overrides(
        RateOverrides {
            daily_wages_rate: raw.daily_wages_rate,
            hourly_rate: raw.hourly_rate,
            overtime_rate: raw.overtime_rate,
        },
        &format!("Shift {}", shift_id),
        &mut warnings,
    );

    NormalizedShift {
        shift: ShiftRecord {
            shift_id,
            date,
            check_in,
            check_out,
            total_hours,
            adjusted_hours: Some(adjusted_hours),
            rates,
        },
        warnings,
    }
}

/// Normalizes a batch of raw shifts, preserving ingestion order.
pub fn normalize_shifts(raws: &[RawShift], settings: &CalculationSettings) -> NormalizedBatch {
    raws.iter()
        .map(|raw| normalize_shift(raw, settings))
        .fold(NormalizedBatch::default(), |mut batch, normalized| {
            batch.shifts.push(normalized.shift);
            batch.warnings.extend(normalized.warnings);
            batch
        })
}

/// Computes the hours between two time-of-day strings.
///
/// Returns `(check_out - check_in) / 60` in minutes, adding 24 hours when the
/// result is negative (an overnight shift). Returns `None` if either time
/// cannot be read.
pub fn hours_between(check_in: &str, check_out: &str) -> Option<Decimal> {
    let start = parse_time_of_day(check_in)?;
    let end = parse_time_of_day(check_out)?;

    let mut minutes = minutes_of_day(end) - minutes_of_day(start);
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }

    Some(Decimal::from(minutes) / Decimal::from(60))
}

/// Parses a local time of day such as `09:00`, `17:30:00` or `9:00 AM`.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    TIME_OF_DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Parses a timestamp, keeping the wall-clock time of its own offset.
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_timestamp(text).map(|t| t.date())
}

/// Unsets negative rates, recording a `NEGATIVE_RATE_IGNORED` warning against
/// `subject` for each one.
pub(crate) fn non_negative_overrides(
    rates: RateOverrides,
    subject: &str,
    warnings: &mut Vec<AuditWarning>,
) -> RateOverrides {
    let mut cleaned = rates;
    for kind in [RateKind::DailyWages, RateKind::Hourly, RateKind::Overtime] {
        if let Some(rate) = rates.get(kind).filter(|r| *r < Decimal::ZERO) {
            warnings.push(AuditWarning::new(
                "NEGATIVE_RATE_IGNORED",
                format!(
                    "{} has negative {} ({}); treating it as unset",
                    subject,
                    kind.field_name(),
                    rate.normalize()
                ),
                WarningSeverity::Medium,
            ));
            cleaned.set(kind, None);
        }
    }
    cleaned
}
