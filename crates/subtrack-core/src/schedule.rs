//! Payment scheduling
//!
//! Pure date arithmetic over subscription billing cadences:
//! - Single-step advancement (`calculate_next_payment_date`)
//! - Catch-up of a stale start date to the first occurrence at or after now
//! - Overdue checks and signed days-until-payment
//! - Display and storage formatting
//!
//! Month-based cadences (monthly, quarterly, semiannually, annually) advance by
//! calendar months in the instant's own time zone; a day-of-month the target
//! month lacks is clamped to its last day. Each step starts from the previous
//! occurrence, so a clamp carries forward: 2023-01-31 monthly gives Feb 28,
//! then Mar 28, Apr 28, and so on. Every other cadence adds exactly its day
//! count.
//!
//! Functions that depend on the current instant come in two forms: one that
//! reads the clock, and an `_at` form that takes `now` explicitly.

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Frequency;

/// Storage format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Advance `reference` by one step of `frequency`
pub fn advance<Tz: TimeZone>(reference: &DateTime<Tz>, frequency: Frequency) -> Result<DateTime<Tz>> {
    let local = reference.naive_local();

    let next_local = match frequency.months() {
        Some(months) => local.checked_add_months(Months::new(months)),
        None => local.checked_add_days(Days::new(u64::from(frequency.days()))),
    }
    .ok_or_else(|| {
        Error::DateOutOfRange(format!("{} + {}", format_date(reference), frequency))
    })?;

    reference
        .timezone()
        .from_local_datetime(&next_local)
        .earliest()
        .ok_or_else(|| Error::DateOutOfRange(format!("{} does not exist locally", next_local)))
}

/// Advance `reference` by one cadence step given as a day count
pub fn calculate_next_payment_date<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    frequency_days: i64,
) -> Result<DateTime<Tz>> {
    advance(reference, Frequency::from_days(frequency_days)?)
}

/// Next payment after the one currently due (the "mark as paid" step)
pub fn calculate_next_payment_date_from_current<Tz: TimeZone>(
    current_payment_date: &DateTime<Tz>,
    frequency_days: i64,
) -> Result<DateTime<Tz>> {
    calculate_next_payment_date(current_payment_date, frequency_days)
}

/// Roll `first` forward until it is no earlier than `now`
///
/// A `first` already at or after `now` is returned unchanged.
pub fn catch_up<Tz: TimeZone>(
    first: DateTime<Tz>,
    frequency: Frequency,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>> {
    let mut next = first;
    let mut steps = 0u64;

    while next < *now {
        next = advance(&next, frequency)?;
        steps += 1;
    }

    if steps > 0 {
        debug!(
            steps,
            frequency = %frequency,
            next = %format_date(&next),
            "Caught up payment date"
        );
    }

    Ok(next)
}

/// First payment on or after now for a subscription that started on `start_date`
pub fn calculate_next_payment_date_from_start(
    start_date: &str,
    frequency_days: i64,
) -> Result<DateTime<Local>> {
    calculate_next_payment_date_from_start_at(start_date, frequency_days, &Local::now())
}

/// First payment on or after `now` for a subscription that started on `start_date`
pub fn calculate_next_payment_date_from_start_at<Tz: TimeZone>(
    start_date: &str,
    frequency_days: i64,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>> {
    // Validate before parsing so a bad frequency never reaches the loop
    let frequency = Frequency::from_days(frequency_days)?;
    let start = parse_date(start_date, &now.timezone())?;
    catch_up(start, frequency, now)
}

/// The next `count` payments, starting with the first one on or after `now`
pub fn project_payments<Tz: TimeZone>(
    start_date: &str,
    frequency_days: i64,
    count: usize,
    now: &DateTime<Tz>,
) -> Result<Vec<DateTime<Tz>>> {
    let frequency = Frequency::from_days(frequency_days)?;
    let mut payments = Vec::with_capacity(count);
    if count == 0 {
        return Ok(payments);
    }

    let mut current = calculate_next_payment_date_from_start_at(start_date, frequency_days, now)?;
    payments.push(current.clone());
    while payments.len() < count {
        current = advance(&current, frequency)?;
        payments.push(current.clone());
    }

    Ok(payments)
}

pub fn is_payment_date_passed<Tz: TimeZone>(payment_date: &DateTime<Tz>) -> bool {
    is_payment_date_passed_at(payment_date, &Utc::now())
}

/// True iff `payment_date` is strictly before `now`
pub fn is_payment_date_passed_at<Tz: TimeZone, Tz2: TimeZone>(
    payment_date: &DateTime<Tz>,
    now: &DateTime<Tz2>,
) -> bool {
    payment_date.with_timezone(&Utc) < now.with_timezone(&Utc)
}

pub fn get_days_until_payment<Tz: TimeZone>(payment_date: &DateTime<Tz>) -> i64 {
    get_days_until_payment_at(payment_date, &Utc::now())
}

/// Whole days from `now` to `payment_date`, truncated toward zero
///
/// Negative when the payment is overdue.
pub fn get_days_until_payment_at<Tz: TimeZone, Tz2: TimeZone>(
    payment_date: &DateTime<Tz>,
    now: &DateTime<Tz2>,
) -> i64 {
    payment_date
        .with_timezone(&Utc)
        .signed_duration_since(now.with_timezone(&Utc))
        .num_days()
}

/// `M/D/YYYY`, unpadded
pub fn format_date_for_display<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let date = instant.naive_local().date();
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// Zero-padded `YYYY-MM-DD`
pub fn format_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    let date = instant.naive_local().date();
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse `YYYY-MM-DD` into a calendar date
pub fn parse_start_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|source| Error::Parse {
        input: text.to_string(),
        source,
    })
}

/// Parse `YYYY-MM-DD` into local midnight in `tz`
pub fn parse_date<Tz: TimeZone>(text: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    local_midnight(parse_start_date(text)?, tz)
}

/// Midnight at the start of `date` in `tz`
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| Error::DateOutOfRange(format!("midnight of {} does not exist locally", date)))
}

/// Human label for a day-count frequency
pub fn get_frequency_label(frequency_days: i64) -> String {
    match Frequency::from_days(frequency_days) {
        Ok(frequency) => frequency.label(),
        Err(_) => format!("{} days", frequency_days),
    }
}
