//! Spending overview and reminders
//!
//! Aggregates a user's subscriptions into per-cadence totals and normalized
//! monthly/annual cost, and selects the subscriptions whose payment reminder
//! is due.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Serialize;

use crate::models::{Frequency, Subscription};
use crate::schedule;

/// Summed cost of all subscriptions on one cadence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTotal {
    pub frequency: Frequency,
    pub label: String,
    pub count: usize,
    pub total: f64,
}

/// A payment due within the overview window
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingPayment {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub next_payment_date: DateTime<Utc>,
    pub days_until: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingOverview {
    pub subscription_count: usize,
    pub by_frequency: Vec<FrequencyTotal>,
    /// Sum of every subscription's monthly equivalent
    pub monthly_total: f64,
    pub annual_total: f64,
    pub overdue_count: usize,
    pub upcoming: Vec<UpcomingPayment>,
}

/// Per-cadence totals, shortest cadence first
pub fn frequency_totals(subscriptions: &[Subscription]) -> Vec<FrequencyTotal> {
    let mut totals: BTreeMap<u32, FrequencyTotal> = BTreeMap::new();

    for sub in subscriptions {
        let entry = totals
            .entry(sub.frequency.days())
            .or_insert_with(|| FrequencyTotal {
                frequency: sub.frequency,
                label: sub.frequency.label(),
                count: 0,
                total: 0.0,
            });
        entry.count += 1;
        entry.total += sub.amount;
    }

    totals.into_values().collect()
}

/// Cost of one payment of `amount` spread over a month
///
/// Month-based cadences divide exactly; day-based cadences use 365 days
/// per year.
pub fn monthly_equivalent(amount: f64, frequency: Frequency) -> f64 {
    match frequency.months() {
        Some(months) => amount / f64::from(months),
        None => amount * 365.0 / f64::from(frequency.days().max(1)) / 12.0,
    }
}

impl SpendingOverview {
    /// Summarize `subscriptions` as of `now`, listing payments due within
    /// `upcoming_days`
    pub fn build<Tz: TimeZone>(
        subscriptions: &[Subscription],
        now: &DateTime<Tz>,
        upcoming_days: u32,
    ) -> Self {
        let now = now.with_timezone(&Utc);
        let window_end = now + Duration::days(i64::from(upcoming_days));

        let monthly_total: f64 = subscriptions
            .iter()
            .map(|s| monthly_equivalent(s.amount, s.frequency))
            .sum();

        let overdue_count = subscriptions
            .iter()
            .filter(|s| schedule::is_payment_date_passed_at(&s.next_payment_date, &now))
            .count();

        let mut upcoming: Vec<UpcomingPayment> = subscriptions
            .iter()
            .filter(|s| s.next_payment_date >= now && s.next_payment_date <= window_end)
            .map(|s| UpcomingPayment {
                id: s.id,
                name: s.name.clone(),
                amount: s.amount,
                next_payment_date: s.next_payment_date,
                days_until: schedule::get_days_until_payment_at(&s.next_payment_date, &now),
            })
            .collect();
        upcoming.sort_by_key(|p| p.next_payment_date);

        Self {
            subscription_count: subscriptions.len(),
            by_frequency: frequency_totals(subscriptions),
            monthly_total,
            annual_total: monthly_total * 12.0,
            overdue_count,
            upcoming,
        }
    }
}

/// Instant at which the payment reminder for `sub` becomes due
pub fn reminder_date(sub: &Subscription) -> DateTime<Utc> {
    sub.next_payment_date - Duration::days(i64::from(sub.remind_days_before))
}

/// Subscriptions whose reminder is due and whose payment has not yet passed
pub fn due_reminders<'a, Tz: TimeZone>(
    subscriptions: &'a [Subscription],
    now: &DateTime<Tz>,
) -> Vec<&'a Subscription> {
    let now = now.with_timezone(&Utc);
    subscriptions
        .iter()
        .filter(|s| reminder_date(s) <= now && !schedule::is_payment_date_passed_at(&s.next_payment_date, &now))
        .collect()
}
