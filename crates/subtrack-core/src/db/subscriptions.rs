//! Subscription operations

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{conversion_error, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Frequency, NewSubscription, Subscription};
use crate::schedule::{self, DATE_FORMAT};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, name, amount, category, start_date, frequency_days, next_payment_date, remind_days_before, created_at";

fn row_to_subscription(row: &Row) -> rusqlite::Result<Subscription> {
    use rusqlite::types::Type;

    let start_date_str: String = row.get(5)?;
    let frequency_days: i64 = row.get(6)?;
    let next_payment_ms: i64 = row.get(7)?;
    let created_at_str: String = row.get(9)?;

    let start_date = NaiveDate::parse_from_str(&start_date_str, DATE_FORMAT)
        .map_err(|e| conversion_error(5, Type::Text, e))?;
    let frequency =
        Frequency::from_days(frequency_days).map_err(|e| conversion_error(6, Type::Integer, e))?;
    let next_payment_date = Utc
        .timestamp_millis_opt(next_payment_ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(7, next_payment_ms))?;
    let created_at =
        parse_datetime(&created_at_str).map_err(|e| conversion_error(9, Type::Text, e))?;

    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        start_date,
        frequency,
        next_payment_date,
        remind_days_before: row.get(8)?,
        created_at,
    })
}

impl Database {
    /// Insert a subscription, computing its first payment on or after `now`
    pub fn insert_subscription<Tz: TimeZone>(
        &self,
        new: &NewSubscription,
        now: &DateTime<Tz>,
    ) -> Result<i64> {
        if new.name.trim().is_empty() {
            return Err(Error::InvalidData("Subscription name is required".to_string()));
        }
        if !new.amount.is_finite() {
            return Err(Error::InvalidData(format!("Invalid amount: {}", new.amount)));
        }

        let start = schedule::local_midnight(new.start_date, &now.timezone())?;
        let next = schedule::catch_up(start, new.frequency, now)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO subscriptions (user_id, name, amount, category, start_date, frequency_days, next_payment_date, remind_days_before)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                new.user_id,
                new.name.trim(),
                new.amount,
                new.category,
                new.start_date.format(DATE_FORMAT).to_string(),
                i64::from(new.frequency.days()),
                next.timestamp_millis(),
                new.remind_days_before,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!(
            id,
            name = %new.name,
            next = %schedule::format_date(&next),
            "Inserted subscription"
        );
        Ok(id)
    }

    /// Get a subscription by ID
    pub fn get_subscription(&self, id: i64) -> Result<Option<Subscription>> {
        let conn = self.conn()?;
        let sub = conn
            .query_row(
                &format!("SELECT {} FROM subscriptions WHERE id = ?", SUBSCRIPTION_COLUMNS),
                params![id],
                row_to_subscription,
            )
            .optional()?;
        Ok(sub)
    }

    /// List subscriptions, optionally for one user, soonest payment first
    pub fn list_subscriptions(&self, user_id: Option<i64>) -> Result<Vec<Subscription>> {
        self.query_subscriptions("(?1 IS NULL OR user_id = ?1)", params![user_id])
    }

    /// Subscriptions whose name contains `query` (case-insensitive)
    pub fn search_subscriptions(
        &self,
        user_id: Option<i64>,
        query: &str,
    ) -> Result<Vec<Subscription>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list_subscriptions(user_id);
        }

        // Filtered in Rust so that non-ASCII names fold case too
        Ok(self
            .list_subscriptions(user_id)?
            .into_iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Subscriptions with a payment due at or before `until`
    pub fn upcoming_payments(
        &self,
        user_id: Option<i64>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Subscription>> {
        self.query_subscriptions(
            "(?1 IS NULL OR user_id = ?1) AND next_payment_date <= ?2",
            params![user_id, until.timestamp_millis()],
        )
    }

    /// Subscriptions whose next payment is strictly before `now`
    pub fn overdue_subscriptions(
        &self,
        user_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>> {
        self.query_subscriptions(
            "(?1 IS NULL OR user_id = ?1) AND next_payment_date < ?2",
            params![user_id, now.timestamp_millis()],
        )
    }

    fn query_subscriptions(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Subscription>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM subscriptions WHERE {} ORDER BY next_payment_date ASC, id ASC",
            SUBSCRIPTION_COLUMNS, filter
        ))?;

        let subscriptions = stmt
            .query_map(params, row_to_subscription)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(subscriptions)
    }

    /// Overwrite the next payment date of a subscription
    pub fn update_next_payment_date<Tz: TimeZone>(
        &self,
        id: i64,
        next_payment_date: &DateTime<Tz>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE subscriptions SET next_payment_date = ? WHERE id = ?",
            params![next_payment_date.timestamp_millis(), id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Subscription {}", id)));
        }
        Ok(())
    }

    /// Record the current payment as paid and advance one cadence step
    ///
    /// Calendar arithmetic happens in `tz`. Returns the new next payment date.
    pub fn mark_payment_completed<Tz: TimeZone>(&self, id: i64, tz: &Tz) -> Result<DateTime<Utc>> {
        let sub = self
            .get_subscription(id)?
            .ok_or_else(|| Error::NotFound(format!("Subscription {}", id)))?;

        let current = sub.next_payment_date.with_timezone(tz);
        let next = schedule::advance(&current, sub.frequency)?;
        self.update_next_payment_date(id, &next)?;

        info!(
            id,
            name = %sub.name,
            next = %schedule::format_date(&next),
            "Marked payment completed"
        );
        Ok(next.with_timezone(&Utc))
    }

    /// Advance every overdue subscription to its first payment on or after `now`
    ///
    /// Returns the number of subscriptions updated.
    pub fn refresh_overdue_payments<Tz: TimeZone>(
        &self,
        user_id: Option<i64>,
        now: &DateTime<Tz>,
    ) -> Result<usize> {
        let tz = now.timezone();
        let overdue = self.overdue_subscriptions(user_id, now.with_timezone(&Utc))?;

        for sub in &overdue {
            let current = sub.next_payment_date.with_timezone(&tz);
            let next = schedule::catch_up(current, sub.frequency, now)?;
            self.update_next_payment_date(sub.id, &next)?;
            debug!(
                id = sub.id,
                next = %schedule::format_date(&next),
                "Advanced overdue payment"
            );
        }

        if !overdue.is_empty() {
            info!(count = overdue.len(), "Refreshed overdue payment dates");
        }
        Ok(overdue.len())
    }

    /// Delete a subscription
    pub fn delete_subscription(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM subscriptions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Subscription {}", id)));
        }
        info!(id, "Deleted subscription");
        Ok(())
    }

    /// Delete all subscriptions of one user, returning how many were removed
    pub fn clear_user(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM subscriptions WHERE user_id = ?",
            params![user_id],
        )?;
        info!(user_id, deleted, "Cleared user subscriptions");
        Ok(deleted)
    }

    /// Delete every subscription
    pub fn clear_all(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM subscriptions", [])?;
        info!(deleted, "Cleared all subscriptions");
        Ok(deleted)
    }
}
