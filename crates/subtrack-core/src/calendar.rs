//! Calendar reminder events
//!
//! Builds the recurring event a subscription contributes to a calendar:
//! an RFC 5545 recurrence rule matching the billing cadence, a display
//! reminder ahead of each payment, and an ICS rendering.
//!
//! The event starts at the payment's wall-clock time in the user's zone
//! and is written as a floating local time, so calendar clients expand the
//! rule in local time just like the scheduler does.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::models::{Frequency, Subscription};

/// Recurrence rule for a billing cadence, limited to `count` occurrences
///
/// Cadences outside the named set recur every N days, matching the
/// exact-day advancement used for payment dates.
pub fn recurrence_rule(frequency: Frequency, count: u32) -> String {
    match frequency {
        Frequency::Weekly => format!("FREQ=WEEKLY;COUNT={}", count),
        Frequency::Biweekly => format!("FREQ=WEEKLY;INTERVAL=2;COUNT={}", count),
        Frequency::Monthly => format!("FREQ=MONTHLY;COUNT={}", count),
        Frequency::Quarterly => format!("FREQ=MONTHLY;INTERVAL=3;COUNT={}", count),
        Frequency::Semiannually => format!("FREQ=MONTHLY;INTERVAL=6;COUNT={}", count),
        Frequency::Annually => format!("FREQ=YEARLY;COUNT={}", count),
        Frequency::Custom(days) => {
            format!("FREQ=DAILY;INTERVAL={};COUNT={}", days.get(), count)
        }
    }
}

/// A recurring payment event
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub title: String,
    pub description: String,
    /// Local wall-clock time of the next payment
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub rrule: String,
    /// Alarm lead time before each occurrence
    pub reminder_minutes: u32,
}

impl CalendarEvent {
    /// Event for `sub`, with its start expressed in `tz`
    pub fn for_subscription<Tz: TimeZone>(sub: &Subscription, config: &Config, tz: &Tz) -> Self {
        Self {
            uid: format!("subtrack-{}-{}@subtrack", sub.user_id, sub.id),
            title: format!("Payment: {}", sub.name),
            description: format!("Subscription due: {} - ${:.2}", sub.category, sub.amount),
            start: sub.next_payment_date.with_timezone(tz).naive_local(),
            duration_minutes: config.event_duration_minutes,
            rrule: recurrence_rule(sub.frequency, config.occurrence_count),
            reminder_minutes: config.reminder_lead_minutes,
        }
    }

    /// Render as a single-event VCALENDAR document (CRLF line endings)
    pub fn to_ics(&self, stamp: DateTime<Utc>) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//SubTrack//Payment Reminders//EN".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", ics_timestamp(&stamp)),
            format!("DTSTART:{}", self.start.format("%Y%m%dT%H%M%S")),
            format!("DURATION:PT{}M", self.duration_minutes),
            format!("SUMMARY:{}", escape_text(&self.title)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("RRULE:{}", self.rrule),
            "BEGIN:VALARM".to_string(),
            "ACTION:DISPLAY".to_string(),
            format!("TRIGGER:-PT{}M", self.reminder_minutes),
            format!("DESCRIPTION:{}", escape_text(&self.title)),
            "END:VALARM".to_string(),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        out
    }
}

/// Longest content line in octets, excluding the CRLF
const MAX_LINE_OCTETS: usize = 75;

/// Fold a content line per RFC 5545 section 3.1
///
/// Continuation lines start with a single space, which counts toward their
/// length. Breaks never split a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / 40 * 3);
    let mut width = 0;
    for c in line.chars() {
        if width + c.len_utf8() > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += c.len_utf8();
    }
    out
}

fn ics_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value per RFC 5545 section 3.3.11
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    use crate::schedule;

    fn subscription(frequency: Frequency) -> Subscription {
        Subscription {
            id: 3,
            user_id: 1,
            name: "Music, Family".to_string(),
            amount: 16.5,
            category: "Entertainment".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            frequency,
            next_payment_date: Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap(),
            remind_days_before: 1,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_recurrence_rules() {
        assert_eq!(recurrence_rule(Frequency::Weekly, 60), "FREQ=WEEKLY;COUNT=60");
        assert_eq!(
            recurrence_rule(Frequency::Biweekly, 60),
            "FREQ=WEEKLY;INTERVAL=2;COUNT=60"
        );
        assert_eq!(recurrence_rule(Frequency::Monthly, 12), "FREQ=MONTHLY;COUNT=12");
        assert_eq!(
            recurrence_rule(Frequency::Quarterly, 60),
            "FREQ=MONTHLY;INTERVAL=3;COUNT=60"
        );
        assert_eq!(
            recurrence_rule(Frequency::Semiannually, 60),
            "FREQ=MONTHLY;INTERVAL=6;COUNT=60"
        );
        assert_eq!(recurrence_rule(Frequency::Annually, 5), "FREQ=YEARLY;COUNT=5");
        assert_eq!(
            recurrence_rule(Frequency::from_days(10).unwrap(), 60),
            "FREQ=DAILY;INTERVAL=10;COUNT=60"
        );
    }

    #[test]
    fn test_event_for_subscription() {
        let event = CalendarEvent::for_subscription(&subscription(Frequency::Monthly), &Config::default(), &Utc);

        assert_eq!(event.title, "Payment: Music, Family");
        assert_eq!(event.description, "Subscription due: Entertainment - $16.50");
        assert_eq!(event.rrule, "FREQ=MONTHLY;COUNT=60");
        assert_eq!(event.reminder_minutes, 1440);
        assert_eq!(event.duration_minutes, 60);
        assert_eq!(event.uid, "subtrack-1-3@subtrack");
    }

    #[test]
    fn test_to_ics() {
        let event = CalendarEvent::for_subscription(&subscription(Frequency::Quarterly), &Config::default(), &Utc);
        let stamp = Utc.with_ymd_and_hms(2024, 7, 1, 12, 30, 0).unwrap();
        let ics = event.to_ics(stamp);

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("\r\nDTSTAMP:20240701T123000Z\r\n"));
        assert!(ics.contains("\r\nDTSTART:20240715T000000\r\n"));
        assert!(ics.contains("\r\nDURATION:PT60M\r\n"));
        assert!(ics.contains("\r\nSUMMARY:Payment: Music\\, Family\r\n"));
        assert!(ics.contains("\r\nRRULE:FREQ=MONTHLY;INTERVAL=3;COUNT=60\r\n"));
        assert!(ics.contains("\r\nTRIGGER:-PT1440M\r\n"));
        assert!(!ics.contains("\n\n"));
    }

    #[test]
    fn test_start_uses_local_date_east_of_utc() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_payment = tz.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut sub = subscription(Frequency::Monthly);
        sub.next_payment_date = local_payment.with_timezone(&Utc);

        let event = CalendarEvent::for_subscription(&sub, &Config::default(), &tz);
        assert_eq!(event.start.format("%Y-%m-%d").to_string(), schedule::format_date(&local_payment));

        let ics = event.to_ics(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(ics.contains("\r\nDTSTART:20240301T000000\r\n"));
        assert!(!ics.contains("DTSTART:20240229"));

        // A monthly rule expanded from the local start lands on the scheduler's next date
        let next = schedule::advance(&local_payment, Frequency::Monthly).unwrap();
        assert_eq!(schedule::format_date(&next), "2024-04-01");
        assert_eq!(event.start.date().checked_add_months(chrono::Months::new(1)), Some(next.date_naive()));
    }

    #[test]
    fn test_long_lines_are_folded() {
        let mut sub = subscription(Frequency::Monthly);
        sub.name = "Ünlimited Premium Family Streaming Bundle with Sports, News and Music Add-ons".to_string();
        let event = CalendarEvent::for_subscription(&sub, &Config::default(), &Utc);
        let ics = event.to_ics(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());

        for line in ics.split("\r\n") {
            assert!(line.len() <= 75, "line too long: {:?}", line);
        }

        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("\r\nSUMMARY:{}\r\n", escape_text(&event.title))));
    }

    #[test]
    fn test_fold_line_keeps_short_lines_and_utf8() {
        assert_eq!(fold_line("SUMMARY:short"), "SUMMARY:short");

        let line = format!("SUMMARY:{}", "é".repeat(60));
        let folded = fold_line(&line);
        for part in folded.split("\r\n") {
            assert!(part.len() <= 75);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
    }
}
