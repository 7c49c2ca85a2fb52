//! Domain models for SubTrack

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Billing frequency of a subscription
///
/// Stored and serialized as a day count. The six named cadences map to
/// 7/14/30/90/180/365 days; any other positive count is `Custom`. A
/// `Custom` value can only come from [`Frequency::from_days`], so it never
/// holds zero or a named cadence's day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Semiannually,
    Annually,
    /// Every `n` days, for counts outside the named cadences
    Custom(CustomDays),
}

/// Day count of a custom cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomDays(u32);

impl CustomDays {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Frequency {
    /// All named cadences, shortest first
    pub fn all() -> &'static [Frequency] {
        &[
            Self::Weekly,
            Self::Biweekly,
            Self::Monthly,
            Self::Quarterly,
            Self::Semiannually,
            Self::Annually,
        ]
    }

    /// Build a frequency from a day count, rejecting zero and negatives
    pub fn from_days(days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(Error::InvalidFrequency(days));
        }
        Ok(match days {
            7 => Self::Weekly,
            14 => Self::Biweekly,
            30 => Self::Monthly,
            90 => Self::Quarterly,
            180 => Self::Semiannually,
            365 => Self::Annually,
            n => Self::Custom(CustomDays(
                u32::try_from(n).map_err(|_| Error::InvalidFrequency(n))?,
            )),
        })
    }

    pub fn days(&self) -> u32 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Semiannually => 180,
            Self::Annually => 365,
            Self::Custom(n) => n.get(),
        }
    }

    /// Calendar months per step for month-based cadences
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Semiannually => Some(6),
            Self::Annually => Some(12),
            _ => None,
        }
    }

    /// Payments per year, rounded down for custom cadences
    pub fn renewals_per_year(&self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Biweekly => 26,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Semiannually => 2,
            Self::Annually => 1,
            Self::Custom(n) => 365 / n.get(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Weekly => "Weekly".to_string(),
            Self::Biweekly => "Biweekly".to_string(),
            Self::Monthly => "Monthly".to_string(),
            Self::Quarterly => "Quarterly".to_string(),
            Self::Semiannually => "Semiannually".to_string(),
            Self::Annually => "Annually".to_string(),
            Self::Custom(n) => format!("{} days", n.get()),
        }
    }
}

impl TryFrom<i64> for Frequency {
    type Error = Error;

    fn try_from(days: i64) -> Result<Self> {
        Self::from_days(days)
    }
}

impl From<Frequency> for i64 {
    fn from(frequency: Frequency) -> Self {
        i64::from(frequency.days())
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "semiannually" | "semiannual" => Ok(Self::Semiannually),
            "annually" | "annual" | "yearly" => Ok(Self::Annually),
            other => {
                let days: i64 = other
                    .parse()
                    .map_err(|_| format!("Unknown frequency: {}", s))?;
                Self::from_days(days).map_err(|e| e.to_string())
            }
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A registered user
///
/// The password hash stays in the store; it is never loaded into this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// Normalized to lowercase
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A tracked subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub amount: f64,
    pub category: String,
    /// First billing date as entered by the user
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    /// Upcoming payment instant; advanced when paid or found overdue
    pub next_payment_date: DateTime<Utc>,
    pub remind_days_before: u32,
    pub created_at: DateTime<Utc>,
}

/// A subscription to be inserted
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: i64,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub start_date: NaiveDate,
    pub frequency: Frequency,
    pub remind_days_before: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(days: i64) -> Frequency {
        Frequency::from_days(days).unwrap()
    }

    #[test]
    fn test_frequency_from_days_canonical() {
        assert_eq!(Frequency::from_days(7).unwrap(), Frequency::Weekly);
        assert_eq!(Frequency::from_days(14).unwrap(), Frequency::Biweekly);
        assert_eq!(Frequency::from_days(30).unwrap(), Frequency::Monthly);
        assert_eq!(Frequency::from_days(90).unwrap(), Frequency::Quarterly);
        assert_eq!(Frequency::from_days(180).unwrap(), Frequency::Semiannually);
        assert_eq!(Frequency::from_days(365).unwrap(), Frequency::Annually);
        assert!(matches!(Frequency::from_days(10).unwrap(), Frequency::Custom(d) if d.get() == 10));
    }

    #[test]
    fn test_frequency_rejects_non_positive() {
        assert!(matches!(
            Frequency::from_days(0),
            Err(Error::InvalidFrequency(0))
        ));
        assert!(matches!(
            Frequency::from_days(-7),
            Err(Error::InvalidFrequency(-7))
        ));
    }

    #[test]
    fn test_frequency_days_round_trip() {
        for freq in Frequency::all() {
            assert_eq!(Frequency::from_days(freq.days() as i64).unwrap(), *freq);
        }
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("Yearly".parse::<Frequency>().unwrap(), Frequency::Annually);
        assert_eq!("14".parse::<Frequency>().unwrap(), Frequency::Biweekly);
        assert_eq!("45".parse::<Frequency>().unwrap(), custom(45));
        assert!("0".parse::<Frequency>().is_err());
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_serde_as_days() {
        let json = serde_json::to_string(&Frequency::Quarterly).unwrap();
        assert_eq!(json, "90");

        let parsed: Frequency = serde_json::from_str("21").unwrap();
        assert_eq!(parsed, custom(21));

        assert!(serde_json::from_str::<Frequency>("-1").is_err());
    }

    #[test]
    fn test_renewals_per_year() {
        assert_eq!(Frequency::Weekly.renewals_per_year(), 52);
        assert_eq!(Frequency::Monthly.renewals_per_year(), 12);
        assert_eq!(Frequency::Annually.renewals_per_year(), 1);
        assert_eq!(custom(73).renewals_per_year(), 5);
        assert_eq!(custom(400).renewals_per_year(), 0);
    }

    #[test]
    fn test_custom_never_shadows_named_cadence() {
        for days in [7, 14, 30, 90, 180, 365] {
            let freq = Frequency::from_days(days).unwrap();
            assert!(!matches!(freq, Frequency::Custom(_)), "{} days", days);
            assert_ne!(freq.label(), format!("{} days", days));
        }
    }

    #[test]
    fn test_serde_round_trip_keeps_frequency() {
        let mut all = Frequency::all().to_vec();
        all.extend([custom(1), custom(10), custom(31), custom(400)]);

        for freq in all {
            let json = serde_json::to_string(&freq).unwrap();
            let back: Frequency = serde_json::from_str(&json).unwrap();
            assert_eq!(back, freq);
            assert_eq!(back.label(), freq.label());
        }
    }
}
