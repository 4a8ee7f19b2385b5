//! Day-key and calendar utilities.
//!
//! A day key is a calendar date encoded as `YYYY-MM-DD` in *local* time. Day
//! keys are the atomic unit for "which day" a task is due or was completed,
//! so everything here works on local wall-clock dates, never UTC. Weeks start
//! on Monday.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Today's date on the device clock (local wall-clock day).
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as a zero-padded `YYYY-MM-DD` day key.
pub fn day_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a `YYYY-MM-DD` day key back into a date.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Offset a date by `n` days (negative moves backward), rolling over
/// month and year boundaries.
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// The Monday of the week containing `date`.
///
/// With Sunday numbered 0, a Sunday maps 6 days back; any other weekday
/// maps `1 - weekday` days forward (i.e. backward).
pub fn start_of_week_monday(date: NaiveDate) -> NaiveDate {
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    if weekday == 0 {
        add_days(date, -6)
    } else {
        add_days(date, 1 - weekday)
    }
}

/// The seven day keys Monday..Sunday of the week containing `date`.
pub fn week_keys_mon_sun(date: NaiveDate) -> [String; 7] {
    let monday = start_of_week_monday(date);
    std::array::from_fn(|i| day_key(add_days(monday, i as i64)))
}

/// Short English weekday label ("Mon".."Sun") for a day key.
///
/// A malformed key yields an empty string.
pub fn label_weekday_en(key: &str) -> String {
    parse_day_key(key)
        .map(|date| WeekdayKey::from_date(date).label().to_string())
        .unwrap_or_default()
}

/// `DD.MM.` label for a day key (zero-padded, trailing period).
///
/// A malformed key yields an empty string.
pub fn label_date(key: &str) -> String {
    parse_day_key(key)
        .map(|date| format!("{:02}.{:02}.", date.day(), date.month()))
        .unwrap_or_default()
}

/// Weekday key used by the weekly plan, Monday-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayKey {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WeekdayKey {
    /// All weekday keys in Monday..Sunday order.
    pub const ALL: [WeekdayKey; 7] = [
        WeekdayKey::Mon,
        WeekdayKey::Tue,
        WeekdayKey::Wed,
        WeekdayKey::Thu,
        WeekdayKey::Fri,
        WeekdayKey::Sat,
        WeekdayKey::Sun,
    ];

    /// The plan key for a date's weekday.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon => WeekdayKey::Mon,
            Weekday::Tue => WeekdayKey::Tue,
            Weekday::Wed => WeekdayKey::Wed,
            Weekday::Thu => WeekdayKey::Thu,
            Weekday::Fri => WeekdayKey::Fri,
            Weekday::Sat => WeekdayKey::Sat,
            Weekday::Sun => WeekdayKey::Sun,
        }
    }

    /// Short English label ("Mon".."Sun").
    pub fn label(&self) -> &'static str {
        match self {
            WeekdayKey::Mon => "Mon",
            WeekdayKey::Tue => "Tue",
            WeekdayKey::Wed => "Wed",
            WeekdayKey::Thu => "Thu",
            WeekdayKey::Fri => "Fri",
            WeekdayKey::Sat => "Sat",
            WeekdayKey::Sun => "Sun",
        }
    }
}

impl fmt::Display for WeekdayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekdayKey::Mon => write!(f, "mon"),
            WeekdayKey::Tue => write!(f, "tue"),
            WeekdayKey::Wed => write!(f, "wed"),
            WeekdayKey::Thu => write!(f, "thu"),
            WeekdayKey::Fri => write!(f, "fri"),
            WeekdayKey::Sat => write!(f, "sat"),
            WeekdayKey::Sun => write!(f, "sun"),
        }
    }
}

impl FromStr for WeekdayKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mon" | "monday" => Ok(WeekdayKey::Mon),
            "tue" | "tuesday" => Ok(WeekdayKey::Tue),
            "wed" | "wednesday" => Ok(WeekdayKey::Wed),
            "thu" | "thursday" => Ok(WeekdayKey::Thu),
            "fri" | "friday" => Ok(WeekdayKey::Fri),
            "sat" | "saturday" => Ok(WeekdayKey::Sat),
            "sun" | "sunday" => Ok(WeekdayKey::Sun),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid weekday '{}'. Expected: mon, tue, wed, thu, fri, sat, sun",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_key_zero_padding() {
        assert_eq!(day_key(date(2024, 3, 5)), "2024-03-05");
        assert_eq!(day_key(date(2024, 12, 31)), "2024-12-31");
    }

    #[test]
    fn test_add_days_rolls_over_boundaries() {
        // Leap day into March
        let leap = parse_day_key("2024-02-29").unwrap();
        assert_eq!(day_key(add_days(leap, 1)), "2024-03-01");

        // Year boundary, both directions
        assert_eq!(day_key(add_days(date(2023, 12, 31), 1)), "2024-01-01");
        assert_eq!(day_key(add_days(date(2024, 1, 1), -1)), "2023-12-31");
    }

    #[test]
    fn test_start_of_week_monday() {
        // 2024-08-21 is a Wednesday; its Monday is 2024-08-19
        assert_eq!(start_of_week_monday(date(2024, 8, 21)), date(2024, 8, 19));
        // A Monday maps to itself
        assert_eq!(start_of_week_monday(date(2024, 8, 19)), date(2024, 8, 19));
        // A Sunday belongs to the week starting 6 days earlier
        assert_eq!(start_of_week_monday(date(2024, 8, 25)), date(2024, 8, 19));
    }

    #[test]
    fn test_week_keys_mon_sun() {
        let keys = week_keys_mon_sun(date(2024, 8, 25)); // Sunday
        assert_eq!(keys.len(), 7);
        assert_eq!(keys[0], "2024-08-19");
        assert_eq!(keys[6], "2024-08-25");

        // Consecutive day keys
        for pair in keys.windows(2) {
            let left = parse_day_key(&pair[0]).unwrap();
            let right = parse_day_key(&pair[1]).unwrap();
            assert_eq!(add_days(left, 1), right);
        }

        // The first key is always a Monday
        let monday = parse_day_key(&keys[0]).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_labels() {
        assert_eq!(label_weekday_en("2024-08-19"), "Mon");
        assert_eq!(label_weekday_en("2024-08-25"), "Sun");
        assert_eq!(label_weekday_en("not-a-key"), "");

        assert_eq!(label_date("2024-08-05"), "05.08.");
        assert_eq!(label_date("2024-12-31"), "31.12.");
        assert_eq!(label_date("garbage"), "");
    }

    #[test]
    fn test_weekday_key_parse_and_display() {
        assert_eq!(WeekdayKey::from_str("mon").unwrap(), WeekdayKey::Mon);
        assert_eq!(WeekdayKey::from_str("Sunday").unwrap(), WeekdayKey::Sun);
        assert!(WeekdayKey::from_str("someday").is_err());
        assert_eq!(WeekdayKey::Wed.to_string(), "wed");
        assert_eq!(WeekdayKey::from_date(date(2024, 8, 24)), WeekdayKey::Sat);
    }
}
