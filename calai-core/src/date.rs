//! Calendar date keys and the rolling 7-day window.
//!
//! Day logs are keyed by local calendar date. A [`DateKey`] wraps a
//! `NaiveDate`, so the same calendar day always yields the same key no matter
//! what time of day it was derived from.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Format used for keys, e.g. `2025-01-31`.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Number of days on each side of the center in a [`week_window`].
const HALF_WINDOW: i64 = 3;

/// A local calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Key for the local calendar day of `instant`.
    pub fn from_local<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Local).date_naive())
    }

    /// Key for today in the local timezone.
    pub fn today() -> Self {
        Self::from_local(&Local::now())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the key `days` days away (negative moves backwards).
    pub fn offset(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Short weekday name (`Mon`, `Tue`, ...).
    pub fn weekday_short(&self) -> String {
        self.0.format("%a").to_string()
    }

    /// Short display label such as `Jan 31`.
    pub fn short_label(&self) -> String {
        format!("{} {}", self.0.format("%b"), self.0.day())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", s))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The seven keys from `center - 3` to `center + 3`, ascending.
///
/// This is a sliding window around the active date, not an ISO week.
pub fn week_window(center: DateKey) -> [DateKey; 7] {
    let mut window = [center; 7];
    for (slot, offset) in window.iter_mut().zip(-HALF_WINDOW..=HALF_WINDOW) {
        *slot = center.offset(offset);
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime};

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_and_parse() {
        let k = key("2025-01-05");
        assert_eq!(k.to_string(), "2025-01-05");
        assert_eq!(k.date(), NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("2025-13-01".parse::<DateKey>().is_err());
        assert!("yesterday".parse::<DateKey>().is_err());
        let err = "1/2/2025".parse::<DateKey>().unwrap_err();
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_same_day_any_time_same_key() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let early = Local
            .from_local_datetime(&date.and_time(NaiveTime::from_hms_opt(0, 5, 0).unwrap()))
            .earliest()
            .unwrap();
        let late = Local
            .from_local_datetime(&date.and_time(NaiveTime::from_hms_opt(23, 55, 0).unwrap()))
            .earliest()
            .unwrap();
        assert_eq!(DateKey::from_local(&early), DateKey::from_local(&late));
        assert_eq!(DateKey::from_local(&early), DateKey::from_date(date));
    }

    #[test]
    fn test_from_local_converts_foreign_offsets() {
        let plus_fourteen = FixedOffset::east_opt(14 * 3600).unwrap();
        let instant = plus_fourteen.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let expected = instant.with_timezone(&Local).date_naive();
        assert_eq!(DateKey::from_local(&instant).date(), expected);
    }

    #[test]
    fn test_week_window_centered_and_ascending() {
        let window = week_window(key("2025-01-10"));
        let rendered: Vec<String> = window.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "2025-01-07",
                "2025-01-08",
                "2025-01-09",
                "2025-01-10",
                "2025-01-11",
                "2025-01-12",
                "2025-01-13"
            ]
        );
    }

    #[test]
    fn test_week_window_crosses_year_boundary() {
        let window = week_window(key("2025-01-01"));
        assert_eq!(window[0], key("2024-12-29"));
        assert_eq!(window[3], key("2025-01-01"));
        assert_eq!(window[6], key("2025-01-04"));
        assert!(window.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_week_window_leap_day() {
        let window = week_window(key("2024-03-01"));
        assert!(window.contains(&key("2024-02-29")));
        assert_eq!(window[0], key("2024-02-27"));
    }

    #[test]
    fn test_json_uses_string_form() {
        let json = serde_json::to_string(&key("2025-02-03")).unwrap();
        assert_eq!(json, "\"2025-02-03\"");
        let parsed: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key("2025-02-03"));
    }

    #[test]
    fn test_labels() {
        let k = key("2025-01-31");
        assert_eq!(k.weekday_short(), "Fri");
        assert_eq!(k.short_label(), "Jan 31");
    }
}
