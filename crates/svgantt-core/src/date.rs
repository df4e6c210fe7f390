//! Date arithmetic for timeline layout
//!
//! All values are naive local date-times. Every function is pure: inputs are
//! taken by value (`NaiveDateTime` is `Copy`) and a new value is returned.
//!
//! Month and year differences are approximate (30 and 365 days); additions are
//! calendar-correct and normalize overflowing components, so that adding one
//! month to January 31st lands in early March rather than being clamped.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
const MS_PER_MONTH: i64 = 30 * MS_PER_DAY;
const MS_PER_YEAR: i64 = 365 * MS_PER_DAY;

/// Default pattern used by [`to_string`] with time
pub const FULL_PATTERN: &str = "YYYY-MM-DD HH:mm:ss.SSS";

// ============================================================================
// Units and languages
// ============================================================================

/// Granularity for [`diff`], [`add`] and [`start_of`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = s.trim().to_ascii_lowercase();
        let unit = unit.strip_suffix('s').unwrap_or(&unit);
        match unit {
            "millisecond" => Ok(Self::Millisecond),
            "second" => Ok(Self::Second),
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(ConfigError::InvalidOption(format!("unknown time unit '{}'", s))),
        }
    }
}

/// Language used for month names
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    Ja,
    En,
}

const MONTHS_JA: [&str; 12] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_EN_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::En => "en",
        }
    }

    /// Full month name for a zero-based month
    pub fn month_name(self, month0: u32) -> &'static str {
        let i = (month0 % 12) as usize;
        match self {
            Self::Ja => MONTHS_JA[i],
            Self::En => MONTHS_EN[i],
        }
    }

    /// Abbreviated month name for a zero-based month
    pub fn month_abbrev(self, month0: u32) -> &'static str {
        let i = (month0 % 12) as usize;
        match self {
            Self::Ja => MONTHS_JA[i],
            Self::En => MONTHS_EN_SHORT[i],
        }
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ja" => Ok(Self::Ja),
            "en" => Ok(Self::En),
            other => Err(ConfigError::UnsupportedLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Input dates
// ============================================================================

/// A date as supplied on a task record: either already resolved or text to parse
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Resolved(NaiveDateTime),
    Text(String),
}

impl DateInput {
    /// Resolve to a date-time; unparsable text yields `None`
    pub fn resolve(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Resolved(d) => Some(*d),
            Self::Text(s) => parse(s),
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(d: NaiveDateTime) -> Self {
        Self::Resolved(d)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        Self::Resolved(midnight(d))
    }
}

// ============================================================================
// Parsing and formatting
// ============================================================================

/// Parse `YYYY-MM-DD[ HH:mm:ss[.SSS]]` with the default separators
pub fn parse(value: &str) -> Option<NaiveDateTime> {
    parse_with(value, '-', &[':', '.'])
}

/// Parse a date string with custom date and time separators.
///
/// The date and time halves are split on the first space (or `T`). Returns
/// `None` for empty or unrecognized input instead of failing.
pub fn parse_with(value: &str, date_sep: char, time_seps: &[char]) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (date_part, time_part) = match value.find([' ', 'T']) {
        Some(i) => (&value[..i], Some(value[i + 1..].trim())),
        None => (value, None),
    };

    let date_parts: Vec<i64> = date_part
        .split(date_sep)
        .map(|p| p.trim().parse::<i64>().ok())
        .collect::<Option<_>>()?;
    let [year, month, day] = date_parts[..] else {
        return None;
    };
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;

    let time = match time_part.filter(|t| !t.is_empty()) {
        None => NaiveTime::default(),
        Some(t) => parse_time(t, time_seps)?,
    };

    Some(date.and_time(time))
}

fn parse_time(value: &str, seps: &[char]) -> Option<NaiveTime> {
    let parts: Vec<&str> = value.split(|c| seps.contains(&c)).collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }

    let number = |i: usize| -> Option<u32> {
        parts.get(i).map_or(Some(0), |p| p.trim().parse::<u32>().ok())
    };
    let hour = number(0)?;
    let minute = number(1)?;
    let second = number(2)?;
    let milli = match parts.get(3) {
        // fractional seconds: "5" is half a second, "005" is five milliseconds
        Some(frac) => {
            let frac: f64 = format!("0.{}", frac.trim()).parse().ok()?;
            (frac * 1000.0).round() as u32
        }
        None => 0,
    };

    NaiveTime::from_hms_milli_opt(hour, minute, second, milli.min(999))
}

/// Format a date with a token pattern, resolving the language tag first.
///
/// Fails for a language tag other than `ja` or `en`.
pub fn format(date: NaiveDateTime, pattern: &str, language: &str) -> Result<String, ConfigError> {
    let language: Language = language.parse()?;
    Ok(format_with(date, pattern, language))
}

const TOKENS: [&str; 10] = ["YYYY", "MMMM", "SSS", "MMM", "MM", "DD", "HH", "mm", "ss", "D"];

/// Format a date with a token pattern.
///
/// Tokens are matched longest-first at every position, so `MMMM` is never
/// consumed as `MM` + `MM` and `DD` is never read as two `D`s.
pub fn format_with(date: NaiveDateTime, pattern: &str, language: Language) -> String {
    let month0 = date.month0();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while !rest.is_empty() {
        match TOKENS.iter().find(|token| rest.starts_with(**token)) {
            Some(token) => {
                match *token {
                    "YYYY" => out.push_str(&format!("{:04}", date.year())),
                    "MMMM" => out.push_str(language.month_name(month0)),
                    "MMM" => out.push_str(language.month_abbrev(month0)),
                    "MM" => out.push_str(&format!("{:02}", month0 + 1)),
                    "DD" | "D" => out.push_str(&format!("{:02}", date.day())),
                    "HH" => out.push_str(&format!("{:02}", date.hour())),
                    "mm" => out.push_str(&format!("{:02}", date.minute())),
                    "ss" => out.push_str(&format!("{:02}", date.second())),
                    "SSS" => out.push_str(&format!("{:03}", millisecond(date))),
                    _ => {}
                }
                rest = &rest[token.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    out
}

/// `YYYY-MM-DD`, optionally followed by ` HH:mm:ss.SSS`
pub fn to_string(date: NaiveDateTime, with_time: bool) -> String {
    let pattern = if with_time { FULL_PATTERN } else { "YYYY-MM-DD" };
    format_with(date, pattern, Language::Ja)
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Whole units between `a` and `b` (`a - b`), truncated toward zero
pub fn diff(a: NaiveDateTime, b: NaiveDateTime, unit: TimeUnit) -> i64 {
    let ms = (a - b).num_milliseconds();
    let per = match unit {
        TimeUnit::Millisecond => 1,
        TimeUnit::Second => MS_PER_SECOND,
        TimeUnit::Minute => MS_PER_MINUTE,
        TimeUnit::Hour => MS_PER_HOUR,
        TimeUnit::Day => MS_PER_DAY,
        TimeUnit::Month => MS_PER_MONTH,
        TimeUnit::Year => MS_PER_YEAR,
    };
    ms / per
}

/// Fractional hours between `a` and `b` (`a - b`)
pub fn diff_hours_f64(a: NaiveDateTime, b: NaiveDateTime) -> f64 {
    (a - b).num_milliseconds() as f64 / MS_PER_HOUR as f64
}

/// Offset a date by `amount` units
pub fn add(date: NaiveDateTime, amount: i64, unit: TimeUnit) -> NaiveDateTime {
    let mut values = date_values(date);
    let slot = match unit {
        TimeUnit::Year => 0,
        TimeUnit::Month => 1,
        TimeUnit::Day => 2,
        TimeUnit::Hour => 3,
        TimeUnit::Minute => 4,
        TimeUnit::Second => 5,
        TimeUnit::Millisecond => 6,
    };
    values[slot] = values[slot].saturating_add(amount);

    from_values(values).unwrap_or_else(|| saturate(amount))
}

/// Zero every component at or below `unit`
pub fn start_of(date: NaiveDateTime, unit: TimeUnit) -> NaiveDateTime {
    let [year, month0, day, hour, minute, second, milli] = date_values(date);
    let values = [
        year,
        if unit >= TimeUnit::Year { 0 } else { month0 },
        if unit >= TimeUnit::Month { 1 } else { day },
        if unit >= TimeUnit::Day { 0 } else { hour },
        if unit >= TimeUnit::Hour { 0 } else { minute },
        if unit >= TimeUnit::Minute { 0 } else { second },
        if unit >= TimeUnit::Second { 0 } else { milli },
    ];
    from_values(values).unwrap_or(date)
}

/// Days in the month containing `date` (Gregorian leap years)
pub fn days_in_month(date: NaiveDateTime) -> u32 {
    const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let month0 = date.month0();
    if month0 != 1 {
        return DAYS[month0 as usize];
    }
    let year = date.year();
    if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
        29
    } else {
        28
    }
}

/// `[year, month0, day, hour, minute, second, millisecond]`
pub fn date_values(date: NaiveDateTime) -> [i64; 7] {
    [
        i64::from(date.year()),
        i64::from(date.month0()),
        i64::from(date.day()),
        i64::from(date.hour()),
        i64::from(date.minute()),
        i64::from(date.second()),
        i64::from(millisecond(date)),
    ]
}

/// True when the time-of-day components are all zero
pub fn is_midnight(date: NaiveDateTime) -> bool {
    date_values(date)[3..].iter().all(|v| *v == 0)
}

/// Local midnight today
pub fn today() -> NaiveDateTime {
    midnight(chrono::Local::now().date_naive())
}

/// Local wall-clock time now
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

fn millisecond(date: NaiveDateTime) -> u32 {
    (date.nanosecond() / 1_000_000).min(999)
}

/// Build a date from possibly-overflowing components, carrying excess
/// months into years and excess days/hours/minutes into later dates.
fn from_values(values: [i64; 7]) -> Option<NaiveDateTime> {
    let [year, month0, day, hour, minute, second, milli] = values;
    let total_months = year.checked_mul(12)?.checked_add(month0)?;
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(total_months.div_euclid(12)).ok()?,
        total_months.rem_euclid(12) as u32 + 1,
        1,
    )?;

    let offset_ms = day
        .checked_sub(1)?
        .checked_mul(MS_PER_DAY)?
        .checked_add(hour.checked_mul(MS_PER_HOUR)?)?
        .checked_add(minute.checked_mul(MS_PER_MINUTE)?)?
        .checked_add(second.checked_mul(MS_PER_SECOND)?)?
        .checked_add(milli)?;

    midnight(first).checked_add_signed(Duration::milliseconds(offset_ms))
}

fn saturate(direction: i64) -> NaiveDateTime {
    if direction < 0 {
        midnight(NaiveDate::MIN)
    } else {
        midnight(NaiveDate::MAX)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parse_date_only() {
        assert_eq!(parse("2024-03-05"), Some(dt(2024, 3, 5, 0, 0, 0)));
    }

    #[test]
    fn parse_with_time_and_millis() {
        let d = parse("2024-03-05 13:45:10.250").unwrap();
        assert_eq!(date_values(d), [2024, 2, 5, 13, 45, 10, 250]);
    }

    #[test]
    fn parse_iso_separator() {
        assert_eq!(parse("2024-03-05T08:30"), Some(dt(2024, 3, 5, 8, 30, 0)));
    }

    #[test]
    fn parse_custom_separators() {
        assert_eq!(
            parse_with("2024/03/05 08.30", '/', &['.']),
            Some(dt(2024, 3, 5, 8, 30, 0))
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("not a date"), None);
        assert_eq!(parse("2024-13-01"), None);
        assert_eq!(parse("2024-02-30"), None);
        assert_eq!(parse("2024-01"), None);
        assert_eq!(parse("2024-01-01 25:00"), None);
    }

    #[test]
    fn resolved_input_is_returned_unchanged() {
        let d = dt(2020, 6, 1, 12, 0, 0);
        assert_eq!(DateInput::Resolved(d).resolve(), Some(d));
    }

    #[test]
    fn date_input_deserializes_both_forms() {
        let text: DateInput = serde_json::from_str("\"2024-01-01\"").unwrap();
        assert_eq!(text, DateInput::Text("2024-01-01".into()));

        let resolved: DateInput = serde_json::from_str("\"2024-01-01T10:00:00\"").unwrap();
        assert_eq!(resolved, DateInput::Resolved(dt(2024, 1, 1, 10, 0, 0)));
    }

    #[test]
    fn format_full_pattern() {
        let d = parse("2024-03-05 07:08:09.010").unwrap();
        assert_eq!(format_with(d, FULL_PATTERN, Language::Ja), "2024-03-05 07:08:09.010");
    }

    #[test]
    fn format_month_names_longest_token_first() {
        let d = dt(2024, 3, 5, 0, 0, 0);
        assert_eq!(format_with(d, "D MMMM", Language::En), "05 March");
        assert_eq!(format_with(d, "D MMM", Language::En), "05 Mar");
        assert_eq!(format_with(d, "MMMM", Language::Ja), "3月");
        assert_eq!(format_with(d, "DD/MM/YYYY", Language::Ja), "05/03/2024");
    }

    #[test]
    fn format_keeps_literal_text() {
        let d = dt(2024, 12, 25, 18, 0, 0);
        assert_eq!(format_with(d, "YYYY年 HH時", Language::Ja), "2024年 18時");
    }

    #[test]
    fn format_rejects_unknown_language() {
        let d = dt(2024, 1, 1, 0, 0, 0);
        assert_eq!(
            format(d, "YYYY", "fr"),
            Err(ConfigError::UnsupportedLanguage("fr".into()))
        );
        assert_eq!(format(d, "YYYY", "ja").unwrap(), "2024");
    }

    #[test]
    fn diff_truncates_toward_zero() {
        let a = dt(2024, 1, 1, 0, 0, 0);
        let b = dt(2024, 1, 2, 12, 0, 0);
        assert_eq!(diff(b, a, TimeUnit::Day), 1);
        assert_eq!(diff(a, b, TimeUnit::Day), -1);
        assert_eq!(diff(b, a, TimeUnit::Hour), 36);
        assert_eq!(diff(a, b, TimeUnit::Hour), -36);
    }

    #[test]
    fn diff_month_and_year_are_approximate() {
        let a = dt(2024, 1, 1, 0, 0, 0);
        assert_eq!(diff(dt(2024, 1, 31, 0, 0, 0), a, TimeUnit::Month), 1);
        assert_eq!(diff(dt(2024, 1, 30, 0, 0, 0), a, TimeUnit::Month), 0);
        assert_eq!(diff(dt(2025, 1, 1, 0, 0, 0), a, TimeUnit::Year), 1);
        assert_eq!(diff(dt(2024, 12, 30, 0, 0, 0), a, TimeUnit::Year), 0);
    }

    #[test]
    fn add_is_non_mutating_and_calendar_correct() {
        let d = dt(2024, 1, 31, 10, 0, 0);
        let next = add(d, 1, TimeUnit::Month);
        // February 2024 has 29 days: Jan 31 + 1 month overflows to Mar 2
        assert_eq!(next, dt(2024, 3, 2, 10, 0, 0));
        assert_eq!(d, dt(2024, 1, 31, 10, 0, 0));
    }

    #[test]
    fn add_negative_and_hour_overflow() {
        let d = dt(2024, 1, 1, 0, 0, 0);
        assert_eq!(add(d, -2, TimeUnit::Day), dt(2023, 12, 30, 0, 0, 0));
        assert_eq!(add(d, 30, TimeUnit::Hour), dt(2024, 1, 2, 6, 0, 0));
        assert_eq!(add(d, -1, TimeUnit::Month), dt(2023, 12, 1, 0, 0, 0));
        assert_eq!(add(d, 1, TimeUnit::Year), dt(2025, 1, 1, 0, 0, 0));
        assert_eq!(add(d, 1500, TimeUnit::Millisecond), dt(2024, 1, 1, 0, 0, 1) + Duration::milliseconds(500));
    }

    #[test]
    fn start_of_zeroes_lower_components() {
        let d = parse("2024-05-17 13:45:10.250").unwrap();
        assert_eq!(start_of(d, TimeUnit::Year), dt(2024, 1, 1, 0, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Month), dt(2024, 5, 1, 0, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Day), dt(2024, 5, 17, 0, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Hour), dt(2024, 5, 17, 13, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Second), dt(2024, 5, 17, 13, 45, 10));
        assert_eq!(start_of(d, TimeUnit::Millisecond), d);
    }

    #[test]
    fn days_in_month_leap_rule() {
        assert_eq!(days_in_month(dt(2024, 2, 10, 0, 0, 0)), 29);
        assert_eq!(days_in_month(dt(2023, 2, 10, 0, 0, 0)), 28);
        assert_eq!(days_in_month(dt(1900, 2, 1, 0, 0, 0)), 28);
        assert_eq!(days_in_month(dt(2000, 2, 1, 0, 0, 0)), 29);
        assert_eq!(days_in_month(dt(2023, 4, 1, 0, 0, 0)), 30);
        assert_eq!(days_in_month(dt(2023, 12, 1, 0, 0, 0)), 31);
    }

    #[test]
    fn time_unit_from_str_accepts_plurals() {
        assert_eq!("hours".parse::<TimeUnit>().unwrap(), TimeUnit::Hour);
        assert_eq!("Day".parse::<TimeUnit>().unwrap(), TimeUnit::Day);
        assert!("fortnight".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn to_string_with_and_without_time() {
        let d = dt(2024, 1, 9, 5, 6, 7);
        assert_eq!(to_string(d, false), "2024-01-09");
        assert_eq!(to_string(d, true), "2024-01-09 05:06:07.000");
    }

    #[test]
    fn midnight_detection() {
        assert!(is_midnight(dt(2024, 1, 1, 0, 0, 0)));
        assert!(!is_midnight(dt(2024, 1, 1, 0, 0, 1)));
    }
}
