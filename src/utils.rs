// Utility functions
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Date layouts tried in order. Slash dates are read month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// `%Y` also matches one- and two-digit years, which would land in the first century.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

fn four_digit_year(date: NaiveDate) -> Option<NaiveDate> {
    YEAR_RANGE.contains(&date.year()).then_some(date)
}

/// Parses a calendar date from the layouts price exports commonly use.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    let by_date = DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(text, format).ok());
    let by_datetime = DATETIME_FORMATS
        .iter()
        .filter_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|dt| dt.date());
    let by_rfc3339 = DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive());

    by_date
        .chain(by_datetime)
        .chain(by_rfc3339)
        .find_map(four_digit_year)
}

/// Converts a display name to kebab-case for file names.
pub fn to_kebab_case(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
