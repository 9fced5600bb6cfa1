//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Abbreviated month names for the pt-BR display format
const MONTHS_PT_BR: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// The input could not be read as a date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date: {input:?}")]
pub struct FormatError {
    pub input: String,
}

/// Parse a CMS date string into a calendar date
///
/// The date is taken in whatever offset the input carries, so
/// `2021-03-25T23:30:00-0300` stays on the 25th.
pub fn parse_date(input: &str) -> Result<NaiveDate, FormatError> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    // Prismic writes offsets without a colon: 2021-03-25T19:25:28+0000
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.date_naive());
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| FormatError {
        input: input.to_string(),
    })
}

/// Format a date string as `dd Mon yyyy` with pt-BR month names
///
/// # Examples
/// ```ignore
/// format_date("2021-03-25") // -> Ok("25 Mar 2021")
/// ```
pub fn format_date(input: &str) -> Result<String, FormatError> {
    let date = parse_date(input)?;
    Ok(format!(
        "{:02} {} {:04}",
        date.day(),
        MONTHS_PT_BR[date.month0() as usize],
        date.year()
    ))
}

/// Format a date string for a `<time datetime="...">` attribute
pub fn date_xml(input: &str) -> Result<String, FormatError> {
    Ok(parse_date(input)?.format("%Y-%m-%d").to_string())
}
