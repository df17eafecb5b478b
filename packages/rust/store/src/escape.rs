//! SPARQL term escaping, driven by the profile value kinds.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use besluitpub_extraction::ValueKind;
use besluitpub_rdf::vocab::{XSD_BOOLEAN, XSD_DATE, XSD_DATE_TIME, XSD_INTEGER};
use besluitpub_shared::{PublicatieError, Result};

/// Escape an IRI for use in a query.
pub fn escape_uri(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('<');
    for c in value.chars() {
        match c {
            '\\' | '"' | '<' | '>' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped.push('>');
    escaped
}

/// Escape a plain string literal. Triple-quoted so multi-line snippet
/// content passes through untouched.
pub fn escape_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"\"\"{escaped}\"\"\"")
}

pub fn escape_int(value: &str) -> Result<String> {
    let parsed: i64 = value.trim().parse().map_err(|_| {
        PublicatieError::validation(format!("not an integer literal: {value:?}"))
    })?;
    Ok(format!("\"{parsed}\"^^{}", escape_uri(XSD_INTEGER)))
}

/// `"true"` is true, anything else is false, as it always has been.
pub fn escape_bool(value: &str) -> String {
    let parsed = value.trim() == "true";
    format!("\"{parsed}\"^^{}", escape_uri(XSD_BOOLEAN))
}

pub fn escape_date(value: &str) -> Result<String> {
    let date = parse_date(value.trim()).ok_or_else(|| {
        PublicatieError::validation(format!("not a date literal: {value:?}"))
    })?;
    Ok(format!(
        "\"{}\"^^{}",
        date.format("%Y-%m-%d"),
        escape_uri(XSD_DATE)
    ))
}

pub fn escape_datetime(value: &str) -> Result<String> {
    let value = value.trim();
    // Offset-carrying timestamps first, then the naive form editors emit.
    let formatted = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_rfc3339())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        })
        .map_err(|_| {
            PublicatieError::validation(format!("not a dateTime literal: {value:?}"))
        })?;
    Ok(format!("\"{formatted}\"^^{}", escape_uri(XSD_DATE_TIME)))
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.date_naive())
                .ok()
        })
}

/// Serialize an object term according to its profile kind.
pub fn escape_object(kind: ValueKind, value: &str) -> Result<String> {
    match kind {
        ValueKind::Uri => Ok(escape_uri(value)),
        ValueKind::Text => Ok(escape_string(value)),
        ValueKind::Int => escape_int(value),
        ValueKind::Bool => Ok(escape_bool(value)),
        ValueKind::Date => escape_date(value),
        ValueKind::DateTime => escape_datetime(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_escaping_brackets_and_specials() {
        assert_eq!(escape_uri("urn:s1"), "<urn:s1>");
        assert_eq!(escape_uri("http://x/\"a\""), "<http://x/\\\"a\\\">");
    }

    #[test]
    fn string_escaping_keeps_newlines() {
        let escaped = escape_string("regel 1\nregel \"2\"");
        assert_eq!(escaped, "\"\"\"regel 1\nregel \\\"2\\\"\"\"\"");
    }

    #[test]
    fn int_escaping_validates() {
        assert_eq!(
            escape_int("7").expect("int"),
            format!("\"7\"^^<{XSD_INTEGER}>")
        );
        assert!(escape_int("zeven").is_err());
    }

    #[test]
    fn bool_escaping_is_lenient() {
        assert!(escape_bool("true").starts_with("\"true\""));
        assert!(escape_bool("waar").starts_with("\"false\""));
    }

    #[test]
    fn date_escaping_accepts_date_and_timestamp() {
        assert_eq!(
            escape_date("2021-03-01").expect("date"),
            format!("\"2021-03-01\"^^<{XSD_DATE}>")
        );
        assert!(escape_date("2021-03-01T19:00:00+01:00").is_ok());
        assert!(escape_date("maart").is_err());
    }

    #[test]
    fn datetime_escaping_accepts_naive_and_offset_forms() {
        assert_eq!(
            escape_datetime("2021-03-01T19:00:00").expect("naive"),
            format!("\"2021-03-01T19:00:00\"^^<{XSD_DATE_TIME}>")
        );
        assert!(escape_datetime("2021-03-01T19:00:00+01:00").is_ok());
        assert!(escape_datetime("gisteren").is_err());
    }
}
