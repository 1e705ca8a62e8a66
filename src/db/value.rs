//! Conversion of raw result cells into the closed set of values that leave
//! the process. Everything here is pure so it can be tested without a server.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Number;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A cell as the driver hands it over, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    Null,
    String(String),
    Number(Number),
    Boolean(bool),
}

impl NormalizedValue {
    /// Text form used where a catalog column is read as a string.
    pub fn into_text(self) -> Option<String> {
        match self {
            NormalizedValue::Null => None,
            NormalizedValue::String(value) => Some(value),
            NormalizedValue::Number(value) => Some(value.to_string()),
            NormalizedValue::Boolean(value) => Some(value.to_string()),
        }
    }
}

pub fn normalize(value: NativeValue) -> NormalizedValue {
    match value {
        NativeValue::Null => NormalizedValue::Null,
        NativeValue::Text(text) => NormalizedValue::String(text),
        NativeValue::Bytes(bytes) => {
            NormalizedValue::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        NativeValue::Int(value) => NormalizedValue::Number(value.into()),
        NativeValue::UInt(value) => NormalizedValue::Number(value.into()),
        NativeValue::Float(value) => Number::from_f64(value)
            .map(NormalizedValue::Number)
            .unwrap_or_else(|| NormalizedValue::String(value.to_string())),
        NativeValue::Bool(value) => NormalizedValue::Boolean(value),
        NativeValue::Timestamp(value) => {
            NormalizedValue::String(value.format(TIMESTAMP_FORMAT).to_string())
        }
        NativeValue::Date(value) => NormalizedValue::String(
            value
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default()
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        ),
    }
}

/// Interprets the text-protocol bytes of one cell according to the MySQL
/// type name reported for its column (`BIGINT UNSIGNED`, `DATETIME`, ...).
/// `None` is SQL NULL. Dates that do not parse (zero dates) pass through as
/// text; numbers that do not parse are an error.
pub fn decode_cell(type_name: &str, bytes: Option<&[u8]>) -> Result<NativeValue, String> {
    let Some(bytes) = bytes else {
        return Ok(NativeValue::Null);
    };
    let text = || String::from_utf8_lossy(bytes).into_owned();
    let (base, unsigned) = match type_name.strip_suffix(" UNSIGNED") {
        Some(base) => (base, true),
        None => (type_name, false),
    };

    let value = match base {
        "BOOLEAN" => NativeValue::Bool(bytes != b"0"),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            let raw = text();
            if unsigned {
                NativeValue::UInt(raw.parse().map_err(|err| format!("{raw:?}: {err}"))?)
            } else {
                NativeValue::Int(raw.parse().map_err(|err| format!("{raw:?}: {err}"))?)
            }
        }
        "FLOAT" | "DOUBLE" => {
            let raw = text();
            NativeValue::Float(raw.parse().map_err(|err| format!("{raw:?}: {err}"))?)
        }
        "DATETIME" => {
            let raw = text();
            parse_datetime(&raw).map_or(NativeValue::Text(raw), NativeValue::Timestamp)
        }
        "TIMESTAMP" => {
            let raw = text();
            parse_datetime(&raw)
                .map(utc_to_local)
                .map_or(NativeValue::Text(raw), NativeValue::Timestamp)
        }
        "DATE" => {
            let raw = text();
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_or(NativeValue::Text(raw), NativeValue::Date)
        }
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => NativeValue::Bytes(bytes.to_vec()),
        _ => NativeValue::Text(text()),
    };
    Ok(value)
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok()
}

/// Sessions run with a UTC time zone, so TIMESTAMP cells arrive in UTC.
fn utc_to_local(value: NaiveDateTime) -> NaiveDateTime {
    Utc.from_utc_datetime(&value)
        .with_timezone(&Local)
        .naive_local()
}
