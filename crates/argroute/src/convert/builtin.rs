//! Built-in type converters
//!
//! The vocabulary every registry starts from. Numeric types follow Rust's
//! own `FromStr` rules for the matching primitive width; date and time types
//! accept ISO 8601 shapes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use url::Url;
use uuid::Uuid;

use super::Converter;
use crate::Value;

/// Every built-in type-constraint name
pub const BUILTIN_TYPE_NAMES: [&str; 22] = [
    "int",
    "long",
    "double",
    "decimal",
    "bool",
    "byte",
    "sbyte",
    "short",
    "ushort",
    "uint",
    "ulong",
    "float",
    "char",
    "guid",
    "datetime",
    "timespan",
    "dateonly",
    "timeonly",
    "uri",
    "fileinfo",
    "directoryinfo",
    "ipaddress",
];

/// Shared built-in table; registries clone it on creation
pub(crate) static BUILTINS: Lazy<HashMap<String, Converter>> = Lazy::new(|| {
    BUILTIN_TYPE_NAMES
        .iter()
        .filter_map(|name| builtin(name).map(|c| (name.to_string(), c)))
        .collect()
});

fn parsed<T>(raw: &str, wrap: fn(T) -> Value) -> Result<Value, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map(wrap).map_err(|e| e.to_string())
}

/// Looks up a built-in converter by type name
pub fn builtin(name: &str) -> Option<Converter> {
    let converter = match name {
        "int" => Converter::new(name, |raw| parsed(raw, Value::Int)),
        "long" => Converter::new(name, |raw| parsed(raw, Value::Long)),
        "double" => Converter::new(name, |raw| parsed(raw, Value::Double)),
        "float" => Converter::new(name, |raw| parsed(raw, Value::Float)),
        "decimal" => Converter::new(name, |raw| parsed(raw, Value::Decimal)),
        "byte" => Converter::new(name, |raw| parsed(raw, Value::Byte)),
        "sbyte" => Converter::new(name, |raw| parsed(raw, Value::SByte)),
        "short" => Converter::new(name, |raw| parsed(raw, Value::Short)),
        "ushort" => Converter::new(name, |raw| parsed(raw, Value::UShort)),
        "uint" => Converter::new(name, |raw| parsed(raw, Value::UInt)),
        "ulong" => Converter::new(name, |raw| parsed(raw, Value::ULong)),
        "bool" => Converter::new(name, convert_bool),
        "char" => Converter::new(name, convert_char),
        "guid" => Converter::new(name, |raw| {
            Uuid::parse_str(raw).map(Value::Guid).map_err(|e| e.to_string())
        }),
        "datetime" => Converter::new(name, |raw| parse_datetime(raw).map(Value::DateTime)),
        "timespan" => Converter::new(name, |raw| parse_timespan(raw).map(Value::TimeSpan)),
        "dateonly" => Converter::new(name, |raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| e.to_string())
        }),
        "timeonly" => Converter::new(name, |raw| parse_time(raw).map(Value::Time)),
        "uri" => Converter::new(name, |raw| {
            Url::parse(raw).map(Value::Uri).map_err(|e| e.to_string())
        }),
        "fileinfo" => Converter::new(name, |raw| parse_path(raw).map(Value::File)),
        "directoryinfo" => Converter::new(name, |raw| parse_path(raw).map(Value::Directory)),
        "ipaddress" => Converter::new(name, |raw| parsed(raw, Value::IpAddress)),
        _ => return None,
    };
    Some(converter)
}

fn convert_bool(raw: &str) -> Result<Value, String> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err("expected 'true' or 'false'".to_string())
    }
}

fn convert_char(raw: &str) -> Result<Value, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Char(c)),
        _ => Err("expected exactly one character".to_string()),
    }
}

fn parse_path(raw: &str) -> Result<PathBuf, String> {
    if raw.is_empty() {
        Err("path is empty".to_string())
    } else if raw.contains('\0') {
        Err("path contains a NUL character".to_string())
    } else {
        Ok(PathBuf::from(raw))
    }
}

/// RFC 3339 with offset, or a naive date/time read as UTC
fn parse_datetime(raw: &str) -> Result<DateTime<chrono::FixedOffset>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive).into())
        .ok_or_else(|| "expected an ISO 8601 date and time".to_string())
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|e| e.to_string())
}

const SHAPE: &str = "expected [-][d.]hh:mm[:ss[.fraction]]";
const OUT_OF_RANGE: &str = "timespan out of range";

/// Parses `[-]d`, `[-][d.]hh:mm` or `[-][d.]hh:mm:ss[.fraction]`
fn parse_timespan(raw: &str) -> Result<Duration, String> {
    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    fn number(s: &str, max: Option<i64>) -> Result<i64, String> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SHAPE.to_string());
        }
        let n: i64 = s.parse().map_err(|_| SHAPE.to_string())?;
        match max {
            Some(max) if n > max => Err(format!("component {} out of range", n)),
            _ => Ok(n),
        }
    }

    let parts: Vec<&str> = body.split(':').collect();
    let span = match parts.as_slice() {
        [days] => Duration::try_days(number(days, None)?)
            .ok_or_else(|| OUT_OF_RANGE.to_string())?,
        [head, minutes, rest @ ..] if rest.len() <= 1 => {
            let (days, hours) = match head.split_once('.') {
                Some((d, h)) => (number(d, None)?, number(h, Some(23))?),
                None => (0, number(head, Some(23))?),
            };
            let minutes = number(minutes, Some(59))?;

            let (seconds, nanos) = match rest.first() {
                Some(sec) => match sec.split_once('.') {
                    Some((whole, frac)) => {
                        if frac.len() > 9 {
                            return Err(SHAPE.to_string());
                        }
                        let scaled = number(frac, None)? * 10_i64.pow(9 - frac.len() as u32);
                        (number(whole, Some(59))?, scaled)
                    }
                    None => (number(sec, Some(59))?, 0),
                },
                None => (0, 0),
            };

            [
                Duration::try_days(days),
                Duration::try_hours(hours),
                Duration::try_minutes(minutes),
                Duration::try_seconds(seconds),
                Some(Duration::nanoseconds(nanos)),
            ]
            .into_iter()
            .try_fold(Duration::zero(), |total, part| total.checked_add(&part?))
            .ok_or_else(|| OUT_OF_RANGE.to_string())?
        }
        _ => return Err(SHAPE.to_string()),
    };

    Ok(if negative { -span } else { span })
}
