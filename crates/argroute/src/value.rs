//! Converted argument values
//!
//! Every bound parameter and option ends up as one `Value`. Built-in
//! converters produce the variant matching their type name; custom converters
//! may return any variant.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

/// Supported value types for bound arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    SByte(i8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
    Guid(Uuid),
    DateTime(DateTime<FixedOffset>),
    TimeSpan(Duration),
    Date(NaiveDate),
    Time(NaiveTime),
    Uri(Url),
    File(PathBuf),
    Directory(PathBuf),
    IpAddress(IpAddr),
    /// Catch-all and repeated option values
    List(Vec<Value>),
    /// Absent optional parameter or option value
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widens any signed or unsigned integer variant that fits into `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(n) => Some(n.into()),
            Value::SByte(n) => Some(n.into()),
            Value::Short(n) => Some(n.into()),
            Value::UShort(n) => Some(n.into()),
            Value::Int(n) => Some(n.into()),
            Value::UInt(n) => Some(n.into()),
            Value::Long(n) => Some(n),
            Value::ULong(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(n) => Some(n.into()),
            Value::Double(n) => Some(n),
            _ => self.as_i64().map(|n| n as f64),
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Byte(n) => write!(f, "{}", n),
            Value::SByte(n) => write!(f, "{}", n),
            Value::Short(n) => write!(f, "{}", n),
            Value::UShort(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::ULong(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Decimal(n) => write!(f, "{}", n),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => f.write_str(s),
            Value::Guid(g) => write!(f, "{}", g),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::TimeSpan(d) => write_timespan(f, d),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::Uri(u) => write!(f, "{}", u),
            Value::File(p) | Value::Directory(p) => write!(f, "{}", p.display()),
            Value::IpAddress(ip) => write!(f, "{}", ip),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Null => Ok(()),
        }
    }
}

/// Renders `[-][d.]hh:mm:ss[.mmm]`, the same shape the timespan converter reads
fn write_timespan(f: &mut fmt::Formatter<'_>, d: &Duration) -> fmt::Result {
    let negative = *d < Duration::zero();
    let total_ms = d.num_milliseconds().unsigned_abs();
    let (secs, ms) = (total_ms / 1000, total_ms % 1000);
    let (days, hours) = (secs / 86_400, (secs / 3600) % 24);
    let (minutes, seconds) = ((secs / 60) % 60, secs % 60);

    if negative {
        f.write_str("-")?;
    }
    if days > 0 {
        write!(f, "{}.", days)?;
    }
    write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
    if ms > 0 {
        write!(f, ".{:03}", ms)?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Typed extraction from a bound [`Value`]
///
/// Used by [`RouteMatch::get`](crate::RouteMatch::get) so handlers can pull
/// out native types without matching on variants.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value_variant {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_value_variant!(bool, Bool);
from_value_variant!(u8, Byte);
from_value_variant!(i8, SByte);
from_value_variant!(i16, Short);
from_value_variant!(u16, UShort);
from_value_variant!(i32, Int);
from_value_variant!(u32, UInt);
from_value_variant!(u64, ULong);
from_value_variant!(f32, Float);
from_value_variant!(char, Char);
from_value_variant!(String, String);
from_value_variant!(Decimal, Decimal);
from_value_variant!(Uuid, Guid);
from_value_variant!(DateTime<FixedOffset>, DateTime);
from_value_variant!(Duration, TimeSpan);
from_value_variant!(NaiveDate, Date);
from_value_variant!(NaiveTime, Time);
from_value_variant!(Url, Uri);
from_value_variant!(IpAddr, IpAddress);

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for PathBuf {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::File(p) | Value::Directory(p) => Some(p.clone()),
            Value::String(s) => Some(PathBuf::from(s)),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}
