//! Decoded values and the closed set of raw wire representations.

use std::net::{Ipv4Addr, Ipv6Addr};

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use ordered_float::OrderedFloat;
use uuid::Uuid;

/**
A raw value as the wire protocol may emit it, before a field has decoded it.

This is the closed set of input representations the decode operation accepts;
which variants a concrete field understands depends on its type.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Raw {
    /// Wire text, or a string the application already holds
    Text(String),
    /// An undecoded byte sequence, expected to be UTF-8 for string-like fields
    Bytes(Vec<u8>),
    /// Integer representation; i128 covers the domain of every integer column
    Int(i128),
    /// Float representation
    Float(f64),
    /// Arbitrary precision decimal representation
    Decimal(BigDecimal),
    /// Native date
    Date(NaiveDate),
    /// Native timestamp
    DateTime(DateTime<Utc>),
    /// Native uuid
    Uuid(Uuid),
    /// Native IPv4 address
    Ipv4(Ipv4Addr),
    /// Native IPv6 address
    Ipv6(Ipv6Addr),
    /// An ordered sequence, accepted by array and tuple fields
    Seq(Vec<Raw>),
    /// A key/value mapping in iteration order, accepted by map fields
    Map(Vec<(Raw, Raw)>),
    /// The absence of a value
    Null,
}

macro_rules! impl_raw_from {
    ($variant:ident, $T:ty) => {
        impl From<$T> for Raw {
            fn from(value: $T) -> Self {
                Raw::$variant(value.into())
            }
        }
    };
}

impl_raw_from!(Text, String);
impl_raw_from!(Text, &str);
impl_raw_from!(Bytes, Vec<u8>);
impl_raw_from!(Int, i8);
impl_raw_from!(Int, i16);
impl_raw_from!(Int, i32);
impl_raw_from!(Int, i64);
impl_raw_from!(Int, i128);
impl_raw_from!(Int, u8);
impl_raw_from!(Int, u16);
impl_raw_from!(Int, u32);
impl_raw_from!(Int, u64);
impl_raw_from!(Float, f32);
impl_raw_from!(Float, f64);
impl_raw_from!(Decimal, BigDecimal);
impl_raw_from!(Date, NaiveDate);
impl_raw_from!(DateTime, DateTime<Utc>);
impl_raw_from!(Uuid, Uuid);
impl_raw_from!(Ipv4, Ipv4Addr);
impl_raw_from!(Ipv6, Ipv6Addr);

/**
A decoded, language native value.

Fields produce these from [Raw] input and encode them back to wire text.
Floats are wrapped in [OrderedFloat] so values are `Eq` and usable in null
value sets.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A UTF-8 string
    String(String),
    /// Any integer column's value; validation narrows it to the column width
    Int(i128),
    /// A float column's value
    Float(OrderedFloat<f64>),
    /// A decimal column's value, normalized to the column's scale
    Decimal(BigDecimal),
    /// A date column's value
    Date(NaiveDate),
    /// A timestamp, always timezone aware (UTC)
    DateTime(DateTime<Utc>),
    /// An enum member, identified by name
    Enum(String),
    /// A uuid
    Uuid(Uuid),
    /// An IPv4 address
    Ipv4(Ipv4Addr),
    /// An IPv6 address
    Ipv6(Ipv6Addr),
    /// An array column's elements
    Array(Vec<Value>),
    /// A tuple column's members, in declaration order
    Tuple(Vec<Value>),
    /// A map column's entries, in iteration order
    Map(Vec<(Value, Value)>),
    /// The absence of a value
    Null,
}

macro_rules! impl_value_from {
    ($variant:ident, $T:ty) => {
        impl From<$T> for Value {
            fn from(value: $T) -> Self {
                Value::$variant(value.into())
            }
        }
    };
}

impl_value_from!(String, String);
impl_value_from!(String, &str);
impl_value_from!(Int, i8);
impl_value_from!(Int, i16);
impl_value_from!(Int, i32);
impl_value_from!(Int, i64);
impl_value_from!(Int, i128);
impl_value_from!(Int, u8);
impl_value_from!(Int, u16);
impl_value_from!(Int, u32);
impl_value_from!(Int, u64);
impl_value_from!(Decimal, BigDecimal);
impl_value_from!(Date, NaiveDate);
impl_value_from!(DateTime, DateTime<Utc>);
impl_value_from!(Uuid, Uuid);
impl_value_from!(Ipv4, Ipv4Addr);
impl_value_from!(Ipv6, Ipv6Addr);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(OrderedFloat(value as f64))
    }
}

/// Every decoded value is a legal decoder input again, which is what makes
/// the decode operation idempotent.
impl From<Value> for Raw {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Raw::Text(text),
            Value::Int(int) => Raw::Int(int),
            Value::Float(float) => Raw::Float(float.into_inner()),
            Value::Decimal(decimal) => Raw::Decimal(decimal),
            Value::Date(date) => Raw::Date(date),
            Value::DateTime(datetime) => Raw::DateTime(datetime),
            Value::Enum(name) => Raw::Text(name),
            Value::Uuid(uuid) => Raw::Uuid(uuid),
            Value::Ipv4(addr) => Raw::Ipv4(addr),
            Value::Ipv6(addr) => Raw::Ipv6(addr),
            Value::Array(items) | Value::Tuple(items) => {
                Raw::Seq(items.into_iter().map(Raw::from).collect())
            }
            Value::Map(pairs) => Raw::Map(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
            Value::Null => Raw::Null,
        }
    }
}
