//! Conversion and validation routines of the scalar column types.
//!
//! Each `decode_*` function turns a [Raw] wire or application value into the
//! canonical [Value] of its column type and each `validate_*` function checks
//! a canonical value against the type's domain. The routines take the
//! rendered type name as their first argument so error messages name the
//! concrete column type.

use std::fmt::Display;
use std::net::{Ipv4Addr, Ipv6Addr};

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use uuid::Uuid;

use crate::error::Error;
use crate::kind::DecimalSpec;
use crate::value::{Raw, Value};

/// First representable day of a Date column.
pub(crate) fn date_min() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("hardcoded date")
}

/// Last representable day of a Date column.
pub(crate) fn date_max() -> NaiveDate {
    NaiveDate::from_ymd_opt(2105, 12, 31).expect("hardcoded date")
}

/// The unix epoch, the zero value of the datetime types.
pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

fn utf8(kind: &'static str, bytes: Vec<u8>) -> Result<String, Error> {
    String::from_utf8(bytes).map_err(|error| Error::invalid(kind, error.into_bytes()))
}

fn string_from(kind: &'static str, raw: Raw) -> Result<String, Error> {
    match raw {
        Raw::Text(text) => Ok(text),
        Raw::Bytes(bytes) => utf8(kind, bytes),
        other => Err(Error::invalid(kind, other)),
    }
}

fn range_check<T: PartialOrd + Display>(
    kind: &'static str,
    value: &T,
    min: &T,
    max: &T,
) -> Result<(), Error> {
    if value < min || value > max {
        return Err(Error::OutOfRange {
            kind,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn decode_string(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    string_from(kind, raw).map(Value::String)
}

/// Like [decode_string] but also drops the NUL padding the server appends to
/// short FixedString values.
pub(crate) fn decode_fixed_string(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let text = string_from(kind, raw)?;
    Ok(Value::String(text.trim_end_matches('\0').to_string()))
}

pub(crate) fn validate_fixed_string(
    kind: &'static str,
    length: usize,
    value: &Value,
) -> Result<(), Error> {
    let Value::String(text) = value else {
        return Err(Error::invalid(kind, value));
    };
    if text.len() > length {
        return Err(Error::TooLong {
            length: text.len(),
            limit: length,
        });
    }
    Ok(())
}

pub(crate) fn decode_int(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Int(i) => i,
        Raw::Float(f) if f.is_finite() => f.trunc() as i128,
        Raw::Text(text) => text
            .trim()
            .parse::<i128>()
            .map_err(|_| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => {
            let text = utf8(kind, bytes)?;
            text.trim()
                .parse::<i128>()
                .map_err(|_| Error::invalid(kind, text))?
        }
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Int(parsed))
}

pub(crate) fn validate_int(
    kind: &'static str,
    min: i128,
    max: i128,
    value: &Value,
) -> Result<(), Error> {
    let Value::Int(i) = value else {
        return Err(Error::invalid(kind, value));
    };
    range_check(kind, i, &min, &max)
}

pub(crate) fn decode_float(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Float(f) => f,
        Raw::Int(i) => i as f64,
        Raw::Decimal(d) => d.to_f64().ok_or_else(|| Error::invalid(kind, d))?,
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => {
            let text = utf8(kind, bytes)?;
            text.trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid(kind, text))?
        }
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Float(parsed.into()))
}

/// Decodes a decimal value and rounds it half-even to the column's scale.
pub(crate) fn decode_decimal(
    kind: &'static str,
    spec: &DecimalSpec,
    raw: Raw,
) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Decimal(d) => d,
        Raw::Int(i) => BigDecimal::from(i),
        Raw::Float(f) => BigDecimal::try_from(f).map_err(|_| Error::invalid(kind, f))?,
        Raw::Text(text) => text
            .trim()
            .parse::<BigDecimal>()
            .map_err(|_| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => {
            let text = utf8(kind, bytes)?;
            text.trim()
                .parse::<BigDecimal>()
                .map_err(|_| Error::invalid(kind, text))?
        }
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Decimal(
        parsed.with_scale_round(spec.scale as i64, RoundingMode::HalfEven),
    ))
}

pub(crate) fn validate_decimal(
    kind: &'static str,
    spec: &DecimalSpec,
    value: &Value,
) -> Result<(), Error> {
    let Value::Decimal(d) = value else {
        return Err(Error::invalid(kind, value));
    };
    range_check(kind, d, &spec.min_value(), &spec.max_value())
}

pub(crate) fn decode_date(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Date(date) => date,
        Raw::DateTime(dt) => dt.date_naive(),
        Raw::Int(days) => i64::try_from(days)
            .ok()
            .and_then(|days| date_min().checked_add_signed(Duration::days(days)))
            .ok_or_else(|| Error::invalid(kind, days))?,
        Raw::Text(text) => parse_date_text(kind, text.trim())?,
        Raw::Bytes(bytes) => {
            let text = utf8(kind, bytes)?;
            parse_date_text(kind, text.trim())?
        }
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Date(parsed))
}

fn parse_date_text(kind: &'static str, text: &str) -> Result<NaiveDate, Error> {
    if text == "0000-00-00" {
        return Ok(date_min());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| Error::invalid(kind, text))
}

pub(crate) fn validate_date(kind: &'static str, value: &Value) -> Result<(), Error> {
    let Value::Date(date) = value else {
        return Err(Error::invalid(kind, value));
    };
    range_check(kind, date, &date_min(), &date_max())
}

pub(crate) fn decode_datetime(
    kind: &'static str,
    raw: Raw,
    tz_in_use: FixedOffset,
) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::DateTime(dt) => dt,
        Raw::Date(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        Raw::Int(seconds) => timestamp_utc(kind, seconds)?,
        Raw::Text(text) => parse_datetime_text(kind, text.trim(), tz_in_use)?,
        Raw::Bytes(bytes) => {
            let text = utf8(kind, bytes)?;
            parse_datetime_text(kind, text.trim(), tz_in_use)?
        }
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::DateTime(parsed))
}

fn timestamp_utc(kind: &'static str, seconds: i128) -> Result<DateTime<Utc>, Error> {
    i64::try_from(seconds)
        .ok()
        .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
        .ok_or_else(|| Error::invalid(kind, seconds))
}

/// Parses the textual datetime representations the server and applications
/// produce. Naive timestamps are interpreted in `tz_in_use`, the session's
/// effective timezone.
fn parse_datetime_text(
    kind: &'static str,
    text: &str,
    tz_in_use: FixedOffset,
) -> Result<DateTime<Utc>, Error> {
    if text == "0000-00-00 00:00:00" {
        return Ok(epoch());
    }
    // a bare 10 digit string is an epoch timestamp in seconds
    if text.len() == 10 && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(seconds) = text.parse::<i128>() {
            return timestamp_utc(kind, seconds);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M:%S%.f%z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return localize(kind, naive, tz_in_use);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return localize(kind, date.and_time(NaiveTime::MIN), tz_in_use);
    }
    Err(Error::invalid(kind, text))
}

fn localize(
    kind: &'static str,
    naive: NaiveDateTime,
    tz_in_use: FixedOffset,
) -> Result<DateTime<Utc>, Error> {
    tz_in_use
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::invalid(kind, naive))
}

pub(crate) fn decode_datetime64(
    kind: &'static str,
    raw: Raw,
    tz_in_use: FixedOffset,
) -> Result<Value, Error> {
    match decode_datetime(kind, raw.clone(), tz_in_use) {
        Ok(value) => Ok(value),
        // sub-second forms the plain DateTime parser rejects
        Err(_) => match raw {
            Raw::Float(f) => timestamp_from_float(kind, f).map(Value::DateTime),
            Raw::Text(text) => {
                let trimmed = text.trim();
                // the zero sentinel may carry a fractional suffix
                let (whole, _) = trimmed.split_once('.').unwrap_or((trimmed, ""));
                if whole == "0000-00-00 00:00:00" {
                    return Ok(Value::DateTime(epoch()));
                }
                let f = trimmed
                    .parse::<f64>()
                    .map_err(|_| Error::invalid(kind, trimmed))?;
                timestamp_from_float(kind, f).map(Value::DateTime)
            }
            other => Err(Error::invalid(kind, other)),
        },
    }
}

fn timestamp_from_float(kind: &'static str, value: f64) -> Result<DateTime<Utc>, Error> {
    if !value.is_finite() {
        return Err(Error::invalid(kind, value));
    }
    let mut seconds = value.floor() as i64;
    let mut nanos = ((value - value.floor()) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        seconds += 1;
        nanos -= 1_000_000_000;
    }
    Utc.timestamp_opt(seconds, nanos)
        .single()
        .ok_or_else(|| Error::invalid(kind, value))
}

/// Renders a DateTime64 value as zero padded epoch seconds followed by
/// exactly `precision` fractional digits.
pub(crate) fn encode_datetime64(dt: &DateTime<Utc>, precision: u8, quote: bool) -> String {
    let text = if precision == 0 {
        format!("{:011}", dt.timestamp())
    } else {
        let frac = dt.timestamp_subsec_nanos() / 10u32.pow(9 - precision as u32);
        format!(
            "{:010}.{:0width$}",
            dt.timestamp(),
            frac,
            width = precision as usize
        )
    };
    if quote {
        format!("'{text}'")
    } else {
        text
    }
}

pub(crate) fn decode_enum(
    kind: &'static str,
    spec: &crate::kind::EnumSpec,
    raw: Raw,
) -> Result<Value, Error> {
    let member = match raw {
        Raw::Text(text) => spec
            .by_name(&text)
            .ok_or_else(|| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => {
            let text = utf8(kind, bytes)?;
            spec.by_name(&text)
                .ok_or_else(|| Error::invalid(kind, text))?
        }
        Raw::Int(code) => i16::try_from(code)
            .ok()
            .and_then(|code| spec.by_code(code))
            .ok_or_else(|| Error::invalid(kind, code))?,
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Enum(member.name.clone()))
}

pub(crate) fn decode_uuid(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Uuid(uuid) => uuid,
        Raw::Text(text) => Uuid::parse_str(text.trim()).map_err(|_| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => {
            Uuid::from_slice(&bytes).map_err(|_| Error::invalid(kind, bytes))?
        }
        Raw::Int(i) => u128::try_from(i)
            .map(Uuid::from_u128)
            .map_err(|_| Error::invalid(kind, i))?,
        Raw::Seq(items) => uuid_from_parts(kind, &items)?,
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Uuid(parsed))
}

/// Assembles a uuid from its six integer parts: time_low, time_mid,
/// time_hi_version, clock_seq_hi, clock_seq_low, node.
fn uuid_from_parts(kind: &'static str, items: &[Raw]) -> Result<Uuid, Error> {
    const PART_BITS: [u32; 6] = [32, 16, 16, 8, 8, 48];
    if items.len() != PART_BITS.len() {
        return Err(Error::invalid(kind, items));
    }
    let mut bits = 0u128;
    for (item, width) in items.iter().zip(PART_BITS) {
        let Raw::Int(part) = item else {
            return Err(Error::invalid(kind, item));
        };
        let part = u128::try_from(*part)
            .ok()
            .filter(|part| *part < 1u128 << width)
            .ok_or_else(|| Error::invalid(kind, *part))?;
        bits = (bits << width) | part;
    }
    Ok(Uuid::from_u128(bits))
}

pub(crate) fn decode_ipv4(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Ipv4(address) => address,
        Raw::Text(text) => text
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => <[u8; 4]>::try_from(bytes.as_slice())
            .map(Ipv4Addr::from)
            .map_err(|_| Error::invalid(kind, bytes))?,
        Raw::Int(i) => u32::try_from(i)
            .map(Ipv4Addr::from)
            .map_err(|_| Error::invalid(kind, i))?,
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Ipv4(parsed))
}

pub(crate) fn decode_ipv6(kind: &'static str, raw: Raw) -> Result<Value, Error> {
    let parsed = match raw {
        Raw::Ipv6(address) => address,
        Raw::Text(text) => text
            .trim()
            .parse::<Ipv6Addr>()
            .map_err(|_| Error::invalid(kind, text))?,
        Raw::Bytes(bytes) => <[u8; 16]>::try_from(bytes.as_slice())
            .map(Ipv6Addr::from)
            .map_err(|_| Error::invalid(kind, bytes))?,
        Raw::Int(i) => u128::try_from(i)
            .map(Ipv6Addr::from)
            .map_err(|_| Error::invalid(kind, i))?,
        other => return Err(Error::invalid(kind, other)),
    };
    Ok(Value::Ipv6(parsed))
}
