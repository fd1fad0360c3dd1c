//! Conversion, validation and literal rendering of the composite column
//! types Array, Tuple, Map and Nullable.

use chrono::FixedOffset;

use crate::error::Error;
use crate::escape::comma_join;
use crate::field::Field;
use crate::parse::{parse_array, parse_map};
use crate::value::{Raw, Value};

pub(crate) fn decode_array(
    inner: &Field,
    raw: Raw,
    tz_in_use: FixedOffset,
) -> Result<Value, Error> {
    let items = match raw {
        Raw::Seq(items) => items,
        Raw::Text(text) => parse_array(&text)?.into_iter().map(Raw::Text).collect(),
        Raw::Bytes(bytes) => {
            let text =
                String::from_utf8(bytes).map_err(|error| Error::invalid("Array", error.into_bytes()))?;
            parse_array(&text)?.into_iter().map(Raw::Text).collect()
        }
        other => return Err(Error::invalid("Array", other)),
    };
    let decoded = items
        .into_iter()
        .map(|item| inner.decode(item, tz_in_use))
        .collect::<Result<Vec<Value>, Error>>()?;
    Ok(Value::Array(decoded))
}

pub(crate) fn decode_tuple(
    members: &[(String, Field)],
    raw: Raw,
    tz_in_use: FixedOffset,
) -> Result<Value, Error> {
    let items = match raw {
        Raw::Seq(items) => items,
        // the textual form uses parentheses, which parse_array accepts too
        Raw::Text(text) => parse_array(&text)?.into_iter().map(Raw::Text).collect(),
        Raw::Bytes(bytes) => {
            let text =
                String::from_utf8(bytes).map_err(|error| Error::invalid("Tuple", error.into_bytes()))?;
            parse_array(&text)?.into_iter().map(Raw::Text).collect()
        }
        other => return Err(Error::invalid("Tuple", other)),
    };
    if items.len() != members.len() {
        return Err(Error::InvalidValue {
            kind: "Tuple",
            value: format!("expected {} members, got {}", members.len(), items.len()),
        });
    }
    let decoded = members
        .iter()
        .zip(items)
        .map(|((_, field), item)| field.decode(item, tz_in_use))
        .collect::<Result<Vec<Value>, Error>>()?;
    Ok(Value::Tuple(decoded))
}

pub(crate) fn decode_map(
    key: &Field,
    value: &Field,
    raw: Raw,
    tz_in_use: FixedOffset,
) -> Result<Value, Error> {
    let pairs: Vec<(Raw, Raw)> = match raw {
        Raw::Map(pairs) => pairs,
        Raw::Text(text) => parse_map(&text)?
            .into_iter()
            .map(|(k, v)| (Raw::Text(k), Raw::Text(v)))
            .collect(),
        Raw::Bytes(bytes) => {
            let text =
                String::from_utf8(bytes).map_err(|error| Error::invalid("Map", error.into_bytes()))?;
            parse_map(&text)?
                .into_iter()
                .map(|(k, v)| (Raw::Text(k), Raw::Text(v)))
                .collect()
        }
        other => return Err(Error::invalid("Map", other)),
    };
    let decoded = pairs
        .into_iter()
        .map(|(k, v)| Ok((key.decode(k, tz_in_use)?, value.decode(v, tz_in_use)?)))
        .collect::<Result<Vec<(Value, Value)>, Error>>()?;
    Ok(Value::Map(decoded))
}

pub(crate) fn decode_nullable(
    inner: &Field,
    null_values: &[Value],
    raw: Raw,
    tz_in_use: FixedOffset,
) -> Result<Value, Error> {
    if is_null(null_values, &raw) {
        return Ok(Value::Null);
    }
    inner.decode(raw, tz_in_use)
}

fn is_null(null_values: &[Value], raw: &Raw) -> bool {
    if matches!(raw, Raw::Null) {
        return true;
    }
    if matches!(raw, Raw::Text(text) if text == "\\N") {
        return true;
    }
    null_values
        .iter()
        .any(|null_value| &Raw::from(null_value.clone()) == raw)
}

pub(crate) fn validate_array(inner: &Field, value: &Value) -> Result<(), Error> {
    let Value::Array(items) = value else {
        return Err(Error::invalid("Array", value));
    };
    for item in items {
        inner.validate(item)?;
    }
    Ok(())
}

pub(crate) fn validate_tuple(members: &[(String, Field)], value: &Value) -> Result<(), Error> {
    let Value::Tuple(items) = value else {
        return Err(Error::invalid("Tuple", value));
    };
    if items.len() != members.len() {
        return Err(Error::InvalidValue {
            kind: "Tuple",
            value: format!("expected {} members, got {}", members.len(), items.len()),
        });
    }
    for ((_, field), item) in members.iter().zip(items) {
        field.validate(item)?;
    }
    Ok(())
}

pub(crate) fn validate_map(key: &Field, value: &Field, candidate: &Value) -> Result<(), Error> {
    let Value::Map(pairs) = candidate else {
        return Err(Error::invalid("Map", candidate));
    };
    for (k, v) in pairs {
        key.validate(k)?;
        value.validate(v)?;
    }
    Ok(())
}

pub(crate) fn validate_nullable(
    inner: &Field,
    null_values: &[Value],
    value: &Value,
) -> Result<(), Error> {
    if matches!(value, Value::Null) || null_values.contains(value) {
        return Ok(());
    }
    inner.validate(value)
}

pub(crate) fn encode_array(inner: &Field, items: &[Value]) -> Result<String, Error> {
    let rendered = items
        .iter()
        .map(|item| inner.to_db_string(item, true))
        .collect::<Result<Vec<String>, Error>>()?;
    Ok(format!("[{}]", comma_join(rendered)))
}

pub(crate) fn encode_tuple(
    members: &[(String, Field)],
    items: &[Value],
) -> Result<String, Error> {
    if items.len() != members.len() {
        return Err(Error::InvalidValue {
            kind: "Tuple",
            value: format!("expected {} members, got {}", members.len(), items.len()),
        });
    }
    let rendered = members
        .iter()
        .zip(items)
        .map(|((_, field), item)| field.to_db_string(item, true))
        .collect::<Result<Vec<String>, Error>>()?;
    Ok(format!("({})", comma_join(rendered)))
}

/// Renders a map literal. Keys are always single quoted and numeric values
/// stay bare, matching the server's own literal syntax.
pub(crate) fn encode_map(
    key: &Field,
    value: &Field,
    pairs: &[(Value, Value)],
) -> Result<String, Error> {
    let key_numeric = is_numeric(key);
    let value_numeric = is_numeric(value);
    let rendered = pairs
        .iter()
        .map(|(k, v)| {
            let rendered_key = if key_numeric {
                format!("'{}'", key.to_db_string(k, false)?)
            } else {
                key.to_db_string(k, true)?
            };
            let rendered_value = value.to_db_string(v, !value_numeric)?;
            Ok(format!("{rendered_key}: {rendered_value}"))
        })
        .collect::<Result<Vec<String>, Error>>()?;
    Ok(format!("{{{}}}", comma_join(rendered)))
}

fn is_numeric(field: &Field) -> bool {
    use crate::kind::TypeClass;
    matches!(field.ty().class(), TypeClass::Integer | TypeClass::Float)
}

pub(crate) fn encode_nullable(
    inner: &Field,
    null_values: &[Value],
    value: &Value,
    quote: bool,
) -> Result<String, Error> {
    if matches!(value, Value::Null) || null_values.contains(value) {
        return Ok("\\N".to_string());
    }
    inner.to_db_string(value, quote)
}
