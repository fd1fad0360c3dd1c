//! Column definitions and the operations a model performs on them.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::FixedOffset;

use crate::composite;
use crate::error::Error;
use crate::escape::{comma_join, escape};
use crate::expr::{DefaultValue, Expr};
use crate::kind::{FieldType, TypeClass};
use crate::scalar;
use crate::value::{Raw, Value};
use crate::ServerFeatures;

/// Source of the per-field creation order used to put columns into their
/// declaration order.
static CREATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Resets the creation order counter. Meant for test isolation; fields
/// created afterwards restart at zero.
pub fn reset_creation_counter() {
    CREATION_COUNTER.store(0, Ordering::Relaxed);
}

/**
Optional settings of a field, applied with [Field::with_options].

At most one of `default`, `alias` and `materialized` may be set. A field with
an alias or materialized expression is implicitly readonly.
 */
#[derive(Clone, Debug, Default)]
pub struct FieldOptions {
    /// Explicit DEFAULT clause
    pub default: Option<DefaultValue>,
    /// ALIAS expression, the column is computed on read
    pub alias: Option<Expr>,
    /// MATERIALIZED expression, the column is computed on write
    pub materialized: Option<Expr>,
    /// Excludes the column from inserts
    pub readonly: bool,
    /// CODEC clause, e.g. `ZSTD(10)`
    pub codec: Option<String>,
    /// Database column name when it differs from the attribute name
    pub db_column: Option<String>,
}

/**
A single typed column of a model.

Construction validates the type configuration, so every existing `Field` is
well formed. The model layer binds the attribute name via [Field::bind_name]
when the field is attached.
 */
#[derive(Clone, Debug)]
pub struct Field {
    ty: FieldType,
    name: Option<String>,
    creation_counter: u64,
    default: Option<DefaultValue>,
    alias: Option<Expr>,
    materialized: Option<Expr>,
    readonly: bool,
    codec: Option<String>,
    db_column: Option<String>,
}

impl Field {
    /// Creates a field of the given type with default options.
    pub fn new(ty: FieldType) -> Result<Self, Error> {
        Self::with_options(ty, FieldOptions::default())
    }

    /// Creates a field of the given type, checking both the type
    /// configuration and the option combination.
    pub fn with_options(ty: FieldType, options: FieldOptions) -> Result<Self, Error> {
        ty.check()?;
        let given = [
            options.default.is_some(),
            options.alias.is_some(),
            options.materialized.is_some(),
        ];
        if given.into_iter().filter(|given| *given).count() > 1 {
            return Err(Error::Configuration(
                "only one of default, alias and materialized may be given".to_string(),
            ));
        }
        if matches!(&options.alias, Some(expr) if expr.is_empty()) {
            return Err(Error::Configuration(
                "alias must be a non-empty expression".to_string(),
            ));
        }
        if matches!(&options.materialized, Some(expr) if expr.is_empty()) {
            return Err(Error::Configuration(
                "materialized must be a non-empty expression".to_string(),
            ));
        }
        if matches!(&options.codec, Some(codec) if codec.is_empty()) {
            return Err(Error::Configuration(
                "codec must be a non-empty clause".to_string(),
            ));
        }
        if matches!(&options.db_column, Some(name) if name.is_empty()) {
            return Err(Error::Configuration(
                "db_column must be a non-empty name".to_string(),
            ));
        }
        let readonly =
            options.readonly || options.alias.is_some() || options.materialized.is_some();
        Ok(Field {
            ty,
            name: None,
            creation_counter: CREATION_COUNTER.fetch_add(1, Ordering::Relaxed),
            default: options.default,
            alias: options.alias,
            materialized: options.materialized,
            readonly,
            codec: options.codec,
            db_column: options.db_column,
        })
    }

    /**
    Builds a field for a column whose type the server reported at runtime,
    e.g. `Enum8('apple' = 1, 'banana' = 2)` from a system table.

    Only enum descriptions need this; every other type is constructed
    directly.
     */
    pub fn ad_hoc_enum(db_type: &str) -> Result<Self, Error> {
        Self::new(FieldType::Enum(crate::kind::EnumSpec::from_db_type(
            db_type,
        )?))
    }

    /// The type of this field.
    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// The bound attribute name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Position in the global creation order.
    pub fn creation_counter(&self) -> u64 {
        self.creation_counter
    }

    /// Whether the column is excluded from inserts.
    pub fn readonly(&self) -> bool {
        self.readonly
    }

    /// The CODEC clause, if any.
    pub fn codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    /// The configured database column name override, if any.
    pub fn db_column(&self) -> Option<&str> {
        self.db_column.as_deref()
    }

    /// The DEFAULT value, if any.
    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// The ALIAS expression, if any.
    pub fn alias(&self) -> Option<&Expr> {
        self.alias.as_ref()
    }

    /// The MATERIALIZED expression, if any.
    pub fn materialized(&self) -> Option<&Expr> {
        self.materialized.as_ref()
    }

    /// The type specific zero value, used when no explicit default is given.
    pub fn class_default(&self) -> Value {
        self.ty.class_default()
    }

    /// The column name used in SQL: the `db_column` override if set,
    /// otherwise the bound attribute name.
    pub fn db_column_name(&self) -> Option<&str> {
        self.db_column.as_deref().or(self.name.as_deref())
    }

    /// Binds the attribute name. A field may only be bound once.
    pub fn bind_name(&mut self, name: impl Into<String>) -> Result<(), Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Configuration(
                "field name must be non-empty".to_string(),
            ));
        }
        if let Some(bound) = &self.name {
            return Err(Error::Configuration(format!(
                "field {bound:?} is already bound"
            )));
        }
        self.name = Some(name);
        Ok(())
    }

    /**
    An expression selecting the named member of this tuple field, e.g.
    `point.x` for member `x` of a bound field `point`.
     */
    pub fn member_expr(&self, member: &str) -> Result<Expr, Error> {
        let FieldType::Tuple { members } = &self.ty else {
            return Err(Error::Configuration(format!(
                "{} fields have no members",
                self.ty.db_type()
            )));
        };
        if !members.iter().any(|(name, _)| name == member) {
            return Err(Error::Configuration(format!(
                "tuple has no member {member:?}"
            )));
        }
        let Some(name) = self.db_column_name() else {
            return Err(Error::Configuration(
                "field is not bound to a name yet".to_string(),
            ));
        };
        Ok(Expr::column(format!("{name}.{member}")))
    }

    /// The wrapped field of the single-inner composite types.
    pub fn inner(&self) -> Option<&Field> {
        match &self.ty {
            FieldType::Array { inner }
            | FieldType::Nullable { inner, .. }
            | FieldType::LowCardinality { inner } => Some(inner),
            _ => None,
        }
    }

    /// Whether this field, or any field it wraps, belongs to one of the
    /// given classes.
    pub fn is_a(&self, classes: &[TypeClass]) -> bool {
        let mut current = Some(self);
        while let Some(field) = current {
            let class = field.ty.class();
            if classes.iter().any(|wanted| class.matches(*wanted)) {
                return true;
            }
            current = field.inner();
        }
        false
    }

    /**
    Converts a raw wire or application value into the canonical [Value] of
    this field's type. Naive timestamps are interpreted in `tz_in_use`, the
    session's effective timezone.
     */
    pub fn decode(&self, raw: Raw, tz_in_use: FixedOffset) -> Result<Value, Error> {
        let kind = self.ty.db_type();
        match &self.ty {
            FieldType::String | FieldType::Json => scalar::decode_string(kind, raw),
            FieldType::FixedString { .. } => scalar::decode_fixed_string(kind, raw),
            FieldType::Date => scalar::decode_date(kind, raw),
            FieldType::DateTime { .. } => scalar::decode_datetime(kind, raw, tz_in_use),
            FieldType::DateTime64 { .. } => scalar::decode_datetime64(kind, raw, tz_in_use),
            FieldType::UInt8
            | FieldType::UInt16
            | FieldType::UInt32
            | FieldType::UInt64
            | FieldType::Int8
            | FieldType::Int16
            | FieldType::Int32
            | FieldType::Int64 => scalar::decode_int(kind, raw),
            FieldType::Float32 | FieldType::Float64 => scalar::decode_float(kind, raw),
            FieldType::Decimal(spec) => scalar::decode_decimal(kind, spec, raw),
            FieldType::Enum(spec) => scalar::decode_enum(kind, spec, raw),
            FieldType::Uuid => scalar::decode_uuid(kind, raw),
            FieldType::Ipv4 => scalar::decode_ipv4(kind, raw),
            FieldType::Ipv6 => scalar::decode_ipv6(kind, raw),
            FieldType::Array { inner } => composite::decode_array(inner, raw, tz_in_use),
            FieldType::Tuple { members } => composite::decode_tuple(members, raw, tz_in_use),
            FieldType::Map { key, value } => composite::decode_map(key, value, raw, tz_in_use),
            FieldType::Nullable { inner, null_values } => {
                composite::decode_nullable(inner, null_values, raw, tz_in_use)
            }
            FieldType::LowCardinality { inner } => inner.decode(raw, tz_in_use),
        }
    }

    /// Checks a canonical value against this field's domain.
    pub fn validate(&self, value: &Value) -> Result<(), Error> {
        let kind = self.ty.db_type();
        if let Some((min, max)) = self.ty.int_bounds() {
            return scalar::validate_int(kind, min, max, value);
        }
        match &self.ty {
            FieldType::FixedString { length } => {
                scalar::validate_fixed_string(kind, *length, value)
            }
            FieldType::Date => scalar::validate_date(kind, value),
            FieldType::Decimal(spec) => scalar::validate_decimal(kind, spec, value),
            FieldType::Array { inner } => composite::validate_array(inner, value),
            FieldType::Tuple { members } => composite::validate_tuple(members, value),
            FieldType::Map { key, value: value_field } => {
                composite::validate_map(key, value_field, value)
            }
            FieldType::Nullable { inner, null_values } => {
                composite::validate_nullable(inner, null_values, value)
            }
            FieldType::LowCardinality { inner } => inner.validate(value),
            _ => Ok(()),
        }
    }

    /**
    Renders a canonical value as a database literal. With `quote` set, text
    like values are escaped and wrapped in single quotes; numbers are never
    quoted.
     */
    pub fn to_db_string(&self, value: &Value, quote: bool) -> Result<String, Error> {
        let kind = self.ty.db_type();
        match (&self.ty, value) {
            (
                FieldType::String | FieldType::FixedString { .. } | FieldType::Json,
                Value::String(text),
            ) => Ok(escape(text, quote)),
            (FieldType::Date, Value::Date(date)) => {
                Ok(escape(&date.format("%Y-%m-%d").to_string(), quote))
            }
            (FieldType::DateTime { .. }, Value::DateTime(dt)) => {
                Ok(escape(&format!("{:010}", dt.timestamp()), quote))
            }
            (FieldType::DateTime64 { precision, .. }, Value::DateTime(dt)) => {
                Ok(scalar::encode_datetime64(dt, *precision, quote))
            }
            (
                FieldType::UInt8
                | FieldType::UInt16
                | FieldType::UInt32
                | FieldType::UInt64
                | FieldType::Int8
                | FieldType::Int16
                | FieldType::Int32
                | FieldType::Int64,
                Value::Int(i),
            ) => Ok(i.to_string()),
            (FieldType::Float32 | FieldType::Float64, Value::Float(f)) => Ok(f.to_string()),
            (FieldType::Decimal(_), Value::Decimal(d)) => Ok(d.to_string()),
            (FieldType::Enum(_), Value::Enum(name)) => Ok(escape(name, quote)),
            (FieldType::Uuid, Value::Uuid(uuid)) => Ok(escape(&uuid.to_string(), quote)),
            (FieldType::Ipv4, Value::Ipv4(address)) => Ok(escape(&address.to_string(), quote)),
            (FieldType::Ipv6, Value::Ipv6(address)) => Ok(escape(&address.to_string(), quote)),
            (FieldType::Array { inner }, Value::Array(items)) => {
                composite::encode_array(inner, items)
            }
            (FieldType::Tuple { members }, Value::Tuple(items)) => {
                composite::encode_tuple(members, items)
            }
            (FieldType::Map { key, value: value_field }, Value::Map(pairs)) => {
                composite::encode_map(key, value_field, pairs)
            }
            (FieldType::Nullable { inner, null_values }, value) => {
                composite::encode_nullable(inner, null_values, value, quote)
            }
            (FieldType::LowCardinality { inner }, value) => inner.to_db_string(value, quote),
            (_, other) => Err(Error::invalid(kind, other)),
        }
    }

    /**
    Renders the DDL type of this column, e.g. `Nullable(Decimal(10, 2))`.

    With `with_default_expression` set, the DEFAULT/ALIAS/MATERIALIZED and
    CODEC clauses are appended as for a CREATE TABLE statement. Array, Tuple
    and Map columns cannot carry default expressions and only render their
    CODEC clause. When `features` is given, clauses the server in use does
    not understand are left out.
     */
    pub fn get_sql(
        &self,
        with_default_expression: bool,
        features: Option<&ServerFeatures>,
    ) -> Result<String, Error> {
        let mut sql = match &self.ty {
            FieldType::Array { inner } => format!("Array({})", inner.get_sql(false, features)?),
            FieldType::Nullable { inner, .. } => {
                format!("Nullable({})", inner.get_sql(false, features)?)
            }
            FieldType::LowCardinality { inner } => {
                if features.map_or(true, |features| features.has_low_cardinality_support) {
                    format!("LowCardinality({})", inner.get_sql(false, features)?)
                } else {
                    log::warn!(
                        "server does not support LowCardinality, creating a plain {} column",
                        inner.ty().db_type()
                    );
                    inner.get_sql(false, features)?
                }
            }
            FieldType::Tuple { members } => {
                let rendered = members
                    .iter()
                    .map(|(name, field)| {
                        Ok(format!("{} {}", name, field.get_sql(false, features)?))
                    })
                    .collect::<Result<Vec<String>, Error>>()?;
                format!("Tuple({})", comma_join(rendered))
            }
            FieldType::Map { key, value } => format!(
                "Map({}, {})",
                key.get_sql(false, features)?,
                value.get_sql(false, features)?
            ),
            simple => {
                let args = simple.db_type_args();
                if args.is_empty() {
                    simple.db_type().to_string()
                } else {
                    format!("{}({})", simple.db_type(), comma_join(args))
                }
            }
        };
        if with_default_expression {
            match self.ty.class() {
                TypeClass::Array | TypeClass::Tuple | TypeClass::Map => {
                    if let Some(codec) = self.codec_clause(features) {
                        sql.push_str(&codec);
                    }
                }
                _ => sql.push_str(&self.extra_params(features)?),
            }
        }
        Ok(sql)
    }

    fn extra_params(&self, features: Option<&ServerFeatures>) -> Result<String, Error> {
        use std::fmt::Write;
        let mut sql = String::new();
        if let Some(alias) = &self.alias {
            write!(sql, " ALIAS {}", alias.to_sql()).unwrap();
        } else if let Some(materialized) = &self.materialized {
            write!(sql, " MATERIALIZED {}", materialized.to_sql()).unwrap();
        } else if let Some(default) = &self.default {
            let rendered = match default {
                DefaultValue::Expr(expr) => expr.to_sql().to_string(),
                DefaultValue::Literal(value) => self.to_db_string(value, true)?,
            };
            write!(sql, " DEFAULT {rendered}").unwrap();
        }
        if let Some(codec) = self.codec_clause(features) {
            sql.push_str(&codec);
        }
        Ok(sql)
    }

    /// The CODEC clause, unless the server in use lacks codec support or the
    /// column is an alias.
    fn codec_clause(&self, features: Option<&ServerFeatures>) -> Option<String> {
        let codec = self.codec.as_deref()?;
        if self.alias.is_some() {
            return None;
        }
        if !features.map_or(true, |features| features.has_codec_support) {
            return None;
        }
        Some(format!(" CODEC({codec})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::EnumWidth;
    use chrono::{TimeZone, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn creation_order_is_monotonic() {
        let first = Field::new(FieldType::String).unwrap();
        let second = Field::new(FieldType::UInt8).unwrap();
        let third = Field::new(FieldType::Date).unwrap();
        assert!(first.creation_counter() < second.creation_counter());
        assert!(second.creation_counter() < third.creation_counter());
    }

    #[test]
    fn option_conflicts() {
        let conflicting = FieldOptions {
            default: Some(Value::Int(1).into()),
            alias: Some(Expr::raw("other")),
            ..FieldOptions::default()
        };
        assert!(Field::with_options(FieldType::UInt8, conflicting).is_err());

        let empty_codec = FieldOptions {
            codec: Some(String::new()),
            ..FieldOptions::default()
        };
        assert!(Field::with_options(FieldType::UInt8, empty_codec).is_err());
    }

    #[test]
    fn alias_implies_readonly() {
        let options = FieldOptions {
            alias: Some(Expr::column("other")),
            ..FieldOptions::default()
        };
        let field = Field::with_options(FieldType::UInt8, options).unwrap();
        assert!(field.readonly());
    }

    #[test]
    fn bind_name_once() {
        let mut field = Field::new(FieldType::String).unwrap();
        assert_eq!(field.db_column_name(), None);
        field.bind_name("title").unwrap();
        assert_eq!(field.name(), Some("title"));
        assert_eq!(field.db_column_name(), Some("title"));
        assert!(field.bind_name("other").is_err());
    }

    #[test]
    fn db_column_overrides_name() {
        let options = FieldOptions {
            db_column: Some("legacy_title".to_string()),
            ..FieldOptions::default()
        };
        let mut field = Field::with_options(FieldType::String, options).unwrap();
        field.bind_name("title").unwrap();
        assert_eq!(field.db_column_name(), Some("legacy_title"));
    }

    #[test]
    fn tuple_member_expr() {
        let mut point = Field::new(FieldType::tuple([
            ("x", Field::new(FieldType::Float64).unwrap()),
            ("y", Field::new(FieldType::Float64).unwrap()),
        ]))
        .unwrap();
        assert!(point.member_expr("x").is_err());
        point.bind_name("point").unwrap();
        assert_eq!(point.member_expr("x").unwrap().to_sql(), "point.x");
        assert!(point.member_expr("z").is_err());

        let scalar = Field::new(FieldType::UInt8).unwrap();
        assert!(scalar.member_expr("x").is_err());
    }

    #[test]
    fn class_walk() {
        let field = Field::new(FieldType::nullable(
            Field::new(FieldType::low_cardinality(
                Field::new(FieldType::fixed_string(8)).unwrap(),
            ))
            .unwrap(),
        ))
        .unwrap();
        assert!(field.is_a(&[TypeClass::Nullable]));
        assert!(field.is_a(&[TypeClass::LowCardinality]));
        assert!(field.is_a(&[TypeClass::String]));
        assert!(!field.is_a(&[TypeClass::Integer]));
    }

    #[test]
    fn uint8_decode_then_validate() {
        let field = Field::new(FieldType::UInt8).unwrap();
        let value = field.decode(Raw::Text("256".into()), utc()).unwrap();
        assert_eq!(value, Value::Int(256));
        let error = field.validate(&value).unwrap_err();
        assert_eq!(
            error.to_string(),
            "UInt8 out of range - 256 is not between 0 and 255"
        );
    }

    #[test]
    fn nullable_roundtrip() {
        let field =
            Field::new(FieldType::nullable(Field::new(FieldType::UInt8).unwrap())).unwrap();
        assert_eq!(field.decode(Raw::Text("\\N".into()), utc()).unwrap(), Value::Null);
        assert_eq!(field.decode(Raw::Null, utc()).unwrap(), Value::Null);
        assert_eq!(field.decode(Raw::Int(5), utc()).unwrap(), Value::Int(5));
        assert_eq!(field.to_db_string(&Value::Null, true).unwrap(), "\\N");
        assert_eq!(field.to_db_string(&Value::Int(5), true).unwrap(), "5");
        assert!(field.validate(&Value::Null).is_ok());
        assert!(field.validate(&Value::Int(5)).is_ok());
        assert!(field.validate(&Value::Int(300)).is_err());
    }

    #[test]
    fn nullable_custom_null_values() {
        let field = Field::new(FieldType::nullable_with(
            Field::new(FieldType::Int32).unwrap(),
            vec![Value::Int(-1)],
        ))
        .unwrap();
        assert_eq!(field.decode(Raw::Int(-1), utc()).unwrap(), Value::Null);
        assert_eq!(field.decode(Raw::Int(0), utc()).unwrap(), Value::Int(0));
        assert!(field.validate(&Value::Int(-1)).is_ok());
        assert_eq!(field.to_db_string(&Value::Int(-1), true).unwrap(), "\\N");
    }

    #[test]
    fn array_decode_and_encode() {
        let field =
            Field::new(FieldType::array(Field::new(FieldType::UInt32).unwrap())).unwrap();
        let decoded = field.decode(Raw::Text("[1, 2, 3]".into()), utc()).unwrap();
        assert_eq!(
            decoded,
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(field.to_db_string(&decoded, true).unwrap(), "[1, 2, 3]");

        let field =
            Field::new(FieldType::array(Field::new(FieldType::String).unwrap())).unwrap();
        let decoded = field
            .decode(Raw::Text("['a', 'b\\'c']".into()), utc())
            .unwrap();
        assert_eq!(field.to_db_string(&decoded, true).unwrap(), "['a', 'b\\'c']");
    }

    #[test]
    fn map_encoding_quotes_keys_only() {
        let field = Field::new(FieldType::map(
            Field::new(FieldType::String).unwrap(),
            Field::new(FieldType::UInt32).unwrap(),
        ))
        .unwrap();
        let decoded = field
            .decode(Raw::Text("{'a': 1, 'b': 2}".into()), utc())
            .unwrap();
        assert_eq!(
            decoded,
            Value::Map(vec![
                (Value::String("a".into()), Value::Int(1)),
                (Value::String("b".into()), Value::Int(2)),
            ])
        );
        assert_eq!(field.to_db_string(&decoded, true).unwrap(), "{'a': 1, 'b': 2}");
    }

    #[test]
    fn map_numeric_keys_still_quoted() {
        let field = Field::new(FieldType::map(
            Field::new(FieldType::UInt8).unwrap(),
            Field::new(FieldType::String).unwrap(),
        ))
        .unwrap();
        let value = Value::Map(vec![(Value::Int(1), Value::String("one".into()))]);
        assert_eq!(field.to_db_string(&value, true).unwrap(), "{'1': 'one'}");
    }

    #[test]
    fn tuple_decode_checks_arity() {
        let field = Field::new(FieldType::tuple([
            ("a", Field::new(FieldType::UInt8).unwrap()),
            ("b", Field::new(FieldType::String).unwrap()),
        ]))
        .unwrap();
        let decoded = field.decode(Raw::Text("(1, 'x')".into()), utc()).unwrap();
        assert_eq!(
            decoded,
            Value::Tuple(vec![Value::Int(1), Value::String("x".into())])
        );
        assert_eq!(field.to_db_string(&decoded, true).unwrap(), "(1, 'x')");
        assert!(field.decode(Raw::Text("(1,)".into()), utc()).is_err());
    }

    #[test]
    fn ad_hoc_enum_roundtrip() {
        let field = Field::ad_hoc_enum("Enum8('apple' = 1, 'banana' = 2)").unwrap();
        let FieldType::Enum(spec) = field.ty() else {
            panic!("expected an enum field");
        };
        assert_eq!(spec.width, EnumWidth::Enum8);
        let decoded = field.decode(Raw::Text("apple".into()), utc()).unwrap();
        assert_eq!(decoded, Value::Enum("apple".into()));
        assert_eq!(field.decode(Raw::Int(2), utc()).unwrap(), Value::Enum("banana".into()));
        assert_eq!(field.to_db_string(&decoded, true).unwrap(), "'apple'");
        assert!(field.decode(Raw::Text("cherry".into()), utc()).is_err());
    }

    #[test]
    fn scalar_wire_text_roundtrip() {
        use std::net::{Ipv4Addr, Ipv6Addr};
        let cases: Vec<(Field, Value)> = vec![
            (
                Field::new(FieldType::String).unwrap(),
                Value::String("hello".into()),
            ),
            (
                Field::new(FieldType::fixed_string(8)).unwrap(),
                Value::String("abc".into()),
            ),
            (Field::new(FieldType::Int64).unwrap(), Value::Int(-42)),
            (Field::new(FieldType::Float64).unwrap(), Value::from(1.5)),
            (
                Field::new(FieldType::decimal(10, 2)).unwrap(),
                Value::Decimal("12.34".parse().unwrap()),
            ),
            (
                Field::new(FieldType::Date).unwrap(),
                Value::Date(chrono::NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()),
            ),
            (
                Field::new(FieldType::datetime()).unwrap(),
                Value::DateTime(Utc.timestamp_opt(1609459200, 0).unwrap()),
            ),
            (
                Field::new(FieldType::datetime64(3)).unwrap(),
                Value::DateTime(Utc.timestamp_opt(1609459200, 250_000_000).unwrap()),
            ),
            (
                Field::new(FieldType::enum8([("apple", 1), ("banana", 2)])).unwrap(),
                Value::Enum("banana".into()),
            ),
            (
                Field::new(FieldType::Uuid).unwrap(),
                Value::Uuid(
                    uuid::Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
                ),
            ),
            (
                Field::new(FieldType::Ipv4).unwrap(),
                Value::Ipv4(Ipv4Addr::new(192, 168, 0, 1)),
            ),
            (
                Field::new(FieldType::Ipv6).unwrap(),
                Value::Ipv6(Ipv6Addr::LOCALHOST),
            ),
        ];
        for (field, value) in cases {
            let wire = field.to_db_string(&value, false).unwrap();
            let decoded = field.decode(Raw::Text(wire.clone()), utc()).unwrap();
            assert_eq!(decoded, value, "wire text was {wire:?}");
        }
    }

    #[test]
    fn array_of_tuples_roundtrip() {
        let field = Field::new(FieldType::array(
            Field::new(FieldType::tuple([
                ("a", Field::new(FieldType::UInt8).unwrap()),
                ("b", Field::new(FieldType::String).unwrap()),
            ]))
            .unwrap(),
        ))
        .unwrap();
        let decoded = field
            .decode(Raw::Text("[(1, 'x'), (2, 'y')]".into()), utc())
            .unwrap();
        assert_eq!(
            decoded,
            Value::Array(vec![
                Value::Tuple(vec![Value::Int(1), Value::String("x".into())]),
                Value::Tuple(vec![Value::Int(2), Value::String("y".into())]),
            ])
        );
        let encoded = field.to_db_string(&decoded, true).unwrap();
        assert_eq!(encoded, "[(1, 'x'), (2, 'y')]");
        assert_eq!(field.decode(Raw::Text(encoded), utc()).unwrap(), decoded);
    }

    #[test]
    fn datetime_encoding_is_epoch_seconds() {
        let field = Field::new(FieldType::datetime()).unwrap();
        let value = Value::DateTime(Utc.timestamp_opt(1609459200, 0).unwrap());
        assert_eq!(field.to_db_string(&value, true).unwrap(), "'1609459200'");
        assert_eq!(field.to_db_string(&value, false).unwrap(), "1609459200");
    }

    #[test]
    fn get_sql_scalars() {
        let sql = |field: &Field| field.get_sql(true, None).unwrap();
        assert_eq!(sql(&Field::new(FieldType::String).unwrap()), "String");
        assert_eq!(
            sql(&Field::new(FieldType::fixed_string(16)).unwrap()),
            "FixedString(16)"
        );
        assert_eq!(
            sql(&Field::new(FieldType::decimal(10, 2)).unwrap()),
            "Decimal(10, 2)"
        );
        assert_eq!(sql(&Field::new(FieldType::decimal64(4)).unwrap()), "Decimal64(4)");
        assert_eq!(
            sql(&Field::new(FieldType::datetime_tz("Europe/Berlin")).unwrap()),
            "DateTime('Europe/Berlin')"
        );
        assert_eq!(
            sql(&Field::new(FieldType::datetime64_tz(3, "UTC")).unwrap()),
            "DateTime64(3, 'UTC')"
        );
        assert_eq!(
            sql(&Field::new(FieldType::enum8([("apple", 1), ("banana", 2)])).unwrap()),
            "Enum8('apple' = 1, 'banana' = 2)"
        );
    }

    #[test]
    fn get_sql_composites() {
        let inner = Field::new(FieldType::UInt8).unwrap();
        let field = Field::new(FieldType::nullable(inner)).unwrap();
        assert_eq!(field.get_sql(true, None).unwrap(), "Nullable(UInt8)");

        let field = Field::new(FieldType::array(
            Field::new(FieldType::low_cardinality(
                Field::new(FieldType::String).unwrap(),
            ))
            .unwrap(),
        ))
        .unwrap();
        assert_eq!(
            field.get_sql(true, None).unwrap(),
            "Array(LowCardinality(String))"
        );

        let field = Field::new(FieldType::tuple([
            ("x", Field::new(FieldType::Float64).unwrap()),
            ("y", Field::new(FieldType::Float64).unwrap()),
        ]))
        .unwrap();
        assert_eq!(field.get_sql(true, None).unwrap(), "Tuple(x Float64, y Float64)");

        let field = Field::new(FieldType::map(
            Field::new(FieldType::String).unwrap(),
            Field::new(FieldType::UInt32).unwrap(),
        ))
        .unwrap();
        assert_eq!(field.get_sql(true, None).unwrap(), "Map(String, UInt32)");
    }

    #[test]
    fn get_sql_extra_params() {
        let options = FieldOptions {
            default: Some(Value::Int(42).into()),
            codec: Some("ZSTD(10)".to_string()),
            ..FieldOptions::default()
        };
        let field = Field::with_options(FieldType::UInt32, options).unwrap();
        assert_eq!(
            field.get_sql(true, None).unwrap(),
            "UInt32 DEFAULT 42 CODEC(ZSTD(10))"
        );
        assert_eq!(field.get_sql(false, None).unwrap(), "UInt32");

        let options = FieldOptions {
            alias: Some(Expr::column("other")),
            codec: Some("ZSTD(10)".to_string()),
            ..FieldOptions::default()
        };
        let field = Field::with_options(FieldType::UInt32, options).unwrap();
        // a codec makes no sense on an alias column
        assert_eq!(field.get_sql(true, None).unwrap(), "UInt32 ALIAS other");

        let options = FieldOptions {
            materialized: Some(Expr::raw("rand()")),
            ..FieldOptions::default()
        };
        let field = Field::with_options(FieldType::UInt32, options).unwrap();
        assert_eq!(
            field.get_sql(true, None).unwrap(),
            "UInt32 MATERIALIZED rand()"
        );

        let options = FieldOptions {
            default: Some(Value::String("untitled".into()).into()),
            ..FieldOptions::default()
        };
        let field = Field::with_options(FieldType::String, options).unwrap();
        assert_eq!(field.get_sql(true, None).unwrap(), "String DEFAULT 'untitled'");
    }

    #[test]
    fn get_sql_array_skips_default_expressions() {
        let options = FieldOptions {
            codec: Some("ZSTD(10)".to_string()),
            ..FieldOptions::default()
        };
        let field = Field::with_options(
            FieldType::array(Field::new(FieldType::UInt8).unwrap()),
            options,
        )
        .unwrap();
        assert_eq!(
            field.get_sql(true, None).unwrap(),
            "Array(UInt8) CODEC(ZSTD(10))"
        );
    }

    #[test]
    fn get_sql_respects_server_features() {
        let field = Field::new(FieldType::low_cardinality(
            Field::new(FieldType::String).unwrap(),
        ))
        .unwrap();
        let old_server = ServerFeatures {
            has_codec_support: false,
            has_low_cardinality_support: false,
        };
        assert_eq!(field.get_sql(true, Some(&old_server)).unwrap(), "String");
        assert_eq!(
            field.get_sql(true, Some(&ServerFeatures::default())).unwrap(),
            "LowCardinality(String)"
        );

        let options = FieldOptions {
            codec: Some("Delta".to_string()),
            ..FieldOptions::default()
        };
        let field = Field::with_options(FieldType::UInt32, options).unwrap();
        assert_eq!(field.get_sql(true, Some(&old_server)).unwrap(), "UInt32");
    }
}
