//! The closed catalog of column types.
//!
//! Instead of one subclass per database type, the whole catalog is a single
//! sum type; the conversion, validation and DDL rendering operations are
//! exhaustive matches over it. Illegal nestings (array of array,
//! low cardinality of array, ...) are rejected when a [Field] is constructed.
//!
//! [Field]: crate::field::Field

use std::collections::HashSet;
use std::sync::OnceLock;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use regex::Regex;

use crate::error::Error;
use crate::escape::escape;
use crate::field::Field;
use crate::value::Value;

/// Default fractional digit count of a DateTime64 column.
pub const DEFAULT_DATETIME64_PRECISION: u8 = 6;

/**
Fixed storage width of a Decimal32/64/128 column.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecimalWidth {
    /// Decimal32, 9 significant digits
    B32,
    /// Decimal64, 18 significant digits
    B64,
    /// Decimal128, 38 significant digits
    B128,
}

impl DecimalWidth {
    /// The precision implied by this width.
    pub fn precision(self) -> u8 {
        match self {
            DecimalWidth::B32 => 9,
            DecimalWidth::B64 => 18,
            DecimalWidth::B128 => 38,
        }
    }

    fn db_type(self) -> &'static str {
        match self {
            DecimalWidth::B32 => "Decimal32",
            DecimalWidth::B64 => "Decimal64",
            DecimalWidth::B128 => "Decimal128",
        }
    }
}

/**
Configuration of a Decimal(P, S) column or one of its fixed width forms.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecimalSpec {
    /// Total significant digits, 1 to 38
    pub precision: u8,
    /// Fractional digits, 0 to `precision`
    pub scale: u8,
    /// Set for the Decimal32/64/128 forms, which pin the precision
    pub width: Option<DecimalWidth>,
}

impl DecimalSpec {
    pub(crate) fn check(&self) -> Result<(), Error> {
        if !(1..=38).contains(&self.precision) {
            return Err(Error::Configuration(format!(
                "Decimal precision must be between 1 and 38, got {}",
                self.precision
            )));
        }
        if self.scale > self.precision {
            return Err(Error::Configuration(format!(
                "Decimal scale must be between 0 and the precision {}, got {}",
                self.precision, self.scale
            )));
        }
        if let Some(width) = self.width {
            if self.precision != width.precision() {
                return Err(Error::Configuration(format!(
                    "{} implies precision {}, got {}",
                    width.db_type(),
                    width.precision(),
                    self.precision
                )));
            }
        }
        Ok(())
    }

    /// Largest representable value: `10^(precision-scale) - 10^-scale`.
    pub fn max_value(&self) -> BigDecimal {
        let mut digits = BigInt::from(1);
        for _ in 0..self.precision {
            digits *= 10;
        }
        BigDecimal::new(digits - 1, self.scale as i64)
    }

    /// Smallest representable value, the negated maximum.
    pub fn min_value(&self) -> BigDecimal {
        -self.max_value()
    }
}

/**
Storage width of an enum column.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnumWidth {
    /// 8 bit codes
    Enum8,
    /// 16 bit codes
    Enum16,
}

/**
A single name to code mapping of an enum column.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember {
    /// Member name, the value's wire representation
    pub name: String,
    /// Integer code stored by the server
    pub code: i16,
}

/**
Configuration of an Enum8 or Enum16 column.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumSpec {
    /// Storage width; Enum8 restricts codes to the i8 range
    pub width: EnumWidth,
    /// Members in declaration order; the first one is the class default
    pub members: Vec<EnumMember>,
}

impl EnumSpec {
    /// Collects the given name/code pairs into an enum description.
    pub fn new<N: Into<String>>(
        width: EnumWidth,
        members: impl IntoIterator<Item = (N, i16)>,
    ) -> Self {
        EnumSpec {
            width,
            members: members
                .into_iter()
                .map(|(name, code)| EnumMember {
                    name: name.into(),
                    code,
                })
                .collect(),
        }
    }

    /**
    Given an SQL column description such as `Enum8('apple' = 1, 'banana' = 2)`
    this returns the matching enum description.
     */
    pub fn from_db_type(db_type: &str) -> Result<EnumSpec, Error> {
        static MEMBER_RE: OnceLock<Regex> = OnceLock::new();
        let member_re = MEMBER_RE
            .get_or_init(|| Regex::new(r"'([\w ]+)' = (-?\d+)").expect("hardcoded pattern"));

        let width = if db_type.starts_with("Enum8") {
            EnumWidth::Enum8
        } else if db_type.starts_with("Enum16") {
            EnumWidth::Enum16
        } else {
            return Err(Error::invalid("Enum", db_type));
        };
        let mut members = Vec::new();
        for captures in member_re.captures_iter(db_type) {
            let code = captures[2]
                .parse::<i16>()
                .map_err(|_| Error::invalid("Enum", db_type))?;
            members.push(EnumMember {
                name: captures[1].to_string(),
                code,
            });
        }
        Ok(EnumSpec { width, members })
    }

    pub(crate) fn check(&self) -> Result<(), Error> {
        if self.members.is_empty() {
            return Err(Error::Configuration(
                "enum columns need at least one member".to_string(),
            ));
        }
        let mut names = HashSet::new();
        for member in &self.members {
            if !names.insert(member.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate enum member name {:?}",
                    member.name
                )));
            }
            if self.width == EnumWidth::Enum8 && i8::try_from(member.code).is_err() {
                return Err(Error::Configuration(format!(
                    "code {} of member {:?} does not fit Enum8",
                    member.code, member.name
                )));
            }
        }
        Ok(())
    }

    /// Looks a member up by name.
    pub fn by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|member| member.name == name)
    }

    /// Looks a member up by code.
    pub fn by_code(&self, code: i16) -> Option<&EnumMember> {
        self.members.iter().find(|member| member.code == code)
    }
}

/**
Coarse classes of column types, used for capability checks such as
"any integer column, possibly wrapped in Nullable".
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeClass {
    String,
    FixedString,
    Date,
    DateTime,
    DateTime64,
    Integer,
    Float,
    Decimal,
    Enum,
    Uuid,
    Ipv4,
    Ipv6,
    Json,
    Array,
    Tuple,
    Map,
    Nullable,
    LowCardinality,
}

impl TypeClass {
    /// Whether a column of class `self` counts as `wanted`. FixedString
    /// counts as String and DateTime64 as DateTime, matching their shared
    /// conversion rules.
    pub(crate) fn matches(self, wanted: TypeClass) -> bool {
        self == wanted
            || (self == TypeClass::FixedString && wanted == TypeClass::String)
            || (self == TypeClass::DateTime64 && wanted == TypeClass::DateTime)
    }
}

/**
The closed set of column types.

Composite variants own their inner field(s) exclusively. Constructing a
[Field] checks the configuration and rejects illegal nestings.

[Field]: crate::field::Field
 */
#[derive(Clone, Debug, strum::IntoStaticStr)]
pub enum FieldType {
    String,
    FixedString {
        /// Fixed byte length of the column
        length: usize,
    },
    Date,
    DateTime {
        /// Optional fixed timezone, rendered as a DDL type argument
        timezone: Option<String>,
    },
    DateTime64 {
        /// Fractional digits stored, 0 to 9
        precision: u8,
        /// Optional fixed timezone, rendered as the second DDL type argument
        timezone: Option<String>,
    },
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal(DecimalSpec),
    Enum(EnumSpec),
    #[strum(serialize = "UUID")]
    Uuid,
    #[strum(serialize = "IPv4")]
    Ipv4,
    #[strum(serialize = "IPv6")]
    Ipv6,
    /// Experimental, an opaque pass-through scalar
    #[strum(serialize = "JSON")]
    Json,
    Array {
        /// Element field; must not itself be array typed
        inner: Box<Field>,
    },
    Tuple {
        /// Named members in declaration order; names must be distinct
        members: Vec<(String, Field)>,
    },
    Map {
        /// Key field, restricted to hashable-key-capable kinds
        key: Box<Field>,
        /// Value field, unrestricted
        value: Box<Field>,
    },
    Nullable {
        /// The wrapped field
        inner: Box<Field>,
        /// Values treated as absent; always contains [Value::Null]
        null_values: Vec<Value>,
    },
    LowCardinality {
        /// The wrapped field; must not be Array or LowCardinality typed
        inner: Box<Field>,
    },
}

impl FieldType {
    /// Shorthand for a FixedString column.
    pub fn fixed_string(length: usize) -> Self {
        FieldType::FixedString { length }
    }

    /// Shorthand for a DateTime column without a fixed timezone.
    pub fn datetime() -> Self {
        FieldType::DateTime { timezone: None }
    }

    /// Shorthand for a DateTime column pinned to the given timezone.
    pub fn datetime_tz(timezone: impl Into<String>) -> Self {
        FieldType::DateTime {
            timezone: Some(timezone.into()),
        }
    }

    /// Shorthand for a DateTime64 column with the given sub-second precision.
    pub fn datetime64(precision: u8) -> Self {
        FieldType::DateTime64 {
            precision,
            timezone: None,
        }
    }

    /// Shorthand for a DateTime64 column pinned to the given timezone.
    pub fn datetime64_tz(precision: u8, timezone: impl Into<String>) -> Self {
        FieldType::DateTime64 {
            precision,
            timezone: Some(timezone.into()),
        }
    }

    /// Shorthand for a Decimal(precision, scale) column.
    pub fn decimal(precision: u8, scale: u8) -> Self {
        FieldType::Decimal(DecimalSpec {
            precision,
            scale,
            width: None,
        })
    }

    /// Shorthand for a Decimal32(scale) column.
    pub fn decimal32(scale: u8) -> Self {
        Self::fixed_decimal(DecimalWidth::B32, scale)
    }

    /// Shorthand for a Decimal64(scale) column.
    pub fn decimal64(scale: u8) -> Self {
        Self::fixed_decimal(DecimalWidth::B64, scale)
    }

    /// Shorthand for a Decimal128(scale) column.
    pub fn decimal128(scale: u8) -> Self {
        Self::fixed_decimal(DecimalWidth::B128, scale)
    }

    fn fixed_decimal(width: DecimalWidth, scale: u8) -> Self {
        FieldType::Decimal(DecimalSpec {
            precision: width.precision(),
            scale,
            width: Some(width),
        })
    }

    /// Shorthand for an Enum8 column.
    pub fn enum8<N: Into<String>>(members: impl IntoIterator<Item = (N, i16)>) -> Self {
        FieldType::Enum(EnumSpec::new(EnumWidth::Enum8, members))
    }

    /// Shorthand for an Enum16 column.
    pub fn enum16<N: Into<String>>(members: impl IntoIterator<Item = (N, i16)>) -> Self {
        FieldType::Enum(EnumSpec::new(EnumWidth::Enum16, members))
    }

    /// Shorthand for an Array column over the given element field.
    pub fn array(inner: Field) -> Self {
        FieldType::Array {
            inner: Box::new(inner),
        }
    }

    /// Shorthand for a Tuple column over the given named members.
    pub fn tuple<N: Into<String>>(members: impl IntoIterator<Item = (N, Field)>) -> Self {
        FieldType::Tuple {
            members: members
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
        }
    }

    /// Shorthand for a Map column.
    pub fn map(key: Field, value: Field) -> Self {
        FieldType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Shorthand for a Nullable column recognizing only the canonical null.
    pub fn nullable(inner: Field) -> Self {
        Self::nullable_with(inner, Vec::new())
    }

    /// A Nullable column that additionally treats the given application
    /// level sentinel values as absent.
    pub fn nullable_with(inner: Field, extra_null_values: Vec<Value>) -> Self {
        let mut null_values = vec![Value::Null];
        null_values.extend(extra_null_values);
        FieldType::Nullable {
            inner: Box::new(inner),
            null_values,
        }
    }

    /// Shorthand for a LowCardinality column over the given field.
    pub fn low_cardinality(inner: Field) -> Self {
        FieldType::LowCardinality {
            inner: Box::new(inner),
        }
    }

    /// The base name of the database type, without type arguments.
    pub fn db_type(&self) -> &'static str {
        match self {
            FieldType::Decimal(spec) => match spec.width {
                None => "Decimal",
                Some(width) => width.db_type(),
            },
            FieldType::Enum(spec) => match spec.width {
                EnumWidth::Enum8 => "Enum8",
                EnumWidth::Enum16 => "Enum16",
            },
            other => other.into(),
        }
    }

    /// The arguments rendered inside the parentheses of the DDL type.
    pub fn db_type_args(&self) -> Vec<String> {
        match self {
            FieldType::FixedString { length } => vec![length.to_string()],
            FieldType::DateTime { timezone } => timezone
                .iter()
                .map(|timezone| escape(timezone, true))
                .collect(),
            FieldType::DateTime64 {
                precision,
                timezone,
            } => {
                let mut args = vec![precision.to_string()];
                args.extend(timezone.iter().map(|timezone| escape(timezone, true)));
                args
            }
            FieldType::Decimal(spec) => {
                if spec.width.is_some() {
                    vec![spec.scale.to_string()]
                } else {
                    vec![spec.precision.to_string(), spec.scale.to_string()]
                }
            }
            FieldType::Enum(spec) => spec
                .members
                .iter()
                .map(|member| format!("{} = {}", escape(&member.name, true), member.code))
                .collect(),
            // composite types render their arguments through get_sql
            _ => Vec::new(),
        }
    }

    /// The class of this type.
    pub fn class(&self) -> TypeClass {
        match self {
            FieldType::String => TypeClass::String,
            FieldType::FixedString { .. } => TypeClass::FixedString,
            FieldType::Date => TypeClass::Date,
            FieldType::DateTime { .. } => TypeClass::DateTime,
            FieldType::DateTime64 { .. } => TypeClass::DateTime64,
            FieldType::UInt8
            | FieldType::UInt16
            | FieldType::UInt32
            | FieldType::UInt64
            | FieldType::Int8
            | FieldType::Int16
            | FieldType::Int32
            | FieldType::Int64 => TypeClass::Integer,
            FieldType::Float32 | FieldType::Float64 => TypeClass::Float,
            FieldType::Decimal(_) => TypeClass::Decimal,
            FieldType::Enum(_) => TypeClass::Enum,
            FieldType::Uuid => TypeClass::Uuid,
            FieldType::Ipv4 => TypeClass::Ipv4,
            FieldType::Ipv6 => TypeClass::Ipv6,
            FieldType::Json => TypeClass::Json,
            FieldType::Array { .. } => TypeClass::Array,
            FieldType::Tuple { .. } => TypeClass::Tuple,
            FieldType::Map { .. } => TypeClass::Map,
            FieldType::Nullable { .. } => TypeClass::Nullable,
            FieldType::LowCardinality { .. } => TypeClass::LowCardinality,
        }
    }

    /// The type specific zero value.
    pub fn class_default(&self) -> Value {
        match self {
            FieldType::String | FieldType::FixedString { .. } => Value::String(String::new()),
            FieldType::Json => Value::String("{}".to_string()),
            FieldType::Date => Value::Date(crate::scalar::date_min()),
            FieldType::DateTime { .. } | FieldType::DateTime64 { .. } => {
                Value::DateTime(crate::scalar::epoch())
            }
            FieldType::UInt8
            | FieldType::UInt16
            | FieldType::UInt32
            | FieldType::UInt64
            | FieldType::Int8
            | FieldType::Int16
            | FieldType::Int32
            | FieldType::Int64 => Value::Int(0),
            FieldType::Float32 | FieldType::Float64 => Value::Float(0.0.into()),
            FieldType::Decimal(spec) => {
                Value::Decimal(BigDecimal::new(BigInt::from(0), spec.scale as i64))
            }
            FieldType::Enum(spec) => spec
                .members
                .first()
                .map(|member| Value::Enum(member.name.clone()))
                .unwrap_or(Value::Null),
            FieldType::Uuid => Value::Uuid(uuid::Uuid::nil()),
            FieldType::Ipv4 => Value::Ipv4(std::net::Ipv4Addr::from(0u32)),
            FieldType::Ipv6 => Value::Ipv6(std::net::Ipv6Addr::from(0u128)),
            FieldType::Array { .. } => Value::Array(Vec::new()),
            FieldType::Tuple { members } => Value::Tuple(
                members
                    .iter()
                    .map(|(_, field)| field.class_default())
                    .collect(),
            ),
            FieldType::Map { .. } => Value::Map(Vec::new()),
            FieldType::Nullable { .. } => Value::Null,
            FieldType::LowCardinality { inner } => inner.class_default(),
        }
    }

    /// The `[min, max]` domain of integer types.
    pub(crate) fn int_bounds(&self) -> Option<(i128, i128)> {
        Some(match self {
            FieldType::UInt8 => (0, u8::MAX as i128),
            FieldType::UInt16 => (0, u16::MAX as i128),
            FieldType::UInt32 => (0, u32::MAX as i128),
            FieldType::UInt64 => (0, u64::MAX as i128),
            FieldType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            FieldType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            FieldType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            FieldType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            _ => return None,
        })
    }

    /// Checks one level of configuration; inner fields were already checked
    /// when they were constructed.
    pub(crate) fn check(&self) -> Result<(), Error> {
        match self {
            FieldType::FixedString { length } => {
                if *length == 0 {
                    return Err(Error::Configuration(
                        "FixedString length must be positive".to_string(),
                    ));
                }
            }
            FieldType::DateTime64 { precision, .. } => {
                if *precision > 9 {
                    return Err(Error::Configuration(format!(
                        "DateTime64 precision must be at most 9, got {precision}"
                    )));
                }
            }
            FieldType::Decimal(spec) => spec.check()?,
            FieldType::Enum(spec) => spec.check()?,
            FieldType::Array { inner } => {
                if inner.ty().class() == TypeClass::Array {
                    return Err(Error::Configuration(
                        "multidimensional Array columns are not supported".to_string(),
                    ));
                }
            }
            FieldType::Tuple { members } => {
                let mut names = HashSet::new();
                for (name, field) in members {
                    if !names.insert(name.as_str()) {
                        return Err(Error::Configuration(format!(
                            "duplicate tuple member name {name:?}"
                        )));
                    }
                    let class = field.ty().class();
                    if class == TypeClass::Array || class == TypeClass::Tuple {
                        return Err(Error::Configuration(format!(
                            "{} members are not supported inside Tuple",
                            field.ty().db_type()
                        )));
                    }
                }
            }
            FieldType::Map { key, .. } => {
                let allowed = [
                    TypeClass::String,
                    TypeClass::Integer,
                    TypeClass::Date,
                    TypeClass::DateTime,
                    TypeClass::Enum,
                    TypeClass::Uuid,
                    TypeClass::LowCardinality,
                ];
                let class = key.ty().class();
                if !allowed.iter().any(|wanted| class.matches(*wanted)) {
                    return Err(Error::Configuration(format!(
                        "{} is not a valid Map key type",
                        key.ty().db_type()
                    )));
                }
            }
            FieldType::LowCardinality { inner } => match inner.ty().class() {
                TypeClass::Array => {
                    return Err(Error::Configuration(
                        "Array inside LowCardinality is not supported, \
                         use Array(LowCardinality(...)) instead"
                            .to_string(),
                    ));
                }
                TypeClass::LowCardinality => {
                    return Err(Error::Configuration(
                        "LowCardinality may not wrap another LowCardinality".to_string(),
                    ));
                }
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }
}
