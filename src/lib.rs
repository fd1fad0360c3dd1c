//! The typed field layer of chorm, an ORM for ClickHouse.
//!
//! A [Field] pairs one of the closed set of column types in [FieldType] with
//! the per-column settings a model declares (default, alias, materialized,
//! codec, column name). Fields convert between three representations:
//!
//! * [Raw] - loosely typed input, either wire text from the server or a
//!   value handed in by the application
//! * [Value] - the canonical, validated representation
//! * database literals and DDL fragments, via [Field::to_db_string] and
//!   [Field::get_sql]
//!
//! ```
//! use chorm_fields::{Field, FieldType, Raw, Value};
//! use chrono::FixedOffset;
//!
//! # fn main() -> Result<(), chorm_fields::Error> {
//! let utc = FixedOffset::east_opt(0).unwrap();
//! let field = Field::new(FieldType::nullable(Field::new(FieldType::UInt8)?))?;
//! assert_eq!(field.decode(Raw::Text("\\N".into()), utc)?, Value::Null);
//! assert_eq!(field.get_sql(true, None)?, "Nullable(UInt8)");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod escape;
pub mod expr;
pub mod field;
pub mod kind;
pub mod parse;
pub mod value;

mod composite;
mod scalar;

pub use error::Error;
pub use expr::{DefaultValue, Expr};
pub use field::{reset_creation_counter, Field, FieldOptions};
pub use kind::{
    DecimalSpec, DecimalWidth, EnumMember, EnumSpec, EnumWidth, FieldType, TypeClass,
    DEFAULT_DATETIME64_PRECISION,
};
pub use value::{Raw, Value};

/**
Capabilities of the server a DDL statement is rendered for.

Older servers understand neither column codecs nor LowCardinality;
[Field::get_sql] degrades gracefully when a flag is unset. The default
assumes a current server.
 */
#[derive(Copy, Clone, Debug)]
pub struct ServerFeatures {
    /// Whether `CODEC(...)` clauses are understood
    pub has_codec_support: bool,
    /// Whether the LowCardinality type is available
    pub has_low_cardinality_support: bool,
}

impl Default for ServerFeatures {
    fn default() -> Self {
        ServerFeatures {
            has_codec_support: true,
            has_low_cardinality_support: true,
        }
    }
}
