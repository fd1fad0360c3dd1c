/**
Error type covering decoding, validation and field configuration failures.
 */
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// None of the accepted raw forms matched during decoding.
    #[error("invalid value for {kind}: {value}")]
    InvalidValue {
        /// Database type tag of the failing field
        kind: &'static str,
        /// Debug rendering of the offending raw value
        value: String,
    },

    /// A decoded value violates the field's numeric or temporal bounds.
    #[error("{kind} out of range - {value} is not between {min} and {max}")]
    OutOfRange {
        /// Database type tag of the failing field
        kind: &'static str,
        /// The offending value
        value: String,
        /// Lower bound of the field's domain
        min: String,
        /// Upper bound of the field's domain
        max: String,
    },

    /// A value exceeds a fixed size string's byte length ceiling.
    #[error("value of {length} bytes is too long for FixedString({limit})")]
    TooLong {
        /// UTF-8 byte length of the offending value
        length: usize,
        /// Declared length of the column
        limit: usize,
    },

    /// Illegal field configuration, reported at construction time.
    #[error("invalid field configuration: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, value: impl std::fmt::Debug) -> Self {
        Error::InvalidValue {
            kind,
            value: format!("{value:?}"),
        }
    }
}
