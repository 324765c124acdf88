use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A block item had a different form than the caller required.
    #[error("malformed block: expected {expected}, found {found}")]
    MalformedBlock {
        expected: &'static str,
        found: &'static str,
    },

    /// A JSON value could not be decoded as any block item form.
    #[error("invalid block item: {0}")]
    InvalidBlock(String),

    /// A field value does not match the shape its field type declares.
    #[error("malformed {field_type} value: {reason}")]
    MalformedValue { field_type: String, reason: String },

    /// A non-localized field was rebuilt from zero entries.
    #[error("non-localized field `{0}` must have at least one entry")]
    EmptyNonLocalizedEntries(String),

    /// A localized field entry carried no locale.
    #[error("localized field `{0}` has an entry without a locale")]
    MissingLocale(String),

    /// A localized field value is not a locale-keyed mapping.
    #[error("localized field `{field}` expects a locale mapping, got {found}")]
    InvalidLocalizedValue { field: String, found: &'static str },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypeError {
    pub fn malformed_value(field_type: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedValue {
            field_type: field_type.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for TypeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;

/// Human-readable name of a JSON value's kind, used in error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
