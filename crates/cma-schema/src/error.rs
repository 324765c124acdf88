/// Errors from schema lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No entity type with this id or api key exists in the loaded snapshot.
    #[error("entity type not found: {0}")]
    EntityTypeNotFound(String),

    /// No plugin with this id or package name exists in the loaded snapshot.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    /// The backing schema source failed to answer.
    #[error("schema source error: {0}")]
    Source(String),

    /// A schema snapshot could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
