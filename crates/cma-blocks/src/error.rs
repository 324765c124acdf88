use cma_schema::SchemaError;
use cma_types::TypeError;

/// Errors raised while traversing blocks.
///
/// Traversal entry points are generic over the callback's error type `E`
/// with `E: From<BlocksError>`, so callers can use their own error enum and
/// still receive engine failures through it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlocksError {
    /// A field value or block item did not have the expected shape.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The schema lookup for a block's model failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A callback stopped the traversal.
    #[error("traversal aborted: {0}")]
    Aborted(String),
}

impl BlocksError {
    /// Convenience for callbacks that want to stop with a message.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted(reason.into())
    }
}

/// Result alias for block traversal.
pub type BlocksResult<T> = Result<T, BlocksError>;
