use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("schema error: {0}")]
    Schema(#[from] cma_schema::SchemaError),

    #[error("block error: {0}")]
    Blocks(#[from] cma_blocks::BlocksError),

    #[error("type error: {0}")]
    Type(#[from] cma_types::TypeError),
}

impl From<toml::de::Error> for SdkError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SdkError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
