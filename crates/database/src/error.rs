use shard_types::DataKind;
use std::any::Any;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShardError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("parquet: {0}")]
    Pq(#[from] parquet::errors::ParquetError),

    /// The file matched the expected kind/date but lacks a selected column.
    #[error("{kind}: missing column '{column}'")]
    MissingColumn { kind: DataKind, column: String },
    #[error("column '{column}' is not {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },
    #[error("short read in required column '{column}': expected {expected} values, got {got}")]
    ShortRead {
        column: String,
        expected: usize,
        got: usize,
    },
    /// Level stream promised a value the value buffer does not hold.
    #[error("value buffer underflow in column '{column}'")]
    ValueUnderflow { column: String },
    /// The decoder panicked on malformed page data.
    #[error("decoder panicked: {0}")]
    Decode(String),

    #[error("px sampling requires an explicit market (fut or spot)")]
    SamplingRequiresMarket,
}

impl ShardError {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        ShardError::Decode(msg)
    }
}

pub type Result<T, E = ShardError> = std::result::Result<T, E>;
