//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type QueryResult<T> = Result<T, QueryError>;

/// An error reported by the underlying database driver.
///
/// The builder never interprets driver errors beyond the `retryable` flag,
/// which [`Database::transaction`](crate::Database::transaction) uses to decide
/// whether a failed attempt may be replayed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DriverError {
    /// Human readable message from the driver.
    pub message: String,
    /// Driver specific error code (SQLSTATE, vendor code, ...), if any.
    pub code: Option<String>,
    /// Whether the failure is transient (deadlock, serialization failure, lost connection).
    pub retryable: bool,
}

impl DriverError {
    /// Create a non-retryable driver error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            retryable: false,
        }
    }

    /// Create a retryable driver error.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            retryable: true,
        }
    }

    /// Attach a driver specific error code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Error types for query construction and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// Operator outside the supported allow-list
    #[error("Invalid operator: `{0}`")]
    InvalidOperator(String),

    /// A null value compared with something other than `=`, `!=` or `<>`
    #[error("Illegal operator and value combination: `{0}` cannot be used with null")]
    IllegalNullComparison(String),

    /// Chunking requires an explicit ordering
    #[error("You must specify an order by clause on `{0}` when using this function")]
    MissingOrderBy(String),

    /// Invalid argument passed to a builder or action
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A result row did not contain an expected column
    #[error("Missing column in result row: {0}")]
    MissingColumn(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Error reported by the driver
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Rolling back after a failure failed as well
    #[error("Transaction rollback failed: {0}")]
    TransactionRollback(String),
}

impl QueryError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if the failure may succeed when replayed inside a new transaction
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Driver(err) if err.retryable)
    }

    /// Check if this error was raised while validating builder input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperator(_)
                | Self::IllegalNullComparison(_)
                | Self::MissingOrderBy(_)
                | Self::InvalidArgument(_)
        )
    }
}
