use crate::error::{QueryError, QueryResult};
use crate::grammar::Dialect;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`Database`](super::Database).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```ignore
/// let config = DatabaseConfig::from_json(r#"{"dialect": "mysql", "table_prefix": "app_"}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database name, informational.
    pub database: String,
    /// Prefix applied to every table name.
    pub table_prefix: String,
    /// SQL dialect used to build the grammar.
    pub dialect: Dialect,
    /// Attempts made by [`Database::with_transaction`](super::Database::with_transaction).
    pub transaction_attempts: u32,
    /// Record executed statements in the query log from the start.
    pub log_queries: bool,
    /// Statements slower than this many milliseconds are logged as warnings.
    pub slow_query_threshold: Option<u64>,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            table_prefix: String::new(),
            dialect: Dialect::Generic,
            transaction_attempts: 1,
            log_queries: false,
            slow_query_threshold: None,
            max_sql_length: Some(200),
        }
    }
}

impl DatabaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| QueryError::invalid_argument(format!("invalid database config: {e}")))
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_transaction_attempts(mut self, attempts: u32) -> Self {
        self.transaction_attempts = attempts;
        self
    }

    /// Record executed statements in the query log.
    pub fn enable_query_log(mut self) -> Self {
        self.log_queries = true;
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_threshold.map(Duration::from_millis)
    }
}
