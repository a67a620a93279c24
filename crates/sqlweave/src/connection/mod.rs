//! Database connections: the [`Connection`] contract consumed by builders,
//! the narrow [`Driver`] contract implemented by physical drivers, and
//! [`Database`], which implements the former on top of the latter.
//!
//! ```ignore
//! use sqlweave::prelude::*;
//!
//! let db = Database::new(driver, DatabaseConfig::new().with_dialect(Dialect::Postgres));
//! let active = db.table("users").where_eq("active", true).count(&db).await?;
//!
//! db.transaction(3, async |db| {
//!     db.table("accounts").where_eq("id", 1).decrement(db, "balance", 100, Record::new()).await?;
//!     db.table("accounts").where_eq("id", 2).increment(db, "balance", 100, Record::new()).await?;
//!     Ok(())
//! })
//! .await?;
//! ```

mod config;
mod database;
mod driver;

pub use config::DatabaseConfig;
pub use database::{Database, LoggedQuery};
pub use driver::{ColumnMeta, Driver, ResultSet};

use crate::error::QueryResult;
use crate::grammar::Grammar;
use crate::query::Builder;
use crate::row::Row;
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// What a builder needs from a database connection.
///
/// Builders compile themselves and hand SQL plus bindings to one of these
/// methods; each action awaits exactly one of them per statement.
pub trait Connection: Send + Sync {
    /// Grammar used by builders created from this connection.
    fn grammar(&self) -> Arc<dyn Grammar>;

    /// Run a select and return all rows.
    fn select(
        &self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = QueryResult<Vec<Row>>> + Send;

    /// Run an insert.
    fn insert(&self, sql: &str, bindings: &[Value]) -> impl Future<Output = QueryResult<bool>> + Send;

    /// Run an insert and return the generated key.
    ///
    /// The default implementation runs the statement as a select and returns
    /// the first column of the first row, which suits `insert .. returning`.
    fn insert_get_id(
        &self,
        sql: &str,
        bindings: &[Value],
        sequence: Option<&str>,
    ) -> impl Future<Output = QueryResult<Value>> + Send {
        let _ = sequence;
        async move {
            let rows = self.select(sql, bindings).await?;
            Ok(rows
                .first()
                .and_then(|row| row.get_index(0))
                .cloned()
                .unwrap_or_default())
        }
    }

    /// Run an update and return the number of affected rows.
    fn update(&self, sql: &str, bindings: &[Value]) -> impl Future<Output = QueryResult<u64>> + Send;

    /// Run a delete and return the number of affected rows.
    fn delete(&self, sql: &str, bindings: &[Value]) -> impl Future<Output = QueryResult<u64>> + Send;

    /// Run any statement.
    fn statement(&self, sql: &str, bindings: &[Value])
    -> impl Future<Output = QueryResult<bool>> + Send;

    /// Run a statement and return the number of affected rows.
    fn affecting_statement(
        &self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = QueryResult<u64>> + Send;

    /// Start a builder on `table`.
    fn table(&self, table: impl Into<Value>) -> Builder {
        let mut query = Builder::new(self.grammar());
        query.from(table);
        query
    }

    /// Raw SQL expression, emitted verbatim.
    fn raw(&self, sql: impl Into<String>) -> Value {
        Value::raw(sql)
    }
}
