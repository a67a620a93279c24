//! # sqlweave
//!
//! A fluent, dialect-agnostic SQL query builder.
//!
//! ## Features
//!
//! - **No hand-assembled SQL**: clauses accumulate on a [`Builder`] and compile in a fixed order
//! - **Positional bindings**: values are bound per clause category, so placeholders and
//!   parameters always line up, sub-queries and unions included
//! - **Dialects**: generic, MySQL, PostgreSQL and SQLite grammars behind one [`Grammar`] trait
//! - **Actions**: `get`, `first`, `pluck`, aggregates, chunking, inserts, updates, deletes
//! - **Transactions**: nested transactions via savepoints, retry of transient failures
//! - **Pretend mode**: capture the statements a closure would run without running them
//!
//! ## Usage
//!
//! ```ignore
//! use sqlweave::prelude::*;
//!
//! let db = Database::new(driver, DatabaseConfig::new().with_dialect(Dialect::Postgres));
//!
//! // SELECT
//! let mut q = db.table("users");
//! q.select(["*"]).where_("id", ">", 5)?.order_by("id", "desc").limit(10);
//! let rows = q.get(&db).await?;
//!
//! // INSERT
//! db.table("users")
//!     .insert(&db, record([("name", "alice"), ("email", "alice@example.com")]))
//!     .await?;
//!
//! // UPDATE
//! db.table("users")
//!     .where_eq("id", 7)
//!     .update(&db, record([("status", "inactive")]))
//!     .await?;
//!
//! // DELETE
//! db.table("users").where_eq("id", 7).delete(&db).await?;
//! ```

pub mod connection;
pub mod error;
pub mod grammar;
pub mod prelude;
pub mod query;
pub mod row;
pub mod value;

pub use connection::{
    ColumnMeta, Connection, Database, DatabaseConfig, Driver, LoggedQuery, ResultSet,
};
pub use error::{DriverError, QueryError, QueryResult};
pub use grammar::{
    Dialect, GenericGrammar, Grammar, IdentifierQuote, MySqlGrammar, PostgresGrammar,
    SqliteGrammar,
};
pub use query::{
    BindingKind, Bindings, Boolean, Builder, Component, Conditions, DatePart, Direction,
    JoinClause, JoinKind, Lock, Record, record,
};
pub use row::{ColumnType, FromRow, FromValue, Row};
pub use value::Value;
