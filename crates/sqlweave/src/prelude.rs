//! Convenient imports for typical `sqlweave` usage.
//!
//! ```ignore
//! use sqlweave::prelude::*;
//! ```

pub use crate::{
    Builder, Conditions, Connection, Database, DatabaseConfig, Dialect, Direction, FromRow,
    QueryError, QueryResult, Record, Row, Value, record,
};
