//! Fluent query builder.
//!
//! # Features
//!
//! - **Clause accumulation**: select, joins, nested predicates, grouping, ordering,
//!   pagination, unions and locks, compiled in a fixed clause order
//! - **Categorized bindings**: bound values are kept per clause category so the
//!   flattened list always matches placeholder order, including sub-queries
//! - **Shared predicate API**: [`Builder`] and [`JoinClause`] both implement
//!   [`Conditions`]
//! - **Actions**: `get`, `first`, aggregates, chunking, inserts, updates and
//!   deletes run through any [`Connection`](crate::Connection)
//!
//! # Usage
//!
//! ```ignore
//! use sqlweave::prelude::*;
//!
//! let mut q = db.table("users as u");
//! q.select(["u.id", "u.name", "p.title"])
//!     .join("posts as p", "p.user_id", "=", "u.id")?
//!     .where_nested(|q| {
//!         q.where_eq("u.active", true).or_where("u.role", "=", "admin")?;
//!         Ok(())
//!     })?
//!     .latest("p.created_at")
//!     .limit(20);
//! let rows = q.get(&db).await?;
//!
//! // Aggregates leave the builder reusable.
//! let total = q.count(&db).await?;
//! ```

mod bindings;
mod builder;
mod clause;
mod compile;
mod conditions;
mod exec;
mod join;

pub use bindings::{BindingKind, Bindings};
pub use builder::Builder;
pub use clause::{
    Aggregate, Boolean, Component, Condition, DatePart, Direction, JoinKind, Lock, OPERATORS,
    Order, Union, Where,
};
pub use conditions::Conditions;
pub use join::JoinClause;

use crate::value::Value;
use std::collections::BTreeMap;

/// Column values for inserts and updates. Keys are column names.
pub type Record = BTreeMap<String, Value>;

/// Build a [`Record`] from `(column, value)` pairs.
///
/// ```ignore
/// let user = record([("name", Value::from("ada")), ("age", Value::from(36))]);
/// ```
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests;
