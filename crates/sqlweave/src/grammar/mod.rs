//! SQL grammars: identifier quoting, value rendering and dialect hooks.
//!
//! A [`Grammar`] knows how to render identifiers and parameters for one SQL
//! dialect. The clause lowering itself lives in [`crate::query`]; grammars
//! only supply the pieces that differ between databases.
//!
//! ```ignore
//! use sqlweave::grammar::{Dialect, Grammar};
//! use sqlweave::Value;
//!
//! let grammar = Dialect::Postgres.grammar("app_");
//! assert_eq!(grammar.wrap_table(&Value::from("users as u")), r#""app_users" as "u""#);
//! ```

mod generic;
mod mysql;
mod postgres;
mod sqlite;

pub use generic::GenericGrammar;
pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

use crate::query::{DatePart, Lock};
use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

static ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+as\s+").expect("invalid built-in alias regex"));

/// Split `"expr as alias"` (any case, any surrounding whitespace) into its two halves.
pub fn split_alias(value: &str) -> Option<(&str, &str)> {
    let found = ALIAS.find(value)?;
    Some((&value[..found.start()], &value[found.end()..]))
}

/// Identifier quote characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierQuote {
    pub open: char,
    pub close: char,
}

impl IdentifierQuote {
    /// ANSI double quotes: `"name"`.
    pub const DOUBLE: Self = Self {
        open: '"',
        close: '"',
    };
    /// MySQL backticks: `` `name` ``.
    pub const BACKTICK: Self = Self {
        open: '`',
        close: '`',
    };
    /// SQL Server brackets: `[name]`.
    pub const BRACKET: Self = Self {
        open: '[',
        close: ']',
    };
}

impl Default for IdentifierQuote {
    fn default() -> Self {
        Self::DOUBLE
    }
}

/// Identifier and value rendering for one SQL dialect.
///
/// Implementors provide the quote characters, the table prefix and the
/// dialect hooks; every wrapping helper is provided on top of those.
/// None of the rendering methods fail.
pub trait Grammar: fmt::Debug + Send + Sync {
    /// Dialect this grammar renders.
    fn dialect(&self) -> Dialect;

    /// Identifier quote characters.
    fn quote(&self) -> IdentifierQuote;

    /// Prefix prepended to every table name.
    fn table_prefix(&self) -> &str;

    /// Replace the table prefix.
    ///
    /// Only reachable before the grammar is shared behind an `Arc`.
    fn set_table_prefix(&mut self, prefix: &str);

    // ==================== Identifier rendering ====================

    /// Wrap a table name, applying the table prefix.
    fn wrap_table(&self, table: &Value) -> String {
        match table {
            Value::Raw(sql) => sql.clone(),
            other => {
                let name = other.to_text();
                match split_alias(&name) {
                    Some(_) => self.wrap_aliased(&name, true),
                    None => self.wrap_segments(&format!("{}{}", self.table_prefix(), name), false),
                }
            }
        }
    }

    /// Wrap a column reference or other identifier.
    ///
    /// With `prefix_alias` set, an aliased value (`t as a`) is treated as a
    /// table and the prefix goes on its left-hand side.
    fn wrap(&self, value: &Value, prefix_alias: bool) -> String {
        match value {
            Value::Raw(sql) => sql.clone(),
            other => {
                let text = other.to_text();
                if split_alias(&text).is_some() {
                    self.wrap_aliased(&text, prefix_alias)
                } else {
                    self.wrap_segments(&text, true)
                }
            }
        }
    }

    /// Wrap a column reference whose first segment may name a table alias.
    ///
    /// Same as [`Grammar::wrap`], except that a first segment found in
    /// `aliases` is left unprefixed.
    fn wrap_column(&self, value: &Value, aliases: &[String]) -> String {
        let Value::Text(text) = value else {
            return self.wrap(value, false);
        };
        let (column, alias) = match split_alias(text) {
            Some((left, alias)) => (left.trim(), Some(alias.trim())),
            None => (text.as_str(), None),
        };
        let first = column.split('.').next().unwrap_or(column);
        let wrapped = self.wrap_segments(column, !aliases.iter().any(|a| a == first));
        match alias {
            Some(alias) => format!("{wrapped} as {}", self.wrap_value(alias)),
            None => wrapped,
        }
    }

    /// Wrap `"left as alias"`.
    fn wrap_aliased(&self, value: &str, prefix_alias: bool) -> String {
        let Some((left, alias)) = split_alias(value) else {
            return self.wrap_segments(value, true);
        };
        let left = if prefix_alias {
            self.wrap_segments(&format!("{}{}", self.table_prefix(), left.trim()), false)
        } else {
            self.wrap_segments(left.trim(), true)
        };
        format!("{left} as {}", self.wrap_value(alias.trim()))
    }

    /// Quote each dotted segment; with `prefix_table` the first of several
    /// segments is a table name and receives the prefix.
    fn wrap_segments(&self, value: &str, prefix_table: bool) -> String {
        let segments: Vec<&str> = value.split('.').collect();
        let many = segments.len() > 1;
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if i == 0 && many && prefix_table {
                    self.wrap_value(&format!("{}{}", self.table_prefix(), segment))
                } else {
                    self.wrap_value(segment)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote a single identifier segment. `*` is never quoted.
    fn wrap_value(&self, segment: &str) -> String {
        if segment == "*" {
            return segment.to_string();
        }
        let quote = self.quote();
        let doubled: String = [quote.close, quote.close].iter().collect();
        format!(
            "{}{}{}",
            quote.open,
            segment.replace(quote.close, &doubled),
            quote.close
        )
    }

    /// Wrap every column and join with `, `.
    fn columnize(&self, columns: &[Value]) -> String {
        columns
            .iter()
            .map(|c| self.wrap(c, false))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Placeholder for a value: `?`, or the text of a raw expression.
    fn parameter(&self, value: &Value) -> String {
        match value {
            Value::Raw(sql) => sql.clone(),
            _ => "?".to_string(),
        }
    }

    /// Placeholders for a list of values joined with `, `.
    fn parameterize(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.parameter(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the value is a raw expression.
    fn is_expression(&self, value: &Value) -> bool {
        value.is_raw()
    }

    /// Text of a value as it would be emitted verbatim.
    fn get_value(&self, value: &Value) -> String {
        value.to_text()
    }

    // ==================== Dialect hooks ====================

    /// Predicate on a date part of a column. `column` is already wrapped.
    fn date_based(&self, part: DatePart, column: &str, operator: &str, parameter: &str) -> String {
        format!("{}({column}) {operator} {parameter}", part.as_str())
    }

    /// Locking clause.
    fn compile_lock(&self, lock: &Lock) -> String {
        match lock {
            Lock::Exclusive => "for update".to_string(),
            Lock::Shared => "for share".to_string(),
            Lock::Raw(sql) => sql.clone(),
        }
    }

    /// Expression ordering rows randomly.
    fn compile_random(&self, seed: &str) -> String {
        let _ = seed;
        "RANDOM()".to_string()
    }

    /// Suffix appended to an insert so the statement reports the new key.
    fn compile_insert_get_id_suffix(&self, sequence: Option<&str>) -> String {
        format!(
            " returning {}",
            self.wrap(&Value::from(sequence.unwrap_or("id")), false)
        )
    }

    /// Statements emptying a table, with their bindings.
    fn compile_truncate(&self, table: &Value) -> Vec<(String, Vec<Value>)> {
        vec![(format!("truncate table {}", self.wrap_table(table)), Vec::new())]
    }

    /// Create a savepoint.
    fn compile_savepoint(&self, name: &str) -> String {
        format!("SAVEPOINT {name}")
    }

    /// Roll back to a savepoint.
    fn compile_savepoint_rollback(&self, name: &str) -> String {
        format!("ROLLBACK TO SAVEPOINT {name}")
    }

    /// Wrap one member of a union.
    fn wrap_union(&self, sql: &str) -> String {
        sql.to_string()
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    MySql,
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Build a shared grammar for this dialect with the given table prefix.
    pub fn grammar(self, table_prefix: &str) -> Arc<dyn Grammar> {
        match self {
            Dialect::Generic => Arc::new(GenericGrammar::new().with_table_prefix(table_prefix)),
            Dialect::MySql => Arc::new(MySqlGrammar::new().with_table_prefix(table_prefix)),
            Dialect::Postgres => Arc::new(PostgresGrammar::new().with_table_prefix(table_prefix)),
            Dialect::Sqlite => Arc::new(SqliteGrammar::new().with_table_prefix(table_prefix)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = crate::error::QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(crate::error::QueryError::invalid_argument(format!(
                "unknown dialect: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests;
