//! Result rows and typed row mapping.

use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use std::sync::Arc;

/// Coarse column type reported by a driver for each result column.
///
/// It decides how raw cell text is tagged when it becomes a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Character data.
    String,
    /// Floating point or decimal data.
    Number,
    /// Integral data.
    Integer,
}

impl ColumnType {
    /// Tag a raw cell returned by a driver.
    ///
    /// `None` is SQL NULL. Cells that do not parse as the reported numeric
    /// type are kept as text so no data is lost.
    pub fn tag(self, cell: Option<String>) -> Value {
        let Some(text) = cell else {
            return Value::Null;
        };
        match self {
            ColumnType::String => Value::Text(text),
            ColumnType::Number => match text.trim().parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Text(text),
            },
            ColumnType::Integer => match text.trim().parse::<i64>() {
                Ok(n) => Value::Integer(n),
                Err(_) => Value::Text(text),
            },
        }
    }
}

/// A single result row: shared column names plus one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `values` is truncated or padded with NULL to the column count.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Null);
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Column names in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in result order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Value at a column index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the named column, or [`QueryError::MissingColumn`].
    pub fn require(&self, column: &str) -> QueryResult<&Value> {
        self.get(column)
            .ok_or_else(|| QueryError::MissingColumn(column.to_string()))
    }

    /// Typed value of the named column.
    pub fn try_get<T: FromValue>(&self, column: &str) -> QueryResult<T> {
        T::from_value(self.require(column)?).map_err(|message| QueryError::decode(column, message))
    }

    /// Render the row as a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (c.clone(), serde_json::Value::from(v)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Conversion from a single [`Value`].
pub trait FromValue: Sized {
    /// Convert, returning a human readable reason on failure.
    fn from_value(value: &Value) -> Result<Self, String>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_i64()
            .ok_or_else(|| format!("expected integer, got {value:?}"))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let n = i64::from_value(value)?;
        i32::try_from(n).map_err(|e| e.to_string())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_f64()
            .ok_or_else(|| format!("expected number, got {value:?}"))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        if value.is_null() {
            return Err("expected boolean, got NULL".to_string());
        }
        Ok(value.as_bool())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Err("expected text, got NULL".to_string()),
            other => Ok(other.to_text()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Trait for converting a result row into a Rust type.
///
/// # Example
///
/// ```ignore
/// use sqlweave::{FromRow, QueryResult, Row};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> QueryResult<Self> {
///         Ok(Self { id: row.try_get("id")?, name: row.try_get("name")? })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a result row into Self
    fn from_row(row: &Row) -> QueryResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(row.clone())
    }
}

impl FromRow for serde_json::Value {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(row.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::from_pairs([("id", Value::Integer(7)), ("name", Value::from("ada"))])
    }

    #[test]
    fn tag_by_column_type() {
        assert_eq!(ColumnType::Integer.tag(Some("12".into())), Value::Integer(12));
        assert_eq!(ColumnType::Number.tag(Some("1.5".into())), Value::Number(1.5));
        assert_eq!(ColumnType::String.tag(Some("12".into())), Value::Text("12".into()));
        assert_eq!(ColumnType::Integer.tag(None), Value::Null);
        assert_eq!(ColumnType::Integer.tag(Some("abc".into())), Value::Text("abc".into()));
    }

    #[test]
    fn typed_access() {
        let row = sample();
        assert_eq!(row.try_get::<i64>("id").unwrap(), 7);
        assert_eq!(row.try_get::<String>("name").unwrap(), "ada");
        assert!(matches!(
            row.try_get::<i64>("missing"),
            Err(QueryError::MissingColumn(_))
        ));
        assert!(matches!(
            row.try_get::<i64>("name"),
            Err(QueryError::Decode { .. })
        ));
    }

    #[test]
    fn new_pads_missing_values() {
        let row = Row::new(vec!["a".to_string(), "b".to_string()].into(), vec![Value::Integer(1)]);
        assert_eq!(row.get("b"), Some(&Value::Null));
    }

    #[test]
    fn json_export() {
        assert_eq!(sample().to_json(), serde_json::json!({"id": 7, "name": "ada"}));
    }
}
