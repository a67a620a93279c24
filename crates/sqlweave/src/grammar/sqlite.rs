use super::{Dialect, Grammar, IdentifierQuote};
use crate::query::{DatePart, Lock};
use crate::value::Value;

/// SQLite grammar.
#[derive(Debug, Clone, Default)]
pub struct SqliteGrammar {
    table_prefix: String,
}

impl SqliteGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
}

impl Grammar for SqliteGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn quote(&self) -> IdentifierQuote {
        IdentifierQuote::DOUBLE
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.table_prefix = prefix.to_string();
    }

    fn date_based(&self, part: DatePart, column: &str, operator: &str, parameter: &str) -> String {
        let format = match part {
            DatePart::Date => "%Y-%m-%d",
            DatePart::Time => "%H:%M:%S",
            DatePart::Day => "%d",
            DatePart::Month => "%m",
            DatePart::Year => "%Y",
        };
        format!("strftime('{format}', {column}) {operator} cast({parameter} as text)")
    }

    // SQLite locks the whole database file; row locks do not exist.
    fn compile_lock(&self, _lock: &Lock) -> String {
        String::new()
    }

    fn compile_insert_get_id_suffix(&self, _sequence: Option<&str>) -> String {
        String::new()
    }

    fn compile_truncate(&self, table: &Value) -> Vec<(String, Vec<Value>)> {
        let name = match table {
            Value::Raw(sql) => sql.clone(),
            other => format!("{}{}", self.table_prefix, other.to_text()),
        };
        vec![
            (
                "delete from sqlite_sequence where name = ?".to_string(),
                vec![Value::Text(name)],
            ),
            (format!("delete from {}", self.wrap_table(table)), Vec::new()),
        ]
    }
}
