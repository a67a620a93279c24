use super::{Dialect, Grammar, IdentifierQuote};
use crate::query::DatePart;
use crate::value::Value;

/// PostgreSQL grammar.
#[derive(Debug, Clone, Default)]
pub struct PostgresGrammar {
    table_prefix: String,
}

impl PostgresGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
}

impl Grammar for PostgresGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
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
        match part {
            DatePart::Date => format!("{column}::date {operator} {parameter}"),
            DatePart::Time => format!("{column}::time {operator} {parameter}"),
            DatePart::Day | DatePart::Month | DatePart::Year => {
                format!("extract({} from {column}) {operator} {parameter}", part.as_str())
            }
        }
    }

    fn compile_truncate(&self, table: &Value) -> Vec<(String, Vec<Value>)> {
        vec![(
            format!("truncate {} restart identity", self.wrap_table(table)),
            Vec::new(),
        )]
    }
}
