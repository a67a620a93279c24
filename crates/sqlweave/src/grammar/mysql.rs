use super::{Dialect, Grammar, IdentifierQuote};
use crate::query::Lock;

/// MySQL / MariaDB grammar.
#[derive(Debug, Clone, Default)]
pub struct MySqlGrammar {
    table_prefix: String,
}

impl MySqlGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }
}

impl Grammar for MySqlGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn quote(&self) -> IdentifierQuote {
        IdentifierQuote::BACKTICK
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: &str) {
        self.table_prefix = prefix.to_string();
    }

    fn compile_lock(&self, lock: &Lock) -> String {
        match lock {
            Lock::Exclusive => "for update".to_string(),
            Lock::Shared => "lock in share mode".to_string(),
            Lock::Raw(sql) => sql.clone(),
        }
    }

    fn compile_random(&self, seed: &str) -> String {
        format!("RAND({seed})")
    }

    // The driver reports the generated key.
    fn compile_insert_get_id_suffix(&self, _sequence: Option<&str>) -> String {
        String::new()
    }

    fn wrap_union(&self, sql: &str) -> String {
        format!("({sql})")
    }
}
