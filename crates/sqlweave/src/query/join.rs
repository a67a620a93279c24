use super::builder::Builder;
use super::clause::JoinKind;
use super::conditions::Conditions;
use crate::error::QueryResult;
use crate::value::Value;

/// One `join` entry. Its predicates render as the `on` clause.
///
/// The whole [`Conditions`] API is available, so a join can mix column
/// comparisons (`on`) with value-bound predicates (`where_`, `where_in`, ...).
/// Nested groups inside a join are join clauses themselves.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub(crate) kind: JoinKind,
    pub(crate) table: Value,
    pub(crate) query: Builder,
}

impl JoinClause {
    /// Create a join on `table` sharing the grammar of `parent`.
    pub fn new(kind: JoinKind, table: Value, parent: &Builder) -> Self {
        Self {
            kind,
            table,
            query: parent.new_query(),
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn table(&self) -> &Value {
        &self.table
    }

    /// `on first op second`.
    pub fn on(
        &mut self,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.where_column(first, operator, second)
    }

    /// `or first op second`.
    pub fn or_on(
        &mut self,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.or_where_column(first, operator, second)
    }

    /// Values bound by the `on` clause, in placeholder order.
    pub fn get_bindings(&self) -> Vec<Value> {
        self.query.get_bindings()
    }
}

impl Conditions for JoinClause {
    fn query(&self) -> &Builder {
        &self.query
    }

    fn query_mut(&mut self) -> &mut Builder {
        &mut self.query
    }

    fn nested_instance(&self) -> Self {
        Self {
            kind: self.kind,
            table: self.table.clone(),
            query: self.query.new_query(),
        }
    }

    fn into_query(self) -> Builder {
        self.query
    }
}
