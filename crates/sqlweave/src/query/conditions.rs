//! Predicate composition shared by [`Builder`] and [`JoinClause`].
//!
//! Both types hold their predicates in a [`Builder`]; the trait only needs
//! access to it and a way to create an empty sibling for nested groups.
//! Everything else (null handling, operator validation, binding placement)
//! is provided here once.
//!
//! [`JoinClause`]: super::JoinClause

use super::bindings::BindingKind;
use super::builder::Builder;
use super::clause::{Boolean, Condition, DatePart, Where, basic_condition, check_operator};
use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Fluent `where` API.
///
/// Infallible mutators return `&mut Self`; mutators that validate an
/// operator or run a callback return `QueryResult<&mut Self>` and leave the
/// receiver untouched on error.
pub trait Conditions: Sized {
    /// Builder holding the predicates.
    fn query(&self) -> &Builder;

    /// Mutable access to the builder holding the predicates.
    fn query_mut(&mut self) -> &mut Builder;

    /// Empty instance of the same kind, used for nested groups.
    fn nested_instance(&self) -> Self;

    /// Consume into the builder holding the predicates.
    fn into_query(self) -> Builder;

    /// Append a predicate and bind its values to the where category.
    fn add_where<I>(&mut self, boolean: Boolean, condition: Condition, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        let query = self.query_mut();
        query.wheres.push(Where { boolean, condition });
        query.bindings.extend(BindingKind::Where, bindings);
        self
    }

    // ==================== Basic comparisons ====================

    /// `column op value`.
    fn where_(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.where_with(column, operator, value, Boolean::And)
    }

    /// `or column op value`.
    fn or_where(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.where_with(column, operator, value, Boolean::Or)
    }

    /// `column op value` joined with an explicit connector.
    fn where_with(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
        boolean: Boolean,
    ) -> QueryResult<&mut Self> {
        let (condition, binding) = basic_condition(column.into(), operator, value.into())?;
        Ok(self.add_where(boolean, condition, binding))
    }

    /// `column = value` (or `column is null`).
    fn where_eq(&mut self, column: impl Into<Value>, value: impl Into<Value>) -> &mut Self {
        self.eq_with(column.into(), value.into(), Boolean::And)
    }

    /// `or column = value` (or `or column is null`).
    fn or_where_eq(&mut self, column: impl Into<Value>, value: impl Into<Value>) -> &mut Self {
        self.eq_with(column.into(), value.into(), Boolean::Or)
    }

    #[doc(hidden)]
    fn eq_with(&mut self, column: Value, value: Value, boolean: Boolean) -> &mut Self {
        if value.is_null() {
            return self.add_where(boolean, Condition::Null { column, not: false }, None::<Value>);
        }
        let binding = value.clone();
        self.add_where(
            boolean,
            Condition::Basic {
                column,
                operator: "=".to_string(),
                value,
            },
            Some(binding),
        )
    }

    // ==================== Nested groups ====================

    /// Parenthesized group populated by `callback`.
    ///
    /// An empty group adds nothing.
    fn where_nested<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> QueryResult<()>,
    {
        self.nested_with(callback, Boolean::And)
    }

    fn or_where_nested<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> QueryResult<()>,
    {
        self.nested_with(callback, Boolean::Or)
    }

    #[doc(hidden)]
    fn nested_with<F>(&mut self, callback: F, boolean: Boolean) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> QueryResult<()>,
    {
        let mut child = self.nested_instance();
        callback(&mut child)?;
        Ok(self.add_nested_where_query(child.into_query(), boolean))
    }

    /// Add an already populated builder as a parenthesized group.
    fn add_nested_where_query(&mut self, query: Builder, boolean: Boolean) -> &mut Self {
        if query.wheres.is_empty() {
            return self;
        }
        let bindings = query.bindings.get(BindingKind::Where).to_vec();
        self.add_where(
            boolean,
            Condition::Nested {
                query: Box::new(query),
            },
            bindings,
        )
    }

    /// Group of `column = value` pairs joined with `and`.
    fn where_all<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        self.all_with(pairs, Boolean::And)
    }

    fn or_where_all<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        self.all_with(pairs, Boolean::Or)
    }

    #[doc(hidden)]
    fn all_with<I, K, V>(&mut self, pairs: I, boolean: Boolean) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut child = self.nested_instance();
        for (column, value) in pairs {
            child.where_eq(column, value);
        }
        self.add_nested_where_query(child.into_query(), boolean)
    }

    /// Equality predicates named by a finder such as
    /// `where_first_name_and_last_name`, one parameter per column.
    ///
    /// `_and_` / `_or_` separate the columns and set the connector of the
    /// column that follows.
    fn dynamic_where<I>(&mut self, method: &str, parameters: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let finder = method
            .strip_prefix("where_")
            .filter(|finder| !finder.is_empty())
            .ok_or_else(|| {
                QueryError::invalid_argument(format!("`{method}` is not a where finder"))
            })?;

        let mut segments: Vec<(Boolean, String)> = Vec::new();
        let mut boolean = Boolean::And;
        let mut words: Vec<&str> = Vec::new();
        for word in finder.split('_') {
            match word {
                "and" | "or" if !words.is_empty() => {
                    segments.push((boolean, words.join("_")));
                    words.clear();
                    boolean = if word == "and" { Boolean::And } else { Boolean::Or };
                }
                _ => words.push(word),
            }
        }
        segments.push((boolean, words.join("_")));
        if segments.iter().any(|(_, column)| column.is_empty()) {
            return Err(QueryError::invalid_argument(format!(
                "`{method}` names an empty column"
            )));
        }

        let parameters: Vec<Value> = parameters.into_iter().collect();
        if parameters.len() != segments.len() {
            return Err(QueryError::invalid_argument(format!(
                "`{method}` expects {} parameters, got {}",
                segments.len(),
                parameters.len()
            )));
        }
        for ((boolean, column), value) in segments.into_iter().zip(parameters) {
            self.eq_with(Value::from(column), value, boolean);
        }
        Ok(self)
    }

    // ==================== Column comparisons ====================

    /// `first op second`, comparing two columns.
    fn where_column(
        &mut self,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.column_with(first, operator, second, Boolean::And)
    }

    fn or_where_column(
        &mut self,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.column_with(first, operator, second, Boolean::Or)
    }

    #[doc(hidden)]
    fn column_with(
        &mut self,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
        boolean: Boolean,
    ) -> QueryResult<&mut Self> {
        let operator = check_operator(operator)?;
        Ok(self.add_where(
            boolean,
            Condition::Column {
                first: first.into(),
                operator,
                second: second.into(),
            },
            None::<Value>,
        ))
    }

    // ==================== Raw ====================

    /// Verbatim predicate with its own bindings.
    fn where_raw<I>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.add_where(Boolean::And, Condition::Raw { sql: sql.into() }, bindings)
    }

    fn or_where_raw<I>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.add_where(Boolean::Or, Condition::Raw { sql: sql.into() }, bindings)
    }

    // ==================== In lists ====================

    /// `column in (values)`. An empty list never matches.
    fn where_in<I, V>(&mut self, column: impl Into<Value>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_with(column.into(), values, Boolean::And, false)
    }

    /// `column not in (values)`. An empty list always matches.
    fn where_not_in<I, V>(&mut self, column: impl Into<Value>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_with(column.into(), values, Boolean::And, true)
    }

    fn or_where_in<I, V>(&mut self, column: impl Into<Value>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_with(column.into(), values, Boolean::Or, false)
    }

    fn or_where_not_in<I, V>(&mut self, column: impl Into<Value>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.in_with(column.into(), values, Boolean::Or, true)
    }

    #[doc(hidden)]
    fn in_with<I, V>(&mut self, column: Value, values: I, boolean: Boolean, not: bool) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let bindings = values.clone();
        self.add_where(
            boolean,
            Condition::In {
                column,
                values,
                not,
            },
            bindings,
        )
    }

    /// `column in (subquery)`.
    fn where_in_query(&mut self, column: impl Into<Value>, query: Builder) -> &mut Self {
        self.in_query_with(column.into(), query, Boolean::And, false)
    }

    fn where_not_in_query(&mut self, column: impl Into<Value>, query: Builder) -> &mut Self {
        self.in_query_with(column.into(), query, Boolean::And, true)
    }

    fn or_where_in_query(&mut self, column: impl Into<Value>, query: Builder) -> &mut Self {
        self.in_query_with(column.into(), query, Boolean::Or, false)
    }

    fn or_where_not_in_query(&mut self, column: impl Into<Value>, query: Builder) -> &mut Self {
        self.in_query_with(column.into(), query, Boolean::Or, true)
    }

    #[doc(hidden)]
    fn in_query_with(&mut self, column: Value, query: Builder, boolean: Boolean, not: bool) -> &mut Self {
        let bindings = query.get_bindings();
        self.add_where(
            boolean,
            Condition::InSub {
                column,
                query: Box::new(query),
                not,
            },
            bindings,
        )
    }

    /// `column in (subquery)` with the subquery built by `callback`.
    fn where_in_sub<F>(&mut self, column: impl Into<Value>, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.in_sub_with(column.into(), callback, Boolean::And, false)
    }

    fn where_not_in_sub<F>(&mut self, column: impl Into<Value>, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.in_sub_with(column.into(), callback, Boolean::And, true)
    }

    fn or_where_in_sub<F>(&mut self, column: impl Into<Value>, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.in_sub_with(column.into(), callback, Boolean::Or, false)
    }

    fn or_where_not_in_sub<F>(
        &mut self,
        column: impl Into<Value>,
        callback: F,
    ) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.in_sub_with(column.into(), callback, Boolean::Or, true)
    }

    #[doc(hidden)]
    fn in_sub_with<F>(
        &mut self,
        column: Value,
        callback: F,
        boolean: Boolean,
        not: bool,
    ) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        let mut query = self.query().new_query();
        callback(&mut query)?;
        Ok(self.in_query_with(column, query, boolean, not))
    }

    // ==================== Null ====================

    fn where_null(&mut self, column: impl Into<Value>) -> &mut Self {
        self.add_where(
            Boolean::And,
            Condition::Null {
                column: column.into(),
                not: false,
            },
            None::<Value>,
        )
    }

    fn where_not_null(&mut self, column: impl Into<Value>) -> &mut Self {
        self.add_where(
            Boolean::And,
            Condition::Null {
                column: column.into(),
                not: true,
            },
            None::<Value>,
        )
    }

    fn or_where_null(&mut self, column: impl Into<Value>) -> &mut Self {
        self.add_where(
            Boolean::Or,
            Condition::Null {
                column: column.into(),
                not: false,
            },
            None::<Value>,
        )
    }

    fn or_where_not_null(&mut self, column: impl Into<Value>) -> &mut Self {
        self.add_where(
            Boolean::Or,
            Condition::Null {
                column: column.into(),
                not: true,
            },
            None::<Value>,
        )
    }

    // ==================== Between ====================

    /// `column between from and to`.
    fn where_between(
        &mut self,
        column: impl Into<Value>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.between_with(column.into(), from.into(), to.into(), Boolean::And, false)
    }

    fn where_not_between(
        &mut self,
        column: impl Into<Value>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.between_with(column.into(), from.into(), to.into(), Boolean::And, true)
    }

    fn or_where_between(
        &mut self,
        column: impl Into<Value>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.between_with(column.into(), from.into(), to.into(), Boolean::Or, false)
    }

    fn or_where_not_between(
        &mut self,
        column: impl Into<Value>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.between_with(column.into(), from.into(), to.into(), Boolean::Or, true)
    }

    #[doc(hidden)]
    fn between_with(
        &mut self,
        column: Value,
        from: Value,
        to: Value,
        boolean: Boolean,
        not: bool,
    ) -> &mut Self {
        let bindings = [from.clone(), to.clone()];
        self.add_where(
            boolean,
            Condition::Between {
                column,
                from,
                to,
                not,
            },
            bindings,
        )
    }

    // ==================== Exists ====================

    /// `exists (subquery)` with the subquery built by `callback`.
    fn where_exists<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.exists_with(callback, Boolean::And, false)
    }

    fn where_not_exists<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.exists_with(callback, Boolean::And, true)
    }

    fn or_where_exists<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.exists_with(callback, Boolean::Or, false)
    }

    fn or_where_not_exists<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.exists_with(callback, Boolean::Or, true)
    }

    #[doc(hidden)]
    fn exists_with<F>(&mut self, callback: F, boolean: Boolean, not: bool) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        let mut query = self.query().new_query();
        callback(&mut query)?;
        Ok(self.add_where_exists_query(query, boolean, not))
    }

    /// Add `[not] exists (query)` for an already built query.
    fn add_where_exists_query(&mut self, query: Builder, boolean: Boolean, not: bool) -> &mut Self {
        let bindings = query.get_bindings();
        self.add_where(
            boolean,
            Condition::Exists {
                query: Box::new(query),
                not,
            },
            bindings,
        )
    }

    // ==================== Subselect comparison ====================

    /// `column op (subquery)` with the subquery built by `callback`.
    fn where_sub<F>(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        callback: F,
    ) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.sub_with(column.into(), operator, callback, Boolean::And)
    }

    fn or_where_sub<F>(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        callback: F,
    ) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        self.sub_with(column.into(), operator, callback, Boolean::Or)
    }

    #[doc(hidden)]
    fn sub_with<F>(
        &mut self,
        column: Value,
        operator: &str,
        callback: F,
        boolean: Boolean,
    ) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        let operator = check_operator(operator)?;
        let mut query = self.query().new_query();
        callback(&mut query)?;
        let bindings = query.get_bindings();
        Ok(self.add_where(
            boolean,
            Condition::Sub {
                column,
                operator,
                query: Box::new(query),
            },
            bindings,
        ))
    }

    // ==================== Date parts ====================

    fn where_date(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Date, column.into(), operator, value.into(), Boolean::And)
    }

    fn or_where_date(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Date, column.into(), operator, value.into(), Boolean::Or)
    }

    fn where_time(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Time, column.into(), operator, value.into(), Boolean::And)
    }

    fn or_where_time(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Time, column.into(), operator, value.into(), Boolean::Or)
    }

    fn where_day(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Day, column.into(), operator, value.into(), Boolean::And)
    }

    fn or_where_day(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Day, column.into(), operator, value.into(), Boolean::Or)
    }

    fn where_month(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Month, column.into(), operator, value.into(), Boolean::And)
    }

    fn or_where_month(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Month, column.into(), operator, value.into(), Boolean::Or)
    }

    fn where_year(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Year, column.into(), operator, value.into(), Boolean::And)
    }

    fn or_where_year(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.date_with(DatePart::Year, column.into(), operator, value.into(), Boolean::Or)
    }

    #[doc(hidden)]
    fn date_with(
        &mut self,
        part: DatePart,
        column: Value,
        operator: &str,
        value: Value,
        boolean: Boolean,
    ) -> QueryResult<&mut Self> {
        let operator = check_operator(operator)?;
        let binding = value.clone();
        Ok(self.add_where(
            boolean,
            Condition::Date {
                part,
                column,
                operator,
                value,
            },
            Some(binding),
        ))
    }
}
