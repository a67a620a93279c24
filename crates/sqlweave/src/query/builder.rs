use super::bindings::{BindingKind, Bindings};
use super::clause::{
    Aggregate, Boolean, Component, Condition, Direction, JoinKind, Lock, Order, Union, Where,
    basic_condition,
};
use super::compile;
use super::conditions::Conditions;
use super::join::JoinClause;
use crate::error::QueryResult;
use crate::grammar::Grammar;
use crate::value::Value;
use std::sync::Arc;

/// Fluent SQL query builder.
///
/// A builder accumulates clauses and their bound values; nothing is rendered
/// until [`Builder::to_sql`] or an action (see [`crate::query`]) runs. Each
/// mutator appends exactly one clause entry and binds its non-raw values to
/// the matching [`BindingKind`], so placeholders and bindings always line up.
///
/// ```ignore
/// use sqlweave::prelude::*;
///
/// let mut q = db.table("users");
/// q.select(["*"]).where_("id", ">", 5)?.order_by("id", "desc").limit(10);
/// assert_eq!(q.to_sql(), r#"select * from "users" where "id" > ? order by "id" desc limit 10"#);
/// assert_eq!(q.get_bindings(), vec![Value::from(5)]);
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    pub(crate) grammar: Arc<dyn Grammar>,
    pub(crate) from: Option<Value>,
    pub(crate) distinct: bool,
    pub(crate) columns: Vec<Value>,
    pub(crate) aggregate: Option<Aggregate>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) wheres: Vec<Where>,
    pub(crate) groups: Vec<Value>,
    pub(crate) havings: Vec<Where>,
    pub(crate) orders: Vec<Order>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) unions: Vec<Union>,
    pub(crate) union_orders: Vec<Order>,
    pub(crate) union_limit: Option<u64>,
    pub(crate) union_offset: Option<u64>,
    pub(crate) lock: Option<Lock>,
    pub(crate) bindings: Bindings,
}

impl Builder {
    /// Create an empty builder rendering with `grammar`.
    pub fn new(grammar: Arc<dyn Grammar>) -> Self {
        Self {
            grammar,
            from: None,
            distinct: false,
            columns: Vec::new(),
            aggregate: None,
            joins: Vec::new(),
            wheres: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            unions: Vec::new(),
            union_orders: Vec::new(),
            union_limit: None,
            union_offset: None,
            lock: None,
            bindings: Bindings::new(),
        }
    }

    /// Empty builder sharing this builder's grammar.
    pub fn new_query(&self) -> Builder {
        Builder::new(Arc::clone(&self.grammar))
    }

    pub fn grammar(&self) -> &Arc<dyn Grammar> {
        &self.grammar
    }

    // ==================== Inspection ====================

    pub fn from_table(&self) -> Option<&Value> {
        self.from.as_ref()
    }

    pub fn columns(&self) -> &[Value] {
        &self.columns
    }

    pub fn wheres(&self) -> &[Where] {
        &self.wheres
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn union_orders(&self) -> &[Order] {
        &self.union_orders
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn get_lock(&self) -> Option<&Lock> {
        self.lock.as_ref()
    }

    // ==================== Select / from ====================

    /// Replace the selected columns.
    pub fn select<I, V>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self.bindings.clear(BindingKind::Select);
        self
    }

    /// Append selected columns.
    pub fn add_select<I, V>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append a raw select expression with its bindings.
    pub fn select_raw<I>(&mut self, expression: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.columns.push(Value::Raw(expression.into()));
        self.bindings.extend(BindingKind::Select, bindings);
        self
    }

    /// Append `(subquery) as alias` to the selected columns.
    ///
    /// The subquery sees the table aliases already added to this builder.
    pub fn select_sub(&mut self, query: Builder, alias: &str) -> &mut Self {
        let expression = format!(
            "({}) as {}",
            compile::compile_sub_select(&query, self),
            self.grammar.wrap(&Value::from(alias), false)
        );
        self.select_raw(expression, query.get_bindings())
    }

    /// [`Builder::select_sub`] with the subquery built by `callback`.
    pub fn select_sub_with<F>(&mut self, callback: F, alias: &str) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        let mut query = self.new_query();
        callback(&mut query)?;
        Ok(self.select_sub(query, alias))
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Set the table to select from. `"users as u"` aliases it.
    pub fn from(&mut self, table: impl Into<Value>) -> &mut Self {
        self.from = Some(table.into());
        self
    }

    /// Set a raw `from` expression.
    pub fn from_raw(&mut self, expression: impl Into<String>) -> &mut Self {
        self.from = Some(Value::Raw(expression.into()));
        self
    }

    // ==================== Joins ====================

    /// `inner join table on first op second`.
    pub fn join(
        &mut self,
        table: impl Into<Value>,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.join_on(JoinKind::Inner, table.into(), first, operator, second)
    }

    /// `inner join table on ...` with the conditions built by `callback`.
    pub fn join_with<F>(&mut self, table: impl Into<Value>, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut JoinClause) -> QueryResult<()>,
    {
        self.join_using(JoinKind::Inner, table.into(), callback)
    }

    /// `inner join table on first op ?`, binding `value`.
    pub fn join_where(
        &mut self,
        table: impl Into<Value>,
        first: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.join_value(JoinKind::Inner, table.into(), first, operator, value)
    }

    pub fn left_join(
        &mut self,
        table: impl Into<Value>,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.join_on(JoinKind::Left, table.into(), first, operator, second)
    }

    pub fn left_join_with<F>(&mut self, table: impl Into<Value>, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut JoinClause) -> QueryResult<()>,
    {
        self.join_using(JoinKind::Left, table.into(), callback)
    }

    pub fn left_join_where(
        &mut self,
        table: impl Into<Value>,
        first: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.join_value(JoinKind::Left, table.into(), first, operator, value)
    }

    pub fn right_join(
        &mut self,
        table: impl Into<Value>,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.join_on(JoinKind::Right, table.into(), first, operator, second)
    }

    pub fn right_join_with<F>(&mut self, table: impl Into<Value>, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut JoinClause) -> QueryResult<()>,
    {
        self.join_using(JoinKind::Right, table.into(), callback)
    }

    pub fn right_join_where(
        &mut self,
        table: impl Into<Value>,
        first: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.join_value(JoinKind::Right, table.into(), first, operator, value)
    }

    /// `cross join table`.
    pub fn cross_join(&mut self, table: impl Into<Value>) -> &mut Self {
        let join = JoinClause::new(JoinKind::Cross, table.into(), self);
        self.add_join(join)
    }

    /// Append a fully built join; its bindings go to the join category.
    pub fn add_join(&mut self, join: JoinClause) -> &mut Self {
        self.bindings.extend(BindingKind::Join, join.get_bindings());
        self.joins.push(join);
        self
    }

    fn join_on(
        &mut self,
        kind: JoinKind,
        table: Value,
        first: impl Into<Value>,
        operator: &str,
        second: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let mut join = JoinClause::new(kind, table, self);
        join.on(first, operator, second)?;
        Ok(self.add_join(join))
    }

    fn join_using<F>(&mut self, kind: JoinKind, table: Value, callback: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut JoinClause) -> QueryResult<()>,
    {
        let mut join = JoinClause::new(kind, table, self);
        callback(&mut join)?;
        Ok(self.add_join(join))
    }

    fn join_value(
        &mut self,
        kind: JoinKind,
        table: Value,
        first: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        let mut join = JoinClause::new(kind, table, self);
        join.where_(first, operator, value)?;
        Ok(self.add_join(join))
    }

    // ==================== Group / having ====================

    pub fn group_by<I, V>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    /// `having column op value`.
    pub fn having(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.having_with(column.into(), operator, value.into(), Boolean::And)
    }

    pub fn or_having(
        &mut self,
        column: impl Into<Value>,
        operator: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.having_with(column.into(), operator, value.into(), Boolean::Or)
    }

    fn having_with(
        &mut self,
        column: Value,
        operator: &str,
        value: Value,
        boolean: Boolean,
    ) -> QueryResult<&mut Self> {
        let (condition, binding) = basic_condition(column, operator, value)?;
        Ok(self.add_having(boolean, condition, binding))
    }

    pub fn having_raw<I>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.add_having(Boolean::And, Condition::Raw { sql: sql.into() }, bindings)
    }

    pub fn or_having_raw<I>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.add_having(Boolean::Or, Condition::Raw { sql: sql.into() }, bindings)
    }

    fn add_having<I>(&mut self, boolean: Boolean, condition: Condition, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.havings.push(Where { boolean, condition });
        self.bindings.extend(BindingKind::Having, bindings);
        self
    }

    // ==================== Ordering / pagination ====================

    /// Once a union exists, ordering applies to the union as a whole.
    fn order_target(&mut self) -> (&mut Vec<Order>, BindingKind) {
        if self.unions.is_empty() {
            (&mut self.orders, BindingKind::Order)
        } else {
            (&mut self.union_orders, BindingKind::UnionOrder)
        }
    }

    /// `order by column direction`; `direction` accepts [`Direction`] or `"asc"`/`"desc"`.
    pub fn order_by(&mut self, column: impl Into<Value>, direction: impl Into<Direction>) -> &mut Self {
        let (orders, _) = self.order_target();
        orders.push(Order::Column {
            column: column.into(),
            direction: direction.into(),
        });
        self
    }

    pub fn order_by_desc(&mut self, column: impl Into<Value>) -> &mut Self {
        self.order_by(column, Direction::Desc)
    }

    /// Newest first on `column`.
    pub fn latest(&mut self, column: impl Into<Value>) -> &mut Self {
        self.order_by(column, Direction::Desc)
    }

    /// Oldest first on `column`.
    pub fn oldest(&mut self, column: impl Into<Value>) -> &mut Self {
        self.order_by(column, Direction::Asc)
    }

    /// Order randomly; `seed` is only used by dialects that accept one.
    pub fn in_random_order(&mut self, seed: &str) -> &mut Self {
        let sql = self.grammar.compile_random(seed);
        self.order_by_raw(sql, [])
    }

    pub fn order_by_raw<I>(&mut self, sql: impl Into<String>, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        let (orders, kind) = self.order_target();
        orders.push(Order::Raw { sql: sql.into() });
        self.bindings.extend(kind, bindings);
        self
    }

    /// Limit the row count. A negative value removes the limit.
    pub fn limit(&mut self, value: i64) -> &mut Self {
        let value = u64::try_from(value).ok();
        if self.unions.is_empty() {
            self.limit = value;
        } else {
            self.union_limit = value;
        }
        self
    }

    pub fn take(&mut self, value: i64) -> &mut Self {
        self.limit(value)
    }

    /// Skip rows. A negative value removes the offset.
    pub fn offset(&mut self, value: i64) -> &mut Self {
        let value = u64::try_from(value).ok();
        if self.unions.is_empty() {
            self.offset = value;
        } else {
            self.union_offset = value;
        }
        self
    }

    pub fn skip(&mut self, value: i64) -> &mut Self {
        self.offset(value)
    }

    /// Offset pagination, pages counted from 1.
    pub fn for_page(&mut self, page: i64, per_page: i64) -> &mut Self {
        self.offset(page.saturating_sub(1).saturating_mul(per_page))
            .limit(per_page)
    }

    /// Keyset pagination: rows with `column` greater than `last_id`.
    ///
    /// Existing orders on `column` are replaced by a descending one.
    pub fn for_page_after_id(
        &mut self,
        per_page: i64,
        last_id: impl Into<Value>,
        column: &str,
    ) -> &mut Self {
        self.orders.retain(|order| !order.targets(column));
        let last_id = last_id.into();
        if !last_id.is_null() {
            self.group_wheres();
            let binding = last_id.clone();
            self.add_where(
                Boolean::And,
                Condition::Basic {
                    column: Value::from(column),
                    operator: ">".to_string(),
                    value: last_id,
                },
                Some(binding),
            );
        }
        self.order_by(column, Direction::Desc).limit(per_page)
    }

    /// Fold the current predicates into one parenthesized group so that an
    /// appended `and` constrains all of them. Lists without `or` connectors
    /// or raw fragments are left as they are.
    pub(crate) fn group_wheres(&mut self) {
        let needs_group = self.wheres.iter().enumerate().any(|(i, entry)| {
            (i > 0 && entry.boolean == Boolean::Or) || matches!(entry.condition, Condition::Raw { .. })
        });
        if !needs_group {
            return;
        }
        let mut group = self.nested_instance();
        group.wheres = std::mem::take(&mut self.wheres);
        group
            .bindings
            .set(BindingKind::Where, self.bindings.take(BindingKind::Where));
        self.add_nested_where_query(group, Boolean::And);
    }

    // ==================== Unions ====================

    pub fn union(&mut self, query: Builder) -> &mut Self {
        self.add_union(query, false)
    }

    pub fn union_all(&mut self, query: Builder) -> &mut Self {
        self.add_union(query, true)
    }

    /// Union with a query built by `callback`.
    pub fn union_with<F>(&mut self, callback: F, all: bool) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Builder) -> QueryResult<()>,
    {
        let mut query = self.new_query();
        callback(&mut query)?;
        Ok(self.add_union(query, all))
    }

    fn add_union(&mut self, query: Builder, all: bool) -> &mut Self {
        self.bindings.extend(BindingKind::Union, query.get_bindings());
        self.unions.push(Union {
            query: Box::new(query),
            all,
        });
        self
    }

    // ==================== Locking ====================

    pub fn lock(&mut self, lock: Lock) -> &mut Self {
        self.lock = Some(lock);
        self
    }

    pub fn lock_for_update(&mut self) -> &mut Self {
        self.lock(Lock::Exclusive)
    }

    pub fn shared_lock(&mut self) -> &mut Self {
        self.lock(Lock::Shared)
    }

    // ==================== Conditional chaining ====================

    /// Apply `f` only when `condition` holds.
    ///
    /// `f` works on a copy; the builder is only updated if it succeeds.
    pub fn when<F>(&mut self, condition: bool, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> QueryResult<()>,
    {
        if condition {
            self.tap(f)
        } else {
            Ok(self)
        }
    }

    /// Apply `f`, keeping the chain going.
    pub fn tap<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> QueryResult<()>,
    {
        let mut next = self.clone();
        f(&mut next)?;
        *self = next;
        Ok(self)
    }

    // ==================== Bindings ====================

    /// All bound values in placeholder order.
    pub fn get_bindings(&self) -> Vec<Value> {
        self.bindings.flatten()
    }

    /// Bound values per category.
    pub fn get_raw_bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Replace one category.
    pub fn set_bindings(&mut self, values: Vec<Value>, kind: BindingKind) -> &mut Self {
        self.bindings.set(kind, values);
        self
    }

    pub fn add_binding(&mut self, value: impl Into<Value>, kind: BindingKind) -> &mut Self {
        self.bindings.add(kind, value.into());
        self
    }

    pub fn add_bindings<I>(&mut self, values: I, kind: BindingKind) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.bindings.extend(kind, values);
        self
    }

    /// Append every category of `other`'s bindings.
    pub fn merge_bindings(&mut self, other: &Builder) -> &mut Self {
        self.bindings.merge(&other.bindings);
        self
    }

    // ==================== Cloning ====================

    /// Copy with the given clause categories cleared, along with the
    /// bindings those clauses owned.
    pub fn clone_without(&self, components: &[Component]) -> Builder {
        let mut query = self.clone();
        for component in components {
            let kind = match component {
                Component::Columns => {
                    query.columns.clear();
                    Some(BindingKind::Select)
                }
                Component::Joins => {
                    query.joins.clear();
                    Some(BindingKind::Join)
                }
                Component::Wheres => {
                    query.wheres.clear();
                    Some(BindingKind::Where)
                }
                Component::Groups => {
                    query.groups.clear();
                    None
                }
                Component::Havings => {
                    query.havings.clear();
                    Some(BindingKind::Having)
                }
                Component::Orders => {
                    query.orders.clear();
                    Some(BindingKind::Order)
                }
                Component::Limit => {
                    query.limit = None;
                    None
                }
                Component::Offset => {
                    query.offset = None;
                    None
                }
                Component::Unions => {
                    query.unions.clear();
                    Some(BindingKind::Union)
                }
                Component::UnionOrders => {
                    query.union_orders.clear();
                    Some(BindingKind::UnionOrder)
                }
                Component::UnionLimit => {
                    query.union_limit = None;
                    None
                }
                Component::UnionOffset => {
                    query.union_offset = None;
                    None
                }
                Component::Lock => {
                    query.lock = None;
                    None
                }
            };
            if let Some(kind) = kind {
                query.bindings.clear(kind);
            }
        }
        query
    }

    /// Copy with the given binding categories emptied.
    pub fn clone_without_bindings(&self, kinds: &[BindingKind]) -> Builder {
        let mut query = self.clone();
        for kind in kinds {
            query.bindings.clear(*kind);
        }
        query
    }

    // ==================== Compilation ====================

    /// Render the select statement.
    pub fn to_sql(&self) -> String {
        compile::compile_select(self)
    }
}

impl Conditions for Builder {
    fn query(&self) -> &Builder {
        self
    }

    fn query_mut(&mut self) -> &mut Builder {
        self
    }

    /// A nested group on a builder shares its table.
    fn nested_instance(&self) -> Self {
        let mut query = self.new_query();
        query.from = self.from.clone();
        query
    }

    fn into_query(self) -> Builder {
        self
    }
}
