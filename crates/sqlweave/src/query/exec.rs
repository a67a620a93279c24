//! Actions: compile a builder and run it through a [`Connection`].

use super::bindings::BindingKind;
use super::builder::Builder;
use super::clause::{Aggregate, Direction, Order};
use super::compile;
use super::conditions::Conditions;
use super::Record;
use crate::connection::Connection;
use crate::error::{QueryError, QueryResult};
use crate::grammar::split_alias;
use crate::row::{FromRow, Row};
use crate::value::Value;

/// Key a selected column appears under in result rows: the alias if any,
/// otherwise the last dotted segment.
fn result_key(column: &str) -> String {
    match split_alias(column) {
        Some((_, alias)) => alias.trim().to_string(),
        None => column.rsplit('.').next().unwrap_or(column).trim().to_string(),
    }
}

fn strip_alias(column: Value) -> Value {
    match &column {
        Value::Text(text) => match split_alias(text) {
            Some((left, _)) => Value::Text(left.trim().to_string()),
            None => column,
        },
        _ => column,
    }
}

fn check_chunk_size(count: i64) -> QueryResult<usize> {
    usize::try_from(count)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| QueryError::invalid_argument(format!("chunk size must be positive, got {count}")))
}

impl Builder {
    fn require_table(&self) -> QueryResult<&Value> {
        self.from
            .as_ref()
            .ok_or_else(|| QueryError::invalid_argument("query has no table"))
    }

    async fn run_select<C: Connection>(&self, conn: &C, sql: String) -> QueryResult<Vec<Row>> {
        let bindings = self.get_bindings();
        debug_assert_eq!(
            compile::count_placeholders(&sql, self.grammar.quote()),
            bindings.len(),
            "placeholders and bindings disagree in `{sql}`"
        );
        conn.select(&sql, &bindings).await
    }

    // ==================== Reads ====================

    /// Run the select and return every row.
    pub async fn get<C: Connection>(&self, conn: &C) -> QueryResult<Vec<Row>> {
        self.run_select(conn, self.to_sql()).await
    }

    /// Run the select and map every row.
    pub async fn get_as<T: FromRow, C: Connection>(&self, conn: &C) -> QueryResult<Vec<T>> {
        self.get(conn).await?.iter().map(T::from_row).collect()
    }

    /// Run the select with `columns` unless columns were already chosen.
    pub async fn get_columns<C, I, V>(&self, conn: &C, columns: I) -> QueryResult<Vec<Row>>
    where
        C: Connection,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut query = self.clone();
        if query.columns.is_empty() {
            query.select(columns);
        }
        query.get(conn).await
    }

    /// First row, if any.
    pub async fn first<C: Connection>(&self, conn: &C) -> QueryResult<Option<Row>> {
        let mut query = self.clone();
        query.take(1);
        Ok(query.get(conn).await?.into_iter().next())
    }

    pub async fn first_as<T: FromRow, C: Connection>(&self, conn: &C) -> QueryResult<Option<T>> {
        self.first(conn)
            .await?
            .as_ref()
            .map(T::from_row)
            .transpose()
    }

    /// Row whose `id` equals `id`.
    pub async fn find<C: Connection>(&self, conn: &C, id: impl Into<Value>) -> QueryResult<Option<Row>> {
        let mut query = self.clone();
        query.where_eq("id", id.into());
        query.first(conn).await
    }

    /// Single column of the first row.
    pub async fn value<C: Connection>(&self, conn: &C, column: &str) -> QueryResult<Option<Value>> {
        let mut query = self.clone();
        query.select([column]);
        Ok(query
            .first(conn)
            .await?
            .and_then(|row| row.get_index(0).cloned()))
    }

    /// One column of every row.
    pub async fn pluck<C: Connection>(&self, conn: &C, column: &str) -> QueryResult<Vec<Value>> {
        let mut query = self.clone();
        query.select([column]);
        let key = result_key(column);
        query
            .get(conn)
            .await?
            .iter()
            .map(|row| row.require(&key).cloned())
            .collect()
    }

    /// `(key, column)` pairs of every row, in result order.
    pub async fn pluck_keyed<C: Connection>(
        &self,
        conn: &C,
        column: &str,
        key: &str,
    ) -> QueryResult<Vec<(Value, Value)>> {
        let mut query = self.clone();
        query.select([column, key]);
        let (column, key) = (result_key(column), result_key(key));
        query
            .get(conn)
            .await?
            .iter()
            .map(|row| Ok((row.require(&key)?.clone(), row.require(&column)?.clone())))
            .collect()
    }

    /// Values of one column joined with `glue`. NULL renders empty.
    pub async fn implode<C: Connection>(&self, conn: &C, column: &str, glue: &str) -> QueryResult<String> {
        let values = self.pluck(conn, column).await?;
        Ok(values
            .iter()
            .map(Value::to_text)
            .collect::<Vec<_>>()
            .join(glue))
    }

    pub async fn exists<C: Connection>(&self, conn: &C) -> QueryResult<bool> {
        let rows = self.run_select(conn, compile::compile_exists(self)).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("exists").or_else(|| row.get_index(0)))
            .is_some_and(Value::as_bool))
    }

    pub async fn doesnt_exist<C: Connection>(&self, conn: &C) -> QueryResult<bool> {
        Ok(!self.exists(conn).await?)
    }

    // ==================== Aggregates ====================

    pub async fn count<C: Connection>(&mut self, conn: &C) -> QueryResult<i64> {
        self.count_columns(conn, ["*"]).await
    }

    pub async fn count_columns<C, I, V>(&mut self, conn: &C, columns: I) -> QueryResult<i64>
    where
        C: Connection,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        let value = self.aggregate(conn, "count", columns).await?;
        Ok(value.as_i64().unwrap_or(0))
    }

    pub async fn min<C: Connection>(&mut self, conn: &C, column: impl Into<Value>) -> QueryResult<Value> {
        self.aggregate(conn, "min", vec![column.into()]).await
    }

    pub async fn max<C: Connection>(&mut self, conn: &C, column: impl Into<Value>) -> QueryResult<Value> {
        self.aggregate(conn, "max", vec![column.into()]).await
    }

    /// Sum of a column; 0 when there are no rows.
    pub async fn sum<C: Connection>(&mut self, conn: &C, column: impl Into<Value>) -> QueryResult<Value> {
        let value = self.aggregate(conn, "sum", vec![column.into()]).await?;
        Ok(if value.is_null() { Value::Integer(0) } else { value })
    }

    pub async fn avg<C: Connection>(&mut self, conn: &C, column: impl Into<Value>) -> QueryResult<Value> {
        self.aggregate(conn, "avg", vec![column.into()]).await
    }

    pub async fn average<C: Connection>(&mut self, conn: &C, column: impl Into<Value>) -> QueryResult<Value> {
        self.avg(conn, column).await
    }

    /// Run `function(columns)` over the query and return the `aggregate` column.
    ///
    /// Selected columns and orders are set aside while the aggregate runs and
    /// restored afterwards, error or not. Column aliases are dropped from the
    /// aggregate targets.
    pub async fn aggregate<C: Connection>(
        &mut self,
        conn: &C,
        function: &str,
        columns: Vec<Value>,
    ) -> QueryResult<Value> {
        // Union members must keep matching column lists.
        let saved_columns = self.unions.is_empty().then(|| {
            (
                std::mem::take(&mut self.columns),
                self.bindings.take(BindingKind::Select),
            )
        });
        let saved_orders = (
            std::mem::take(&mut self.orders),
            self.bindings.take(BindingKind::Order),
        );
        self.aggregate = Some(Aggregate {
            function: function.to_string(),
            columns: columns.into_iter().map(strip_alias).collect(),
        });

        let result = self.run_select(conn, self.to_sql()).await;

        self.aggregate = None;
        if let Some((columns, bindings)) = saved_columns {
            self.columns = columns;
            self.bindings.set(BindingKind::Select, bindings);
        }
        self.orders = saved_orders.0;
        self.bindings.set(BindingKind::Order, saved_orders.1);

        Ok(result?
            .first()
            .and_then(|row| row.get("aggregate"))
            .cloned()
            .unwrap_or_default())
    }

    // ==================== Chunking ====================

    /// Page through the results with offset pagination, `count` rows at a time.
    ///
    /// Requires an order. Returns `Ok(false)` when `callback` stopped early.
    pub async fn chunk<C, F>(&self, conn: &C, count: i64, mut callback: F) -> QueryResult<bool>
    where
        C: Connection,
        F: FnMut(&[Row]) -> bool,
    {
        let size = check_chunk_size(count)?;
        if self.orders.is_empty() && self.union_orders.is_empty() {
            return Err(QueryError::MissingOrderBy("any column".to_string()));
        }
        let mut page = 1;
        loop {
            let mut query = self.clone();
            query.for_page(page, count);
            let rows = query.get(conn).await?;
            tracing::trace!(target: "sqlweave.sql", page, rows = rows.len(), "chunk");
            if rows.is_empty() {
                break;
            }
            if !callback(&rows) {
                return Ok(false);
            }
            if rows.len() < size {
                break;
            }
            page += 1;
        }
        Ok(true)
    }

    /// Page through the results by key: each page continues after the last
    /// `alias` value of the previous one.
    ///
    /// The query must be ordered on `column`; ascending pages use `>`,
    /// descending pages `<`. `alias` defaults to `column` without its table.
    /// Returns `Ok(false)` when `callback` stopped early.
    pub async fn chunk_by_id<C, F>(
        &self,
        conn: &C,
        count: i64,
        mut callback: F,
        column: &str,
        alias: Option<&str>,
    ) -> QueryResult<bool>
    where
        C: Connection,
        F: FnMut(&[Row]) -> bool,
    {
        let size = check_chunk_size(count)?;
        let direction = self
            .orders
            .iter()
            .chain(&self.union_orders)
            .find_map(|order| match order {
                Order::Column { direction, .. } if order.targets(column) => Some(*direction),
                _ => None,
            })
            .ok_or_else(|| QueryError::MissingOrderBy(column.to_string()))?;
        let operator = match direction {
            Direction::Asc => ">",
            Direction::Desc => "<",
        };
        let alias = alias.map_or_else(|| result_key(column), str::to_string);

        let mut base = self.clone();
        base.group_wheres();
        let mut last: Option<Value> = None;
        let mut page = 1;
        loop {
            let mut query = base.clone();
            if let Some(last) = last.take() {
                query.where_(column, operator, last)?;
            }
            query.limit(count);
            let rows = query.get(conn).await?;
            tracing::trace!(target: "sqlweave.sql", page, rows = rows.len(), "chunk by id");
            if rows.is_empty() {
                break;
            }
            if !callback(&rows) {
                return Ok(false);
            }
            if rows.len() < size {
                break;
            }
            last = rows.last().map(|row| row.require(&alias).cloned()).transpose()?;
            page += 1;
        }
        Ok(true)
    }

    /// Visit rows one at a time, fetching `count` per page.
    pub async fn each<C, F>(&self, conn: &C, count: i64, mut callback: F) -> QueryResult<bool>
    where
        C: Connection,
        F: FnMut(&Row) -> bool,
    {
        self.chunk(conn, count, |rows| rows.iter().all(&mut callback))
            .await
    }

    // ==================== Writes ====================

    pub async fn insert<C: Connection>(&self, conn: &C, record: Record) -> QueryResult<bool> {
        self.insert_many(conn, std::slice::from_ref(&record)).await
    }

    /// Insert several rows in one statement. Every record must name the
    /// same columns.
    pub async fn insert_many<C: Connection>(&self, conn: &C, records: &[Record]) -> QueryResult<bool> {
        let Some((first, rest)) = records.split_first() else {
            return Ok(true);
        };
        self.require_table()?;
        if let Some(index) = rest.iter().position(|r| !r.keys().eq(first.keys())) {
            return Err(QueryError::invalid_argument(format!(
                "insert record at index {} does not have the columns of the first record",
                index + 1
            )));
        }
        let (sql, bindings) = compile::compile_insert(self, records);
        conn.insert(&sql, &bindings).await
    }

    /// Insert one row and return its generated key.
    pub async fn insert_get_id<C: Connection>(
        &self,
        conn: &C,
        record: Record,
        sequence: Option<&str>,
    ) -> QueryResult<Value> {
        self.require_table()?;
        let (sql, bindings) = compile::compile_insert_get_id(self, &record, sequence);
        conn.insert_get_id(&sql, &bindings, sequence).await
    }

    pub async fn update<C: Connection>(&self, conn: &C, values: Record) -> QueryResult<u64> {
        if values.is_empty() {
            return Err(QueryError::invalid_argument(
                "update requires at least one column",
            ));
        }
        self.require_table()?;
        let (sql, bindings) = compile::compile_update(self, &values);
        conn.update(&sql, &bindings).await
    }

    /// Update the row matching `attributes`, or insert `attributes` + `values`.
    pub async fn update_or_insert<C: Connection>(
        &self,
        conn: &C,
        attributes: Record,
        values: Record,
    ) -> QueryResult<bool> {
        let mut query = self.clone();
        query.where_all(attributes.clone());
        if !query.exists(conn).await? {
            let mut record = attributes;
            record.extend(values);
            return self.insert(conn, record).await;
        }
        if values.is_empty() {
            return Ok(true);
        }
        Ok(query.update(conn, values).await? > 0)
    }

    /// `column = column + amount`, plus any `extra` columns.
    pub async fn increment<C: Connection>(
        &self,
        conn: &C,
        column: &str,
        amount: impl Into<Value>,
        extra: Record,
    ) -> QueryResult<u64> {
        self.step(conn, column, amount.into(), extra, "+").await
    }

    /// `column = column - amount`, plus any `extra` columns.
    pub async fn decrement<C: Connection>(
        &self,
        conn: &C,
        column: &str,
        amount: impl Into<Value>,
        extra: Record,
    ) -> QueryResult<u64> {
        self.step(conn, column, amount.into(), extra, "-").await
    }

    async fn step<C: Connection>(
        &self,
        conn: &C,
        column: &str,
        amount: Value,
        mut extra: Record,
        sign: &str,
    ) -> QueryResult<u64> {
        if !matches!(amount, Value::Integer(_) | Value::Number(_)) {
            return Err(QueryError::invalid_argument(format!(
                "non-numeric value passed to increment/decrement: {amount:?}"
            )));
        }
        let wrapped = self.grammar.wrap(&Value::from(column), false);
        extra.insert(
            column.to_string(),
            Value::raw(format!("{wrapped} {sign} {amount}")),
        );
        self.update(conn, extra).await
    }

    pub async fn delete<C: Connection>(&self, conn: &C) -> QueryResult<u64> {
        self.require_table()?;
        let (sql, bindings) = compile::compile_delete(self);
        conn.delete(&sql, &bindings).await
    }

    /// Delete the row whose `id` equals `id`.
    pub async fn delete_id<C: Connection>(&self, conn: &C, id: impl Into<Value>) -> QueryResult<u64> {
        let mut query = self.clone();
        query.where_eq("id", id.into());
        query.delete(conn).await
    }

    /// Empty the table.
    pub async fn truncate<C: Connection>(&self, conn: &C) -> QueryResult<()> {
        self.require_table()?;
        for (sql, bindings) in compile::compile_truncate(self) {
            conn.statement(&sql, &bindings).await?;
        }
        Ok(())
    }
}
