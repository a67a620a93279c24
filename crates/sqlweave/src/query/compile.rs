//! Lowering of a [`Builder`] to SQL text.
//!
//! Clauses render in a fixed order: select, from, joins, wheres, groups,
//! havings, orders, limit, offset, lock, then unions with their own
//! ordering and limits. That is also the order of [`BindingKind`], which is
//! what keeps placeholders and flattened bindings aligned.
//!
//! [`BindingKind`]: super::BindingKind

use super::Record;
use super::bindings::BindingKind;
use super::builder::Builder;
use super::clause::{Aggregate, Condition, Order, Where};
use super::join::JoinClause;
use crate::grammar::{Grammar, IdentifierQuote, split_alias};
use crate::value::Value;

/// Grammar plus the table aliases visible to one query.
///
/// Columns qualified by a visible alias are not table-prefixed. Sub-queries
/// see the aliases of every enclosing query.
struct Scope<'a> {
    grammar: &'a dyn Grammar,
    aliases: Vec<String>,
}

impl<'a> Scope<'a> {
    fn of(query: &'a Builder, outer: &[String]) -> Self {
        let mut aliases = outer.to_vec();
        let tables = query
            .from
            .iter()
            .chain(query.joins.iter().map(|join| &join.table));
        for table in tables {
            if let Value::Text(text) = table {
                if let Some((_, alias)) = split_alias(text) {
                    aliases.push(alias.trim().to_string());
                }
            }
        }
        Self {
            grammar: query.grammar.as_ref(),
            aliases,
        }
    }

    fn wrap(&self, value: &Value) -> String {
        self.grammar.wrap_column(value, &self.aliases)
    }

    fn columnize(&self, values: &[Value]) -> String {
        values
            .iter()
            .map(|v| self.wrap(v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn compile_select(query: &Builder) -> String {
    select_in(query, &[])
}

/// Select compiled as a sub-query of `parent`, seeing its table aliases.
pub(crate) fn compile_sub_select(query: &Builder, parent: &Builder) -> String {
    select_in(query, &Scope::of(parent, &[]).aliases)
}

fn select_in(query: &Builder, outer: &[String]) -> String {
    if let (Some(aggregate), false) = (&query.aggregate, query.unions.is_empty()) {
        return compile_union_aggregate(query, aggregate, outer);
    }

    let scope = Scope::of(query, outer);
    let grammar = scope.grammar;
    let mut parts: Vec<String> = Vec::new();

    match &query.aggregate {
        Some(aggregate) => parts.push(compile_aggregate(&scope, query, aggregate)),
        None => parts.push(compile_columns(&scope, query)),
    }
    if let Some(from) = &query.from {
        parts.push(format!("from {}", grammar.wrap_table(from)));
    }
    if !query.joins.is_empty() {
        parts.push(compile_joins(&scope, &query.joins));
    }
    if !query.wheres.is_empty() {
        parts.push(format!("where {}", compile_conditions(&scope, &query.wheres)));
    }
    if !query.groups.is_empty() {
        parts.push(format!("group by {}", scope.columnize(&query.groups)));
    }
    if !query.havings.is_empty() {
        parts.push(format!("having {}", compile_conditions(&scope, &query.havings)));
    }
    if !query.orders.is_empty() {
        parts.push(compile_orders(&scope, &query.orders));
    }
    if let Some(limit) = query.limit {
        parts.push(format!("limit {limit}"));
    }
    if let Some(offset) = query.offset {
        parts.push(format!("offset {offset}"));
    }
    if let Some(lock) = &query.lock {
        let lock = grammar.compile_lock(lock);
        if !lock.is_empty() {
            parts.push(lock);
        }
    }

    let sql = parts.join(" ");
    if query.unions.is_empty() {
        sql
    } else {
        format!("{}{}", grammar.wrap_union(&sql), compile_unions(&scope, query))
    }
}

fn compile_columns(scope: &Scope<'_>, query: &Builder) -> String {
    let select = if query.distinct {
        "select distinct"
    } else {
        "select"
    };
    if query.columns.is_empty() {
        format!("{select} *")
    } else {
        format!("{select} {}", scope.columnize(&query.columns))
    }
}

fn compile_aggregate(scope: &Scope<'_>, query: &Builder, aggregate: &Aggregate) -> String {
    let mut columns = if aggregate.columns.is_empty() {
        "*".to_string()
    } else {
        scope.columnize(&aggregate.columns)
    };
    if query.distinct && columns != "*" {
        columns = format!("distinct {columns}");
    }
    format!("select {}({columns}) as aggregate", aggregate.function)
}

// The union is wrapped as a derived table so the aggregate spans every member.
fn compile_union_aggregate(query: &Builder, aggregate: &Aggregate, outer: &[String]) -> String {
    let scope = Scope::of(query, outer);
    let mut inner = query.clone();
    inner.aggregate = None;
    format!(
        "{} from ({}) as {}",
        compile_aggregate(&scope, query, aggregate),
        select_in(&inner, outer),
        scope.grammar.wrap_value("temp_table")
    )
}

fn compile_joins(scope: &Scope<'_>, joins: &[JoinClause]) -> String {
    joins
        .iter()
        .map(|join| {
            let table = scope.grammar.wrap_table(&join.table);
            if join.query.wheres.is_empty() {
                format!("{} join {table}", join.kind.as_str())
            } else {
                format!(
                    "{} join {table} on {}",
                    join.kind.as_str(),
                    compile_conditions(scope, &join.query.wheres)
                )
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a predicate list without its keyword. The first connector is dropped.
fn compile_conditions(scope: &Scope<'_>, wheres: &[Where]) -> String {
    wheres
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let sql = compile_condition(scope, &entry.condition);
            if i == 0 {
                sql
            } else {
                format!("{} {sql}", entry.boolean.as_str())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn compile_condition(scope: &Scope<'_>, condition: &Condition) -> String {
    let grammar = scope.grammar;
    match condition {
        Condition::Basic {
            column,
            operator,
            value,
        } => format!(
            "{} {operator} {}",
            scope.wrap(column),
            grammar.parameter(value)
        ),
        Condition::Column {
            first,
            operator,
            second,
        } => format!("{} {operator} {}", scope.wrap(first), scope.wrap(second)),
        Condition::In {
            column,
            values,
            not,
        } => {
            if values.is_empty() {
                return if *not { "1 = 1" } else { "0 = 1" }.to_string();
            }
            format!(
                "{} {} ({})",
                scope.wrap(column),
                if *not { "not in" } else { "in" },
                grammar.parameterize(values)
            )
        }
        Condition::InSub { column, query, not } => format!(
            "{} {} ({})",
            scope.wrap(column),
            if *not { "not in" } else { "in" },
            select_in(query, &scope.aliases)
        ),
        Condition::Null { column, not } => format!(
            "{} {}",
            scope.wrap(column),
            if *not { "is not null" } else { "is null" }
        ),
        Condition::Between {
            column,
            from,
            to,
            not,
        } => format!(
            "{} {} {} and {}",
            scope.wrap(column),
            if *not { "not between" } else { "between" },
            grammar.parameter(from),
            grammar.parameter(to)
        ),
        Condition::Exists { query, not } => format!(
            "{}exists ({})",
            if *not { "not " } else { "" },
            select_in(query, &scope.aliases)
        ),
        Condition::Nested { query } => {
            format!("({})", compile_conditions(scope, &query.wheres))
        }
        Condition::Sub {
            column,
            operator,
            query,
        } => format!(
            "{} {operator} ({})",
            scope.wrap(column),
            select_in(query, &scope.aliases)
        ),
        Condition::Raw { sql } => sql.clone(),
        Condition::Date {
            part,
            column,
            operator,
            value,
        } => grammar.date_based(
            *part,
            &scope.wrap(column),
            operator,
            &grammar.parameter(value),
        ),
    }
}

fn compile_orders(scope: &Scope<'_>, orders: &[Order]) -> String {
    let list = orders
        .iter()
        .map(|order| match order {
            Order::Column { column, direction } => {
                format!("{} {}", scope.wrap(column), direction.as_str())
            }
            Order::Raw { sql } => sql.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("order by {list}")
}

fn compile_unions(scope: &Scope<'_>, query: &Builder) -> String {
    let mut sql = String::new();
    for union in &query.unions {
        let keyword = if union.all { "union all" } else { "union" };
        sql.push_str(&format!(
            " {keyword} {}",
            scope.grammar.wrap_union(&compile_select(&union.query))
        ));
    }
    if !query.union_orders.is_empty() {
        sql.push(' ');
        sql.push_str(&compile_orders(scope, &query.union_orders));
    }
    if let Some(limit) = query.union_limit {
        sql.push_str(&format!(" limit {limit}"));
    }
    if let Some(offset) = query.union_offset {
        sql.push_str(&format!(" offset {offset}"));
    }
    sql
}

pub(crate) fn compile_exists(query: &Builder) -> String {
    format!(
        "select exists({}) as {}",
        compile_select(query),
        query.grammar.wrap_value("exists")
    )
}

fn wrapped_table(query: &Builder) -> String {
    query
        .from
        .as_ref()
        .map(|table| query.grammar.wrap_table(table))
        .unwrap_or_default()
}

/// `insert into t (cols) values (..), (..)`; columns come from the first record.
pub(crate) fn compile_insert(query: &Builder, records: &[Record]) -> (String, Vec<Value>) {
    let grammar = query.grammar.as_ref();
    let table = wrapped_table(query);
    let Some(first) = records.first().filter(|r| !r.is_empty()) else {
        return (format!("insert into {table} default values"), Vec::new());
    };

    let columns: Vec<&String> = first.keys().collect();
    let mut bindings = Vec::new();
    let rows = records
        .iter()
        .map(|record| {
            let params = columns
                .iter()
                .map(|column| {
                    let value = record.get(*column).cloned().unwrap_or_default();
                    let param = grammar.parameter(&value);
                    if !value.is_raw() {
                        bindings.push(value);
                    }
                    param
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({params})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let names = columns
        .iter()
        .map(|c| grammar.wrap_value(c))
        .collect::<Vec<_>>()
        .join(", ");
    (
        format!("insert into {table} ({names}) values {rows}"),
        bindings,
    )
}

pub(crate) fn compile_insert_get_id(
    query: &Builder,
    record: &Record,
    sequence: Option<&str>,
) -> (String, Vec<Value>) {
    let (sql, bindings) = compile_insert(query, std::slice::from_ref(record));
    (
        format!(
            "{sql}{}",
            query.grammar.compile_insert_get_id_suffix(sequence)
        ),
        bindings,
    )
}

/// `update t [joins] set a = ?, .. [where ..]`; bindings are join, values, where.
pub(crate) fn compile_update(query: &Builder, values: &Record) -> (String, Vec<Value>) {
    let scope = Scope::of(query, &[]);
    let table = wrapped_table(query);
    let columns = values
        .iter()
        .map(|(column, value)| {
            format!(
                "{} = {}",
                scope.wrap(&Value::from(column.as_str())),
                scope.grammar.parameter(value)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("update {table}");
    if !query.joins.is_empty() {
        sql.push(' ');
        sql.push_str(&compile_joins(&scope, &query.joins));
    }
    sql.push_str(" set ");
    sql.push_str(&columns);
    if !query.wheres.is_empty() {
        sql.push_str(" where ");
        sql.push_str(&compile_conditions(&scope, &query.wheres));
    }

    let mut bindings = query.bindings.get(BindingKind::Join).to_vec();
    bindings.extend(values.values().filter(|v| !v.is_raw()).cloned());
    bindings.extend(query.bindings.get(BindingKind::Where).iter().cloned());
    (sql, bindings)
}

/// `delete from t [where ..]`, or `delete t from t joins [where ..]` with joins.
pub(crate) fn compile_delete(query: &Builder) -> (String, Vec<Value>) {
    let scope = Scope::of(query, &[]);
    let table = wrapped_table(query);
    let mut sql = if query.joins.is_empty() {
        format!("delete from {table}")
    } else {
        format!(
            "delete {table} from {table} {}",
            compile_joins(&scope, &query.joins)
        )
    };
    if !query.wheres.is_empty() {
        sql.push_str(" where ");
        sql.push_str(&compile_conditions(&scope, &query.wheres));
    }

    let mut bindings = query.bindings.get(BindingKind::Join).to_vec();
    bindings.extend(query.bindings.get(BindingKind::Where).iter().cloned());
    (sql, bindings)
}

pub(crate) fn compile_truncate(query: &Builder) -> Vec<(String, Vec<Value>)> {
    match &query.from {
        Some(table) => query.grammar.compile_truncate(table),
        None => Vec::new(),
    }
}

/// Number of `?` placeholders outside string literals and quoted
/// identifiers. A doubled closing quote stays inside the quoted run.
pub(crate) fn count_placeholders(sql: &str, quote: IdentifierQuote) -> usize {
    let mut chars = sql.chars().peekable();
    let mut count = 0;
    while let Some(c) = chars.next() {
        let close = match c {
            '?' => {
                count += 1;
                continue;
            }
            '\'' => '\'',
            c if c == quote.open => quote.close,
            _ => continue,
        };
        while let Some(c) = chars.next() {
            if c == close {
                if chars.peek() == Some(&close) {
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }
    count
}
