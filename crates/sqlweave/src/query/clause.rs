//! Clause data model accumulated by [`Builder`].

use super::builder::Builder;
use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Operators accepted by value comparisons. Matched case-insensitively.
pub const OPERATORS: &[&str] = &[
    "=",
    "<",
    ">",
    "<=",
    ">=",
    "<>",
    "!=",
    "<=>",
    "like",
    "like binary",
    "not like",
    "ilike",
    "&",
    "|",
    "^",
    "<<",
    ">>",
    "rlike",
    "regexp",
    "not regexp",
    "~",
    "~*",
    "!~",
    "!~*",
    "similar to",
    "not similar to",
    "not ilike",
    "~~*",
    "!~~*",
];

/// Normalize and validate an operator against [`OPERATORS`].
pub(crate) fn check_operator(operator: &str) -> QueryResult<String> {
    let normalized = operator.trim().to_lowercase();
    if OPERATORS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(QueryError::InvalidOperator(operator.to_string()))
    }
}

/// Connector between two predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

impl Boolean {
    pub fn as_str(self) -> &'static str {
        match self {
            Boolean::And => "and",
            Boolean::Or => "or",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// `"desc"` in any case is descending; everything else ascends.
impl From<&str> for Direction {
    fn from(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}

/// Part of a date/time column compared by date-based predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
    Date,
    Time,
    Day,
    Month,
    Year,
}

impl DatePart {
    pub fn as_str(self) -> &'static str {
        match self {
            DatePart::Date => "date",
            DatePart::Time => "time",
            DatePart::Day => "day",
            DatePart::Month => "month",
            DatePart::Year => "year",
        }
    }
}

/// Row locking mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lock {
    /// Shared lock (`for share`, `lock in share mode`).
    Shared,
    /// Exclusive lock (`for update`).
    Exclusive,
    /// Verbatim locking clause.
    Raw(String),
}

/// One predicate.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `column op value`
    Basic {
        column: Value,
        operator: String,
        value: Value,
    },
    /// `first op second`, both identifiers
    Column {
        first: Value,
        operator: String,
        second: Value,
    },
    /// `column [not] in (values)`
    In {
        column: Value,
        values: Vec<Value>,
        not: bool,
    },
    /// `column [not] in (subquery)`
    InSub {
        column: Value,
        query: Box<Builder>,
        not: bool,
    },
    /// `column is [not] null`
    Null { column: Value, not: bool },
    /// `column [not] between from and to`
    Between {
        column: Value,
        from: Value,
        to: Value,
        not: bool,
    },
    /// `[not] exists (subquery)`
    Exists { query: Box<Builder>, not: bool },
    /// Parenthesized group of the nested builder's predicates
    Nested { query: Box<Builder> },
    /// `column op (subquery)`
    Sub {
        column: Value,
        operator: String,
        query: Box<Builder>,
    },
    /// Verbatim SQL
    Raw { sql: String },
    /// Comparison on a date part of a column
    Date {
        part: DatePart,
        column: Value,
        operator: String,
        value: Value,
    },
}

/// A predicate with its connector. The connector of the first entry in a
/// list is never rendered.
#[derive(Debug, Clone)]
pub struct Where {
    pub boolean: Boolean,
    pub condition: Condition,
}

/// One `order by` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Column { column: Value, direction: Direction },
    Raw { sql: String },
}

impl Order {
    /// Whether this entry orders by `column`.
    pub fn targets(&self, column: &str) -> bool {
        matches!(self, Order::Column { column: c, .. } if !c.is_raw() && c.to_text() == column)
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "inner",
            JoinKind::Left => "left",
            JoinKind::Right => "right",
            JoinKind::Cross => "cross",
        }
    }
}

/// Aggregate function installed while an aggregate action runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub function: String,
    pub columns: Vec<Value>,
}

/// A query combined with `union` / `union all`.
#[derive(Debug, Clone)]
pub struct Union {
    pub query: Box<Builder>,
    pub all: bool,
}

/// Clause categories that [`Builder::clone_without`] can clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Columns,
    Joins,
    Wheres,
    Groups,
    Havings,
    Orders,
    Limit,
    Offset,
    Unions,
    UnionOrders,
    UnionLimit,
    UnionOffset,
    Lock,
}

/// Turn `column op value` into a condition plus the value to bind, if any.
///
/// Null compared with `=` becomes `is null`, with `!=`/`<>` `is not null`;
/// any other operator with null is rejected.
pub(crate) fn basic_condition(
    column: Value,
    operator: &str,
    value: Value,
) -> QueryResult<(Condition, Option<Value>)> {
    let operator = check_operator(operator)?;
    if value.is_null() {
        return match operator.as_str() {
            "=" => Ok((Condition::Null { column, not: false }, None)),
            "!=" | "<>" => Ok((Condition::Null { column, not: true }, None)),
            _ => Err(QueryError::IllegalNullComparison(operator)),
        };
    }
    let binding = (!value.is_raw()).then(|| value.clone());
    Ok((
        Condition::Basic {
            column,
            operator,
            value,
        },
        binding,
    ))
}
