use crate::error::DriverError;
use crate::row::{ColumnType, Row};
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// Name and coarse type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub ty: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Raw result of a query as reported by a driver.
///
/// Cells are text; `None` is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row of cells.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|c| c.map(Into::into)).collect());
    }

    /// Tag every cell by its column type.
    pub fn into_rows(self) -> Vec<Row> {
        let names: Arc<[String]> = self.columns.iter().map(|c| c.name.clone()).collect();
        let types: Vec<ColumnType> = self.columns.iter().map(|c| c.ty).collect();
        self.rows
            .into_iter()
            .map(|cells| {
                let values = cells
                    .into_iter()
                    .zip(&types)
                    .map(|(cell, ty)| ty.tag(cell))
                    .collect();
                Row::new(Arc::clone(&names), values)
            })
            .collect()
    }
}

/// A physical database driver.
///
/// Placeholders in `sql` are `?`, one per element of `bindings`, in order.
pub trait Driver: Send + Sync {
    /// Run a statement that returns rows.
    fn query(
        &self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = Result<ResultSet, DriverError>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = Result<u64, DriverError>> + Send;

    /// Key generated by the last insert on this connection.
    fn last_insert_id(
        &self,
        sequence: Option<&str>,
    ) -> impl Future<Output = Result<Value, DriverError>> + Send {
        let _ = sequence;
        async { Ok(Value::Null) }
    }

    fn begin(&self) -> impl Future<Output = Result<(), DriverError>> + Send;

    fn commit(&self) -> impl Future<Output = Result<(), DriverError>> + Send;

    fn rollback(&self) -> impl Future<Output = Result<(), DriverError>> + Send;
}
