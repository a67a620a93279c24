use super::config::DatabaseConfig;
use super::driver::Driver;
use super::Connection;
use crate::error::{QueryError, QueryResult};
use crate::grammar::Grammar;
use crate::row::Row;
use crate::value::Value;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A statement recorded in the query log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedQuery {
    pub sql: String,
    pub bindings: Vec<Value>,
    pub elapsed: Duration,
}

/// A [`Connection`] over a [`Driver`].
///
/// Owns transaction nesting, pretend mode, the query log and statement
/// logging (`tracing` targets `sqlweave.sql` and `sqlweave.tx`).
#[derive(Debug)]
pub struct Database<D> {
    driver: D,
    config: DatabaseConfig,
    grammar: Arc<dyn Grammar>,
    transactions: AtomicU32,
    pretending: AtomicBool,
    logging: AtomicBool,
    query_log: Mutex<Vec<LoggedQuery>>,
}

impl<D: Driver> Database<D> {
    /// Create a database using the grammar of `config.dialect`.
    pub fn new(driver: D, config: DatabaseConfig) -> Self {
        let grammar = config.dialect.grammar(&config.table_prefix);
        Self::with_grammar(driver, config, grammar)
    }

    /// Create a database with an explicit grammar.
    pub fn with_grammar(driver: D, config: DatabaseConfig, grammar: Arc<dyn Grammar>) -> Self {
        let logging = config.log_queries;
        Self {
            driver,
            config,
            grammar,
            transactions: AtomicU32::new(0),
            pretending: AtomicBool::new(false),
            logging: AtomicBool::new(logging),
            query_log: Mutex::new(Vec::new()),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    // ==================== Query log ====================

    fn log(&self) -> MutexGuard<'_, Vec<LoggedQuery>> {
        self.query_log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enable_query_log(&self) {
        self.logging.store(true, Ordering::SeqCst);
    }

    pub fn disable_query_log(&self) {
        self.logging.store(false, Ordering::SeqCst);
    }

    pub fn logging(&self) -> bool {
        self.logging.load(Ordering::SeqCst)
    }

    /// Snapshot of the recorded statements.
    pub fn query_log(&self) -> Vec<LoggedQuery> {
        self.log().clone()
    }

    pub fn flush_query_log(&self) {
        self.log().clear();
    }

    pub fn pretending(&self) -> bool {
        self.pretending.load(Ordering::SeqCst)
    }

    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while end > 0 && !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end]).into()
            }
            _ => sql.into(),
        }
    }

    fn record(&self, kind: &'static str, sql: &str, bindings: &[Value], elapsed: Duration) {
        let shown = self.truncate_sql(sql);
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(
            target: "sqlweave.sql",
            kind,
            param_count = bindings.len(),
            elapsed_ms,
            pretend = self.pretending(),
            sql = %shown,
        );
        if let Some(threshold) = self.config.slow_query_threshold() {
            if elapsed > threshold {
                tracing::warn!(
                    target: "sqlweave.sql",
                    kind,
                    elapsed_ms,
                    threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
                    sql = %shown,
                    "slow query",
                );
            }
        }
        if self.logging() {
            self.log().push(LoggedQuery {
                sql: sql.to_string(),
                bindings: bindings.to_vec(),
                elapsed,
            });
        }
    }

    // ==================== Execution ====================

    async fn run_query(&self, sql: &str, bindings: &[Value]) -> QueryResult<Vec<Row>> {
        if self.pretending() {
            self.record("select", sql, bindings, Duration::ZERO);
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let result = self.driver.query(sql, bindings).await;
        self.record("select", sql, bindings, start.elapsed());
        Ok(result?.into_rows())
    }

    async fn run_execute(&self, kind: &'static str, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        if self.pretending() {
            self.record(kind, sql, bindings, Duration::ZERO);
            return Ok(0);
        }
        let start = Instant::now();
        let result = self.driver.execute(sql, bindings).await;
        self.record(kind, sql, bindings, start.elapsed());
        Ok(result?)
    }

    // ==================== Transactions ====================

    /// Current nesting depth; 0 outside any transaction.
    pub fn transaction_level(&self) -> u32 {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Begin a transaction, or a savepoint when one is already open.
    pub async fn begin_transaction(&self) -> QueryResult<()> {
        let level = self.transaction_level();
        if level == 0 {
            if !self.pretending() {
                self.driver.begin().await?;
            }
        } else {
            let sql = self.grammar.compile_savepoint(&savepoint_name(level + 1));
            self.run_execute("statement", &sql, &[]).await?;
        }
        self.transactions.store(level + 1, Ordering::SeqCst);
        tracing::debug!(target: "sqlweave.tx", level = level + 1, "begin");
        Ok(())
    }

    /// Commit the outermost transaction. Committing a savepoint only
    /// decrements the depth.
    pub async fn commit(&self) -> QueryResult<()> {
        let level = self.transaction_level();
        if level == 0 {
            return Ok(());
        }
        self.transactions.store(level - 1, Ordering::SeqCst);
        if level == 1 && !self.pretending() {
            self.driver.commit().await?;
        }
        tracing::debug!(target: "sqlweave.tx", level, "commit");
        Ok(())
    }

    /// Roll back the innermost transaction or savepoint.
    pub async fn rollback(&self) -> QueryResult<()> {
        let level = self.transaction_level();
        if level == 0 {
            return Ok(());
        }
        self.transactions.store(level - 1, Ordering::SeqCst);
        tracing::debug!(target: "sqlweave.tx", level, "rollback");
        if level == 1 {
            if !self.pretending() {
                self.driver.rollback().await?;
            }
        } else {
            let sql = self.grammar.compile_savepoint_rollback(&savepoint_name(level));
            self.run_execute("statement", &sql, &[]).await?;
        }
        Ok(())
    }

    /// Run `f` inside a transaction, committing on success.
    ///
    /// On error the transaction (or savepoint, when nested) is rolled back,
    /// and so is a failed commit. Retryable driver errors, including those
    /// raised by the commit itself, replay `f` up to `attempts` times, but only
    /// at the outermost level; a nested failure always propagates to the
    /// enclosing transaction.
    pub async fn transaction<T, F>(&self, attempts: u32, mut f: F) -> QueryResult<T>
    where
        F: AsyncFnMut(&Self) -> QueryResult<T>,
    {
        if attempts == 0 {
            return Err(QueryError::invalid_argument(
                "transaction attempts must be at least 1",
            ));
        }
        let outermost = self.transaction_level() == 0;
        let mut attempt = 1;
        loop {
            self.begin_transaction().await?;
            let err = match f(self).await {
                Ok(value) => match self.commit().await {
                    Ok(()) => return Ok(value),
                    Err(err) => {
                        self.rollback_failed_commit(&err).await?;
                        err
                    }
                },
                Err(err) => {
                    if let Err(rollback_err) = self.rollback().await {
                        return Err(QueryError::TransactionRollback(format!(
                            "{err} (rollback failed: {rollback_err})"
                        )));
                    }
                    err
                }
            };
            if outermost && err.is_retryable() && attempt < attempts {
                tracing::warn!(
                    target: "sqlweave.tx",
                    attempt,
                    attempts,
                    error = %err,
                    "retrying transaction",
                );
                attempt += 1;
                continue;
            }
            return Err(err);
        }
    }

    /// A failed outermost commit has already dropped the depth to 0; roll the
    /// driver back so the next attempt starts clean.
    async fn rollback_failed_commit(&self, err: &QueryError) -> QueryResult<()> {
        if self.transaction_level() > 0 || self.pretending() {
            return Ok(());
        }
        tracing::debug!(target: "sqlweave.tx", error = %err, "rollback after failed commit");
        self.driver.rollback().await.map_err(|rollback_err| {
            QueryError::TransactionRollback(format!("{err} (rollback failed: {rollback_err})"))
        })
    }

    /// [`Database::transaction`] with `config.transaction_attempts` attempts.
    pub async fn with_transaction<T, F>(&self, f: F) -> QueryResult<T>
    where
        F: AsyncFnMut(&Self) -> QueryResult<T>,
    {
        self.transaction(self.config.transaction_attempts, f).await
    }

    // ==================== Pretend ====================

    /// Run `f` without executing anything and return the statements it
    /// would have run. Selects return no rows; writes report 0 rows.
    pub async fn pretend<F>(&self, f: F) -> QueryResult<Vec<LoggedQuery>>
    where
        F: AsyncFnOnce(&Self) -> QueryResult<()>,
    {
        let was_logging = self.logging.swap(true, Ordering::SeqCst);
        let was_pretending = self.pretending.swap(true, Ordering::SeqCst);
        let saved = std::mem::take(&mut *self.log());

        let result = f(self).await;

        self.pretending.store(was_pretending, Ordering::SeqCst);
        self.logging.store(was_logging, Ordering::SeqCst);
        let recorded = std::mem::replace(&mut *self.log(), saved);
        result.map(|()| recorded)
    }
}

fn savepoint_name(level: u32) -> String {
    format!("trans{level}")
}

impl<D: Driver> Connection for Database<D> {
    fn grammar(&self) -> Arc<dyn Grammar> {
        Arc::clone(&self.grammar)
    }

    async fn select(&self, sql: &str, bindings: &[Value]) -> QueryResult<Vec<Row>> {
        self.run_query(sql, bindings).await
    }

    async fn insert(&self, sql: &str, bindings: &[Value]) -> QueryResult<bool> {
        self.run_execute("insert", sql, bindings).await?;
        Ok(true)
    }

    /// Dialects whose grammar appends `returning` read the key from the
    /// result; the others ask the driver after executing.
    async fn insert_get_id(
        &self,
        sql: &str,
        bindings: &[Value],
        sequence: Option<&str>,
    ) -> QueryResult<Value> {
        if self.grammar.compile_insert_get_id_suffix(sequence).is_empty() {
            self.run_execute("insert", sql, bindings).await?;
            if self.pretending() {
                return Ok(Value::Null);
            }
            return Ok(self.driver.last_insert_id(sequence).await?);
        }
        let rows = self.run_query(sql, bindings).await?;
        Ok(rows
            .first()
            .and_then(|row| row.get_index(0))
            .cloned()
            .unwrap_or_default())
    }

    async fn update(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run_execute("update", sql, bindings).await
    }

    async fn delete(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run_execute("delete", sql, bindings).await
    }

    async fn statement(&self, sql: &str, bindings: &[Value]) -> QueryResult<bool> {
        self.run_execute("statement", sql, bindings).await?;
        Ok(true)
    }

    async fn affecting_statement(&self, sql: &str, bindings: &[Value]) -> QueryResult<u64> {
        self.run_execute("statement", sql, bindings).await
    }
}
