//! Record store: the only component that talks to the database.
//!
//! Repositories hand a statement and its positional parameters to a
//! [`RecordStore`] and get rows back as JSON objects. Values never reach SQL
//! text; they travel as [`ColumnValue`] parameters bound to `$1`, `$2`, ...

use async_trait::async_trait;
use plug_core::fields::ColumnValue;
use plug_core::types::DbId;
use serde_json::{Map, Value};

pub mod postgres;

#[cfg(test)]
pub(crate) mod testing;

pub use postgres::PgRecordStore;

/// A result row keyed by column name.
pub type Row = Map<String, Value>;

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Generated id, for statements ending in `RETURNING id`.
    pub insert_id: Option<DbId>,
    pub affected_rows: u64,
}

/// Store-level failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No connection could be obtained (pool timeout or closed, I/O, TLS).
    #[error("database connection unavailable: {0}")]
    Connection(#[source] sqlx::Error),

    /// The statement itself failed (syntax, parameter type, constraint, decode).
    #[error("statement failed: {0}")]
    Statement(#[source] sqlx::Error),
}

impl StoreError {
    pub fn sqlx_error(&self) -> &sqlx::Error {
        match self {
            StoreError::Connection(e) | StoreError::Statement(e) => e,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::Connection(err),
            other => StoreError::Statement(other),
        }
    }
}

/// Executes parameterized statements against pooled connections.
///
/// Each call is a single statement; the connection goes back to the pool
/// when the call returns, whether it succeeded or not.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run a read statement (or a write with `RETURNING`) and return its rows.
    async fn query(&self, sql: &str, params: &[ColumnValue]) -> Result<Vec<Row>, StoreError>;

    /// Run a write statement.
    async fn execute(&self, sql: &str, params: &[ColumnValue]) -> Result<ExecOutcome, StoreError>;
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pool_timeouts_are_connection_errors() {
        assert_matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Connection(_)
        );
        assert_matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Connection(_)
        );
    }

    #[test]
    fn other_failures_are_statement_errors() {
        assert_matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Statement(_)
        );
        assert_matches!(
            StoreError::from(sqlx::Error::ColumnNotFound("value".into())),
            StoreError::Statement(_)
        );
    }
}
