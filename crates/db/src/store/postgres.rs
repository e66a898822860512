//! [`RecordStore`] over a `sqlx` Postgres pool.

use async_trait::async_trait;
use chrono::SecondsFormat;
use plug_core::fields::ColumnValue;
use plug_core::schema::ColumnKind;
use plug_core::types::{DbId, Timestamp};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as _, TypeInfo};

use super::{ExecOutcome, RecordStore, Row, StoreError};
use crate::DbPool;

/// Postgres-backed record store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn query(&self, sql: &str, params: &[ColumnValue]) -> Result<Vec<Row>, StoreError> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(decode_pg_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Statement)
    }

    async fn execute(&self, sql: &str, params: &[ColumnValue]) -> Result<ExecOutcome, StoreError> {
        let query = bind_all(sqlx::query(sql), params);

        if returns_id(sql) {
            let rows = query.fetch_all(&self.pool).await?;
            let insert_id = rows
                .first()
                .map(|row| row.try_get::<DbId, _>("id"))
                .transpose()
                .map_err(StoreError::Statement)?;
            return Ok(ExecOutcome {
                insert_id,
                affected_rows: rows.len() as u64,
            });
        }

        let result = query.execute(&self.pool).await?;
        Ok(ExecOutcome {
            insert_id: None,
            affected_rows: result.rows_affected(),
        })
    }
}

fn returns_id(sql: &str) -> bool {
    sql.trim_end()
        .to_ascii_uppercase()
        .ends_with("RETURNING ID")
}

/// Bind parameters in order. Nulls are bound with the column's type so
/// Postgres can infer parameter types for untyped `NULL`s.
fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [ColumnValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            ColumnValue::Null(kind) => match kind {
                ColumnKind::Text | ColumnKind::Json => query.bind(None::<String>),
                ColumnKind::Integer => query.bind(None::<i64>),
                ColumnKind::Boolean => query.bind(None::<bool>),
                ColumnKind::Timestamp => query.bind(None::<Timestamp>),
            },
            ColumnValue::Text(s) => query.bind(s.as_str()),
            ColumnValue::Integer(n) => query.bind(*n),
            ColumnValue::Boolean(b) => query.bind(*b),
            ColumnValue::Timestamp(ts) => query.bind(*ts),
        };
    }
    query
}

/// Decode a row into JSON by Postgres type name.
fn decode_pg_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::from),
            "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(Value::from),
            "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(Value::from),
            "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::from),
            "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(Value::from),
            "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::from),
            "TIMESTAMPTZ" => row
                .try_get::<Option<Timestamp>, _>(idx)?
                .map(|ts| Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))),
            "JSON" | "JSONB" => row.try_get::<Option<Value>, _>(idx)?,
            _ => row.try_get::<Option<String>, _>(idx)?.map(Value::String),
        };
        out.insert(column.name().to_string(), value.unwrap_or(Value::Null));
    }
    Ok(out)
}
