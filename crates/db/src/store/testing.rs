//! In-memory [`RecordStore`] double that records every statement.
//!
//! Responses are queued up front and handed out in order. An empty queue
//! answers queries with no rows and writes with zero affected rows.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use plug_core::fields::ColumnValue;

use super::{ExecOutcome, RecordStore, Row, StoreError};

enum Response {
    Rows(Vec<Row>),
    Exec(ExecOutcome),
    Fail(StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub sql: String,
    pub params: Vec<ColumnValue>,
}

#[derive(Default)]
pub(crate) struct RecordingStore {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<VecDeque<Response>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.push(Response::Rows(rows))
    }

    pub fn push_exec(&self, insert_id: Option<i64>, affected_rows: u64) -> &Self {
        self.push(Response::Exec(ExecOutcome {
            insert_id,
            affected_rows,
        }))
    }

    pub fn push_error(&self, error: StoreError) -> &Self {
        self.push(Response::Fail(error))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statement_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, response: Response) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn record(&self, sql: &str, params: &[ColumnValue]) -> Option<Response> {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        self.responses.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn query(&self, sql: &str, params: &[ColumnValue]) -> Result<Vec<Row>, StoreError> {
        match self.record(sql, params) {
            None => Ok(Vec::new()),
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Fail(err)) => Err(err),
            Some(Response::Exec(_)) => panic!("query() got an exec response: {sql}"),
        }
    }

    async fn execute(&self, sql: &str, params: &[ColumnValue]) -> Result<ExecOutcome, StoreError> {
        match self.record(sql, params) {
            None => Ok(ExecOutcome::default()),
            Some(Response::Exec(outcome)) => Ok(outcome),
            Some(Response::Fail(err)) => Err(err),
            Some(Response::Rows(_)) => panic!("execute() got a rows response: {sql}"),
        }
    }
}

/// Build a row from a `json!({...})` literal.
pub(crate) fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("row() expects an object, got {other}"),
    }
}
