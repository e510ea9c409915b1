use std::future::Future;

use serde_json::Value;

use crate::{compiler::Statement, ExecutionError};

/// The database collaborator: runs one parameterized statement and returns
/// its rows as JSON objects keyed by projection alias.
///
/// Pooling, transactions, retries and cancellation belong to the
/// implementation; the compiler calls `query` exactly once per `execute`
/// and twice per `execute_page` (rows, then count).
pub trait Connection {
    fn query(&self, statement: &Statement) -> impl Future<Output = Result<Vec<Value>, ExecutionError>> + Send;
}
