use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};

use serde_json::Value;
use tracing::trace;

use crate::{
    compiler::Statement, connection::Connection, ExecutionError, InternalMemoryTable, MemoryExecutor, MemoryTable,
    TableConfig,
};

/// In-memory [`Connection`]: named tables of JSON rows that evaluate the
/// [`SelectPlan`](crate::compiler::SelectPlan) carried by each statement.
pub type MemoryDb = Arc<RwLock<InternalMemoryDb>>;

#[derive(Debug, Default)]
pub struct InternalMemoryDb {
    config: TableConfig,
    tables: HashMap<String, MemoryTable>,
    failure: Option<String>,
    query_count: usize,
}

impl InternalMemoryDb {
    pub fn new_db() -> Self {
        Self::new_db_with_config(TableConfig::default())
    }

    pub fn new_db_with_config(config: TableConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn into_protected(self) -> MemoryDb {
        Arc::new(RwLock::new(self))
    }

    /// Create (or replace) a table. `name` may be schema-qualified (`analytics.events`).
    pub fn create(&mut self, name: &str) -> MemoryTable {
        self.create_with_config(name, self.config.clone())
    }

    pub fn create_with_config(&mut self, name: &str, config: TableConfig) -> MemoryTable {
        let table = InternalMemoryTable::new(name, config).into_protected();
        self.tables.insert(name.to_string(), Arc::clone(&table));
        table
    }

    pub fn get(&self, name: &str) -> Option<MemoryTable> {
        self.tables.get(name).map(Arc::clone)
    }

    pub fn list_tables(&self) -> Vec<String> {
        let mut names = self.tables.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn query_count(&self) -> usize {
        self.query_count
    }

    fn run(&mut self, statement: &Statement) -> Result<Vec<Value>, ExecutionError> {
        self.query_count += 1;
        trace!(sql = statement.text(), params = statement.params().len(), "memory query");

        if let Some(message) = self.failure.take() {
            return Err(ExecutionError::new(message));
        }
        MemoryExecutor::run(statement.plan(), self)
    }
}

pub trait MemoryDbCommon {
    fn new_db() -> Self;
    fn new_db_with_config(config: TableConfig) -> Self;
    fn create(&self, name: &str) -> MemoryTable;
    fn create_with_config(&self, name: &str, config: TableConfig) -> MemoryTable;
    fn get(&self, name: &str) -> Option<MemoryTable>;
    fn list_tables(&self) -> Vec<String>;
    /// Make the next query fail with `message` instead of running.
    fn fail_next(&self, message: &str);
    /// Number of statements received so far, failed ones included.
    fn query_count(&self) -> usize;
}

impl MemoryDbCommon for MemoryDb {
    fn new_db() -> Self {
        InternalMemoryDb::new_db().into_protected()
    }

    fn new_db_with_config(config: TableConfig) -> Self {
        InternalMemoryDb::new_db_with_config(config).into_protected()
    }

    fn create(&self, name: &str) -> MemoryTable {
        self.write().unwrap_or_else(PoisonError::into_inner).create(name)
    }

    fn create_with_config(&self, name: &str, config: TableConfig) -> MemoryTable {
        self.write().unwrap_or_else(PoisonError::into_inner).create_with_config(name, config)
    }

    fn get(&self, name: &str) -> Option<MemoryTable> {
        self.read().unwrap_or_else(PoisonError::into_inner).get(name)
    }

    fn list_tables(&self) -> Vec<String> {
        self.read().unwrap_or_else(PoisonError::into_inner).list_tables()
    }

    fn fail_next(&self, message: &str) {
        self.write().unwrap_or_else(PoisonError::into_inner).failure = Some(message.to_string());
    }

    fn query_count(&self) -> usize {
        self.read().unwrap_or_else(PoisonError::into_inner).query_count()
    }
}

impl Connection for MemoryDb {
    fn query(&self, statement: &Statement) -> impl Future<Output = Result<Vec<Value>, ExecutionError>> + Send {
        let result = self.write().unwrap_or_else(PoisonError::into_inner).run(statement);
        async move { result }
    }
}
