use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use crate::{IdManager, TableConfig};

/// Shared handle to one in-memory table.
pub type MemoryTable = Arc<RwLock<InternalMemoryTable>>;

/// Rows of one table, kept in insertion order so scans are deterministic.
#[derive(Debug)]
pub struct InternalMemoryTable {
    pub name: String,
    rows: Vec<Value>,
    id_manager: IdManager,
    config: TableConfig,
}

impl InternalMemoryTable {
    pub fn new(name: &str, config: TableConfig) -> Self {
        Self {
            name: name.to_string(),
            rows: Vec::new(),
            id_manager: IdManager::new(config.id_type),
            config,
        }
    }

    pub fn into_protected(self) -> MemoryTable {
        Arc::new(RwLock::new(self))
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Store one object row, filling the id column when it is missing.
    ///
    /// Non-object values are ignored.
    pub fn insert(&mut self, item: Value) -> Option<Value> {
        let Value::Object(mut map) = item else {
            return None;
        };

        match map.get(&self.config.id_key) {
            Some(id) if !id.is_null() => self.id_manager.observe(id),
            _ => {
                if let Some(id) = self.id_manager.next() {
                    map.insert(self.config.id_key.clone(), id.into_json());
                }
            }
        }

        let row = Value::Object(map);
        self.rows.push(row.clone());
        Some(row)
    }

    /// Insert every object of a JSON array; returns the stored rows.
    pub fn insert_batch(&mut self, items: Value) -> Vec<Value> {
        let Value::Array(items) = items else {
            return Vec::new();
        };
        items.into_iter().filter_map(|item| self.insert(item)).collect()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.rows.len();
        self.rows.clear();
        count
    }
}

/// Convenience methods on the shared handle; each takes the lock it needs.
pub trait MemoryTableCommon {
    fn insert(&self, item: Value) -> Option<Value>;
    fn insert_batch(&self, items: Value) -> Vec<Value>;
    fn rows(&self) -> Vec<Value>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn clear(&self) -> usize;
}

impl MemoryTableCommon for MemoryTable {
    fn insert(&self, item: Value) -> Option<Value> {
        write_table(self).insert(item)
    }

    fn insert_batch(&self, items: Value) -> Vec<Value> {
        write_table(self).insert_batch(items)
    }

    fn rows(&self) -> Vec<Value> {
        read_table(self).rows().to_vec()
    }

    fn len(&self) -> usize {
        read_table(self).len()
    }

    fn is_empty(&self) -> bool {
        read_table(self).is_empty()
    }

    fn clear(&self) -> usize {
        write_table(self).clear()
    }
}

// a panicked writer leaves plain row data behind, still safe to read
fn read_table(table: &MemoryTable) -> RwLockReadGuard<'_, InternalMemoryTable> {
    table.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_table(table: &MemoryTable) -> RwLockWriteGuard<'_, InternalMemoryTable> {
    table.write().unwrap_or_else(PoisonError::into_inner)
}
