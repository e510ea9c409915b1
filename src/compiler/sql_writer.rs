use serde_json::Value;

use crate::{compiler::{ColumnRef, Dialect}, definition::TableRef};

/// Accumulates statement text and its bound parameters in placeholder order.
#[derive(Debug)]
pub struct SqlWriter {
    dialect: Dialect,
    text: String,
    params: Vec<Value>,
}

impl SqlWriter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect, text: String::new(), params: Vec::new() }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn push(&mut self, sql: &str) {
        self.text.push_str(sql);
    }

    pub fn push_identifier(&mut self, identifier: &str) {
        self.text.push_str(&Dialect::quote_identifier(identifier));
    }

    pub fn push_column(&mut self, column: &ColumnRef) {
        self.push_identifier(&column.alias);
        self.text.push('.');
        self.push_identifier(&column.column);
    }

    /// `"schema"."table" AS "alias"`
    pub fn push_table(&mut self, table: &TableRef, alias: &str) {
        if let Some(schema) = &table.schema {
            self.push_identifier(schema);
            self.text.push('.');
        }
        self.push_identifier(&table.name);
        self.text.push_str(" AS ");
        self.push_identifier(alias);
    }

    /// Append a placeholder for `value` and record it as a parameter.
    pub fn bind(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.placeholder(self.params.len());
        self.text.push_str(&placeholder);
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.text, self.params)
    }
}
