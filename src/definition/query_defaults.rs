use serde_json::Value;

use crate::request::{OrderInput, RequestEnvelope};

/// Request parts a definition supplies when the caller leaves them out,
/// plus the fields always added to or removed from the projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDefaults {
    pub filter: Option<Value>,
    pub order: Option<Vec<OrderInput>>,
    pub select: Option<Vec<String>>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl QueryDefaults {
    /// Effective request.
    ///
    /// - `where` absent or `null` -> default filter
    /// - `order` absent -> default order
    /// - `select` absent or empty -> default select
    ///
    /// A request value, once given, replaces the default entirely.
    pub fn apply(&self, request: &RequestEnvelope) -> RequestEnvelope {
        let mut effective = request.clone();

        if effective.filter.as_ref().is_none_or(Value::is_null) {
            effective.filter = self.filter.clone();
        }
        if effective.order.is_none() {
            effective.order = self.order.clone();
        }
        if effective.select.as_ref().is_none_or(Vec::is_empty) {
            effective.select = self.select.clone();
        }

        effective
    }
}
