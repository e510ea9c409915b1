use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{request::OrderInput, QueryError};

/// Per-request filter, ordering, pagination and projection.
///
/// Every part is optional; an absent envelope behaves like the empty one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestEnvelope {
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<OrderInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
}

impl RequestEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON request body; `null` is the empty envelope.
    pub fn from_json(value: Value) -> Result<Self, QueryError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order<I, O>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderInput>,
    {
        self.order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn select<I, S>(mut self, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(select.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::RequestEnvelope;
    use crate::{request::OrderInput, QueryError};

    #[test]
    fn null_is_the_empty_envelope() {
        let envelope = RequestEnvelope::from_json(json!(null)).unwrap();
        assert_eq!(envelope, RequestEnvelope::default());
    }

    #[test]
    fn from_json_reads_every_part() {
        let envelope = RequestEnvelope::from_json(json!({
            "where": { "name": "Alice" },
            "order": ["age:desc"],
            "limit": 5,
            "offset": 10,
            "select": ["name"]
        })).unwrap();

        assert_eq!(envelope.filter, Some(json!({ "name": "Alice" })));
        assert_eq!(envelope.order, Some(vec![OrderInput::Token("age:desc".into())]));
        assert_eq!(envelope.limit, Some(5));
        assert_eq!(envelope.offset, Some(10));
        assert_eq!(envelope.select, Some(vec!["name".to_string()]));
    }

    #[test]
    fn from_json_rejects_wrong_types() {
        let err = RequestEnvelope::from_json(json!({ "limit": "ten" })).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRequest(_)));
    }

    #[test]
    fn builder_methods() {
        let envelope = RequestEnvelope::new()
            .filter(json!({ "age": { "$gt": 20 } }))
            .order(["name:asc", "age:desc"])
            .limit(3)
            .offset(1)
            .select(["name"]);

        assert_eq!(envelope.order.as_ref().map(|o| o.len()), Some(2));
        assert_eq!(envelope.limit, Some(3));
        assert_eq!(envelope.offset, Some(1));
    }

    #[test]
    fn serializes_without_absent_parts() {
        let envelope = RequestEnvelope::new().limit(2);
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({ "limit": 2 }));
    }
}
