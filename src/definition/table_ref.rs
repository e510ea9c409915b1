use std::fmt::Display;

/// Handle to a physical table as supplied by the schema layer.
///
/// `schema` is optional; `analytics.events` parses into
/// `TableRef { schema: Some("analytics"), name: "events" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        Self { schema: None, name: name.to_string() }
    }

    pub fn qualified(schema: &str, name: &str) -> Self {
        Self { schema: Some(schema.to_string()), name: name.to_string() }
    }

    /// Split a dotted `schema.table` reference. Only the first dot separates.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((schema, name)) if !schema.is_empty() && !name.is_empty() => Self::qualified(schema, name),
            _ => Self::new(text),
        }
    }

    /// Alias used for this table when it appears at position `index` of a statement.
    pub fn alias(&self, index: usize) -> String {
        format!("t{}_{}", index, self.name)
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for TableRef {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for TableRef {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}
