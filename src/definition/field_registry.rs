use indexmap::IndexMap;

use crate::{definition::FieldSpec, QueryError};

/// Exposed field name -> resolution rule, in declaration order.
///
/// Declaration order drives the default projection, so the map keeps it.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldSpec>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, spec: FieldSpec) -> Result<(), QueryError> {
        if self.fields.contains_key(name) {
            return QueryError::DuplicateField(name.to_string()).err();
        }
        self.fields.insert(name.to_string(), spec);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&FieldSpec, QueryError> {
        self.fields
            .get(name)
            .ok_or_else(|| QueryError::UnknownField(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSpec)> {
        self.fields.iter()
    }

    /// Scalar fields as `(name, column)` pairs.
    pub fn scalars(&self) -> impl Iterator<Item = (&String, &str)> {
        self.fields.iter().filter_map(|(name, spec)| match spec {
            FieldSpec::Scalar { column } => Some((name, column.as_str())),
            FieldSpec::Join(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
