use std::fmt::Display;

use serde_json::Value;
use uuid::Uuid;

use crate::IdType;

#[derive(Debug, Clone, PartialEq)]
pub enum IdValue {
    Uuid(String),
    Int(u64),
}

impl IdValue {
    pub fn into_json(self) -> Value {
        match self {
            IdValue::Uuid(uuid) => Value::String(uuid),
            IdValue::Int(id) => Value::from(id),
        }
    }
}

impl Display for IdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdValue::Uuid(uuid) => f.write_str(uuid),
            IdValue::Int(id) => write!(f, "{id}"),
        }
    }
}

/// Id sequence of one memory table.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IdManager {
    pub id_type: IdType,
    pub current: Option<IdValue>,
}

impl IdManager {
    pub fn new(id_type: IdType) -> Self {
        Self { id_type, current: None }
    }

    /// Move an integer sequence forward so it never hands out `seen` again.
    pub fn observe(&mut self, seen: &Value) {
        if self.id_type != IdType::Int {
            return;
        }
        let Some(seen) = seen.as_u64() else {
            return;
        };
        match self.current {
            Some(IdValue::Int(current)) if current >= seen => {}
            _ => self.current = Some(IdValue::Int(seen)),
        }
    }
}

impl Iterator for IdManager {
    type Item = IdValue;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match (&self.id_type, &self.current) {
            (IdType::None, _) => return None,
            (IdType::Int, Some(IdValue::Int(id))) => IdValue::Int(id.wrapping_add(1)),
            (IdType::Int, _) => IdValue::Int(1),
            (IdType::Uuid, _) => IdValue::Uuid(Uuid::new_v4().to_string()),
        };

        self.current = Some(item.clone());
        Some(item)
    }
}
