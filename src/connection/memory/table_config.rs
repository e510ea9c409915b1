use crate::IdType;

/// Id strategy and id column of a memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub id_type: IdType,
    pub id_key: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { id_type: IdType::default(), id_key: "id".to_string() }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(id_type: IdType, id_key: &str) -> Self {
        Self { id_type, id_key: id_key.to_string() }
    }

    pub fn int(id_key: &str) -> Self {
        Self::from(IdType::Int, id_key)
    }

    pub fn uuid(id_key: &str) -> Self {
        Self::from(IdType::Uuid, id_key)
    }

    pub fn none(id_key: &str) -> Self {
        Self::from(IdType::None, id_key)
    }
}
