use crate::compiler::Dialect;

/// Per-definition limits and rendering options.
///
/// - `default_limit` applies when a request has no `limit`.
/// - `max_limit` is the ceiling a requested `limit` is clamped to.
/// - `max_join_depth` bounds how far join fields are followed.
/// - `dialect` selects placeholder style and `ILIKE` rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    pub default_limit: u64,
    pub max_limit: u64,
    pub max_join_depth: usize,
    pub dialect: Dialect,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            max_join_depth: 5,
            dialect: Dialect::default(),
        }
    }
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(default_limit: u64, max_limit: u64) -> Self {
        Self {
            default_limit,
            max_limit,
            ..Self::default()
        }
    }

    pub fn postgres() -> Self {
        Self {
            dialect: Dialect::Postgres,
            ..Self::default()
        }
    }

    pub fn sqlite() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            ..Self::default()
        }
    }
}
