use serde::{Deserialize, Serialize};

/// Kind of SQL join a join field produces.
///
/// - `Inner`: only matched pairs.
/// - `Left`: every base row; unmatched joined columns are NULL.
/// - `Right`: every joined row; unmatched base columns are NULL.
/// - `Full`: matches plus the unmatched rows of both sides.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }

    /// Whether rows of the base side survive without a match.
    pub fn keeps_unmatched_left(&self) -> bool {
        matches!(self, JoinType::Left | JoinType::Full)
    }

    /// Whether rows of the joined side survive without a match.
    pub fn keeps_unmatched_right(&self) -> bool {
        matches!(self, JoinType::Right | JoinType::Full)
    }
}
