use serde::{Deserialize, Serialize};

/// How a memory table fills in the id column of inserted rows.
///
/// - `Uuid`: a fresh v4 UUID string.
/// - `Int`: the next integer after the largest one seen.
/// - `None`: rows keep whatever id they carry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    #[default]
    Uuid,
    Int,
    None,
}
