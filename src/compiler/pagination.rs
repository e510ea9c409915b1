use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::QueryConfig;

/// Effective window of a statement after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

pub struct PaginationGuard;

impl PaginationGuard {
    /// Apply the definition's defaults and ceiling. Never fails.
    ///
    /// - missing `limit` -> `default_limit`
    /// - `limit` above `max_limit` -> `max_limit`
    /// - negative values -> `0`
    pub fn normalize(config: &QueryConfig, limit: Option<i64>, offset: Option<i64>) -> Pagination {
        let limit = match limit {
            Some(limit) => u64::try_from(limit).unwrap_or(0),
            None => config.default_limit,
        };
        let offset = offset.map(|offset| u64::try_from(offset).unwrap_or(0)).unwrap_or(0);

        Pagination {
            limit: limit.min(config.max_limit),
            offset,
        }
    }
}

/// Navigation flags for a page, given the total number of matching rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub total_count: u64,
}

impl PageInfo {
    pub fn calculate(total_count: u64, pagination: &Pagination) -> Self {
        Self {
            has_next_page: pagination.offset.saturating_add(pagination.limit) < total_count,
            has_previous_page: pagination.offset > 0,
            total_count,
        }
    }
}

/// One window of rows and where it sits in the full result.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub rows: Vec<Value>,
    pub page_info: PageInfo,
}
