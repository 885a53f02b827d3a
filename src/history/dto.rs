use serde::{Deserialize, Serialize};

use super::repo_types::Analysis;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_page() -> i64 { 1 }
fn default_limit() -> i64 { DEFAULT_LIMIT }

impl Pagination {
    /// Clamped (page, limit, offset). The page cap keeps the offset in range.
    pub fn resolve(&self) -> (i64, i64, i64) {
        let page = self.page.clamp(1, i64::MAX / MAX_LIMIT);
        let limit = self.limit.clamp(1, MAX_LIMIT);
        (page, limit, (page - 1).saturating_mul(limit))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPage {
    pub items: Vec<Analysis>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedResponse {
    pub cleared: u64,
}
