use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Paging window plus optional status filter for order listings.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl Default for OrderPagination {
    fn default() -> Self {
        Self { page: default_page(), limit: default_limit(), status: None }
    }
}

/// Listing metadata. `total_page` and `last_page` carry the same derived
/// value under two names; existing callers read both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_page: u32,
    pub page: u32,
    pub last_page: u32,
}

impl PageMeta {
    pub fn new(total_count: u64, page: u32, limit: u32) -> Self {
        let last_page = last_page(total_count, limit);
        Self { total_page: last_page, page, last_page }
    }
}

fn last_page(total_count: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    total_count.div_ceil(limit as u64) as u32
}
