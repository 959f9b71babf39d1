use serde::{Serialize, Deserialize};
use crate::core::types::Record;

/// One page descriptor handed to an external renderer; the core never
/// produces markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crumb {
    pub page: u64,
    pub active: bool,
}

/// Window state for one paginated query, derived entirely from the
/// filtered total and the page size. The page number is an explicit
/// caller argument; nothing is read from ambient request state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub offset: u64,
    pub crumbs: Vec<Crumb>,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let page = page.max(1);
        let pages = total.div_ceil(limit.max(1));
        let crumbs = (1..=pages)
            .map(|n| Crumb { page: n, active: n == page })
            .collect();
        Pagination {
            page,
            limit,
            total,
            offset: (page - 1) * limit,
            crumbs,
        }
    }

    pub fn page_count(&self) -> u64 {
        self.crumbs.len() as u64
    }
}

/// A page of records plus the window it was cut from.
#[derive(Debug, Clone)]
pub struct Paginated {
    pub items: Vec<Record>,
    pub state: Pagination,
}
