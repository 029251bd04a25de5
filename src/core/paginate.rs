//! Offset pagination over the part store

use serde::Serialize;
use tracing::debug;

use crate::core::filter::CompiledFilter;
use crate::core::store::{FindOptions, PartStore, StoreError};
use crate::entities::part::Part;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// A 1-based page and its size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Build a request, clamping both values to at least 1
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a request from raw query values
    ///
    /// A page that is missing, not a number, or below 1 becomes 1. A limit
    /// that is missing, not a number, or below 1 becomes `default_limit`.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>, default_limit: usize) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|&p| p >= 1)
            .map(|p| p as usize)
            .unwrap_or(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|&l| l >= 1)
            .map(|l| l as usize)
            .unwrap_or(default_limit);
        Self::new(page, limit)
    }

    /// Records to skip before this page starts
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

/// One window of results plus the totals needed to navigate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Number of records on this page
    pub fn count(&self) -> usize {
        self.data.len()
    }

    fn assemble(data: Vec<T>, total: usize, request: &PageRequest) -> Self {
        let has_more = request.skip().saturating_add(data.len()) < total;
        Self {
            pagination: Pagination {
                current_page: request.page,
                total_pages: total.div_ceil(request.limit),
                has_more,
            },
            data,
            total,
        }
    }
}

/// Count the matches, then fetch the requested window newest first
///
/// Pages past the end come back empty with the real totals.
pub fn paginate<S: PartStore + ?Sized>(
    store: &S,
    filter: &CompiledFilter,
    request: &PageRequest,
) -> Result<Page<Part>, StoreError> {
    let total = store.count(filter)?;
    let skip = request.skip();

    let data = if skip >= total {
        Vec::new()
    } else {
        store.find(
            filter,
            &FindOptions::newest_first().window(skip, request.limit),
        )?
    };
    debug!(
        total,
        skip,
        limit = request.limit,
        returned = data.len(),
        "paginated"
    );

    Ok(Page::assemble(data, total, request))
}
