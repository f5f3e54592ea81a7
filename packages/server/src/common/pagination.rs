//! Offset-based pagination over a filtered, ordered result set.
//!
//! Pages are 1-based: page `p` with size `n` covers the half-open window
//! `[(p-1)*n, p*n)`. Out-of-range inputs are clamped rather than rejected, so
//! a bad `page` or `limit` never fails a request.

/// Page size applied when a request doesn't specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// How a request wants its results windowed.
///
/// `All` is an explicit mode, not a degenerate page: it returns the entire
/// filtered set with `page = 1`, `limit = len(results)` and `has_more = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Paged { page: u32, limit: u32 },
    All,
}

impl PageRequest {
    /// Build a paged request, clamping `page` to >= 1 and `limit` into
    /// `1..=MAX_PAGE_SIZE` (falling back to `default_limit` when absent).
    pub fn paged(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE);
        PageRequest::Paged { page, limit }
    }

    /// Build from an optional limit: absent selects all-results mode.
    pub fn paged_or_all(page: Option<u32>, limit: Option<u32>) -> Self {
        match limit {
            Some(limit) => Self::paged(page, Some(limit), DEFAULT_PAGE_SIZE),
            None => PageRequest::All,
        }
    }

    /// The `(offset, limit)` window for this request, or `None` in all mode.
    pub fn window(&self) -> Option<(u64, u64)> {
        match *self {
            PageRequest::Paged { page, limit } => {
                Some(((page as u64 - 1) * limit as u64, limit as u64))
            }
            PageRequest::All => None,
        }
    }
}

/// Whether pages beyond `page` exist, given the pre-window match count.
pub fn has_more(page: u32, limit: u32, total: u64) -> bool {
    (page as u64) * (limit as u64) < total
}

/// Slice one window out of an in-memory result set.
///
/// Used when the pipeline has already fetched the full filtered set (price
/// sort, amenity post-filter); the store-backed path pushes the same window
/// down as an offset/limit range instead.
pub fn slice_window<T>(items: Vec<T>, offset: u64, limit: u64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}
