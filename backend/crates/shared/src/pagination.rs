//! Limit/offset pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// `?limit=&offset=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageQuery {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    /// Effective limit, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Apply the window to an already filtered and ordered sequence.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

/// One page of results plus the total number of matches
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    pub limit: u32,
    pub offset: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, query: &PageQuery) -> Self {
        Self {
            count,
            limit: query.limit(),
            offset: query.offset(),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            limit: self.limit,
            offset: self.offset,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = PageQuery::default();
        assert_eq!(q.limit(), DEFAULT_LIMIT);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageQuery::new(0, 0).limit(), 1);
        assert_eq!(PageQuery::new(10_000, 0).limit(), MAX_LIMIT);
    }

    #[test]
    fn test_slice_window() {
        let q = PageQuery::new(2, 3);
        assert_eq!(q.slice(0..10), vec![3, 4]);
        assert!(PageQuery::new(5, 20).slice(0..10).is_empty());
    }

    #[test]
    fn test_map_keeps_counts() {
        let page = Page::new(vec![1, 2], 7, &PageQuery::new(2, 0)).map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.count, 7);
    }
}
