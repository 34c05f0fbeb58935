use serde::Deserialize;
use std::ops::{Deref, Index};

/// Position of a page inside a list result
///
/// All four values are required; a list response without them is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// Number of results on this page
    #[serde(alias = "result_count")]
    pub count: u32,
    #[serde(alias = "result_offset")]
    pub offset: u32,
    #[serde(alias = "result_limit")]
    pub limit: u32,
    /// Number of results matching the filter across all pages
    #[serde(alias = "result_total")]
    pub total: u32,
}

impl Pagination {
    /// Zero-based page number
    pub fn page(&self) -> u32 {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }

    /// Offset of the next page, `None` when this page reaches the end
    ///
    /// An empty page is always the last one, even when `offset < total`.
    pub fn next(&self) -> Option<u32> {
        if self.count == 0 {
            return None;
        }
        let end = self.offset.saturating_add(self.count);
        if end >= self.total {
            None
        } else {
            Some(end)
        }
    }

    /// Offset of the previous page, `None` on the first page
    pub fn previous(&self) -> Option<u32> {
        if self.offset == 0 {
            None
        } else {
            Some(self.offset.saturating_sub(self.limit))
        }
    }

    pub fn is_first(&self) -> bool {
        self.previous().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

/// One page of entities together with its pagination
#[derive(Debug, Clone)]
pub struct Returned<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Returned<T> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result count reported by the server for this page
    pub fn count(&self) -> u32 {
        self.pagination.count
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.results.iter()
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

impl<T> Deref for Returned<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.results
    }
}

impl<T> Index<usize> for Returned<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.results[index]
    }
}

impl<T> IntoIterator for Returned<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Returned<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
