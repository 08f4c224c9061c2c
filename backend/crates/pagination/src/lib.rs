//! Page/offset pagination primitives shared by prodtrack endpoints.
//!
//! A [`PageRequest`] describes which 1-based page of a result set a caller
//! wants and how large each page is. Once the adapter has counted the
//! matching rows and fetched the slice, [`Page`] packages the items together
//! with the derived page metadata.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(2, 10).expect("valid request");
//! assert_eq!(request.offset(), 10);
//!
//! let page = Page::new(vec!["k", "l"], 12, request);
//! assert_eq!(page.total_pages(), 2);
//! ```

use serde::Serialize;
use thiserror::Error;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised when constructing a [`PageRequest`] strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// The page size was zero or above [`MAX_PAGE_SIZE`].
    #[error("page size must be between 1 and {max}, got {actual}")]
    PageSizeOutOfRange {
        /// Requested page size.
        actual: u32,
        /// Largest accepted page size.
        max: u32,
    },
}

/// A validated request for one page of results.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= page_size <= MAX_PAGE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a request, rejecting out-of-range values.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page` is zero or `page_size` is
    /// outside `1..=MAX_PAGE_SIZE`.
    pub const fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::PageOutOfRange);
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(PaginationError::PageSizeOutOfRange {
                actual: page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, page_size })
    }

    /// Build a request from optional caller input, falling back to page one
    /// and [`DEFAULT_PAGE_SIZE`] and clamping the size into range.
    ///
    /// ```
    /// use pagination::{PageRequest, MAX_PAGE_SIZE};
    ///
    /// let request = PageRequest::clamped(Some(0), Some(500));
    /// assert_eq!(request.page(), 1);
    /// assert_eq!(request.page_size(), MAX_PAGE_SIZE);
    /// ```
    #[must_use]
    pub fn clamped(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Number of rows to fetch.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

/// Number of pages needed to hold `total_count` items.
///
/// ```
/// assert_eq!(pagination::total_pages(0, 30), 0);
/// assert_eq!(pagination::total_pages(31, 30), 2);
/// ```
#[must_use]
pub const fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size as u64)
}

/// One page of items plus the metadata needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    total_count: u64,
    current_page: u32,
    total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap a fetched slice with counts derived from `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            current_page: request.page(),
            total_pages: total_pages(total_count, request.page_size()),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items matching the query across every page.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// The page this slice represents.
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }

    /// Consume the page and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
