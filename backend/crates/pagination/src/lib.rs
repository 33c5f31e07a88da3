//! Page request and pagination envelope primitives shared by list endpoints.
//!
//! Endpoints accept a 1-based `page` and a `perPage` size, validate them into
//! a [`PageRequest`], and return a [`Page`] envelope carrying the items of the
//! requested window together with the total number of matching records.
//! [`Page::links`] renders navigation URLs that preserve unrelated query
//! parameters.
//!
//! # Examples
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(2, 2).expect("valid request");
//! let page = Page::from_sorted(vec![1, 2, 3, 4, 5], request);
//! assert_eq!(page.items(), &[3, 4]);
//! assert_eq!(page.total(), 5);
//! assert!(page.has_next());
//! ```

use serde::Serialize;
use url::Url;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PER_PAGE: u32 = 30;
/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Errors raised when validating page parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Pages are numbered from 1.
    #[error("page must be at least 1")]
    InvalidPage,
    /// The page size is zero or above [`MAX_PER_PAGE`].
    #[error("per-page size must be between 1 and {max}")]
    InvalidPerPage {
        /// Largest accepted page size.
        max: u32,
    },
}

/// Validated request for one window of an ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validate explicit page parameters.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when `page` is zero or `per_page` is outside
    /// `1..=MAX_PER_PAGE`.
    pub const fn new(page: u32, per_page: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(PaginationError::InvalidPerPage { max: MAX_PER_PAGE });
        }
        Ok(Self { page, per_page })
    }

    /// Build a request from optional query parameters, applying defaults.
    ///
    /// # Errors
    /// Returns [`PaginationError`] when a supplied value is out of range.
    pub fn from_query(page: Option<u32>, per_page: Option<u32>) -> Result<Self, PaginationError> {
        Self::new(page.unwrap_or(1), per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    /// First page with the default size.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items in the page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of items that precede this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    /// Page size as a query limit.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// One window of an ordered collection plus the collection's total size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page: u32,
    per_page: u32,
    total: u64,
}

impl<T> Page<T> {
    /// Wrap items already sliced to `request` by the data source.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    /// Empty page for an empty collection.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            page: request.page,
            per_page: request.per_page,
            total: 0,
        }
    }

    /// Slice an already ordered collection in memory.
    #[must_use]
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, request, total)
    }

    /// Items in this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Requested page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Total number of records across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of pages needed to cover `total`.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page.max(1)))
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Transform every item while keeping the window metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }

    /// Replace the item list wholesale, for example after re-sorting.
    #[must_use]
    pub fn map_items<U, F>(self, f: F) -> Page<U>
    where
        F: FnOnce(Vec<T>) -> Vec<U>,
    {
        Page {
            items: f(self.items),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }

    /// Navigation links relative to the URL the page was requested from.
    #[must_use]
    pub fn links(&self, base: &Url) -> PageLinks {
        let next = self
            .has_next()
            .then(|| page_url(base, self.page.saturating_add(1), self.per_page));
        let prev = self
            .has_prev()
            .then(|| page_url(base, self.page.saturating_sub(1), self.per_page));
        PageLinks {
            self_link: page_url(base, self.page, self.per_page),
            next,
            prev,
        }
    }
}

/// Navigation URLs for a [`Page`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// URL of the current page.
    #[serde(rename = "self")]
    pub self_link: String,
    /// URL of the following page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// URL of the preceding page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

fn page_url(base: &Url, page: u32, per_page: u32) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page" && key != "perPage")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string())
        .append_pair("perPage", &per_page.to_string());
    url.to_string()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for page windows and link rendering.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, PaginationError::InvalidPage)]
    #[case(1, 0, PaginationError::InvalidPerPage { max: MAX_PER_PAGE })]
    #[case(1, MAX_PER_PAGE + 1, PaginationError::InvalidPerPage { max: MAX_PER_PAGE })]
    fn rejects_out_of_range_parameters(
        #[case] page: u32,
        #[case] per_page: u32,
        #[case] expected: PaginationError,
    ) {
        assert_eq!(PageRequest::new(page, per_page), Err(expected));
    }

    #[rstest]
    fn query_defaults_to_first_page() {
        let request = PageRequest::from_query(None, None).expect("defaults are valid");
        assert_eq!(request, PageRequest::first());
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), u64::from(DEFAULT_PER_PAGE));
    }

    #[rstest]
    #[case(1, vec![1, 2], true, false)]
    #[case(2, vec![3, 4], true, true)]
    #[case(3, vec![5], false, true)]
    #[case(4, vec![], false, true)]
    fn slices_sorted_collections(
        #[case] page: u32,
        #[case] expected: Vec<i32>,
        #[case] has_next: bool,
        #[case] has_prev: bool,
    ) {
        let request = PageRequest::new(page, 2).expect("valid request");
        let result = Page::from_sorted(vec![1, 2, 3, 4, 5], request);
        assert_eq!(result.items(), expected.as_slice());
        assert_eq!(result.total(), 5);
        assert_eq!(result.total_pages(), 3);
        assert_eq!(result.has_next(), has_next);
        assert_eq!(result.has_prev(), has_prev);
    }

    #[rstest]
    fn links_preserve_unrelated_query_parameters() {
        let request = PageRequest::new(2, 1).expect("valid request");
        let page = Page::new(vec!["b"], request, 3);
        let base = Url::parse("http://localhost/api/v1/feed?page=2&perPage=1&lang=en")
            .expect("valid url");

        let links = page.links(&base);

        assert_eq!(
            links.self_link,
            "http://localhost/api/v1/feed?lang=en&page=2&perPage=1"
        );
        assert_eq!(
            links.next.as_deref(),
            Some("http://localhost/api/v1/feed?lang=en&page=3&perPage=1")
        );
        assert_eq!(
            links.prev.as_deref(),
            Some("http://localhost/api/v1/feed?lang=en&page=1&perPage=1")
        );
    }

    #[rstest]
    fn serialises_camel_case_envelope() {
        let page = Page::new(vec![1], PageRequest::first(), 1);
        let value = serde_json::to_value(&page).expect("serialises");
        assert_eq!(value["perPage"], DEFAULT_PER_PAGE);
        assert_eq!(value["total"], 1);
    }
}
