//! Splitting an ordered feed into fixed-size pages.
//!
//! A requested page number is never an error: a missing or malformed
//! value means the first page, and a number outside the available range
//! resolves to the last page.

use serde::Serialize;

use crate::domain::{PostEntry, PostFilter};
use crate::error::RepoError;
use crate::ports::PostRepository;

/// Posts per page when nothing else is configured.
pub const DEFAULT_PER_PAGE: u64 = 10;

/// A page number as requested by the client, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    /// Parse the `page` query parameter.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or_default()
    }

    pub fn number(&self) -> i64 {
        self.0
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

impl From<i64> for PageRequest {
    fn from(number: i64) -> Self {
        Self(number)
    }
}

/// The resolved position of one page within a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// A page size of zero is treated as one.
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Total number of pages for `count` items. An empty feed still has one
    /// (empty) page.
    pub fn num_pages(&self, count: u64) -> u64 {
        count.div_ceil(self.per_page).max(1)
    }

    pub fn window(&self, count: u64, request: PageRequest) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match u64::try_from(request.number()) {
            Ok(n) if (1..=num_pages).contains(&n) => n,
            _ => num_pages,
        };

        PageWindow {
            number,
            num_pages,
            count,
            per_page: self.per_page,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    /// Fetch the requested page of the feed described by `filter`.
    pub async fn page_of_posts(
        &self,
        posts: &dyn PostRepository,
        filter: &PostFilter,
        request: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let count = posts.count(filter).await?;
        let window = self.window(count, request);
        let items = posts.list(filter, window.offset, window.limit).await?;
        Ok(Page::new(items, window))
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

/// One page of items plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub has_other_pages: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
    pub start_index: u64,
    pub end_index: u64,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, window: PageWindow) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        let (start_index, end_index) = if window.count == 0 {
            (0, 0)
        } else if window.number == window.num_pages {
            (window.offset + 1, window.count)
        } else {
            (window.offset + 1, window.number * window.per_page)
        };

        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next,
            has_previous,
            has_other_pages: has_next || has_previous,
            next_page_number: has_next.then_some(window.number + 1),
            previous_page_number: has_previous.then(|| window.number - 1),
            start_index,
            end_index,
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    /// Convert every item, keeping the navigation metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
            has_other_pages: self.has_other_pages,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_for(count: u64, requested: i64) -> Page<u64> {
        let paginator = Paginator::new(10);
        let window = paginator.window(count, PageRequest::from(requested));
        let items = (window.offset..count.min(window.offset + window.limit)).collect();
        Page::new(items, window)
    }

    #[test]
    fn test_parse_defaults_to_first_page() {
        assert_eq!(PageRequest::parse(None).number(), 1);
        assert_eq!(PageRequest::parse(Some("")).number(), 1);
        assert_eq!(PageRequest::parse(Some("two")).number(), 1);
        assert_eq!(PageRequest::parse(Some("1.5")).number(), 1);
        assert_eq!(PageRequest::parse(Some(" 2 ")).number(), 2);
        assert_eq!(PageRequest::parse(Some("-3")).number(), -3);
    }

    #[test]
    fn test_thirteen_items_split_ten_and_three() {
        let first = page_for(13, 1);
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.next_page_number, Some(2));
        assert_eq!((first.start_index, first.end_index), (1, 10));

        let second = page_for(13, 2);
        assert_eq!(second.len(), 3);
        assert!(!second.has_next);
        assert!(second.has_previous);
        assert_eq!(second.previous_page_number, Some(1));
        assert_eq!(second.object_list, vec![10, 11, 12]);
        assert_eq!((second.start_index, second.end_index), (11, 13));
    }

    #[test]
    fn test_out_of_range_resolves_to_last_page() {
        assert_eq!(page_for(13, 99).number, 2);
        assert_eq!(page_for(13, 0).number, 2);
        assert_eq!(page_for(13, -1).number, 2);
    }

    #[test]
    fn test_empty_feed_has_one_empty_page() {
        let page = page_for(0, 1);
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.is_empty());
        assert!(!page.has_other_pages);
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn test_exact_multiple_has_no_remainder_page() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.num_pages(20), 2);
        assert_eq!(paginator.num_pages(21), 3);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(Paginator::new(0).per_page(), 1);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = page_for(13, 2).map(|n| n.to_string());
        assert_eq!(page.object_list, vec!["10", "11", "12"]);
        assert_eq!(page.number, 2);
        assert_eq!(page.count, 13);
    }

    #[test]
    fn test_page_serializes_navigation() {
        let json = serde_json::to_value(page_for(13, 1)).unwrap();
        assert_eq!(json["number"], 1);
        assert_eq!(json["has_next"], true);
        assert_eq!(json["object_list"].as_array().map(Vec::len), Some(10));
    }
}
