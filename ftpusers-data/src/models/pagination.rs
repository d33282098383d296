//! Pagination and search for the account listing

use serde::Serialize;

use super::account::Account;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub page_size: u32,
}

impl Pagination {
    /// Normalise raw request values.
    ///
    /// - Page 0 (unset) becomes 1
    /// - Page size 0 (unset) becomes 30
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// True when the page starts at or after the last row, so there is
    /// nothing to fetch.
    pub fn is_past_end(&self, total_items: u64) -> bool {
        self.offset() >= total_items
    }

    /// Number of pages needed for `total_items` rows.
    pub fn total_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(u64::from(self.page_size))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Free-text filter over username and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pattern: String,
}

impl SearchFilter {
    /// Neutral `where` clause; bind [`SearchFilter::pattern`] twice.
    pub const CLAUSE: &'static str = " where `username` like ? or `description` like ?";

    /// `None` for an empty search term.
    ///
    /// `%` and `_` inside the term are not escaped and keep their
    /// wildcard meaning.
    pub fn new(search: &str) -> Option<Self> {
        if search.is_empty() {
            None
        } else {
            Some(Self {
                pattern: format!("%{search}%"),
            })
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// One page of accounts plus the totals for the whole filtered set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountPage {
    #[serde(rename = "ftpusers")]
    pub accounts: Vec<Account>,
    pub total_items: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_unset_values() {
        assert_eq!(Pagination::new(0, 0), Pagination { page: 1, page_size: 30 });
        assert_eq!(Pagination::new(4, 0).page_size, 30);
        assert_eq!(Pagination::new(0, 9).page, 1);
        assert_eq!(Pagination::new(61, 34), Pagination { page: 61, page_size: 34 });
        assert_eq!(Pagination::default(), Pagination::new(0, 0));
    }

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 10).offset(), 10);
        assert_eq!(Pagination::new(16, 9).offset(), 135);
        assert_eq!(Pagination::new(0, 25).offset(), 0);
    }

    #[test]
    fn offset_does_not_overflow() {
        let p = Pagination::new(u32::MAX, u32::MAX);
        assert_eq!(p.offset(), u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }

    #[test]
    fn total_pages() {
        let p = Pagination::new(1, 30);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(1), 1);
        assert_eq!(p.total_pages(30), 1);
        assert_eq!(p.total_pages(31), 2);
        assert_eq!(p.total_pages(138), 5);
        assert_eq!(p.total_pages(300), 10);

        assert_eq!(Pagination::new(16, 9).total_pages(138), 16);
        assert_eq!(Pagination::new(1, 1).total_pages(300), 300);
    }

    #[test]
    fn past_end_pages() {
        assert!(Pagination::new(1, 30).is_past_end(0));
        assert!(!Pagination::new(1, 30).is_past_end(1));
        assert!(!Pagination::new(16, 9).is_past_end(138));
        assert!(Pagination::new(17, 9).is_past_end(138));

        // offset here is far beyond what a signed 64-bit LIMIT accepts
        let huge = Pagination::new(u32::MAX, u32::MAX);
        assert!(huge.offset() > i64::MAX as u64);
        assert!(huge.is_past_end(300));
    }

    #[test]
    fn search_filter() {
        assert_eq!(SearchFilter::new(""), None);
        let filter = SearchFilter::new("1").unwrap();
        assert_eq!(filter.pattern(), "%1%");
        assert_eq!(SearchFilter::CLAUSE.matches('?').count(), 2);
    }

    #[test]
    fn page_json_shape() {
        let page = AccountPage::default();
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"ftpusers": [], "total_items": 0, "total_pages": 0})
        );
    }
}
