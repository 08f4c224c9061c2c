//! Filters, ordering and result types for the product listing engine.
//!
//! Every listing query runs inside the base scope (owner matches and the
//! product is not trashed). The filters here only narrow the page of items;
//! [`StatusCounts`] is always computed over the base scope alone so the
//! dashboard counters stay stable while the user narrows the list.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use pagination::Page;
use serde::Serialize;

use crate::domain::{Product, TagId};

/// Sort order for listings. Ties are broken by id in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// `created_at` descending.
    #[default]
    Newest,
    /// `created_at` ascending.
    Oldest,
    /// `video_count` descending.
    MostVideos,
    /// `video_count` ascending.
    LeastVideos,
}

impl ProductSort {
    /// Parse the query-string keyword; unknown values yield `None`.
    ///
    /// # Examples
    /// ```
    /// use prodtrack::domain::ProductSort;
    ///
    /// assert_eq!(ProductSort::from_keyword("most_videos"), Some(ProductSort::MostVideos));
    /// assert_eq!(ProductSort::from_keyword("random"), None);
    /// ```
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "most_videos" => Some(Self::MostVideos),
            "least_videos" => Some(Self::LeastVideos),
            _ => None,
        }
    }
}

/// Case-insensitive substring matched against a product's url or notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Trim the raw text; blank input yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Trimmed search text as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ILIKE` pattern with `%`, `_` and `\` escaped so they match literally.
    ///
    /// # Examples
    /// ```
    /// use prodtrack::domain::SearchTerm;
    ///
    /// let term = SearchTerm::parse("50%_off").expect("non-blank");
    /// assert_eq!(term.like_pattern(), r"%50\%\_off%");
    /// ```
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for ch in self.0.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}

/// Inclusive creation-date window; each bound is optional.
///
/// Bounds are calendar days interpreted in UTC: `from` starts at midnight and
/// `to` covers the whole day up to the next midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreatedDateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl CreatedDateRange {
    /// First instant included in the window.
    #[must_use]
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.from
            .map(|day| day.and_time(NaiveTime::MIN).and_utc())
    }

    /// First instant after the window (exclusive bound).
    #[must_use]
    pub fn end_instant_exclusive(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|day| day.checked_add_days(Days::new(1)))
            .map(|day| day.and_time(NaiveTime::MIN).and_utc())
    }
}

/// Optional narrowing filters for a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductListFilter {
    /// `Some(true)` for purchased only, `Some(false)` for pending only.
    pub purchased: Option<bool>,
    /// Products carrying at least one of these tags. Empty means no filter.
    pub tag_ids: Vec<TagId>,
    pub search: Option<SearchTerm>,
    pub created: CreatedDateRange,
    /// Inclusive upper bound on `video_count`.
    pub max_video_count: Option<i32>,
}

/// Summary counters over the caller's active products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub purchased: i64,
}

impl StatusCounts {
    /// Build counters from the purchased/pending split.
    #[must_use]
    pub fn from_split(purchased: i64, pending: i64) -> Self {
        Self {
            total: purchased + pending,
            pending,
            purchased,
        }
    }
}

/// One page of products plus the base-scope counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub page: Page<Product>,
    pub status_counts: StatusCounts,
}
