//! Pagination state for collection endpoints and the cache key derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page sizes offered by the admin tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PageSize {
    #[default]
    Ten,
    Eighteen,
    TwentyFour,
    Thirty,
}

impl PageSize {
    pub const ALL: [Self; 4] = [Self::Ten, Self::Eighteen, Self::TwentyFour, Self::Thirty];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ten => "10",
            Self::Eighteen => "18",
            Self::TwentyFour => "24",
            Self::Thirty => "30",
        }
    }

    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Ten => 10,
            Self::Eighteen => 18,
            Self::TwentyFour => 24,
            Self::Thirty => 30,
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page size outside the allowed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid page size: {0}. Must be one of: 10, 18, 24, 30")]
pub struct InvalidPageSize(pub String);

impl FromStr for PageSize {
    type Err = InvalidPageSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s.trim())
            .ok_or_else(|| InvalidPageSize(s.to_string()))
    }
}

impl TryFrom<String> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PageSize> for String {
    fn from(size: PageSize) -> Self {
        size.as_str().to_string()
    }
}

/// Column sort with direction.
///
/// Encoded as the bare column name for ascending and `-column` for
/// descending. Column names are passed through without validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// Same column, opposite direction. Clicking a sorted header does this.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            column: self.column.clone(),
            descending: !self.descending,
        }
    }
}

impl From<&str> for SortKey {
    fn from(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(column) => Self::descending(column),
            None => Self::ascending(raw),
        }
    }
}

impl From<String> for SortKey {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.column)
        } else {
            f.write_str(&self.column)
        }
    }
}

/// Client-side state of one paginated table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// 1-based page number
    pub page: u32,
    pub page_size: PageSize,
    /// Column name, `-` prefixed for descending
    pub sort_key: String,
    /// Committed (post-debounce) search term
    pub search_term: String,
    /// Pre-encoded query fragment appended verbatim
    pub extra_filter: String,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            sort_key: String::new(),
            search_term: String::new(),
            extra_filter: String::new(),
        }
    }
}

impl PaginationState {
    pub fn with_sort(sort_key: impl Into<String>) -> Self {
        Self {
            sort_key: sort_key.into(),
            ..Self::default()
        }
    }

    /// Cache key for this state against `endpoint`.
    pub fn cache_key(&self, endpoint: &str) -> CacheKey {
        CacheKey {
            endpoint: endpoint.to_string(),
            search_term: self.search_term.clone(),
            page_size: self.page_size,
            page: self.page,
            sort_key: self.sort_key.clone(),
            extra_filter: self.extra_filter.clone(),
        }
    }
}

/// Identity of a collection request.
///
/// Equal keys are served by the same fetch; any differing field makes a
/// distinct request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub endpoint: String,
    pub search_term: String,
    pub page_size: PageSize,
    pub page: u32,
    pub sort_key: String,
    pub extra_filter: String,
}

impl CacheKey {
    /// Request path with the canonical query string.
    ///
    /// `{endpoint}?search=..&limit=..&page=..&sort=..` followed by
    /// `&{extra_filter}` when the fragment is non-empty.
    pub fn request_path(&self) -> String {
        let mut path = format!(
            "{}?search={}&limit={}&page={}&sort={}",
            self.endpoint,
            urlencoding::encode(&self.search_term),
            self.page_size,
            self.page,
            urlencoding::encode(&self.sort_key),
        );
        let extra = self.extra_filter.trim_start_matches('&');
        if !extra.is_empty() {
            path.push('&');
            path.push_str(extra);
        }
        path
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.request_path())
    }
}
