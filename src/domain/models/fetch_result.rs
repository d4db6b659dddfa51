use serde::{Deserialize, Serialize};

/// One page of a collection endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    pub records: Vec<T>,
    pub info: PageInfo,
}

/// Totals reported alongside a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Records matching the query across all pages
    pub total: u64,
    /// Number of pages at the requested size
    pub pages: u32,
}

impl PageInfo {
    /// Page numbers a pager should render.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> {
        1..=self.pages
    }

    pub const fn has_next(&self, page: u32) -> bool {
        page < self.pages
    }
}

impl<T> FetchResult<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_payload() {
        let payload = serde_json::json!({
            "records": [{"id": 1}, {"id": 2}],
            "info": {"total": 42, "pages": 5}
        });
        let result: FetchResult<serde_json::Value> = serde_json::from_value(payload).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.info.total, 42);
        assert_eq!(result.info.page_numbers().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert!(result.info.has_next(4));
        assert!(!result.info.has_next(5));
    }

    #[test]
    fn test_empty_page_has_no_controls() {
        let info = PageInfo::default();
        assert_eq!(info.page_numbers().count(), 0);
    }
}
