//! Lenient page/limit handling for list endpoints.
//!
//! Values that are missing, unparsable or out of range fall back to the
//! defaults instead of rejecting the request.

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from raw query-string values.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page.and_then(|p| p.trim().parse::<i64>().ok());
        let limit = limit.and_then(|l| l.trim().parse::<i64>().ok());
        Self::new(page, limit)
    }

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p as u64,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l >= 1 && l as u64 <= MAX_LIMIT => l as u64,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Zero-based page index as expected by SeaORM's paginator.
    pub fn page_index(&self) -> u64 {
        self.page - 1
    }

    pub fn offset(&self) -> u64 {
        self.page_index() * self.limit
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
    }

    #[test]
    fn test_limit_outside_range_falls_back() {
        assert_eq!(PageRequest::new(Some(1), Some(0)).limit, 10);
        assert_eq!(PageRequest::new(Some(1), Some(101)).limit, 10);
        assert_eq!(PageRequest::new(Some(1), Some(-3)).limit, 10);
        assert_eq!(PageRequest::new(Some(1), Some(100)).limit, 100);
        assert_eq!(PageRequest::new(Some(1), Some(1)).limit, 1);
    }

    #[test]
    fn test_page_below_one_falls_back() {
        assert_eq!(PageRequest::new(Some(0), None).page, 1);
        assert_eq!(PageRequest::new(Some(-7), None).page, 1);
        assert_eq!(PageRequest::from_raw(Some("abc"), Some("x")), PageRequest::default());
        assert_eq!(PageRequest::from_raw(Some(" 3 "), Some("25")), PageRequest { page: 3, limit: 25 });
    }

    #[test]
    fn test_total_pages_and_offset() {
        let request = PageRequest::new(Some(3), Some(10));
        assert_eq!(request.total_pages(25), 3);
        assert_eq!(request.total_pages(30), 3);
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.page_index(), 2);
    }
}
