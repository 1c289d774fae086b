// Pagination metadata shared by all list endpoints

use serde::{Deserialize, Serialize};

/// Pagination block returned alongside paginated collections
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            current_page: page,
            total_pages,
            total_items: total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Common page/limit query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Clamped (page, limit, offset) triple with the module's default limit
    pub fn resolve(&self, default_limit: i64) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, 100);
        (page, limit, (page - 1) * limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(2, 10, 35);
        assert_eq!(p.total_pages, 4);
        assert!(p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = Pagination::new(4, 10, 35);
        assert!(!p.has_next_page);
        assert!(p.has_prev_page);
    }

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn test_page_query_clamps_limit() {
        let q = PageQuery {
            page: Some(0),
            limit: Some(500),
        };
        let (page, limit, offset) = q.resolve(10);
        assert_eq!(page, 1);
        assert_eq!(limit, 100);
        assert_eq!(offset, 0);
    }
}
