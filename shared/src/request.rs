//! Request types for the shared crate
//!
//! Common request types used across the admin API

/// Pagination query parameters
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PageQuery {
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: u32,

    /// Items per page (default: 10, max: 100)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageQuery {
    /// Build from optional query parameters, applying the defaults
    pub fn from_parts(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or_else(default_page),
            limit: limit.unwrap_or_else(default_limit),
        }
    }

    /// Offset of the first item on the requested page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit() as usize
    }

    /// Items per page (clamped to max 100)
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn page_query_offset_and_clamp() {
        let query = PageQuery { page: 3, limit: 500 };
        assert_eq!(query.limit(), 100);
        assert_eq!(query.offset(), 200);
    }
}
