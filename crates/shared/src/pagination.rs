//! Limit/offset pagination for list endpoints.
//!
//! Event galleries and moderation queues are small (hundreds of rows, not
//! millions), so plain limit/offset is enough; no cursor encoding needed.

use serde::Deserialize;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Hard cap on page size.
pub const MAX_PAGE_SIZE: i64 = 200;

/// Query-string pagination parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Effective limit, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Effective offset, never negative.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            limit: None,
            offset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_limit_clamped() {
        let params = PageParams {
            limit: Some(10_000),
            offset: None,
        };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);

        let params = PageParams {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_negative_offset_clamped() {
        let params = PageParams {
            limit: None,
            offset: Some(-5),
        };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_deserialize_from_query_shape() {
        let params: PageParams = serde_json::from_str(r#"{"limit": 25, "offset": 50}"#).unwrap();
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 50);
    }
}
