//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Upper bound applied to `?limit=` regardless of what the caller asks for.
const MAX_LIMIT: i64 = 200;
/// Default page size when `?limit=` is absent.
const DEFAULT_LIMIT: i64 = 50;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamp to sane bounds: limit in `1..=200` (default 50), offset `>= 0`.
    pub fn clamped(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_values() {
        let params = PaginationParams {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(params.clamped(), (200, 0));
    }

    #[test]
    fn defaults_when_absent() {
        let params = PaginationParams {
            limit: None,
            offset: None,
        };
        assert_eq!(params.clamped(), (50, 0));
    }
}
