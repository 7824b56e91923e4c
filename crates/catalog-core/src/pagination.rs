//! # Pagination Calculator
//!
//! Navigation metadata for one page of a filtered list.
//!
//! The total comes from the same query that fetched the page (a window
//! count), so this module never touches storage.
//!
//! ```text
//!   total_records = 25, page_size = 10
//!
//!   page 1        page 2        page 3
//!   [ 1 .. 10 ]   [ 11 .. 20 ]  [ 21 .. 25 ]
//!   first_page                  last_page = ceil(25 / 10) = 3
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Pagination metadata returned with every list.
///
/// All-zero (the `Default`) when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Computes metadata for `page` of a result with `total_records` rows.
///
/// ## Example
/// ```rust
/// use catalog_core::pagination::calculate_metadata;
///
/// let meta = calculate_metadata(25, 2, 10);
/// assert_eq!(meta.last_page, 3);
/// assert_eq!(meta.current_page, 2);
/// ```
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records <= 0 || page_size <= 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_all_zero() {
        for (page, size) in [(1, 1), (7, 10), (10_000_000, 100)] {
            assert_eq!(calculate_metadata(0, page, size), Metadata::default());
        }
        assert!(calculate_metadata(0, 3, 5).is_empty());
    }

    #[test]
    fn test_last_page_rounds_up() {
        assert_eq!(calculate_metadata(95, 1, 10).last_page, 10);
        assert_eq!(calculate_metadata(100, 1, 10).last_page, 10);
        assert_eq!(calculate_metadata(101, 1, 10).last_page, 11);
        assert_eq!(calculate_metadata(1, 1, 100).last_page, 1);
    }

    #[test]
    fn test_second_page_of_twenty_five() {
        let meta = calculate_metadata(25, 2, 10);
        assert_eq!(
            meta,
            Metadata {
                current_page: 2,
                page_size: 10,
                first_page: 1,
                last_page: 3,
                total_records: 25,
            }
        );
    }

    #[test]
    fn test_page_past_the_end_keeps_current_page() {
        let meta = calculate_metadata(5, 4, 10);
        assert_eq!(meta.current_page, 4);
        assert_eq!(meta.last_page, 1);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(calculate_metadata(25, 2, 10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "current_page": 2,
                "page_size": 10,
                "first_page": 1,
                "last_page": 3,
                "total_records": 25
            })
        );
    }
}
