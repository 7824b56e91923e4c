//! # Rating Module
//!
//! Provides the `AverageRating` type: a product's derived average review
//! score, held as a 2-decimal fixed-point value.
//!
//! ## Why Fixed Point?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  (4 + 5 + 5) / 3 = 4.666666...  stored as f64 → 4.666666666666667      │
//! │  Equality checks and sorting on such values drift across platforms.    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Hundredths                                       │
//! │    467 hundredths  ==  4.67                                             │
//! │    Stored as INTEGER, compared as INTEGER, shown as "4.67"              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::rating::AverageRating;
//!
//! let avg = AverageRating::from_hundredths(467);
//! assert_eq!(avg.whole(), 4);
//! assert_eq!(avg.to_string(), "4.67");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Average of a product's review ratings, in hundredths (425 = 4.25).
///
/// This value is read-only for the store: it is never written by review
/// CRUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct AverageRating(i64);

impl AverageRating {
    /// Creates a rating from hundredths.
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        AverageRating(hundredths)
    }

    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    /// The whole-star part (4 for 4.67).
    #[inline]
    pub const fn whole(&self) -> i64 {
        self.0 / 100
    }

    /// The fractional part in hundredths (67 for 4.67).
    #[inline]
    pub const fn fraction(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        AverageRating(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The value as a float (for display / JSON only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for AverageRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.whole(), self.fraction())
    }
}

// JSON carries the number with two decimals (4.67), not the hundredths.
impl Serialize for AverageRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for AverageRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(AverageRating((value * 100.0).round() as i64))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_zero() {
        assert!(AverageRating::default().is_zero());
        assert_eq!(AverageRating::default().to_string(), "0.00");
    }

    #[test]
    fn test_display() {
        assert_eq!(AverageRating::from_hundredths(425).to_string(), "4.25");
        assert_eq!(AverageRating::from_hundredths(405).to_string(), "4.05");
        assert_eq!(AverageRating::from_hundredths(500).to_string(), "5.00");
    }

    #[test]
    fn test_json_is_two_decimal_number() {
        let avg = AverageRating::from_hundredths(425);
        assert_eq!(serde_json::to_string(&avg).unwrap(), "4.25");

        let back: AverageRating = serde_json::from_str("3.5").unwrap();
        assert_eq!(back.hundredths(), 350);
    }
}
