//! # Domain Types
//!
//! Entity types of the catalog store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐          ┌──────────────────┐                     │
//! │  │     Product      │ 1     n  │      Review      │                     │
//! │  │  ──────────────  │◄─────────│  ──────────────  │                     │
//! │  │  id (i64)        │          │  id (i64)        │                     │
//! │  │  name, category  │          │  product_id (FK) │                     │
//! │  │  average_rating  │          │  rating (1..=5)  │                     │
//! │  │  version         │          │  version         │                     │
//! │  └──────────────────┘          └──────────────────┘                     │
//! │                                                                         │
//! │  Each entity comes in three shapes:                                    │
//! │  • NewX    - insert input (no id, timestamps, version)                 │
//! │  • X       - a stored row                                              │
//! │  • XPatch  - per-field Option, merged into a freshly read X            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Versioning
//! `version` starts at 1 and grows by exactly 1 per successful update.
//! An update carries the version it was read at; a mismatch is a conflict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::rating::AverageRating;

// =============================================================================
// Product
// =============================================================================

/// A product that can be reviewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Identity assigned by storage.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-form description (may be empty).
    pub description: String,

    /// Category label, e.g. "Beverages".
    pub category: String,

    /// Reference to the product image (URL or storage key).
    pub image_url: String,

    /// Derived average of review ratings, 2-decimal fixed point.
    #[ts(type = "number")]
    pub average_rating: AverageRating,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Optimistic concurrency counter.
    pub version: i64,
}

/// Insert input for a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

/// Partial update of a product.
///
/// `None` means the field was absent from the request and keeps its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Merges the present fields into `product`.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = image_url;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }
}

// =============================================================================
// Review
// =============================================================================

/// A review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Review {
    pub id: i64,

    /// The reviewed product. Fixed at insert time.
    pub product_id: i64,

    pub author: String,

    /// Star rating, 1..=5.
    pub rating: i64,

    pub review_text: String,

    /// Helpful votes. Nullable in storage, 0 on insert.
    pub helpful_count: Option<i64>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    pub version: i64,
}

/// Insert input for a review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReview {
    pub product_id: i64,
    pub author: String,
    pub rating: i64,
    pub review_text: String,
}

/// Partial update of a review.
///
/// The product reference is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ReviewPatch {
    pub author: Option<String>,
    pub rating: Option<i64>,
    pub review_text: Option<String>,
    pub helpful_count: Option<i64>,
}

impl ReviewPatch {
    /// Merges the present fields into `review`.
    pub fn apply(self, review: &mut Review) {
        if let Some(author) = self.author {
            review.author = author;
        }
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(review_text) = self.review_text {
            review.review_text = review_text;
        }
        if let Some(helpful_count) = self.helpful_count {
            review.helpful_count = Some(helpful_count);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.rating.is_none()
            && self.review_text.is_none()
            && self.helpful_count.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: 7,
            name: "Espresso Beans".to_string(),
            description: "Dark roast".to_string(),
            category: "Coffee".to_string(),
            image_url: "img/espresso.png".to_string(),
            average_rating: AverageRating::from_hundredths(450),
            created_at: now,
            updated_at: now,
            version: 3,
        }
    }

    #[test]
    fn test_product_patch_keeps_absent_fields() {
        let mut p = product();
        let patch = ProductPatch {
            name: Some("Decaf Beans".to_string()),
            ..ProductPatch::default()
        };
        patch.apply(&mut p);

        assert_eq!(p.name, "Decaf Beans");
        assert_eq!(p.category, "Coffee");
        assert_eq!(p.version, 3);
    }

    #[test]
    fn test_review_patch_from_partial_json() {
        let patch: ReviewPatch = serde_json::from_str(r#"{"rating": 2}"#).unwrap();
        assert_eq!(patch.rating, Some(2));
        assert!(patch.author.is_none());
        assert!(!patch.is_empty());
        assert!(ReviewPatch::default().is_empty());
    }

    #[test]
    fn test_new_product_optional_fields_default() {
        let draft: NewProduct =
            serde_json::from_str(r#"{"name": "Tea", "category": "Drinks"}"#).unwrap();
        assert_eq!(draft.description, "");
        assert_eq!(draft.image_url, "");
    }

    #[test]
    fn test_product_json_shape() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["average_rating"], serde_json::json!(4.5));
        assert_eq!(json["version"], serde_json::json!(3));
    }
}
