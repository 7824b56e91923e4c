//! # Validation Module
//!
//! Field validation for products and reviews.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON decoding (external API layer)                           │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Presence and length checks                                        │
//! │  └── Rating range 1..=5                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::validation::validate_rating;
//!
//! assert!(validate_rating(5).is_ok());
//! assert!(validate_rating(6).is_err());
//! ```

use crate::error::{ValidationError, ValidationErrors, ValidationResult};
use crate::types::{NewProduct, NewReview, Product, Review};
use crate::{MAX_RATING, MIN_RATING};

/// Result type for a single field check.
pub type FieldResult = Result<(), ValidationError>;

pub const MAX_PRODUCT_NAME_BYTES: usize = 100;
pub const MAX_DESCRIPTION_BYTES: usize = 1000;
pub const MAX_CATEGORY_BYTES: usize = 50;
pub const MAX_IMAGE_URL_BYTES: usize = 500;
pub const MAX_AUTHOR_BYTES: usize = 25;
pub const MAX_REVIEW_TEXT_BYTES: usize = 1000;
pub const MAX_SEARCH_TERM_BYTES: usize = 100;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a text field that must be present.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most `max` bytes
pub fn validate_required_text(field: &str, value: &str, max: usize) -> FieldResult {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    validate_optional_text(field, value, max)
}

/// Validates a text field that may be empty.
pub fn validate_optional_text(field: &str, value: &str, max: usize) -> FieldResult {
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a star rating.
///
/// ## Rules
/// - Must be within MIN_RATING..=MAX_RATING (1..=5)
pub fn validate_rating(rating: i64) -> FieldResult {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: MIN_RATING,
            max: MAX_RATING,
        });
    }

    Ok(())
}

/// Validates a reference to another row.
pub fn validate_reference(field: &str, id: i64) -> FieldResult {
    if id < 1 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a helpful-vote count (absent is fine).
pub fn validate_helpful_count(count: Option<i64>) -> FieldResult {
    match count {
        Some(c) if c < 0 => Err(ValidationError::OutOfRange {
            field: "helpful_count".to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

/// Validates a free-text search term.
///
/// ## Rules
/// - Can be empty (no filter on the column)
/// - Maximum 100 bytes
pub fn validate_search_term(column: &str, term: &str) -> FieldResult {
    if term.trim().len() > MAX_SEARCH_TERM_BYTES {
        return Err(ValidationError::TooLong {
            field: column.to_string(),
            max: MAX_SEARCH_TERM_BYTES,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

fn check_product_fields(
    errors: &mut ValidationErrors,
    name: &str,
    description: &str,
    category: &str,
    image_url: &str,
) {
    errors.check(validate_required_text("name", name, MAX_PRODUCT_NAME_BYTES));
    errors.check(validate_optional_text(
        "description",
        description,
        MAX_DESCRIPTION_BYTES,
    ));
    errors.check(validate_required_text("category", category, MAX_CATEGORY_BYTES));
    errors.check(validate_optional_text("image_url", image_url, MAX_IMAGE_URL_BYTES));
}

/// Validates a product before insert.
pub fn validate_new_product(draft: &NewProduct) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    check_product_fields(
        &mut errors,
        &draft.name,
        &draft.description,
        &draft.category,
        &draft.image_url,
    );
    errors.into_result()
}

/// Validates a product before update (after a patch was merged).
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    check_product_fields(
        &mut errors,
        &product.name,
        &product.description,
        &product.category,
        &product.image_url,
    );
    errors.into_result()
}

fn check_review_fields(errors: &mut ValidationErrors, author: &str, rating: i64, text: &str) {
    errors.check(validate_required_text("author", author, MAX_AUTHOR_BYTES));
    errors.check(validate_rating(rating));
    errors.check(validate_required_text(
        "review_text",
        text,
        MAX_REVIEW_TEXT_BYTES,
    ));
}

/// Validates a review before insert.
pub fn validate_new_review(draft: &NewReview) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_reference("product_id", draft.product_id));
    check_review_fields(&mut errors, &draft.author, draft.rating, &draft.review_text);
    errors.into_result()
}

/// Validates a review before update.
pub fn validate_review(review: &Review) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    check_review_fields(
        &mut errors,
        &review.author,
        review.rating,
        &review.review_text,
    );
    errors.check(validate_helpful_count(review.helpful_count));
    errors.into_result()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn review_draft() -> NewReview {
        NewReview {
            product_id: 1,
            author: "ana".to_string(),
            rating: 4,
            review_text: "Solid grinder".to_string(),
        }
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("name", "Tea", 10).is_ok());
        assert!(validate_required_text("name", "", 10).is_err());
        assert!(validate_required_text("name", "   ", 10).is_err());
        assert!(validate_required_text("name", &"a".repeat(11), 10).is_err());
    }

    #[test]
    fn test_validate_rating_bounds() {
        for ok in 1..=5 {
            assert!(validate_rating(ok).is_ok());
        }
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-3).is_err());
    }

    #[test]
    fn test_validate_new_review_collects_fields() {
        let draft = NewReview {
            product_id: 0,
            author: String::new(),
            rating: 9,
            review_text: "fine".to_string(),
        };
        let errors = validate_new_review(&draft).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.get("product_id").is_some());
        assert!(errors.get("author").is_some());
        assert!(errors.get("rating").is_some());
        assert!(errors.get("review_text").is_none());
    }

    #[test]
    fn test_validate_new_review_ok() {
        assert!(validate_new_review(&review_draft()).is_ok());
    }

    #[test]
    fn test_author_length_limit() {
        let mut draft = review_draft();
        draft.author = "x".repeat(MAX_AUTHOR_BYTES + 1);
        let errors = validate_new_review(&draft).unwrap_err();
        assert!(matches!(
            errors.get("author"),
            Some(ValidationError::TooLong { max: 25, .. })
        ));
    }

    #[test]
    fn test_validate_new_product() {
        let draft = NewProduct {
            name: "Kettle".to_string(),
            description: String::new(),
            category: "Kitchen".to_string(),
            image_url: String::new(),
        };
        assert!(validate_new_product(&draft).is_ok());

        let missing = NewProduct::default();
        let errors = validate_new_product(&missing).unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("category").is_some());
    }

    #[test]
    fn test_helpful_count() {
        assert!(validate_helpful_count(None).is_ok());
        assert!(validate_helpful_count(Some(0)).is_ok());
        assert!(validate_helpful_count(Some(-1)).is_err());
    }

    #[test]
    fn test_search_term_length() {
        assert!(validate_search_term("name", "").is_ok());
        assert!(validate_search_term("name", &"q".repeat(101)).is_err());
    }
}
