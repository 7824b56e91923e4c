//! # Review Store
//!
//! Reviews as an [`Entity`], plus the product-scoped listing.
//!
//! Every review belongs to a product. Inserting checks the product first;
//! deleting the product takes its reviews with it.

use catalog_core::validation::{validate_new_review, validate_review};
use catalog_core::{
    Filters, Metadata, NewReview, Review, ReviewPatch, SearchTerms, SortSafelist,
    ValidationResult,
};

use super::store::{Entity, EntityQuery, EntityStore, ParentRef};
use crate::error::DbResult;

/// Store for reviews.
pub type ReviewStore = EntityStore<Review>;

/// Sort keys accepted for review lists.
pub const REVIEW_SORT_SAFELIST: SortSafelist = SortSafelist::new(&[
    "id",
    "author",
    "rating",
    "helpful_count",
    "created_at",
    "-id",
    "-author",
    "-rating",
    "-helpful_count",
    "-created_at",
]);

const PRODUCT_PARENT: ParentRef = ParentRef {
    entity: "Product",
    table: "products",
    column: "product_id",
};

impl Entity for Review {
    type Draft = NewReview;
    type Patch = ReviewPatch;

    const NAME: &'static str = "Review";
    const TABLE: &'static str = "reviews";
    const FTS_TABLE: &'static str = "reviews_fts";
    const INSERT_COLUMNS: &'static [&'static str] = &["product_id", "author", "rating", "review_text"];
    const UPDATE_COLUMNS: &'static [&'static str] = &["author", "rating", "review_text", "helpful_count"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["author", "review_text"];
    const SORT_SAFELIST: SortSafelist = REVIEW_SORT_SAFELIST;
    const PARENT: Option<ParentRef> = Some(PRODUCT_PARENT);

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn parent_id(draft: &NewReview) -> Option<i64> {
        Some(draft.product_id)
    }

    fn validate_draft(draft: &NewReview) -> ValidationResult<()> {
        validate_new_review(draft)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_review(self)
    }

    fn apply_patch(&mut self, patch: ReviewPatch) {
        patch.apply(self);
    }

    fn patch_is_empty(patch: &ReviewPatch) -> bool {
        patch.is_empty()
    }

    fn bind_draft<'q>(draft: &'q NewReview, query: EntityQuery<'q, Self>) -> EntityQuery<'q, Self> {
        query
            .bind(draft.product_id)
            .bind(draft.author.as_str())
            .bind(draft.rating)
            .bind(draft.review_text.as_str())
    }

    fn bind_changes<'q>(&'q self, query: EntityQuery<'q, Self>) -> EntityQuery<'q, Self> {
        query
            .bind(self.author.as_str())
            .bind(self.rating)
            .bind(self.review_text.as_str())
            .bind(self.helpful_count)
    }
}

impl EntityStore<Review> {
    /// Lists one product's reviews.
    ///
    /// ## Errors
    /// - `NotFound` - the product doesn't exist (an existing product with no
    ///   reviews is an empty page, not an error)
    pub async fn list_for_product(
        &self,
        product_id: i64,
        filters: &Filters,
        terms: &SearchTerms,
    ) -> DbResult<(Vec<Review>, Metadata)> {
        self.list(
            "list_for_product",
            filters,
            terms,
            Some((PRODUCT_PARENT, product_id)),
        )
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
