//! # Product Store
//!
//! Products as an [`Entity`]: table layout, safelist and binders.
//!
//! ## FTS5 Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Product Search Works                             │
//! │                                                                         │
//! │  SearchTerms { name: "cold brew" }                                     │
//! │       │                                                                 │
//! │       ▼  phrase_query("name", "cold brew")                             │
//! │  {name} : "cold" AND {name} : "brew"                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────┐                       │
//! │  │ products_fts (name, description, category)  │                       │
//! │  │                                             │                       │
//! │  │ Cold Brew Concentrate | ...  | Coffee       │ ← MATCH               │
//! │  │ Brew Kettle           | cold | Kitchen      │   (word not in name)  │
//! │  └─────────────────────────────────────────────┘                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE id IN (SELECT rowid FROM products_fts WHERE ... MATCH ?)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use catalog_core::validation::{validate_new_product, validate_product};
use catalog_core::{NewProduct, Product, ProductPatch, SortSafelist, ValidationResult};

use super::store::{Entity, EntityQuery, EntityStore};

/// Store for products.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.products();
///
/// let product = store.insert(&NewProduct { .. }).await?;
/// let filters = store.filters(&FilterParams::new(1, 20, "-average_rating"))?;
/// let (page, meta) = store
///     .get_all(&filters, &SearchTerms::new().with("category", "coffee"))
///     .await?;
/// ```
pub type ProductStore = EntityStore<Product>;

/// Sort keys accepted for product lists.
pub const PRODUCT_SORT_SAFELIST: SortSafelist = SortSafelist::new(&[
    "id",
    "name",
    "category",
    "average_rating",
    "created_at",
    "updated_at",
    "-id",
    "-name",
    "-category",
    "-average_rating",
    "-created_at",
    "-updated_at",
]);

impl Entity for Product {
    type Draft = NewProduct;
    type Patch = ProductPatch;

    const NAME: &'static str = "Product";
    const TABLE: &'static str = "products";
    const FTS_TABLE: &'static str = "products_fts";
    const INSERT_COLUMNS: &'static [&'static str] = &["name", "description", "category", "image_url"];
    const UPDATE_COLUMNS: &'static [&'static str] = &["name", "description", "category", "image_url"];
    const SEARCH_COLUMNS: &'static [&'static str] = &["name", "description", "category"];
    const SORT_SAFELIST: SortSafelist = PRODUCT_SORT_SAFELIST;

    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn validate_draft(draft: &NewProduct) -> ValidationResult<()> {
        validate_new_product(draft)
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_product(self)
    }

    fn apply_patch(&mut self, patch: ProductPatch) {
        patch.apply(self);
    }

    fn patch_is_empty(patch: &ProductPatch) -> bool {
        patch.is_empty()
    }

    fn bind_draft<'q>(draft: &'q NewProduct, query: EntityQuery<'q, Self>) -> EntityQuery<'q, Self> {
        query
            .bind(draft.name.as_str())
            .bind(draft.description.as_str())
            .bind(draft.category.as_str())
            .bind(draft.image_url.as_str())
    }

    fn bind_changes<'q>(&'q self, query: EntityQuery<'q, Self>) -> EntityQuery<'q, Self> {
        query
            .bind(self.name.as_str())
            .bind(self.description.as_str())
            .bind(self.category.as_str())
            .bind(self.image_url.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use catalog_core::{AverageRating, FilterParams, SearchTerms};

    async fn store() -> ProductStore {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    fn draft(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{} for everyday use", name),
            category: category.to_string(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let store = store().await;
        let inserted = store.insert(&draft("French Press", "Kitchen")).await.unwrap();

        assert!(inserted.id >= 1);
        assert_eq!(inserted.version, 1);
        assert_eq!(inserted.average_rating, AverageRating::zero());

        let fetched = store.get(inserted.id).await.unwrap();
        assert_eq!(fetched, inserted);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_draft() {
        let store = store().await;
        let err = store.insert(&draft("", "Kitchen")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_and_non_positive_ids() {
        let store = store().await;
        for id in [0, -1, 999] {
            assert!(store.get(id).await.unwrap_err().is_not_found());
        }
    }

    #[tokio::test]
    async fn test_update_bumps_version() {
        let store = store().await;
        let mut product = store.insert(&draft("Grinder", "Kitchen")).await.unwrap();

        product.name = "Burr Grinder".to_string();
        let updated = store.update(&product).await.unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.name, "Burr Grinder");
        assert_eq!(updated.created_at, product.created_at);
        assert!(updated.updated_at >= product.updated_at);
    }

    #[tokio::test]
    async fn test_stale_update_conflicts_and_leaves_row() {
        let store = store().await;
        let original = store.insert(&draft("Scale", "Kitchen")).await.unwrap();

        let mut first = original.clone();
        first.name = "Coffee Scale".to_string();
        store.update(&first).await.unwrap();

        let mut stale = original.clone();
        stale.name = "Kitchen Scale".to_string();
        let err = store.update(&stale).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EditConflict);

        let current = store.get(original.id).await.unwrap();
        assert_eq!(current.name, "Coffee Scale");
        assert_eq!(current.version, 2);
    }

    #[tokio::test]
    async fn test_update_deleted_row_not_found() {
        let store = store().await;
        let product = store.insert(&draft("Filter", "Kitchen")).await.unwrap();
        store.delete(product.id).await.unwrap();

        assert!(store.update(&product).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_patch_merges_present_fields() {
        let store = store().await;
        let product = store.insert(&draft("Mug", "Kitchen")).await.unwrap();

        let patch = ProductPatch {
            category: Some("Tableware".to_string()),
            ..ProductPatch::default()
        };
        let patched = store.patch(product.id, patch, Some(1)).await.unwrap();

        assert_eq!(patched.name, "Mug");
        assert_eq!(patched.category, "Tableware");
        assert_eq!(patched.version, 2);

        let err = store
            .patch(product.id, ProductPatch::default(), Some(1))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_empty_patch_writes_nothing() {
        let store = store().await;
        let product = store.insert(&draft("Mug", "Kitchen")).await.unwrap();

        let same = store
            .patch(product.id, ProductPatch::default(), Some(1))
            .await
            .unwrap();
        assert_eq!(same, product);
        assert_eq!(store.get(product.id).await.unwrap().version, 1);

        let err = store
            .patch(product.id + 1, ProductPatch::default(), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = store().await;
        let product = store.insert(&draft("Tray", "Kitchen")).await.unwrap();

        store.delete(product.id).await.unwrap();
        assert!(store.delete(product.id).await.unwrap_err().is_not_found());
        assert!(store.get(product.id).await.unwrap_err().is_not_found());
        assert!(store.delete(0).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_exists() {
        let store = store().await;
        let product = store.insert(&draft("Jar", "Pantry")).await.unwrap();

        assert!(store.exists(product.id).await.unwrap());
        assert!(!store.exists(product.id + 1).await.unwrap());
        assert!(!store.exists(0).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_second_page_of_twenty_five() {
        let store = store().await;
        for i in 1..=25 {
            store
                .insert(&draft(&format!("Item {:02}", i), "Pantry"))
                .await
                .unwrap();
        }

        let filters = store.filters(&FilterParams::new(2, 10, "id")).unwrap();
        let (page, meta) = store.get_all(&filters, &SearchTerms::new()).await.unwrap();

        assert_eq!(page.len(), 10);
        assert_eq!(page[0].name, "Item 11");
        assert_eq!(
            (meta.current_page, meta.page_size, meta.first_page, meta.last_page, meta.total_records),
            (2, 10, 1, 3, 25)
        );
    }

    #[tokio::test]
    async fn test_get_all_search_and_sort() {
        let store = store().await;
        store.insert(&draft("Cold Brew Concentrate", "Coffee")).await.unwrap();
        store.insert(&draft("Cold Brew Bottle", "Kitchen")).await.unwrap();
        store.insert(&draft("Green Tea", "Tea")).await.unwrap();

        let filters = store.filters(&FilterParams::new(1, 10, "-name")).unwrap();
        let terms = SearchTerms::new().with("name", "cold brew");
        let (page, meta) = store.get_all(&filters, &terms).await.unwrap();

        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cold Brew Concentrate", "Cold Brew Bottle"]);
        assert_eq!(meta.total_records, 2);

        let terms = SearchTerms::new()
            .with("name", "cold brew")
            .with("category", "coffee");
        let (page, _) = store.get_all(&filters, &terms).await.unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_get_all_empty_terms_return_everything() {
        let store = store().await;
        for name in ["Kettle", "Teapot", "Whisk"] {
            store.insert(&draft(name, "Kitchen")).await.unwrap();
        }

        let filters = store.filters(&FilterParams::default()).unwrap();
        let terms = SearchTerms::new().with("name", "   ").with("description", "");
        let (page, meta) = store.get_all(&filters, &terms).await.unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(meta.last_page, 1);
    }

    #[tokio::test]
    async fn test_get_all_no_match_is_empty_not_error() {
        let store = store().await;
        store.insert(&draft("Kettle", "Kitchen")).await.unwrap();

        let filters = store.filters(&FilterParams::default()).unwrap();
        let terms = SearchTerms::new().with("name", "saucepan");
        let (page, meta) = store.get_all(&filters, &terms).await.unwrap();

        assert!(page.is_empty());
        assert_eq!(meta, catalog_core::Metadata::default());
    }

    #[tokio::test]
    async fn test_get_all_metacharacters_are_inert() {
        let store = store().await;
        store.insert(&draft("Kettle", "Kitchen")).await.unwrap();
        store.insert(&draft("Teapot", "Kitchen")).await.unwrap();

        let filters = store.filters(&FilterParams::default()).unwrap();
        for term in [
            r#"kettle" OR "teapot"#,
            "kettle OR teapot",
            "'; DROP TABLE products; --",
            "NEAR(kettle teapot)",
            "name:teapot",
            "kettle*",
            "*",
        ] {
            let terms = SearchTerms::new().with("name", term);
            let (page, _) = store.get_all(&filters, &terms).await.unwrap();
            assert!(page.len() <= 1, "{term} widened the match");
        }

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_all_punctuation_term_matches_nothing() {
        let store = store().await;
        store.insert(&draft("Kettle", "Kitchen")).await.unwrap();
        store.insert(&draft("Teapot", "Kitchen")).await.unwrap();

        let filters = store.filters(&FilterParams::default()).unwrap();
        for term in ["***", "--", " () ", r#"""#] {
            let terms = SearchTerms::new().with("name", term);
            let (page, meta) = store.get_all(&filters, &terms).await.unwrap();
            assert!(page.is_empty(), "{term:?} matched {} rows", page.len());
            assert_eq!(meta, catalog_core::Metadata::default());
        }

        // Blank next to a punctuation-only term still matches nothing.
        let terms = SearchTerms::new().with("name", " ").with("category", "!!");
        let (page, _) = store.get_all(&filters, &terms).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_rejects_unknown_search_column() {
        let store = store().await;
        let filters = store.filters(&FilterParams::default()).unwrap();
        let terms = SearchTerms::new().with("image_url", "png");

        let err = store.get_all(&filters, &terms).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_filters_use_product_safelist() {
        let store = store().await;
        assert!(store.filters(&FilterParams::new(1, 10, "-average_rating")).is_ok());

        let err = store
            .filters(&FilterParams::new(1, 10, "image_url"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
