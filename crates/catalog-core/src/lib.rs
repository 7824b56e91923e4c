//! # catalog-core: Pure Logic for the Catalog Store
//!
//! Entity types, field validation, the query filter and the pagination
//! calculator, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Store Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              JSON API (external: routing, envelopes)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ catalog-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  filters  │  │ pagination │  │ validation│  │   │
//! │  │   │  Product  │  │  Filters  │  │  Metadata  │  │   rules   │  │   │
//! │  │   │  Review   │  │ Safelist  │  │            │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  catalog-db (Database Layer)                    │   │
//! │  │           SQLite queries, migrations, entity store              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Review, their drafts and patches
//! - [`rating`] - Fixed-point average rating
//! - [`filters`] - Query Filter: page bounds, sort safelist, search terms
//! - [`pagination`] - Pagination Calculator
//! - [`validation`] - Field rules
//! - [`error`] - Validation error types
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::filters::{FilterParams, Filters, SortSafelist};
//! use catalog_core::pagination::calculate_metadata;
//!
//! const SORTS: SortSafelist = SortSafelist::new(&["id", "-id"]);
//!
//! let filters = Filters::new(&FilterParams::new(2, 10, "-id"), &SORTS).unwrap();
//! assert_eq!((filters.limit(), filters.offset()), (10, 10));
//!
//! let meta = calculate_metadata(25, filters.page(), filters.page_size());
//! assert_eq!(meta.last_page, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filters;
pub mod pagination;
pub mod rating;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use filters::{FilterParams, Filters, SearchTerms, SortDirection, SortSafelist};
pub use pagination::{calculate_metadata, Metadata};
pub use rating::AverageRating;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Highest page number a list request may ask for.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page a list request may ask for.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size when the caller doesn't specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Lowest star rating.
pub const MIN_RATING: i64 = 1;

/// Highest star rating.
pub const MAX_RATING: i64 = 5;
