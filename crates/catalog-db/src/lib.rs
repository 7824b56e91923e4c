//! # catalog-db: Database Layer for the Catalog Store
//!
//! Record access for products and their reviews, on SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Data Flow                                │
//! │                                                                         │
//! │  JSON API handler (list reviews of product 7)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    catalog-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │    Stores     │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (store.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductStore  │    │ 001_init.sql │  │   │
//! │  │   │ DbConfig      │◄───│ ReviewStore   │    │ 002_fts.sql  │  │   │
//! │  │   │ from_env()    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             SQLite Database (WAL, foreign keys on)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Configuration from environment variables
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and the public error shape
//! - [`repository`] - The generic entity store and its instantiations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use catalog_core::{FilterParams, SearchTerms};
//! use catalog_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let reviews = db.reviews();
//! let filters = reviews.filters(&FilterParams::new(1, 20, "-rating"))?;
//! let (page, meta) = reviews
//!     .list_for_product(7, &filters, &SearchTerms::new().with("review_text", "leaks"))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ConfigError;
pub use error::{DbError, DbResult, ErrorKind, PublicError};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductStore;
pub use repository::review::ReviewStore;
pub use repository::store::{Entity, EntityStore};
