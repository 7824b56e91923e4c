//! # Repository Module
//!
//! Store implementations for the catalog.
//!
//! ## Store Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Store, Many Entities                             │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.reviews().list_for_product(7, &filters, &terms)            │
//! │       ▼                                                                 │
//! │  EntityStore<Review>     (store.rs: SQL shape, timeout, errors)        │
//! │       │                                                                 │
//! │       │  Review: Entity  (review.rs: table, columns, binders)          │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Stores
//!
//! - [`ProductStore`](product::ProductStore) - Product CRUD and search
//! - [`ReviewStore`](review::ReviewStore) - Review CRUD, search and
//!   per-product listing

pub mod product;
pub mod review;
pub mod store;
