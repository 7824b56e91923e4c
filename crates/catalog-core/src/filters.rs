//! # Query Filter
//!
//! Turns raw, untrusted list parameters into a safe query plan.
//!
//! ## From Parameters to SQL
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    List Request Lifecycle                               │
//! │                                                                         │
//! │  ?page=2&page_size=10&sort=-rating&author=ana                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FilterParams { page: 2, page_size: 10, sort: "-rating" }   (raw)      │
//! │       │                                                                 │
//! │       ▼  Filters::new(&params, &safelist)                              │
//! │       │    ├── page in 1..=10_000_000?                                 │
//! │       │    ├── page_size in 1..=100?                                   │
//! │       │    └── "-rating" in safelist?                                  │
//! │       ▼                                                                 │
//! │  Filters { column: "rating", direction: Desc, limit: 10, offset: 10 }  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ORDER BY rating DESC, id ASC LIMIT ? OFFSET ?                         │
//! │            ▲      ▲                  ▲        ▲                        │
//! │            │      │                  └── bound parameters              │
//! │            └──────┴── text taken from the safelist entry itself        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sort keys can't be bound parameters, so the safelist is the only thing
//! standing between a user-supplied sort key and the query text. `Filters`
//! only ever holds `&'static str` slices of safelist entries.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, ValidationErrors, ValidationResult};
use crate::validation::validate_search_term;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};

// =============================================================================
// Sort Direction
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

// =============================================================================
// Sort Safelist
// =============================================================================

/// Server-defined set of sort keys a caller may request.
///
/// Each column is usually listed twice, bare for ascending and with a
/// leading `-` for descending:
/// ```rust
/// use catalog_core::filters::SortSafelist;
///
/// const REVIEW_SORTS: SortSafelist =
///     SortSafelist::new(&["id", "author", "-id", "-author"]);
/// assert!(REVIEW_SORTS.contains("-author"));
/// assert!(!REVIEW_SORTS.contains("author; DROP TABLE reviews"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SortSafelist(&'static [&'static str]);

impl SortSafelist {
    pub const fn new(keys: &'static [&'static str]) -> Self {
        SortSafelist(keys)
    }

    pub fn keys(&self) -> &'static [&'static str] {
        self.0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the safelist's own copy of `key`.
    fn lookup(&self, key: &str) -> Option<&'static str> {
        self.0.iter().copied().find(|allowed| *allowed == key)
    }
}

// =============================================================================
// Filter Parameters (raw)
// =============================================================================

/// Raw list parameters as decoded from a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct FilterParams {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: "id".to_string(),
        }
    }
}

impl FilterParams {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>) -> Self {
        FilterParams {
            page,
            page_size,
            sort: sort.into(),
        }
    }
}

// =============================================================================
// Filters (validated)
// =============================================================================

/// Validated pagination and sort plan.
///
/// Only constructible through [`Filters::new`], so holding one proves the
/// page bounds and the sort key were checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filters {
    page: i64,
    page_size: i64,
    sort_column: &'static str,
    sort_direction: SortDirection,
}

impl Filters {
    /// Validates `params` against `safelist`.
    ///
    /// ## Errors
    /// Every failing field is reported:
    /// - `page` outside 1..=10_000_000
    /// - `page_size` outside 1..=100
    /// - `sort` not in the safelist
    pub fn new(params: &FilterParams, safelist: &SortSafelist) -> ValidationResult<Filters> {
        let mut errors = ValidationErrors::new();

        if params.page < 1 || params.page > MAX_PAGE {
            errors.push(ValidationError::OutOfRange {
                field: "page".to_string(),
                min: 1,
                max: MAX_PAGE,
            });
        }

        if params.page_size < 1 || params.page_size > MAX_PAGE_SIZE {
            errors.push(ValidationError::OutOfRange {
                field: "page_size".to_string(),
                min: 1,
                max: MAX_PAGE_SIZE,
            });
        }

        let key = safelist.lookup(&params.sort);
        if key.is_none() {
            errors.push(ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: safelist.keys().iter().map(|k| k.to_string()).collect(),
            });
        }

        match key {
            Some(key) if errors.is_empty() => {
                let (sort_column, sort_direction) = match key.strip_prefix('-') {
                    Some(column) => (column, SortDirection::Desc),
                    None => (key, SortDirection::Asc),
                };
                Ok(Filters {
                    page: params.page,
                    page_size: params.page_size,
                    sort_column,
                    sort_direction,
                })
            }
            _ => Err(errors),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Bare column name, taken from the safelist.
    pub fn sort_column(&self) -> &'static str {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

// =============================================================================
// Search Terms
// =============================================================================

/// Free-text term per searchable column.
///
/// A column with no term (or an empty one) is not filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<(String, String)>);

impl SearchTerms {
    pub fn new() -> Self {
        SearchTerms(Vec::new())
    }

    /// Sets the term for `column`, replacing any earlier one.
    pub fn with(mut self, column: impl Into<String>, term: impl Into<String>) -> Self {
        self.set(column, term);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, term: impl Into<String>) {
        let column = column.into();
        let term = term.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = term,
            None => self.0.push((column, term)),
        }
    }

    /// The trimmed term for `column`, or `""`.
    pub fn get(&self, column: &str) -> &str {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, t)| t.trim())
            .unwrap_or("")
    }

    /// Checks that every named column is searchable and every term is sane.
    pub fn validate(&self, searchable: &[&'static str]) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        for (column, term) in &self.0 {
            if !searchable.contains(&column.as_str()) {
                errors.push(ValidationError::NotAllowed {
                    field: "search".to_string(),
                    allowed: searchable.iter().map(|c| c.to_string()).collect(),
                });
                continue;
            }
            errors.check(validate_search_term(column, term));
        }
        errors.into_result()
    }
}

/// Compiles a user term into an FTS5 query scoped to `column`.
///
/// Works like a plain-text query: every word must appear, words are matched
/// as quoted phrases so query operators in the input are inert. Words without
/// any alphanumeric character are dropped. Returns `""` when nothing is left.
///
/// ```rust
/// use catalog_core::filters::phrase_query;
///
/// assert_eq!(phrase_query("author", "ana"), r#"{author} : "ana""#);
/// assert_eq!(
///     phrase_query("name", "cold brew"),
///     r#"{name} : "cold" AND {name} : "brew""#
/// );
/// assert_eq!(phrase_query("name", "  "), "");
/// ```
pub fn phrase_query(column: &str, term: &str) -> String {
    term.split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .map(|word| format!("{{{}}} : \"{}\"", column, word.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" AND ")
}

// =============================================================================
// Unit Tests
// =============================================================================
