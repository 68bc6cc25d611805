//! # Finboard Query Engine
//!
//! The in-memory query pipeline behind every searchable dashboard view: company
//! search, research reports, company news, market indices, and the industry data grid.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It depends only on `core-types`.
//!   Datasets are always passed in by the caller; nothing is cached between calls.
//! - **Fixed pipeline:** search → filter → sort → paginate. Filtering first bounds
//!   the sort's input; sorting before slicing keeps every page consistent.
//! - **No failure modes:** empty collections, out-of-range pages, unknown filter ids
//!   and missing sort fields all degrade to well-defined results. Malformed input is
//!   rejected earlier, when a `Dataset` or `Page` is constructed.
//!
//! ## Public API
//!
//! - `QueryEngine`: runs the composite `query` and exposes each stage on its own.
//! - `Query` / `QueryResult`: the request and the page of results that comes back.
//! - `page_window` and `facet_counts`: helpers for pagination strips and option badges.

pub mod dates;
pub mod engine;
pub mod facets;
pub mod filter;
pub mod paginate;
pub mod search;
pub mod sort;

#[cfg(test)]
mod tests;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{Query, QueryEngine, QueryResult};
pub use facets::FacetCount;
pub use filter::DateFilter;
pub use paginate::{PageItem, PageSlice, page_window};
pub use search::{SearchQuery, SearchScope};
