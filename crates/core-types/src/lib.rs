//! # Finboard Core Types
//!
//! The foundational data structures shared by every other crate: the dynamic
//! `Value` and `Record` model for dashboard datasets, and the vocabulary used to
//! describe a query over them (filter groups, selections, sort specs, pages).
//!
//! This is a Layer 0 crate. It has no knowledge of configuration, execution, or
//! rendering.

pub mod enums;
pub mod error;
pub mod query;
pub mod record;
pub mod value;

// Re-export the core types to provide a clean public API.
pub use enums::{Collation, SortOrder, TimeRange};
pub use error::CoreError;
pub use query::{FilterGroup, FilterOption, FilterSelection, Page, SortKey, SortSpec};
pub use record::{Dataset, Record};
pub use value::Value;
