//! # Finboard Live Search
//!
//! Interactive search on top of `query-engine`: the pieces a search box needs
//! between keystrokes and a rendered result list.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Service:** depends on `query-engine` for evaluation and adds only
//!   timing and memory. The engine itself stays pure and synchronous.
//! - **Latest wins:** a newer submission always supersedes an older one, and a
//!   superseded query's result is never published.
//!
//! ## Public API
//!
//! - `DebouncedSearch`: a background worker that runs a query once input settles.
//! - `SearchHistory`: the most recent distinct search terms.
//! - `SearchSession`: history plus a cache of the last query and its result.

pub mod debounce;
pub mod error;
pub mod history;
pub mod session;

// Re-export the key components to create a clean, public-facing API.
pub use debounce::{DebouncedSearch, SearchState};
pub use error::LiveSearchError;
pub use history::SearchHistory;
pub use session::SearchSession;
