//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (BookmarkStore, SortObserver)
//! but are themselves concrete structs, not traits.

mod sort;

pub use sort::{FolderReport, SortOptions, SortReport, SortService, DEFAULT_MAX_DEPTH};
