//! bmsort: sort a bookmark tree in place.
//!
//! Within every folder, bookmarks come first, ordered by visual length of their
//! title; subfolders follow, ordered by name. The sort recurses into every
//! subfolder.
//!
//! Layers:
//! - [`domain`]: node model, visual-length metric, collation, move planning
//! - [`application`]: the recursive sort service
//! - [`infrastructure`]: host store trait and implementations, DI container
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
