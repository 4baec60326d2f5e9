//! Domain layer: entities and sorting rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod collation;
pub mod entities;
pub mod error;
pub mod metric;
pub mod ordering;

pub use collation::{
    CaseInsensitiveCollator, CodePointCollator, Collation, Collator, LocaleCollator, DEFAULT_LOCALE,
};
pub use entities::*;
pub use error::DomainError;
pub use metric::visual_width;
pub use ordering::{classify, plan_folder, plan_moves, plan_order, replay_moves};
