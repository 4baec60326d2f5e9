//! I/O boundary traits for testability
//!
//! These traits abstract the host bookmark store and the progress/notification
//! output, allowing services to be tested with mock implementations.

use std::io;

use tracing::{info, warn};

use crate::domain::{Node, NodeId};

/// Host bookmark tree.
///
/// Implementations renumber siblings after every move so that indices stay
/// contiguous from 0.
pub trait BookmarkStore: Send + Sync {
    /// Children of a folder, ordered by index.
    fn get_children(&self, folder_id: &NodeId) -> io::Result<Vec<Node>>;

    /// Move a node to `index` within its current parent.
    ///
    /// The index is interpreted before the node leaves its current slot.
    fn move_node(&self, node_id: &NodeId, index: usize) -> io::Result<()>;

    /// Fetch a single node. Unknown ids fail with `io::ErrorKind::NotFound`.
    fn get_node(&self, id: &NodeId) -> io::Result<Node>;
}

/// Per-folder progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderProgress {
    pub folder_id: NodeId,
    pub folder_name: String,
    pub bookmark_count: usize,
    pub folder_count: usize,
    pub depth: usize,
    /// Moves planned for this folder
    pub moves: usize,
}

/// Terminal event of a sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    pub success: bool,
    pub detail: String,
}

/// Receives progress and completion events of a sort run.
pub trait SortObserver: Send + Sync {
    fn on_folder(&self, progress: &FolderProgress);

    /// Called exactly once per entry-point call.
    fn on_complete(&self, outcome: &SortOutcome);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Observer that reports through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SortObserver for TracingObserver {
    fn on_folder(&self, progress: &FolderProgress) {
        info!(
            folder = %progress.folder_name,
            bookmarks = progress.bookmark_count,
            folders = progress.folder_count,
            depth = progress.depth,
            moves = progress.moves,
            "{}sorting folder",
            "  ".repeat(progress.depth)
        );
    }

    fn on_complete(&self, outcome: &SortOutcome) {
        if outcome.success {
            info!("sort finished: {}", outcome.detail);
        } else {
            warn!("sort failed: {}", outcome.detail);
        }
    }
}
