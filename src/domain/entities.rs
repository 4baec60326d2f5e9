//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a node in the host tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a node is. The only bookmark/folder discriminant in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Bookmark { url: String },
    Folder,
}

/// One entry of the bookmark tree as reported by the host store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// `None` only for the virtual tree root
    pub parent_id: Option<NodeId>,
    /// Current 0-based position among siblings
    pub index: usize,
    /// Display text, may be empty
    pub title: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn bookmark(
        id: impl Into<NodeId>,
        parent_id: impl Into<NodeId>,
        index: usize,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            index,
            title: title.into(),
            kind: NodeKind::Bookmark { url: url.into() },
        }
    }

    pub fn folder(
        id: impl Into<NodeId>,
        parent_id: impl Into<NodeId>,
        index: usize,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: Some(parent_id.into()),
            index,
            title: title.into(),
            kind: NodeKind::Folder,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder)
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Bookmark { url } => Some(url),
            NodeKind::Folder => None,
        }
    }
}

/// A bookmark annotated with its sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredBookmark {
    pub id: NodeId,
    /// Trimmed title, or trimmed url when the title is blank
    pub normalized_title: String,
    pub visual_width: usize,
}

/// A folder annotated with its sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredFolder {
    pub id: NodeId,
    /// Trimmed title, empty when the title is blank
    pub normalized_title: String,
}

/// One host move command: place `node_id` at `index` within its current parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub node_id: NodeId,
    pub index: usize,
}

/// Everything computed for one folder before any move is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPlan {
    /// Bookmarks in target order
    pub bookmarks: Vec<ScoredBookmark>,
    /// Folders in target order
    pub folders: Vec<ScoredFolder>,
    /// Moves in strictly increasing index order
    pub moves: Vec<Move>,
}

impl FolderPlan {
    /// Full target order: bookmarks first, then folders.
    pub fn target_order(&self) -> Vec<NodeId> {
        self.bookmarks
            .iter()
            .map(|b| b.id.clone())
            .chain(self.folders.iter().map(|f| f.id.clone()))
            .collect()
    }

    pub fn is_sorted(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Falls back to the input unchanged when a variable cannot be resolved.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
