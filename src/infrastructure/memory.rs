//! In-memory bookmark tree with host renumbering semantics.
//!
//! Backs the Chrome file store and the tests. A virtual root (id `"0"`) holds
//! the top-level folders, mirroring the browser API.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};
use tracing::trace;

use crate::domain::{Node, NodeId, NodeKind};
use crate::infrastructure::traits::BookmarkStore;

/// Id of the virtual root folder.
pub const ROOT_ID: &str = "0";

/// Stored state of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Child ids in index order (always empty for bookmarks)
    pub children: Vec<NodeId>,
    /// Host fields carried through untouched (dates, guids, meta info)
    pub extra: Map<String, Value>,
}

#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<NodeId, Entry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            NodeId::from(ROOT_ID),
            Entry {
                title: String::new(),
                kind: NodeKind::Folder,
                parent: None,
                children: Vec::new(),
                extra: Map::new(),
            },
        );
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::from(ROOT_ID)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, HashMap<NodeId, Entry>>> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("bookmark store lock poisoned"))
    }

    /// Append a node as last child of `parent`.
    pub fn insert(
        &self,
        parent: &NodeId,
        id: impl Into<NodeId>,
        title: impl Into<String>,
        kind: NodeKind,
        extra: Map<String, Value>,
    ) -> io::Result<NodeId> {
        let id = id.into();
        let mut entries = self.lock()?;
        if entries.contains_key(&id) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("duplicate node id: {id}"),
            ));
        }
        let parent_entry = entries.get_mut(parent).ok_or_else(|| not_found(parent))?;
        if !matches!(parent_entry.kind, NodeKind::Folder) {
            return Err(not_a_folder(parent));
        }
        parent_entry.children.push(id.clone());
        entries.insert(
            id.clone(),
            Entry {
                title: title.into(),
                kind,
                parent: Some(parent.clone()),
                children: Vec::new(),
                extra,
            },
        );
        Ok(id)
    }

    pub fn add_folder(
        &self,
        parent: &NodeId,
        id: impl Into<NodeId>,
        title: impl Into<String>,
    ) -> io::Result<NodeId> {
        self.insert(parent, id, title, NodeKind::Folder, Map::new())
    }

    pub fn add_bookmark(
        &self,
        parent: &NodeId,
        id: impl Into<NodeId>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> io::Result<NodeId> {
        let kind = NodeKind::Bookmark { url: url.into() };
        self.insert(parent, id, title, kind, Map::new())
    }

    /// Copy of a stored entry.
    pub fn entry(&self, id: &NodeId) -> io::Result<Entry> {
        self.lock()?.get(id).cloned().ok_or_else(|| not_found(id))
    }

    /// Child ids of a folder in index order.
    pub fn child_ids(&self, folder_id: &NodeId) -> io::Result<Vec<NodeId>> {
        Ok(self.entry(folder_id)?.children)
    }

    /// Child titles of a folder in index order.
    pub fn child_titles(&self, folder_id: &NodeId) -> io::Result<Vec<String>> {
        let entries = self.lock()?;
        let folder = entries.get(folder_id).ok_or_else(|| not_found(folder_id))?;
        Ok(folder
            .children
            .iter()
            .filter_map(|id| entries.get(id).map(|e| e.title.clone()))
            .collect())
    }
}

fn not_found(id: &NodeId) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such node: {id}"))
}

fn not_a_folder(id: &NodeId) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, format!("not a folder: {id}"))
}

fn to_node(id: &NodeId, entry: &Entry, index: usize) -> Node {
    Node {
        id: id.clone(),
        parent_id: entry.parent.clone(),
        index,
        title: entry.title.clone(),
        kind: entry.kind.clone(),
    }
}

impl BookmarkStore for MemoryStore {
    fn get_children(&self, folder_id: &NodeId) -> io::Result<Vec<Node>> {
        let entries = self.lock()?;
        let folder = entries.get(folder_id).ok_or_else(|| not_found(folder_id))?;
        if !matches!(folder.kind, NodeKind::Folder) {
            return Err(not_a_folder(folder_id));
        }
        folder
            .children
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let entry = entries.get(id).ok_or_else(|| not_found(id))?;
                Ok(to_node(id, entry, index))
            })
            .collect()
    }

    fn move_node(&self, node_id: &NodeId, index: usize) -> io::Result<()> {
        let mut entries = self.lock()?;
        let parent_id = entries
            .get(node_id)
            .ok_or_else(|| not_found(node_id))?
            .parent
            .clone()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::PermissionDenied, "cannot move the root")
            })?;
        let siblings = &mut entries
            .get_mut(&parent_id)
            .ok_or_else(|| not_found(&parent_id))?
            .children;

        if index > siblings.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("index {index} out of range for {} children", siblings.len()),
            ));
        }
        let from = siblings
            .iter()
            .position(|id| id == node_id)
            .ok_or_else(|| not_found(node_id))?;
        let to = if index > from { index - 1 } else { index };
        let id = siblings.remove(from);
        siblings.insert(to, id);
        trace!("move_node: {} {} -> {}", node_id, from, to);
        Ok(())
    }

    fn get_node(&self, id: &NodeId) -> io::Result<Node> {
        let entries = self.lock()?;
        let entry = entries.get(id).ok_or_else(|| not_found(id))?;
        let index = entry
            .parent
            .as_ref()
            .and_then(|p| entries.get(p))
            .and_then(|p| p.children.iter().position(|c| c == id))
            .unwrap_or(0);
        Ok(to_node(id, entry, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(titles: &[&str]) -> (MemoryStore, NodeId) {
        let store = MemoryStore::new();
        let folder = store.add_folder(&store.root_id(), "1", "Bar").unwrap();
        for t in titles {
            store
                .add_bookmark(&folder, format!("id-{t}"), *t, format!("https://{t}"))
                .unwrap();
        }
        (store, folder)
    }

    #[test]
    fn given_backward_move_when_moving_then_siblings_shift_right() {
        let (store, folder) = store_with(&["a", "b", "c", "d"]);
        store.move_node(&NodeId::from("id-d"), 1).unwrap();
        assert_eq!(store.child_titles(&folder).unwrap(), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn given_forward_move_when_moving_then_index_is_pre_removal() {
        let (store, folder) = store_with(&["a", "b", "c", "d"]);
        store.move_node(&NodeId::from("id-a"), 3).unwrap();
        assert_eq!(store.child_titles(&folder).unwrap(), vec!["b", "c", "a", "d"]);
        store.move_node(&NodeId::from("id-b"), 4).unwrap();
        assert_eq!(store.child_titles(&folder).unwrap(), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn given_children_when_reading_then_indices_are_contiguous() {
        let (store, folder) = store_with(&["x", "y", "z"]);
        store.move_node(&NodeId::from("id-z"), 0).unwrap();
        let children = store.get_children(&folder).unwrap();
        let indices: Vec<usize> = children.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(store.get_node(&NodeId::from("id-x")).unwrap().index, 1);
    }

    #[test]
    fn given_unknown_id_when_reading_then_not_found() {
        let store = MemoryStore::new();
        let err = store.get_children(&NodeId::from("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        let err = store.move_node(&NodeId::from("nope"), 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn given_bookmark_when_reading_children_then_rejected() {
        let (store, _) = store_with(&["a"]);
        let err = store.get_children(&NodeId::from("id-a")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn given_duplicate_id_when_inserting_then_rejected() {
        let (store, folder) = store_with(&["a"]);
        let err = store.add_bookmark(&folder, "id-a", "a", "u").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
