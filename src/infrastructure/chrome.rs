//! Chrome/Chromium `Bookmarks` file as a bookmark store.
//!
//! The file is loaded into a [`MemoryStore`], sorted in memory and written back.
//! Fields this crate does not understand (`date_added`, `guid`, `meta_info`, ...)
//! are carried through unchanged. The stored `checksum` is dropped on save since
//! reordering invalidates it.
//!
//! Close the browser before writing: a running browser overwrites the file with
//! its own in-memory copy.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::application::ApplicationError;
use crate::domain::{DomainError, Node, NodeId, NodeKind};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::traits::BookmarkStore;
use crate::infrastructure::{InfraError, InfraResult};

#[derive(Debug, Serialize, Deserialize)]
struct RawNode {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<RawNode>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    checksum: Option<String>,
    roots: Map<String, Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A loaded `Bookmarks` file.
#[derive(Debug)]
pub struct ChromeBookmarksFile {
    path: PathBuf,
    store: MemoryStore,
    /// Root key (`bookmark_bar`, `other`, `synced`) and the id of its folder
    roots: Vec<(String, NodeId)>,
    /// Non-folder values found under `roots` (older files keep a sync version there)
    root_extra: Map<String, Value>,
    /// Top-level fields besides `roots` and `checksum`
    meta: Map<String, Value>,
}

impl ChromeBookmarksFile {
    /// Read and parse a `Bookmarks` file.
    pub fn load(path: &Path) -> InfraResult<Self> {
        debug!("load: {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        Self::from_json(&content, path)
    }

    /// Parse `Bookmarks` JSON; `path` is where `save` writes to.
    pub fn from_json(content: &str, path: &Path) -> InfraResult<Self> {
        let doc: RawDocument = serde_json::from_str(content)
            .map_err(|e| InfraError::json(format!("parse {}", path.display()), e))?;

        let store = MemoryStore::new();
        let mut roots = Vec::new();
        let mut root_extra = Map::new();

        for (key, value) in doc.roots {
            let is_folder = value.get("type").and_then(Value::as_str) == Some("folder");
            if !is_folder {
                root_extra.insert(key, value);
                continue;
            }
            let raw: RawNode = serde_json::from_value(value)
                .map_err(|e| InfraError::json(format!("parse root '{key}'"), e))?;
            let id = import_node(&store, &store.root_id(), raw)?;
            roots.push((key, id));
        }
        info!(
            "loaded {} roots from {}",
            roots.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            store,
            roots,
            root_extra,
            meta: doc.extra,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root folder ids in file order.
    pub fn root_ids(&self) -> Vec<NodeId> {
        self.roots.iter().map(|(_, id)| id.clone()).collect()
    }

    /// Id of the root stored under `key` (e.g. `bookmark_bar`).
    pub fn root_id(&self, key: &str) -> Option<&NodeId> {
        self.roots.iter().find(|(k, _)| k == key).map(|(_, id)| id)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Serialize the current tree in the browser's own layout (3-space indent).
    pub fn to_json(&self) -> InfraResult<String> {
        let mut roots = self.root_extra.clone();
        for (key, id) in &self.roots {
            let raw = export_node(&self.store, id)?;
            let value = serde_json::to_value(raw)
                .map_err(|e| InfraError::json(format!("serialize root '{key}'"), e))?;
            roots.insert(key.clone(), value);
        }
        let doc = RawDocument {
            checksum: None,
            roots,
            extra: self.meta.clone(),
        };

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)
            .map_err(|e| InfraError::json("serialize bookmarks", e))?;
        String::from_utf8(buf).map_err(|e| {
            InfraError::io(
                "serialize bookmarks",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Write the tree back to `path`, atomically.
    ///
    /// With `backup`, the current file is first copied next to it with a
    /// timestamp suffix; the backup path is returned.
    pub fn save(&self, backup: bool) -> InfraResult<Option<PathBuf>> {
        let json = self.to_json()?;

        let backup_path = if backup && self.path.exists() {
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let name = format!(
                "{}.bmsort-{}.bak",
                self.path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Bookmarks".to_string()),
                stamp
            );
            let target = self.path.with_file_name(name);
            fs::copy(&self.path, &target)
                .map_err(|e| InfraError::io(format!("backup to {}", target.display()), e))?;
            debug!("save: backup written to {}", target.display());
            Some(target)
        } else {
            None
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| InfraError::io(format!("create temp file in {}", dir.display()), e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| InfraError::io("write temp file", e))?;
        tmp.persist(&self.path)
            .map_err(|e| InfraError::io(format!("replace {}", self.path.display()), e.error))?;
        info!("saved {}", self.path.display());

        Ok(backup_path)
    }
}

fn import_node(store: &MemoryStore, parent: &NodeId, raw: RawNode) -> InfraResult<NodeId> {
    let id = NodeId::from(raw.id);
    let kind = match raw.kind.as_str() {
        "url" => {
            let url = raw.url.ok_or_else(|| invalid(&id, "bookmark without url"))?;
            NodeKind::Bookmark { url }
        }
        "folder" => NodeKind::Folder,
        other => return Err(invalid(&id, &format!("unknown node type '{other}'"))),
    };

    store
        .insert(parent, id.clone(), raw.name, kind, raw.extra)
        .map_err(|e| InfraError::io(format!("insert node {id}"), e))?;

    for child in raw.children.unwrap_or_default() {
        import_node(store, &id, child)?;
    }
    Ok(id)
}

fn export_node(store: &MemoryStore, id: &NodeId) -> InfraResult<RawNode> {
    let entry = store
        .entry(id)
        .map_err(|e| InfraError::io(format!("export node {id}"), e))?;
    let (kind, url, children) = match entry.kind {
        NodeKind::Bookmark { url } => ("url", Some(url), None),
        NodeKind::Folder => {
            let children = entry
                .children
                .iter()
                .map(|child| export_node(store, child))
                .collect::<InfraResult<Vec<_>>>()?;
            ("folder", None, Some(children))
        }
    };
    Ok(RawNode {
        id: id.to_string(),
        name: entry.title,
        kind: kind.to_string(),
        url,
        children,
        extra: entry.extra,
    })
}

fn invalid(id: &NodeId, reason: &str) -> InfraError {
    InfraError::Application(ApplicationError::Domain(DomainError::InvalidNode {
        id: id.clone(),
        reason: reason.to_string(),
    }))
}

impl BookmarkStore for ChromeBookmarksFile {
    fn get_children(&self, folder_id: &NodeId) -> std::io::Result<Vec<Node>> {
        self.store.get_children(folder_id)
    }

    fn move_node(&self, node_id: &NodeId, index: usize) -> std::io::Result<()> {
        self.store.move_node(node_id, index)
    }

    fn get_node(&self, id: &NodeId) -> std::io::Result<Node> {
        self.store.get_node(id)
    }
}
