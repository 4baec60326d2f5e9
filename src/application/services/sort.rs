//! Recursive folder sorting service
//!
//! Reads a folder once, plans its target order, applies the moves, then
//! descends into its subfolders in their new order.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{plan_folder, Collator, DomainError, FolderPlan, Move, NodeId, NodeKind};
use crate::infrastructure::traits::{BookmarkStore, FolderProgress, SortObserver, SortOutcome};

/// Default recursion limit of the walker.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs of a sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Roots sorted by `sort_all`, in order
    pub roots: Vec<NodeId>,
    /// Deeper folders fail the run with `DepthExceeded`
    pub max_depth: usize,
    /// Plan and report without moving anything
    pub dry_run: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            roots: vec![NodeId::from("1"), NodeId::from("2")],
            max_depth: DEFAULT_MAX_DEPTH,
            dry_run: false,
        }
    }
}

/// What happened to one visited folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderReport {
    pub id: NodeId,
    pub name: String,
    pub depth: usize,
    pub plan: FolderPlan,
}

/// Folders visited by a run, in visiting (pre-)order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortReport {
    pub folders: Vec<FolderReport>,
}

impl SortReport {
    pub fn folders_visited(&self) -> usize {
        self.folders.len()
    }

    pub fn bookmark_count(&self) -> usize {
        self.folders.iter().map(|f| f.plan.bookmarks.len()).sum()
    }

    pub fn move_count(&self) -> usize {
        self.folders.iter().map(|f| f.plan.moves.len()).sum()
    }

    fn extend(&mut self, other: SortReport) {
        self.folders.extend(other.folders);
    }

    fn summary(&self, dry_run: bool) -> String {
        format!(
            "{} folders, {} bookmarks, {} moves{}",
            self.folders_visited(),
            self.bookmark_count(),
            self.move_count(),
            if dry_run { " planned" } else { "" }
        )
    }
}

/// Walk state shared across one recursive run.
struct Walk {
    visited: HashSet<NodeId>,
    report: SortReport,
}

/// Service for sorting bookmark folders in place.
pub struct SortService {
    store: Arc<dyn BookmarkStore>,
    collator: Arc<dyn Collator>,
    observer: Arc<dyn SortObserver>,
    options: SortOptions,
}

impl SortService {
    /// Create a new sort service.
    pub fn new(
        store: Arc<dyn BookmarkStore>,
        collator: Arc<dyn Collator>,
        observer: Arc<dyn SortObserver>,
        options: SortOptions,
    ) -> Self {
        Self {
            store,
            collator,
            observer,
            options,
        }
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Sort every configured root.
    ///
    /// All roots are resolved before anything moves, so an unknown root id
    /// fails the run without partially sorting.
    #[instrument(skip(self))]
    pub fn sort_all(&self) -> ApplicationResult<SortReport> {
        let result = self.sort_roots();
        self.notify(&result);
        result
    }

    /// Sort the subtree of folder `id`, or of the parent folder when `id` is a bookmark.
    #[instrument(skip(self))]
    pub fn sort_one(&self, id: &NodeId) -> ApplicationResult<SortReport> {
        let result = self.resolve_folder(id).and_then(|(folder_id, name)| {
            self.sort_recursive(&folder_id, &name, 0)
        });
        self.notify(&result);
        result
    }

    fn sort_roots(&self) -> ApplicationResult<SortReport> {
        let roots = self
            .options
            .roots
            .iter()
            .map(|id| self.resolve_folder(id))
            .collect::<ApplicationResult<Vec<_>>>()?;

        let mut report = SortReport::default();
        for (id, name) in roots {
            report.extend(self.sort_recursive(&id, &name, 0)?);
        }
        Ok(report)
    }

    /// Folder id and display name to start a walk from.
    fn resolve_folder(&self, id: &NodeId) -> ApplicationResult<(NodeId, String)> {
        let node = self.store.get_node(id).or_not_found("get node", id)?;
        match node.kind {
            NodeKind::Folder => Ok((node.id, node.title)),
            NodeKind::Bookmark { .. } => {
                let parent_id = node.parent_id.ok_or_else(|| DomainError::InvalidNode {
                    id: id.clone(),
                    reason: "bookmark without parent".to_string(),
                })?;
                let parent = self
                    .store
                    .get_node(&parent_id)
                    .or_not_found("get parent", &parent_id)?;
                debug!("resolve_folder: bookmark {} -> folder {}", id, parent.id);
                Ok((parent.id, parent.title))
            }
        }
    }

    /// Sort `folder_id` and everything below it.
    ///
    /// `depth` is the depth of `folder_id` itself; it drives progress output
    /// and the depth limit only.
    pub fn sort_recursive(
        &self,
        folder_id: &NodeId,
        folder_name: &str,
        depth: usize,
    ) -> ApplicationResult<SortReport> {
        let mut walk = Walk {
            visited: HashSet::new(),
            report: SortReport::default(),
        };
        self.walk(folder_id, folder_name, depth, &mut walk)?;
        Ok(walk.report)
    }

    fn walk(
        &self,
        folder_id: &NodeId,
        folder_name: &str,
        depth: usize,
        walk: &mut Walk,
    ) -> ApplicationResult<()> {
        if depth > self.options.max_depth {
            return Err(DomainError::DepthExceeded {
                id: folder_id.clone(),
                max_depth: self.options.max_depth,
            }
            .into());
        }
        if !walk.visited.insert(folder_id.clone()) {
            return Err(DomainError::CycleDetected(folder_id.clone()).into());
        }

        let children = self
            .store
            .get_children(folder_id)
            .or_not_found("get children", folder_id)?;

        let plan = plan_folder(&children, self.collator.as_ref());
        let subfolders: Vec<(NodeId, String)> = plan
            .folders
            .iter()
            .map(|f| (f.id.clone(), f.normalized_title.clone()))
            .collect();

        if !children.is_empty() {
            self.observer.on_folder(&FolderProgress {
                folder_id: folder_id.clone(),
                folder_name: folder_name.to_string(),
                bookmark_count: plan.bookmarks.len(),
                folder_count: plan.folders.len(),
                depth,
                moves: plan.moves.len(),
            });
            if !self.options.dry_run {
                self.apply_order(folder_id, &plan.moves)?;
            }
        }

        walk.report.folders.push(FolderReport {
            id: folder_id.clone(),
            name: folder_name.to_string(),
            depth,
            plan,
        });

        for (id, name) in subfolders {
            self.walk(&id, &name, depth + 1, walk)?;
        }
        Ok(())
    }

    /// Issue `moves` against folder `folder_id`, in order.
    ///
    /// The first failing move aborts the rest; earlier moves stay applied.
    pub fn apply_order(&self, folder_id: &NodeId, moves: &[Move]) -> ApplicationResult<usize> {
        if moves.is_empty() {
            return Ok(0);
        }
        let folder = self
            .store
            .get_node(folder_id)
            .or_not_found("get folder", folder_id)?;
        if !folder.is_folder() {
            return Err(DomainError::InvalidNode {
                id: folder_id.clone(),
                reason: "not a folder".to_string(),
            }
            .into());
        }

        for mv in moves {
            self.store
                .move_node(&mv.node_id, mv.index)
                .with_node_context(&format!("move to index {}", mv.index), &mv.node_id)?;
        }
        debug!("apply_order: {} moves in {}", moves.len(), folder_id);
        Ok(moves.len())
    }

    fn notify(&self, result: &ApplicationResult<SortReport>) {
        let outcome = match result {
            Ok(report) => SortOutcome {
                success: true,
                detail: report.summary(self.options.dry_run),
            },
            Err(e) => SortOutcome {
                success: false,
                detail: error_detail(e),
            },
        };
        self.observer.on_complete(&outcome);
    }
}

fn error_detail(e: &ApplicationError) -> String {
    match e {
        ApplicationError::HostOperationFailed { context, source } => {
            format!("{context}: {source}")
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CodePointCollator;
    use crate::infrastructure::memory::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        folders: Mutex<Vec<FolderProgress>>,
        outcomes: Mutex<Vec<SortOutcome>>,
    }

    impl SortObserver for Recorder {
        fn on_folder(&self, progress: &FolderProgress) {
            self.folders.lock().unwrap().push(progress.clone());
        }

        fn on_complete(&self, outcome: &SortOutcome) {
            self.outcomes.lock().unwrap().push(outcome.clone());
        }
    }

    fn service(
        store: Arc<MemoryStore>,
        observer: Arc<Recorder>,
        options: SortOptions,
    ) -> SortService {
        SortService::new(store, Arc::new(CodePointCollator), observer, options)
    }

    #[test]
    fn given_unsorted_folder_when_sorting_one_then_reordered_and_notified_once() {
        let store = Arc::new(MemoryStore::new());
        let bar = store.add_folder(&store.root_id(), "1", "Bar").unwrap();
        store.add_folder(&bar, "f", "Sub").unwrap();
        store.add_bookmark(&bar, "long", "Longer", "u").unwrap();
        store.add_bookmark(&bar, "short", "S", "u").unwrap();

        let recorder = Arc::new(Recorder::default());
        let svc = service(store.clone(), recorder.clone(), SortOptions::default());
        let report = svc.sort_one(&bar).unwrap();

        assert_eq!(store.child_titles(&bar).unwrap(), vec!["S", "Longer", "Sub"]);
        assert_eq!(report.folders_visited(), 2);
        assert_eq!(recorder.outcomes.lock().unwrap().len(), 1);
        assert!(recorder.outcomes.lock().unwrap()[0].success);
        // the empty subfolder is visited but produces no progress event
        assert_eq!(recorder.folders.lock().unwrap().len(), 1);
    }

    #[test]
    fn given_dry_run_when_sorting_then_tree_untouched() {
        let store = Arc::new(MemoryStore::new());
        let bar = store.add_folder(&store.root_id(), "1", "Bar").unwrap();
        store.add_bookmark(&bar, "b", "BB", "u").unwrap();
        store.add_bookmark(&bar, "a", "A", "u").unwrap();

        let options = SortOptions {
            dry_run: true,
            ..SortOptions::default()
        };
        let svc = service(store.clone(), Arc::new(Recorder::default()), options);
        let report = svc.sort_one(&bar).unwrap();

        assert_eq!(report.move_count(), 1);
        assert_eq!(store.child_titles(&bar).unwrap(), vec!["BB", "A"]);
    }

    #[test]
    fn given_depth_limit_when_tree_deeper_then_depth_exceeded() {
        let store = Arc::new(MemoryStore::new());
        let mut parent = store.add_folder(&store.root_id(), "1", "Bar").unwrap();
        for level in 0..3 {
            parent = store
                .add_folder(&parent, format!("lvl{level}"), format!("L{level}"))
                .unwrap();
        }
        let options = SortOptions {
            max_depth: 2,
            ..SortOptions::default()
        };
        let recorder = Arc::new(Recorder::default());
        let svc = service(store, recorder.clone(), options);
        let err = svc.sort_one(&NodeId::from("1")).unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::DepthExceeded { max_depth: 2, .. })
        ));
        assert!(!recorder.outcomes.lock().unwrap()[0].success);
    }
}
