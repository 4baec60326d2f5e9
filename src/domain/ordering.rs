//! Target order and move planning for one folder.
//!
//! The host only offers "move node to index" and renumbers siblings after every
//! move, so the planner keeps a local mirror of the sibling list and replays that
//! renumbering instead of reading the folder again.

use itertools::Itertools;

use crate::domain::collation::Collator;
use crate::domain::entities::{
    FolderPlan, Move, Node, NodeId, NodeKind, ScoredBookmark, ScoredFolder,
};
use crate::domain::metric::visual_width;

/// Title used as sort key for a bookmark: trimmed title, else trimmed url.
pub fn normalized_bookmark_title(title: &str, url: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        url.trim().to_string()
    } else {
        title.to_string()
    }
}

/// Split children into scored bookmarks and folders, keeping current order.
pub fn classify(children: &[Node]) -> (Vec<ScoredBookmark>, Vec<ScoredFolder>) {
    children
        .iter()
        .sorted_by_key(|n| n.index)
        .partition_map(|node| match &node.kind {
            NodeKind::Bookmark { url } => {
                let normalized_title = normalized_bookmark_title(&node.title, url);
                itertools::Either::Left(ScoredBookmark {
                    id: node.id.clone(),
                    visual_width: visual_width(&normalized_title),
                    normalized_title,
                })
            }
            NodeKind::Folder => itertools::Either::Right(ScoredFolder {
                id: node.id.clone(),
                normalized_title: node.title.trim().to_string(),
            }),
        })
}

/// Width ascending, then title by collation. Stable.
pub fn sort_bookmarks(bookmarks: &mut [ScoredBookmark], collator: &dyn Collator) {
    bookmarks.sort_by(|a, b| {
        a.visual_width
            .cmp(&b.visual_width)
            .then_with(|| collator.compare(&a.normalized_title, &b.normalized_title))
    });
}

/// Title by collation. Stable.
pub fn sort_folders(folders: &mut [ScoredFolder], collator: &dyn Collator) {
    folders.sort_by(|a, b| collator.compare(&a.normalized_title, &b.normalized_title));
}

/// Target order of `children`: bookmarks in bookmark order, then folders in folder order.
pub fn plan_order(children: &[Node], collator: &dyn Collator) -> Vec<NodeId> {
    plan_folder(children, collator).target_order()
}

/// Moves turning `current` into `target`.
///
/// Positions are walked left to right. Whenever the mirrored list disagrees with
/// the target at position `i`, the target item sits at some `j > i`; one move to
/// `i` is emitted and the mirror is renumbered the way the host does it.
/// The last position is always correct once the others are, so at most `n - 1`
/// moves are produced.
///
/// `target` must be a permutation of `current`.
pub fn plan_moves(current: &[NodeId], target: &[NodeId]) -> Vec<Move> {
    debug_assert_eq!(current.len(), target.len());
    let mut live: Vec<&NodeId> = current.iter().collect();
    let mut moves = Vec::new();

    for (i, wanted) in target.iter().enumerate() {
        if live.get(i) == Some(&wanted) {
            continue;
        }
        let found = live.iter().skip(i).position(|id| *id == wanted);
        debug_assert!(
            found.is_some(),
            "target is not a permutation of current: {wanted} is missing"
        );
        let Some(j) = found.map(|p| p + i) else {
            continue;
        };
        let node = live.remove(j);
        live.insert(i, node);
        moves.push(Move {
            node_id: wanted.clone(),
            index: i,
        });
    }
    moves
}

/// Classify, order and plan moves for a folder snapshot.
pub fn plan_folder(children: &[Node], collator: &dyn Collator) -> FolderPlan {
    let current: Vec<NodeId> = children
        .iter()
        .sorted_by_key(|n| n.index)
        .map(|n| n.id.clone())
        .collect();

    let (mut bookmarks, mut folders) = classify(children);
    sort_bookmarks(&mut bookmarks, collator);
    sort_folders(&mut folders, collator);

    let mut plan = FolderPlan {
        bookmarks,
        folders,
        moves: Vec::new(),
    };
    plan.moves = plan_moves(&current, &plan.target_order());
    plan
}

/// Apply `moves` to `order` with host renumbering semantics.
///
/// Each move's index is interpreted before the node leaves its slot, matching
/// the Chrome bookmarks API.
pub fn replay_moves(order: &mut Vec<NodeId>, moves: &[Move]) {
    for mv in moves {
        let Some(from) = order.iter().position(|id| *id == mv.node_id) else {
            continue;
        };
        let node = order.remove(from);
        let to = if mv.index > from { mv.index - 1 } else { mv.index };
        order.insert(to.min(order.len()), node);
    }
}
