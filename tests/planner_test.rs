//! Ordering and move-planning properties of a single folder.

use rstest::rstest;

use bmsort::domain::{
    plan_folder, plan_moves, replay_moves, visual_width, CaseInsensitiveCollator,
    CodePointCollator, Collator, Node, NodeId,
};

/// Small deterministic generator so the property checks need no extra crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const WORDS: &[&str] = &[
    "", "  ", "a", "B", "rust", "Rust", "中", "中文", "docs", "Zeta", "alpha", " GitHub ",
    "Ünïcödé", "😀", "x y", "AB",
];

fn random_children(rng: &mut Lcg, n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| {
            let title = WORDS[rng.below(WORDS.len())];
            if rng.below(3) == 0 {
                Node::folder(format!("f{i}"), "p", i, title)
            } else {
                Node::bookmark(format!("b{i}"), "p", i, title, format!("https://site{i}.example"))
            }
        })
        .collect()
}

fn reindexed(children: &[Node], order: &[NodeId]) -> Vec<Node> {
    order
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut node = children.iter().find(|n| &n.id == id).unwrap().clone();
            node.index = i;
            node
        })
        .collect()
}

fn check_folder(children: &[Node], collator: &dyn Collator) {
    let plan = plan_folder(children, collator);
    let target = plan.target_order();
    let n = children.len();

    // partition: every bookmark before every folder
    let first_folder = target
        .iter()
        .position(|id| children.iter().any(|c| &c.id == id && c.is_folder()))
        .unwrap_or(n);
    assert!(target[first_folder..]
        .iter()
        .all(|id| children.iter().any(|c| &c.id == id && c.is_folder())));

    // bookmark segment: width, then collation
    for w in plan.bookmarks.windows(2) {
        assert!(w[0].visual_width <= w[1].visual_width);
        if w[0].visual_width == w[1].visual_width {
            assert!(collator.compare(&w[0].normalized_title, &w[1].normalized_title).is_le());
        }
        assert_eq!(w[0].visual_width, visual_width(&w[0].normalized_title));
    }
    // folder segment: collation
    for w in plan.folders.windows(2) {
        assert!(collator.compare(&w[0].normalized_title, &w[1].normalized_title).is_le());
    }

    // moves: strictly increasing, at most n - 1, converge to target
    assert!(plan.moves.len() <= n.saturating_sub(1));
    assert!(plan.moves.windows(2).all(|w| w[0].index < w[1].index));
    let mut live: Vec<NodeId> = children.iter().map(|c| c.id.clone()).collect();
    let already_sorted = live == target;
    assert_eq!(plan.moves.is_empty(), already_sorted);
    replay_moves(&mut live, &plan.moves);
    assert_eq!(live, target);

    // idempotence: second pass plans nothing
    let again = plan_folder(&reindexed(children, &live), collator);
    assert!(again.moves.is_empty());
    assert_eq!(again.target_order(), target);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(2)]
#[case(7)]
#[case(25)]
fn given_random_folders_when_planning_then_all_properties_hold(#[case] n: usize) {
    let mut rng = Lcg(n as u64 + 17);
    for _ in 0..50 {
        let children = random_children(&mut rng, n);
        check_folder(&children, &CodePointCollator);
        check_folder(&children, &CaseInsensitiveCollator);
    }
}

#[test]
fn given_documented_example_when_planning_then_expected_order() {
    let children = vec![
        Node::bookmark("ab", "p", 0, "AB", "https://ab.example"),
        Node::bookmark("zh", "p", 1, "中", "https://zh.example"),
        Node::bookmark("a", "p", 2, "A", "https://a.example"),
        Node::folder("zeta", "p", 3, "Zeta"),
        Node::folder("alpha", "p", 4, "Alpha"),
    ];
    let plan = plan_folder(&children, &CodePointCollator);
    let titles: Vec<&str> = plan
        .bookmarks
        .iter()
        .map(|b| b.normalized_title.as_str())
        .chain(plan.folders.iter().map(|f| f.normalized_title.as_str()))
        .collect();
    assert_eq!(titles, vec!["A", "AB", "中", "Alpha", "Zeta"]);
}

#[test]
fn given_full_rotation_when_planning_moves_then_single_move() {
    let current: Vec<NodeId> = ["b", "c", "d", "e", "a"].iter().map(|s| NodeId::from(*s)).collect();
    let target: Vec<NodeId> = ["a", "b", "c", "d", "e"].iter().map(|s| NodeId::from(*s)).collect();
    let moves = plan_moves(&current, &target);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].index, 0);
}

#[test]
fn given_collations_when_folder_names_differ_in_case_then_order_differs() {
    let children = vec![
        Node::folder("z", "p", 0, "Zeta"),
        Node::folder("a", "p", 1, "alpha"),
    ];
    let by_code_point = plan_folder(&children, &CodePointCollator).target_order();
    let case_insensitive = plan_folder(&children, &CaseInsensitiveCollator).target_order();
    assert_eq!(by_code_point, vec![NodeId::from("z"), NodeId::from("a")]);
    assert_eq!(case_insensitive, vec![NodeId::from("a"), NodeId::from("z")]);
}
