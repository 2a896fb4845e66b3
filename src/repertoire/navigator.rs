use super::board::{BoardPosition, renderable};
use super::error::MoveError;
use super::tree::{GameTree, MoveNode, NodeId};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakmaty::san::SanPlus;

/// What an accepted typed input did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedMove {
    /// The typed move exists in the tree; the cursor followed it.
    Played(NodeId),
    /// Empty input: a stored continuation was picked at random.
    RandomReply(NodeId),
    /// Empty input at a leaf: nothing to pick, cursor unchanged.
    NoReply,
}

/// Single cursor over a loaded [`GameTree`].
///
/// Every operation is one bounded walk along parent/child edges. Stepping
/// past either end of the tree is a silent no-op, reported through the
/// return value rather than an error.
pub struct Navigator {
    tree: GameTree,
    cursor: NodeId,
    rng: StdRng,
}

impl Navigator {
    pub fn new(tree: GameTree) -> Self {
        Self::with_rng(tree, StdRng::from_os_rng())
    }

    /// Deterministic reply picker, for drills that should repeat.
    pub fn with_seed(tree: GameTree, seed: u64) -> Self {
        Self::with_rng(tree, StdRng::seed_from_u64(seed))
    }

    fn with_rng(tree: GameTree, rng: StdRng) -> Self {
        let cursor = tree.root();
        Self { tree, cursor, rng }
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn current(&self) -> &MoveNode {
        self.tree.node(self.cursor)
    }

    pub fn board(&self) -> BoardPosition {
        renderable(&self.tree, self.cursor)
    }

    pub fn to_start(&mut self) {
        while let Some(parent) = self.current().parent() {
            self.cursor = parent;
        }
    }

    pub fn step_back(&mut self) -> bool {
        match self.current().parent() {
            Some(parent) => {
                self.cursor = parent;
                true
            }
            None => false,
        }
    }

    pub fn step_forward_mainline(&mut self) -> bool {
        match self.current().mainline_child() {
            Some(child) => {
                self.cursor = child;
                true
            }
            None => false,
        }
    }

    /// Move to a uniformly chosen child. `None` at a leaf.
    pub fn step_forward_random(&mut self) -> Option<NodeId> {
        let children = self.tree.node(self.cursor).children();
        if children.is_empty() {
            return None;
        }

        let child = children[self.rng.random_range(0..children.len())];
        self.cursor = child;
        Some(child)
    }

    /// Follow the mainline until a leaf. Returns the number of steps taken.
    pub fn to_end(&mut self) -> usize {
        let mut steps = 0;
        while self.step_forward_mainline() {
            steps += 1;
        }
        steps
    }

    /// Put the cursor on any node of the tree. Unknown ids are refused.
    pub fn jump_to(&mut self, id: NodeId) -> bool {
        if self.tree.contains(id) {
            self.cursor = id;
            true
        } else {
            false
        }
    }

    /// Find the child reached by `text` without moving the cursor.
    pub fn resolve_typed_move(&self, text: &str) -> Result<NodeId, MoveError> {
        let input = text.trim();
        let format_error = |reason: String| MoveError::Format {
            input: input.to_string(),
            reason,
        };

        let san: SanPlus = input.parse().map_err(|e| format_error(format!("{}", e)))?;
        let mv = san
            .san
            .to_move(self.current().position())
            .map_err(|e| format_error(format!("{}", e)))?;

        self.tree
            .find_child(self.cursor, &mv)
            .ok_or_else(|| MoveError::UnrecognizedVariation {
                san: san.to_string(),
            })
    }

    /// Follow the typed SAN if the tree has it. Empty input asks for a random
    /// stored continuation instead. On error the cursor does not move.
    pub fn apply_typed_move(&mut self, text: &str) -> Result<TypedMove, MoveError> {
        if text.trim().is_empty() {
            return Ok(match self.step_forward_random() {
                Some(child) => TypedMove::RandomReply(child),
                None => TypedMove::NoReply,
            });
        }

        let child = self.resolve_typed_move(text)?;
        self.cursor = child;
        Ok(TypedMove::Played(child))
    }

    /// SANs from the start position to the cursor.
    pub fn line(&self) -> Vec<String> {
        self.tree
            .line_to(self.cursor)
            .into_iter()
            .map(|san| san.to_string())
            .collect()
    }

    /// Stored continuations from the cursor, mainline first.
    pub fn candidates(&self) -> Vec<String> {
        self.current()
            .children()
            .iter()
            .filter_map(|child| self.tree.node(*child).san())
            .map(|san| san.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repertoire::board::{position_fen, replay};

    const SCENARIO: &str = "1. e4 e5 (1... c5) *";

    const REPERTOIRE: &str = r#"[Event "Test Repertoire"]

1. e4 e5 (1... c5 2. Nf3 d6 (2... Nc6 3. d4 cxd4) (2... e6 3. d4) 3. d4)
(1... c6 2. d4 d5 3. e5 Bf5) 2. Nf3 Nc6 (2... d6 3. d4) 3. Bb5 (3. Bc4 Bc5
(3... Nf6 4. Ng5)) a6 4. Ba4 Nf6 5. O-O *"#;

    fn navigator(pgn: &str) -> Navigator {
        Navigator::with_seed(GameTree::from_pgn(pgn).expect("valid pgn"), 42)
    }

    fn san_at(nav: &Navigator) -> Option<String> {
        nav.current().san().map(|s| s.to_string())
    }

    #[test]
    fn test_starts_at_root() {
        let nav = navigator(SCENARIO);
        assert_eq!(nav.cursor(), nav.tree().root());
        assert!(nav.line().is_empty());
    }

    #[test]
    fn test_scenario_walkthrough() {
        let mut nav = navigator(SCENARIO);
        let root = nav.tree().root();
        let a = nav.tree().node(root).mainline_child().expect("A");
        let b = nav.tree().node(a).children()[0];
        let c = nav.tree().node(a).children()[1];
        let c_san = nav.tree().node(c).san().map(|s| s.to_string());
        assert_eq!(c_san.as_deref(), Some("c5"));

        nav.to_start();
        assert!(nav.step_forward_mainline());
        assert_eq!(nav.cursor(), a);

        assert_eq!(nav.apply_typed_move("e5"), Ok(TypedMove::Played(b)));
        assert_eq!(nav.cursor(), b);

        assert!(nav.step_back());
        assert_eq!(nav.cursor(), a);

        let err = nav.apply_typed_move("xyz").expect_err("not a move");
        assert!(matches!(err, MoveError::Format { ref input, .. } if input == "xyz"));
        assert_eq!(nav.cursor(), a);
    }

    #[test]
    fn test_typed_variation_move_follows_branch() {
        let mut nav = navigator(SCENARIO);
        nav.step_forward_mainline();
        assert!(matches!(nav.apply_typed_move("c5"), Ok(TypedMove::Played(_))));
        assert_eq!(san_at(&nav).as_deref(), Some("c5"));
    }

    #[test]
    fn test_typed_move_accepts_surrounding_whitespace_and_suffix() {
        let mut nav = navigator("1. e4 f5 2. Qh5+ *");
        assert!(nav.apply_typed_move(" e4 ").is_ok());
        assert!(nav.apply_typed_move("f5").is_ok());
        assert!(nav.apply_typed_move("Qh5").is_ok());
        assert_eq!(san_at(&nav).as_deref(), Some("Qh5+"));
    }

    #[test]
    fn test_typed_legal_move_missing_from_tree() {
        let mut nav = navigator(SCENARIO);
        nav.step_forward_mainline();
        let before = nav.cursor();

        let err = nav.apply_typed_move("Nf6").expect_err("not in tree");
        assert_eq!(
            err,
            MoveError::UnrecognizedVariation {
                san: "Nf6".to_string()
            }
        );
        assert_eq!(nav.cursor(), before);
    }

    #[test]
    fn test_typed_illegal_move_is_format_error() {
        let mut nav = navigator(SCENARIO);
        nav.step_forward_mainline();
        let before = nav.cursor();

        let err = nav.apply_typed_move("Ke2").expect_err("illegal for black");
        assert!(matches!(err, MoveError::Format { .. }));
        assert_eq!(nav.cursor(), before);
    }

    #[test]
    fn test_typed_ambiguous_move_is_format_error() {
        let mut nav = navigator("1. e4 e5 2. Nc3 Nc6 3. Nge2 *");
        for san in ["e4", "e5", "Nc3", "Nc6"] {
            nav.apply_typed_move(san).expect("stored move");
        }
        let before = nav.cursor();

        let err = nav.apply_typed_move("Ne2").expect_err("two knights reach e2");
        assert!(matches!(err, MoveError::Format { ref input, .. } if input == "Ne2"));
        assert_eq!(nav.cursor(), before);

        assert!(matches!(nav.apply_typed_move("Nge2"), Ok(TypedMove::Played(_))));
        assert_eq!(san_at(&nav).as_deref(), Some("Nge2"));
    }

    #[test]
    fn test_typed_move_is_case_sensitive() {
        // "Bc4" and "bc4" can both be legal, so case is never folded.
        let mut nav = navigator(SCENARIO);
        let err = nav.apply_typed_move("E4").expect_err("uppercase file");
        assert!(matches!(err, MoveError::Format { .. }));
        assert_eq!(nav.cursor(), nav.tree().root());
    }

    #[test]
    fn test_empty_input_picks_random_child() {
        let mut nav = navigator(SCENARIO);
        nav.step_forward_mainline();
        let a = nav.cursor();

        match nav.apply_typed_move("") {
            Ok(TypedMove::RandomReply(child)) => {
                assert_eq!(nav.cursor(), child);
                assert_eq!(nav.tree().node(child).parent(), Some(a));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_blank_input_at_leaf_is_no_reply() {
        let mut nav = navigator(SCENARIO);
        nav.to_end();
        let leaf = nav.cursor();
        assert_eq!(nav.apply_typed_move("   "), Ok(TypedMove::NoReply));
        assert_eq!(nav.cursor(), leaf);
    }

    #[test]
    fn test_boundaries_are_silent_noops() {
        let mut nav = navigator(SCENARIO);
        assert!(!nav.step_back());
        assert_eq!(nav.cursor(), nav.tree().root());

        nav.to_end();
        let leaf = nav.cursor();
        assert!(!nav.step_forward_mainline());
        assert_eq!(nav.step_forward_random(), None);
        assert_eq!(nav.to_end(), 0);
        assert_eq!(nav.cursor(), leaf);
    }

    #[test]
    fn test_to_start_from_every_node_lands_on_root() {
        let mut nav = navigator(REPERTOIRE);
        let ids: Vec<NodeId> = nav.tree().ids().collect();
        for id in ids {
            assert!(nav.jump_to(id));
            nav.to_start();
            assert_eq!(nav.cursor(), nav.tree().root());
            assert!(nav.current().parent().is_none());

            nav.to_start();
            assert_eq!(nav.cursor(), nav.tree().root());
        }
    }

    #[test]
    fn test_back_then_forward_returns_iff_mainline_edge() {
        let mut nav = navigator(REPERTOIRE);
        let ids: Vec<NodeId> = nav.tree().ids().skip(1).collect();
        for id in ids {
            nav.jump_to(id);
            assert!(nav.step_back());
            let parent = nav.cursor();
            assert!(nav.step_forward_mainline());

            let mainline_sibling = nav.tree().node(parent).children()[0];
            assert_eq!(nav.cursor(), mainline_sibling);
            assert_eq!(nav.cursor() == id, nav.tree().is_mainline_edge(id));
        }
    }

    #[test]
    fn test_to_end_from_every_node_reaches_leaf() {
        let mut nav = navigator(REPERTOIRE);
        let ids: Vec<NodeId> = nav.tree().ids().collect();
        for id in ids {
            nav.jump_to(id);
            let start_ply = nav.current().ply();
            let steps = nav.to_end();
            assert!(nav.current().is_leaf());
            assert_eq!(nav.current().ply(), start_ply + steps as u32);
        }
    }

    #[test]
    fn test_to_end_has_no_depth_limit() {
        let mut nav = navigator(
            "1. Nf3 Nf6 2. Ng1 Ng8 3. Nf3 Nf6 4. Ng1 Ng8 5. Nf3 Nf6 6. Ng1 Ng8 7. Nf3 Nf6 8. Ng1 Ng8 *",
        );
        assert_eq!(nav.to_end(), 16);
        assert_eq!(nav.current().ply(), 16);
        assert!(nav.current().is_leaf());
    }

    #[test]
    fn test_to_end_one_move_from_leaf() {
        let mut nav = navigator("1. e4 *");
        assert_eq!(nav.to_end(), 1);
        assert_eq!(san_at(&nav).as_deref(), Some("e4"));
    }

    #[test]
    fn test_random_step_always_lands_on_child() {
        let mut nav = navigator(REPERTOIRE);
        let branching: Vec<NodeId> = nav
            .tree()
            .ids()
            .filter(|id| !nav.tree().node(*id).is_leaf())
            .collect();

        for id in branching {
            for _ in 0..20 {
                nav.jump_to(id);
                let child = nav.step_forward_random().expect("has children");
                assert_eq!(nav.cursor(), child);
                assert!(nav.tree().node(id).children().contains(&child));
            }
        }
    }

    #[test]
    fn test_random_step_reaches_every_reply() {
        let mut nav = navigator(REPERTOIRE);
        nav.step_forward_mainline();
        let e4 = nav.cursor();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            nav.jump_to(e4);
            seen.insert(nav.step_forward_random().expect("replies"));
        }
        assert_eq!(seen.len(), nav.tree().node(e4).children().len());
    }

    #[test]
    fn test_same_seed_same_choices() {
        let tree = GameTree::from_pgn(REPERTOIRE).expect("valid pgn");
        let mut first = Navigator::with_seed(tree.clone(), 9);
        let mut second = Navigator::with_seed(tree, 9);
        for _ in 0..10 {
            first.to_start();
            second.to_start();
            while let Some(id) = first.step_forward_random() {
                assert_eq!(second.step_forward_random(), Some(id));
            }
            assert_eq!(second.step_forward_random(), None);
        }
    }

    #[test]
    fn test_board_matches_replay_along_walk() {
        let mut nav = navigator(REPERTOIRE);
        loop {
            let board = nav.board();
            let replayed = replay(nav.tree(), nav.cursor()).expect("replay");
            assert_eq!(board.fen, position_fen(&replayed));
            if nav.step_forward_random().is_none() {
                break;
            }
        }
    }

    #[test]
    fn test_jump_to_unknown_node_is_refused() {
        let mut nav = navigator(SCENARIO);
        let other = GameTree::from_pgn(REPERTOIRE).expect("valid pgn");
        let far = other.ids().last().expect("nodes");
        assert!(!nav.jump_to(far));
        assert_eq!(nav.cursor(), nav.tree().root());
    }

    #[test]
    fn test_line_and_candidates() {
        let mut nav = navigator(REPERTOIRE);
        assert_eq!(nav.candidates(), vec!["e4"]);

        nav.apply_typed_move("e4").expect("e4");
        assert_eq!(nav.candidates(), vec!["e5", "c5", "c6"]);

        nav.apply_typed_move("c5").expect("c5");
        nav.apply_typed_move("Nf3").expect("Nf3");
        assert_eq!(nav.candidates(), vec!["d6", "Nc6", "e6"]);
        assert_eq!(nav.line(), vec!["e4", "c5", "Nf3"]);
    }
}
