use super::types::GameHeaders;
use shakmaty::{Chess, Move, Position, san::SanPlus};
use smallvec::SmallVec;
use std::fmt;

pub type Children = SmallVec<[NodeId; 4]>;

/// Stable index of a node inside a [`GameTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The edge leading into a node.
#[derive(Debug, Clone)]
pub struct PlayedMove {
    /// SAN exactly as recorded (check suffix included).
    pub san: SanPlus,
    pub mv: Move,
}

#[derive(Debug, Clone)]
pub struct MoveNode {
    parent: Option<NodeId>,
    children: Children,
    played: Option<PlayedMove>,
    position: Chess,
    ply: u32,
    pub(crate) comment: Option<String>,
    pub(crate) starting_comment: Option<String>,
    pub(crate) nags: SmallVec<[u8; 2]>,
}

impl MoveNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mainline_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn played(&self) -> Option<&PlayedMove> {
        self.played.as_ref()
    }

    pub fn san(&self) -> Option<&SanPlus> {
        self.played.as_ref().map(|p| &p.san)
    }

    /// Position after the move that produced this node.
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Half-moves from the start position.
    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn starting_comment(&self) -> Option<&str> {
        self.starting_comment.as_deref()
    }

    pub fn nags(&self) -> &[u8] {
        &self.nags
    }
}

/// One parsed game as an arena of nodes. Children are always pushed after
/// their parent, so every parent index is smaller than its child's and the
/// parent chain cannot cycle.
#[derive(Debug, Clone)]
pub struct GameTree {
    headers: GameHeaders,
    nodes: Vec<MoveNode>,
}

impl GameTree {
    pub fn new(headers: GameHeaders, start: Chess) -> Self {
        let root = MoveNode {
            parent: None,
            children: Children::new(),
            played: None,
            position: start,
            ply: 0,
            comment: None,
            starting_comment: None,
            nags: SmallVec::new(),
        };
        Self {
            headers,
            nodes: vec![root],
        }
    }

    /// Append `mv` below `parent`. If the same move already exists there, the
    /// existing child is returned instead of duplicating the edge.
    pub(crate) fn add_child(&mut self, parent: NodeId, san: SanPlus, mv: Move) -> NodeId {
        if let Some(existing) = self.find_child(parent, &mv) {
            return existing;
        }

        let parent_node = &self.nodes[parent.index()];
        let mut position = parent_node.position.clone();
        position.play_unchecked(mv.clone());
        let ply = parent_node.ply + 1;

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(MoveNode {
            parent: Some(parent),
            children: Children::new(),
            played: Some(PlayedMove { san, mv }),
            position,
            ply,
            comment: None,
            starting_comment: None,
            nags: SmallVec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn headers_mut(&mut self) -> &mut GameHeaders {
        &mut self.headers
    }

    pub fn headers(&self) -> &GameHeaders {
        &self.headers
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn start_position(&self) -> &Chess {
        &self.nodes[0].position
    }

    pub fn find_child(&self, parent: NodeId, mv: &Move) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).played.as_ref().is_some_and(|p| &p.mv == mv))
    }

    /// True when `id` is the first child of its parent (the root counts too).
    pub fn is_mainline_edge(&self, id: NodeId) -> bool {
        match self.node(id).parent {
            Some(parent) => self.node(parent).mainline_child() == Some(id),
            None => true,
        }
    }

    /// Nodes from the root down to `id`, both included.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Recorded SANs from the root down to `id`.
    pub fn line_to(&self, id: NodeId) -> Vec<&SanPlus> {
        self.path_to(id)
            .into_iter()
            .filter_map(|node| self.node(node).san())
            .collect()
    }

    /// The mainline below the root, in order.
    pub fn mainline(&self) -> Mainline<'_> {
        Mainline {
            tree: self,
            next: self.node(NodeId::ROOT).mainline_child(),
        }
    }

    /// Move number label for the edge into `id`: `"3."` for White,
    /// `"3..."` for Black. `None` at the root.
    pub fn move_number(&self, id: NodeId) -> Option<String> {
        let parent = self.node(id).parent?;
        let before = &self.node(parent).position;
        let number = before.fullmoves().get();
        Some(if before.turn().is_white() {
            format!("{}.", number)
        } else {
            format!("{}...", number)
        })
    }

    /// `"3... Nc6"` style label of the edge into `id`.
    pub fn move_label(&self, id: NodeId) -> Option<String> {
        let san = self.node(id).san()?;
        let number = self.move_number(id)?;
        Some(format!("{} {}", number, san))
    }
}

pub struct Mainline<'a> {
    tree: &'a GameTree,
    next: Option<NodeId>,
}

impl Iterator for Mainline<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.node(current).mainline_child();
        Some(current)
    }
}
