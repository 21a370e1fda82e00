//! Search tree vertices.
//!
//! Nodes live in a [`SearchTree`](super::SearchTree) arena and refer to each
//! other by [`NodeId`]. Each node owns a snapshot of the game *after* its
//! move, so child slots can be built lazily from that snapshot's legal moves.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;
use crate::rules::Game;

/// Index into the search tree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Child slots of a node, indexed like the node's own legal moves.
///
/// A slot is `None` until the move has been expanded at least once.
#[derive(Clone, Debug)]
pub struct ChildSlots<M> {
    pub moves: Vec<M>,
    pub children: Vec<Option<NodeId>>,
}

impl<M: PartialEq> ChildSlots<M> {
    pub fn new(moves: Vec<M>) -> Self {
        let children = vec![None; moves.len()];
        Self { moves, children }
    }

    /// Slot index of a move.
    #[must_use]
    pub fn position(&self, mv: &M) -> Option<usize> {
        self.moves.iter().position(|m| m == mv)
    }

    /// Child reached by a move, if expanded.
    #[must_use]
    pub fn child(&self, mv: &M) -> Option<NodeId> {
        self.position(mv).and_then(|i| self.children[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Indices of slots not expanded yet.
    pub fn unexpanded(&self) -> impl Iterator<Item = usize> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| i)
    }

    /// (move, child) pairs of expanded slots.
    pub fn expanded(&self) -> impl Iterator<Item = (&M, NodeId)> + '_ {
        self.moves
            .iter()
            .zip(&self.children)
            .filter_map(|(m, c)| c.map(|id| (m, id)))
    }

    /// Keep only the slots whose move satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&M) -> bool) {
        let (moves, children) = self
            .moves
            .drain(..)
            .zip(self.children.drain(..))
            .filter(|(m, _)| keep(m))
            .unzip();
        self.moves = moves;
        self.children = children;
    }
}

/// A vertex of the search tree (a DAG once unification is on).
#[derive(Clone, Debug)]
pub struct Node<G: Game> {
    /// Game snapshot after `mv` was played.
    pub game: G,

    /// Parent nodes. Empty for the root, more than one for unified nodes.
    pub parents: SmallVec<[NodeId; 2]>,

    /// Move that produced this node (`None` at the root).
    pub mv: Option<G::Move>,

    /// Seat that played `mv`; rewards are credited from its point of view.
    pub player: PlayerId,

    /// Depth in tree (root = 0).
    pub depth: u16,

    /// Accumulated reward.
    pub wins: f64,

    /// Times a simulation passed through this node.
    pub visits: u32,

    /// Times this node was selectable from a parent. Starts at 1.
    pub avails: u32,

    pub(crate) slots: Option<ChildSlots<G::Move>>,
}

impl<G: Game> Node<G> {
    /// Create a root node.
    pub fn root(game: G, player: PlayerId) -> Self {
        Self {
            game,
            parents: SmallVec::new(),
            mv: None,
            player,
            depth: 0,
            wins: 0.0,
            visits: 0,
            avails: 1,
            slots: None,
        }
    }

    /// Create a node reached from `parent` by `mv`. `game` must already
    /// reflect the move.
    pub fn child(game: G, parent: NodeId, mv: G::Move, player: PlayerId, depth: u16) -> Self {
        let mut parents = SmallVec::new();
        parents.push(parent);
        Self {
            game,
            parents,
            mv: Some(mv),
            player,
            depth,
            wins: 0.0,
            visits: 0,
            avails: 1,
            slots: None,
        }
    }

    /// Mean reward, 0 when unvisited.
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / f64::from(self.visits)
        }
    }

    /// Child slots, if they have been built.
    #[must_use]
    pub fn slots(&self) -> Option<&ChildSlots<G::Move>> {
        self.slots.as_ref()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(5);
        assert_eq!(id.raw(), 5);
        assert_eq!(format!("{}", id), "NodeId(5)");
    }

    #[test]
    fn test_child_slots() {
        let mut slots = ChildSlots::new(vec!['a', 'b', 'c']);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.unexpanded().collect::<Vec<_>>(), vec![0, 1, 2]);

        slots.children[1] = Some(NodeId::new(7));
        assert_eq!(slots.child(&'b'), Some(NodeId::new(7)));
        assert_eq!(slots.child(&'a'), None);
        assert_eq!(slots.position(&'z'), None);
        assert_eq!(slots.unexpanded().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(slots.expanded().collect::<Vec<_>>(), vec![(&'b', NodeId::new(7))]);
    }

    #[test]
    fn test_child_slots_retain_keeps_alignment() {
        let mut slots = ChildSlots::new(vec![1, 2, 3, 4]);
        slots.children[2] = Some(NodeId::new(9));

        slots.retain(|m| *m != 2);

        assert_eq!(slots.moves, vec![1, 3, 4]);
        assert_eq!(slots.children, vec![None, Some(NodeId::new(9)), None]);
    }
}
