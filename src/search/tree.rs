//! Arena-based search tree.
//!
//! Nodes are stored in a flat `Vec<Node>` and referenced by [`NodeId`]. With
//! unification enabled the tree becomes a DAG: a node reached by the same
//! `(parent state, move)` from two places is shared, keeps a parent list, and
//! backpropagation follows every parent path.

use log::debug;
use rustc_hash::FxHashMap;

use super::node::{ChildSlots, Node, NodeId};
use super::reward::{RewardCache, RewardFn};
use crate::core::PlayerId;
use crate::error::{Error, Result};
use crate::rules::Game;

/// Arena-based search tree.
#[derive(Clone, Debug)]
pub struct SearchTree<G: Game> {
    /// All nodes in the tree.
    nodes: Vec<Node<G>>,

    /// The root node ID.
    root: NodeId,

    /// `(parent state hash, move) -> child`, present when unification is on.
    unification: Option<FxHashMap<(u64, G::Move), NodeId>>,

    /// Number of times an existing node was adopted by a new parent.
    unified: u32,
}

impl<G: Game> SearchTree<G> {
    /// Create a tree holding only a root for `game`.
    pub fn new(game: G, player: PlayerId, unify: bool) -> Self {
        Self {
            nodes: vec![Node::root(game, player)],
            root: NodeId::new(0),
            unification: unify.then(FxHashMap::default),
            unified: 0,
        }
    }

    /// Get the root node ID.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.index()]
    }

    /// Get the root node.
    #[must_use]
    pub fn root_node(&self) -> &Node<G> {
        self.get(self.root)
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether nodes are unified by state.
    #[must_use]
    pub fn unifies(&self) -> bool {
        self.unification.is_some()
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<G>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    fn alloc(&mut self, node: Node<G>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // === Child Slots ===

    /// Child slots of a node, built on first access from the node's own game.
    ///
    /// With unification on, slots whose `(state, move)` already has a node
    /// elsewhere are filled with that node. It gains this node as a parent and
    /// its statistics are credited up this node's ancestor chain.
    pub fn child_slots(&mut self, id: NodeId) -> &ChildSlots<G::Move> {
        self.ensure_slots(id);
        self.nodes[id.index()]
            .slots
            .get_or_insert_with(|| ChildSlots::new(Vec::new()))
    }

    fn ensure_slots(&mut self, id: NodeId) {
        if self.get(id).slots.is_some() {
            return;
        }

        let node = self.get(id);
        let mut slots = ChildSlots::new(node.game.possible_moves());
        let mut adopted = Vec::new();

        if let Some(index) = &self.unification {
            let hash = node.game.unique_state_hash();
            for (slot, mv) in slots.moves.iter().enumerate() {
                if let Some(&existing) = index.get(&(hash, mv.clone())) {
                    slots.children[slot] = Some(existing);
                    adopted.push(existing);
                }
            }
        }

        self.get_mut(id).slots = Some(slots);

        for existing in adopted {
            let (wins, visits, avails) = {
                let node = self.get(existing);
                (node.wins, node.visits, node.avails)
            };
            self.for_each_ancestor(id, |node| {
                node.wins += wins;
                node.visits += visits;
                node.avails += avails;
            });
            self.get_mut(existing).parents.push(id);
            self.unified += 1;
        }
    }

    /// Apply `update` to `from` and every node above it, once per parent path.
    fn for_each_ancestor(&mut self, from: NodeId, mut update: impl FnMut(&mut Node<G>)) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = self.get_mut(id);
            update(node);
            stack.extend(node.parents.iter().copied());
        }
    }

    /// A node is terminal when its own game has no legal moves.
    pub fn is_terminal(&mut self, id: NodeId) -> bool {
        self.child_slots(id).is_empty()
    }

    /// Moves legal in `live` that have no child yet.
    ///
    /// Fails if a live move is missing from the node's slot list: the
    /// determinization produced a move the node's own game says is impossible.
    pub fn untried_moves(&mut self, id: NodeId, live: &G) -> Result<Vec<G::Move>> {
        let slots = self.child_slots(id);
        let mut untried = Vec::new();
        for mv in live.possible_moves() {
            match slots.position(&mv) {
                Some(slot) if slots.children[slot].is_none() => untried.push(mv),
                Some(_) => {}
                None => return Err(Error::IncoherentDeterminization(format!("{mv:?}"))),
            }
        }
        Ok(untried)
    }

    /// Slot index of `mv` at node `id`.
    pub fn slot_index(&mut self, id: NodeId, mv: &G::Move) -> Result<usize> {
        self.child_slots(id)
            .position(mv)
            .ok_or_else(|| Error::IncoherentDeterminization(format!("{mv:?}")))
    }

    /// Create the child for slot `slot` of `parent`, played by `player`.
    pub fn create_child(&mut self, parent: NodeId, slot: usize, player: PlayerId) -> Result<NodeId> {
        self.ensure_slots(parent);

        let parent_node = self.get(parent);
        let mv = parent_node
            .slots
            .as_ref()
            .and_then(|s| s.moves.get(slot))
            .cloned()
            .ok_or(Error::NoLegalMoves)?;

        let mut game = parent_node.game.clone();
        game.perform_move(&mv)?;
        let key = self
            .unification
            .as_ref()
            .map(|_| (parent_node.game.unique_state_hash(), mv.clone()));
        let depth = parent_node.depth + 1;

        let child = self.alloc(Node::child(game, parent, mv, player, depth));

        if let Some(slots) = self.get_mut(parent).slots.as_mut() {
            slots.children[slot] = Some(child);
        }
        if let (Some(index), Some(key)) = (self.unification.as_mut(), key) {
            index.insert(key, child);
        }

        Ok(child)
    }

    // === Backpropagation ===

    /// Credit a finished game to `leaf` and every ancestor, following every
    /// parent of unified nodes.
    ///
    /// `visit` runs once per updated node with the reward it received; the
    /// statistics-driven rollout policies learn from it.
    pub fn backpropagate(
        &mut self,
        leaf: NodeId,
        finished: &G,
        reward_fn: RewardFn,
        mut visit: impl FnMut(&Self, NodeId, f64),
    ) -> Result<()> {
        let mut rewards = RewardCache::new(finished.player_count());
        let mut stack = vec![leaf];

        while let Some(id) = stack.pop() {
            let player = self.get(id).player;
            let reward = rewards.get(reward_fn, finished, player)?;

            let node = self.get_mut(id);
            node.visits += 1;
            node.wins += reward;
            stack.extend(node.parents.iter().copied());

            visit(self, id, reward);
        }

        Ok(())
    }

    /// The last `n` moves leading to `id`, oldest first, following first
    /// parents. `None` if fewer than `n` moves separate `id` from the root.
    #[must_use]
    pub fn path_moves(&self, id: NodeId, n: usize) -> Option<Vec<G::Move>> {
        let moves = self.recent_moves(id, n);
        (moves.len() == n).then_some(moves)
    }

    /// Up to `n` moves leading to `id`, oldest first.
    #[must_use]
    pub fn recent_moves(&self, id: NodeId, n: usize) -> Vec<G::Move> {
        let mut moves = Vec::with_capacity(n);
        let mut current = Some(id);
        while moves.len() < n {
            let Some(node) = current.map(|c| self.get(c)) else {
                break;
            };
            let Some(mv) = &node.mv else {
                break;
            };
            moves.push(mv.clone());
            current = node.parents.first().copied();
        }
        moves.reverse();
        moves
    }

    // === Tree Reuse ===

    /// Carry the part of this tree reached by `moves` into a new search.
    ///
    /// The reached node becomes the root of a compacted tree: it loses its
    /// parents and move, takes `game` as its snapshot and `player` as its
    /// owner, and drops slots for moves that are no longer legal. Returns
    /// `None` if the walk leaves the expanded tree.
    pub fn detach_subtree(self, moves: &[G::Move], game: G, player: PlayerId) -> Option<Self> {
        let mut current = self.root;
        for mv in moves {
            current = self.get(current).slots.as_ref()?.child(mv)?;
        }
        self.get(current).slots.as_ref()?;

        let unify = self.unification.is_some();
        let base_depth = self.get(current).depth;
        let legal = game.possible_moves();

        let mut old: Vec<Option<Node<G>>> = self.nodes.into_iter().map(Some).collect();
        let mut root = old[current.index()].take()?;
        root.parents.clear();
        root.mv = None;
        root.game = game;
        root.player = player;
        if let Some(slots) = root.slots.as_mut() {
            slots.retain(|m| legal.contains(m));
        }
        old[current.index()] = Some(root);

        // Breadth-first renumbering of everything still reachable.
        let mut remap: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        let mut order = vec![current];
        remap.insert(current, NodeId::new(0));
        let mut next = 0;
        while next < order.len() {
            let id = order[next];
            next += 1;
            let children: Vec<NodeId> = old[id.index()]
                .as_ref()
                .and_then(|n| n.slots.as_ref())
                .map(|s| s.children.iter().flatten().copied().collect())
                .unwrap_or_default();
            for child in children {
                if !remap.contains_key(&child) {
                    remap.insert(child, NodeId::new(order.len() as u32));
                    order.push(child);
                }
            }
        }

        let mut nodes = Vec::with_capacity(order.len());
        for id in &order {
            let mut node = old[id.index()].take()?;
            node.parents = node.parents.iter().filter_map(|p| remap.get(p).copied()).collect();
            node.depth = node.depth.saturating_sub(base_depth);
            if let Some(slots) = node.slots.as_mut() {
                for slot in slots.children.iter_mut() {
                    *slot = slot.and_then(|child| remap.get(&child).copied());
                }
            }
            nodes.push(node);
        }

        let mut tree = Self {
            nodes,
            root: NodeId::new(0),
            unification: None,
            unified: 0,
        };
        if unify {
            tree.rebuild_unification();
        }

        debug!(
            "detached subtree: {} nodes, {} root visits",
            tree.len(),
            tree.root_node().visits
        );
        Some(tree)
    }

    fn rebuild_unification(&mut self) {
        let mut index = FxHashMap::default();
        for node in &self.nodes {
            if let Some(slots) = &node.slots {
                let hash = node.game.unique_state_hash();
                for (mv, child) in slots.expanded() {
                    index.insert((hash, mv.clone()), child);
                }
            }
        }
        self.unification = Some(index);
    }

    /// Get statistics about the tree.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let total_slots: usize = self
            .nodes
            .iter()
            .filter_map(|n| n.slots.as_ref())
            .map(ChildSlots::len)
            .sum();
        let expanded_slots: usize = self
            .nodes
            .iter()
            .filter_map(|n| n.slots.as_ref())
            .map(|s| s.expanded().count())
            .sum();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            total_slots,
            expanded_slots,
            unified: self.unified,
        }
    }
}

/// Statistics about the search tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    /// Total number of nodes.
    pub node_count: usize,

    /// Maximum depth reached.
    pub max_depth: u16,

    /// Child slots built across all nodes.
    pub total_slots: usize,

    /// Child slots holding a node.
    pub expanded_slots: usize,

    /// Nodes adopted by an extra parent.
    pub unified: u32,
}

impl TreeStats {
    /// Get the branching factor (average slots per node).
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.total_slots as f64 / self.node_count as f64
        }
    }

    /// Get the expansion ratio (expanded slots / total slots).
    #[must_use]
    pub fn expansion_ratio(&self) -> f64 {
        if self.total_slots == 0 {
            0.0
        } else {
            self.expanded_slots as f64 / self.total_slots as f64
        }
    }
}
