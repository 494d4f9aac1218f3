//! MCTS tree node representation.
//!
//! Each node represents the position reached by playing `action` from its
//! parent. Its statistics are kept from the point of view of the player who
//! made that move, i.e. the player to move at the parent.

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Parent node index (NONE for root). Never owns the parent.
    pub parent: NodeId,

    /// Prior probability P(s,a) assigned by the evaluator when the parent
    /// was expanded.
    pub prior: f32,

    /// Number of backups applied to this node, N(s,a).
    pub visit_count: u32,

    /// Running mean of backed-up values, Q(s,a).
    pub action_value: f32,

    /// Exploration bonus U(s,a), refreshed on every update.
    pub exploration_term: f32,

    /// U + Q, compared between siblings during selection.
    pub score: f32,

    /// Exploration constant, inherited from the tree configuration.
    pub c_puct: f32,

    /// Children as (action, NodeId) pairs in expansion order.
    /// Empty until the node is expanded.
    pub children: Vec<(usize, NodeId)>,
}

impl TreeNode {
    /// Create a new root node.
    pub fn new_root(c_puct: f32) -> Self {
        Self::new_child(NodeId::NONE, 1.0, c_puct)
    }

    /// Create a new, unvisited child node.
    pub fn new_child(parent: NodeId, prior: f32, c_puct: f32) -> Self {
        Self {
            parent,
            prior,
            visit_count: 0,
            action_value: 0.0,
            exploration_term: 0.0,
            score: 0.0,
            c_puct,
            children: Vec::new(),
        }
    }

    /// Fold one backed-up value into the statistics.
    ///
    /// `parent_visits` must be the parent's visit count *after* the parent
    /// has processed the same backup.
    ///
    /// ```text
    /// Q = (N * Q + v) / (N + 1)
    /// N = N + 1
    /// U = c_puct * P * sqrt(N_parent) / (1 + N)
    /// score = U + Q
    /// ```
    #[inline]
    pub fn update(&mut self, value: f32, parent_visits: u32) {
        let n = self.visit_count as f32;
        self.action_value = (n * self.action_value + value) / (n + 1.0);
        self.visit_count += 1;
        self.exploration_term = self.c_puct * self.prior * (parent_visits as f32).sqrt()
            / (1.0 + self.visit_count as f32);
        self.score = self.exploration_term + self.action_value;
    }

    /// Check if this is a leaf node (never expanded).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child reached by `action`, if it was expanded.
    pub fn child(&self, action: usize) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, id)| *id)
    }
}
