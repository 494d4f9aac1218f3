//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a `Vec` of slots and are referenced by [`NodeId`] indices.
//! A parent owns its children through the index list in `children`; the
//! `parent` index is a plain back-reference used to walk upwards. Slots freed
//! by [`MctsTree::advance_root`] are recycled, so ids of surviving nodes stay
//! stable across root transitions.

use thiserror::Error;

use crate::node::{NodeId, TreeNode};

/// Probability temperatures below this select the most visited action.
pub const GREEDY_TEMPERATURE: f32 = 1e-3;

/// Misuse of the tree by its caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("cannot select a child of unexpanded node {0:?}")]
    LeafSelection(NodeId),

    #[error("node {0:?} is already expanded")]
    DoubleExpansion(NodeId),
}

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes; `None` marks a free slot
    nodes: Vec<Option<TreeNode>>,

    /// Free slots available for reuse
    free: Vec<NodeId>,

    /// Current root node index
    root: NodeId,

    /// Exploration constant handed to every node
    c_puct: f32,
}

impl MctsTree {
    /// Create a tree holding a single unexpanded root.
    pub fn new(c_puct: f32) -> Self {
        Self {
            nodes: vec![Some(TreeNode::new_root(c_puct))],
            free: Vec::new(),
            root: NodeId(0),
            c_puct,
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn c_puct(&self) -> f32 {
        self.c_puct
    }

    /// Get a reference to a live node, `None` for freed or unknown ids.
    #[inline]
    pub fn try_get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// If `id` refers to a freed slot.
    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        match self.try_get(id) {
            Some(node) => node,
            None => panic!("node {:?} is not part of the tree", id),
        }
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// If `id` refers to a freed slot.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        match self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("node {:?} is not part of the tree", id),
        }
    }

    /// Allocate a node in a free slot (or at the end) and return its ID.
    fn allocate(&mut self, node: TreeNode) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(Some(node));
                id
            }
        }
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Check if tree is empty (never true: the root always exists).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_leaf()
    }

    /// Child with the highest score.
    ///
    /// Ties go to the earliest expanded child.
    pub fn select(&self, id: NodeId) -> Result<(usize, NodeId), TreeError> {
        let mut best: Option<(usize, NodeId, f32)> = None;
        for &(action, child_id) in &self.get(id).children {
            let score = self.get(child_id).score;
            match best {
                Some((_, _, best_score)) if score <= best_score => {}
                _ => best = Some((action, child_id, score)),
            }
        }

        best.map(|(action, child_id, _)| (action, child_id))
            .ok_or(TreeError::LeafSelection(id))
    }

    /// Create one child per `(action, prior)` pair.
    /// Returns the number of children created.
    pub fn expand(
        &mut self,
        id: NodeId,
        priors: impl IntoIterator<Item = (usize, f32)>,
    ) -> Result<usize, TreeError> {
        if !self.is_leaf(id) {
            return Err(TreeError::DoubleExpansion(id));
        }

        let c_puct = self.get(id).c_puct;
        let mut children = Vec::new();
        for (action, prior) in priors {
            let child_id = self.allocate(TreeNode::new_child(id, prior, c_puct));
            children.push((action, child_id));
        }

        let count = children.len();
        self.get_mut(id).children = children;
        Ok(count)
    }

    /// Propagate `value` from `leaf` towards the root.
    ///
    /// The leaf receives `value`, its parent `-value`, and so on. Updates run
    /// from the node just below the root down to the leaf, so each node sees
    /// its parent's visit count after the parent has taken this backup into
    /// account. The root itself is never updated.
    pub fn backup(&mut self, leaf: NodeId, value: f32) {
        let mut path = Vec::new();
        let mut current = leaf;
        loop {
            let parent = self.get(current).parent;
            if parent.is_none() {
                break;
            }
            path.push(current);
            current = parent;
        }

        for (depth, &id) in path.iter().enumerate().rev() {
            let signed = if depth % 2 == 0 { value } else { -value };
            let parent_visits = self.get(self.get(id).parent).visit_count;
            self.get_mut(id).update(signed, parent_visits);
        }
    }

    /// Child of `id` reached by `action`, if it was expanded.
    pub fn child(&self, id: NodeId, action: usize) -> Option<NodeId> {
        self.get(id).child(action)
    }

    /// Child of the root reached by `action`, if it was expanded.
    pub fn root_child(&self, action: usize) -> Option<NodeId> {
        self.child(self.root, action)
    }

    /// Make the root's child for `action` the new root and free every node
    /// outside its subtree.
    ///
    /// Returns `false` and falls back to a fresh single-node tree when that
    /// child was never expanded.
    pub fn advance_root(&mut self, action: usize) -> bool {
        let Some(child_id) = self.root_child(action) else {
            self.reset();
            return false;
        };

        self.get_mut(child_id).parent = NodeId::NONE;
        self.root = child_id;
        self.sweep_unreachable();
        true
    }

    /// Drop the whole tree and start again from an unexpanded root.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Some(TreeNode::new_root(self.c_puct)));
        self.root = NodeId(0);
    }

    /// Free every slot not reachable from the root.
    fn sweep_unreachable(&mut self) {
        let mut reachable = vec![false; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            reachable[id.index()] = true;
            stack.extend(self.get(id).children.iter().map(|&(_, child)| child));
        }

        for (index, slot) in self.nodes.iter_mut().enumerate() {
            if !reachable[index] && slot.is_some() {
                *slot = None;
                self.free.push(NodeId(index as u32));
            }
        }
    }

    /// Most visited root action, lowest action on ties.
    /// Returns (action, visit_count) or None if the root has no children.
    pub fn best_action(&self) -> Option<(usize, u32)> {
        self.get(self.root)
            .children
            .iter()
            .map(|&(action, id)| (action, self.get(id).visit_count))
            .max_by(|(a1, v1), (a2, v2)| v1.cmp(v2).then(a2.cmp(a1)))
    }

    /// Dense visit-count distribution over `num_actions` actions.
    ///
    /// Probabilities are proportional to `N^(1/temperature)`, computed as a
    /// softmax over `ln(N + 1e-10) / temperature` so that small temperatures
    /// do not overflow. Below [`GREEDY_TEMPERATURE`] all mass goes to
    /// [`best_action`](Self::best_action). Actions without a root child get 0.
    pub fn visit_policy(&self, num_actions: usize, temperature: f32) -> Vec<f32> {
        let mut policy = vec![0.0; num_actions];
        let root = self.get(self.root);
        if root.children.is_empty() {
            return policy;
        }

        if temperature < GREEDY_TEMPERATURE {
            if let Some(slot) = self
                .best_action()
                .and_then(|(action, _)| policy.get_mut(action))
            {
                *slot = 1.0;
            }
            return policy;
        }

        let logits: Vec<f64> = root
            .children
            .iter()
            .map(|&(_, id)| (self.get(id).visit_count as f64 + 1e-10).ln() / temperature as f64)
            .collect();
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = weights.iter().sum();

        for (&(action, _), w) in root.children.iter().zip(weights) {
            if let Some(slot) = policy.get_mut(action) {
                *slot = (w / total) as f32;
            }
        }
        policy
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            live_nodes: self.len(),
            free_slots: self.free.len(),
            root_children: root.children.len(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeStats {
    pub live_nodes: usize,
    pub free_slots: usize,
    pub root_children: usize,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Root with three children (actions 0, 1, 2); children 0 and 1 expanded
    /// with two children each.
    fn two_level_tree() -> MctsTree {
        let mut tree = MctsTree::new(1.0);
        let root = tree.root();
        tree.expand(root, [(0, 0.2), (1, 0.5), (2, 0.3)]).unwrap();

        let c0 = tree.root_child(0).unwrap();
        let c1 = tree.root_child(1).unwrap();
        tree.expand(c0, [(10, 0.5), (11, 0.5)]).unwrap();
        tree.expand(c1, [(20, 0.5), (21, 0.5)]).unwrap();
        tree
    }

    fn set_visits(tree: &mut MctsTree, visits: &[(usize, u32)]) {
        for &(action, n) in visits {
            let id = tree.root_child(action).unwrap();
            tree.get_mut(id).visit_count = n;
        }
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(5.0);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.is_leaf(tree.root()));
        assert!(tree.get(tree.root()).parent.is_none());
    }

    #[test]
    fn test_expand_creates_unvisited_children() {
        let mut tree = MctsTree::new(5.0);
        let root = tree.root();

        let count = tree.expand(root, [(3, 0.1), (8, 0.6), (9, 0.3)]).unwrap();

        assert_eq!(count, 3);
        assert_eq!(tree.len(), 4);
        let children = tree.get(root).children.clone();
        assert_eq!(children.len(), 3);
        for (_, id) in children {
            let child = tree.get(id);
            assert_eq!(child.visit_count, 0);
            assert_eq!(child.score, 0.0);
            assert_eq!(child.parent, root);
            assert!((child.c_puct - 5.0).abs() < 1e-6);
        }
        assert!((tree.get(tree.root_child(8).unwrap()).prior - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_double_expansion_is_rejected() {
        let mut tree = MctsTree::new(1.0);
        let root = tree.root();
        tree.expand(root, [(0, 1.0)]).unwrap();

        assert_eq!(
            tree.expand(root, [(1, 1.0)]),
            Err(TreeError::DoubleExpansion(root))
        );
        assert_eq!(tree.get(root).children.len(), 1);
    }

    #[test]
    fn test_select_on_leaf_is_rejected() {
        let tree = MctsTree::new(1.0);
        assert_eq!(
            tree.select(tree.root()),
            Err(TreeError::LeafSelection(tree.root()))
        );
    }

    #[test]
    fn test_select_returns_a_maximal_child() {
        let mut tree = MctsTree::new(1.0);
        let root = tree.root();
        tree.expand(root, [(0, 0.3), (1, 0.3), (2, 0.4)]).unwrap();

        let c1 = tree.root_child(1).unwrap();
        tree.get_mut(c1).score = 0.8;
        assert_eq!(tree.select(root).unwrap(), (1, c1));

        // Equal scores: any maximal child is acceptable
        let c2 = tree.root_child(2).unwrap();
        tree.get_mut(c2).score = 0.8;
        let (action, id) = tree.select(root).unwrap();
        assert!(action == 1 || action == 2);
        assert!((tree.get(id).score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_backup_skips_root_and_alternates_sign() {
        let mut tree = two_level_tree();
        let root = tree.root();
        let c0 = tree.root_child(0).unwrap();
        let leaf = tree.get(c0).child(11).unwrap();

        tree.backup(leaf, 1.0);

        let root_node = tree.get(root);
        assert_eq!(root_node.visit_count, 0);
        assert_eq!(root_node.action_value, 0.0);
        assert_eq!(root_node.score, 0.0);

        let child = tree.get(c0);
        assert_eq!(child.visit_count, 1);
        assert!((child.action_value - (-1.0)).abs() < 1e-6);
        // Root never accumulates visits, so first-level children see sqrt(0)
        assert_eq!(child.exploration_term, 0.0);

        let leaf_node = tree.get(leaf);
        assert_eq!(leaf_node.visit_count, 1);
        assert!((leaf_node.action_value - 1.0).abs() < 1e-6);
        // Parent was updated first: U = 1.0 * 0.5 * sqrt(1) / 2
        assert!((leaf_node.exploration_term - 0.25).abs() < 1e-6);
        assert!((leaf_node.score - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_backup_counts_along_deep_path() {
        let mut tree = MctsTree::new(1.0);
        let mut path = vec![tree.root()];
        for depth in 0..5 {
            let parent = *path.last().unwrap();
            tree.expand(parent, [(depth, 1.0)]).unwrap();
            path.push(tree.get(parent).children[0].1);
        }
        let leaf = *path.last().unwrap();

        for (i, value) in [0.5, -0.5, 0.5].into_iter().enumerate() {
            tree.backup(leaf, value);
            assert_eq!(tree.get(tree.root()).visit_count, 0);
            for &id in &path[1..] {
                assert_eq!(tree.get(id).visit_count as usize, i + 1);
            }
        }

        // Signs alternate with depth: leaf at depth 5 gets the mean of
        // the raw values, depth 4 its negation
        let mean = 0.5 / 3.0;
        assert!((tree.get(leaf).action_value - mean).abs() < 1e-6);
        assert!((tree.get(path[4]).action_value + mean).abs() < 1e-6);
    }

    #[test]
    fn test_backup_from_root_is_noop() {
        let mut tree = MctsTree::new(1.0);
        tree.backup(tree.root(), 1.0);
        assert_eq!(tree.get(tree.root()).visit_count, 0);
    }

    #[test]
    fn test_advance_root_keeps_only_chosen_subtree() {
        let mut tree = two_level_tree();
        let c1 = tree.root_child(1).unwrap();
        let subtree: Vec<NodeId> = std::iter::once(c1)
            .chain(tree.get(c1).children.iter().map(|&(_, id)| id))
            .collect();
        assert_eq!(tree.len(), 8);

        assert!(tree.advance_root(1));

        assert_eq!(tree.root(), c1);
        assert!(tree.get(c1).parent.is_none());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.stats().free_slots, 5);

        let (_, selected) = tree.select(tree.root()).unwrap();
        assert!(subtree.contains(&selected));
        assert!(tree.try_get(NodeId(0)).is_none());
    }

    #[test]
    fn test_advance_root_recycles_slots() {
        let mut tree = two_level_tree();
        assert!(tree.advance_root(1));

        let (_, grandchild) = tree.select(tree.root()).unwrap();
        tree.expand(grandchild, [(30, 0.5), (31, 0.5), (32, 0.0)])
            .unwrap();

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.stats().free_slots, 2);
        for &(_, id) in &tree.get(grandchild).children {
            assert!(id.index() < 8, "slot {:?} was not recycled", id);
        }
    }

    #[test]
    fn test_advance_root_missing_child_resets() {
        let mut tree = two_level_tree();
        assert!(!tree.advance_root(42));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.is_leaf(tree.root()));
        assert_eq!(tree.stats().free_slots, 0);
    }

    #[test]
    fn test_advance_root_preserves_statistics() {
        let mut tree = two_level_tree();
        let c1 = tree.root_child(1).unwrap();
        let leaf = tree.get(c1).child(20).unwrap();
        tree.backup(leaf, 0.5);
        tree.backup(leaf, 0.5);

        tree.advance_root(1);

        assert_eq!(tree.get(tree.root()).visit_count, 2);
        assert_eq!(tree.get(leaf).visit_count, 2);
        assert!((tree.get(leaf).action_value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_visit_policy_proportional() {
        let mut tree = two_level_tree();
        set_visits(&mut tree, &[(0, 30), (1, 70), (2, 0)]);

        let policy = tree.visit_policy(5, 1.0);
        assert_eq!(policy.len(), 5);
        assert!((policy[0] - 0.3).abs() < 1e-5);
        assert!((policy[1] - 0.7).abs() < 1e-5);
        assert!(policy[2].abs() < 1e-6);
        assert_eq!(&policy[3..], &[0.0, 0.0]);
        assert!((policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_visit_policy_sharpens_with_temperature() {
        let mut tree = two_level_tree();
        set_visits(&mut tree, &[(0, 1), (1, 2), (2, 1)]);

        // T = 0.5 squares the counts: 1, 4, 1
        let policy = tree.visit_policy(3, 0.5);
        assert!((policy[0] - 1.0 / 6.0).abs() < 1e-5);
        assert!((policy[1] - 4.0 / 6.0).abs() < 1e-5);
        assert!((policy[2] - 1.0 / 6.0).abs() < 1e-5);

        // Tiny temperatures do not overflow
        let sharp = tree.visit_policy(3, 0.01);
        assert!((sharp[1] - 1.0).abs() < 1e-5);
        assert!(sharp.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_visit_policy_greedy() {
        let mut tree = two_level_tree();
        set_visits(&mut tree, &[(0, 5), (1, 9), (2, 3)]);

        let policy = tree.visit_policy(3, 0.0);
        assert_eq!(policy, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_visit_policy_greedy_tie_picks_lowest_action() {
        let mut tree = MctsTree::new(1.0);
        let root = tree.root();
        tree.expand(root, [(7, 0.5), (2, 0.25), (5, 0.25)]).unwrap();
        set_visits(&mut tree, &[(7, 4), (2, 1), (5, 4)]);

        assert_eq!(tree.best_action(), Some((5, 4)));
        let policy = tree.visit_policy(9, 0.0);
        assert_eq!(policy[5], 1.0);
        assert_eq!(policy.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_visit_policy_unexpanded_root() {
        let tree = MctsTree::new(1.0);
        assert_eq!(tree.visit_policy(4, 1.0), vec![0.0; 4]);
        assert_eq!(tree.best_action(), None);
    }

    #[test]
    fn test_tree_stats() {
        let tree = two_level_tree();
        let stats = tree.stats();
        assert_eq!(stats.live_nodes, 8);
        assert_eq!(stats.free_slots, 0);
        assert_eq!(stats.root_children, 3);
        assert_eq!(stats.max_depth, 2);
    }
}
