//! MCTS search implementation.
//!
//! Each simulation runs four phases against a private copy of the board:
//! 1. Selection: descend by highest child score until an unexpanded node
//! 2. Evaluation: terminal leaves use the game result, others the evaluator
//! 3. Expansion: one child per prior returned by the evaluator
//! 4. Backup: propagate the value towards the root with alternating sign

use gomoku::{Board, BoardError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{ConfigError, MctsConfig};
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::tree::{MctsTree, TreeError, GREEDY_TEMPERATURE};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Game is already over")]
    GameOver,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Chosen action
    pub action: usize,

    /// Visit distribution over all actions at the configured temperature
    pub policy: Vec<f32>,

    /// Mean value of the chosen child, from the mover's point of view
    pub value: f32,

    /// Number of simulations performed
    pub simulations: u32,
}

/// MCTS search state.
///
/// The tree persists between searches. When tree reuse is enabled the
/// caller must report every move played on the real board through
/// [`advance_root`](Self::advance_root) so that the root keeps matching the
/// board passed to the next search.
pub struct MctsSearch<E: Evaluator> {
    tree: MctsTree,
    evaluator: E,
    config: MctsConfig,
    rng: ChaCha20Rng,
    num_actions: usize,
}

impl<E: Evaluator> MctsSearch<E> {
    pub fn new(evaluator: E, config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };

        Ok(Self {
            tree: MctsTree::new(config.c_puct),
            evaluator,
            config,
            rng,
            num_actions: 0,
        })
    }

    /// Run one selection/evaluation/expansion/backup cycle from `board`,
    /// which must be the position of the current root.
    pub fn run_simulation(&mut self, board: &Board) -> Result<(), SearchError> {
        self.num_actions = board.num_actions();

        let mut state = board.clone();
        let mut status = state.status();
        let mut node = self.tree.root();
        let mut depth = 0u32;

        while !self.tree.is_leaf(node) {
            let (action, child) = self.tree.select(node)?;
            status = state.play(action)?;
            node = child;
            depth += 1;
        }

        let value = if status.is_over() {
            // Stored from the point of view of the player who moved into the leaf
            status.value_for(state.to_move().opponent())
        } else {
            let eval = self.evaluator.evaluate(&state)?;
            if eval.priors.is_empty() {
                return Err(EvaluatorError::InvalidState(
                    "no priors for a position with legal moves".into(),
                )
                .into());
            }
            let cells = state.cells();
            let is_empty = |a: usize| cells.get(a).is_some_and(|c| c.is_empty());
            if let Some(&(action, _)) = eval.priors.iter().find(|&&(a, _)| !is_empty(a)) {
                return Err(EvaluatorError::InvalidState(format!(
                    "prior for illegal action {}",
                    action
                ))
                .into());
            }

            self.tree.expand(node, eval.priors)?;
            if node == self.tree.root() {
                self.add_dirichlet_noise();
            }
            -eval.value
        };

        self.tree.backup(node, value);

        trace!(
            leaf = node.0,
            depth,
            value,
            terminal = status.is_over(),
            "MCTS simulation complete"
        );

        Ok(())
    }

    /// Run the configured number of simulations and pick a move at the
    /// configured temperature. The tree is left rooted at `board`.
    ///
    /// The first failing simulation aborts the search; statistics from the
    /// simulations before it are kept.
    pub fn search(&mut self, board: &Board) -> Result<SearchResult, SearchError> {
        if board.is_game_over() {
            return Err(SearchError::GameOver);
        }

        if !self.tree.is_leaf(self.tree.root()) {
            self.add_dirichlet_noise();
        }

        for _ in 0..self.config.num_simulations {
            self.run_simulation(board)?;
        }

        let temperature = self.config.temperature;
        let policy = self.get_move_policy(temperature);
        let action = if temperature < GREEDY_TEMPERATURE {
            self.tree
                .best_action()
                .map(|(a, _)| a)
                .ok_or(SearchError::NoLegalMoves)?
        } else {
            sample_action(&policy, &mut self.rng)?
        };

        let value = self
            .tree
            .root_child(action)
            .map(|id| self.tree.get(id).action_value)
            .unwrap_or(0.0);

        debug!(
            action,
            value,
            simulations = self.config.num_simulations,
            tree_size = self.tree.len(),
            "MCTS search complete"
        );

        Ok(SearchResult {
            action,
            policy,
            value,
            simulations: self.config.num_simulations,
        })
    }

    /// Search, then move the root past the chosen action (or drop the tree
    /// when reuse is disabled).
    pub fn select_action(&mut self, board: &Board) -> Result<SearchResult, SearchError> {
        let result = self.search(board)?;
        if self.config.reuse_tree {
            self.advance_root(result.action);
        } else {
            self.reset();
        }
        Ok(result)
    }

    /// Visit distribution over all actions of the last searched board.
    ///
    /// The vector is sized by the board passed to the most recent
    /// [`run_simulation`](Self::run_simulation), so it is empty until a board
    /// has been searched.
    pub fn get_move_policy(&self, temperature: f32) -> Vec<f32> {
        self.tree.visit_policy(self.num_actions, temperature)
    }

    /// Follow a move played on the real board. Returns whether the existing
    /// subtree could be kept.
    pub fn advance_root(&mut self, action: usize) -> bool {
        let reused = self.config.reuse_tree && self.tree.advance_root(action);
        if !reused {
            self.tree.reset();
        }
        debug!(action, reused, tree_size = self.tree.len(), "Advanced root");
        reused
    }

    /// Discard the whole tree.
    pub fn reset(&mut self) {
        self.tree.reset();
    }

    /// Change the move-selection temperature for later searches.
    pub fn set_temperature(&mut self, temperature: f32) {
        self.config.temperature = temperature;
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }

    /// Add Dirichlet noise to root node priors for exploration.
    fn add_dirichlet_noise(&mut self) {
        if self.config.dirichlet_alpha <= 0.0 {
            return;
        }

        let children: Vec<_> = self
            .tree
            .get(self.tree.root())
            .children
            .iter()
            .map(|&(_, id)| id)
            .collect();
        if children.is_empty() {
            return;
        }

        let noise = dirichlet_noise(children.len(), self.config.dirichlet_alpha, &mut self.rng);
        let eps = self.config.dirichlet_epsilon;
        for (child_id, n) in children.into_iter().zip(noise) {
            let child = self.tree.get_mut(child_id);
            child.prior = (1.0 - eps) * child.prior + eps * n;
        }
    }
}

/// Sample an action from a probability distribution.
fn sample_action(policy: &[f32], rng: &mut ChaCha20Rng) -> Result<usize, SearchError> {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if r < cumsum {
            return Ok(i);
        }
    }

    // Fallback to last non-zero action (handles floating point issues)
    policy
        .iter()
        .rposition(|&p| p > 0.0)
        .ok_or(SearchError::NoLegalMoves)
}

/// Generate Dirichlet-distributed noise using Gamma variates.
fn dirichlet_noise(n: usize, alpha: f32, rng: &mut ChaCha20Rng) -> Vec<f32> {
    use rand_distr::{Distribution, Gamma};

    let uniform = vec![1.0 / n as f32; n];
    let Ok(gamma) = Gamma::new(alpha as f64, 1.0) else {
        return uniform;
    };
    let samples: Vec<f64> = (0..n).map(|_| gamma.sample(rng)).collect();

    let sum: f64 = samples.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        samples.into_iter().map(|s| (s / sum) as f32).collect()
    } else {
        uniform
    }
}

/// Convenience function to run a single MCTS search from a fresh tree.
pub fn run_mcts<E: Evaluator>(
    evaluator: E,
    config: MctsConfig,
    board: &Board,
) -> Result<SearchResult, SearchError> {
    let mut search = MctsSearch::new(evaluator, config)?;
    search.search(board)
}
