//! Monte Carlo Tree Search (MCTS) for AlphaZero-style five-in-a-row play.
//!
//! # Overview
//!
//! MCTS builds a statistics tree by running simulations. Each simulation
//! consists of four phases:
//!
//! 1. **Selection**: descend from the root, always taking the child with the
//!    highest score `U + Q`
//! 2. **Evaluation**: a finished game is scored directly; any other leaf is
//!    handed to an [`Evaluator`] for priors and a value
//! 3. **Expansion**: the leaf gets one child per legal action, carrying the
//!    evaluator's prior
//! 4. **Backup**: the value is folded into every node on the path below the
//!    root, flipping sign at each level
//!
//! Node statistics are stored from the point of view of the player who made
//! the move leading to the node. The root's own statistics are never updated.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gomoku::Board;
//! use mcts::{MctsConfig, MctsSearch, RolloutEvaluator};
//!
//! let mut board = Board::new(15)?;
//! let mut search = MctsSearch::new(RolloutEvaluator::new(225, 7), MctsConfig::for_play())?;
//!
//! let result = search.select_action(&board)?;
//! board.play(result.action)?;
//!
//! // Opponent replies; keep the matching subtree
//! board.play(opponent_action)?;
//! search.advance_root(opponent_action);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `num_simulations`: Number of simulations per search (default: 400)
//! - `c_puct`: Exploration constant (default: 5.0)
//! - `temperature`: Move selection temperature (1.0 = proportional, 0.0 = greedy)
//! - `dirichlet_alpha`: Root noise parameter, 0.0 disables noise
//! - `reuse_tree`: Keep the chosen subtree between moves

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{ConfigError, MctsConfig};
pub use evaluator::{EvalResult, Evaluator, EvaluatorError, RolloutEvaluator, UniformEvaluator};
pub use node::{NodeId, TreeNode};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult};
pub use tree::{MctsTree, TreeError, TreeStats, GREEDY_TEMPERATURE};
