//! Evaluator trait for position evaluation.
//!
//! The evaluator provides priors over the legal actions and a value estimate
//! for a board. In AlphaZero this is a neural network; the evaluators here
//! need no model and are used for testing and model-free play.

use std::sync::Mutex;

use gomoku::{Board, BoardError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

impl From<BoardError> for EvaluatorError {
    fn from(err: BoardError) -> Self {
        EvaluatorError::InvalidState(err.to_string())
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// (action, probability) for every legal action, in the order children
    /// should be created.
    pub priors: Vec<(usize, f32)>,

    /// Value estimate for the player to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win).
    pub value: f32,
}

impl EvalResult {
    /// Equal priors over the legal actions of `board`.
    pub fn uniform(board: &Board, value: f32) -> Self {
        let legal = board.legal_actions();
        let prob = if legal.is_empty() {
            0.0
        } else {
            1.0 / legal.len() as f32
        };
        Self {
            priors: legal.into_iter().map(|a| (a, prob)).collect(),
            value,
        }
    }
}

/// Trait for position evaluators.
///
/// Called once for every newly reached non-terminal leaf. Errors abort the
/// simulation that triggered them.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board) -> Result<EvalResult, EvaluatorError>;
}

impl<F> Evaluator for F
where
    F: Fn(&Board) -> Result<EvalResult, EvaluatorError> + Send + Sync,
{
    fn evaluate(&self, board: &Board) -> Result<EvalResult, EvaluatorError> {
        self(board)
    }
}

/// Uniform evaluator that assigns equal probability to all legal moves.
/// Value is always 0.0 (neutral). Useful for testing MCTS without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, board: &Board) -> Result<EvalResult, EvaluatorError> {
        Ok(EvalResult::uniform(board, 0.0))
    }
}

/// Random rollout evaluator: uniform priors, value from one random playout.
#[derive(Debug)]
pub struct RolloutEvaluator {
    /// Maximum number of random moves per playout. Unfinished playouts
    /// count as draws.
    pub max_depth: u32,

    rng: Mutex<ChaCha20Rng>,
}

impl Default for RolloutEvaluator {
    fn default() -> Self {
        Self::new(100, 0)
    }
}

impl RolloutEvaluator {
    pub fn new(max_depth: u32, seed: u64) -> Self {
        Self {
            max_depth,
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Play random moves from `board` and return the outcome for the player
    /// to move at `board`.
    fn rollout(&self, board: &Board) -> Result<f32, EvaluatorError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| EvaluatorError::EvaluationFailed("rollout rng lock poisoned".into()))?;

        let perspective = board.to_move();
        let mut state = board.clone();
        let mut status = state.status();
        let mut depth = 0;

        while !status.is_over() && depth < self.max_depth {
            let legal = state.legal_actions();
            let Some(&action) = legal.choose(&mut *rng) else {
                break;
            };
            status = state.play(action)?;
            depth += 1;
        }

        Ok(status.value_for(perspective))
    }
}

impl Evaluator for RolloutEvaluator {
    fn evaluate(&self, board: &Board) -> Result<EvalResult, EvaluatorError> {
        let value = self.rollout(board)?;
        Ok(EvalResult::uniform(board, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_evaluator() {
        let eval = UniformEvaluator::new();

        let mut rows = vec![[0u8; 5]; 5];
        rows[0] = [1, 2, 0, 0, 0];
        let board = Board::from_rows(&rows, None).unwrap();
        let result = eval.evaluate(&board).unwrap();

        // 23 empty cells
        assert_eq!(result.priors.len(), 23);
        let expected_prob = 1.0 / 23.0;
        for &(_, p) in &result.priors {
            assert!((p - expected_prob).abs() < 1e-6);
        }

        // Occupied cells are not offered
        assert!(result.priors.iter().all(|&(a, _)| a != 0 && a != 1));
        assert_eq!(result.priors[0].0, 2);

        // Value should be neutral
        assert!((result.value).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_evaluator_finished_game() {
        let eval = UniformEvaluator::new();

        let mut rows = vec![[0u8; 5]; 5];
        rows[0] = [1, 1, 1, 1, 1];
        rows[1] = [2, 2, 2, 2, 0];
        let board = Board::from_rows(&rows, None).unwrap();
        let result = eval.evaluate(&board).unwrap();

        assert!(result.priors.is_empty());
        assert!((result.value).abs() < 1e-6);
    }

    #[test]
    fn test_closure_evaluator() {
        let eval = |board: &Board| -> Result<EvalResult, EvaluatorError> {
            Ok(EvalResult::uniform(board, 0.5))
        };

        let board = Board::new(5).unwrap();
        let result = eval.evaluate(&board).unwrap();
        assert_eq!(result.priors.len(), 25);
        assert!((result.value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rollout_values_in_range() {
        let eval = RolloutEvaluator::new(50, 7);
        let board = Board::new(7).unwrap();

        for _ in 0..20 {
            let result = eval.evaluate(&board).unwrap();
            assert!(
                result.value == -1.0 || result.value == 0.0 || result.value == 1.0,
                "unexpected rollout value {}",
                result.value
            );
            assert_eq!(result.priors.len(), 49);
        }
    }

    #[test]
    fn test_rollout_is_deterministic_per_seed() {
        let board = Board::new(9).unwrap();
        let a = RolloutEvaluator::new(81, 42);
        let b = RolloutEvaluator::new(81, 42);

        for _ in 0..10 {
            assert_eq!(
                a.evaluate(&board).unwrap().value,
                b.evaluate(&board).unwrap().value
            );
        }
    }

    #[test]
    fn test_rollout_zero_depth_is_draw() {
        let eval = RolloutEvaluator::new(0, 1);
        let board = Board::new(5).unwrap();
        assert_eq!(eval.evaluate(&board).unwrap().value, 0.0);
    }

    #[test]
    fn test_rollout_on_won_position_reports_loss_for_player_to_move() {
        let eval = RolloutEvaluator::new(10, 3);
        let mut rows = vec![[0u8; 5]; 5];
        rows[0] = [1, 1, 1, 1, 1];
        rows[1] = [2, 2, 2, 2, 0];
        // White to move, Black already has five
        let board = Board::from_rows(&rows, None).unwrap();

        assert_eq!(eval.evaluate(&board).unwrap().value, -1.0);
    }
}
