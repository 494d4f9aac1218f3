//! MCTS configuration parameters.

use thiserror::Error;

/// Rejected configuration value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Number of simulations to run per search.
    pub num_simulations: u32,

    /// Exploration constant in U = c_puct * P * sqrt(N_parent) / (1 + N).
    pub c_puct: f32,

    /// Temperature for action selection after search.
    /// 1.0 = sample proportional to visit counts
    /// 0.0 = always pick most-visited (argmax)
    pub temperature: f32,

    /// Dirichlet noise alpha for root node exploration.
    /// Set to 0.0 to disable noise (for evaluation/inference).
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced by Dirichlet noise.
    pub dirichlet_epsilon: f32,

    /// Keep the chosen subtree after a move instead of rebuilding.
    pub reuse_tree: bool,

    /// Seed for move sampling and noise. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self::for_play()
    }
}

impl MctsConfig {
    /// Strongest play: greedy move choice, no noise.
    pub fn for_play() -> Self {
        Self {
            num_simulations: 400,
            c_puct: 5.0,
            temperature: 0.0,
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.25,
            reuse_tree: true,
            seed: None,
        }
    }

    /// Self-play: sample proportional to visits with root noise.
    pub fn for_self_play() -> Self {
        Self {
            temperature: 1.0,
            dirichlet_alpha: 0.03,
            ..Self::for_play()
        }
    }

    /// Create a fast, deterministic config for testing.
    pub fn for_testing() -> Self {
        Self {
            num_simulations: 50,
            seed: Some(42),
            ..Self::for_play()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.num_simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    /// Builder pattern: set root noise; alpha 0.0 disables it.
    pub fn with_dirichlet(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    pub fn with_tree_reuse(mut self, reuse: bool) -> Self {
        self.reuse_tree = reuse;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_simulations == 0 {
            return Err(invalid("num_simulations", "must be at least 1"));
        }
        if !(self.c_puct.is_finite() && self.c_puct > 0.0) {
            return Err(invalid("c_puct", format!("{} is not positive", self.c_puct)));
        }
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(invalid(
                "temperature",
                format!("{} is negative or not finite", self.temperature),
            ));
        }
        if !(self.dirichlet_alpha.is_finite() && self.dirichlet_alpha >= 0.0) {
            return Err(invalid(
                "dirichlet_alpha",
                format!("{} is negative or not finite", self.dirichlet_alpha),
            ));
        }
        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(invalid(
                "dirichlet_epsilon",
                format!("{} is outside [0, 1]", self.dirichlet_epsilon),
            ));
        }
        Ok(())
    }
}

impl From<&engine_config::CentralConfig> for MctsConfig {
    fn from(config: &engine_config::CentralConfig) -> Self {
        let mcts = &config.mcts;
        Self {
            num_simulations: mcts.num_simulations,
            c_puct: mcts.c_puct as f32,
            temperature: mcts.temperature as f32,
            dirichlet_alpha: mcts.dirichlet_alpha as f32,
            dirichlet_epsilon: mcts.dirichlet_weight as f32,
            reuse_tree: mcts.reuse_tree,
            seed: config.common.seed,
        }
    }
}
