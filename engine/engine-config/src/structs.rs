//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_board_size() -> usize {
    defaults::board_size()
}
fn d_num_sims() -> u32 {
    defaults::num_simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_temp_threshold() -> u32 {
    defaults::temp_threshold()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_weight() -> f64 {
    defaults::dirichlet_weight()
}
fn d_reuse_tree() -> bool {
    defaults::reuse_tree()
}
fn d_play_mode() -> String {
    defaults::play_mode().into()
}
fn d_human_color() -> String {
    defaults::human_color().into()
}
fn d_evaluator() -> String {
    defaults::evaluator().into()
}
fn d_rollout_depth() -> u32 {
    defaults::rollout_depth()
}
fn d_games() -> u32 {
    defaults::games()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub play: PlayConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// RNG seed for search and rollouts. Unset means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BoardConfig {
    /// Side length of the square board
    #[serde(default = "d_board_size")]
    pub size: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: defaults::board_size(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    #[serde(default = "d_temp_threshold")]
    pub temp_threshold: u32,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    #[serde(default = "d_dirichlet_weight")]
    pub dirichlet_weight: f64,
    #[serde(default = "d_reuse_tree")]
    pub reuse_tree: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::num_simulations(),
            c_puct: defaults::c_puct(),
            temperature: defaults::temperature(),
            temp_threshold: defaults::temp_threshold(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_weight: defaults::dirichlet_weight(),
            reuse_tree: defaults::reuse_tree(),
        }
    }
}

/// Terminal front-end configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayConfig {
    #[serde(default = "d_play_mode")]
    pub mode: String,
    #[serde(default = "d_human_color")]
    pub human_color: String,
    #[serde(default = "d_evaluator")]
    pub evaluator: String,
    /// Maximum random moves per rollout evaluation
    #[serde(default = "d_rollout_depth")]
    pub rollout_depth: u32,
    /// Number of games in self-play mode
    #[serde(default = "d_games")]
    pub games: u32,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            mode: defaults::play_mode().into(),
            human_color: defaults::human_color().into(),
            evaluator: defaults::evaluator().into(),
            rollout_depth: defaults::rollout_depth(),
            games: defaults::games(),
        }
    }
}
