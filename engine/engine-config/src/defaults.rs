//! Default configuration values loaded from config.defaults.toml.
//!
//! The shared TOML file is embedded at compile time so that the binary and
//! every library crate see the same defaults.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    board: BoardDefaults,
    mcts: MctsDefaults,
    play: PlayDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct BoardDefaults {
    size: usize,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    num_simulations: u32,
    c_puct: f64,
    temperature: f64,
    temp_threshold: u32,
    dirichlet_alpha: f64,
    dirichlet_weight: f64,
    reuse_tree: bool,
}

#[derive(Debug, Deserialize)]
struct PlayDefaults {
    mode: String,
    human_color: String,
    evaluator: String,
    rollout_depth: u32,
    games: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Board
pub fn board_size() -> usize {
    DEFAULTS.board.size
}

// MCTS
pub fn num_simulations() -> u32 {
    DEFAULTS.mcts.num_simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.mcts.c_puct
}
pub fn temperature() -> f64 {
    DEFAULTS.mcts.temperature
}
pub fn temp_threshold() -> u32 {
    DEFAULTS.mcts.temp_threshold
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.mcts.dirichlet_alpha
}
pub fn dirichlet_weight() -> f64 {
    DEFAULTS.mcts.dirichlet_weight
}
pub fn reuse_tree() -> bool {
    DEFAULTS.mcts.reuse_tree
}

// Play
pub fn play_mode() -> &'static str {
    &DEFAULTS.play.mode
}
pub fn human_color() -> &'static str {
    &DEFAULTS.play.human_color
}
pub fn evaluator() -> &'static str {
    &DEFAULTS.play.evaluator
}
pub fn rollout_depth() -> u32 {
    DEFAULTS.play.rollout_depth
}
pub fn games() -> u32 {
    DEFAULTS.play.games
}
