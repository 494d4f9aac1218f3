//! Configuration for the terminal front-end
//!
//! Defaults come from the central configuration (config.toml with GOMOKU_*
//! environment overrides). CLI arguments take highest priority.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use gomoku::{Player, MAX_SIZE, MIN_SIZE};
use mcts::MctsConfig;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_board_size() -> usize {
    CENTRAL_CONFIG.board.size
}

fn default_mode() -> String {
    CENTRAL_CONFIG.play.mode.clone()
}

fn default_human_color() -> String {
    CENTRAL_CONFIG.play.human_color.clone()
}

fn default_evaluator() -> String {
    CENTRAL_CONFIG.play.evaluator.clone()
}

fn default_rollout_depth() -> u32 {
    CENTRAL_CONFIG.play.rollout_depth
}

fn default_games() -> u32 {
    CENTRAL_CONFIG.play.games
}

fn default_num_simulations() -> u32 {
    CENTRAL_CONFIG.mcts.num_simulations
}

fn default_c_puct() -> f32 {
    CENTRAL_CONFIG.mcts.c_puct as f32
}

fn default_temperature() -> f32 {
    CENTRAL_CONFIG.mcts.temperature as f32
}

fn default_temp_threshold() -> u32 {
    CENTRAL_CONFIG.mcts.temp_threshold
}

fn default_dirichlet_alpha() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_alpha as f32
}

fn default_dirichlet_weight() -> f32 {
    CENTRAL_CONFIG.mcts.dirichlet_weight as f32
}

fn default_reuse_tree() -> bool {
    CENTRAL_CONFIG.mcts.reuse_tree
}

/// Who plays the moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Human at the terminal against the engine
    Human,
    /// Engine against itself
    SelfPlay,
}

impl FromStr for PlayMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "human" => Ok(PlayMode::Human),
            "self-play" | "selfplay" => Ok(PlayMode::SelfPlay),
            other => Err(anyhow!(
                "invalid mode '{}', expected 'human' or 'self-play'",
                other
            )),
        }
    }
}

/// Which position evaluator backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorKind {
    Uniform,
    Rollout,
}

impl FromStr for EvaluatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(EvaluatorKind::Uniform),
            "rollout" => Ok(EvaluatorKind::Rollout),
            other => Err(anyhow!(
                "invalid evaluator '{}', expected 'uniform' or 'rollout'",
                other
            )),
        }
    }
}

fn parse_color(s: &str) -> Result<Player> {
    match s.to_ascii_lowercase().as_str() {
        "black" | "b" | "x" => Ok(Player::Black),
        "white" | "w" | "o" => Ok(Player::White),
        other => Err(anyhow!(
            "invalid human color '{}', expected 'black' or 'white'",
            other
        )),
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "gomoku-play")]
#[command(about = "Play five-in-a-row against an MCTS engine")]
#[command(
    long_about = "Terminal front-end for the gomoku MCTS engine. Plays human-vs-engine
games (moves entered as coordinates such as h8) or engine self-play games.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Side length of the board
    #[arg(long, default_value_t = default_board_size())]
    pub board_size: usize,

    /// Game mode: human or self-play
    #[arg(long, default_value_t = default_mode())]
    pub mode: String,

    /// Colour played by the human in human mode (black moves first)
    #[arg(long, default_value_t = default_human_color())]
    pub human_color: String,

    /// Position evaluator: uniform or rollout
    #[arg(long, default_value_t = default_evaluator())]
    pub evaluator: String,

    /// Maximum random moves per rollout
    #[arg(long, default_value_t = default_rollout_depth())]
    pub rollout_depth: u32,

    /// Number of games in self-play mode
    #[arg(long, default_value_t = default_games())]
    pub games: u32,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// Exploration constant
    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f32,

    /// Move selection temperature in self-play
    #[arg(long, default_value_t = default_temperature())]
    pub temperature: f32,

    /// Self-play moves after which moves are chosen greedily (0 to disable)
    #[arg(long, default_value_t = default_temp_threshold())]
    pub temp_threshold: u32,

    /// Root Dirichlet noise alpha in self-play (0 disables noise)
    #[arg(long, default_value_t = default_dirichlet_alpha())]
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced by noise
    #[arg(long, default_value_t = default_dirichlet_weight())]
    pub dirichlet_weight: f32,

    /// Keep the searched subtree between moves
    #[arg(long, default_value_t = default_reuse_tree(), action = clap::ArgAction::Set)]
    pub reuse_tree: bool,

    /// RNG seed for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&self.board_size) {
            return Err(anyhow!(
                "board_size must be between {} and {}, got {}",
                MIN_SIZE,
                MAX_SIZE,
                self.board_size
            ));
        }

        self.play_mode()?;
        self.evaluator_kind()?;
        self.human_player()?;

        if self.games == 0 {
            return Err(anyhow!("games must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        self.mcts_config()
            .validate()
            .map_err(|e| anyhow!("invalid search settings: {}", e))?;

        Ok(())
    }

    pub fn play_mode(&self) -> Result<PlayMode> {
        self.mode.parse()
    }

    pub fn evaluator_kind(&self) -> Result<EvaluatorKind> {
        self.evaluator.parse()
    }

    pub fn human_player(&self) -> Result<Player> {
        parse_color(&self.human_color)
    }

    /// Seed from the command line, falling back to the central config.
    pub fn seed(&self) -> Option<u64> {
        self.seed.or(CENTRAL_CONFIG.common.seed)
    }

    /// Search settings for self-play: the central `[mcts]` section with the
    /// command-line values on top.
    pub fn mcts_config(&self) -> MctsConfig {
        let mut config = MctsConfig::from(&*CENTRAL_CONFIG)
            .with_simulations(self.num_simulations)
            .with_c_puct(self.c_puct)
            .with_temperature(self.temperature)
            .with_dirichlet(self.dirichlet_alpha, self.dirichlet_weight)
            .with_tree_reuse(self.reuse_tree);
        config.seed = self.seed();
        config
    }

    /// Search settings against a human: greedy, no noise.
    pub fn engine_config(&self) -> MctsConfig {
        self.mcts_config()
            .with_temperature(0.0)
            .with_dirichlet(0.0, self.dirichlet_weight)
    }
}
