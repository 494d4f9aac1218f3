//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GOMOKU_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from play/)
];

/// Load the central configuration.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the GOMOKU_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = Path::new(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = Some(v),
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: GOMOKU_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "GOMOKU_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "GOMOKU_COMMON_SEED", optional_parse);

    // Board
    env_override!(config, board.size, "GOMOKU_BOARD_SIZE", parse);

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "GOMOKU_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "GOMOKU_MCTS_C_PUCT", parse);
    env_override!(config, mcts.temperature, "GOMOKU_MCTS_TEMPERATURE", parse);
    env_override!(
        config,
        mcts.temp_threshold,
        "GOMOKU_MCTS_TEMP_THRESHOLD",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_alpha,
        "GOMOKU_MCTS_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        mcts.dirichlet_weight,
        "GOMOKU_MCTS_DIRICHLET_WEIGHT",
        parse
    );
    env_override!(config, mcts.reuse_tree, "GOMOKU_MCTS_REUSE_TREE", parse);

    // Play
    env_override!(config, play.mode, "GOMOKU_PLAY_MODE");
    env_override!(config, play.human_color, "GOMOKU_PLAY_HUMAN_COLOR");
    env_override!(config, play.evaluator, "GOMOKU_PLAY_EVALUATOR");
    env_override!(
        config,
        play.rollout_depth,
        "GOMOKU_PLAY_ROLLOUT_DEPTH",
        parse
    );
    env_override!(config, play.games, "GOMOKU_PLAY_GAMES", parse);

    config
}
