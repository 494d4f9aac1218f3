//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared by
//! the search engine and the terminal front-end.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`GOMOKU_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! GOMOKU_<SECTION>_<KEY>=value
//!
//! Examples:
//!     GOMOKU_COMMON_LOG_LEVEL=debug
//!     GOMOKU_BOARD_SIZE=9
//!     GOMOKU_MCTS_NUM_SIMULATIONS=1600
//!     GOMOKU_PLAY_EVALUATOR=uniform
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
