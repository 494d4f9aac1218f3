//! Tests for the configuration module.

use super::*;
use std::sync::Mutex;
use tempfile::tempdir;

/// Serialises tests that touch process-wide environment variables.
static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.common.seed, None);
    assert_eq!(config.board.size, 15);
    assert_eq!(config.play.mode, "human");
    assert_eq!(config.play.human_color, "black");
    assert_eq!(config.play.evaluator, "rollout");
}

#[test]
fn test_mcts_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.mcts.num_simulations, 400);
    assert!((config.mcts.c_puct - 5.0).abs() < f64::EPSILON);
    assert!((config.mcts.temperature - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.mcts.temp_threshold, 8);
    assert!((config.mcts.dirichlet_alpha - 0.03).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_weight - 0.25).abs() < f64::EPSILON);
    assert!(config.mcts.reuse_tree);
}

#[test]
fn test_accessors_match_struct_defaults() {
    let config = CentralConfig::default();
    assert_eq!(board_size(), config.board.size);
    assert_eq!(num_simulations(), config.mcts.num_simulations);
    assert_eq!(rollout_depth(), config.play.rollout_depth);
    assert_eq!(games(), config.play.games);
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"
seed = 1234

[board]
size = 9

[play]
mode = "self-play"
games = 3
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.common.seed, Some(1234));
    assert_eq!(config.board.size, 9);
    assert_eq!(config.play.mode, "self-play");
    assert_eq!(config.play.games, 3);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[board]
size = 11
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.board.size, 11);
    assert_eq!(config.common.log_level, "info"); // Default
    assert_eq!(config.mcts.num_simulations, 400); // Default
    assert_eq!(config.play.evaluator, "rollout"); // Default
}

#[test]
fn test_mcts_config_from_toml() {
    let toml_content = r#"
[mcts]
num_simulations = 1600
c_puct = 2.0
temperature = 0.5
dirichlet_alpha = 0.3
dirichlet_weight = 0.1
reuse_tree = false
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.mcts.num_simulations, 1600);
    assert!((config.mcts.c_puct - 2.0).abs() < f64::EPSILON);
    assert!((config.mcts.temperature - 0.5).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_alpha - 0.3).abs() < f64::EPSILON);
    assert!((config.mcts.dirichlet_weight - 0.1).abs() < f64::EPSILON);
    assert!(!config.mcts.reuse_tree);
    assert_eq!(config.mcts.temp_threshold, 8); // Default
}

#[test]
fn test_gomoku_env_overrides() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    std::env::set_var("GOMOKU_BOARD_SIZE", "9");
    std::env::set_var("GOMOKU_MCTS_C_PUCT", "1.5");
    std::env::set_var("GOMOKU_MCTS_REUSE_TREE", "false");
    std::env::set_var("GOMOKU_PLAY_EVALUATOR", "uniform");
    std::env::set_var("GOMOKU_COMMON_SEED", "77");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.board.size, 9);
    assert!((config.mcts.c_puct - 1.5).abs() < f64::EPSILON);
    assert!(!config.mcts.reuse_tree);
    assert_eq!(config.play.evaluator, "uniform");
    assert_eq!(config.common.seed, Some(77));

    std::env::remove_var("GOMOKU_BOARD_SIZE");
    std::env::remove_var("GOMOKU_MCTS_C_PUCT");
    std::env::remove_var("GOMOKU_MCTS_REUSE_TREE");
    std::env::remove_var("GOMOKU_PLAY_EVALUATOR");
    std::env::remove_var("GOMOKU_COMMON_SEED");
}

#[test]
fn test_unparsable_env_override_is_ignored() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    std::env::set_var("GOMOKU_MCTS_NUM_SIMULATIONS", "lots");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.mcts.num_simulations, 400);

    std::env::remove_var("GOMOKU_MCTS_NUM_SIMULATIONS");
}

#[test]
fn test_load_from_path() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[mcts]\nnum_simulations = 64\n").unwrap();

    let config = load_from_path(&path);
    assert_eq!(config.mcts.num_simulations, 64);
    assert_eq!(config.board.size, 15);
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[mcts\nnum_simulations = ").unwrap();

    let config = load_from_path(&path);
    assert_eq!(config.mcts.num_simulations, 400);

    let missing = load_from_path(&dir.path().join("missing.toml"));
    assert_eq!(missing.board.size, 15);
}

#[test]
fn test_load_config_from_env_path() {
    let _guard = ENV_TEST_MUTEX.lock().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[board]\nsize = 7\n").unwrap();
    std::env::set_var(CONFIG_ENV_VAR, &path);

    let config = load_config();
    assert_eq!(config.board.size, 7);

    std::env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_config_clone() {
    let config = CentralConfig::default();
    let cloned = config.clone();
    assert_eq!(config.play.mode, cloned.play.mode);
    assert_eq!(config.board.size, cloned.board.size);
}
