//! gomoku-play - terminal front-end for the gomoku MCTS engine
//!
//! Plays either a human at the terminal against the engine, or the engine
//! against itself for a number of games, printing the board after every move.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod config;
mod game;

use crate::config::Config;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    init_tracing(&config.log_level)?;
    info!(
        mode = %config.mode,
        board_size = config.board_size,
        evaluator = %config.evaluator,
        num_simulations = config.num_simulations,
        "Starting gomoku-play"
    );

    match game::run(&config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("gomoku-play failed: {:#}", e);
            Err(e)
        }
    }
}
