//! Game loops for human-vs-engine and engine self-play.
//!
//! Input and output are passed in as `BufRead`/`Write` so the loops can be
//! driven from tests as well as from the terminal.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use gomoku::{Board, GameStatus, Player, Pos};
use mcts::{
    EvalResult, Evaluator, EvaluatorError, MctsConfig, MctsSearch, RolloutEvaluator,
    UniformEvaluator,
};
use tracing::{debug, info};

use crate::config::{Config, EvaluatorKind, PlayMode};

/// Evaluator selected on the command line.
#[derive(Debug)]
pub enum EngineEvaluator {
    Uniform(UniformEvaluator),
    Rollout(RolloutEvaluator),
}

impl EngineEvaluator {
    pub fn new(kind: EvaluatorKind, rollout_depth: u32, seed: u64) -> Self {
        match kind {
            EvaluatorKind::Uniform => EngineEvaluator::Uniform(UniformEvaluator::new()),
            EvaluatorKind::Rollout => {
                EngineEvaluator::Rollout(RolloutEvaluator::new(rollout_depth, seed))
            }
        }
    }
}

impl Evaluator for EngineEvaluator {
    fn evaluate(&self, board: &Board) -> Result<EvalResult, EvaluatorError> {
        match self {
            EngineEvaluator::Uniform(e) => e.evaluate(board),
            EngineEvaluator::Rollout(e) => e.evaluate(board),
        }
    }
}

/// A finished (or abandoned) game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub moves: Vec<usize>,
    pub status: GameStatus,
}

/// Win/draw tally over several games.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub black_wins: u32,
    pub white_wins: u32,
    pub draws: u32,
    pub unfinished: u32,
}

impl Summary {
    pub fn record(&mut self, status: GameStatus) {
        match status {
            GameStatus::Won(Player::Black) => self.black_wins += 1,
            GameStatus::Won(Player::White) => self.white_wins += 1,
            GameStatus::Draw => self.draws += 1,
            GameStatus::Ongoing => self.unfinished += 1,
        }
    }
}

/// Run the mode selected in `config` against stdin/stdout.
pub fn run(config: &Config) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match config.play_mode()? {
        PlayMode::Human => {
            let record = play_human(config, stdin.lock(), stdout.lock())?;
            info!(moves = record.moves.len(), status = ?record.status, "Game finished");
        }
        PlayMode::SelfPlay => {
            let summary = self_play(config, stdout.lock())?;
            info!(
                black_wins = summary.black_wins,
                white_wins = summary.white_wins,
                draws = summary.draws,
                "Self-play finished"
            );
        }
    }
    Ok(())
}

fn new_search(config: &Config, mcts: MctsConfig) -> Result<MctsSearch<EngineEvaluator>> {
    let seed = config.seed().unwrap_or_else(rand::random);
    let evaluator = EngineEvaluator::new(config.evaluator_kind()?, config.rollout_depth, seed);
    MctsSearch::new(evaluator, mcts).context("Failed to create MCTS search")
}

fn describe(status: GameStatus) -> String {
    match status {
        GameStatus::Won(player) => format!("{} wins", player),
        GameStatus::Draw => "Draw".to_string(),
        GameStatus::Ongoing => "Game abandoned".to_string(),
    }
}

/// Human against the engine. Reads one coordinate per line (`h8`), or
/// `quit` to abandon the game.
pub fn play_human<R: BufRead, W: Write>(config: &Config, input: R, mut out: W) -> Result<GameRecord> {
    let human = config.human_player()?;
    let mut search = new_search(config, config.engine_config())?;
    let mut board = Board::new(config.board_size)?;
    let mut moves = Vec::new();
    let mut lines = input.lines();

    info!(human = %human, size = board.size(), "Starting human game");
    writeln!(out, "{}", board)?;

    let status = loop {
        let status = board.status();
        if status.is_over() {
            break status;
        }

        let action = if board.to_move() == human {
            write!(out, "{} to move> ", human)?;
            out.flush()?;

            let Some(line) = lines.next() else {
                break GameStatus::Ongoing;
            };
            let line = line.context("Failed to read move")?;
            let text = line.trim();
            if text.eq_ignore_ascii_case("quit") {
                break GameStatus::Ongoing;
            }

            let Some(pos) = Pos::parse_coord(text, board.size()) else {
                writeln!(out, "Cannot parse '{}', enter a coordinate such as h8", text)?;
                continue;
            };
            let action = pos.to_action(board.size());
            if !board.is_legal(action) {
                writeln!(out, "{} is already taken", pos)?;
                continue;
            }
            search.advance_root(action);
            action
        } else {
            let result = search
                .select_action(&board)
                .context("Engine search failed")?;
            writeln!(
                out,
                "Engine plays {} (value {:+.2})",
                Pos::from_action(result.action, board.size()),
                result.value
            )?;
            result.action
        };

        board.play(action)?;
        moves.push(action);
        writeln!(out, "{}", board)?;
    };

    writeln!(out, "{}", describe(status))?;
    Ok(GameRecord { moves, status })
}

/// One engine-vs-engine game. Both colours share the search tree; moves are
/// sampled until `temp_threshold` moves have been played, greedy afterwards.
pub fn play_self_game<W: Write>(
    search: &mut MctsSearch<EngineEvaluator>,
    config: &Config,
    out: &mut W,
) -> Result<GameRecord> {
    let mut board = Board::new(config.board_size)?;
    let mut moves = Vec::new();
    search.reset();

    loop {
        let status = board.status();
        if status.is_over() {
            return Ok(GameRecord { moves, status });
        }

        let greedy = config.temp_threshold > 0 && moves.len() >= config.temp_threshold as usize;
        search.set_temperature(if greedy { 0.0 } else { config.temperature });

        let result = search
            .select_action(&board)
            .context("Engine search failed")?;
        board.play(result.action)?;
        moves.push(result.action);

        debug!(
            ply = moves.len(),
            action = result.action,
            value = result.value,
            "Self-play move"
        );
        writeln!(
            out,
            "{} plays {}\n{}",
            board.to_move().opponent(),
            Pos::from_action(result.action, board.size()),
            board
        )?;
    }
}

/// Play `config.games` self-play games and print a summary.
pub fn self_play<W: Write>(config: &Config, mut out: W) -> Result<Summary> {
    let mut search = new_search(config, config.mcts_config())?;
    let mut summary = Summary::default();

    for game in 1..=config.games {
        info!(game, total = config.games, "Starting self-play game");
        let record = play_self_game(&mut search, config, &mut out)?;
        summary.record(record.status);
        writeln!(
            out,
            "Game {}: {} after {} moves",
            game,
            describe(record.status),
            record.moves.len()
        )?;
    }

    writeln!(
        out,
        "Black wins: {}, White wins: {}, Draws: {}",
        summary.black_wins, summary.white_wins, summary.draws
    )?;
    Ok(summary)
}
