//! Terminal-state detection.
//!
//! Two scanners decide whether a line of [`WIN_LENGTH`] or more same-colour
//! stones exists:
//!
//! - [`anchored_check`] looks only at the four lines through one coordinate,
//!   normally the last move. Its cost does not depend on the board size.
//! - [`full_board_check`] treats every stone as a potential run start and is
//!   used whenever the anchor is unknown, off the board or empty.
//!
//! For any board reached by legal play the two agree, because only the most
//! recent stone can complete the first winning line. `Board::from_rows`
//! discards a supplied last move that would make them disagree.

use crate::{Board, Cell, Player, Pos};

/// Stones in a row needed to win. Longer lines also win.
pub const WIN_LENGTH: usize = 5;

/// Direction vectors (row, col): horizontal, vertical, descending and
/// ascending diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Outcome of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Ongoing,
    Won(Player),
    Draw,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameStatus::Won(player) => Some(player),
            _ => None,
        }
    }

    /// Reward from `player`'s point of view: 1.0 for a win, -1.0 for a loss,
    /// 0.0 for a draw or an unfinished game.
    pub fn value_for(self, player: Player) -> f32 {
        match self {
            GameStatus::Won(winner) if winner == player => 1.0,
            GameStatus::Won(_) => -1.0,
            GameStatus::Ongoing | GameStatus::Draw => 0.0,
        }
    }
}

/// Count consecutive `cell` stones starting one step away from (row, col).
fn run_length(board: &Board, row: isize, col: isize, (dr, dc): (isize, isize), cell: Cell) -> usize {
    let mut count = 0;
    let (mut r, mut c) = (row + dr, col + dc);
    while board.cell_checked(r, c) == Some(cell) {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

/// Winner of a line passing through `anchor`, if any.
///
/// Falls back to [`full_board_check`] when `anchor` is `None`, outside the
/// grid or on an empty cell.
pub fn anchored_check(board: &Board, anchor: Option<Pos>) -> Option<Player> {
    let Some(anchor) = anchor.filter(|&p| board.contains(p)) else {
        return full_board_check(board);
    };
    let cell = board.cell(anchor);
    let Some(player) = cell.player() else {
        return full_board_check(board);
    };

    let (row, col) = (anchor.row as isize, anchor.col as isize);
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| {
            let forward = run_length(board, row, col, (dr, dc), cell);
            let backward = run_length(board, row, col, (-dr, -dc), cell);
            1 + forward + backward >= WIN_LENGTH
        })
        .then_some(player)
}

/// Winner of any line on the board, scanning every cell.
///
/// Only cells that start a run (the previous cell in that direction holds a
/// different value) are measured, so each run is counted once.
pub fn full_board_check(board: &Board) -> Option<Player> {
    let size = board.size() as isize;
    for row in 0..size {
        for col in 0..size {
            let Some(cell) = board.cell_checked(row, col) else {
                continue;
            };
            let Some(player) = cell.player() else {
                continue;
            };

            for &(dr, dc) in &DIRECTIONS {
                if board.cell_checked(row - dr, col - dc) == Some(cell) {
                    continue;
                }
                if 1 + run_length(board, row, col, (dr, dc), cell) >= WIN_LENGTH {
                    return Some(player);
                }
            }
        }
    }
    None
}

/// Status of `board`: anchored on its last move when known, then a draw check.
pub fn status(board: &Board) -> GameStatus {
    if let Some(winner) = anchored_check(board, board.last_move()) {
        return GameStatus::Won(winner);
    }
    if board.is_full() {
        GameStatus::Draw
    } else {
        GameStatus::Ongoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_for() {
        let won = GameStatus::Won(Player::Black);
        assert_eq!(won.value_for(Player::Black), 1.0);
        assert_eq!(won.value_for(Player::White), -1.0);
        assert_eq!(GameStatus::Draw.value_for(Player::Black), 0.0);
        assert_eq!(GameStatus::Ongoing.value_for(Player::White), 0.0);
    }

    #[test]
    fn test_status_helpers() {
        assert!(!GameStatus::Ongoing.is_over());
        assert!(GameStatus::Draw.is_over());
        assert_eq!(GameStatus::Draw.winner(), None);
        assert_eq!(
            GameStatus::Won(Player::White).winner(),
            Some(Player::White)
        );
    }

    #[test]
    fn test_run_length_stops_at_edge_and_other_colour() {
        let mut rows = vec![[0u8; 5]; 5];
        rows[0] = [1, 1, 1, 2, 0];
        let board = Board::from_rows(&rows, None).unwrap();

        assert_eq!(run_length(&board, 0, -1, (0, 1), Cell::Black), 3);
        assert_eq!(run_length(&board, 0, 2, (0, -1), Cell::Black), 2);
        assert_eq!(run_length(&board, 0, 0, (0, -1), Cell::Black), 0);
    }

    #[test]
    fn test_empty_anchor_falls_back_to_full_scan() {
        let mut rows = vec![[0u8; 7]; 7];
        rows[6] = [1, 1, 1, 1, 1, 0, 0];
        let board = Board::from_rows(&rows, None).unwrap();

        // (0, 0) is empty, so the whole board is scanned
        assert_eq!(
            anchored_check(&board, Some(Pos::new(0, 0))),
            Some(Player::Black)
        );
        // Off-board anchor also scans the whole board
        assert_eq!(
            anchored_check(&board, Some(Pos::new(9, 9))),
            Some(Player::Black)
        );
    }
}
