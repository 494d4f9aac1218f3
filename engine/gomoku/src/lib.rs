//! Five-in-a-row (gomoku) board for the search engine.
//!
//! Two players alternately place stones on an empty cell of a square grid.
//! The first player to form an unbroken line of five or more stones
//! horizontally, vertically or diagonally wins. A full board without such a
//! line is a draw.
//!
//! # Board Layout
//!
//! Cells are stored in row-major order. An action is the integer index of a
//! cell, `row * size + col`:
//! ```text
//!          a   b   c   d   e
//! Row 1: [ 0][ 1][ 2][ 3][ 4]
//! Row 2: [ 5][ 6][ 7][ 8][ 9]
//! Row 3: [10][11][12][13][14]
//! ...
//! ```
//!
//! # Usage
//!
//! ```rust
//! use gomoku::{Board, GameStatus, Player};
//!
//! let mut board = Board::new(15).unwrap();
//! for col in 0..4 {
//!     board.play(col).unwrap();      // Black along row 1
//!     board.play(15 + col).unwrap(); // White along row 2
//! }
//! let (next, status) = board.apply_move(4).unwrap();
//! assert_eq!(status, GameStatus::Won(Player::Black));
//! assert!(next.is_game_over());
//! ```

use std::fmt;

use thiserror::Error;

pub mod terminal;

pub use terminal::{anchored_check, full_board_check, GameStatus, WIN_LENGTH};

/// Default board edge length.
pub const DEFAULT_SIZE: usize = 15;
/// Smallest board on which a five-stone line fits.
pub const MIN_SIZE: usize = WIN_LENGTH;
/// Largest board addressable with single-letter column names.
pub const MAX_SIZE: usize = 26;

/// Errors raised when building a board or applying a move.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board is not square: row {row} has {len} cells, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("invalid cell code {code} at row {row}, col {col}")]
    InvalidCell { row: usize, col: usize, code: u8 },

    #[error("board size {0} is outside the supported range 5..=26")]
    SizeOutOfRange(usize),

    #[error("action {action} is outside a {size}x{size} board")]
    OutOfBounds { action: usize, size: usize },

    #[error("cell {0} is already occupied")]
    Occupied(Pos),

    #[error("game is already over")]
    GameOver,
}

/// One of the two players. Black always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Character used when printing the board.
    pub fn symbol(self) -> char {
        match self {
            Player::Black => 'X',
            Player::White => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// Contents of a single intersection.
///
/// The numeric codes (0 = empty, 1 = black, 2 = white) are the raw format
/// accepted by [`Board::from_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    Black = 1,
    White = 2,
}

impl Cell {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Black),
            2 => Some(Cell::White),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// The player owning this cell, `None` when empty.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::Black => Cell::Black,
            Player::White => Cell::White,
        }
    }
}

/// A board coordinate, zero-based from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Convert a signed coordinate pair, mapping the `(-1, -1)` "unknown"
    /// sentinel and anything outside the grid to `None`.
    pub fn from_signed(row: i64, col: i64, size: usize) -> Option<Self> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < size && col < size).then_some(Self { row, col })
    }

    pub fn from_action(action: usize, size: usize) -> Self {
        Self {
            row: action / size,
            col: action % size,
        }
    }

    pub fn to_action(self, size: usize) -> usize {
        self.row * size + self.col
    }

    /// Parse a coordinate such as `h8` (column letter, one-based row number).
    pub fn parse_coord(text: &str, size: usize) -> Option<Self> {
        let text = text.trim().to_ascii_lowercase();
        let mut chars = text.chars();
        let letter = chars.next()?;
        if !letter.is_ascii_lowercase() {
            return None;
        }
        let col = (letter as u8 - b'a') as usize;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row: usize = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        let pos = Self::new(row - 1, col);
        (pos.row < size && pos.col < size).then_some(pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col < MAX_SIZE {
            write!(f, "{}{}", (b'a' + self.col as u8) as char, self.row + 1)
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

/// Gomoku board snapshot.
///
/// Holds the grid, the coordinate of the most recent move (if known) and the
/// player to move. Boards are cheap to clone; the search works on copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
    last_move: Option<Pos>,
    to_move: Player,
}

impl Board {
    /// Create an empty board with Black to move.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::SizeOutOfRange(size));
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
            last_move: None,
            to_move: Player::Black,
        })
    }

    /// Build a board from raw cell codes, one slice per row.
    ///
    /// The player to move is inferred from the stone counts: Black when both
    /// colours have the same number of stones, White otherwise. `last_move`
    /// outside the grid is treated as unknown, and so is one whose lines miss
    /// a winning line present elsewhere on the board.
    pub fn from_rows<R: AsRef<[u8]>>(
        rows: &[R],
        last_move: Option<Pos>,
    ) -> Result<Self, BoardError> {
        let size = rows.len();
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::SizeOutOfRange(size));
        }

        let mut cells = Vec::with_capacity(size * size);
        for (row, codes) in rows.iter().enumerate() {
            let codes = codes.as_ref();
            if codes.len() != size {
                return Err(BoardError::NotSquare {
                    row,
                    len: codes.len(),
                    expected: size,
                });
            }
            for (col, &code) in codes.iter().enumerate() {
                let cell = Cell::from_code(code).ok_or(BoardError::InvalidCell { row, col, code })?;
                cells.push(cell);
            }
        }

        let black = cells.iter().filter(|&&c| c == Cell::Black).count();
        let white = cells.iter().filter(|&&c| c == Cell::White).count();
        let to_move = if black > white {
            Player::White
        } else {
            Player::Black
        };

        let mut board = Self {
            size,
            cells,
            last_move: last_move.filter(|p| p.row < size && p.col < size),
            to_move,
        };

        // An anchor off the winning line would hide a finished game
        if board.last_move.is_some() {
            let full = terminal::full_board_check(&board);
            if full.is_some() && terminal::anchored_check(&board, board.last_move) != full {
                board.last_move = None;
            }
        }

        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of actions (cells) on this board.
    #[inline]
    pub fn num_actions(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos.to_action(self.size)]
    }

    #[inline]
    pub fn last_move(&self) -> Option<Pos> {
        self.last_move
    }

    /// Replace the recorded last move, e.g. to force a full-board scan.
    pub fn with_last_move(mut self, last_move: Option<Pos>) -> Self {
        self.last_move = last_move.filter(|&p| self.contains(p));
        self
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// Signed coordinate lookup used by the line scanners.
    #[inline]
    pub(crate) fn cell_checked(&self, row: isize, col: isize) -> Option<Cell> {
        let size = self.size as isize;
        if row < 0 || col < 0 || row >= size || col >= size {
            return None;
        }
        Some(self.cells[row as usize * self.size + col as usize])
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Empty cells in ascending action order. Empty once the game is over.
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_legal(&self, action: usize) -> bool {
        action < self.cells.len() && self.cells[action].is_empty() && !self.is_game_over()
    }

    /// Place the current player's stone in place and report the resulting status.
    pub fn play(&mut self, action: usize) -> Result<GameStatus, BoardError> {
        if action >= self.cells.len() {
            return Err(BoardError::OutOfBounds {
                action,
                size: self.size,
            });
        }
        let pos = Pos::from_action(action, self.size);
        if !self.cells[action].is_empty() {
            return Err(BoardError::Occupied(pos));
        }
        if self.is_game_over() {
            return Err(BoardError::GameOver);
        }

        self.cells[action] = Cell::from(self.to_move);
        self.last_move = Some(pos);
        self.to_move = self.to_move.opponent();

        Ok(terminal::status(self))
    }

    /// Apply a move to a copy of this board.
    ///
    /// Returns the successor board together with its status; a win in the
    /// returned status belongs to the player who just moved.
    pub fn apply_move(&self, action: usize) -> Result<(Board, GameStatus), BoardError> {
        let mut next = self.clone();
        let status = next.play(action)?;
        Ok((next, status))
    }

    /// Game status, using the anchored check around the last move when known.
    pub fn status(&self) -> GameStatus {
        terminal::status(self)
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }

    pub fn winner(&self) -> Option<Player> {
        self.status().winner()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            cells: vec![Cell::Empty; DEFAULT_SIZE * DEFAULT_SIZE],
            last_move: None,
            to_move: Player::Black,
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.size {
            write!(f, " {}", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;

        for row in 0..self.size {
            write!(f, "{:>3}", row + 1)?;
            for col in 0..self.size {
                let symbol = match self.cell(Pos::new(row, col)).player() {
                    Some(player) => player.symbol(),
                    None => '.',
                };
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
