//! Immutable game positions
//!
//! A [`Position`] is one decision point of a 2048 game: the tile grid, the
//! cumulative score, the number of completed plies and the [`Phase`] telling
//! who moves next. Every transition returns a new position.
//!
//! Ordinary play uses [`Position::result`], which slides and then spawns a
//! random tile in one step. The search instead sees the two halves of a ply
//! as separate moves through [`Position::search_legal_moves`] and
//! [`Position::search_result`].

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    board::Board,
    engine::{self, Direction},
    game_state::{GameState, Phase},
    Error, Result,
};

/// A move in the decomposed, two-phase game seen by the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMove {
    /// The agent slides all tiles in a direction
    Slide(Direction),
    /// The environment places a tile of `value` at (`row`, `col`)
    Place { row: usize, col: usize, value: u64 },
}

/// One immutable state of a 2048 game
#[derive(Clone)]
pub struct Position {
    board: Board,
    tiles: Vec<u64>,
    score: u64,
    turn: u64,
    phase: Phase,
    hash: u64,
}

impl Position {
    /// Creates a position from an explicit row-major grid
    ///
    /// Fails with [`Error::InvalidArgument`] if the grid does not match the
    /// board size, holds a value that is neither 0 nor a power of two of at
    /// least 2, or is full while the environment is to spawn.
    pub fn new(board: &Board, tiles: Vec<u64>, score: u64, turn: u64, phase: Phase) -> Result<Self> {
        if tiles.len() != board.cell_count() {
            return Err(Error::InvalidArgument(format!(
                "expected {} tiles for a {}x{} board, got {}",
                board.cell_count(),
                board.dimension(),
                board.dimension(),
                tiles.len()
            )));
        }

        if let Some(bad) = tiles.iter().find(|&&t| !engine::is_valid_tile(t)) {
            return Err(Error::InvalidArgument(format!("invalid tile value: {}", bad)));
        }

        if phase == Phase::EnvironmentToSpawn && !tiles.contains(&0) {
            return Err(Error::InvalidArgument(
                "a position awaiting a spawn needs an empty cell".to_string(),
            ));
        }

        Ok(Self::from_parts(board.clone(), tiles, score, turn, phase))
    }

    /// Creates a position from a grid given row by row
    pub fn from_rows(board: &Board, rows: &[Vec<u64>]) -> Result<Self> {
        if rows.len() != board.dimension() || rows.iter().any(|r| r.len() != board.dimension()) {
            return Err(Error::InvalidArgument(format!(
                "expected {} rows of {} tiles",
                board.dimension(),
                board.dimension()
            )));
        }

        let tiles = rows.iter().flatten().copied().collect();
        Self::new(board, tiles, 0, 0, Phase::AgentToSlide)
    }

    /// An all-empty grid with the agent to move
    pub(crate) fn empty(board: &Board) -> Self {
        Self::from_parts(board.clone(), vec![0; board.cell_count()], 0, 0, Phase::AgentToSlide)
    }

    fn from_parts(board: Board, tiles: Vec<u64>, score: u64, turn: u64, phase: Phase) -> Self {
        let mut hasher = DefaultHasher::new();
        tiles.hash(&mut hasher);
        score.hash(&mut hasher);
        turn.hash(&mut hasher);
        phase.hash(&mut hasher);

        Position {
            board,
            tiles,
            score,
            turn,
            phase,
            hash: hasher.finish(),
        }
    }

    /// The board configuration this position belongs to
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Row-major tile grid; 0 marks an empty cell
    pub fn tiles(&self) -> &[u64] {
        &self.tiles
    }

    /// Tile at (`row`, `col`), or `None` outside the grid
    pub fn tile(&self, row: usize, col: usize) -> Option<u64> {
        let dimension = self.board.dimension();
        if row >= dimension || col >= dimension {
            return None;
        }
        Some(self.tiles[row * dimension + col])
    }

    /// Cumulative sum of all merge results on the way to this position
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Number of completed slide-then-spawn plies
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Who moves next
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Largest tile on the grid (0 for an empty grid)
    pub fn high_tile(&self) -> u64 {
        self.tiles.iter().copied().max().unwrap_or(0)
    }

    /// Coordinates of all empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let dimension = self.board.dimension();
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, &t)| t == 0)
            .map(|(i, _)| (i / dimension, i % dimension))
            .collect()
    }

    /// Slides all tiles in `direction` without spawning a tile
    ///
    /// The result awaits a spawn; the turn counter is unchanged. Returns
    /// `None` when the slide would not change the grid.
    pub fn slide(&self, direction: Direction) -> Option<Position> {
        let (tiles, gained) = engine::slide_tiles(&self.tiles, self.board.dimension(), direction)?;

        Some(Self::from_parts(
            self.board.clone(),
            tiles,
            self.score + gained,
            self.turn,
            Phase::EnvironmentToSpawn,
        ))
    }

    /// Directions in which a slide is legal
    pub fn legal_moves(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.slide(d).is_some())
            .collect()
    }

    /// Places a tile of `value` at (`row`, `col`), completing the ply
    ///
    /// Returns `None` if the cell is outside the grid, occupied, or `value`
    /// is not a valid non-empty tile.
    pub fn place_tile(&self, row: usize, col: usize, value: u64) -> Option<Position> {
        if value == 0 || !engine::is_valid_tile(value) || self.tile(row, col)? != 0 {
            return None;
        }

        let mut tiles = self.tiles.clone();
        tiles[row * self.board.dimension() + col] = value;

        Some(Self::from_parts(
            self.board.clone(),
            tiles,
            self.score,
            self.turn + 1,
            Phase::AgentToSlide,
        ))
    }

    fn random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(usize, usize)> {
        self.empty_cells().choose(rng).copied()
    }

    /// Places a random tile on a uniformly chosen empty cell
    ///
    /// The tile is a 4 with the board's four-spawn probability and a 2
    /// otherwise. Fails with [`Error::NoEmptyCell`] on a full grid.
    pub fn add_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Position> {
        let (row, col) = self.random_empty_cell(rng).ok_or(Error::NoEmptyCell)?;
        let value = self.board.random_tile_value(rng);
        self.place_tile(row, col, value).ok_or(Error::NoEmptyCell)
    }

    /// Setup tile for the starting position; does not count as a ply
    pub(crate) fn with_setup_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let (row, col) = self.random_empty_cell(rng)?;
        let value = self.board.random_tile_value(rng);
        let placed = self.place_tile(row, col, value)?;

        Some(Self::from_parts(
            placed.board,
            placed.tiles,
            placed.score,
            self.turn,
            Phase::AgentToSlide,
        ))
    }

    /// Plays a full ply: slides in `direction`, then spawns a random tile
    ///
    /// Returns `None` if the slide is illegal.
    pub fn result<R: Rng + ?Sized>(&self, direction: Direction, rng: &mut R) -> Option<Position> {
        // A grid-changing slide always leaves an empty cell behind.
        self.slide(direction)?.add_random_tile(rng).ok()
    }

    /// True if no move can change the grid any more
    ///
    /// A full grid on which neither a left nor a down slide is possible
    /// has no adjacent equal tiles in any direction.
    pub fn game_over(&self) -> bool {
        !self.tiles.contains(&0)
            && self.slide(Direction::Left).is_none()
            && self.slide(Direction::Down).is_none()
    }

    /// Moves available in the two-phase game seen by the search
    ///
    /// With the agent to move these are the legal slides. With the
    /// environment to move there is one placement of a 2 and one of a 4 for
    /// every empty cell.
    pub fn search_legal_moves(&self) -> Vec<SearchMove> {
        match self.phase {
            Phase::AgentToSlide => self
                .legal_moves()
                .into_iter()
                .map(SearchMove::Slide)
                .collect(),
            Phase::EnvironmentToSpawn => self
                .empty_cells()
                .into_iter()
                .flat_map(|(row, col)| {
                    [2, 4].map(|value| SearchMove::Place { row, col, value })
                })
                .collect(),
        }
    }

    /// Applies a move of the two-phase game
    ///
    /// Returns `None` if the move does not belong to the current phase or
    /// cannot be made.
    pub fn search_result(&self, search_move: &SearchMove) -> Option<Position> {
        match (self.phase, *search_move) {
            (Phase::AgentToSlide, SearchMove::Slide(direction)) => self.slide(direction),
            (Phase::EnvironmentToSpawn, SearchMove::Place { row, col, value }) => {
                self.place_tile(row, col, value)
            }
            _ => None,
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.board == other.board
            && self.score == other.score
            && self.turn == other.turn
            && self.phase == other.phase
            && self.tiles == other.tiles
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("tiles", &self.tiles)
            .field("score", &self.score)
            .field("turn", &self.turn)
            .field("phase", &self.phase)
            .finish()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.high_tile().max(1).to_string().len();
        for row in self.tiles.chunks(self.board.dimension()) {
            let cells: Vec<String> = row.iter().map(|t| format!("{:>width$}", t)).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

impl GameState for Position {
    type Action = SearchMove;

    fn legal_actions(&self) -> Vec<SearchMove> {
        self.search_legal_moves()
    }

    fn apply_action(&self, action: &SearchMove) -> Option<Self> {
        self.search_result(action)
    }

    fn is_terminal(&self) -> bool {
        self.game_over()
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn value(&self) -> f64 {
        self.score as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board4() -> Board {
        Board::new(4, 0.1).unwrap()
    }

    fn rows(board: &Board, rows: [[u64; 4]; 4]) -> Position {
        let rows: Vec<Vec<u64>> = rows.iter().map(|r| r.to_vec()).collect();
        Position::from_rows(board, &rows).unwrap()
    }

    #[test]
    fn slide_left_merges_pair() {
        let board = board4();
        let position = rows(&board, [[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);

        let slid = position.slide(Direction::Left).unwrap();
        assert_eq!(slid.tiles()[..4], [4, 0, 0, 0]);
        assert!(slid.tiles()[4..].iter().all(|&t| t == 0));
        assert_eq!(slid.score(), 4);
        assert_eq!(slid.turn(), 0);
        assert_eq!(slid.phase(), Phase::EnvironmentToSpawn);
    }

    #[test]
    fn chain_merges_are_not_allowed() {
        let board = board4();
        let position = rows(&board, [[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);

        let slid = position.slide(Direction::Left).unwrap();
        assert_eq!(slid.tiles()[..4], [4, 4, 0, 0]);
        assert_eq!(slid.score(), 8);
    }

    #[test]
    fn checkerboard_is_game_over() {
        let board = board4();
        let position = rows(
            &board,
            [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]],
        );

        assert!(position.game_over());
        assert!(position.legal_moves().is_empty());
    }

    #[test]
    fn full_grid_with_a_merge_is_not_over() {
        let board = board4();
        let position = rows(
            &board,
            [[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]],
        );

        assert!(!position.game_over());
        assert_eq!(position.legal_moves(), vec![Direction::Left, Direction::Right]);
    }

    #[test]
    fn empty_cell_means_not_over() {
        let board = board4();
        let position = rows(
            &board,
            [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 0]],
        );
        assert!(!position.game_over());
    }

    #[test]
    fn result_spawns_and_counts_the_ply() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = board4();
        let position = rows(&board, [[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);

        let next = position.result(Direction::Left, &mut rng).unwrap();
        assert_eq!(next.turn(), 1);
        assert_eq!(next.score(), 4);
        assert_eq!(next.phase(), Phase::AgentToSlide);
        assert_eq!(next.tiles().iter().filter(|&&t| t != 0).count(), 2);
        assert!(position.result(Direction::Up, &mut rng).is_none());
        assert!(rows(&board, [[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]])
            .result(Direction::Left, &mut rng)
            .is_none());
    }

    #[test]
    fn add_random_tile_requires_an_empty_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = board4();
        let full = rows(
            &board,
            [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]],
        );
        assert!(matches!(full.add_random_tile(&mut rng), Err(Error::NoEmptyCell)));
    }

    #[test]
    fn spawn_phase_offers_both_tile_values_per_cell() {
        let board = board4();
        let position = rows(&board, [[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let slid = position.slide(Direction::Left).unwrap();

        let moves = slid.search_legal_moves();
        assert_eq!(moves.len(), 2 * 15);
        assert_eq!(moves[0], SearchMove::Place { row: 0, col: 1, value: 2 });
        assert_eq!(moves[1], SearchMove::Place { row: 0, col: 1, value: 4 });

        let placed = slid.search_result(&moves[1]).unwrap();
        assert_eq!(placed.tile(0, 1), Some(4));
        assert_eq!(placed.turn(), 1);
        assert_eq!(placed.phase(), Phase::AgentToSlide);
    }

    #[test]
    fn search_moves_must_match_the_phase() {
        let board = board4();
        let position = rows(&board, [[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let place = SearchMove::Place { row: 3, col: 3, value: 2 };

        assert!(position.search_result(&place).is_none());
        assert_eq!(
            position.search_legal_moves(),
            vec![
                SearchMove::Slide(Direction::Down),
                SearchMove::Slide(Direction::Left),
                SearchMove::Slide(Direction::Right),
            ]
        );

        let slid = position.slide(Direction::Left).unwrap();
        assert!(slid.search_result(&SearchMove::Slide(Direction::Right)).is_none());
        assert!(slid
            .search_result(&SearchMove::Place { row: 0, col: 0, value: 2 })
            .is_none());
    }

    #[test]
    fn equality_covers_every_field() {
        let board = board4();
        let a = rows(&board, [[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let b = rows(&board, [[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(a, b);

        let later = Position::new(&board, a.tiles().to_vec(), 0, 1, Phase::AgentToSlide).unwrap();
        assert_ne!(a, later);

        let spawning =
            Position::new(&board, a.tiles().to_vec(), 0, 0, Phase::EnvironmentToSpawn).unwrap();
        assert_ne!(a, spawning);

        let other_board = board4();
        assert_ne!(a, rows(&other_board, [[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]));
    }

    #[test]
    fn rejects_malformed_grids() {
        let board = board4();
        assert!(Position::new(&board, vec![0; 15], 0, 0, Phase::AgentToSlide).is_err());
        assert!(Position::new(&board, vec![3; 16], 0, 0, Phase::AgentToSlide).is_err());
        assert!(Position::new(&board, vec![2; 16], 0, 0, Phase::EnvironmentToSpawn).is_err());
    }

    #[test]
    fn high_tile_and_display() {
        let board = Board::new(2, 0.1).unwrap();
        let position = Position::from_rows(&board, &[vec![2, 128], vec![0, 4]]).unwrap();
        assert_eq!(position.high_tile(), 128);
        assert_eq!(position.to_string(), "[  2, 128]\n[  0,   4]\n");
    }
}
