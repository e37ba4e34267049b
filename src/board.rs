//! Board configuration
//!
//! A [`Board`] fixes the parameters of one simulation: the grid dimension and
//! the probability that a spawned tile is a 4. It is a cheap handle to
//! shared, immutable configuration; every [`Position`] derived from it keeps
//! a handle, and two handles are equal only if they refer to the same
//! configuration.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::{position::Position, Error, Result};

/// Default probability that a newly spawned tile is a 4 rather than a 2
pub const DEFAULT_FOUR_SPAWN_PROBABILITY: f64 = 0.1;

#[derive(Debug)]
struct BoardConfig {
    dimension: usize,
    four_spawn_probability: f64,
}

/// Shared, immutable configuration for a square 2048 board
///
/// # Example
///
/// ```
/// use mcts_2048::Board;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let board = Board::new(4, 0.1)?;
/// let mut rng = StdRng::seed_from_u64(7);
/// let position = board.initial_position(&mut rng);
///
/// assert_eq!(position.empty_cells().len(), 14);
/// assert_eq!(position.turn(), 0);
/// # Ok::<(), mcts_2048::Error>(())
/// ```
#[derive(Clone)]
pub struct Board {
    config: Arc<BoardConfig>,
}

impl Board {
    /// Creates a board configuration
    ///
    /// Fails with [`Error::InvalidConfiguration`] if `dimension` is zero or
    /// `four_spawn_probability` is not within `[0, 1]`.
    pub fn new(dimension: usize, four_spawn_probability: f64) -> Result<Self> {
        if dimension < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "board dimension must be positive: {}",
                dimension
            )));
        }

        if !(0.0..=1.0).contains(&four_spawn_probability) {
            return Err(Error::InvalidConfiguration(format!(
                "four-spawn probability must be within [0, 1]: {}",
                four_spawn_probability
            )));
        }

        Ok(Board {
            config: Arc::new(BoardConfig {
                dimension,
                four_spawn_probability,
            }),
        })
    }

    /// Side length of the square grid
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Number of cells on the grid
    pub fn cell_count(&self) -> usize {
        self.config.dimension * self.config.dimension
    }

    /// Probability that a spawned tile is a 4
    pub fn four_spawn_probability(&self) -> f64 {
        self.config.four_spawn_probability
    }

    /// Draws the value of a newly spawned tile
    pub fn random_tile_value<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        if rng.gen::<f64>() < self.config.four_spawn_probability {
            4
        } else {
            2
        }
    }

    /// Creates the starting position: an empty grid with two random tiles
    ///
    /// On a 1x1 board only a single tile fits. The starting position is at
    /// turn 0 with the agent to move.
    pub fn initial_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let mut position = Position::empty(self);

        for _ in 0..2 {
            if let Some(next) = position.with_setup_tile(rng) {
                position = next;
            }
        }

        position
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.config, &other.config)
    }
}

impl Eq for Board {}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("dimension", &self.config.dimension)
            .field("four_spawn_probability", &self.config.four_spawn_probability)
            .finish()
    }
}
