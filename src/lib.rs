//! # mcts-2048
//!
//! A simulator for the tile-merging game 2048 on an arbitrary N×N board,
//! together with a Monte Carlo Tree Search (MCTS) agent and a handful of
//! baseline agents to compare it against.
//!
//! ## Features
//!
//! - Deterministic slide/merge engine for any board dimension
//! - Immutable positions with memoized hashes, usable as table keys
//! - Transposition-tabled MCTS with UCB1 selection and random rollouts
//! - Baseline agents (random, greedy, bottom-left, flat Monte Carlo)
//! - A harness for running many games and pitting agents against each other
//!
//! ## Basic Usage
//!
//! ```
//! use mcts_2048::{Board, MCTSConfig, MCTS};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! fn main() -> Result<(), mcts_2048::Error> {
//!     let board = Board::new(4, 0.1)?;
//!     let mut rng = StdRng::seed_from_u64(2048);
//!     let mut position = board.initial_position(&mut rng);
//!
//!     let mut mcts = MCTS::new(MCTSConfig::default().with_seed(7));
//!
//!     // Play a few plies with the search choosing every move
//!     for _ in 0..3 {
//!         if position.game_over() {
//!             break;
//!         }
//!         let direction = mcts.recommend_move(&position, 100)?;
//!         position = position
//!             .result(direction, &mut rng)
//!             .ok_or(mcts_2048::Error::IllegalMove(direction))?;
//!     }
//!
//!     println!("{}", mcts.get_statistics());
//!     println!("score {} after {} turns", position.score(), position.turn());
//!     Ok(())
//! }
//! ```
//!
//! ## How It Works
//!
//! A real ply of 2048 is a slide chosen by the player followed by a random
//! tile placed by the game. For the search these are split into two levels
//! of the tree, so every state is a genuine decision point for whichever
//! party is to move:
//!
//! 1. **Selection**: descend from the root through visited states. Where the
//!    agent slides, pick the edge with the highest UCB1 value; where the
//!    environment spawns, pick the least visited child. A visited state is
//!    expanded the first time the descent passes through it.
//!
//! 2. **Simulation**: play uniformly random moves for both parties until
//!    the game is over.
//!
//! 3. **Evaluation**: the final score divided by a normalization constant.
//!
//! 4. **Backpropagation**: add the reward to every state and edge on the
//!    path.
//!
//! After the iteration budget is spent, the root move with the best average
//! reward is recommended.

pub mod agents;
pub mod board;
pub mod config;
pub mod engine;
pub mod game_state;
pub mod harness;
pub mod mcts;
pub mod policy;
pub mod position;
pub mod stats;
pub mod tree;
pub mod utils;

pub use agents::Agent;
pub use board::Board;
pub use config::MCTSConfig;
pub use engine::Direction;
pub use game_state::{Action, GameState, Phase};
pub use mcts::MCTS;
pub use policy::{BackpropagationPolicy, SelectionPolicy, SimulationPolicy};
pub use position::{Position, SearchMove};
pub use stats::SearchStatistics;
pub use tree::{Edge, NodeStats, TranspositionTable};

/// Error types for the simulator and the search
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A board or search configuration was rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An operation was called with an argument that violates its preconditions
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A tile had to be placed on a grid with no empty cell
    #[error("No empty cell available for a new tile")]
    NoEmptyCell,

    /// No legal move is available from the current position
    #[error("No legal moves available from current position")]
    NoLegalMoves,

    /// A move was played that does not change the grid
    #[error("Illegal move: {0}")]
    IllegalMove(Direction),

    /// Reading input for interactive play failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulator and search operations
pub type Result<T> = std::result::Result<T, Error>;
