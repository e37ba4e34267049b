//! Configuration options for the search
//!
//! This module defines the parameters that control the behavior of the
//! MCTS engine.

use crate::{Error, Result};

/// Divisor applied to terminal scores so rewards stay near `[0, 1]`
pub const DEFAULT_REWARD_NORMALIZATION: f64 = 3_932_156.0;

/// Configuration for the MCTS engine
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use mcts_2048::MCTSConfig;
///
/// let config = MCTSConfig::default()
///     .with_exploration_constant(0.5)
///     .with_max_iterations(2_000)
///     .with_seed(42);
///
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MCTSConfig {
    /// Weight inside the square root of the UCB1 exploration term
    ///
    /// The exploration bonus of an edge is
    /// `sqrt(exploration_constant * ln(node_visits) / edge_visits)`.
    pub exploration_constant: f64,

    /// Number of iterations run by [`MCTS::search`](crate::MCTS::search)
    pub max_iterations: usize,

    /// Terminal scores are divided by this to form rollout rewards
    ///
    /// Purely an empirical scaling; it has no effect on which move wins
    /// as long as it is positive, only on the balance with exploration.
    pub reward_normalization: f64,

    /// Seed for the engine's random source; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for MCTSConfig {
    fn default() -> Self {
        MCTSConfig {
            exploration_constant: 0.5,
            max_iterations: 1_000,
            reward_normalization: DEFAULT_REWARD_NORMALIZATION,
            seed: None,
        }
    }
}

impl MCTSConfig {
    /// Sets the exploration constant
    pub fn with_exploration_constant(mut self, constant: f64) -> Self {
        self.exploration_constant = constant;
        self
    }

    /// Sets the number of iterations
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the reward normalization divisor
    pub fn with_reward_normalization(mut self, normalization: f64) -> Self {
        self.reward_normalization = normalization;
        self
    }

    /// Seeds the engine's random source
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that every parameter is usable
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "exploration constant must be finite and non-negative: {}",
                self.exploration_constant
            )));
        }

        if !self.reward_normalization.is_finite() || self.reward_normalization <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "reward normalization must be finite and positive: {}",
                self.reward_normalization
            )));
        }

        Ok(())
    }
}
