//! Simulation policies for the search
//!
//! Simulation policies play a game out from a leaf state to estimate that
//! state's value.

use rand::RngCore;

use crate::game_state::GameState;

/// Trait for policies that play games to completion
pub trait SimulationPolicy<S: GameState> {
    /// Plays from `state` until the game ends and returns the final state
    fn simulate(&self, state: &S, rng: &mut dyn RngCore) -> S;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SimulationPolicy<S>>;
}

/// Random simulation policy
///
/// This policy plays uniformly random legal moves until the game ends. In
/// 2048 the environment's turns are random too, with every (cell, value)
/// placement equally likely.
#[derive(Debug, Clone)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Creates a new random policy
    pub fn new() -> Self {
        RandomPolicy
    }
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameState> SimulationPolicy<S> for RandomPolicy {
    fn simulate(&self, state: &S, rng: &mut dyn RngCore) -> S {
        state.simulate_random_playout(rng)
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<S>> {
        Box::new(self.clone())
    }
}

// Implement SimulationPolicy for Box<dyn SimulationPolicy>
impl<S: GameState> SimulationPolicy<S> for Box<dyn SimulationPolicy<S>> {
    fn simulate(&self, state: &S, rng: &mut dyn RngCore) -> S {
        (**self).simulate(state, rng)
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<S>> {
        (**self).clone_box()
    }
}
