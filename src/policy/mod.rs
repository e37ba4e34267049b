//! Policies for the phases of the search
//!
//! This module contains the pluggable pieces of the MCTS iteration:
//! - Selection policies: how to choose an edge out of an expanded state
//! - Simulation policies: how to play out a game from a leaf
//! - Backpropagation policies: how to update statistics along the path

pub mod backpropagation;
pub mod selection;
pub mod simulation;

pub use backpropagation::{BackpropagationPolicy, StandardPolicy};
pub use selection::{LeastVisitedPolicy, SelectionPolicy, UCB1Policy};
pub use simulation::{RandomPolicy, SimulationPolicy};
