//! Backpropagation policies for the search
//!
//! Backpropagation policies determine how statistics are updated along the
//! path of an iteration once its reward is known.

use crate::{
    game_state::GameState,
    tree::{Edge, NodeStats},
};

/// Trait for policies that backpropagate simulation rewards
pub trait BackpropagationPolicy<S: GameState> {
    /// Updates the statistics of a state on the path
    fn update_node(&self, node: &mut NodeStats<S>, reward: f64);

    /// Updates the statistics of an edge on the path
    fn update_edge(&self, edge: &mut Edge<S>, reward: f64);

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn BackpropagationPolicy<S>>;
}

/// Standard backpropagation policy
///
/// This policy simply adds one visit and the reward.
#[derive(Debug, Clone)]
pub struct StandardPolicy;

impl StandardPolicy {
    /// Creates a new standard policy
    pub fn new() -> Self {
        StandardPolicy
    }
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameState + 'static> BackpropagationPolicy<S> for StandardPolicy {
    fn update_node(&self, node: &mut NodeStats<S>, reward: f64) {
        node.total_visits += 1;
        node.total_reward += reward;
    }

    fn update_edge(&self, edge: &mut Edge<S>, reward: f64) {
        edge.visits += 1;
        edge.reward += reward;
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy<S>> {
        Box::new(self.clone())
    }
}

// Implement BackpropagationPolicy for Box<dyn BackpropagationPolicy>
impl<S: GameState> BackpropagationPolicy<S> for Box<dyn BackpropagationPolicy<S>> {
    fn update_node(&self, node: &mut NodeStats<S>, reward: f64) {
        (**self).update_node(node, reward)
    }

    fn update_edge(&self, edge: &mut Edge<S>, reward: f64) {
        (**self).update_edge(edge, reward)
    }

    fn clone_box(&self) -> Box<dyn BackpropagationPolicy<S>> {
        (**self).clone_box()
    }
}
