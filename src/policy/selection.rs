//! Selection policies for the search
//!
//! Selection policies choose which edge to follow out of an expanded state
//! during the descent phase of an iteration. The engine uses one policy for
//! states where the agent slides and another for states where the
//! environment spawns a tile.

use crate::{
    game_state::GameState,
    tree::{NodeStats, TranspositionTable},
    utils,
};

/// Trait for policies that select an edge to descend through
pub trait SelectionPolicy<S: GameState> {
    /// Returns the index of the chosen edge in `node.edges()`
    ///
    /// Returns `None` if the node has no edges.
    fn select_edge(&self, node: &NodeStats<S>, table: &TranspositionTable<S>) -> Option<usize>;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn SelectionPolicy<S>>;
}

/// Upper Confidence Bound 1 (UCB1) selection policy
///
/// Picks the edge maximizing
///
/// ```text
/// child_reward / child_visits + sqrt(c * ln(node_visits) / edge_visits)
/// ```
///
/// An edge whose child has never been visited, or which has never been
/// taken itself, is returned immediately, earliest first. Among scored
/// edges the earliest maximum wins.
#[derive(Debug, Clone)]
pub struct UCB1Policy {
    /// Weight inside the square root of the exploration term
    pub exploration_constant: f64,
}

impl UCB1Policy {
    /// Creates a new UCB1 policy with the given exploration constant
    pub fn new(exploration_constant: f64) -> Self {
        UCB1Policy {
            exploration_constant,
        }
    }
}

impl Default for UCB1Policy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl<S: GameState + 'static> SelectionPolicy<S> for UCB1Policy {
    fn select_edge(&self, node: &NodeStats<S>, table: &TranspositionTable<S>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (i, edge) in node.edges().iter().enumerate() {
            let (child_visits, child_reward) = table
                .get(&edge.child)
                .map_or((0, 0.0), |child| (child.total_visits, child.total_reward));

            if child_visits == 0 || edge.visits == 0 {
                return Some(i);
            }

            let value = utils::ucb1_value(
                child_reward,
                child_visits,
                node.total_visits,
                edge.visits,
                self.exploration_constant,
            );

            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((i, value));
            }
        }

        best.map(|(i, _)| i)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy<S>> {
        Box::new(self.clone())
    }
}

/// Least-visited selection policy for chance states
///
/// Picks the edge whose child state has the fewest total visits, earliest
/// first on ties. Balancing visit counts stands in for sampling the real
/// spawn distribution; it ignores the relative likelihood of 2 and 4 tiles
/// and is not guaranteed to converge to the true expected value.
#[derive(Debug, Clone, Default)]
pub struct LeastVisitedPolicy;

impl LeastVisitedPolicy {
    /// Creates a new least-visited policy
    pub fn new() -> Self {
        LeastVisitedPolicy
    }
}

impl<S: GameState + 'static> SelectionPolicy<S> for LeastVisitedPolicy {
    fn select_edge(&self, node: &NodeStats<S>, table: &TranspositionTable<S>) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;

        for (i, edge) in node.edges().iter().enumerate() {
            let visits = table.visits(&edge.child);
            if best.map_or(true, |(_, fewest)| visits < fewest) {
                best = Some((i, visits));
            }
        }

        best.map(|(i, _)| i)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy<S>> {
        Box::new(self.clone())
    }
}

// Implement SelectionPolicy for Box<dyn SelectionPolicy>
impl<S: GameState> SelectionPolicy<S> for Box<dyn SelectionPolicy<S>> {
    fn select_edge(&self, node: &NodeStats<S>, table: &TranspositionTable<S>) -> Option<usize> {
        (**self).select_edge(node, table)
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy<S>> {
        (**self).clone_box()
    }
}
