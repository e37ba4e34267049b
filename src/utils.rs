//! Utility functions for the search
//!
//! Helpers for the UCB1 arithmetic used by the selection policy.

/// Calculates the exploitation term for UCB1
///
/// This is simply the average reward of a child state.
pub fn exploitation_term(total_reward: f64, visits: u64) -> f64 {
    if visits == 0 {
        return 0.0;
    }
    total_reward / visits as f64
}

/// Calculates the exploration term for UCB1
///
/// `sqrt(exploration_constant * ln(parent_visits) / edge_visits)`; infinite
/// for an edge that has never been taken.
pub fn exploration_term(parent_visits: u64, edge_visits: u64, exploration_constant: f64) -> f64 {
    if edge_visits == 0 {
        return f64::INFINITY;
    }

    (exploration_constant * (parent_visits as f64).ln() / edge_visits as f64).sqrt()
}

/// Calculates the UCB1 value of an edge
///
/// The exploitation part comes from the child state's statistics while the
/// exploration part uses the edge's own visit count, since with a
/// transposition table a child can be reached through several parents.
pub fn ucb1_value(
    child_reward: f64,
    child_visits: u64,
    parent_visits: u64,
    edge_visits: u64,
    exploration_constant: f64,
) -> f64 {
    if child_visits == 0 || edge_visits == 0 {
        return f64::INFINITY;
    }

    exploitation_term(child_reward, child_visits)
        + exploration_term(parent_visits, edge_visits, exploration_constant)
}
