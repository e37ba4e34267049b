//! Transposition table for Monte Carlo Tree Search
//!
//! The search graph is stored as a map from state to accumulated statistics
//! rather than as an explicit tree, so different move sequences reaching the
//! same state share one entry.

use std::collections::HashMap;
use std::fmt;

use crate::game_state::GameState;

/// Statistics for one move out of a node
#[derive(Debug, Clone)]
pub struct Edge<S: GameState> {
    /// The move this edge represents
    pub action: S::Action,

    /// The state the move leads to
    pub child: S,

    /// Number of iterations that passed through this edge
    pub visits: u64,

    /// Sum of rewards of those iterations
    pub reward: f64,
}

impl<S: GameState> Edge<S> {
    fn new(action: S::Action, child: S) -> Self {
        Edge {
            action,
            child,
            visits: 0,
            reward: 0.0,
        }
    }

    /// Average reward through this edge, 0 if never visited
    pub fn value(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.reward / self.visits as f64
    }
}

/// Statistics for one state in the table
#[derive(Debug, Clone)]
pub struct NodeStats<S: GameState> {
    /// Number of iterations that reached this state
    pub total_visits: u64,

    /// Sum of rewards of those iterations
    pub total_reward: f64,

    /// Outgoing edges in legal-move order, `None` until expanded
    pub edges: Option<Vec<Edge<S>>>,
}

impl<S: GameState> NodeStats<S> {
    /// A node that has never been visited nor expanded
    pub fn new() -> Self {
        NodeStats {
            total_visits: 0,
            total_reward: 0.0,
            edges: None,
        }
    }

    /// Average reward of this node, 0 if never visited
    pub fn value(&self) -> f64 {
        if self.total_visits == 0 {
            return 0.0;
        }
        self.total_reward / self.total_visits as f64
    }

    /// Returns true once the outgoing edges have been populated
    pub fn is_expanded(&self) -> bool {
        self.edges.is_some()
    }

    /// Outgoing edges, empty if not yet expanded
    pub fn edges(&self) -> &[Edge<S>] {
        self.edges.as_deref().unwrap_or(&[])
    }
}

impl<S: GameState> Default for NodeStats<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Map from state to search statistics, scoped to a single search
pub struct TranspositionTable<S: GameState> {
    nodes: HashMap<S, NodeStats<S>>,
}

impl<S: GameState> TranspositionTable<S> {
    /// Creates a table holding only the root, with zero statistics
    pub fn new(root: &S) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), NodeStats::new());
        TranspositionTable { nodes }
    }

    /// Statistics for `state`, if it has been reached
    pub fn get(&self, state: &S) -> Option<&NodeStats<S>> {
        self.nodes.get(state)
    }

    /// Mutable statistics for `state`, if it has been reached
    pub fn get_mut(&mut self, state: &S) -> Option<&mut NodeStats<S>> {
        self.nodes.get_mut(state)
    }

    /// Returns true if `state` has an entry
    pub fn contains(&self, state: &S) -> bool {
        self.nodes.contains_key(state)
    }

    /// Total visits recorded for `state`, 0 if absent
    pub fn visits(&self, state: &S) -> u64 {
        self.nodes.get(state).map_or(0, |node| node.total_visits)
    }

    /// Returns true if `state` has an entry whose edges are populated
    pub fn is_expanded(&self, state: &S) -> bool {
        self.nodes.get(state).map_or(false, NodeStats::is_expanded)
    }

    /// Number of states in the table
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the table holds no states
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Populates the edges of `state` and inserts unseen children
    ///
    /// Children already in the table keep their statistics. Expanding an
    /// already expanded state does nothing. Returns the number of new
    /// entries.
    pub fn expand(&mut self, state: &S) -> usize {
        if self.is_expanded(state) {
            return 0;
        }

        let edges: Vec<Edge<S>> = state
            .legal_actions()
            .into_iter()
            .filter_map(|action| {
                let child = state.apply_action(&action)?;
                Some(Edge::new(action, child))
            })
            .collect();

        let before = self.nodes.len();
        for edge in &edges {
            self.nodes.entry(edge.child.clone()).or_default();
        }
        let added = self.nodes.len() - before;

        self.nodes.entry(state.clone()).or_default().edges = Some(edges);
        added
    }
}

impl<S: GameState> fmt::Debug for TranspositionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("len", &self.nodes.len())
            .finish()
    }
}
