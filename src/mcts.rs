//! Main implementation of the Monte Carlo Tree Search algorithm
//!
//! This module contains the search engine, orchestrating the phases of
//! selection (with lazy expansion), simulation, and backpropagation over a
//! transposition table that lives for exactly one search.

use std::time::Instant;

use log::{debug, trace};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    config::MCTSConfig,
    engine::Direction,
    game_state::{GameState, Phase},
    policy::{
        backpropagation::{BackpropagationPolicy, StandardPolicy},
        selection::{LeastVisitedPolicy, SelectionPolicy, UCB1Policy},
        simulation::{RandomPolicy, SimulationPolicy},
    },
    position::{Position, SearchMove},
    stats::SearchStatistics,
    tree::{Edge, TranspositionTable},
    Error, Result,
};

/// States visited by one iteration, each with the index of the edge taken
type SearchPath<S> = Vec<(S, usize)>;

/// The Monte Carlo Tree Search engine
///
/// Each call to [`search`](MCTS::search) builds a fresh transposition table,
/// runs the configured number of iterations and returns the recommended
/// move. Randomness comes from the engine's own [`StdRng`], so a seeded
/// engine reproduces its recommendations exactly.
///
/// # Example
///
/// ```
/// use mcts_2048::{Board, MCTSConfig, MCTS};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let board = Board::new(3, 0.1)?;
/// let mut rng = StdRng::seed_from_u64(1);
/// let position = board.initial_position(&mut rng);
///
/// let mut mcts = MCTS::new(MCTSConfig::default().with_seed(9));
/// let direction = mcts.recommend_move(&position, 50)?;
///
/// assert!(position.legal_moves().contains(&direction));
/// # Ok::<(), mcts_2048::Error>(())
/// ```
pub struct MCTS<S: GameState> {
    /// Configuration for the search
    config: MCTSConfig,

    /// Source of all random draws made by the engine
    rng: StdRng,

    /// Statistics gathered during the last search
    statistics: SearchStatistics,

    /// Policy for choosing edges where the agent is to move
    selection_policy: Box<dyn SelectionPolicy<S>>,

    /// Policy for choosing edges where the environment is to move
    chance_policy: Box<dyn SelectionPolicy<S>>,

    /// Policy for simulating games during the simulation phase
    simulation_policy: Box<dyn SimulationPolicy<S>>,

    /// Policy for backpropagating results
    backpropagation_policy: Box<dyn BackpropagationPolicy<S>>,
}

impl<S: GameState + 'static> MCTS<S> {
    /// Creates a new engine with the given configuration
    ///
    /// The random source is seeded from `config.seed` if set, otherwise
    /// from entropy.
    pub fn new(config: MCTSConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let selection_policy: Box<dyn SelectionPolicy<S>> =
            Box::new(UCB1Policy::new(config.exploration_constant));

        let chance_policy: Box<dyn SelectionPolicy<S>> = Box::new(LeastVisitedPolicy::new());

        let simulation_policy: Box<dyn SimulationPolicy<S>> = Box::new(RandomPolicy::new());

        let backpropagation_policy: Box<dyn BackpropagationPolicy<S>> =
            Box::new(StandardPolicy::new());

        MCTS {
            config,
            rng,
            statistics: SearchStatistics::new(),
            selection_policy,
            chance_policy,
            simulation_policy,
            backpropagation_policy,
        }
    }

    /// Replaces the engine's random source
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Sets the selection policy used where the agent is to move
    pub fn with_selection_policy<P: SelectionPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.selection_policy = Box::new(policy);
        self
    }

    /// Sets the selection policy used where the environment is to move
    pub fn with_chance_policy<P: SelectionPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.chance_policy = Box::new(policy);
        self
    }

    /// Sets the simulation policy to use
    pub fn with_simulation_policy<P: SimulationPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.simulation_policy = Box::new(policy);
        self
    }

    /// Sets the backpropagation policy to use
    pub fn with_backpropagation_policy<P: BackpropagationPolicy<S> + 'static>(
        mut self,
        policy: P,
    ) -> Self {
        self.backpropagation_policy = Box::new(policy);
        self
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &MCTSConfig {
        &self.config
    }

    /// Runs `config.max_iterations` iterations and returns the best move
    pub fn search(&mut self, root: &S) -> Result<S::Action> {
        self.search_for_iterations(root, self.config.max_iterations)
    }

    /// Runs the given number of iterations and returns the best move
    ///
    /// Fails with [`Error::InvalidArgument`] if `iterations` is zero or the
    /// root is terminal or offers no moves.
    pub fn search_for_iterations(&mut self, root: &S, iterations: usize) -> Result<S::Action> {
        let table = self.build_table(root, iterations)?;
        self.recommendation(root, &table)
    }

    /// Runs the given number of iterations and returns the populated table
    ///
    /// This is the search without the final recommendation, useful for
    /// inspecting the statistics it gathered.
    pub fn build_table(&mut self, root: &S, iterations: usize) -> Result<TranspositionTable<S>> {
        self.config.validate()?;

        if iterations < 1 {
            return Err(Error::InvalidArgument(
                "search needs at least one iteration".to_string(),
            ));
        }

        if root.is_terminal() {
            return Err(Error::InvalidArgument(
                "cannot search from a terminal state".to_string(),
            ));
        }

        if root.legal_actions().is_empty() {
            return Err(Error::InvalidArgument(
                "cannot search from a state with no moves".to_string(),
            ));
        }

        self.statistics = SearchStatistics::new();
        let start_time = Instant::now();
        let mut table = TranspositionTable::new(root);

        for i in 0..iterations {
            self.execute_iteration(root, &mut table);
            self.statistics.iterations = i + 1;
        }

        self.statistics.elapsed = start_time.elapsed();
        self.statistics.table_size = table.len();

        debug!(
            "search finished: {} iterations, {} states, depth {}, {:.1} it/s",
            self.statistics.iterations,
            self.statistics.table_size,
            self.statistics.max_depth,
            self.statistics.throughput()
        );

        Ok(table)
    }

    /// Execute a single iteration of the algorithm
    fn execute_iteration(&mut self, root: &S, table: &mut TranspositionTable<S>) {
        // 1. Selection, expanding states on their second visit
        let (path, leaf) = self.selection(root, table);

        // 2. Simulation
        let reward = self.simulation(&leaf);

        // 3. Backpropagation
        self.backpropagation(table, &path, &leaf, reward);

        trace!("iteration: depth {}, reward {:.6}", path.len(), reward);
    }

    /// Selection phase: descend from the root to a leaf
    ///
    /// The descent stops at a terminal state or at a state that has not been
    /// visited yet. A visited state without edges is expanded on the way.
    fn selection(&mut self, root: &S, table: &mut TranspositionTable<S>) -> (SearchPath<S>, S) {
        let mut path = SearchPath::new();
        let mut leaf = root.clone();

        while !leaf.is_terminal() && table.visits(&leaf) > 0 {
            if !table.is_expanded(&leaf) {
                let added = table.expand(&leaf);
                self.statistics.expansions += 1;
                trace!("expanded state with {} new children", added);
            }

            let node = match table.get(&leaf) {
                Some(node) => node,
                None => break,
            };

            let policy = match leaf.phase() {
                Phase::AgentToSlide => &self.selection_policy,
                Phase::EnvironmentToSpawn => &self.chance_policy,
            };

            let index = match policy.select_edge(node, table) {
                Some(index) => index,
                None => break,
            };

            let child = node.edges()[index].child.clone();
            path.push((leaf, index));
            leaf = child;
        }

        self.statistics.max_depth = self.statistics.max_depth.max(path.len());
        if leaf.is_terminal() {
            self.statistics.terminal_leaves += 1;
        }

        (path, leaf)
    }

    /// Simulation phase: play out the game and normalize its final value
    fn simulation(&mut self, leaf: &S) -> f64 {
        let terminal = self.simulation_policy.simulate(leaf, &mut self.rng);
        let reward = terminal.value() / self.config.reward_normalization;

        if reward > self.statistics.best_reward {
            self.statistics.best_reward = reward;
        }

        reward
    }

    /// Backpropagation phase: update every state and edge on the path
    fn backpropagation(
        &self,
        table: &mut TranspositionTable<S>,
        path: &SearchPath<S>,
        leaf: &S,
        reward: f64,
    ) {
        for (state, index) in path {
            if let Some(node) = table.get_mut(state) {
                self.backpropagation_policy.update_node(node, reward);

                if let Some(edge) = node.edges.as_mut().and_then(|edges| edges.get_mut(*index)) {
                    self.backpropagation_policy.update_edge(edge, reward);
                }
            }
        }

        if let Some(node) = table.get_mut(leaf) {
            self.backpropagation_policy.update_node(node, reward);
        }
    }

    /// Picks the root move with the best average reward
    ///
    /// An edge that was never taken is returned as soon as it is met. If the
    /// root was never expanded a uniformly random legal move is returned.
    fn recommendation(&mut self, root: &S, table: &TranspositionTable<S>) -> Result<S::Action> {
        let edges = match table.get(root).and_then(|node| node.edges.as_ref()) {
            Some(edges) => edges,
            None => {
                return root
                    .legal_actions()
                    .choose(&mut self.rng)
                    .cloned()
                    .ok_or(Error::NoLegalMoves);
            }
        };

        let mut best: Option<(&Edge<S>, f64)> = None;

        for edge in edges {
            if edge.visits == 0 {
                return Ok(edge.action.clone());
            }

            let value = edge.value();
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((edge, value));
            }
        }

        best.map(|(edge, _)| edge.action.clone())
            .ok_or(Error::NoLegalMoves)
    }

    /// Returns the statistics of the last search
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }
}

impl MCTS<Position> {
    /// Recommends a slide direction for `position`
    ///
    /// Fails with [`Error::InvalidArgument`] if `iterations` is zero, the
    /// position has no legal slide (including a finished game), or it is
    /// awaiting a tile spawn.
    pub fn recommend_move(&mut self, position: &Position, iterations: usize) -> Result<Direction> {
        if position.phase() != Phase::AgentToSlide {
            return Err(Error::InvalidArgument(
                "cannot recommend a slide while a tile spawn is pending".to_string(),
            ));
        }

        match self.search_for_iterations(position, iterations)? {
            SearchMove::Slide(direction) => Ok(direction),
            other => Err(Error::InvalidArgument(format!(
                "search recommended a non-slide move: {:?}",
                other
            ))),
        }
    }
}
