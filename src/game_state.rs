//! Traits defining the state contract used by the search engine.
//!
//! The search treats every state as a decision point for whichever party is
//! to move. In 2048 that alternates between the agent (choosing a slide) and
//! the environment (placing a tile), so a single game ply spans two levels
//! of the search tree.

use std::fmt::Debug;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::RngCore;

/// Trait for moves that can be made from a search state
///
/// Actions are used as edge labels in the transposition table, so they must
/// be comparable and hashable.
pub trait Action: Clone + Debug + Eq + Hash {}

impl<T: Clone + Debug + Eq + Hash> Action for T {}

/// Which party makes the next decision in a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// The agent must choose a slide direction
    AgentToSlide,
    /// The environment must place a tile on an empty cell
    EnvironmentToSpawn,
}

/// Trait defining the state interface required by the search
///
/// States are immutable values: `apply_action` never modifies `self`. The
/// search uses states directly as transposition-table keys, so equal states
/// must hash equally.
pub trait GameState: Clone + Eq + Hash {
    /// The type of moves that can be made from this state
    type Action: Action;

    /// Returns every move available from this state, in a stable order
    ///
    /// The order is significant: ties during selection and recommendation
    /// are resolved in favour of the earliest move.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Applies a move, returning the successor state
    ///
    /// Returns `None` if the move cannot be made from this state.
    fn apply_action(&self, action: &Self::Action) -> Option<Self>;

    /// Returns true if the game has ended
    fn is_terminal(&self) -> bool;

    /// Returns the party that is to move
    fn phase(&self) -> Phase;

    /// Raw value of this state, before any normalization
    fn value(&self) -> f64;

    /// Plays uniformly random moves from this state until the game is over
    ///
    /// Returns the state at which the playout stopped. The playout also
    /// stops early if a non-terminal state offers no moves.
    fn simulate_random_playout(&self, rng: &mut dyn RngCore) -> Self {
        let mut current = self.clone();

        while !current.is_terminal() {
            let legal_actions = current.legal_actions();
            let next = legal_actions
                .choose(&mut *rng)
                .and_then(|action| current.apply_action(action));

            match next {
                Some(state) => current = state,
                None => break,
            }
        }

        current
    }
}
