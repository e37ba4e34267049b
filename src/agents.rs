//! Agents that choose a slide for a position
//!
//! Every agent implements [`Agent`]. Agents that need randomness own a
//! [`StdRng`] so games can be replayed from a seed.

use std::fmt;
use std::str::FromStr;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{config::MCTSConfig, engine::Direction, mcts::MCTS, position::Position, Error, Result};

/// A policy mapping positions to slide directions
pub trait Agent {
    /// Short human-readable name
    fn name(&self) -> String;

    /// Chooses a legal slide for `position`
    ///
    /// Fails with [`Error::NoLegalMoves`] if no slide is legal.
    fn choose_move(&mut self, position: &Position) -> Result<Direction>;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn choose_move(&mut self, position: &Position) -> Result<Direction> {
        (**self).choose_move(position)
    }
}

fn legal_moves_or_err(position: &Position) -> Result<Vec<Direction>> {
    let moves = position.legal_moves();
    if moves.is_empty() {
        return Err(Error::NoLegalMoves);
    }
    Ok(moves)
}

/// Picks a uniformly random legal move
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(rng: StdRng) -> Self {
        RandomAgent { rng }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> String {
        "random".to_string()
    }

    fn choose_move(&mut self, position: &Position) -> Result<Direction> {
        legal_moves_or_err(position)?
            .choose(&mut self.rng)
            .copied()
            .ok_or(Error::NoLegalMoves)
    }
}

/// Picks the move with the highest score right after the slide
///
/// The spawned tile never changes the score, so the slide alone decides.
/// The earliest move wins ties.
#[derive(Debug, Clone, Default)]
pub struct GreedyAgent;

impl Agent for GreedyAgent {
    fn name(&self) -> String {
        "greedy".to_string()
    }

    fn choose_move(&mut self, position: &Position) -> Result<Direction> {
        let mut best: Option<(Direction, u64)> = None;

        for direction in legal_moves_or_err(position)? {
            let score = position.slide(direction).map_or(0, |p| p.score());
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((direction, score));
            }
        }

        best.map(|(direction, _)| direction).ok_or(Error::NoLegalMoves)
    }
}

/// Picks the first legal move of left, down, right, up
#[derive(Debug, Clone, Default)]
pub struct BottomLeftAgent;

impl BottomLeftAgent {
    const PRIORITY: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
}

impl Agent for BottomLeftAgent {
    fn name(&self) -> String {
        "bottom-left".to_string()
    }

    fn choose_move(&mut self, position: &Position) -> Result<Direction> {
        Self::PRIORITY
            .into_iter()
            .find(|&d| position.slide(d).is_some())
            .ok_or(Error::NoLegalMoves)
    }
}

/// Flat Monte Carlo: averages random playouts per first move
///
/// The rollout budget is split evenly between the legal moves; each rollout
/// plays the candidate move and then uniformly random moves until the game
/// ends. The move with the largest total final score wins, earliest first.
#[derive(Debug, Clone)]
pub struct FlatMonteCarloAgent {
    games: usize,
    rng: StdRng,
}

impl FlatMonteCarloAgent {
    /// Fails with [`Error::InvalidArgument`] if `games` is zero
    pub fn new(games: usize, rng: StdRng) -> Result<Self> {
        if games < 1 {
            return Err(Error::InvalidArgument(
                "flat Monte Carlo needs at least one game".to_string(),
            ));
        }
        Ok(FlatMonteCarloAgent { games, rng })
    }

    fn rollout(&mut self, position: &Position, first: Direction) -> u64 {
        let mut current = match position.result(first, &mut self.rng) {
            Some(next) => next,
            None => return position.score(),
        };

        while !current.game_over() {
            let next = current
                .legal_moves()
                .choose(&mut self.rng)
                .and_then(|&d| current.result(d, &mut self.rng));

            match next {
                Some(next) => current = next,
                None => break,
            }
        }

        current.score()
    }
}

impl Agent for FlatMonteCarloAgent {
    fn name(&self) -> String {
        format!("flat-mc({})", self.games)
    }

    fn choose_move(&mut self, position: &Position) -> Result<Direction> {
        let moves = legal_moves_or_err(position)?;
        let per_move = self.games / moves.len();
        let mut best: Option<(Direction, u64)> = None;

        for direction in moves {
            let total: u64 = (0..per_move).map(|_| self.rollout(position, direction)).sum();
            if best.map_or(true, |(_, best_total)| total > best_total) {
                best = Some((direction, total));
            }
        }

        best.map(|(direction, _)| direction).ok_or(Error::NoLegalMoves)
    }
}

/// Chooses moves with a fresh MCTS search per position
pub struct MctsAgent {
    iterations: usize,
    mcts: MCTS<Position>,
}

impl MctsAgent {
    /// Fails with [`Error::InvalidArgument`] if `iterations` is zero
    pub fn new(iterations: usize, config: MCTSConfig) -> Result<Self> {
        if iterations < 1 {
            return Err(Error::InvalidArgument(
                "MCTS needs at least one iteration".to_string(),
            ));
        }
        config.validate()?;

        Ok(MctsAgent {
            iterations,
            mcts: MCTS::new(config),
        })
    }

    /// The engine backing this agent
    pub fn engine(&self) -> &MCTS<Position> {
        &self.mcts
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> String {
        format!("mcts({})", self.iterations)
    }

    fn choose_move(&mut self, position: &Position) -> Result<Direction> {
        legal_moves_or_err(position)?;
        self.mcts.recommend_move(position, self.iterations)
    }
}

/// A parsed description of an agent, as given on the command line
///
/// `r` (random), `g` (greedy), `b` (bottom-left), `f:<games>` (flat Monte
/// Carlo) and `m:<iterations>` (MCTS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSpec {
    Random,
    Greedy,
    BottomLeft,
    FlatMonteCarlo(usize),
    Mcts(usize),
}

impl AgentSpec {
    /// Builds the agent, seeding its randomness from `seed` if given
    pub fn build(&self, seed: Option<u64>) -> Result<Box<dyn Agent>> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let agent: Box<dyn Agent> = match *self {
            AgentSpec::Random => Box::new(RandomAgent::new(rng)),
            AgentSpec::Greedy => Box::new(GreedyAgent),
            AgentSpec::BottomLeft => Box::new(BottomLeftAgent),
            AgentSpec::FlatMonteCarlo(games) => Box::new(FlatMonteCarloAgent::new(games, rng)?),
            AgentSpec::Mcts(iterations) => {
                let config = match seed {
                    Some(seed) => MCTSConfig::default().with_seed(seed),
                    None => MCTSConfig::default(),
                };
                Box::new(MctsAgent::new(iterations, config)?)
            }
        };

        Ok(agent)
    }
}

impl FromStr for AgentSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };

        let count = |what: &str| -> Result<usize> {
            let arg = arg.ok_or_else(|| {
                Error::InvalidArgument(format!("agent '{}' needs a {} argument", kind, what))
            })?;
            match arg.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(Error::InvalidArgument(format!(
                    "{} must be a positive integer: {}",
                    what, arg
                ))),
            }
        };

        match (kind, arg) {
            ("r", None) => Ok(AgentSpec::Random),
            ("g", None) => Ok(AgentSpec::Greedy),
            ("b", None) => Ok(AgentSpec::BottomLeft),
            ("f", _) => Ok(AgentSpec::FlatMonteCarlo(count("games")?)),
            ("m", _) => Ok(AgentSpec::Mcts(count("iterations")?)),
            _ => Err(Error::InvalidArgument(format!("agent not recognized: {}", s))),
        }
    }
}

impl fmt::Display for AgentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentSpec::Random => write!(f, "r"),
            AgentSpec::Greedy => write!(f, "g"),
            AgentSpec::BottomLeft => write!(f, "b"),
            AgentSpec::FlatMonteCarlo(games) => write!(f, "f:{}", games),
            AgentSpec::Mcts(iterations) => write!(f, "m:{}", iterations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn position(rows: &[Vec<u64>]) -> Position {
        let board = Board::new(rows.len(), 0.1).unwrap();
        Position::from_rows(&board, rows).unwrap()
    }

    #[test]
    fn greedy_prefers_the_biggest_merge() {
        let p = position(&[vec![2, 2, 0], vec![0, 0, 0], vec![8, 0, 0]]);
        // Up merges nothing, left merges the 2s, down merges nothing
        assert_eq!(GreedyAgent.choose_move(&p).unwrap(), Direction::Left);

        let p = position(&[vec![2, 0, 8], vec![2, 0, 8], vec![0, 0, 0]]);
        assert_eq!(GreedyAgent.choose_move(&p).unwrap(), Direction::Up);
    }

    #[test]
    fn bottom_left_follows_priority() {
        let p = position(&[vec![2, 0], vec![0, 0]]);
        assert_eq!(BottomLeftAgent.choose_move(&p).unwrap(), Direction::Down);

        let p = position(&[vec![0, 2], vec![0, 0]]);
        assert_eq!(BottomLeftAgent.choose_move(&p).unwrap(), Direction::Left);

        let p = position(&[vec![0, 0], vec![2, 4]]);
        assert_eq!(BottomLeftAgent.choose_move(&p).unwrap(), Direction::Up);
    }

    #[test]
    fn finished_game_has_no_moves() {
        let p = position(&[vec![2, 4], vec![4, 2]]);
        let mut random = RandomAgent::new(StdRng::seed_from_u64(0));
        assert!(matches!(random.choose_move(&p), Err(Error::NoLegalMoves)));
        assert!(matches!(GreedyAgent.choose_move(&p), Err(Error::NoLegalMoves)));
        assert!(matches!(BottomLeftAgent.choose_move(&p), Err(Error::NoLegalMoves)));
    }

    #[test]
    fn parses_agent_specs() {
        assert_eq!("r".parse::<AgentSpec>().unwrap(), AgentSpec::Random);
        assert_eq!("g".parse::<AgentSpec>().unwrap(), AgentSpec::Greedy);
        assert_eq!("b".parse::<AgentSpec>().unwrap(), AgentSpec::BottomLeft);
        assert_eq!("f:40".parse::<AgentSpec>().unwrap(), AgentSpec::FlatMonteCarlo(40));
        assert_eq!("m:500".parse::<AgentSpec>().unwrap(), AgentSpec::Mcts(500));
        assert_eq!(AgentSpec::Mcts(500).to_string(), "m:500");

        assert!("m".parse::<AgentSpec>().is_err());
        assert!("m:0".parse::<AgentSpec>().is_err());
        assert!("f:x".parse::<AgentSpec>().is_err());
        assert!("r:3".parse::<AgentSpec>().is_err());
        assert!("z".parse::<AgentSpec>().is_err());
    }

    #[test]
    fn rejects_zero_budgets() {
        assert!(FlatMonteCarloAgent::new(0, StdRng::seed_from_u64(0)).is_err());
        assert!(MctsAgent::new(0, MCTSConfig::default()).is_err());
    }
}
