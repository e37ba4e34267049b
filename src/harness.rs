//! Running complete games with agents
//!
//! The harness plays games from a board's starting position until no move
//! is left, and aggregates results over many games.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info};
use rand::Rng;

use crate::{agents::Agent, board::Board, position::Position, Error, Result};

/// Plays one game to completion
///
/// `observer` is called with the starting position and again after every
/// ply; pass `|_: &Position| {}` to ignore them. Fails if the agent errors
/// or proposes an illegal move.
pub fn play_game<A, R, F>(
    board: &Board,
    agent: &mut A,
    rng: &mut R,
    mut observer: F,
) -> Result<Position>
where
    A: Agent + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&Position),
{
    let mut position = board.initial_position(rng);
    observer(&position);

    while !position.game_over() {
        let direction = agent.choose_move(&position)?;
        position = position
            .result(direction, rng)
            .ok_or(Error::IllegalMove(direction))?;

        debug!("turn {}: {} -> score {}", position.turn(), direction, position.score());

        observer(&position);
    }

    info!(
        "{} finished: score {}, {} turns, high tile {}",
        agent.name(),
        position.score(),
        position.turn(),
        position.high_tile()
    );

    Ok(position)
}

/// Aggregate results of many games played by one agent
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Name of the agent that played
    pub agent: String,

    /// Number of games played
    pub games: usize,

    /// Sum of final scores
    pub total_score: u64,

    /// Sum of final turn counts
    pub total_turns: u64,

    /// Number of games ending with each high tile
    pub high_tiles: BTreeMap<u64, usize>,
}

impl SimulationReport {
    fn new(agent: String) -> Self {
        SimulationReport {
            agent,
            games: 0,
            total_score: 0,
            total_turns: 0,
            high_tiles: BTreeMap::new(),
        }
    }

    fn record(&mut self, finished: &Position) {
        self.games += 1;
        self.total_score += finished.score();
        self.total_turns += finished.turn();
        *self.high_tiles.entry(finished.high_tile()).or_insert(0) += 1;
    }

    pub fn average_score(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.games as f64
    }

    pub fn average_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }

    /// High tiles with their counts, largest tile first
    pub fn high_tile_distribution(&self) -> Vec<(u64, usize)> {
        self.high_tiles.iter().rev().map(|(&tile, &count)| (tile, count)).collect()
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Agent: {}", self.agent)?;
        writeln!(f, "Average score: {}", self.average_score())?;
        writeln!(f, "Average turn count: {}", self.average_turns())?;
        writeln!(f, "High tile distribution:")?;
        for (tile, count) in self.high_tile_distribution() {
            let percent = count as f64 * 100.0 / self.games.max(1) as f64;
            writeln!(f, "{}: {} ({}%)", tile, count, percent)?;
        }
        Ok(())
    }
}

/// Plays `games` games with one agent and aggregates the results
///
/// Fails with [`Error::InvalidArgument`] if `games` is zero.
pub fn simulate<A, R, F>(
    board: &Board,
    agent: &mut A,
    games: usize,
    rng: &mut R,
    mut observer: F,
) -> Result<SimulationReport>
where
    A: Agent + ?Sized,
    R: Rng + ?Sized,
    F: FnMut(&Position),
{
    if games < 1 {
        return Err(Error::InvalidArgument("game count must be positive".to_string()));
    }

    let mut report = SimulationReport::new(agent.name());

    for _ in 0..games {
        let finished = play_game(board, agent, rng, &mut observer)?;
        report.record(&finished);
    }

    Ok(report)
}

/// Outcome of pitting two agents against each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadToHeadReport {
    pub first: String,
    pub second: String,
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

impl HeadToHeadReport {
    /// Number of rounds played
    pub fn games(&self) -> usize {
        self.first_wins + self.second_wins + self.draws
    }

    /// Fraction of rounds won by the first agent
    pub fn first_win_rate(&self) -> f64 {
        if self.games() == 0 {
            return 0.0;
        }
        self.first_wins as f64 / self.games() as f64
    }
}

impl fmt::Display for HeadToHeadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} vs {}", self.first, self.second)?;
        writeln!(
            f,
            "Wins: {} / {} (draws: {})",
            self.first_wins, self.second_wins, self.draws
        )?;
        writeln!(f, "Policy 1 win rate: {}", self.first_win_rate())
    }
}

/// Plays `games` rounds, each one game per agent, and compares final scores
///
/// Fails with [`Error::InvalidArgument`] if `games` is zero.
pub fn head_to_head<A, B, R>(
    board: &Board,
    first: &mut A,
    second: &mut B,
    games: usize,
    rng: &mut R,
) -> Result<HeadToHeadReport>
where
    A: Agent + ?Sized,
    B: Agent + ?Sized,
    R: Rng + ?Sized,
{
    if games < 1 {
        return Err(Error::InvalidArgument("game count must be positive".to_string()));
    }

    let mut report = HeadToHeadReport {
        first: first.name(),
        second: second.name(),
        first_wins: 0,
        second_wins: 0,
        draws: 0,
    };

    for _ in 0..games {
        let score1 = play_game(board, first, rng, |_: &Position| {})?.score();
        let score2 = play_game(board, second, rng, |_: &Position| {})?.score();

        match score1.cmp(&score2) {
            std::cmp::Ordering::Greater => report.first_wins += 1,
            std::cmp::Ordering::Less => report.second_wins += 1,
            std::cmp::Ordering::Equal => report.draws += 1,
        }
    }

    Ok(report)
}
