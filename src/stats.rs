//! Counters gathered while one search runs

use std::fmt;
use std::time::Duration;

/// What happened during the last search of an engine
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatistics {
    /// Iterations completed
    pub iterations: usize,

    /// Wall-clock time of the whole search
    pub elapsed: Duration,

    /// States in the transposition table when the search ended
    pub table_size: usize,

    /// States whose edges were populated
    pub expansions: usize,

    /// Iterations whose descent stopped on a finished game
    pub terminal_leaves: usize,

    /// Longest selection path, in edges
    pub max_depth: usize,

    /// Highest normalized reward of any rollout
    pub best_reward: f64,
}

impl SearchStatistics {
    pub fn new() -> Self {
        SearchStatistics {
            iterations: 0,
            elapsed: Duration::ZERO,
            table_size: 1,
            expansions: 0,
            terminal_leaves: 0,
            max_depth: 0,
            best_reward: 0.0,
        }
    }

    /// Mean wall-clock time of one iteration
    pub fn mean_iteration_time(&self) -> Duration {
        match u32::try_from(self.iterations) {
            Ok(n) if n > 0 => self.elapsed / n,
            _ => Duration::ZERO,
        }
    }

    /// Iterations per second, 0 if no time was measured
    pub fn throughput(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.iterations as f64 / seconds
        } else {
            0.0
        }
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} iterations in {:.3}s ({:.0} it/s, {:?} each)",
            self.iterations,
            self.elapsed.as_secs_f64(),
            self.throughput(),
            self.mean_iteration_time()
        )?;
        writeln!(
            f,
            "{} states, {} expanded, depth {}",
            self.table_size, self.expansions, self.max_depth
        )?;
        write!(
            f,
            "{} rollouts started at game over, best reward {:.6}",
            self.terminal_leaves, self.best_reward
        )
    }
}
