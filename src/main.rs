//! Command-line front end: play 2048 yourself, or let agents play it.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use rand::{rngs::StdRng, SeedableRng};

use mcts_2048::{
    agents::AgentSpec,
    board::DEFAULT_FOUR_SPAWN_PROBABILITY,
    harness, Board, Direction, Position, Result,
};

#[derive(Parser, Debug)]
#[command(name = "mcts-2048", about = "2048 with Monte Carlo Tree Search and baseline agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play the game yourself
    Play {
        #[command(flatten)]
        board: BoardArgs,

        /// Seed for tile spawns
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Simulate games with an agent: r, g, b, f:<games>, m:<iterations>
    Simulate {
        agent: AgentSpec,

        #[command(flatten)]
        board: BoardArgs,

        /// Number of games to play
        #[arg(short, long, default_value_t = 1)]
        games: usize,

        /// Show every position as it is played
        #[arg(long, default_value_t = false)]
        display: bool,

        /// Seed for tile spawns and agent randomness
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Pit two agents against each other and report the first one's win rate
    Compete {
        agent1: AgentSpec,
        agent2: AgentSpec,

        #[command(flatten)]
        board: BoardArgs,

        /// Number of rounds to play
        #[arg(short, long, default_value_t = 1)]
        games: usize,

        /// Seed for tile spawns and agent randomness
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct BoardArgs {
    /// Side length of the board
    #[arg(short, long, default_value_t = 4)]
    size: usize,

    /// Probability that a spawned tile is a 4
    #[arg(long, default_value_t = DEFAULT_FOUR_SPAWN_PROBABILITY)]
    four_probability: f64,
}

impl BoardArgs {
    fn board(&self) -> Result<Board> {
        Board::new(self.size, self.four_probability)
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn refresh_screen(position: &Position, message: Option<&str>) -> io::Result<()> {
    draw(&mut io::stdout().lock(), position, message)
}

fn draw<W: Write>(out: &mut W, position: &Position, message: Option<&str>) -> io::Result<()> {
    write!(out, "\x1B[2J\x1B[1;1H")?;
    writeln!(out, "Score: {}", position.score())?;
    write!(out, "{}", position)?;
    if let Some(message) = message {
        writeln!(out, "{}", message)?;
    }
    out.flush()
}

fn play(board: &Board, seed: Option<u64>) -> Result<()> {
    const PROMPT: &str = "Select move (U/D/L/R/exit): ";

    let mut rng = rng_from(seed);
    let mut position = board.initial_position(&mut rng);
    let mut message = PROMPT.to_string();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !position.game_over() {
        refresh_screen(&position, Some(&message))?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        let direction = match line.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('U') => Direction::Up,
            Some('D') => Direction::Down,
            Some('L') => Direction::Left,
            Some('R') => Direction::Right,
            Some('E') | Some('Q') => {
                println!("Quitting...");
                return Ok(());
            }
            _ => {
                message = format!("Invalid command. {}", PROMPT);
                continue;
            }
        };

        match position.result(direction, &mut rng) {
            Some(next) => {
                position = next;
                message = PROMPT.to_string();
            }
            None => message = format!("Illegal move. {}", PROMPT),
        }
    }

    refresh_screen(&position, Some("GAME OVER"))?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Play { board, seed } => play(&board.board()?, seed),

        Command::Simulate {
            agent,
            board,
            games,
            display,
            seed,
        } => {
            let board = board.board()?;
            let mut rng = rng_from(seed);
            let mut agent = agent.build(seed)?;

            let mut display_error = None;
            let report = harness::simulate(&board, &mut agent, games, &mut rng, |position: &Position| {
                if display && display_error.is_none() {
                    display_error = refresh_screen(position, None).err();
                }
            })?;

            if let Some(e) = display_error {
                return Err(e.into());
            }

            print!("{}", report);
            Ok(())
        }

        Command::Compete {
            agent1,
            agent2,
            board,
            games,
            seed,
        } => {
            let board = board.board()?;
            let mut rng = rng_from(seed);
            let mut first = agent1.build(seed)?;
            let mut second = agent2.build(seed.map(|s| s.wrapping_add(1)))?;

            let report = harness::head_to_head(&board, &mut first, &mut second, games, &mut rng)?;

            print!("{}", report);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
