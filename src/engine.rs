//! Transition engine for the 2048 board
//!
//! Pure functions over flat, row-major tile grids. A slide in any direction
//! is computed by transforming the grid so that the direction becomes
//! "leftward", compressing every row, then undoing the transform.

use std::fmt;

/// A direction in which all tiles can be slid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in the order legal moves are reported
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Whether the grid is transposed so this direction becomes horizontal
    fn transposed(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Whether the (possibly transposed) grid is mirrored so this direction becomes leftward
    fn reflected(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Compresses one row towards its start.
///
/// Zeros are dropped, a tile equal to the most recently placed tile merges
/// into it unless that tile was itself produced by a merge, and the row is
/// padded back to its length with zeros. Returns the new row together with
/// the sum of all merge results.
///
/// ```
/// use mcts_2048::engine::compress_row;
///
/// let (row, gained) = compress_row(&[2, 2, 2, 2]);
/// assert_eq!(row, vec![4, 4, 0, 0]);
/// assert_eq!(gained, 8);
/// ```
pub fn compress_row(row: &[u64]) -> (Vec<u64>, u64) {
    let mut compressed: Vec<u64> = Vec::with_capacity(row.len());
    let mut gained = 0;
    let mut just_merged = false;

    for &value in row.iter().filter(|&&v| v != 0) {
        let merges = !just_merged && compressed.last() == Some(&value);
        if merges {
            let merged = value * 2;
            if let Some(last) = compressed.last_mut() {
                *last = merged;
            }
            gained += merged;
        } else {
            compressed.push(value);
        }
        just_merged = merges;
    }

    compressed.resize(row.len(), 0);
    (compressed, gained)
}

/// Swaps rows and columns of a square grid
pub fn transpose(tiles: &[u64], dimension: usize) -> Vec<u64> {
    let mut out = vec![0; tiles.len()];
    for row in 0..dimension {
        for col in 0..dimension {
            out[col * dimension + row] = tiles[row * dimension + col];
        }
    }
    out
}

/// Mirrors every row of a square grid
pub fn reflect(tiles: &[u64], dimension: usize) -> Vec<u64> {
    let mut out = tiles.to_vec();
    for row in out.chunks_mut(dimension.max(1)) {
        row.reverse();
    }
    out
}

/// Slides a grid in `direction`.
///
/// Returns the new grid and the score gained from merges, or `None` when
/// the slide leaves the grid unchanged (the move is illegal).
pub fn slide_tiles(tiles: &[u64], dimension: usize, direction: Direction) -> Option<(Vec<u64>, u64)> {
    let mut grid = tiles.to_vec();

    if direction.transposed() {
        grid = transpose(&grid, dimension);
    }
    if direction.reflected() {
        grid = reflect(&grid, dimension);
    }

    let mut gained = 0;
    let mut slid = Vec::with_capacity(grid.len());
    for row in grid.chunks(dimension.max(1)) {
        let (compressed, row_gain) = compress_row(row);
        gained += row_gain;
        slid.extend(compressed);
    }

    if direction.reflected() {
        slid = reflect(&slid, dimension);
    }
    if direction.transposed() {
        slid = transpose(&slid, dimension);
    }

    if slid == tiles {
        None
    } else {
        Some((slid, gained))
    }
}

/// Returns true if `value` may appear on a board: empty, or a power of two of at least 2
pub fn is_valid_tile(value: u64) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}
