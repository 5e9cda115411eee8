//! Grid validity and Moore-neighbourhood enumeration.
//!
//! Shuffled neighbour lists are the engine's tie-break mechanism: whenever
//! several cells qualify, the engine takes the first acceptable one from a
//! shuffled list. Outcomes are reproducible only by seeding the random
//! source.

use rand::Rng;
use rand::seq::SliceRandom;
use wator_types::GridCoordinate;

use crate::error::TopologyError;

/// The eight `(dx, dy)` offsets of the Moore neighbourhood, clockwise from
/// north-west.
pub const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Whether `coordinate` lies on a `grid_size x grid_size` grid.
pub const fn is_valid(grid_size: u32, coordinate: GridCoordinate) -> bool {
    coordinate.x < grid_size && coordinate.y < grid_size
}

/// Strict variant of [`is_valid`] for call sites that require validity.
///
/// # Errors
///
/// Returns [`TopologyError::OutOfBounds`] if the coordinate is off the grid.
pub const fn ensure_valid(
    grid_size: u32,
    coordinate: GridCoordinate,
) -> Result<GridCoordinate, TopologyError> {
    if is_valid(grid_size, coordinate) {
        Ok(coordinate)
    } else {
        Err(TopologyError::OutOfBounds {
            coordinate,
            grid_size,
        })
    }
}

/// The valid Moore neighbours of `coordinate`, in [`MOORE_OFFSETS`] order.
///
/// Corner cells yield 3 neighbours, edge cells 5, interior cells 8.
pub fn neighbors(grid_size: u32, coordinate: GridCoordinate) -> Vec<GridCoordinate> {
    MOORE_OFFSETS
        .iter()
        .filter_map(|&(dx, dy)| coordinate.offset(dx, dy))
        .filter(|c| is_valid(grid_size, *c))
        .collect()
}

/// The valid Moore neighbours of `coordinate` in a uniformly random order.
pub fn shuffled_neighbors<R: Rng + ?Sized>(
    grid_size: u32,
    coordinate: GridCoordinate,
    rng: &mut R,
) -> Vec<GridCoordinate> {
    let mut cells = neighbors(grid_size, coordinate);
    cells.shuffle(rng);
    cells
}

/// Every cell of the grid, row-major by `x` then `y`.
pub fn all_cells(grid_size: u32) -> Vec<GridCoordinate> {
    (0..grid_size)
        .flat_map(|x| (0..grid_size).map(move |y| GridCoordinate::new(x, y)))
        .collect()
}
