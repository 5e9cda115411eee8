//! Error types for the `wator-world` crate.

use wator_types::GridCoordinate;

/// Errors raised by strict topology checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    /// The coordinate lies outside the `grid_size x grid_size` grid.
    #[error("coordinate {coordinate} is outside a grid of size {grid_size}")]
    OutOfBounds {
        /// The offending coordinate.
        coordinate: GridCoordinate,
        /// Side length of the grid.
        grid_size: u32,
    },
}
