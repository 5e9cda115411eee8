//! Bounded square-grid topology for the Wa-Tor simulation.
//!
//! Pure functions over [`GridCoordinate`] values: bounds checks and
//! Moore-neighbourhood enumeration. The grid has hard edges; there is no
//! wraparound.
//!
//! # Modules
//!
//! - [`topology`] -- Validity checks and neighbour enumeration
//! - [`error`] -- [`TopologyError`]
//!
//! [`GridCoordinate`]: wator_types::GridCoordinate

pub mod error;
pub mod topology;

pub use error::TopologyError;
pub use topology::{
    MOORE_OFFSETS, all_cells, ensure_valid, is_valid, neighbors, shuffled_neighbors,
};
