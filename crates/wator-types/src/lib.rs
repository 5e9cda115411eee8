//! Shared type definitions for the Wa-Tor simulation.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace: identifiers, the two agent species, grid coordinates,
//! simulation parameters, and the agent record itself.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for simulations and agents
//! - [`enums`] -- [`Species`] and [`CellContent`]
//! - [`params`] -- [`SimulationParameters`] and their validation
//! - [`structs`] -- [`GridCoordinate`], [`Agent`], [`SimulationRecord`],
//!   [`BookkeepingUpdate`]

pub mod enums;
pub mod ids;
pub mod params;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{CellContent, Species};
pub use ids::{AgentId, SimulationId};
pub use params::{InvalidParameters, SimulationParameters, SpeciesParameters};
pub use structs::{Agent, BookkeepingUpdate, GridCoordinate, SimulationRecord};
