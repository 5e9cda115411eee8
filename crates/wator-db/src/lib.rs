//! Agent store for the Wa-Tor simulation.
//!
//! The turn engine never touches agent records directly: every read and
//! write goes through the [`AgentStore`] trait. This crate defines that
//! trait and ships [`MemoryStore`], an in-process implementation that keeps
//! a live-occupancy index per simulation so occupancy checks are cheap.
//!
//! # Architecture
//!
//! ```text
//! Turn Engine
//!     |
//!     +-- queries / mutations --> AgentStore (trait)
//!                                     |
//!                                     +-- MemoryStore
//!                                           |-- SimulationRecord per run
//!                                           |-- agents (never deleted)
//!                                           +-- live occupancy index
//!                                     |
//!     end of run export <-------------+-- StoreSnapshot (JSON)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`AgentStore`] trait
//! - [`memory`] -- [`MemoryStore`]
//! - [`snapshot`] -- JSON export and import of a whole store
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::MemoryStore;
pub use snapshot::{SimulationSnapshot, StoreSnapshot};
pub use store::AgentStore;
