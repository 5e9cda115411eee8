//! Error types for the agent store.
//!
//! All store operations return [`StoreError`]. Every variant is fatal to the
//! action that raised it; the store never retries.

use wator_types::{AgentId, GridCoordinate, InvalidParameters, SimulationId};
use wator_world::TopologyError;

/// Errors that can occur in the agent store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Simulation parameters violate a constraint.
    #[error(transparent)]
    InvalidParameters(#[from] InvalidParameters),

    /// No simulation with this id exists.
    #[error("unknown simulation: {0}")]
    UnknownSimulation(SimulationId),

    /// No agent with this id exists in the simulation.
    #[error("unknown agent {agent} in simulation {simulation}")]
    UnknownAgent {
        /// The simulation that was searched.
        simulation: SimulationId,
        /// The missing agent.
        agent: AgentId,
    },

    /// The agent exists, but in a different simulation.
    #[error("agent {agent} belongs to simulation {owner}, not {simulation}")]
    WrongSimulation {
        /// The simulation the caller addressed.
        simulation: SimulationId,
        /// The agent.
        agent: AgentId,
        /// The simulation the agent actually belongs to.
        owner: SimulationId,
    },

    /// The coordinate lies outside the simulation grid.
    #[error(transparent)]
    OutOfBounds(#[from] TopologyError),

    /// A live agent already occupies the destination cell.
    #[error("coordinate {coordinate} is occupied by live agent {occupant}")]
    CoordinateOccupied {
        /// The contested cell.
        coordinate: GridCoordinate,
        /// The live agent currently there.
        occupant: AgentId,
    },

    /// An action was attempted on a dead agent.
    #[error("agent {0} is dead")]
    DeadAgent(AgentId),

    /// The identifier sequence is exhausted.
    #[error("identifier sequence exhausted")]
    IdOverflow,

    /// A snapshot could not be loaded because it breaks a store invariant.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a snapshot file failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}
