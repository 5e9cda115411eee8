//! The agent store interface consumed by the turn engine.
//!
//! Queries that mention "live" only ever see agents with `alive == true`.
//! Dead agents stay in the store for history and may share a cell with a
//! live agent, but never count as occupying it.

use std::collections::BTreeMap;

use wator_types::{
    Agent, AgentId, BookkeepingUpdate, GridCoordinate, SimulationId, SimulationParameters,
    SimulationRecord, Species,
};

use crate::error::StoreError;

/// Per-simulation storage of agent records and simulation parameters.
///
/// The engine assumes exclusive access to a simulation for the duration of a
/// turn; implementations need not isolate concurrent callers.
pub trait AgentStore {
    /// Validate `parameters` and register a new simulation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidParameters`] if a constraint is violated.
    fn create_simulation(
        &mut self,
        parameters: SimulationParameters,
    ) -> Result<SimulationId, StoreError>;

    /// Fetch a simulation record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn get_simulation(&self, simulation: SimulationId) -> Result<SimulationRecord, StoreError>;

    /// All simulation records, ordered by id.
    fn list_simulations(&self) -> Vec<SimulationRecord>;

    /// Create a live agent at `coordinate` with `spawn_turn = turn`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`], [`StoreError::OutOfBounds`],
    /// or [`StoreError::CoordinateOccupied`].
    fn spawn_agent(
        &mut self,
        simulation: SimulationId,
        turn: u64,
        species: Species,
        coordinate: GridCoordinate,
    ) -> Result<AgentId, StoreError>;

    /// The live agent at `coordinate`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn occupant(
        &self,
        simulation: SimulationId,
        coordinate: GridCoordinate,
    ) -> Result<Option<AgentId>, StoreError>;

    /// Fetch one agent, dead or alive.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] or [`StoreError::UnknownAgent`].
    fn get_agent(&self, simulation: SimulationId, agent: AgentId) -> Result<Agent, StoreError>;

    /// Every agent of the simulation, dead ones included, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn list_all(&self, simulation: SimulationId) -> Result<Vec<Agent>, StoreError>;

    /// Move a live agent to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CoordinateOccupied`] if a live agent is already
    /// there, [`StoreError::OutOfBounds`] for an off-grid destination,
    /// [`StoreError::DeadAgent`] if the mover is dead, or a referential error.
    fn move_agent(
        &mut self,
        simulation: SimulationId,
        agent: AgentId,
        destination: GridCoordinate,
    ) -> Result<(), StoreError>;

    /// Mark every listed agent dead. Already-dead agents are left as they are.
    ///
    /// # Errors
    ///
    /// Returns a referential error if any id is unknown; nothing is changed in
    /// that case.
    fn kill_agents(&mut self, simulation: SimulationId, agents: &[AgentId])
    -> Result<(), StoreError>;

    /// Kill the live prey at `coordinate`, if there is one.
    ///
    /// Returns `true` iff a prey was present and removed. Never kills a
    /// predator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] or [`StoreError::OutOfBounds`].
    fn eat_at(
        &mut self,
        simulation: SimulationId,
        coordinate: GridCoordinate,
    ) -> Result<bool, StoreError>;

    /// Apply bookkeeping updates to live agents in one call.
    ///
    /// Updates addressed to dead agents are skipped.
    ///
    /// # Errors
    ///
    /// Returns a referential error if any id is unknown; nothing is changed in
    /// that case.
    fn batch_update(
        &mut self,
        simulation: SimulationId,
        updates: &BTreeMap<AgentId, BookkeepingUpdate>,
    ) -> Result<(), StoreError>;

    // ---------------------------------------------------------------------
    // Derived queries
    // ---------------------------------------------------------------------

    /// Whether a live agent occupies `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn is_occupied(
        &self,
        simulation: SimulationId,
        coordinate: GridCoordinate,
    ) -> Result<bool, StoreError> {
        Ok(self.occupant(simulation, coordinate)?.is_some())
    }

    /// Live agents of one species, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn list_by_species(
        &self,
        simulation: SimulationId,
        species: Species,
    ) -> Result<Vec<Agent>, StoreError> {
        let mut agents = self.list_all(simulation)?;
        agents.retain(|a| a.alive && a.species == species);
        Ok(agents)
    }

    /// All live agents, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn list_all_live(&self, simulation: SimulationId) -> Result<Vec<Agent>, StoreError> {
        let mut agents = self.list_all(simulation)?;
        agents.retain(|a| a.alive);
        Ok(agents)
    }

    /// Agents positioned at `coordinate`, optionally including dead ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn agents_at(
        &self,
        simulation: SimulationId,
        coordinate: GridCoordinate,
        live_only: bool,
    ) -> Result<Vec<Agent>, StoreError> {
        let mut agents = self.list_all(simulation)?;
        agents.retain(|a| a.position == coordinate && (a.alive || !live_only));
        Ok(agents)
    }

    /// The subset of `coordinates` hosting a live prey, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the id is not known.
    fn prey_at(
        &self,
        simulation: SimulationId,
        coordinates: &[GridCoordinate],
    ) -> Result<Vec<GridCoordinate>, StoreError> {
        let mut found = Vec::new();
        for &coordinate in coordinates {
            if let Some(id) = self.occupant(simulation, coordinate)? {
                if self.get_agent(simulation, id)?.species == Species::Prey {
                    found.push(coordinate);
                }
            }
        }
        Ok(found)
    }
}
