//! In-process agent store.
//!
//! [`MemoryStore`] keeps every simulation in a [`BTreeMap`] together with a
//! live-occupancy index (`cell -> live agent`). Every mutation that changes a
//! live agent's cell or `alive` flag updates the index in the same call, so
//! the index and the agent records never disagree between calls.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use wator_types::{
    Agent, AgentId, BookkeepingUpdate, GridCoordinate, SimulationId, SimulationParameters,
    SimulationRecord, Species,
};
use wator_world::{ensure_valid, is_valid};

use crate::error::StoreError;
use crate::snapshot::{SimulationSnapshot, StoreSnapshot};
use crate::store::AgentStore;

/// State held for one simulation.
#[derive(Debug, Clone)]
struct SimulationEntry {
    /// The simulation record.
    record: SimulationRecord,
    /// All agents, dead or alive.
    agents: BTreeMap<AgentId, Agent>,
    /// Live agents by cell.
    occupancy: BTreeMap<GridCoordinate, AgentId>,
}

impl SimulationEntry {
    const fn new(record: SimulationRecord) -> Self {
        Self {
            record,
            agents: BTreeMap::new(),
            occupancy: BTreeMap::new(),
        }
    }

    const fn grid_size(&self) -> u32 {
        self.record.parameters.grid_size
    }

    fn ensure_free(&self, coordinate: GridCoordinate) -> Result<(), StoreError> {
        match self.occupancy.get(&coordinate) {
            Some(&occupant) => Err(StoreError::CoordinateOccupied {
                coordinate,
                occupant,
            }),
            None => Ok(()),
        }
    }

    /// Flip one agent to dead and release its cell. Returns `false` if it
    /// was already dead.
    fn kill(&mut self, agent: AgentId) -> bool {
        let Some(record) = self.agents.get_mut(&agent) else {
            return false;
        };
        if !record.alive {
            return false;
        }
        record.alive = false;
        if self.occupancy.get(&record.position) == Some(&agent) {
            self.occupancy.remove(&record.position);
        }
        true
    }
}

/// An in-memory [`AgentStore`].
///
/// Identifiers are issued sequentially from 1; agent ids are unique across
/// all simulations in the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    simulations: BTreeMap<SimulationId, SimulationEntry>,
    last_simulation_id: u64,
    last_agent_id: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            simulations: BTreeMap::new(),
            last_simulation_id: 0,
            last_agent_id: 0,
        }
    }

    fn entry(&self, simulation: SimulationId) -> Result<&SimulationEntry, StoreError> {
        self.simulations
            .get(&simulation)
            .ok_or(StoreError::UnknownSimulation(simulation))
    }

    fn entry_mut(&mut self, simulation: SimulationId) -> Result<&mut SimulationEntry, StoreError> {
        self.simulations
            .get_mut(&simulation)
            .ok_or(StoreError::UnknownSimulation(simulation))
    }

    /// The error for an agent id missing from `simulation`: `WrongSimulation`
    /// if another simulation holds it, `UnknownAgent` otherwise.
    fn missing_agent(&self, simulation: SimulationId, agent: AgentId) -> StoreError {
        self.simulations
            .iter()
            .find(|(_, entry)| entry.agents.contains_key(&agent))
            .map_or(
                StoreError::UnknownAgent { simulation, agent },
                |(&owner, _)| StoreError::WrongSimulation {
                    simulation,
                    agent,
                    owner,
                },
            )
    }

    /// Fail unless every id belongs to `simulation`.
    fn ensure_known(
        &self,
        simulation: SimulationId,
        agents: impl IntoIterator<Item = AgentId>,
    ) -> Result<(), StoreError> {
        let entry = self.entry(simulation)?;
        match agents.into_iter().find(|id| !entry.agents.contains_key(id)) {
            Some(agent) => Err(self.missing_agent(simulation, agent)),
            None => Ok(()),
        }
    }

    fn next_agent_id(&mut self) -> Result<AgentId, StoreError> {
        self.last_agent_id = self
            .last_agent_id
            .checked_add(1)
            .ok_or(StoreError::IdOverflow)?;
        Ok(AgentId::new(self.last_agent_id))
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Export the whole store.
    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            last_simulation_id: self.last_simulation_id,
            last_agent_id: self.last_agent_id,
            simulations: self
                .simulations
                .values()
                .map(|entry| SimulationSnapshot {
                    record: entry.record.clone(),
                    agents: entry.agents.values().cloned().collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a store from a snapshot, re-deriving the occupancy index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CorruptSnapshot`] if the snapshot breaks an
    /// invariant: duplicate ids, ids above the recorded counters, agents
    /// filed under the wrong simulation, off-grid positions, or two live
    /// agents on one cell.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        let mut store = Self {
            simulations: BTreeMap::new(),
            last_simulation_id: snapshot.last_simulation_id,
            last_agent_id: snapshot.last_agent_id,
        };
        let mut seen_agents = std::collections::BTreeSet::new();

        for sim in snapshot.simulations {
            let sim_id = sim.record.id;
            if sim_id.into_inner() > store.last_simulation_id {
                return Err(StoreError::CorruptSnapshot(format!(
                    "simulation {sim_id} is above the recorded counter"
                )));
            }
            if store.simulations.contains_key(&sim_id) {
                return Err(StoreError::CorruptSnapshot(format!(
                    "duplicate simulation {sim_id}"
                )));
            }
            let mut entry = SimulationEntry::new(sim.record);
            for agent in sim.agents {
                if agent.simulation_id != sim_id {
                    return Err(StoreError::CorruptSnapshot(format!(
                        "agent {} filed under simulation {sim_id} belongs to {}",
                        agent.id, agent.simulation_id
                    )));
                }
                if agent.id.into_inner() > store.last_agent_id || !seen_agents.insert(agent.id) {
                    return Err(StoreError::CorruptSnapshot(format!(
                        "agent id {} is duplicated or above the recorded counter",
                        agent.id
                    )));
                }
                if !is_valid(entry.grid_size(), agent.position) {
                    return Err(StoreError::CorruptSnapshot(format!(
                        "agent {} is off the grid at {}",
                        agent.id, agent.position
                    )));
                }
                if agent.alive {
                    if let Some(other) = entry.occupancy.insert(agent.position, agent.id) {
                        return Err(StoreError::CorruptSnapshot(format!(
                            "agents {other} and {} are both alive at {}",
                            agent.id, agent.position
                        )));
                    }
                }
                entry.agents.insert(agent.id, agent);
            }
            store.simulations.insert(sim_id, entry);
        }
        Ok(store)
    }

    /// Write a JSON snapshot of the store to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] or [`StoreError::Io`].
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        self.to_snapshot().write_to(path)
    }

    /// Load a store from a JSON snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`], [`StoreError::Serialization`], or
    /// [`StoreError::CorruptSnapshot`].
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        Self::from_snapshot(StoreSnapshot::read_from(path)?)
    }
}

impl AgentStore for MemoryStore {
    fn create_simulation(
        &mut self,
        parameters: SimulationParameters,
    ) -> Result<SimulationId, StoreError> {
        parameters.validate()?;
        self.last_simulation_id = self
            .last_simulation_id
            .checked_add(1)
            .ok_or(StoreError::IdOverflow)?;
        let id = SimulationId::new(self.last_simulation_id);
        let record = SimulationRecord {
            id,
            parameters,
            created_at: Utc::now(),
        };
        self.simulations.insert(id, SimulationEntry::new(record));
        tracing::debug!(simulation = %id, grid_size = parameters.grid_size, "Simulation created");
        Ok(id)
    }

    fn get_simulation(&self, simulation: SimulationId) -> Result<SimulationRecord, StoreError> {
        Ok(self.entry(simulation)?.record.clone())
    }

    fn list_simulations(&self) -> Vec<SimulationRecord> {
        self.simulations
            .values()
            .map(|entry| entry.record.clone())
            .collect()
    }

    fn spawn_agent(
        &mut self,
        simulation: SimulationId,
        turn: u64,
        species: Species,
        coordinate: GridCoordinate,
    ) -> Result<AgentId, StoreError> {
        {
            let entry = self.entry(simulation)?;
            ensure_valid(entry.grid_size(), coordinate)?;
            entry.ensure_free(coordinate)?;
        }
        let id = self.next_agent_id()?;
        let entry = self.entry_mut(simulation)?;
        entry.agents.insert(
            id,
            Agent {
                id,
                simulation_id: simulation,
                species,
                spawn_turn: turn,
                breed_count: 0,
                last_breed_turn: 0,
                last_fed_turn: turn,
                alive: true,
                position: coordinate,
            },
        );
        entry.occupancy.insert(coordinate, id);
        Ok(id)
    }

    fn occupant(
        &self,
        simulation: SimulationId,
        coordinate: GridCoordinate,
    ) -> Result<Option<AgentId>, StoreError> {
        Ok(self.entry(simulation)?.occupancy.get(&coordinate).copied())
    }

    fn get_agent(&self, simulation: SimulationId, agent: AgentId) -> Result<Agent, StoreError> {
        self.entry(simulation)?
            .agents
            .get(&agent)
            .cloned()
            .ok_or_else(|| self.missing_agent(simulation, agent))
    }

    fn list_all(&self, simulation: SimulationId) -> Result<Vec<Agent>, StoreError> {
        Ok(self.entry(simulation)?.agents.values().cloned().collect())
    }

    fn move_agent(
        &mut self,
        simulation: SimulationId,
        agent: AgentId,
        destination: GridCoordinate,
    ) -> Result<(), StoreError> {
        let entry = self.entry(simulation)?;
        entry.ensure_free(destination)?;
        ensure_valid(entry.grid_size(), destination)?;
        self.ensure_known(simulation, [agent])?;
        let entry = self.entry_mut(simulation)?;
        let Some(record) = entry.agents.get_mut(&agent) else {
            return Err(StoreError::UnknownAgent { simulation, agent });
        };
        if !record.alive {
            return Err(StoreError::DeadAgent(agent));
        }
        let origin = record.position;
        record.position = destination;
        if entry.occupancy.get(&origin) == Some(&agent) {
            entry.occupancy.remove(&origin);
        }
        entry.occupancy.insert(destination, agent);
        Ok(())
    }

    fn kill_agents(
        &mut self,
        simulation: SimulationId,
        agents: &[AgentId],
    ) -> Result<(), StoreError> {
        self.ensure_known(simulation, agents.iter().copied())?;
        let entry = self.entry_mut(simulation)?;
        let killed = agents.iter().filter(|&&id| entry.kill(id)).count();
        tracing::debug!(simulation = %simulation, requested = agents.len(), killed, "Agents killed");
        Ok(())
    }

    fn eat_at(
        &mut self,
        simulation: SimulationId,
        coordinate: GridCoordinate,
    ) -> Result<bool, StoreError> {
        let entry = self.entry_mut(simulation)?;
        ensure_valid(entry.grid_size(), coordinate)?;
        let prey = entry
            .occupancy
            .get(&coordinate)
            .copied()
            .filter(|id| {
                entry
                    .agents
                    .get(id)
                    .is_some_and(|a| a.species == Species::Prey)
            });
        match prey {
            Some(id) => Ok(entry.kill(id)),
            None => {
                tracing::warn!(simulation = %simulation, %coordinate, "No prey to eat");
                Ok(false)
            }
        }
    }

    fn batch_update(
        &mut self,
        simulation: SimulationId,
        updates: &BTreeMap<AgentId, BookkeepingUpdate>,
    ) -> Result<(), StoreError> {
        self.ensure_known(simulation, updates.keys().copied())?;
        let entry = self.entry_mut(simulation)?;
        for (id, update) in updates {
            match entry.agents.get_mut(id) {
                Some(agent) if agent.alive => update.apply(agent),
                _ => tracing::debug!(agent = %id, "Skipping bookkeeping update for dead agent"),
            }
        }
        Ok(())
    }
}
