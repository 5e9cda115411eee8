//! Turn engine: the 4-phase state transition that drives the Wa-Tor simulation.
//!
//! Each turn runs through these phases, strictly in order:
//!
//! 1. **Starvation** -- predators unfed for longer than the starving
//!    threshold die, in one batched kill.
//!
//! 2. **Predation** -- predators, in random order, eat one adjacent prey
//!    (chosen uniformly among occupied neighbours) and step onto its cell.
//!    `last_fed_turn` updates are written in one batch.
//!
//! 3. **Reproduction** -- predators first, then prey, each in random order.
//!    Mature agents that pass the probability roll breed: a predator that fed
//!    this turn leaves its offspring on the cell it ate from; any other
//!    breeder steps to the first free neighbour and leaves the offspring
//!    behind. Breeding bookkeeping is written in one batch.
//!
//! 4. **Movement** -- prey first, then predators: every live agent that has
//!    not moved this turn and was not born this turn steps to the first free
//!    neighbour, if there is one.
//!
//! Every phase reads a fresh snapshot from the store at entry, so it sees
//! the effects of all earlier phases. All tie-breaks (agent order, neighbour
//! preference, prey choice, breeding rolls) draw from the single random
//! source held by the [`TurnContext`].

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::debug;
use wator_db::{AgentStore, StoreError};
use wator_types::{
    Agent, AgentId, BookkeepingUpdate, GridCoordinate, SimulationId, SimulationParameters,
    Species,
};
use wator_types::params::MAX_BREED_PROBABILITY;
use wator_world::shuffled_neighbors;

/// Errors that can occur during turn execution.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// A store operation failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// A phase hit a state its own checks ruled out. The turn is abandoned
    /// part-way; the store reflects whatever was applied before the failure.
    #[error("impossible action: {reason}")]
    ImpossibleAction {
        /// Description of the broken invariant.
        reason: String,
    },

    /// The turn counter would overflow.
    #[error("turn counter overflow: cannot advance beyond u64::MAX")]
    TurnOverflow,

    /// `play_turn` was called after the simulation ended.
    #[error("simulation already ended after turn {turn}")]
    SimulationEnded {
        /// The turn counter at the time of the call.
        turn: u64,
    },
}

/// Counts produced by the four phases of one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Predators that died of starvation.
    pub starved: Vec<AgentId>,
    /// Fed predators mapped to the cell they occupied before eating.
    pub fed: BTreeMap<AgentId, GridCoordinate>,
    /// Agents that moved during reproduction, plus every fed predator.
    pub moved_in_reproduction: BTreeSet<AgentId>,
    /// Prey spawned this turn.
    pub prey_born: Vec<AgentId>,
    /// Predators spawned this turn.
    pub predators_born: Vec<AgentId>,
    /// Number of agents that moved during the movement phase.
    pub residual_moves: u32,
}

/// Result of the reproduction phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReproductionOutcome {
    /// Agents that moved during the phase, plus every fed predator.
    pub moved: BTreeSet<AgentId>,
    /// Prey spawned during the phase.
    pub prey_born: Vec<AgentId>,
    /// Predators spawned during the phase.
    pub predators_born: Vec<AgentId>,
}

impl ReproductionOutcome {
    fn record_birth(&mut self, species: Species, child: AgentId) {
        match species {
            Species::Prey => self.prey_born.push(child),
            Species::Predator => self.predators_born.push(child),
        }
    }
}

/// Everything a turn needs: exclusive access to the store and the random
/// source, plus the simulation it is advancing.
pub struct TurnContext<'a, S: AgentStore + ?Sized, R: Rng + ?Sized> {
    store: &'a mut S,
    rng: &'a mut R,
    simulation: SimulationId,
    parameters: &'a SimulationParameters,
    turn: u64,
}

impl<'a, S: AgentStore + ?Sized, R: Rng + ?Sized> TurnContext<'a, S, R> {
    /// Bind a context for `turn` of `simulation`.
    pub const fn new(
        store: &'a mut S,
        rng: &'a mut R,
        simulation: SimulationId,
        parameters: &'a SimulationParameters,
        turn: u64,
    ) -> Self {
        Self {
            store,
            rng,
            simulation,
            parameters,
            turn,
        }
    }

    /// The turn being played.
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Run all four phases in order.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError`] on the first failing phase. Earlier phases stay
    /// applied.
    pub fn run(&mut self) -> Result<PhaseReport, TurnError> {
        debug!(turn = self.turn, simulation = %self.simulation, "Turn phases starting");

        // --- Phase 1: Starvation ---
        let starved = self.phase_starvation()?;

        // --- Phase 2: Predation ---
        let fed = self.phase_predation()?;

        // --- Phase 3: Reproduction ---
        let reproduction = self.phase_reproduction(&fed)?;

        // --- Phase 4: Movement ---
        let residual_moves = self.phase_movement(&reproduction.moved)?;

        Ok(PhaseReport {
            starved,
            fed,
            moved_in_reproduction: reproduction.moved,
            prey_born: reproduction.prey_born,
            predators_born: reproduction.predators_born,
            residual_moves,
        })
    }

    /// Phase 1: kill every predator with `turn - last_fed_turn` above the
    /// starving threshold, in one batched call.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::Store`] if the store rejects a query or the kill.
    pub fn phase_starvation(&mut self) -> Result<Vec<AgentId>, TurnError> {
        let threshold = self.parameters.starving_threshold;
        let starving: Vec<AgentId> = self
            .store
            .list_by_species(self.simulation, Species::Predator)?
            .iter()
            .filter(|p| p.is_starving(self.turn, threshold))
            .map(|p| p.id)
            .collect();

        if !starving.is_empty() {
            debug!(turn = self.turn, count = starving.len(), "Predators starving");
            self.store.kill_agents(self.simulation, &starving)?;
        }
        Ok(starving)
    }

    /// Phase 2: each predator, in random order, eats one adjacent prey and
    /// moves onto its cell.
    ///
    /// Returns the fed predators mapped to the cell they occupied before
    /// eating.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::ImpossibleAction`] if a prey seen next to a
    /// predator cannot be eaten, or [`TurnError::Store`] on store failure.
    pub fn phase_predation(&mut self) -> Result<BTreeMap<AgentId, GridCoordinate>, TurnError> {
        let grid_size = self.parameters.grid_size;
        let mut predators = self
            .store
            .list_by_species(self.simulation, Species::Predator)?;
        predators.shuffle(&mut *self.rng);

        let mut fed = BTreeMap::new();
        let mut updates = BTreeMap::new();

        for predator in &predators {
            let origin = predator.position;
            let neighbours = shuffled_neighbors(grid_size, origin, &mut *self.rng);
            let prey_cells = self.store.prey_at(self.simulation, &neighbours)?;
            let Some(&target) = prey_cells.choose(&mut *self.rng) else {
                debug!(turn = self.turn, agent_id = %predator.id, "No prey in reach");
                continue;
            };

            if !self.store.eat_at(self.simulation, target)? {
                return Err(TurnError::ImpossibleAction {
                    reason: format!(
                        "predator {} at {origin} failed to eat prey seen at {target}",
                        predator.id
                    ),
                });
            }
            self.store.move_agent(self.simulation, predator.id, target)?;
            debug!(
                turn = self.turn,
                agent_id = %predator.id,
                from = %origin,
                to = %target,
                "Predator ate and moved"
            );
            fed.insert(predator.id, origin);
            updates.insert(predator.id, BookkeepingUpdate::fed(self.turn));
        }

        if !updates.is_empty() {
            self.store.batch_update(self.simulation, &updates)?;
        }
        debug!(turn = self.turn, count = fed.len(), "Predators fed");
        Ok(fed)
    }

    /// Phase 3: predators breed first, then prey.
    ///
    /// `fed` is the output of [`phase_predation`](Self::phase_predation).
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::Store`] on store failure.
    pub fn phase_reproduction(
        &mut self,
        fed: &BTreeMap<AgentId, GridCoordinate>,
    ) -> Result<ReproductionOutcome, TurnError> {
        let mut outcome = ReproductionOutcome::default();
        let mut updates = BTreeMap::new();

        for species in [Species::Predator, Species::Prey] {
            self.breed_species(species, fed, &mut outcome, &mut updates)?;
        }

        if !updates.is_empty() {
            debug!(turn = self.turn, count = updates.len(), "Agents bred");
            self.store.batch_update(self.simulation, &updates)?;
        }

        // Fed predators already moved in phase 2, whether or not they bred.
        outcome.moved.extend(fed.keys().copied());
        Ok(outcome)
    }

    fn breed_species(
        &mut self,
        species: Species,
        fed: &BTreeMap<AgentId, GridCoordinate>,
        outcome: &mut ReproductionOutcome,
        updates: &mut BTreeMap<AgentId, BookkeepingUpdate>,
    ) -> Result<(), TurnError> {
        let maturity = self.parameters.breed_maturity(species);
        let mut agents = self.store.list_by_species(self.simulation, species)?;
        agents.shuffle(&mut *self.rng);

        for agent in &agents {
            if !agent.is_mature(self.turn, maturity) || !self.roll_breeding(species) {
                continue;
            }
            let Some(birth_cell) = self.birth_cell(agent, fed, &mut outcome.moved)? else {
                continue;
            };
            let child = self
                .store
                .spawn_agent(self.simulation, self.turn, species, birth_cell)?;
            debug!(
                turn = self.turn,
                %species,
                parent = %agent.id,
                child = %child,
                cell = %birth_cell,
                "Offspring spawned"
            );
            updates.insert(
                agent.id,
                BookkeepingUpdate::bred(self.turn, agent.breed_count.saturating_add(1)),
            );
            outcome.record_birth(species, child);
        }
        Ok(())
    }

    /// Pick the cell a breeding agent's offspring will occupy, moving the
    /// parent out of the way when needed. `None` aborts the breeding.
    fn birth_cell(
        &mut self,
        agent: &Agent,
        fed: &BTreeMap<AgentId, GridCoordinate>,
        moved: &mut BTreeSet<AgentId>,
    ) -> Result<Option<GridCoordinate>, TurnError> {
        if let Some(&origin) = fed.get(&agent.id) {
            if self.store.is_occupied(self.simulation, origin)? {
                debug!(
                    turn = self.turn,
                    agent_id = %agent.id,
                    cell = %origin,
                    "Fed predator cannot breed, origin cell taken"
                );
                return Ok(None);
            }
            return Ok(Some(origin));
        }

        let Some(destination) = self.first_free_neighbor(agent.position)? else {
            debug!(turn = self.turn, agent_id = %agent.id, "No room to breed");
            return Ok(None);
        };
        self.store
            .move_agent(self.simulation, agent.id, destination)?;
        moved.insert(agent.id);
        Ok(Some(agent.position))
    }

    /// Phase 4: prey, then predators, step to the first free neighbour unless
    /// they already moved or were born this turn.
    ///
    /// Moves are applied one at a time so later agents see earlier moves.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::Store`] on store failure.
    pub fn phase_movement(&mut self, already_moved: &BTreeSet<AgentId>) -> Result<u32, TurnError> {
        let mut moves: u32 = 0;
        for species in [Species::Prey, Species::Predator] {
            let mut agents = self.store.list_by_species(self.simulation, species)?;
            agents.shuffle(&mut *self.rng);

            for agent in &agents {
                if already_moved.contains(&agent.id) || agent.spawned_on(self.turn) {
                    continue;
                }
                match self.first_free_neighbor(agent.position)? {
                    Some(destination) => {
                        self.store
                            .move_agent(self.simulation, agent.id, destination)?;
                        moves = moves.saturating_add(1);
                    }
                    None => {
                        debug!(turn = self.turn, agent_id = %agent.id, "No space to move");
                    }
                }
            }
        }
        Ok(moves)
    }

    /// The first unoccupied cell in a shuffled neighbour list.
    fn first_free_neighbor(
        &mut self,
        coordinate: GridCoordinate,
    ) -> Result<Option<GridCoordinate>, TurnError> {
        let neighbours = shuffled_neighbors(self.parameters.grid_size, coordinate, &mut *self.rng);
        for cell in neighbours {
            if !self.store.is_occupied(self.simulation, cell)? {
                return Ok(Some(cell));
            }
        }
        Ok(None)
    }

    /// Roll a uniform integer in `0..=100`; breeding happens iff it does not
    /// exceed the species' probability.
    fn roll_breeding(&mut self, species: Species) -> bool {
        let roll: u8 = self.rng.random_range(0..=MAX_BREED_PROBABILITY);
        roll <= self.parameters.breed_probability(species)
    }
}
