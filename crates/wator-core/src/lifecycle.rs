//! Simulation lifecycle: creation, initial seeding, and turn advancement.
//!
//! A [`Simulation`] owns its store and its random source. Creating one
//! registers the parameters with the store and seeds the grid at turn 0;
//! each [`Simulation::play_turn`] call advances exactly one turn and reports
//! whether the predators are extinct.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use wator_db::{AgentStore, StoreError};
use wator_types::{Agent, GridCoordinate, SimulationId, SimulationParameters, Species};
use wator_world::all_cells;

use crate::turn::{PhaseReport, TurnContext, TurnError};

/// Per-turn statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// The turn that was just played.
    pub turn: u64,
    /// Predators that starved.
    pub starved: u32,
    /// Prey eaten by predators.
    pub eaten: u32,
    /// Prey born.
    pub prey_born: u32,
    /// Predators born.
    pub predators_born: u32,
    /// Agents that changed cell (feeding, breeding, or plain movement).
    pub moved: u32,
    /// Live prey after the turn.
    pub prey_alive: u32,
    /// Live predators after the turn.
    pub predators_alive: u32,
}

impl TurnSummary {
    fn from_report(turn: u64, report: &PhaseReport) -> Self {
        Self {
            turn,
            starved: saturating_len(report.starved.len()),
            eaten: saturating_len(report.fed.len()),
            prey_born: saturating_len(report.prey_born.len()),
            predators_born: saturating_len(report.predators_born.len()),
            moved: saturating_len(report.moved_in_reproduction.len())
                .saturating_add(report.residual_moves),
            prey_alive: 0,
            predators_alive: 0,
        }
    }
}

fn saturating_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// What happened when a turn was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Predators remain; the simulation can continue.
    Continue(TurnSummary),
    /// No live predator remains. The simulation is over.
    Ended(TurnSummary),
}

impl TurnOutcome {
    /// The statistics of the turn.
    pub const fn summary(&self) -> &TurnSummary {
        match self {
            Self::Continue(summary) | Self::Ended(summary) => summary,
        }
    }

    /// Whether the simulation ended on this turn.
    pub const fn is_ended(&self) -> bool {
        matches!(self, Self::Ended(_))
    }
}

/// Spawn up to `quota` agents of one species on the next free cells.
fn seed_species<S: AgentStore>(
    store: &mut S,
    id: SimulationId,
    species: Species,
    quota: u32,
    free: &mut impl Iterator<Item = GridCoordinate>,
) -> Result<u32, StoreError> {
    let mut placed: u32 = 0;
    while placed < quota {
        let Some(cell) = free.next() else { break };
        store.spawn_agent(id, 0, species, cell)?;
        placed = placed.saturating_add(1);
    }
    Ok(placed)
}

/// A running Wa-Tor simulation bound to one store.
pub struct Simulation<S: AgentStore, R: Rng = SmallRng> {
    store: S,
    id: SimulationId,
    parameters: SimulationParameters,
    turn: u64,
    rng: R,
    ended: bool,
}

impl<S: AgentStore> Simulation<S, SmallRng> {
    /// Create and seed a simulation with an OS-seeded random source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the parameters are invalid or seeding fails.
    pub fn new(store: S, parameters: SimulationParameters) -> Result<Self, StoreError> {
        Self::with_rng(store, parameters, SmallRng::from_os_rng())
    }

    /// Create and seed a simulation with a deterministic random source.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the parameters are invalid or seeding fails.
    pub fn seeded(store: S, parameters: SimulationParameters, seed: u64) -> Result<Self, StoreError> {
        Self::with_rng(store, parameters, SmallRng::seed_from_u64(seed))
    }
}

impl<S: AgentStore, R: Rng> Simulation<S, R> {
    /// Create and seed a simulation with the given random source.
    ///
    /// Prey are placed first on uniformly chosen free cells, then predators.
    /// Placement stops when both quotas are met or the grid is full.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the parameters are invalid or seeding fails.
    pub fn with_rng(
        mut store: S,
        parameters: SimulationParameters,
        mut rng: R,
    ) -> Result<Self, StoreError> {
        let id = store.create_simulation(parameters)?;

        let mut cells = all_cells(parameters.grid_size);
        cells.shuffle(&mut rng);
        let mut free = cells.into_iter();
        let prey = seed_species(
            &mut store,
            id,
            Species::Prey,
            parameters.prey.initial_count,
            &mut free,
        )?;
        let predators = seed_species(
            &mut store,
            id,
            Species::Predator,
            parameters.predator.initial_count,
            &mut free,
        )?;

        info!(
            simulation = %id,
            grid_size = parameters.grid_size,
            prey,
            predators,
            "Simulation seeded"
        );

        Ok(Self {
            store,
            id,
            parameters,
            turn: 0,
            rng,
            ended: false,
        })
    }

    /// Pick up an existing simulation from the store at `turn`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownSimulation`] if the store has no such
    /// simulation.
    pub fn resume(store: S, id: SimulationId, turn: u64, rng: R) -> Result<Self, StoreError> {
        let record = store.get_simulation(id)?;
        let ended = store.list_by_species(id, Species::Predator)?.is_empty();
        debug!(simulation = %id, turn, ended, "Simulation resumed");
        Ok(Self {
            store,
            id,
            parameters: record.parameters,
            turn,
            rng,
            ended,
        })
    }

    /// The simulation id in the store.
    pub const fn id(&self) -> SimulationId {
        self.id
    }

    /// The turn the next `play_turn` call will play, which is also the
    /// number of turns played since seeding.
    pub const fn current_turn(&self) -> u64 {
        self.turn
    }

    /// The parameters the simulation runs with.
    pub const fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    /// Whether the predators are extinct.
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Read access to the backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Release the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// All live agents, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store query fails.
    pub fn live_agents(&self) -> Result<Vec<Agent>, StoreError> {
        self.store.list_all_live(self.id)
    }

    /// Advance the simulation by one turn.
    ///
    /// The phases run with turn number `current_turn()`; on success the
    /// counter is incremented. If a phase fails the counter is left unchanged,
    /// though the store keeps whatever the earlier phases applied.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::SimulationEnded`] once the predators are extinct,
    /// [`TurnError::TurnOverflow`] at the counter limit, or any phase error.
    pub fn play_turn(&mut self) -> Result<TurnOutcome, TurnError> {
        if self.ended {
            return Err(TurnError::SimulationEnded { turn: self.turn });
        }
        let turn = self.turn;
        let next = turn.checked_add(1).ok_or(TurnError::TurnOverflow)?;

        let report = TurnContext::new(
            &mut self.store,
            &mut self.rng,
            self.id,
            &self.parameters,
            turn,
        )
        .run()?;
        self.turn = next;

        let mut summary = TurnSummary::from_report(turn, &report);
        summary.prey_alive =
            saturating_len(self.store.list_by_species(self.id, Species::Prey)?.len());
        summary.predators_alive =
            saturating_len(self.store.list_by_species(self.id, Species::Predator)?.len());

        debug!(
            simulation = %self.id,
            turn,
            starved = summary.starved,
            eaten = summary.eaten,
            prey_born = summary.prey_born,
            predators_born = summary.predators_born,
            moved = summary.moved,
            prey_alive = summary.prey_alive,
            predators_alive = summary.predators_alive,
            "Turn complete"
        );

        if summary.predators_alive == 0 {
            self.ended = true;
            info!(simulation = %self.id, turn, "Predators extinct, simulation ended");
            return Ok(TurnOutcome::Ended(summary));
        }
        Ok(TurnOutcome::Continue(summary))
    }
}
