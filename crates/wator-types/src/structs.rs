//! Core entity structs: grid coordinates, agents, and simulation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Species;
use crate::ids::{AgentId, SimulationId};
use crate::params::SimulationParameters;

// ---------------------------------------------------------------------------
// Grid coordinate
// ---------------------------------------------------------------------------

/// An immutable `(x, y)` cell position.
///
/// Construction never checks the coordinate against a grid; validity is a
/// separate topology concern (see `wator-world`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl GridCoordinate {
    /// Create a coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Return the coordinate shifted by `(dx, dy)`.
    ///
    /// Returns `None` when either component would leave the `u32` range,
    /// which includes every shift to a negative position.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let Some(x) = self.x.checked_add_signed(dx) else {
            return None;
        };
        let Some(y) = self.y.checked_add_signed(dy) else {
            return None;
        };
        Some(Self { x, y })
    }
}

impl core::fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<x={:>3}, y={:>3}>", self.x, self.y)
    }
}

impl From<(u32, u32)> for GridCoordinate {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// One agent record.
///
/// Agents are never deleted: death flips `alive` and frees the cell for live
/// agents while keeping the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier.
    pub id: AgentId,
    /// The simulation this agent belongs to.
    pub simulation_id: SimulationId,
    /// Prey or predator.
    pub species: Species,
    /// Turn on which the agent was spawned.
    pub spawn_turn: u64,
    /// Number of successful breeding events.
    pub breed_count: u32,
    /// Turn of the last successful breeding event (0 if never bred).
    pub last_breed_turn: u64,
    /// Turn of the last meal. Only meaningful for predators.
    pub last_fed_turn: u64,
    /// Whether the agent is alive.
    pub alive: bool,
    /// Current cell.
    pub position: GridCoordinate,
}

impl Agent {
    /// Turns elapsed since spawn, saturating at zero.
    pub const fn age(&self, turn: u64) -> u64 {
        turn.saturating_sub(self.spawn_turn)
    }

    /// Whether the agent is old enough to attempt breeding.
    pub const fn is_mature(&self, turn: u64, breed_maturity: u64) -> bool {
        self.age(turn) >= breed_maturity
    }

    /// Whether a predator has gone longer than `threshold` turns unfed.
    pub const fn is_starving(&self, turn: u64, threshold: u64) -> bool {
        turn.saturating_sub(self.last_fed_turn) > threshold
    }

    /// Whether the agent was spawned on the given turn.
    pub const fn spawned_on(&self, turn: u64) -> bool {
        self.spawn_turn == turn
    }
}

// ---------------------------------------------------------------------------
// Simulation record
// ---------------------------------------------------------------------------

/// One row per simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Unique simulation identifier.
    pub id: SimulationId,
    /// Parameters the simulation was created with.
    pub parameters: SimulationParameters,
    /// Real-world creation time.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Bookkeeping update
// ---------------------------------------------------------------------------

/// The only agent fields a batched update may change. Position and `alive`
/// go through dedicated store operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookkeepingUpdate {
    /// New breeding count.
    pub breed_count: Option<u32>,
    /// New last-breeding turn.
    pub last_breed_turn: Option<u64>,
    /// New last-feeding turn.
    pub last_fed_turn: Option<u64>,
}

impl BookkeepingUpdate {
    /// Update recording a meal on `turn`.
    pub const fn fed(turn: u64) -> Self {
        Self {
            breed_count: None,
            last_breed_turn: None,
            last_fed_turn: Some(turn),
        }
    }

    /// Update recording a breeding event on `turn`, with the new count.
    pub const fn bred(turn: u64, breed_count: u32) -> Self {
        Self {
            breed_count: Some(breed_count),
            last_breed_turn: Some(turn),
            last_fed_turn: None,
        }
    }

    /// Apply the set fields to an agent.
    pub const fn apply(&self, agent: &mut Agent) {
        if let Some(count) = self.breed_count {
            agent.breed_count = count;
        }
        if let Some(turn) = self.last_breed_turn {
            agent.last_breed_turn = turn;
        }
        if let Some(turn) = self.last_fed_turn {
            agent.last_fed_turn = turn;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_agent() -> Agent {
        Agent {
            id: AgentId::new(1),
            simulation_id: SimulationId::new(1),
            species: Species::Predator,
            spawn_turn: 2,
            breed_count: 0,
            last_breed_turn: 0,
            last_fed_turn: 2,
            alive: true,
            position: GridCoordinate::new(3, 4),
        }
    }

    #[test]
    fn offset_moves_and_rejects_negative() {
        let c = GridCoordinate::new(0, 5);
        assert_eq!(c.offset(1, -1), Some(GridCoordinate::new(1, 4)));
        assert_eq!(c.offset(-1, 0), None);
        assert_eq!(GridCoordinate::new(2, 0).offset(0, -1), None);
    }

    #[test]
    fn coordinate_equality_is_structural() {
        assert_eq!(GridCoordinate::from((1, 2)), GridCoordinate::new(1, 2));
        assert_ne!(GridCoordinate::new(1, 2), GridCoordinate::new(2, 1));
    }

    #[test]
    fn maturity_and_starvation_checks() {
        let agent = sample_agent();
        assert!(!agent.is_mature(4, 3));
        assert!(agent.is_mature(5, 3));
        assert!(!agent.is_starving(6, 4));
        assert!(agent.is_starving(7, 4));
        assert!(agent.spawned_on(2));
    }

    #[test]
    fn bookkeeping_update_touches_only_set_fields() {
        let mut agent = sample_agent();
        BookkeepingUpdate::bred(9, 3).apply(&mut agent);
        assert_eq!(agent.breed_count, 3);
        assert_eq!(agent.last_breed_turn, 9);
        assert_eq!(agent.last_fed_turn, 2);

        BookkeepingUpdate::fed(10).apply(&mut agent);
        assert_eq!(agent.last_fed_turn, 10);
        assert_eq!(agent.breed_count, 3);
    }

    #[test]
    fn agent_roundtrips_through_json() {
        let agent = sample_agent();
        let json = serde_json::to_string(&agent).unwrap();
        let back: Agent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, agent);
    }
}
