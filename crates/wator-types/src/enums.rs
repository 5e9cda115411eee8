//! Enumeration types for the Wa-Tor simulation.

use serde::{Deserialize, Serialize};

/// The two agent species sharing the grid.
///
/// Behavioural differences (maturity, breeding probability, starvation) are
/// driven by [`SimulationParameters`](crate::SimulationParameters), not by
/// the variant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    /// Prey agents. They breed and move, and are eaten by predators.
    Prey,
    /// Predator agents. They eat adjacent prey and starve without food.
    Predator,
}

impl Species {
    /// Both species, in the order they are seeded at simulation start.
    pub const ALL: [Self; 2] = [Self::Prey, Self::Predator];
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Prey => f.write_str("prey"),
            Self::Predator => f.write_str("predator"),
        }
    }
}

/// What a single grid cell holds in an occupancy view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellContent {
    /// No live agent.
    #[default]
    Empty,
    /// A live prey agent.
    Prey,
    /// A live predator agent.
    Predator,
}

impl CellContent {
    /// Single-character glyph used by the text view.
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Prey => 'f',
            Self::Predator => 'S',
        }
    }
}

impl From<Species> for CellContent {
    fn from(species: Species) -> Self {
        match species {
            Species::Prey => Self::Prey,
            Species::Predator => Self::Predator,
        }
    }
}
