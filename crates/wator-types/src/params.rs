//! Simulation parameters and their construction-time validation.
//!
//! Parameters are immutable once a simulation is created. Every numeric
//! constraint is checked by [`SimulationParameters::validate`] before the
//! store accepts them.

use serde::{Deserialize, Serialize};

use crate::enums::Species;

/// Upper bound (inclusive) of a breeding probability, in percent.
pub const MAX_BREED_PROBABILITY: u8 = 100;

/// Largest accepted grid side. Seeding and rendering hold one entry per cell.
pub const MAX_GRID_SIZE: u32 = 2_048;

/// Error returned when a parameter set violates a constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid simulation parameters: {reason}")]
pub struct InvalidParameters {
    /// Explanation of the violated constraint.
    pub reason: String,
}

impl InvalidParameters {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Per-species lifecycle parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesParameters {
    /// Number of agents of this species placed at simulation start.
    pub initial_count: u32,
    /// Turns since spawn before the agent may attempt to breed.
    pub breed_maturity: u64,
    /// Chance of breeding once mature, as an integer percent in `0..=100`.
    pub breed_probability: u8,
    /// Movement speed. Carried for completeness; movement is one cell per turn.
    pub speed: u32,
}

/// Immutable parameter set for one simulation run.
///
/// Every field is optional when deserializing, including the fields of a
/// species block; gaps take the value from [`SimulationParameters::default`]
/// for that species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PartialParameters")]
pub struct SimulationParameters {
    /// Side length of the square grid.
    pub grid_size: u32,
    /// Prey parameters.
    pub prey: SpeciesParameters,
    /// Predator parameters.
    pub predator: SpeciesParameters,
    /// Turns a predator survives without feeding. It dies once
    /// `turn - last_fed_turn` exceeds this value.
    pub starving_threshold: u64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            grid_size: 10,
            prey: SpeciesParameters {
                initial_count: 20,
                breed_maturity: 3,
                breed_probability: 60,
                speed: 1,
            },
            predator: SpeciesParameters {
                initial_count: 5,
                breed_maturity: 6,
                breed_probability: 40,
                speed: 1,
            },
            starving_threshold: 4,
        }
    }
}

/// Deserialization shape of [`SimulationParameters`] with every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialParameters {
    grid_size: Option<u32>,
    prey: PartialSpecies,
    predator: PartialSpecies,
    starving_threshold: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialSpecies {
    initial_count: Option<u32>,
    breed_maturity: Option<u64>,
    breed_probability: Option<u8>,
    speed: Option<u32>,
}

impl PartialSpecies {
    fn or(self, base: SpeciesParameters) -> SpeciesParameters {
        SpeciesParameters {
            initial_count: self.initial_count.unwrap_or(base.initial_count),
            breed_maturity: self.breed_maturity.unwrap_or(base.breed_maturity),
            breed_probability: self.breed_probability.unwrap_or(base.breed_probability),
            speed: self.speed.unwrap_or(base.speed),
        }
    }
}

impl From<PartialParameters> for SimulationParameters {
    fn from(partial: PartialParameters) -> Self {
        let base = Self::default();
        Self {
            grid_size: partial.grid_size.unwrap_or(base.grid_size),
            prey: partial.prey.or(base.prey),
            predator: partial.predator.or(base.predator),
            starving_threshold: partial.starving_threshold.unwrap_or(base.starving_threshold),
        }
    }
}

impl SimulationParameters {
    /// Return the parameters of one species.
    pub const fn species(&self, species: Species) -> &SpeciesParameters {
        match species {
            Species::Prey => &self.prey,
            Species::Predator => &self.predator,
        }
    }

    /// Breeding maturity of a species, in turns.
    pub const fn breed_maturity(&self, species: Species) -> u64 {
        self.species(species).breed_maturity
    }

    /// Breeding probability of a species, in percent.
    pub const fn breed_probability(&self, species: Species) -> u8 {
        self.species(species).breed_probability
    }

    /// Movement speed of a species.
    pub const fn speed(&self, species: Species) -> u32 {
        self.species(species).speed
    }

    /// Number of cells on the grid.
    pub fn capacity(&self) -> u64 {
        let side = u64::from(self.grid_size);
        side.saturating_mul(side)
    }

    /// Total number of agents placed at simulation start.
    pub fn initial_population(&self) -> u64 {
        u64::from(self.prey.initial_count).saturating_add(u64::from(self.predator.initial_count))
    }

    /// Check every numeric constraint.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameters`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), InvalidParameters> {
        if self.grid_size == 0 {
            return Err(InvalidParameters::new("grid_size must be at least 1"));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(InvalidParameters::new(format!(
                "grid_size must be at most {MAX_GRID_SIZE}, not {}",
                self.grid_size
            )));
        }
        if self.initial_population() > self.capacity() {
            return Err(InvalidParameters::new(format!(
                "initial population {} exceeds grid capacity {}",
                self.initial_population(),
                self.capacity()
            )));
        }
        for species in Species::ALL {
            let p = self.species(species);
            if p.breed_probability > MAX_BREED_PROBABILITY {
                return Err(InvalidParameters::new(format!(
                    "{species} breed_probability must be between 0 and 100, not {}",
                    p.breed_probability
                )));
            }
            if p.breed_maturity == 0 {
                return Err(InvalidParameters::new(format!(
                    "{species} breed_maturity must be positive"
                )));
            }
            if p.speed == 0 {
                return Err(InvalidParameters::new(format!(
                    "{species} speed must be positive"
                )));
            }
        }
        if self.starving_threshold == 0 {
            return Err(InvalidParameters::new(
                "predator starving_threshold must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn population_larger_than_grid_is_rejected() {
        let mut params = SimulationParameters::default();
        params.grid_size = 3;
        params.prey.initial_count = 8;
        params.predator.initial_count = 2;
        let err = params.validate().err();
        assert!(err.is_some_and(|e| e.reason.contains("capacity")));
    }

    #[test]
    fn full_grid_is_accepted() {
        let mut params = SimulationParameters::default();
        params.grid_size = 3;
        params.prey.initial_count = 7;
        params.predator.initial_count = 2;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn probability_above_hundred_is_rejected() {
        let mut params = SimulationParameters::default();
        params.predator.breed_probability = 101;
        assert!(params.validate().is_err());
        params.predator.breed_probability = 100;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let mut params = SimulationParameters::default();
        params.prey.breed_maturity = 0;
        assert!(params.validate().is_err());

        let mut params = SimulationParameters::default();
        params.predator.speed = 0;
        assert!(params.validate().is_err());

        let mut params = SimulationParameters::default();
        params.starving_threshold = 0;
        assert!(params.validate().is_err());

        let mut params = SimulationParameters::default();
        params.grid_size = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let mut params = SimulationParameters::default();
        params.grid_size = MAX_GRID_SIZE;
        assert!(params.validate().is_ok());
        params.grid_size = 100_000;
        let err = params.validate().err();
        assert!(err.is_some_and(|e| e.reason.contains("at most")));
    }

    #[test]
    fn partial_species_block_keeps_species_defaults() {
        let json = r#"{"prey": {"breed_probability": 50}, "predator": {"speed": 2}}"#;
        let params: SimulationParameters = serde_json::from_str(json).unwrap();
        let defaults = SimulationParameters::default();

        assert_eq!(params.prey.breed_probability, 50);
        assert_eq!(params.prey.initial_count, defaults.prey.initial_count);
        assert_eq!(params.prey.breed_maturity, defaults.prey.breed_maturity);
        assert_eq!(params.predator.speed, 2);
        assert_eq!(params.predator.breed_maturity, defaults.predator.breed_maturity);
        assert_eq!(params.grid_size, defaults.grid_size);
    }

    #[test]
    fn full_parameters_survive_json() {
        let mut params = SimulationParameters::default();
        params.grid_size = 7;
        params.predator.initial_count = 3;
        let json = serde_json::to_string(&params).unwrap();
        let back: SimulationParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn species_accessors() {
        let params = SimulationParameters::default();
        assert_eq!(params.breed_maturity(Species::Prey), 3);
        assert_eq!(params.breed_probability(Species::Predator), 40);
        assert_eq!(params.speed(Species::Prey), 1);
        assert_eq!(params.capacity(), 100);
    }
}
