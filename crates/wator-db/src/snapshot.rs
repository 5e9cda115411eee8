//! Whole-store snapshots for export after the last committed turn.
//!
//! A [`StoreSnapshot`] is a plain serializable image of a store: every
//! simulation record with all of its agents (dead ones included) plus the
//! identifier counters, so a reloaded store never reissues an id.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wator_types::{Agent, SimulationRecord};

use crate::error::StoreError;

/// Serializable image of one simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// The simulation record.
    pub record: SimulationRecord,
    /// Every agent of the simulation, ordered by id.
    pub agents: Vec<Agent>,
}

/// Serializable image of a whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Highest simulation id issued so far.
    pub last_simulation_id: u64,
    /// Highest agent id issued so far.
    pub last_agent_id: u64,
    /// All simulations, ordered by id.
    pub simulations: Vec<SimulationSnapshot>,
}

impl StoreSnapshot {
    /// Render the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the snapshot to `path` as JSON, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] or [`StoreError::Io`].
    pub fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        tracing::info!(
            path = %path.display(),
            simulations = self.simulations.len(),
            "Store snapshot written"
        );
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Serialization`].
    pub fn read_from(path: &Path) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
