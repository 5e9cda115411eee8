//! Bounded simulation loop.
//!
//! [`run_simulation`] drives [`Simulation::play_turn`] until one of:
//!
//! - **Extinction**: no live predator remains
//! - **Turn limit**: `max_turns` turns have been played (0 = no limit)
//!
//! After every turn it hands the summary and an [`OccupancyGrid`] of the
//! board to a [`TurnCallback`], then sleeps for `turn_interval_ms`.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wator_db::{AgentStore, StoreError};

use crate::config::RunnerConfig;
use crate::grid::OccupancyGrid;
use crate::lifecycle::{Simulation, TurnOutcome, TurnSummary};
use crate::turn::TurnError;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A turn failed.
    #[error("turn error: {source}")]
    Turn {
        /// The underlying turn error.
        #[from]
        source: TurnError,
    },

    /// Reading the board for the callback failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Why the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// All predators are dead.
    Extinction,
    /// Reached the configured `max_turns` limit.
    MaxTurnsReached,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the run stopped.
    pub end_reason: EndReason,
    /// Summary of the last turn played, if any.
    pub final_summary: Option<TurnSummary>,
    /// Turns played by this call.
    pub total_turns: u64,
}

/// Callback invoked after each turn.
pub trait TurnCallback: Send {
    /// Called after a turn completes, with the board as it stands and the
    /// wall-clock time the turn took.
    fn on_turn(&mut self, summary: &TurnSummary, grid: &OccupancyGrid, elapsed: Duration);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TurnCallback for NoOpCallback {
    fn on_turn(&mut self, _summary: &TurnSummary, _grid: &OccupancyGrid, _elapsed: Duration) {}
}

/// Play turns until the predators die out or the turn limit is hit.
///
/// A simulation that has already ended returns immediately with
/// [`EndReason::Extinction`] and no summary.
///
/// # Errors
///
/// Returns [`RunnerError`] if a turn fails. The simulation is left at the
/// last completed turn.
pub async fn run_simulation<S: AgentStore, R: Rng>(
    simulation: &mut Simulation<S, R>,
    config: &RunnerConfig,
    callback: &mut dyn TurnCallback,
) -> Result<RunResult, RunnerError> {
    let mut last_summary: Option<TurnSummary> = None;
    let mut total_turns: u64 = 0;

    info!(
        simulation = %simulation.id(),
        start_turn = simulation.current_turn(),
        max_turns = config.max_turns,
        turn_interval_ms = config.turn_interval_ms,
        "Simulation starting"
    );

    if simulation.is_ended() {
        warn!(simulation = %simulation.id(), "Simulation already ended, nothing to run");
        return Ok(RunResult {
            end_reason: EndReason::Extinction,
            final_summary: None,
            total_turns,
        });
    }

    loop {
        // --- Check turn limit (before turn) ---
        if config.max_turns > 0 && total_turns >= config.max_turns {
            info!(
                turn = simulation.current_turn(),
                max_turns = config.max_turns,
                "Turn limit reached"
            );
            return Ok(RunResult {
                end_reason: EndReason::MaxTurnsReached,
                final_summary: last_summary,
                total_turns,
            });
        }

        // --- Play turn ---
        let started = Instant::now();
        let outcome = simulation.play_turn()?;
        let elapsed = started.elapsed();
        total_turns = total_turns.saturating_add(1);

        // --- Notify callback ---
        let agents = simulation.live_agents()?;
        let grid = OccupancyGrid::from_agents(simulation.parameters().grid_size, &agents);
        callback.on_turn(outcome.summary(), &grid, elapsed);

        match outcome {
            TurnOutcome::Ended(summary) => {
                info!(turn = summary.turn, "All predators dead -- extinction");
                return Ok(RunResult {
                    end_reason: EndReason::Extinction,
                    final_summary: Some(summary),
                    total_turns,
                });
            }
            TurnOutcome::Continue(summary) => last_summary = Some(summary),
        }

        // --- Sleep for turn interval ---
        if config.turn_interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.turn_interval_ms)).await;
        }
    }
}

/// Log how a run ended.
pub fn log_simulation_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_turns = result.total_turns,
        final_turn = result.final_summary.as_ref().map(|s| s.turn),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            turn = summary.turn,
            prey_alive = summary.prey_alive,
            predators_alive = summary.predators_alive,
            "Final turn summary"
        );
    } else {
        warn!("Simulation ended with no turns played");
    }
}
