//! Turn callback that prints the board to stdout.

use std::time::Duration;

use tracing::debug;
use wator_core::grid::OccupancyGrid;
use wator_core::lifecycle::TurnSummary;
use wator_core::runner::TurnCallback;

/// Prints the occupancy grid and turn duration after every turn.
pub struct RenderCallback {
    show_grid: bool,
}

impl RenderCallback {
    /// Create a callback. With `show_grid` off only the one-line summary is
    /// printed.
    pub const fn new(show_grid: bool) -> Self {
        Self { show_grid }
    }
}

impl TurnCallback for RenderCallback {
    fn on_turn(&mut self, summary: &TurnSummary, grid: &OccupancyGrid, elapsed: Duration) {
        println!(
            "turn {}: {} prey, {} predators ({:.3}s)",
            summary.turn,
            summary.prey_alive,
            summary.predators_alive,
            elapsed.as_secs_f64()
        );
        if self.show_grid {
            println!("{grid}");
        }
        debug!(
            turn = summary.turn,
            starved = summary.starved,
            eaten = summary.eaten,
            prey_born = summary.prey_born,
            predators_born = summary.predators_born,
            moved = summary.moved,
            "Turn rendered"
        );
    }
}
