//! Engine binary for the Wa-Tor simulation.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `$WATOR_CONFIG` (default `wator-config.yaml`)
//! 3. Create and seed the simulation in an in-memory store
//! 4. Print the initial grid
//! 5. Run the simulation loop, printing the grid after every turn
//! 6. Export a JSON snapshot if `runner.export_path` is set

mod error;
mod render_callback;

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;
use wator_core::config::WatorConfig;
use wator_core::grid::OccupancyGrid;
use wator_core::lifecycle::Simulation;
use wator_core::runner;
use wator_db::MemoryStore;

use crate::error::EngineError;
use crate::render_callback::RenderCallback;

/// Environment variable naming the configuration file.
const CONFIG_ENV_VAR: &str = "WATOR_CONFIG";

/// Configuration file used when `WATOR_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "wator-config.yaml";

/// Grids wider than this are not printed, only the per-turn summary line.
const MAX_RENDERED_GRID: u32 = 80;

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration first so its log level can seed the filter.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        max_turns = config.runner.max_turns,
        turn_interval_ms = config.runner.turn_interval_ms,
        "Configuration loaded"
    );

    // 3. Create and seed the simulation.
    let parameters = config.simulation_parameters()?;
    let store = MemoryStore::new();
    let mut simulation = match config.world.seed {
        Some(seed) => Simulation::seeded(store, parameters, seed)?,
        None => Simulation::new(store, parameters)?,
    };
    info!(simulation = %simulation.id(), "Simulation created");

    // 4. Print the initial grid.
    let show_grid = parameters.grid_size <= MAX_RENDERED_GRID;
    if show_grid {
        let agents = simulation.live_agents()?;
        println!("{}", OccupancyGrid::from_agents(parameters.grid_size, &agents));
    }

    // 5. Run the simulation loop.
    let mut callback = RenderCallback::new(show_grid);
    let result = runner::run_simulation(&mut simulation, &config.runner, &mut callback).await?;
    runner::log_simulation_end(&result);

    // 6. Export.
    if let Some(path) = &config.runner.export_path {
        simulation.store().save_json(path)?;
    }

    info!("wator-engine shutdown complete");
    Ok(())
}

/// Load configuration from the path in `WATOR_CONFIG`, or
/// `wator-config.yaml`, falling back to defaults when the file is absent.
fn load_config() -> Result<WatorConfig, EngineError> {
    let config_path = std::env::var(CONFIG_ENV_VAR)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        Ok(WatorConfig::from_file(&config_path)?)
    } else {
        let mut config = WatorConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}
