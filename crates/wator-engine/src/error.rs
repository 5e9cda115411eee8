//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup, the run, and
//! the final export.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: wator_core::config::ConfigError,
    },

    /// Creating, seeding, or exporting the simulation failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: wator_db::StoreError,
    },

    /// The run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: wator_core::runner::RunnerError,
    },
}
