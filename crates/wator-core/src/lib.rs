//! Turn engine, simulation lifecycle, and run loop for the Wa-Tor simulation.
//!
//! This crate owns the 4-phase turn that drives the simulation:
//! Starvation, Predation, Reproduction, and Movement.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `wator-config.yaml` into
//!   strongly-typed structs.
//! - [`turn`] -- The 4-phase turn engine.
//! - [`lifecycle`] -- [`Simulation`]: creation, initial seeding, and
//!   `play_turn`.
//! - [`grid`] -- [`OccupancyGrid`], a 2D view of live agents.
//! - [`runner`] -- Bounded async run loop with a per-turn callback.
//!
//! [`Simulation`]: lifecycle::Simulation
//! [`OccupancyGrid`]: grid::OccupancyGrid

pub mod config;
pub mod grid;
pub mod lifecycle;
pub mod runner;
pub mod turn;
