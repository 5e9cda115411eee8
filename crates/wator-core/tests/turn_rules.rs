//! Behaviour tests for whole turns played through [`Simulation`].
//!
//! Scenarios are set up directly in a [`MemoryStore`] and picked up with
//! [`Simulation::resume`], so each test controls exactly which agents exist
//! and at which turn the engine starts.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc
)]

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use wator_core::lifecycle::{Simulation, TurnOutcome, TurnSummary};
use wator_core::turn::TurnError;
use wator_db::{AgentStore, MemoryStore};
use wator_types::{GridCoordinate, SimulationId, SimulationParameters, Species};
use wator_world::is_valid;

fn empty_params(grid_size: u32) -> SimulationParameters {
    let mut params = SimulationParameters::default();
    params.grid_size = grid_size;
    params.prey.initial_count = 0;
    params.predator.initial_count = 0;
    params
}

fn store_with(
    params: SimulationParameters,
    agents: &[(Species, (u32, u32))],
) -> (MemoryStore, SimulationId) {
    let mut store = MemoryStore::new();
    let id = store.create_simulation(params).unwrap();
    for &(species, (x, y)) in agents {
        store
            .spawn_agent(id, 0, species, GridCoordinate::new(x, y))
            .unwrap();
    }
    (store, id)
}

fn live_count(sim: &Simulation<MemoryStore>) -> usize {
    sim.live_agents().unwrap().len()
}

#[test]
fn predator_surrounded_by_prey_eats_breeds_and_population_grows() {
    let mut params = empty_params(10);
    params.prey.breed_probability = 100;
    params.predator.breed_probability = 100;
    params.starving_threshold = 1_000;
    let prey_cells = [(1, 1), (2, 1), (3, 1), (1, 3), (3, 2)];
    let mut agents = vec![(Species::Predator, (2, 2))];
    agents.extend(prey_cells.iter().map(|&c| (Species::Prey, c)));
    let (store, id) = store_with(params, &agents);

    for seed in 0..10 {
        let mut sim = Simulation::resume(
            store.clone(),
            id,
            params.predator.breed_maturity,
            SmallRng::seed_from_u64(seed),
        )
        .unwrap();
        let before = live_count(&sim);

        let outcome = sim.play_turn().unwrap();
        let summary = outcome.summary();
        assert_eq!(summary.eaten, 1);
        assert_eq!(summary.predators_born, 1);
        assert!(live_count(&sim) > before);

        let predators: Vec<_> = sim
            .store()
            .list_by_species(id, Species::Predator)
            .unwrap();
        assert_eq!(predators.len(), 2);
        let parent = predators.iter().find(|p| p.spawn_turn == 0).unwrap();
        let child = predators.iter().find(|p| p.spawn_turn != 0).unwrap();
        assert!(
            prey_cells
                .iter()
                .any(|&c| GridCoordinate::from(c) == parent.position)
        );
        assert_eq!(parent.last_fed_turn, params.predator.breed_maturity);
        assert_eq!(parent.breed_count, 1);
        assert_eq!(child.position, GridCoordinate::new(2, 2));
    }
}

#[test]
fn occupancy_stays_consistent_over_many_turns() {
    let mut params = SimulationParameters::default();
    params.grid_size = 12;
    params.prey.initial_count = 40;
    params.predator.initial_count = 10;

    for seed in 0..5 {
        let mut sim = Simulation::seeded(MemoryStore::new(), params, seed).unwrap();
        let mut live = live_count(&sim);

        for _ in 0..40 {
            let outcome = sim.play_turn().unwrap();
            let summary = *outcome.summary();

            let agents = sim.live_agents().unwrap();
            let cells: BTreeSet<_> = agents.iter().map(|a| a.position).collect();
            assert_eq!(cells.len(), agents.len(), "two live agents share a cell");
            assert!(agents.iter().all(|a| is_valid(params.grid_size, a.position)));

            let expected = live + summary.prey_born as usize + summary.predators_born as usize
                - summary.starved as usize
                - summary.eaten as usize;
            assert_eq!(agents.len(), expected);
            assert_eq!(
                agents.len(),
                (summary.prey_alive + summary.predators_alive) as usize
            );
            live = agents.len();

            if outcome.is_ended() {
                assert_eq!(summary.predators_alive, 0);
                break;
            }
        }
    }
}

#[test]
fn isolated_predator_starves_after_threshold() {
    let mut params = empty_params(8);
    params.starving_threshold = 2;
    let (store, id) = store_with(params, &[(Species::Predator, (0, 0))]);
    let mut sim = Simulation::resume(store, id, 0, SmallRng::seed_from_u64(1)).unwrap();

    for turn in 0..=2 {
        let outcome = sim.play_turn().unwrap();
        assert_eq!(outcome.summary().turn, turn);
        assert_eq!(outcome.summary().starved, 0);
        assert!(!outcome.is_ended());
    }

    let outcome = sim.play_turn().unwrap();
    assert!(outcome.is_ended());
    let summary = outcome.summary();
    assert_eq!(summary.turn, 3);
    assert_eq!(summary.starved, 1);
    assert!(matches!(
        sim.play_turn(),
        Err(TurnError::SimulationEnded { turn: 4 })
    ));
}

#[test]
fn prey_breed_only_once_mature() {
    let mut params = empty_params(20);
    params.prey.breed_maturity = 5;
    params.prey.breed_probability = 100;
    params.starving_threshold = 1_000;
    let (store, id) = store_with(
        params,
        &[(Species::Predator, (0, 0)), (Species::Prey, (15, 15))],
    );
    let mut sim = Simulation::resume(store, id, 0, SmallRng::seed_from_u64(6)).unwrap();

    for _ in 0..5 {
        let summary = *sim.play_turn().unwrap().summary();
        assert_eq!(summary.prey_born, 0, "immature prey bred on turn {}", summary.turn);
    }
    let summary = *sim.play_turn().unwrap().summary();
    assert_eq!(summary.turn, 5);
    assert_eq!(summary.prey_born, 1);
    assert_eq!(summary.prey_alive, 2);
}

#[test]
fn newborns_do_not_move_on_their_birth_turn() {
    let mut params = empty_params(10);
    params.prey.breed_maturity = 1;
    params.prey.breed_probability = 100;
    params.starving_threshold = 1_000;
    let (store, id) = store_with(
        params,
        &[(Species::Predator, (9, 9)), (Species::Prey, (4, 4))],
    );
    let mut sim = Simulation::resume(store, id, 1, SmallRng::seed_from_u64(3)).unwrap();

    sim.play_turn().unwrap();
    let prey = sim.store().list_by_species(id, Species::Prey).unwrap();
    let child = prey.iter().find(|a| a.spawn_turn == 1).unwrap();
    assert_eq!(child.position, GridCoordinate::new(4, 4));
}

#[test]
fn zero_predators_end_immediately() {
    let mut params = SimulationParameters::default();
    params.predator.initial_count = 0;
    let mut sim = Simulation::seeded(MemoryStore::new(), params, 11).unwrap();

    let outcome = sim.play_turn().unwrap();
    assert!(matches!(
        outcome,
        TurnOutcome::Ended(TurnSummary {
            predators_alive: 0,
            ..
        })
    ));
}

#[test]
fn same_seed_same_history() {
    let params = SimulationParameters::default();
    let history = |seed| {
        let mut sim = Simulation::seeded(MemoryStore::new(), params, seed).unwrap();
        let mut summaries = Vec::new();
        for _ in 0..15 {
            let outcome = sim.play_turn().unwrap();
            summaries.push(*outcome.summary());
            if outcome.is_ended() {
                break;
            }
        }
        summaries
    };
    assert_eq!(history(99), history(99));
}

#[test]
fn exported_store_resumes_where_it_left_off() {
    let params = SimulationParameters::default();
    let mut sim = Simulation::seeded(MemoryStore::new(), params, 17).unwrap();
    for _ in 0..3 {
        if sim.play_turn().unwrap().is_ended() {
            break;
        }
    }
    let turn = sim.current_turn();
    let id = sim.id();
    let before = sim.live_agents().unwrap();

    let json = sim.store().to_snapshot().to_json().unwrap();
    let restored =
        MemoryStore::from_snapshot(wator_db::StoreSnapshot::from_json(&json).unwrap()).unwrap();
    let resumed = Simulation::resume(restored, id, turn, SmallRng::seed_from_u64(0)).unwrap();

    assert_eq!(resumed.current_turn(), turn);
    assert_eq!(resumed.live_agents().unwrap(), before);
}
