//! A dense 2D view of the live agents, used for rendering.

use std::fmt;

use wator_types::{Agent, CellContent, GridCoordinate};

/// Occupancy matrix indexed `[x][y]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: Vec<Vec<CellContent>>,
}

impl OccupancyGrid {
    /// Build the matrix from a set of agents. Dead agents and agents
    /// outside the grid are ignored.
    pub fn from_agents<'a>(grid_size: u32, agents: impl IntoIterator<Item = &'a Agent>) -> Self {
        let side = usize::try_from(grid_size).unwrap_or(0);
        let mut cells = vec![vec![CellContent::Empty; side]; side];
        for agent in agents.into_iter().filter(|a| a.alive) {
            if let Some(cell) = Self::slot(&mut cells, agent.position) {
                *cell = CellContent::from(agent.species);
            }
        }
        Self { cells }
    }

    fn slot(
        cells: &mut [Vec<CellContent>],
        coordinate: GridCoordinate,
    ) -> Option<&mut CellContent> {
        let x = usize::try_from(coordinate.x).ok()?;
        let y = usize::try_from(coordinate.y).ok()?;
        cells.get_mut(x)?.get_mut(y)
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Content of one cell, or `None` off the grid.
    pub fn get(&self, coordinate: GridCoordinate) -> Option<CellContent> {
        let x = usize::try_from(coordinate.x).ok()?;
        let y = usize::try_from(coordinate.y).ok()?;
        self.cells.get(x)?.get(y).copied()
    }

    /// Number of `(prey, predator)` cells.
    pub fn counts(&self) -> (usize, usize) {
        self.cells
            .iter()
            .flatten()
            .fold((0, 0), |(prey, predators), cell| match cell {
                CellContent::Prey => (prey.saturating_add(1), predators),
                CellContent::Predator => (prey, predators.saturating_add(1)),
                CellContent::Empty => (prey, predators),
            })
    }
}

/// One line per `x`, one glyph per `y`.
impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(|c| c.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
