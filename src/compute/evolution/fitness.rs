//! Spatial variance fitness for terrain grids.
//!
//! Each terrain type contributes the mean squared distance of its cells from
//! their centroid; the grid's fitness is the sum over all terrain types.
//! The optimizer minimizes this score.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::compute::{Terrain, TerrainGrid};

/// Spatial variance of the cells holding `terrain`.
///
/// Returns `0.0` when the terrain does not occur in the grid.
pub fn variance_of_terrain(grid: &TerrainGrid, terrain: Terrain) -> f64 {
    terrain_variance(grid, terrain).variance
}

/// Sum of per-terrain spatial variance. Lower is better.
pub fn fitness(grid: &TerrainGrid) -> f64 {
    (0..grid.terrains())
        .map(|terrain| variance_of_terrain(grid, terrain))
        .sum()
}

/// Per-terrain contribution to a grid's fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainVariance {
    pub terrain: Terrain,
    /// Number of cells holding this terrain.
    pub cells: usize,
    /// Mean (row, col) of those cells, `None` if absent.
    pub centroid: Option<(f64, f64)>,
    pub variance: f64,
}

/// Compute centroid and variance of one terrain's cell positions.
pub fn terrain_variance(grid: &TerrainGrid, terrain: Terrain) -> TerrainVariance {
    let positions: Vec<(usize, usize)> = grid.positions(terrain).collect();
    if positions.is_empty() {
        return TerrainVariance {
            terrain,
            cells: 0,
            centroid: None,
            variance: 0.0,
        };
    }

    let n = positions.len() as f64;
    let (sum_row, sum_col) = positions
        .iter()
        .fold((0.0f64, 0.0f64), |(r, c), &(row, col)| {
            (r + row as f64, c + col as f64)
        });
    let mean_row = sum_row / n;
    let mean_col = sum_col / n;

    let moment: f64 = positions
        .iter()
        .map(|&(row, col)| {
            let dr = row as f64 - mean_row;
            let dc = col as f64 - mean_col;
            dr * dr + dc * dc
        })
        .sum();

    TerrainVariance {
        terrain,
        cells: positions.len(),
        centroid: Some((mean_row, mean_col)),
        variance: moment / n,
    }
}

/// Scores grids and counts how many evaluations it has performed.
#[derive(Debug, Default)]
pub struct FitnessEvaluator {
    evaluations: Cell<u64>,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a grid's fitness.
    pub fn evaluate(&self, grid: &TerrainGrid) -> f64 {
        self.evaluations.set(self.evaluations.get() + 1);
        fitness(grid)
    }

    /// Per-terrain breakdown of a grid's fitness. Not counted as an evaluation.
    pub fn breakdown(&self, grid: &TerrainGrid) -> Vec<TerrainVariance> {
        (0..grid.terrains())
            .map(|terrain| terrain_variance(grid, terrain))
            .collect()
    }

    /// Fitness evaluations performed so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }
}
