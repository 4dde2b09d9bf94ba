//! Progress and result types produced by an evolution run.

use serde::{Deserialize, Serialize};

use crate::compute::TerrainGrid;
use crate::compute::evolution::TerrainVariance;

/// Statistics for one completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Round index (0-based).
    pub round: usize,
    /// Generation number within the round (1-based).
    pub generation: usize,
    /// Mean fitness of the new population.
    pub average_fitness: f64,
    /// Lowest fitness in the new population.
    pub best_fitness: f64,
    /// Mutation points applied to each child of this generation.
    pub mutation_points: usize,
}

/// Outcome of one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    /// Round index (0-based).
    pub round: usize,
    /// Individual in population slot 0 after the last generation.
    pub map: TerrainGrid,
    /// Fitness of `map`.
    pub fitness: f64,
    /// Per-terrain contributions to `fitness`.
    pub terrains: Vec<TerrainVariance>,
    /// Average fitness of the final population.
    pub final_avg_fitness: f64,
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations evolved per round.
    pub generations: usize,
    /// Rounds completed.
    pub rounds: usize,
    /// Fitness evaluations performed.
    pub total_evaluations: u64,
    /// Seed the run was started from.
    pub seed: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
}

/// Complete result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// One entry per round, in order.
    pub rounds: Vec<RoundResult>,
    pub stats: EvolutionStats,
}

impl EvolutionResult {
    /// Round whose final map scored lowest.
    pub fn best(&self) -> Option<&RoundResult> {
        self.rounds
            .iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }
}
