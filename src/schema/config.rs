//! Configuration types for terrain map evolution.

use serde::{Deserialize, Serialize};

/// Largest terrain count the text dump can render (one base-36 digit per cell).
pub const MAX_TERRAINS: u8 = 36;

/// Top-level configuration for a terrain evolution run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Map shape and terrain alphabet.
    #[serde(default)]
    pub map: MapConfig,
    /// Population, generation and round settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Parent selection method.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Mutation intensity and its anneal schedule.
    #[serde(default)]
    pub mutation: MutationSchedule,
    /// Random seed for reproducibility. `None` seeds from entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Map shape and terrain alphabet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Side length of the square map in cells.
    #[serde(default = "default_map_size")]
    pub size: usize,
    /// Number of terrain types; identifiers are `0..terrains`.
    #[serde(default = "default_terrains")]
    pub terrains: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size: default_map_size(),
            terrains: default_terrains(),
        }
    }
}

impl MapConfig {
    /// Total number of cells (`size * size`).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }
}

fn default_map_size() -> usize {
    46
}
fn default_terrains() -> u8 {
    5
}

/// Population and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals in the population. Must be even.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Generations evolved per round.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Independent restarts, each from a fresh random population.
    #[serde(default = "default_rounds")]
    pub rounds: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            generations: default_generations(),
            rounds: default_rounds(),
        }
    }
}

fn default_population_size() -> usize {
    6
}
fn default_generations() -> usize {
    4000
}
fn default_rounds() -> usize {
    10
}

/// Selection method for choosing parents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method")]
pub enum SelectionMethod {
    /// Tournament selection: draw `size` entrants with replacement, lowest fitness wins.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::Tournament {
            size: default_tournament_size(),
        }
    }
}

fn default_tournament_size() -> usize {
    3
}

/// Two-phase mutation schedule: explore with `initial_points`, then drop to
/// `annealed_points` once the 0-based generation index exceeds `anneal_after`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationSchedule {
    /// Point mutations per child before annealing.
    #[serde(default = "default_initial_points")]
    pub initial_points: usize,
    /// Point mutations per child after annealing.
    #[serde(default = "default_annealed_points")]
    pub annealed_points: usize,
    /// Generation index after which the annealed count applies.
    #[serde(default = "default_anneal_after")]
    pub anneal_after: usize,
    /// Restore `initial_points` at the start of every round.
    ///
    /// When `false` an annealed count carries over into later rounds.
    #[serde(default)]
    pub reset_each_round: bool,
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            initial_points: default_initial_points(),
            annealed_points: default_annealed_points(),
            anneal_after: default_anneal_after(),
            reset_each_round: false,
        }
    }
}

impl MutationSchedule {
    /// Mutation points to use for `generation` given the count currently in effect.
    ///
    /// Annealing is one-way: once past the threshold the annealed count sticks.
    #[inline]
    pub fn points_for(&self, generation: usize, current: usize) -> usize {
        if generation > self.anneal_after {
            self.annealed_points
        } else {
            current
        }
    }
}

fn default_initial_points() -> usize {
    10
}
fn default_annealed_points() -> usize {
    1
}
fn default_anneal_after() -> usize {
    500
}

/// Evolution configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EvolutionConfigError {
    #[error("Map size must be non-zero")]
    EmptyMap,
    #[error("Terrain count must be between 1 and 36, got {0}")]
    InvalidTerrainCount(u8),
    #[error("Population size must be non-zero")]
    EmptyPopulation,
    #[error("Population size must be even to pair parents, got {0}")]
    OddPopulation(usize),
    #[error("Tournament size must be non-zero")]
    EmptyTournament,
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), EvolutionConfigError> {
        if self.map.size == 0 {
            return Err(EvolutionConfigError::EmptyMap);
        }
        if self.map.terrains == 0 || self.map.terrains > MAX_TERRAINS {
            return Err(EvolutionConfigError::InvalidTerrainCount(self.map.terrains));
        }

        if self.population.size == 0 {
            return Err(EvolutionConfigError::EmptyPopulation);
        }
        if self.population.size % 2 != 0 {
            return Err(EvolutionConfigError::OddPopulation(self.population.size));
        }

        match self.selection {
            SelectionMethod::Tournament { size: 0 } => Err(EvolutionConfigError::EmptyTournament),
            SelectionMethod::Tournament { .. } => Ok(()),
        }
    }
}
