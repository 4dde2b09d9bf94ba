//! Genetic operators on terrain grids.
//!
//! Provides random generation, tournament selection, uniform crossover and
//! point mutation, all drawing from one owned random source.

use rand::prelude::*;
use rand_distr::Uniform;

use crate::compute::{Terrain, TerrainGrid};

use super::fitness::FitnessEvaluator;

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a grid with every cell drawn uniformly from `0..terrains`.
    pub fn random_grid(&mut self, size: usize, terrains: u8) -> TerrainGrid {
        let mut grid = TerrainGrid::new(size, terrains);
        let terrain_dist = Uniform::new(0, terrains);
        for idx in 0..grid.len() {
            grid.set_index(idx, self.rng.sample(&terrain_dist));
        }
        grid
    }

    /// Tournament selection: draw `size` entrants uniformly with replacement and
    /// return the index of the one with the lowest fitness.
    ///
    /// Ties go to the entrant drawn first.
    pub fn tournament_select(
        &mut self,
        population: &[TerrainGrid],
        size: usize,
        evaluator: &FitnessEvaluator,
    ) -> usize {
        assert!(size > 0, "tournament needs at least one entrant");
        let entrant_dist = Uniform::new(0, population.len());

        let mut best_idx = self.rng.sample(&entrant_dist);
        let mut best_fitness = evaluator.evaluate(&population[best_idx]);
        for _ in 1..size {
            let idx = self.rng.sample(&entrant_dist);
            let fitness = evaluator.evaluate(&population[idx]);
            if fitness < best_fitness {
                best_fitness = fitness;
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Uniform crossover: each cell independently goes straight or swapped.
    ///
    /// At every position one child holds `parent1`'s value and the other holds
    /// `parent2`'s.
    pub fn crossover(
        &mut self,
        parent1: &TerrainGrid,
        parent2: &TerrainGrid,
    ) -> (TerrainGrid, TerrainGrid) {
        assert_eq!(parent1.size(), parent2.size(), "parents differ in size");
        assert_eq!(
            parent1.terrains(),
            parent2.terrains(),
            "parents differ in terrain count"
        );

        let mut child1 = parent1.clone();
        let mut child2 = parent2.clone();
        for (idx, (&a, &b)) in parent1.cells().iter().zip(parent2.cells()).enumerate() {
            if !self.rng.gen_bool(0.5) {
                child1.set_index(idx, b);
                child2.set_index(idx, a);
            }
        }
        (child1, child2)
    }

    /// Overwrite `points` randomly chosen cells with random terrains.
    ///
    /// Positions may repeat and a new value may equal the old one.
    pub fn mutate(&mut self, grid: &mut TerrainGrid, points: usize) {
        if points == 0 || grid.is_empty() {
            return;
        }
        let position_dist = Uniform::new(0, grid.len());
        let terrain_dist = Uniform::new(0, grid.terrains());
        for _ in 0..points {
            let idx = self.rng.sample(&position_dist);
            let terrain: Terrain = self.rng.sample(&terrain_dist);
            grid.set_index(idx, terrain);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::fitness;
    use proptest::prelude::*;
    use rand::Rng;

    /// Indices the next tournament on `rng` will draw, without advancing it.
    fn upcoming_entrants(rng: &GenomeRng, population: usize, size: usize) -> Vec<usize> {
        let mut replay = rng.rng.clone();
        let entrant_dist = Uniform::new(0, population);
        (0..size).map(|_| replay.sample(&entrant_dist)).collect()
    }

    fn arb_parents() -> impl Strategy<Value = (TerrainGrid, TerrainGrid)> {
        (1usize..8, 1u8..6).prop_flat_map(|(size, terrains)| {
            let cells = prop::collection::vec(0..terrains, size * size);
            (cells.clone(), cells).prop_map(move |(a, b)| {
                (
                    TerrainGrid::from_cells(size, terrains, a).unwrap(),
                    TerrainGrid::from_cells(size, terrains, b).unwrap(),
                )
            })
        })
    }

    #[test]
    fn test_random_grid() {
        let mut rng = GenomeRng::new(42);
        let grid = rng.random_grid(46, 5);
        assert_eq!(grid.len(), 46 * 46);
        assert!(grid.is_valid());
        // Every terrain shows up on a map this large.
        assert!((0..5).all(|t| grid.count(t) > 0));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = GenomeRng::new(7).random_grid(10, 4);
        let b = GenomeRng::new(7).random_grid(10, 4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mutation_zero_points_is_identity() {
        let mut rng = GenomeRng::new(42);
        let mut grid = rng.random_grid(8, 3);
        let original = grid.clone();
        rng.mutate(&mut grid, 0);
        assert_eq!(grid, original);
    }

    #[test]
    fn test_mutation_changes_at_most_points_cells() {
        let mut rng = GenomeRng::new(3);
        let mut grid = rng.random_grid(16, 5);
        let original = grid.clone();
        rng.mutate(&mut grid, 10);
        let changed = grid
            .cells()
            .iter()
            .zip(original.cells())
            .filter(|(a, b)| a != b)
            .count();
        assert!(changed <= 10);
        assert!(grid.is_valid());
    }

    #[test]
    fn test_tournament_single_individual() {
        let mut rng = GenomeRng::new(1);
        let evaluator = FitnessEvaluator::new();
        let population = vec![rng.random_grid(4, 2)];
        assert_eq!(rng.tournament_select(&population, 3, &evaluator), 0);
        assert_eq!(evaluator.evaluations(), 3);
    }

    #[test]
    fn test_tournament_tie_goes_to_first_drawn() {
        let evaluator = FitnessEvaluator::new();
        let grid = GenomeRng::new(5).random_grid(4, 3);
        let population = vec![grid; 6];

        let mut rng = GenomeRng::new(19);
        for _ in 0..20 {
            let entrants = upcoming_entrants(&rng, population.len(), 4);
            let idx = rng.tournament_select(&population, 4, &evaluator);
            assert_eq!(idx, entrants[0]);
        }
    }

    #[test]
    fn test_tournament_prefers_lower_fitness() {
        let evaluator = FitnessEvaluator::new();
        // A single-terrain grid scores 2.5, a checkerboard 5.0.
        let clustered = TerrainGrid::new(4, 2);
        let scattered =
            TerrainGrid::from_cells(4, 2, (0..16).map(|i| ((i / 4 + i % 4) % 2) as u8).collect())
                .unwrap();
        let population = vec![scattered.clone(), clustered, scattered];

        let mut rng = GenomeRng::new(11);
        for _ in 0..50 {
            let idx = rng.tournament_select(&population, 2, &evaluator);
            assert!(idx < population.len());
        }
        // With 64 draws the clustered grid is all but certain to be drawn and win.
        assert_eq!(rng.tournament_select(&population, 64, &evaluator), 1);
    }

    proptest! {
        #[test]
        fn prop_crossover_conserves_parent_values((p1, p2) in arb_parents(), seed in any::<u64>()) {
            let mut rng = GenomeRng::new(seed);
            let (c1, c2) = rng.crossover(&p1, &p2);

            prop_assert_eq!(c1.len(), p1.len());
            prop_assert_eq!(c2.len(), p1.len());
            for i in 0..p1.len() {
                let (a, b) = (p1.cells()[i], p2.cells()[i]);
                let (x, y) = (c1.cells()[i], c2.cells()[i]);
                prop_assert!((x == a && y == b) || (x == b && y == a));
            }
        }

        #[test]
        fn prop_mutation_keeps_grid_valid(
            (grid, _) in arb_parents(),
            points in 0usize..100,
            seed in any::<u64>(),
        ) {
            let mut rng = GenomeRng::new(seed);
            let mut grid = grid;
            rng.mutate(&mut grid, points);
            prop_assert!(grid.is_valid());
        }

        #[test]
        fn prop_tournament_picks_best_drawn(
            pop_size in 1usize..10,
            tournament in 1usize..6,
            seed in any::<u64>(),
        ) {
            let mut rng = GenomeRng::new(seed);
            let evaluator = FitnessEvaluator::new();
            let population: Vec<_> = (0..pop_size).map(|_| rng.random_grid(4, 3)).collect();

            let entrants = upcoming_entrants(&rng, pop_size, tournament);
            let idx = rng.tournament_select(&population, tournament, &evaluator);

            prop_assert!(idx < pop_size);
            prop_assert!(entrants.contains(&idx));
            let selected = fitness(&population[idx]);
            for &entrant in &entrants {
                prop_assert!(selected <= fitness(&population[entrant]));
            }
            // Earliest entrant with the winning score.
            let first_best = entrants
                .iter()
                .copied()
                .find(|&e| fitness(&population[e]) == selected)
                .unwrap();
            prop_assert_eq!(idx, first_best);
        }
    }
}
