//! Generational loop driving terrain map evolution.

use std::convert::Infallible;
use std::time::Instant;

use log::{debug, info, trace};

use crate::compute::TerrainGrid;
use crate::schema::{
    EvolutionConfig, EvolutionConfigError, EvolutionResult, EvolutionStats, GenerationStats,
    RoundResult, SelectionMethod,
};

use super::fitness::{FitnessEvaluator, fitness};
use super::genome::GenomeRng;

/// Phase boundaries reported while a run progresses.
#[derive(Debug, Clone, Copy)]
pub enum EvolutionEvent<'a> {
    /// A fresh random population was created for `round`.
    RoundStarted { round: usize },
    /// A generation replaced the population.
    GenerationCompleted(&'a GenerationStats),
    /// A round finished all its generations.
    RoundCompleted(&'a RoundResult),
}

/// Evolution engine that owns the population and runs the search.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    seed: u64,
    rng: GenomeRng,
    evaluator: FitnessEvaluator,
    population: Vec<TerrainGrid>,
    /// Generations completed in the current round.
    generation: usize,
    /// Mutation points currently in effect. Survives across rounds unless
    /// the schedule resets it.
    mutation_points: usize,
}

impl EvolutionEngine {
    /// Create a new evolution engine, rejecting invalid configurations.
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionConfigError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let mutation_points = config.mutation.initial_points;

        Ok(Self {
            config,
            seed,
            rng: GenomeRng::new(seed),
            evaluator: FitnessEvaluator::new(),
            population: Vec::new(),
            generation: 0,
            mutation_points,
        })
    }

    /// Seed the random source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Current population.
    pub fn population(&self) -> &[TerrainGrid] {
        &self.population
    }

    /// Generations completed in the current round.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Mutation points currently in effect.
    pub fn mutation_points(&self) -> usize {
        self.mutation_points
    }

    /// Fitness evaluations performed so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluator.evaluations()
    }

    /// Replace the population with fresh random grids.
    pub fn initialize(&mut self) {
        let map = &self.config.map;
        self.population.clear();
        self.generation = 0;

        for _ in 0..self.config.population.size {
            let grid = self.rng.random_grid(map.size, map.terrains);
            self.population.push(grid);
        }

        if self.config.mutation.reset_each_round {
            self.mutation_points = self.config.mutation.initial_points;
        }
    }

    /// Run a single generation step and return its statistics.
    ///
    /// Parents are drawn from the current population in pairs; their two
    /// mutated children fill consecutive slots of the next population, which
    /// then replaces the current one. An engine with no population yet is
    /// initialized first.
    pub fn step_generation(&mut self, round: usize) -> GenerationStats {
        if self.population.is_empty() {
            self.initialize();
        }

        let points = self
            .config
            .mutation
            .points_for(self.generation, self.mutation_points);
        if points != self.mutation_points {
            debug!(
                "Round {}: mutation points {} -> {} at generation {}",
                round,
                self.mutation_points,
                points,
                self.generation + 1
            );
            self.mutation_points = points;
        }

        let mut next_gen = Vec::with_capacity(self.config.population.size);
        while next_gen.len() < self.config.population.size {
            let idx1 = self.select_index();
            let idx2 = self.select_index();

            let (mut child1, mut child2) = self
                .rng
                .crossover(&self.population[idx1], &self.population[idx2]);

            self.rng.mutate(&mut child1, self.mutation_points);
            self.rng.mutate(&mut child2, self.mutation_points);

            next_gen.push(child1);
            next_gen.push(child2);
        }

        self.population = next_gen;
        self.generation += 1;

        let scores: Vec<f64> = self
            .population
            .iter()
            .map(|grid| self.evaluator.evaluate(grid))
            .collect();
        let average_fitness = scores.iter().sum::<f64>() / scores.len() as f64;
        let best_fitness = scores.iter().copied().fold(f64::INFINITY, f64::min);
        trace!(
            "Round {} generation {}: best fitness = {}",
            round, self.generation, best_fitness
        );

        GenerationStats {
            round,
            generation: self.generation,
            average_fitness,
            best_fitness,
            mutation_points: self.mutation_points,
        }
    }

    /// Select a parent index using the configured method.
    fn select_index(&mut self) -> usize {
        match self.config.selection {
            SelectionMethod::Tournament { size } => {
                self.rng
                    .tournament_select(&self.population, size, &self.evaluator)
            }
        }
    }

    /// Summarize the current population as the result of `round`.
    ///
    /// Round summaries are not counted as fitness evaluations.
    fn finish_round(&self, round: usize) -> RoundResult {
        let map = self.population[0].clone();
        let map_fitness = fitness(&map);
        let terrains = self.evaluator.breakdown(&map);
        let final_avg_fitness =
            self.population.iter().map(fitness).sum::<f64>() / self.population.len() as f64;

        for t in &terrains {
            debug!(
                "Round {} terrain {}: {} cells, variance {:.4}",
                round, t.terrain, t.cells, t.variance
            );
        }

        RoundResult {
            round,
            map,
            fitness: map_fitness,
            terrains,
            final_avg_fitness,
        }
    }

    /// Run one round from a fresh population.
    pub fn run_round<F, E>(&mut self, round: usize, callback: &mut F) -> Result<RoundResult, E>
    where
        F: FnMut(EvolutionEvent<'_>) -> Result<(), E>,
    {
        self.initialize();
        info!(
            "Round {}/{} started ({} mutation points)",
            round + 1,
            self.config.population.rounds,
            self.mutation_points
        );
        callback(EvolutionEvent::RoundStarted { round })?;

        for _ in 0..self.config.population.generations {
            let stats = self.step_generation(round);
            callback(EvolutionEvent::GenerationCompleted(&stats))?;
        }

        let result = self.finish_round(round);
        info!(
            "Round {}/{} finished: slot 0 fitness = {:.4}",
            round + 1,
            self.config.population.rounds,
            result.fitness
        );
        callback(EvolutionEvent::RoundCompleted(&result))?;
        Ok(result)
    }

    /// Run every round, reporting events to `callback`.
    ///
    /// An error returned by the callback stops the run and is passed through.
    pub fn run_with_callback<F, E>(&mut self, mut callback: F) -> Result<EvolutionResult, E>
    where
        F: FnMut(EvolutionEvent<'_>) -> Result<(), E>,
    {
        let start_time = Instant::now();
        info!(
            "Evolving {}x{} maps with {} terrains: population {}, {} generations x {} rounds, seed {}",
            self.config.map.size,
            self.config.map.size,
            self.config.map.terrains,
            self.config.population.size,
            self.config.population.generations,
            self.config.population.rounds,
            self.seed
        );

        let mut rounds = Vec::with_capacity(self.config.population.rounds);
        for round in 0..self.config.population.rounds {
            rounds.push(self.run_round(round, &mut callback)?);
        }

        Ok(EvolutionResult {
            rounds,
            stats: EvolutionStats {
                generations: self.config.population.generations,
                rounds: self.config.population.rounds,
                total_evaluations: self.evaluator.evaluations(),
                seed: self.seed,
                elapsed_seconds: start_time.elapsed().as_secs_f64(),
            },
        })
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        match self.run_with_callback(|_| Ok::<(), Infallible>(())) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MapConfig, MutationSchedule, PopulationConfig};

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            map: MapConfig {
                size: 6,
                terrains: 3,
            },
            population: PopulationConfig {
                size: 4,
                generations: 5,
                rounds: 2,
            },
            mutation: MutationSchedule {
                initial_points: 4,
                annealed_points: 1,
                anneal_after: 2,
                reset_each_round: false,
            },
            random_seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_evolution_engine_creation() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        engine.initialize();

        assert_eq!(engine.population().len(), 4);
        assert!(engine.population().iter().all(|g| g.len() == 36 && g.is_valid()));
        assert_eq!(engine.seed(), 42);
    }

    #[test]
    fn test_odd_population_fails_fast() {
        let mut config = small_config();
        config.population.size = 3;
        assert!(matches!(
            EvolutionEngine::new(config),
            Err(EvolutionConfigError::OddPopulation(3))
        ));
    }

    #[test]
    fn test_step_keeps_population_shape() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        engine.initialize();
        let stats = engine.step_generation(0);

        assert_eq!(stats.generation, 1);
        assert_eq!(engine.population().len(), 4);
        assert!(engine.population().iter().all(TerrainGrid::is_valid));
        assert!(stats.average_fitness.is_finite());
        assert!(stats.best_fitness <= stats.average_fitness);
    }

    #[test]
    fn test_step_without_initialize() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        assert!(engine.population().is_empty());

        let stats = engine.step_generation(0);
        assert_eq!(stats.generation, 1);
        assert_eq!(engine.population().len(), 4);
        assert!(engine.population().iter().all(TerrainGrid::is_valid));
    }

    #[test]
    fn test_evaluations_count_selection_and_reporting_only() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        let result = engine.run();

        // Per generation: 4 parents x 3 entrants, plus 4 reported scores.
        let per_generation = 4 * 3 + 4;
        assert_eq!(result.stats.total_evaluations, per_generation * 5 * 2);
        assert_eq!(engine.evaluations(), result.stats.total_evaluations);

        let last = &result.rounds[1];
        let mean = engine.population().iter().map(fitness).sum::<f64>() / 4.0;
        assert_eq!(last.final_avg_fitness.to_bits(), mean.to_bits());
    }

    #[test]
    fn test_mutation_schedule_persists_across_rounds() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        let mut points = Vec::new();
        engine
            .run_with_callback(|event| {
                if let EvolutionEvent::GenerationCompleted(stats) = event {
                    points.push((stats.round, stats.mutation_points));
                }
                Ok::<(), Infallible>(())
            })
            .unwrap();

        // Generation indices 0..=2 keep 4 points, later ones anneal to 1.
        let first: Vec<_> = points.iter().filter(|p| p.0 == 0).map(|p| p.1).collect();
        assert_eq!(first, vec![4, 4, 4, 1, 1]);
        // The annealed count carries into the second round.
        let second: Vec<_> = points.iter().filter(|p| p.0 == 1).map(|p| p.1).collect();
        assert_eq!(second, vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_mutation_schedule_resets_per_round() {
        let mut config = small_config();
        config.mutation.reset_each_round = true;
        let mut engine = EvolutionEngine::new(config).unwrap();
        let mut points = Vec::new();
        engine
            .run_with_callback(|event| {
                if let EvolutionEvent::GenerationCompleted(stats) = event {
                    points.push(stats.mutation_points);
                }
                Ok::<(), Infallible>(())
            })
            .unwrap();

        assert_eq!(points, vec![4, 4, 4, 1, 1, 4, 4, 4, 1, 1]);
    }

    #[test]
    fn test_evolution_run() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        let result = engine.run();

        assert_eq!(result.rounds.len(), 2);
        assert_eq!(result.stats.generations, 5);
        assert!(result.stats.total_evaluations > 0);
        for round in &result.rounds {
            assert!(round.map.is_valid());
            assert!(round.fitness >= 0.0);
            let total: f64 = round.terrains.iter().map(|t| t.variance).sum();
            assert!((total - round.fitness).abs() < 1e-9);
        }
        assert!(result.best().is_some());
    }

    #[test]
    fn test_same_seed_same_result() {
        let a = EvolutionEngine::new(small_config()).unwrap().run();
        let b = EvolutionEngine::new(small_config()).unwrap().run();
        for (x, y) in a.rounds.iter().zip(&b.rounds) {
            assert_eq!(x.map, y.map);
            assert_eq!(x.fitness.to_bits(), y.fitness.to_bits());
        }
    }

    #[test]
    fn test_callback_error_stops_run() {
        let mut engine = EvolutionEngine::new(small_config()).unwrap();
        let mut seen = 0;
        let outcome = engine.run_with_callback(|event| {
            if let EvolutionEvent::GenerationCompleted(_) = event {
                seen += 1;
                if seen == 3 {
                    return Err("stop");
                }
            }
            Ok(())
        });

        assert_eq!(outcome.unwrap_err(), "stop");
        assert_eq!(seen, 3);
        assert_eq!(engine.generation(), 3);
    }

    #[test]
    fn test_event_order() {
        let mut config = small_config();
        config.population.generations = 2;
        config.population.rounds = 1;
        let mut engine = EvolutionEngine::new(config).unwrap();
        let mut events = Vec::new();
        engine
            .run_with_callback(|event| {
                events.push(match event {
                    EvolutionEvent::RoundStarted { .. } => "start",
                    EvolutionEvent::GenerationCompleted(_) => "generation",
                    EvolutionEvent::RoundCompleted(_) => "end",
                });
                Ok::<(), Infallible>(())
            })
            .unwrap();

        assert_eq!(events, vec!["start", "generation", "generation", "end"]);
    }
}
