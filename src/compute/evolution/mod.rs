//! Evolutionary search for well-dispersed terrain maps.
//!
//! # Overview
//!
//! The search consists of:
//!
//! - **Fitness** (`fitness`): per-terrain spatial variance, summed; lower is better
//! - **Genome Operations** (`genome`): random grids, tournament selection,
//!   uniform crossover and point mutation
//! - **Search** (`search`): the generational loop repeated over independent rounds
//!
//! # Example
//!
//! ```rust,no_run
//! use terrain_evolve::schema::EvolutionConfig;
//! use terrain_evolve::compute::evolution::{EvolutionEngine, EvolutionEvent};
//!
//! let mut engine = EvolutionEngine::new(EvolutionConfig::default()).unwrap();
//! let _result = engine.run_with_callback(|event| {
//!     if let EvolutionEvent::GenerationCompleted(stats) = event {
//!         println!("Generation {}: {:.3}", stats.generation, stats.average_fitness);
//!     }
//!     Ok::<(), std::convert::Infallible>(())
//! });
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessEvaluator, TerrainVariance, fitness, terrain_variance, variance_of_terrain};
pub use genome::GenomeRng;
pub use search::{EvolutionEngine, EvolutionEvent};
