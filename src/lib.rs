//! Terrain Evolve - Genetic optimizer for square terrain-type maps.
//!
//! Evolves an N×N grid of terrain identifiers with a generational genetic
//! algorithm whose fitness is the summed spatial variance of each terrain
//! type's cell positions.
//!
//! # Architecture
//!
//! - `schema`: Configuration and result types
//! - `compute`: Grid model, fitness, genetic operators and the generational loop
//! - `report`: Text progress stream and final map dump
//!
//! # Example
//!
//! ```rust,no_run
//! use terrain_evolve::{EvolutionConfig, EvolutionEngine, report::TextReport};
//!
//! let config = EvolutionConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//! let mut engine = EvolutionEngine::new(config)?;
//! let mut report = TextReport::new(std::io::stdout().lock());
//! engine.run_with_callback(|event| report.event(event))?;
//! # Ok::<(), terrain_evolve::Error>(())
//! ```

pub mod compute;
pub mod error;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use compute::TerrainGrid;
pub use compute::evolution::{EvolutionEngine, EvolutionEvent};
pub use error::{Error, Result};
pub use schema::{EvolutionConfig, EvolutionResult};
