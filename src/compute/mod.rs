//! Compute module - Grid model and evolutionary search.

pub mod evolution;
mod grid;

pub use grid::*;
