//! Schema module - Configuration and result types for terrain evolution.

mod config;
mod evolution;

pub use config::*;
pub use evolution::*;
