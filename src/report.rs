//! Line-oriented text report of an evolution run.
//!
//! Writes one `Generation <g>: Average Fitness = <value>` line per generation
//! and, at the end of each round, the final map:
//!
//! ```text
//!
//! Final individual map:
//! 0123
//! 4012
//! 3401
//! 2340
//!
//! ```

use std::io::{self, Write};

use crate::compute::TerrainGrid;
use crate::compute::evolution::EvolutionEvent;
use crate::schema::GenerationStats;

/// Text report over any writer.
pub struct TextReport<W: Write> {
    out: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write whatever `event` contributes to the report.
    pub fn event(&mut self, event: EvolutionEvent<'_>) -> io::Result<()> {
        match event {
            EvolutionEvent::RoundStarted { .. } => Ok(()),
            EvolutionEvent::GenerationCompleted(stats) => self.generation(stats),
            EvolutionEvent::RoundCompleted(result) => self.final_map(&result.map),
        }
    }

    /// Write the progress line for a generation and flush it.
    pub fn generation(&mut self, stats: &GenerationStats) -> io::Result<()> {
        writeln!(
            self.out,
            "Generation {}: Average Fitness = {}",
            stats.generation, stats.average_fitness
        )?;
        self.out.flush()
    }

    /// Write the final map dump.
    pub fn final_map(&mut self, map: &TerrainGrid) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Final individual map:")?;
        write!(self.out, "{map}")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
