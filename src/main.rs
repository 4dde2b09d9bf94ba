//! Terrain Evolve CLI - Evolve dispersed terrain maps with the built-in configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::io;

use log::{debug, info};

use terrain_evolve::{
    EvolutionConfig, EvolutionEngine, EvolutionEvent, Result, report::TextReport,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = EvolutionConfig::default();
    debug!("Configuration: {}", serde_json::to_string(&config)?);

    let mut engine = EvolutionEngine::new(config)?;
    let stdout = io::stdout();
    let mut report = TextReport::new(stdout.lock());

    let result = engine.run_with_callback(|event| {
        if let EvolutionEvent::RoundCompleted(round) = event {
            info!("---- end of round {} ----", round.round + 1);
        }
        report.event(event)
    })?;

    if let Some(best) = result.best() {
        info!(
            "Best map came from round {} with fitness {:.4}",
            best.round + 1,
            best.fitness
        );
    }
    info!(
        "{} fitness evaluations in {:.2}s",
        result.stats.total_evaluations, result.stats.elapsed_seconds
    );
    Ok(())
}
