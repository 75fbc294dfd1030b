//! Engine binary for the Exploding Elves simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `elfsim-config.yaml` in the working directory
//! 2. Initialize structured logging (tracing)
//! 3. Build the world: pool, spawners, cooldown gate, resolver
//! 4. Install the Ctrl-C handler
//! 5. Run the bounded tick loop
//! 6. Log the result

use std::path::{Path, PathBuf};

use elfsim_core::SimulationConfig;
use elfsim_core::config::LoggingConfig;
use elfsim_engine::{EngineError, World, runner};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "elfsim-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, world setup, or a tick fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(config = %config_source, "elfsim-engine starting");
    info!(
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        delta_secs = config.world.delta_secs,
        spawners = config.spawning.spawners.len(),
        pool_capacity = config.pool.capacity,
        "Configuration loaded"
    );

    // 3. Build the world.
    let mut world = World::from_config(&config)?;

    // 4. Ctrl-C requests a clean stop.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping");
                if stop_tx.send(true).is_err() {
                    warn!("Simulation already finished");
                }
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    // 5. Run the simulation.
    let result = runner::run_simulation(
        &mut world,
        &config.simulation,
        config.world.tick_interval_ms,
        stop_rx,
    )
    .await?;

    // 6. Log results.
    runner::log_simulation_end(&result);
    let stats = world.resolver().stats();
    info!(
        collisions = stats.collisions,
        duplicates = stats.duplicates,
        destroyed_pairs = stats.destroyed_pairs,
        denied_by_cooldown = stats.denied_by_cooldown,
        totals = %serde_json::to_string(&world.totals())?,
        "Collision statistics"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    info!(end_reason = ?result.end_reason, "elfsim-engine shutdown complete");
    Ok(())
}

/// Load the configuration named on the command line, or the default file.
///
/// A missing default file falls back to built-in defaults; a missing
/// explicit file is an error.
fn load_config() -> Result<(SimulationConfig, String), EngineError> {
    if let Some(arg) = std::env::args_os().nth(1) {
        let path = PathBuf::from(arg);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let config_path = Path::new(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok((config, String::from(DEFAULT_CONFIG_PATH)))
    } else {
        Ok((SimulationConfig::default(), String::from("built-in defaults")))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
