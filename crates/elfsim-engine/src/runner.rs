//! Bounded tick loop.
//!
//! [`run_simulation`] drives [`World::step`] until a tick limit, a
//! wall-clock limit, or a shutdown request ends the run. Between ticks it
//! sleeps for the configured interval, or just yields when the interval
//! is zero.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use elfsim_core::config::SimulationBoundsConfig;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::world::{TickSummary, World};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The configured tick limit was reached.
    MaxTicksReached,
    /// The configured wall-clock limit was reached.
    MaxRealTimeReached,
    /// Shutdown was requested from outside the loop.
    ShutdownRequested,
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Number of ticks executed.
    pub total_ticks: u64,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub finished_at: DateTime<Utc>,
}

/// Run `world` until a bound is hit or `shutdown` flips to `true`.
///
/// A bound of 0 in `bounds` means unlimited. The shutdown flag is checked
/// before every tick; the tick limit after it.
///
/// # Errors
///
/// Returns [`EngineError`] if a tick fails.
pub async fn run_simulation(
    world: &mut World,
    bounds: &SimulationBoundsConfig,
    tick_interval_ms: u64,
    mut shutdown: watch::Receiver<bool>,
) -> Result<SimulationResult, EngineError> {
    let started_at = Utc::now();
    let started = Instant::now();
    let time_limit = (bounds.max_real_time_seconds > 0)
        .then_some(Duration::from_secs(bounds.max_real_time_seconds));
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = bounds.max_ticks,
        max_real_time_seconds = bounds.max_real_time_seconds,
        tick_interval_ms,
        "Simulation starting"
    );

    let end_reason = loop {
        // --- Check shutdown (before tick) ---
        if *shutdown.borrow() {
            info!("Shutdown requested");
            break EndReason::ShutdownRequested;
        }

        // --- Check time limit (before tick) ---
        if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
            info!(
                max_seconds = bounds.max_real_time_seconds,
                elapsed_ms = started.elapsed().as_millis(),
                "Real-time limit reached"
            );
            break EndReason::MaxRealTimeReached;
        }

        // --- Execute tick ---
        let summary = world.step()?;
        total_ticks = total_ticks.saturating_add(1);
        let tick = summary.tick;
        last_summary = Some(summary);

        // --- Check tick limit (after tick) ---
        if bounds.max_ticks > 0 && tick >= bounds.max_ticks {
            info!(tick, max_ticks = bounds.max_ticks, "Tick limit reached");
            break EndReason::MaxTicksReached;
        }

        // --- Wait for the next tick or a shutdown signal ---
        if tick_interval_ms > 0 {
            // A closed channel disables the second branch.
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(tick_interval_ms)) => {}
                Ok(()) = shutdown.changed() => {}
            }
        } else {
            tokio::task::yield_now().await;
        }
    };

    Ok(SimulationResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
        started_at,
        finished_at: Utc::now(),
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        duration_ms = result
            .finished_at
            .signed_duration_since(result.started_at)
            .num_milliseconds(),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            alive = summary.alive,
            dead = summary.dead,
            pool_total = summary.pool_total,
            pool_created = summary.pool_created,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use elfsim_core::SimulationConfig;

    use super::*;

    fn bounds(max_ticks: u64, max_real_time_seconds: u64) -> SimulationBoundsConfig {
        SimulationBoundsConfig {
            max_ticks,
            max_real_time_seconds,
        }
    }

    fn world() -> World {
        World::from_config(&SimulationConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut world = world();
        let (_tx, rx) = watch::channel(false);

        let result = run_simulation(&mut world, &bounds(5, 0), 0, rx).await.unwrap();

        assert_eq!(result.end_reason, EndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.unwrap().tick, 5);
        assert!(result.finished_at >= result.started_at);
    }

    #[tokio::test]
    async fn shutdown_before_first_tick() {
        let mut world = world();
        let (_tx, rx) = watch::channel(true);

        let result = run_simulation(&mut world, &bounds(0, 0), 0, rx).await.unwrap();

        assert_eq!(result.end_reason, EndReason::ShutdownRequested);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn shutdown_interrupts_running_loop() {
        let mut world = world();
        let (tx, rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            tx.send(true).unwrap();
        });
        let result = run_simulation(&mut world, &bounds(0, 0), 5, rx).await.unwrap();
        stopper.await.unwrap();

        assert_eq!(result.end_reason, EndReason::ShutdownRequested);
        assert!(result.total_ticks > 0);
    }

    #[tokio::test]
    async fn bounded_by_real_time() {
        let mut world = world();
        let (_tx, rx) = watch::channel(false);

        let result = run_simulation(&mut world, &bounds(0, 1), 50, rx).await.unwrap();

        assert_eq!(result.end_reason, EndReason::MaxRealTimeReached);
        assert!(result.total_ticks > 0);
    }

    #[tokio::test]
    async fn result_serializes_to_json() {
        let mut world = world();
        let (_tx, rx) = watch::channel(false);
        let result = run_simulation(&mut world, &bounds(2, 0), 0, rx).await.unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json.get("end_reason"), Some(&serde_json::json!("max_ticks_reached")));
        assert_eq!(json.get("total_ticks"), Some(&serde_json::json!(2)));
    }
}
