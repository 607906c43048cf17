//! Background market ticker.
//!
//! Drives the simulator at the configured cadence for as long as the server
//! runs.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the background market ticker.
pub fn start_market_ticker(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Market ticker started ({} ms interval)",
            state.tick_interval.as_millis()
        );

        let mut ticker = interval(state.tick_interval);
        // A slow cycle must not cause a burst of catch-up ticks.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // First tick completes immediately; the seeded history is already current.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            run_tick(&state);
        }
    })
}

/// Runs a single simulation cycle.
fn run_tick(state: &AppState) {
    match state.advance_market() {
        Ok(snapshot) => debug!("Market tick {} applied", snapshot.tick),
        Err(e) => warn!("Market tick failed: {}", e),
    }
}
