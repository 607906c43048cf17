use std::ops::Range;

use crate::models::InstrumentSeed;

/// Number of points kept per instrument window.
pub const DEFAULT_HISTORY_LEN: usize = 50;

/// Spacing between seeded history points.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Wall-clock cadence of the simulation loop.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2_000;

/// Chance that an instrument moves on a given cycle.
pub const DEFAULT_SELECTION_PROBABILITY: f64 = 0.7;

pub const SEED_VOLATILITY: f64 = 0.01;
pub const TICK_VOLATILITY: f64 = 0.002;

pub const SEED_VOLUME_RANGE: Range<u64> = 1_000..11_000;
pub const TICK_VOLUME_RANGE: Range<u64> = 500..5_500;

/// Floor applied to every generated price.
pub const MIN_PRICE: f64 = 0.01;

/// Instruments tracked when no seed list is configured.
pub fn default_seeds() -> Vec<InstrumentSeed> {
    vec![
        InstrumentSeed::new("AAPL", "Apple Inc.", 175.50),
        InstrumentSeed::new("GOOGL", "Alphabet Inc.", 142.80),
        InstrumentSeed::new("NVDA", "NVIDIA Corp.", 850.20),
        InstrumentSeed::new("MSFT", "Microsoft Corp.", 415.10),
        InstrumentSeed::new("TSLA", "Tesla Inc.", 178.90),
        InstrumentSeed::new("AMZN", "Amazon.com Inc.", 174.40),
        InstrumentSeed::new("AMD", "Adv. Micro Devices", 190.50),
        InstrumentSeed::new("META", "Meta Platforms", 495.60),
    ]
}
