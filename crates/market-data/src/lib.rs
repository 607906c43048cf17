//! MarketMind Market Data Crate
//!
//! Simulated intraday market for the MarketMind dashboard.
//!
//! # Overview
//!
//! Each tracked instrument carries a fixed-length rolling window of
//! labelled price/volume points. Histories are seeded with a random walk
//! and then advanced one cycle at a time.
//!
//! ```text
//! +------------------+     +------------------+     +------------------+
//! | MarketSimulator  | --> |    Watchlist     | --> |   Instrument     |
//! | (rng, tick count)|     | (seed order)     |     | (rolling window) |
//! +------------------+     +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |  PriceGenerator  |  (seed_history, tick)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceGenerator`] - Random-walk history seeding and per-tick updates
//! - [`Watchlist`] - Ordered instrument collection, advanced as a value
//! - [`MarketSimulator`] - Owns the watchlist, entropy source and tick counter
//! - [`Instrument`] - Symbol, display name, change figures and window
//! - [`MarketSummary`] - Advancers/decliners and sentiment across the watchlist

pub mod constants;
pub mod errors;
pub mod generator;
pub mod models;
pub mod simulator;
pub mod watchlist;

pub use errors::MarketDataError;

pub use models::{
    normalize_symbol, time_label, DataPoint, Instrument, InstrumentSeed, MarketSummary, Mover,
    Sentiment, WindowStats,
};

pub use generator::{round_price, GeneratorConfig, PriceGenerator};
pub use simulator::{MarketSimulator, SimulatorConfig, WatchlistSnapshot};
pub use watchlist::Watchlist;
