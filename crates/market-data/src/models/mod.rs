//! Market data models
//!
//! - `data_point` - A single labelled price/volume observation
//! - `instrument` - Tracked instrument with its rolling window, and seed entries
//! - `summary` - Derived window statistics and the watchlist overview

mod data_point;
mod instrument;
mod summary;

pub use data_point::{time_label, DataPoint, TIME_LABEL_FORMAT};
pub use instrument::{normalize_symbol, Instrument, InstrumentSeed};
pub use summary::{MarketSummary, Mover, Sentiment, WindowStats};
