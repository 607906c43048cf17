use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::data_point::DataPoint;
use super::summary::WindowStats;
use crate::errors::MarketDataError;

const MAX_SYMBOL_LEN: usize = 15;

/// Seed entry used to create an instrument at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSeed {
    pub symbol: String,
    pub display_name: String,
    pub base_price: f64,
}

impl InstrumentSeed {
    pub fn new(symbol: &str, display_name: &str, base_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            display_name: display_name.to_string(),
            base_price,
        }
    }
}

/// A tracked instrument and its rolling price window.
///
/// The window length is fixed when the instrument is created. Every tick
/// appends exactly one point and evicts the oldest, and the change figures
/// are always measured against the first point still in the window.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    symbol: String,
    display_name: String,
    current_price: f64,
    absolute_change: f64,
    percent_change: f64,
    window: VecDeque<DataPoint>,
}

impl Instrument {
    /// Build an instrument from a non-empty history window.
    pub fn from_window(
        symbol: &str,
        display_name: &str,
        window: Vec<DataPoint>,
    ) -> Result<Self, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;
        if window.is_empty() {
            return Err(MarketDataError::invalid(
                "window",
                "must contain at least one point",
            ));
        }

        let mut instrument = Self {
            symbol,
            display_name: display_name.trim().to_string(),
            current_price: 0.0,
            absolute_change: 0.0,
            percent_change: 0.0,
            window: window.into(),
        };
        instrument.recompute_change();
        Ok(instrument)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Price of the newest point in the window.
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// `current_price - window[0].price`
    pub fn absolute_change(&self) -> f64 {
        self.absolute_change
    }

    /// `absolute_change / window[0].price * 100`
    pub fn percent_change(&self) -> f64 {
        self.percent_change
    }

    pub fn window(&self) -> &VecDeque<DataPoint> {
        &self.window
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn first_point(&self) -> &DataPoint {
        // Non-empty by construction; push_point keeps the length fixed.
        &self.window[0]
    }

    pub fn latest_point(&self) -> &DataPoint {
        &self.window[self.window.len() - 1]
    }

    pub fn latest_volume(&self) -> u64 {
        self.latest_point().volume
    }

    pub fn stats(&self) -> WindowStats {
        WindowStats::from_points(self.window.iter())
    }

    /// Append `point` and evict the oldest one, keeping the window length.
    pub(crate) fn push_point(&mut self, point: DataPoint) {
        self.window.push_back(point);
        self.window.pop_front();
        self.recompute_change();
    }

    fn recompute_change(&mut self) {
        let first = self.first_point().price;
        let latest = self.latest_point().price;
        self.current_price = latest;
        self.absolute_change = latest - first;
        self.percent_change = if first > 0.0 {
            self.absolute_change / first * 100.0
        } else {
            0.0
        };
    }
}

/// Validate a ticker and normalize it to uppercase.
pub fn normalize_symbol(input: &str) -> Result<String, MarketDataError> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(MarketDataError::invalid("symbol", "cannot be empty"));
    }
    if normalized.len() > MAX_SYMBOL_LEN {
        return Err(MarketDataError::invalid(
            "symbol",
            format!("'{}' exceeds {} characters", normalized, MAX_SYMBOL_LEN),
        ));
    }
    if let Some(ch) = normalized
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-'))
    {
        return Err(MarketDataError::invalid(
            "symbol",
            format!("'{}' contains invalid character '{}'", normalized, ch),
        ));
    }
    Ok(normalized)
}
