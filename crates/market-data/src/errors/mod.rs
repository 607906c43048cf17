//! Error types for the market data crate.
//!
//! All errors here are local: they are raised before any state changes and
//! never leave a watchlist or instrument half-updated.

use thiserror::Error;

/// Errors that can occur while generating or advancing simulated market data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// A generator or watchlist input was out of range.
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter {
        /// Name of the offending input
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The symbol is not part of the watchlist.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The same symbol was seeded twice.
    #[error("Duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

impl MarketDataError {
    /// Create a new invalid parameter error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            message: message.into(),
        }
    }

    /// Returns true for errors caused by bad caller input.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}
