//! Watchlist store: the set of tracked instruments.
//!
//! A [`Watchlist`] is a value. Advancing it yields a new watchlist and
//! leaves the previous one untouched, so readers can keep a snapshot while
//! the simulation moves on.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::generator::PriceGenerator;
use crate::models::{normalize_symbol, Instrument, InstrumentSeed, MarketSummary};

/// Ordered collection of instruments, keyed by symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    instruments: Vec<Instrument>,
}

impl Watchlist {
    /// Seed one instrument per entry, in seed order.
    pub fn initialize<R: Rng + ?Sized>(
        generator: &PriceGenerator,
        rng: &mut R,
        seeds: &[InstrumentSeed],
        history_len: usize,
        interval_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, MarketDataError> {
        let mut seen = HashSet::with_capacity(seeds.len());
        for seed in seeds {
            let symbol = normalize_symbol(&seed.symbol)?;
            if !seen.insert(symbol.clone()) {
                return Err(MarketDataError::DuplicateSymbol(symbol));
            }
        }

        let mut instruments = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let history = generator.seed_history(
                rng,
                seed.base_price,
                history_len,
                interval_minutes,
                now,
            )?;
            instruments.push(Instrument::from_window(
                &seed.symbol,
                &seed.display_name,
                history,
            )?);
        }

        debug!(
            "Seeded watchlist with {} instruments ({} points each)",
            instruments.len(),
            history_len
        );
        Ok(Self { instruments })
    }

    /// Run one simulation cycle.
    ///
    /// Each instrument draws one uniform number; it ticks when the draw falls
    /// below `selection_probability` and is carried over unchanged otherwise.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        generator: &PriceGenerator,
        rng: &mut R,
        selection_probability: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, MarketDataError> {
        validate_probability(selection_probability)?;

        let instruments = self
            .instruments
            .iter()
            .map(|instrument| {
                let draw: f64 = rng.gen();
                if draw < selection_probability {
                    generator.tick(rng, instrument, now)
                } else {
                    instrument.clone()
                }
            })
            .collect();

        Ok(Self { instruments })
    }

    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        let wanted = symbol.trim();
        self.instruments
            .iter()
            .find(|i| i.symbol().eq_ignore_ascii_case(wanted))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.instruments.iter().map(|i| i.symbol()).collect()
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn summary(&self) -> MarketSummary {
        MarketSummary::from_instruments(&self.instruments)
    }

    /// Symbol-keyed view of the watchlist.
    pub fn to_map(&self) -> BTreeMap<String, Instrument> {
        self.instruments
            .iter()
            .map(|i| (i.symbol().to_string(), i.clone()))
            .collect()
    }
}

pub fn validate_probability(probability: f64) -> Result<(), MarketDataError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(MarketDataError::invalid(
            "selection_probability",
            format!("must be within [0, 1], got {}", probability),
        ));
    }
    Ok(())
}
