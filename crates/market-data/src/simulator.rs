//! Market simulator: owns the watchlist and applies simulation cycles.
//!
//! The simulator is the only writer of watchlist state. It does not keep
//! time itself; a driver loop (or a test) decides when to call
//! [`MarketSimulator::advance`].

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{
    default_seeds, DEFAULT_HISTORY_LEN, DEFAULT_INTERVAL_MINUTES, DEFAULT_SELECTION_PROBABILITY,
};
use crate::errors::MarketDataError;
use crate::generator::{GeneratorConfig, PriceGenerator};
use crate::models::{Instrument, InstrumentSeed, MarketSummary};
use crate::watchlist::{validate_probability, Watchlist};

/// Configuration for a simulated market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatorConfig {
    pub seeds: Vec<InstrumentSeed>,
    /// Points kept per instrument window
    pub history_len: usize,
    /// Spacing of seeded history points
    pub interval_minutes: u32,
    /// Per-cycle chance that an instrument ticks
    pub selection_probability: f64,
    pub generator: GeneratorConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seeds: default_seeds(),
            history_len: DEFAULT_HISTORY_LEN,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            selection_probability: DEFAULT_SELECTION_PROBABILITY,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Read-only copy of the watchlist handed to presentation code.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistSnapshot {
    /// Number of cycles applied since seeding
    pub tick: u64,
    pub as_of: DateTime<Utc>,
    pub instruments: Vec<Instrument>,
}

/// Simulated market over an injectable entropy source.
pub struct MarketSimulator<R = StdRng> {
    config: SimulatorConfig,
    generator: PriceGenerator,
    rng: R,
    watchlist: Watchlist,
    tick_count: u64,
    as_of: DateTime<Utc>,
}

impl MarketSimulator<StdRng> {
    /// Create a simulator seeded from OS entropy.
    pub fn new(config: SimulatorConfig) -> Result<Self, MarketDataError> {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> MarketSimulator<R> {
    pub fn with_rng(config: SimulatorConfig, rng: R) -> Result<Self, MarketDataError> {
        Self::with_rng_at(config, rng, Utc::now())
    }

    /// Create a simulator whose history ends at `now`.
    pub fn with_rng_at(
        config: SimulatorConfig,
        mut rng: R,
        now: DateTime<Utc>,
    ) -> Result<Self, MarketDataError> {
        validate_probability(config.selection_probability)?;
        let generator = PriceGenerator::new(config.generator.clone())?;
        let watchlist = Watchlist::initialize(
            &generator,
            &mut rng,
            &config.seeds,
            config.history_len,
            config.interval_minutes,
            now,
        )?;

        info!(
            "Market simulator ready: {} instruments, {}-point windows",
            watchlist.len(),
            config.history_len
        );

        Ok(Self {
            config,
            generator,
            rng,
            watchlist,
            tick_count: 0,
            as_of: now,
        })
    }

    /// Apply one simulation cycle stamped with the current time.
    pub fn advance(&mut self) -> Result<&Watchlist, MarketDataError> {
        self.advance_at(Utc::now())
    }

    /// Apply one simulation cycle stamped with `now`.
    pub fn advance_at(&mut self, now: DateTime<Utc>) -> Result<&Watchlist, MarketDataError> {
        let next = self.watchlist.advance(
            &self.generator,
            &mut self.rng,
            self.config.selection_probability,
            now,
        )?;
        let moved = next
            .iter()
            .zip(self.watchlist.iter())
            .filter(|(after, before)| after != before)
            .count();

        self.watchlist = next;
        self.tick_count += 1;
        self.as_of = now;

        debug!(
            "Simulation tick {}: {}/{} instruments moved",
            self.tick_count,
            moved,
            self.watchlist.len()
        );
        Ok(&self.watchlist)
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn snapshot(&self) -> WatchlistSnapshot {
        WatchlistSnapshot {
            tick: self.tick_count,
            as_of: self.as_of,
            instruments: self.watchlist.instruments().to_vec(),
        }
    }

    pub fn instrument(&self, symbol: &str) -> Option<&Instrument> {
        self.watchlist.get(symbol)
    }

    pub fn summary(&self) -> MarketSummary {
        self.watchlist.summary()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap()
    }

    fn simulator(seed: u64) -> MarketSimulator<StdRng> {
        MarketSimulator::with_rng_at(
            SimulatorConfig::default(),
            StdRng::seed_from_u64(seed),
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_seeds_default_watchlist() {
        let sim = simulator(1);
        assert_eq!(sim.watchlist().len(), 8);
        assert_eq!(sim.tick_count(), 0);
        assert!(sim.instrument("TSLA").is_some());
        assert!(sim.instrument("IBM").is_none());
    }

    #[test]
    fn test_advance_bumps_tick_and_keeps_windows() {
        let mut sim = simulator(2);
        for step in 1..=25 {
            let at = now() + Duration::seconds(2 * step);
            sim.advance_at(at).unwrap();
        }
        assert_eq!(sim.tick_count(), 25);
        assert!(sim.watchlist().iter().all(|i| i.window_len() == 50));

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.tick, 25);
        assert_eq!(snapshot.as_of, now() + Duration::seconds(50));
        assert_eq!(snapshot.instruments.len(), 8);
    }

    #[test]
    fn test_same_seed_same_market() {
        let mut a = simulator(77);
        let mut b = simulator(77);
        for step in 1..=10 {
            let at = now() + Duration::seconds(step);
            a.advance_at(at).unwrap();
            b.advance_at(at).unwrap();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = SimulatorConfig {
            selection_probability: 2.0,
            ..SimulatorConfig::default()
        };
        let result = MarketSimulator::with_rng(config, StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(MarketDataError::InvalidParameter {
                field: "selection_probability",
                ..
            })
        ));

        let config = SimulatorConfig {
            history_len: 0,
            ..SimulatorConfig::default()
        };
        assert!(MarketSimulator::with_rng(config, StdRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut sim = simulator(3);
        let before = sim.snapshot();
        let config = sim.config().clone();
        assert_eq!(config.selection_probability, 0.7);

        for step in 1..=5 {
            sim.advance_at(now() + Duration::seconds(step)).unwrap();
        }
        assert_eq!(before.tick, 0);
        assert_ne!(before.tick, sim.snapshot().tick);
    }
}
