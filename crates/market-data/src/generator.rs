//! Random-walk price generator.
//!
//! Every price is derived from the previous one by a bounded multiplicative
//! perturbation:
//!
//! ```text
//! next = prev + prev * volatility * (U - 0.5)    U ~ Uniform[0, 1)
//! ```
//!
//! The generator holds no state of its own. Entropy and the clock are passed
//! in, so a seeded RNG and a fixed instant reproduce the exact same series.

use std::ops::Range;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    MIN_PRICE, SEED_VOLATILITY, SEED_VOLUME_RANGE, TICK_VOLATILITY, TICK_VOLUME_RANGE,
};
use crate::errors::MarketDataError;
use crate::models::{DataPoint, Instrument};

/// Tunables for the random walk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorConfig {
    /// Volatility used when seeding history
    pub seed_volatility: f64,
    /// Volatility used for live ticks
    pub tick_volatility: f64,
    /// Volume range for seeded points (end exclusive)
    pub seed_volume: Range<u64>,
    /// Volume range for live ticks (end exclusive)
    pub tick_volume: Range<u64>,
    /// Prices below this are clamped up to it
    pub min_price: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed_volatility: SEED_VOLATILITY,
            tick_volatility: TICK_VOLATILITY,
            seed_volume: SEED_VOLUME_RANGE,
            tick_volume: TICK_VOLUME_RANGE,
            min_price: MIN_PRICE,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), MarketDataError> {
        for (field, value) in [
            ("seed_volatility", self.seed_volatility),
            ("tick_volatility", self.tick_volatility),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MarketDataError::invalid(
                    field,
                    format!("must be a finite non-negative number, got {}", value),
                ));
            }
        }
        for (field, range) in [
            ("seed_volume", &self.seed_volume),
            ("tick_volume", &self.tick_volume),
        ] {
            if range.is_empty() {
                return Err(MarketDataError::invalid(
                    field,
                    format!("range {}..{} is empty", range.start, range.end),
                ));
            }
        }
        if !self.min_price.is_finite() || self.min_price <= 0.0 {
            return Err(MarketDataError::invalid(
                "min_price",
                format!("must be positive, got {}", self.min_price),
            ));
        }
        Ok(())
    }
}

/// Produces seeded histories and live ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceGenerator {
    config: GeneratorConfig,
}

impl Default for PriceGenerator {
    fn default() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }
}

impl PriceGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, MarketDataError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `count` points ending at `now`, spaced `interval_minutes` apart.
    ///
    /// Point `i` (0-based) is labelled `now - (count - i) * interval`. The walk
    /// itself runs on unrounded prices; each stored point is rounded to cents.
    pub fn seed_history<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        base_price: f64,
        count: usize,
        interval_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<DataPoint>, MarketDataError> {
        if !base_price.is_finite() || base_price <= 0.0 {
            return Err(MarketDataError::invalid(
                "base_price",
                format!("must be positive, got {}", base_price),
            ));
        }
        if count == 0 {
            return Err(MarketDataError::invalid("count", "must be positive"));
        }
        if interval_minutes == 0 {
            return Err(MarketDataError::invalid(
                "interval_minutes",
                "must be positive",
            ));
        }

        let interval = Duration::try_minutes(i64::from(interval_minutes)).ok_or_else(|| {
            MarketDataError::invalid("interval_minutes", "out of range")
        })?;
        // The earliest label bounds every other one.
        label_time(now, interval, count).ok_or_else(|| {
            MarketDataError::invalid(
                "interval_minutes",
                format!(
                    "{} points at {} min reach past the supported date range",
                    count, interval_minutes
                ),
            )
        })?;

        let mut running = base_price;
        let mut points = Vec::with_capacity(count);

        for steps_back in (1..=count).rev() {
            let at = label_time(now, interval, steps_back).unwrap_or(now);
            running = self
                .perturb(rng, running, self.config.seed_volatility)
                .max(self.config.min_price);
            let price = self.finalize_price(running);
            let volume = rng.gen_range(self.config.seed_volume.clone());
            points.push(DataPoint::new(at, price, volume));
        }

        Ok(points)
    }

    /// Produce the next state of `instrument`: one new point from its current
    /// price at tick volatility, the oldest point evicted.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        instrument: &Instrument,
        now: DateTime<Utc>,
    ) -> Instrument {
        let next = self.perturb(rng, instrument.current_price(), self.config.tick_volatility);
        let price = self.finalize_price(next);
        let volume = rng.gen_range(self.config.tick_volume.clone());

        let mut updated = instrument.clone();
        updated.push_point(DataPoint::new(now, price, volume));
        updated
    }

    fn perturb<R: Rng + ?Sized>(&self, rng: &mut R, price: f64, volatility: f64) -> f64 {
        let u: f64 = rng.gen();
        price + price * volatility * (u - 0.5)
    }

    fn finalize_price(&self, raw: f64) -> f64 {
        let rounded = round_price(raw);
        if rounded < self.config.min_price {
            self.config.min_price
        } else {
            rounded
        }
    }
}

/// `now - steps_back * interval`, or `None` when it leaves chrono's range.
fn label_time(now: DateTime<Utc>, interval: Duration, steps_back: usize) -> Option<DateTime<Utc>> {
    let steps = i32::try_from(steps_back).ok()?;
    now.checked_sub_signed(interval.checked_mul(steps)?)
}

/// Round to 2 decimal places.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
