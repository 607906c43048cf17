//! Property-based integration tests for the simulated market.
//!
//! These tests drive the public API with random seeds and tick counts and
//! check the window and change-figure guarantees after every cycle.

use std::ops::Range;

use chrono::{DateTime, Duration, TimeZone, Utc};
use marketmind_market_data::constants::{SEED_VOLUME_RANGE, TICK_VOLUME_RANGE};
use marketmind_market_data::{
    DataPoint, Instrument, InstrumentSeed, MarketSimulator, PriceGenerator, SimulatorConfig,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// =============================================================================
// Helpers
// =============================================================================

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap()
}

fn simulator(seed: u64, config: SimulatorConfig) -> MarketSimulator<StdRng> {
    MarketSimulator::with_rng_at(config, StdRng::seed_from_u64(seed), start()).unwrap()
}

fn has_two_decimals(price: f64) -> bool {
    ((price * 100.0).round() - price * 100.0).abs() < 1e-6
}

fn assert_point_shape(point: &DataPoint, volumes: &Range<u64>) {
    assert!(has_two_decimals(point.price), "price {} not in cents", point.price);
    assert!(point.price >= 0.01);
    assert!(
        volumes.contains(&point.volume),
        "volume {} outside {:?}",
        point.volume,
        volumes
    );
    assert_eq!(point.timestamp.len(), 5);
}

fn assert_change_matches_window(instrument: &Instrument) {
    let first = instrument.first_point().price;
    let latest = instrument.latest_point().price;
    assert_eq!(instrument.current_price(), latest);
    assert!((instrument.absolute_change() - (latest - first)).abs() < 1e-9);
    assert!(
        (instrument.percent_change() - instrument.absolute_change() / first * 100.0).abs() < 1e-9,
        "{} percent change {} does not match window",
        instrument.symbol(),
        instrument.percent_change()
    );
}

/// Generates a seed list of 1..6 instruments with distinct symbols.
fn arb_seeds() -> impl Strategy<Value = Vec<InstrumentSeed>> {
    proptest::collection::vec(1.0f64..2_000.0, 1..6).prop_map(|prices| {
        prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| InstrumentSeed::new(&format!("SYM{}", i), "Test Corp.", price))
            .collect()
    })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Window length never changes and every point keeps its shape.
    #[test]
    fn prop_window_length_is_stable(
        seed in any::<u64>(),
        history_len in 1usize..80,
        ticks in 0usize..60,
        seeds in arb_seeds(),
    ) {
        let config = SimulatorConfig {
            seeds,
            history_len,
            ..SimulatorConfig::default()
        };
        let mut sim = simulator(seed, config);
        for instrument in sim.watchlist().iter() {
            for point in instrument.window() {
                assert_point_shape(point, &SEED_VOLUME_RANGE);
            }
        }

        for step in 0..ticks {
            let before = sim.snapshot();
            sim.advance_at(start() + Duration::seconds(2 * (step as i64 + 1))).unwrap();
            for (old, new) in before.instruments.iter().zip(sim.watchlist().iter()) {
                prop_assert_eq!(new.window_len(), history_len);
                // Only instruments picked this cycle gain a point.
                if old.window() != new.window() {
                    assert_point_shape(new.latest_point(), &TICK_VOLUME_RANGE);
                }
            }
        }
    }

    /// Change figures are always measured against the window's first point.
    #[test]
    fn prop_change_matches_window(seed in any::<u64>(), ticks in 0usize..40) {
        let mut sim = simulator(seed, SimulatorConfig::default());
        for instrument in sim.watchlist().iter() {
            assert_change_matches_window(instrument);
        }

        for step in 0..ticks {
            sim.advance_at(start() + Duration::seconds(step as i64 + 1)).unwrap();
            for instrument in sim.watchlist().iter() {
                assert_change_matches_window(instrument);
            }
        }
    }

    /// A ticking instrument evicts exactly its oldest point.
    #[test]
    fn prop_tick_evicts_oldest(seed in any::<u64>()) {
        let mut sim = simulator(seed, SimulatorConfig {
            selection_probability: 1.0,
            ..SimulatorConfig::default()
        });
        let before = sim.snapshot();
        sim.advance_at(start() + Duration::minutes(1)).unwrap();

        for (old, new) in before.instruments.iter().zip(sim.watchlist().iter()) {
            let shifted: Vec<&DataPoint> = old.window().iter().skip(1).collect();
            let kept: Vec<&DataPoint> = new.window().iter().take(old.window_len() - 1).collect();
            prop_assert_eq!(shifted, kept);
            prop_assert_eq!(new.latest_point().timestamp.as_str(), "15:01");
        }
    }

    /// A seeded history drifts at most 0.5% per step from the base price.
    #[test]
    fn prop_seeded_history_stays_in_band(seed in any::<u64>()) {
        let points = PriceGenerator::default()
            .seed_history(&mut StdRng::seed_from_u64(seed), 175.50, 50, 15, start())
            .unwrap();

        let lower = 175.50 * 0.995f64.powi(50) - 0.01;
        let upper = 175.50 * 1.005f64.powi(50) + 0.01;
        for point in &points {
            prop_assert!(point.price >= lower && point.price <= upper);
            prop_assert!(SEED_VOLUME_RANGE.contains(&point.volume));
        }
    }

    /// The same seed and clock reproduce the same market.
    #[test]
    fn prop_seeded_runs_are_reproducible(seed in any::<u64>(), ticks in 1usize..20) {
        let mut a = simulator(seed, SimulatorConfig::default());
        let mut b = simulator(seed, SimulatorConfig::default());
        for step in 0..ticks {
            let at = start() + Duration::seconds(step as i64 + 1);
            a.advance_at(at).unwrap();
            b.advance_at(at).unwrap();
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}

#[test]
fn seeded_labels_step_back_from_now() {
    let sim = simulator(1, SimulatorConfig::default());
    let aapl = sim.instrument("AAPL").unwrap();
    assert_eq!(aapl.first_point().timestamp, "02:30");
    assert_eq!(aapl.latest_point().timestamp, "14:45");
}
