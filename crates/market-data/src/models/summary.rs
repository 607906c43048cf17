use serde::Serialize;

use super::data_point::DataPoint;
use super::instrument::Instrument;

/// Figures derived from an instrument's price window.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    /// Price of the first point in the window
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub latest_volume: u64,
    pub total_volume: u64,
    pub points: usize,
}

impl WindowStats {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a DataPoint>) -> Self {
        let mut stats = Self {
            open: 0.0,
            high: f64::MIN,
            low: f64::MAX,
            latest_volume: 0,
            total_volume: 0,
            points: 0,
        };

        for point in points {
            if stats.points == 0 {
                stats.open = point.price;
            }
            stats.high = stats.high.max(point.price);
            stats.low = stats.low.min(point.price);
            stats.latest_volume = point.volume;
            stats.total_volume = stats.total_volume.saturating_add(point.volume);
            stats.points += 1;
        }

        if stats.points == 0 {
            stats.high = 0.0;
            stats.low = 0.0;
        }
        stats
    }
}

/// Overall direction of the watchlist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// An instrument singled out by the summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub percent_change: f64,
}

/// Dashboard overview of all instruments in a watchlist.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub advancers: usize,
    pub decliners: usize,
    pub unchanged: usize,
    /// advancers / instruments, 0 when empty
    pub advancer_ratio: f64,
    pub sentiment: Sentiment,
    pub top_gainer: Option<Mover>,
    pub top_loser: Option<Mover>,
    /// Sum of the newest point's volume across instruments
    pub total_volume: u64,
}

impl MarketSummary {
    pub fn from_instruments<'a>(instruments: impl IntoIterator<Item = &'a Instrument>) -> Self {
        let mut advancers = 0;
        let mut decliners = 0;
        let mut unchanged = 0;
        let mut total_volume: u64 = 0;
        let mut top_gainer: Option<&Instrument> = None;
        let mut top_loser: Option<&Instrument> = None;

        for instrument in instruments {
            let change = instrument.percent_change();
            if change > 0.0 {
                advancers += 1;
            } else if change < 0.0 {
                decliners += 1;
            } else {
                unchanged += 1;
            }
            total_volume = total_volume.saturating_add(instrument.latest_volume());

            if top_gainer.map_or(true, |best| change > best.percent_change()) {
                top_gainer = Some(instrument);
            }
            if top_loser.map_or(true, |worst| change < worst.percent_change()) {
                top_loser = Some(instrument);
            }
        }

        let count = advancers + decliners + unchanged;
        let sentiment = match advancers.cmp(&decliners) {
            std::cmp::Ordering::Greater => Sentiment::Bullish,
            std::cmp::Ordering::Less => Sentiment::Bearish,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        };
        let to_mover = |instrument: &Instrument| Mover {
            symbol: instrument.symbol().to_string(),
            percent_change: instrument.percent_change(),
        };

        Self {
            advancers,
            decliners,
            unchanged,
            advancer_ratio: if count == 0 {
                0.0
            } else {
                advancers as f64 / count as f64
            },
            sentiment,
            top_gainer: top_gainer.map(to_mover),
            top_loser: top_loser.map(to_mover),
            total_volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instrument(symbol: &str, prices: &[f64]) -> Instrument {
        let points = prices
            .iter()
            .map(|price| DataPoint {
                timestamp: "12:00".to_string(),
                price: *price,
                volume: 100,
            })
            .collect();
        Instrument::from_window(symbol, symbol, points).unwrap()
    }

    #[test]
    fn test_window_stats() {
        let inst = instrument("AAPL", &[10.0, 12.0, 9.5, 11.0]);
        let stats = inst.stats();
        assert_eq!(stats.open, 10.0);
        assert_eq!(stats.high, 12.0);
        assert_eq!(stats.low, 9.5);
        assert_eq!(stats.total_volume, 400);
        assert_eq!(stats.latest_volume, 100);
        assert_eq!(stats.points, 4);
    }

    #[test]
    fn test_window_stats_empty() {
        let stats = WindowStats::from_points(std::iter::empty());
        assert_eq!(stats.points, 0);
        assert_eq!(stats.high, 0.0);
        assert_eq!(stats.low, 0.0);
    }

    #[test]
    fn test_market_summary() {
        let list = vec![
            instrument("AAPL", &[100.0, 104.0]),
            instrument("NVDA", &[100.0, 110.0]),
            instrument("TSLA", &[100.0, 95.0]),
            instrument("AMD", &[100.0, 100.0]),
        ];
        let summary = MarketSummary::from_instruments(&list);

        assert_eq!(summary.advancers, 2);
        assert_eq!(summary.decliners, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.sentiment, Sentiment::Bullish);
        assert!((summary.advancer_ratio - 0.5).abs() < 1e-9);
        assert_eq!(summary.top_gainer.unwrap().symbol, "NVDA");
        assert_eq!(summary.top_loser.unwrap().symbol, "TSLA");
        assert_eq!(summary.total_volume, 400);
    }

    #[test]
    fn test_market_summary_empty_is_neutral() {
        let summary = MarketSummary::from_instruments(std::iter::empty());
        assert_eq!(summary.sentiment, Sentiment::Neutral);
        assert!(summary.top_gainer.is_none());
        assert_eq!(summary.advancer_ratio, 0.0);
    }
}
