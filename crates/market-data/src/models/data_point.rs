use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used for point labels (24-hour clock, minutes precision).
pub const TIME_LABEL_FORMAT: &str = "%H:%M";

/// A single simulated price observation.
///
/// Points are never mutated after creation; ticks replace the window
/// contents instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    /// Wall-clock label of the observation (e.g. "14:30")
    pub timestamp: String,

    /// Price rounded to 2 decimals
    pub price: f64,

    /// Traded volume for the interval
    pub volume: u64,
}

impl DataPoint {
    /// Create a point labelled with the given instant.
    pub fn new(at: DateTime<Utc>, price: f64, volume: u64) -> Self {
        Self {
            timestamp: time_label(at),
            price,
            volume,
        }
    }
}

/// Render the label shown for a point taken at `at`.
pub fn time_label(at: DateTime<Utc>) -> String {
    at.format(TIME_LABEL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_point_label() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 42).unwrap();
        let point = DataPoint::new(at, 175.5, 1200);
        assert_eq!(point.timestamp, "09:05");
        assert_eq!(point.price, 175.5);
        assert_eq!(point.volume, 1200);
    }

    #[test]
    fn test_point_serializes_camel_case() {
        let point = DataPoint {
            timestamp: "10:15".to_string(),
            price: 12.34,
            volume: 99,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["timestamp"], "10:15");
        assert_eq!(json["price"], 12.34);
        assert_eq!(json["volume"], 99);
    }
}
