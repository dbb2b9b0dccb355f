use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One daily OHLCV (Open, High, Low, Close, Volume) bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Bar open timestamp
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    /// Opening price in IDR
    pub open: f64,

    /// Highest price in IDR
    pub high: f64,

    /// Lowest price in IDR
    pub low: f64,

    /// Closing price in IDR
    pub close: f64,

    /// Traded shares
    pub volume: u64,
}

impl Ohlcv {
    /// Create a new OHLCV bar
    pub fn new(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Turnover (close × volume), the liquidity proxy
    pub fn turnover(&self) -> f64 {
        self.close * self.volume as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turnover() {
        let bar = Ohlcv::new(Utc::now(), 100.0, 110.0, 95.0, 108.0, 1_000);
        assert_eq!(bar.turnover(), 108_000.0);
    }
}
