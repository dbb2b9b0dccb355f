use crate::error::{AppError, Result};
use crate::models::{BarInterval, MarketData, Ohlcv};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Log fetch progress every this many tickers
const PROGRESS_EVERY: usize = 50;

#[derive(Debug)]
pub enum YahooError {
    Http(reqwest::Error),
    Serialization(serde_json::Error),
    InvalidResponse(String),
    NoData,
}

impl From<reqwest::Error> for YahooError {
    fn from(error: reqwest::Error) -> Self {
        YahooError::Http(error)
    }
}

impl From<serde_json::Error> for YahooError {
    fn from(error: serde_json::Error) -> Self {
        YahooError::Serialization(error)
    }
}

impl std::fmt::Display for YahooError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YahooError::Http(e) => write!(f, "HTTP error: {}", e),
            YahooError::Serialization(e) => write!(f, "Serialization error: {}", e),
            YahooError::InvalidResponse(s) => write!(f, "Invalid response: {}", s),
            YahooError::NoData => write!(f, "No data available"),
        }
    }
}

impl std::error::Error for YahooError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            YahooError::Http(e) => Some(e),
            YahooError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<YahooError> for AppError {
    fn from(error: YahooError) -> Self {
        match error {
            YahooError::Http(e) => AppError::Network(e.to_string()),
            YahooError::Serialization(e) => AppError::Parse(e.to_string()),
            YahooError::InvalidResponse(s) => AppError::Parse(s),
            YahooError::NoData => AppError::NotFound("No data available".to_string()),
        }
    }
}

/// Anything that can produce a candle series for a ticker
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch an ascending OHLCV series
    ///
    /// # Arguments
    /// * `ticker` - Symbol with exchange suffix (e.g. "BBCA.JK")
    /// * `period` - Lookback window (e.g. "120d")
    /// * `interval` - Bar size
    async fn fetch(&self, ticker: &str, period: &str, interval: BarInterval) -> Result<Vec<Ohlcv>>;
}

/// Yahoo Finance v8 chart API client
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    /// Create a client with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(YAHOO_CHART_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_chart(
        &self,
        ticker: &str,
        period: &str,
        interval: BarInterval,
    ) -> std::result::Result<Vec<Ohlcv>, YahooError> {
        let url = format!("{}/{}", self.base_url, ticker);
        debug!("Fetching chart: url={}, range={}, interval={}", url, period, interval.to_yahoo_format());

        let response = self
            .client
            .get(&url)
            .query(&[("range", period), ("interval", interval.to_yahoo_format())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(YahooError::InvalidResponse(format!(
                "status {} for {}",
                status, ticker
            )));
        }

        let chart: ChartResponse = serde_json::from_str(&body)?;
        parse_chart(chart)
    }
}

#[async_trait]
impl CandleSource for YahooClient {
    async fn fetch(&self, ticker: &str, period: &str, interval: BarInterval) -> Result<Vec<Ohlcv>> {
        Ok(self.get_chart(ticker, period, interval).await?)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Convert a chart payload into candles, dropping rows with any missing field
fn parse_chart(chart: ChartResponse) -> std::result::Result<Vec<Ohlcv>, YahooError> {
    if let Some(err) = chart.chart.error {
        return Err(YahooError::InvalidResponse(format!(
            "{}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        )));
    }

    let result = chart
        .chart
        .result
        .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
        .ok_or(YahooError::NoData)?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut candles = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let field = |column: &Vec<Option<f64>>| column.get(i).copied().flatten();
        let (open, high, low, close, volume) = match (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        ) {
            (Some(o), Some(h), Some(l), Some(c), Some(v)) => (o, h, l, c, v),
            _ => continue,
        };

        let time = match DateTime::<Utc>::from_timestamp(*ts, 0) {
            Some(time) => time,
            None => continue,
        };

        candles.push(Ohlcv::new(time, open, high, low, close, volume.max(0.0) as u64));
    }

    if candles.is_empty() {
        return Err(YahooError::NoData);
    }
    Ok(candles)
}

/// Fetch many tickers sequentially with a fixed delay between requests
///
/// Failed or empty symbols are logged and left out of the returned map.
pub async fn fetch_multiple<S: CandleSource + ?Sized>(
    source: &S,
    tickers: &[String],
    period: &str,
    interval: BarInterval,
    delay: Duration,
) -> MarketData {
    let total = tickers.len();
    let mut results = MarketData::new();

    for (i, ticker) in tickers.iter().enumerate() {
        if (i + 1) % PROGRESS_EVERY == 0 {
            info!("Fetching progress: {}/{}", i + 1, total);
        }

        match source.fetch(ticker, period, interval).await {
            Ok(candles) if !candles.is_empty() => {
                results.insert(ticker.clone(), candles);
            }
            Ok(_) => warn!(ticker = %ticker, "No data"),
            Err(e) => warn!(ticker = %ticker, "Error fetching: {}", e),
        }

        if !delay.is_zero() && i + 1 < total {
            sleep(delay).await;
        }
    }

    info!("Successfully fetched {}/{} stocks", results.len(), total);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "BBCA.JK", "currency": "IDR"},
                "timestamp": [1760580000, 1760666400, 1760752800],
                "indicators": {
                    "quote": [{
                        "open":   [9800.0, 9850.0, 9900.0],
                        "high":   [9900.0, null,   9975.0],
                        "low":    [9750.0, 9800.0, 9875.0],
                        "close":  [9850.0, 9900.0, 9950.0],
                        "volume": [1200000, 900000, 1500000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    struct FakeSource;

    #[async_trait]
    impl CandleSource for FakeSource {
        async fn fetch(&self, ticker: &str, _period: &str, _interval: BarInterval) -> Result<Vec<Ohlcv>> {
            match ticker {
                "GOOD.JK" => Ok(vec![Ohlcv::new(Utc::now(), 1.0, 2.0, 0.5, 1.5, 10)]),
                "EMPTY.JK" => Ok(Vec::new()),
                _ => Err(AppError::Network("connection reset".to_string())),
            }
        }
    }

    #[test]
    fn test_parse_chart_drops_incomplete_rows() {
        let chart: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let candles = parse_chart(chart).unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 9850.0);
        assert_eq!(candles[1].close, 9950.0);
        assert_eq!(candles[1].volume, 1_500_000);
        assert!(candles[0].time < candles[1].time);
    }

    #[test]
    fn test_parse_chart_error_payload() {
        let raw = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let chart: ChartResponse = serde_json::from_str(raw).unwrap();
        let err = parse_chart(chart).unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_parse_chart_empty_result() {
        let raw = r#"{"chart": {"result": [], "error": null}}"#;
        let chart: ChartResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(parse_chart(chart), Err(YahooError::NoData)));
    }

    #[tokio::test]
    async fn test_fetch_multiple_skips_failures() {
        let tickers = vec![
            "GOOD.JK".to_string(),
            "EMPTY.JK".to_string(),
            "FAIL.JK".to_string(),
        ];
        let data = fetch_multiple(&FakeSource, &tickers, "120d", BarInterval::Daily, Duration::ZERO).await;

        assert_eq!(data.len(), 1);
        assert!(data.contains_key("GOOD.JK"));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_yahoo_live_fetch() {
        let client = YahooClient::new(Duration::from_secs(30)).unwrap();
        let candles = client.fetch("BBCA.JK", "120d", BarInterval::Daily).await.unwrap();
        assert!(candles.len() > 50);
    }
}
