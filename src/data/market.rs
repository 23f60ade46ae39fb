use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use super::{validation, DataError, DataResult, Fundamentals, PricePoint};
use crate::config::MarketConfig;

/// Chart API response structures (Yahoo Finance v8)
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    result: Option<Vec<ChartResult>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// quoteSummary response structures (Yahoo Finance v10)
#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    result: Option<Vec<QuoteSummaryResult>>,
    #[allow(dead_code)]
    error: Option<ProviderError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteSummaryResult {
    #[serde(rename = "summaryDetail")]
    summary_detail: SummaryDetail,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: KeyStatistics,
    #[serde(rename = "assetProfile")]
    asset_profile: AssetProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: RawValue,
    #[serde(rename = "forwardPE")]
    forward_pe: RawValue,
    #[serde(rename = "marketCap")]
    market_cap: RawValue,
    beta: RawValue,
    #[serde(rename = "dividendYield")]
    dividend_yield: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KeyStatistics {
    #[serde(rename = "trailingEps")]
    trailing_eps: RawValue,
    #[serde(rename = "priceToBook")]
    price_to_book: RawValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

/// Provider numbers arrive wrapped as {"raw": 24.5, "fmt": "24.50"};
/// only the raw value is kept.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

pub struct MarketDataClient {
    client: reqwest::Client,
    config: MarketConfig,
}

impl MarketDataClient {
    pub fn new(config: MarketConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("marketbrief/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Fetch daily OHLCV bars for a symbol over [start, end], inclusive.
    /// An empty range is fatal; partial rows with missing price fields
    /// are dropped during parsing.
    pub async fn fetch_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DataResult<Vec<PricePoint>> {
        validation::validate_symbol(symbol)?;
        validation::validate_date_range(start, end)?;

        info!("Fetching OHLCV data for {} ({} to {})", symbol, start, end);

        let period1 = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DataError::parse_error("invalid start date"))?
            .and_utc()
            .timestamp();
        // Inclusive end: the provider treats period2 as exclusive
        let period2 = (end + chrono::Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DataError::parse_error("invalid end date"))?
            .and_utc()
            .timestamp();

        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.config.base_url,
            urlencoding::encode(symbol),
            period1,
            period2
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Api {
                status_code,
                message: format!("chart request failed: {}", error_text),
            });
        }

        let envelope: ChartEnvelope = response.json().await?;

        if let Some(err) = envelope.chart.error {
            return Err(DataError::Internal(format!(
                "provider error for {}: {}: {}",
                symbol, err.code, err.description
            )));
        }

        let result = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| DataError::NoData {
                symbol: symbol.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            })?;

        let points = collect_points(result);

        if points.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        info!("Fetched {} daily bars for {}", points.len(), symbol);
        Ok(points)
    }

    /// Fetch the fundamentals snapshot. Every metric is individually
    /// optional; a symbol with no summary data yields the empty snapshot
    /// rather than an error.
    pub async fn fetch_fundamentals(&self, symbol: &str) -> DataResult<Fundamentals> {
        validation::validate_symbol(symbol)?;

        info!("Fetching fundamentals for {}", symbol);

        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=summaryDetail%2CdefaultKeyStatistics%2CassetProfile",
            self.config.base_url,
            urlencoding::encode(symbol)
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Api {
                status_code,
                message: format!("quoteSummary request failed: {}", error_text),
            });
        }

        let envelope: QuoteSummaryEnvelope = response.json().await?;

        let Some(result) = envelope
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        else {
            warn!("No fundamentals returned for {}", symbol);
            return Ok(Fundamentals::default());
        };

        Ok(Fundamentals {
            pe_ratio: result.summary_detail.trailing_pe.raw,
            forward_pe: result.summary_detail.forward_pe.raw,
            eps: result.key_statistics.trailing_eps.raw,
            market_cap: result.summary_detail.market_cap.raw,
            beta: result.summary_detail.beta.raw,
            pb_ratio: result.key_statistics.price_to_book.raw,
            dividend_yield: result.summary_detail.dividend_yield.raw,
            sector: result.asset_profile.sector,
            industry: result.asset_profile.industry,
        })
    }
}

/// Convert a chart result into price points. Rows missing any price
/// field are dropped here so every PricePoint carries plain scalars.
fn collect_points(result: ChartResult) -> Vec<PricePoint> {
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let (Some(open), Some(high), Some(low), Some(close)) = (
            quote.open.get(i).copied().flatten(),
            quote.high.get(i).copied().flatten(),
            quote.low.get(i).copied().flatten(),
            quote.close.get(i).copied().flatten(),
        ) else {
            continue;
        };

        points.push(PricePoint {
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_points_drops_rows_with_missing_prices() {
        let payload = serde_json::json!({
            "timestamp": [1704153600i64, 1704240000i64, 1704326400i64],
            "indicators": {
                "quote": [{
                    "open":   [100.0, null, 102.0],
                    "high":   [101.0, 102.0, 103.0],
                    "low":    [99.0, 100.0, 101.0],
                    "close":  [100.5, 101.5, 102.5],
                    "volume": [1000i64, 2000i64, null]
                }]
            }
        });
        let result: ChartResult = serde_json::from_value(payload).expect("valid payload");
        let points = collect_points(result);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 100.5);
        // Missing volume defaults to zero, missing prices drop the row
        assert_eq!(points[1].close, 102.5);
        assert_eq!(points[1].volume, 0);
    }

    #[test]
    fn test_collect_points_empty_quote() {
        let payload = serde_json::json!({
            "timestamp": [1704153600i64],
            "indicators": { "quote": [] }
        });
        let result: ChartResult = serde_json::from_value(payload).expect("valid payload");
        assert!(collect_points(result).is_empty());
    }

    #[test]
    fn test_quote_summary_parsing_with_partial_fields() {
        let payload = serde_json::json!({
            "quoteSummary": {
                "result": [{
                    "summaryDetail": {
                        "trailingPE": {"raw": 24.5, "fmt": "24.50"},
                        "beta": {}
                    },
                    "assetProfile": {"sector": "Technology"}
                }],
                "error": null
            }
        });
        let envelope: QuoteSummaryEnvelope =
            serde_json::from_value(payload).expect("valid payload");
        let result = envelope
            .quote_summary
            .result
            .and_then(|mut r| r.drain(..).next())
            .expect("one result");

        assert_eq!(result.summary_detail.trailing_pe.raw, Some(24.5));
        assert_eq!(result.summary_detail.beta.raw, None);
        assert_eq!(result.asset_profile.sector.as_deref(), Some("Technology"));
        assert_eq!(result.key_statistics.trailing_eps.raw, None);
    }
}
