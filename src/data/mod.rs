//! Data pipeline module for fetching market data, news, and sentiment
//! Provides shared data types, error handling, and validation

pub mod errors;
pub mod indicators;
pub mod market;
pub mod news;
pub mod sentiment;

// Re-export commonly used types
pub use errors::{DataError, DataResult};
pub use indicators::{compute_indicators, extract_kpis, IndicatorSet, KpiSnapshot};
pub use market::MarketDataClient;
pub use news::NewsAggregator;
pub use sentiment::{SentimentLabel, SentimentScore, SentimentSummary};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data. Immutable once fetched; every field is
/// a plain scalar because rows with missing prices are dropped at the
/// provider parsing boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// News article with per-item sentiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub sentiment: SentimentScore,
}

/// Company fundamentals snapshot. Every metric is individually optional;
/// absence of one field never blocks presentation of the others.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub eps: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl Fundamentals {
    /// True when no metric at all came back from the provider.
    pub fn is_empty(&self) -> bool {
        self.pe_ratio.is_none()
            && self.forward_pe.is_none()
            && self.eps.is_none()
            && self.market_cap.is_none()
            && self.beta.is_none()
            && self.pb_ratio.is_none()
            && self.dividend_yield.is_none()
            && self.sector.is_none()
            && self.industry.is_none()
    }
}

/// Validation helpers
pub mod validation {
    use super::*;

    /// Validate a stock symbol. Exchange-suffixed symbols ("TCS.NS") and
    /// index symbols ("^GSPC") are accepted.
    pub fn validate_symbol(symbol: &str) -> DataResult<()> {
        if symbol.is_empty() {
            return Err(DataError::validation_error("symbol", "Symbol cannot be empty"));
        }

        if symbol.len() > 12 {
            return Err(DataError::validation_error("symbol", "Symbol too long (max 12 chars)"));
        }

        if !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'))
        {
            return Err(DataError::validation_error(
                "symbol",
                "Symbol must contain only letters, digits, '.', '-' or '^'",
            ));
        }

        Ok(())
    }

    /// Validate a fetched price point
    pub fn validate_price_point(point: &PricePoint) -> DataResult<()> {
        if point.open <= 0.0 || point.high <= 0.0 || point.low <= 0.0 || point.close <= 0.0 {
            return Err(DataError::validation_error(
                "price",
                "Prices must be positive",
            ));
        }

        if point.volume < 0 {
            return Err(DataError::validation_error("volume", "Volume cannot be negative"));
        }

        if point.high < point.low {
            return Err(DataError::validation_error(
                "high_low",
                "High price cannot be less than low price",
            ));
        }

        Ok(())
    }

    /// Validate that a date range is non-inverted
    pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> DataResult<()> {
        if start > end {
            return Err(DataError::validation_error(
                "date_range",
                "Start date must not be after end date",
            ));
        }
        Ok(())
    }
}
