//! Indicator engine: rolling moving averages, volatility, KPI extraction

use serde::{Deserialize, Serialize};

use super::PricePoint;

/// Trailing window for the short moving average and the volatility window
const MA_SHORT_WINDOW: usize = 20;
/// Trailing window for the long moving average
const MA_LONG_WINDOW: usize = 50;

/// Derived indicator series, aligned index-for-index with the input
/// price sequence. Points where the trailing window is not yet full are
/// `None`, never zero-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub daily_return: Vec<Option<f64>>,
    pub ma20: Vec<Option<f64>>,
    pub ma50: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
}

/// Scalar snapshot of the most recent indicator values plus current
/// price levels. `None` means "unavailable" (insufficient history or
/// missing upstream field), never a default number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub current_price: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub volatility: Option<f64>,
}

impl KpiSnapshot {
    /// Snapshot with every field unavailable, used for empty price input
    pub fn unavailable() -> Self {
        Self {
            current_price: None,
            day_high: None,
            day_low: None,
            ma20: None,
            ma50: None,
            volatility: None,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn trailing_mean(values: &[f64], end: usize, window: usize) -> Option<f64> {
    if end + 1 < window {
        return None;
    }
    let slice = &values[end + 1 - window..=end];
    Some(slice.iter().sum::<f64>() / window as f64)
}

/// Sample standard deviation of the trailing `window` returns ending at
/// `end`. Returns become defined at index 1, so the first full window
/// closes at index `window`.
fn trailing_return_std(returns: &[Option<f64>], end: usize, window: usize) -> Option<f64> {
    if end < window {
        return None;
    }
    let slice = &returns[end + 1 - window..=end];
    let values: Vec<f64> = slice.iter().filter_map(|r| *r).collect();
    if values.len() < window {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Compute daily returns, trailing 20/50-point moving averages of the
/// close, and the trailing 20-point standard deviation of daily returns.
pub fn compute_indicators(prices: &[PricePoint]) -> IndicatorSet {
    let n = prices.len();
    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();

    let mut daily_return = vec![None; n];
    for i in 1..n {
        daily_return[i] = Some((closes[i] - closes[i - 1]) / closes[i - 1]);
    }

    let mut ma20 = vec![None; n];
    let mut ma50 = vec![None; n];
    let mut volatility = vec![None; n];
    for i in 0..n {
        ma20[i] = trailing_mean(&closes, i, MA_SHORT_WINDOW);
        ma50[i] = trailing_mean(&closes, i, MA_LONG_WINDOW);
        volatility[i] = trailing_return_std(&daily_return, i, MA_SHORT_WINDOW);
    }

    IndicatorSet {
        daily_return,
        ma20,
        ma50,
        volatility,
    }
}

/// Extract the latest indicator values and price levels as plain
/// scalars. An empty price sequence yields an all-unavailable snapshot.
pub fn extract_kpis(prices: &[PricePoint], indicators: &IndicatorSet) -> KpiSnapshot {
    let Some(latest) = prices.last() else {
        return KpiSnapshot::unavailable();
    };
    let last = prices.len() - 1;

    KpiSnapshot {
        current_price: Some(round2(latest.close)),
        day_high: Some(round2(latest.high)),
        day_low: Some(round2(latest.low)),
        ma20: indicators.ma20.get(last).copied().flatten().map(round2),
        ma50: indicators.ma50.get(last).copied().flatten().map(round2),
        volatility: indicators
            .volatility
            .get(last)
            .copied()
            .flatten()
            .map(round4),
    }
}
