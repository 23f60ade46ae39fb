//! Price chart artifact: close price with 20/50-day moving average overlays

use plotters::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use super::{RenderError, RenderResult};
use crate::config::OutputConfig;
use crate::data::{IndicatorSet, PricePoint};

const CHART_SIZE: (u32, u32) = (1000, 500);
const CLOSE_COLOR: RGBColor = RGBColor(31, 119, 180);
const MA20_COLOR: RGBColor = RGBColor(255, 127, 14);
const MA50_COLOR: RGBColor = RGBColor(44, 160, 44);

pub struct ChartRenderer {
    config: OutputConfig,
}

impl ChartRenderer {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Render the price chart to `{raw_data_dir}/{symbol}_chart.png`.
    /// The path is symbol-derived, so repeated runs for the same symbol
    /// overwrite the previous artifact.
    pub fn render(
        &self,
        prices: &[PricePoint],
        indicators: &IndicatorSet,
        symbol: &str,
    ) -> RenderResult<PathBuf> {
        if prices.is_empty() {
            return Err(RenderError::Chart("no price points to plot".to_string()));
        }

        fs::create_dir_all(&self.config.raw_data_dir)?;
        let path = self
            .config
            .raw_data_dir
            .join(format!("{}_chart.png", symbol));

        let first_date = prices[0].date;
        let last_date = prices[prices.len() - 1].date;

        let mut min_price = f64::INFINITY;
        let mut max_price = f64::NEG_INFINITY;
        for point in prices {
            min_price = min_price.min(point.close);
            max_price = max_price.max(point.close);
        }
        for value in indicators.ma20.iter().chain(indicators.ma50.iter()).flatten() {
            min_price = min_price.min(*value);
            max_price = max_price.max(*value);
        }
        let pad = ((max_price - min_price) * 0.05).max(1e-6);
        let y_range = (min_price - pad)..(max_price + pad);

        {
            let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| RenderError::Chart(e.to_string()))?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!("{} Price with Moving Averages", symbol),
                    ("sans-serif", 24),
                )
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(first_date..last_date, y_range)
                .map_err(|e| RenderError::Chart(e.to_string()))?;

            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Price")
                .x_labels(8)
                .draw()
                .map_err(|e| RenderError::Chart(e.to_string()))?;

            chart
                .draw_series(LineSeries::new(
                    prices.iter().map(|p| (p.date, p.close)),
                    &CLOSE_COLOR,
                ))
                .map_err(|e| RenderError::Chart(e.to_string()))?
                .label("Close Price")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], CLOSE_COLOR));

            chart
                .draw_series(LineSeries::new(
                    prices
                        .iter()
                        .zip(indicators.ma20.iter())
                        .filter_map(|(p, ma)| ma.map(|v| (p.date, v))),
                    &MA20_COLOR,
                ))
                .map_err(|e| RenderError::Chart(e.to_string()))?
                .label("20-Day MA")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MA20_COLOR));

            chart
                .draw_series(LineSeries::new(
                    prices
                        .iter()
                        .zip(indicators.ma50.iter())
                        .filter_map(|(p, ma)| ma.map(|v| (p.date, v))),
                    &MA50_COLOR,
                ))
                .map_err(|e| RenderError::Chart(e.to_string()))?
                .label("50-Day MA")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MA50_COLOR));

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(|e| RenderError::Chart(e.to_string()))?;

            root.present()
                .map_err(|e| RenderError::Chart(e.to_string()))?;
        }

        info!("Chart saved at {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::compute_indicators;
    use chrono::NaiveDate;

    fn make_prices(n: usize) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64).sin() * 5.0 + i as f64 * 0.1;
                PricePoint {
                    date: start + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000,
                }
            })
            .collect()
    }

    #[test]
    fn test_empty_prices_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = ChartRenderer::new(OutputConfig {
            raw_data_dir: dir.path().to_path_buf(),
            reports_dir: dir.path().to_path_buf(),
            font_dir: "fonts".into(),
            font_family: "LiberationSans".to_string(),
        });
        let ind = compute_indicators(&[]);
        assert!(renderer.render(&[], &ind, "TEST").is_err());
    }

    #[test]
    #[ignore] // Requires system fonts for text rendering
    fn test_chart_file_created_and_overwritten() {
        let dir = tempfile::tempdir().expect("tempdir");
        let renderer = ChartRenderer::new(OutputConfig {
            raw_data_dir: dir.path().to_path_buf(),
            reports_dir: dir.path().to_path_buf(),
            font_dir: "fonts".into(),
            font_family: "LiberationSans".to_string(),
        });

        let prices = make_prices(60);
        let ind = compute_indicators(&prices);

        let path = renderer.render(&prices, &ind, "TEST").expect("chart render");
        assert!(path.exists());
        let first_len = std::fs::metadata(&path).expect("metadata").len();
        assert!(first_len > 0);

        // Re-render for the same symbol lands on the same path
        let path2 = renderer.render(&prices, &ind, "TEST").expect("chart render");
        assert_eq!(path, path2);
    }
}
