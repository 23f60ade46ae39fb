//! Pipeline coordinator: runs the four stages in a fixed sequence and
//! converts any stage failure into a uniform error result

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::data::{
    compute_indicators, extract_kpis, sentiment, Fundamentals, KpiSnapshot, MarketDataClient,
    NewsAggregator, NewsItem, SentimentSummary,
};
use crate::llm::CompletionClient;
use crate::render::{ChartRenderer, PdfRenderer};
use crate::report::ReportComposer;

/// Linear stage progression; Failed absorbs from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    FetchingNews,
    ComputingIndicators,
    ComposingReport,
    RenderingDocument,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::FetchingNews => "fetching_news",
            PipelineStage::ComputingIndicators => "computing_indicators",
            PipelineStage::ComposingReport => "composing_report",
            PipelineStage::RenderingDocument => "rendering_document",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

/// Everything a successful run produces
#[derive(Debug, Serialize)]
pub struct PipelineOutput {
    pub kpis: KpiSnapshot,
    pub fundamentals: Fundamentals,
    pub chart_path: PathBuf,
    pub news_items: Vec<NewsItem>,
    pub sentiment_summary: SentimentSummary,
    pub report_text: String,
    pub pdf_path: PathBuf,
}

/// Either a complete output record or a single-field error record,
/// never both and never partially populated.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PipelineResult {
    Success(Box<PipelineOutput>),
    Failure { error: String },
}

/// Coordinates one full run. A fresh instance is created per run and
/// holds no cross-run state.
pub struct Pipeline {
    market: MarketDataClient,
    news: NewsAggregator,
    composer: ReportComposer,
    chart: ChartRenderer,
    pdf: PdfRenderer,
    max_news_items: usize,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        info!(stage = PipelineStage::Idle.as_str(), "Initializing pipeline");

        Self {
            market: MarketDataClient::new(config.market.clone()),
            news: NewsAggregator::new(config.news.clone()),
            composer: ReportComposer::new(CompletionClient::new(config.llm.clone())),
            chart: ChartRenderer::new(config.output.clone()),
            pdf: PdfRenderer::new(config.output.clone()),
            max_news_items: config.news.max_items,
        }
    }

    /// Run the full pipeline. Never returns an Err: any stage failure is
    /// logged with full diagnostic detail and converted into the uniform
    /// failure record. Outputs of stages that completed before the
    /// failure are discarded; artifacts already written to disk stay.
    pub async fn run(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> PipelineResult {
        match self.run_stages(symbol, start, end).await {
            Ok(output) => {
                info!(
                    stage = PipelineStage::Done.as_str(),
                    "Pipeline completed for {}", symbol
                );
                PipelineResult::Success(Box::new(output))
            }
            Err(e) => {
                error!(
                    stage = PipelineStage::Failed.as_str(),
                    error = ?e,
                    "Pipeline failed for {}", symbol
                );
                PipelineResult::Failure {
                    error: format!("{:#}", e),
                }
            }
        }
    }

    async fn run_stages(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PipelineOutput> {
        info!(
            stage = PipelineStage::FetchingNews.as_str(),
            "Fetching news for {}", symbol
        );
        let news_items = self
            .news
            .gather(symbol, self.max_news_items)
            .await
            .context("news retrieval failed")?;
        let sentiment_summary = sentiment::summarize(&news_items);

        info!(
            stage = PipelineStage::ComputingIndicators.as_str(),
            "Fetching price history and computing indicators for {}", symbol
        );
        let prices = self
            .market
            .fetch_prices(symbol, start, end)
            .await
            .context("price history fetch failed")?;
        let indicators = compute_indicators(&prices);
        let kpis = extract_kpis(&prices, &indicators);
        let chart_path = self
            .chart
            .render(&prices, &indicators, symbol)
            .context("chart rendering failed")?;

        // Fundamentals never block the run; a failed fetch degrades to
        // the empty snapshot.
        let fundamentals = match self.market.fetch_fundamentals(symbol).await {
            Ok(f) => f,
            Err(e) => {
                warn!("Fundamentals fetch failed: {}, continuing without", e);
                Fundamentals::default()
            }
        };

        info!(
            stage = PipelineStage::ComposingReport.as_str(),
            "Generating report for {}", symbol
        );
        let report_text = self
            .composer
            .compose(
                symbol,
                &kpis,
                &fundamentals,
                &news_items,
                &sentiment_summary,
                &chart_path,
                start,
                end,
            )
            .await
            .context("report generation failed")?;

        info!(
            stage = PipelineStage::RenderingDocument.as_str(),
            "Rendering PDF for {}", symbol
        );
        let pdf_path = self
            .pdf
            .render(&report_text, &chart_path, symbol)
            .context("document rendering failed")?;

        Ok(PipelineOutput {
            kpis,
            fundamentals,
            chart_path,
            news_items,
            sentiment_summary,
            report_text,
            pdf_path,
        })
    }
}
