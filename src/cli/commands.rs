//! CLI command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::config::Config;
use crate::data::{
    compute_indicators, extract_kpis, sentiment, KpiSnapshot, MarketDataClient, NewsAggregator,
    NewsItem, SentimentSummary,
};
use crate::orchestrator::{Pipeline, PipelineOutput, PipelineResult};

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "unavailable".to_string(),
    }
}

/// Run the full pipeline and print the produced analysis
pub async fn analyze(
    mut config: Config,
    symbol: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    max_articles: Option<usize>,
) -> Result<()> {
    if let Some(max) = max_articles {
        config.news.max_items = max;
    }

    let pipeline = Pipeline::new(&config);
    match pipeline.run(&symbol, start_date, end_date).await {
        PipelineResult::Success(output) => {
            display_output(&symbol, &output);
            Ok(())
        }
        PipelineResult::Failure { error } => {
            eprintln!("\n❌ ERROR: {}", error);
            bail!("pipeline failed: {}", error)
        }
    }
}

/// Fetch news and print the per-item sentiment plus the aggregate digest
pub async fn news(config: Config, query: String, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(config.news.max_items);
    let aggregator = NewsAggregator::new(config.news);
    let items = aggregator.gather(&query, limit).await?;
    let summary = sentiment::summarize(&items);

    println!("\n📰 NEWS & SENTIMENT: {}", query);
    println!("========================");
    display_news(&items);
    display_sentiment(&summary);
    Ok(())
}

/// Fetch price history and print the KPI snapshot
pub async fn fetch(
    config: Config,
    symbol: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<()> {
    let client = MarketDataClient::new(config.market);
    let prices = client.fetch_prices(&symbol, start_date, end_date).await?;
    let indicators = compute_indicators(&prices);
    let kpis = extract_kpis(&prices, &indicators);

    println!("\n📊 PRICE HISTORY: {}", symbol);
    println!("========================");
    println!("Trading days: {}", prices.len());
    display_kpis(&kpis);
    Ok(())
}

/// Fetch and print the fundamentals snapshot
pub async fn fundamentals(config: Config, symbol: String) -> Result<()> {
    let client = MarketDataClient::new(config.market);
    let fundamentals = client.fetch_fundamentals(&symbol).await?;

    println!("\n📉 FUNDAMENTALS: {}", symbol);
    println!("========================");
    if fundamentals.is_empty() {
        println!("No fundamentals available for this symbol.");
        return Ok(());
    }
    println!("P/E Ratio:      {}", fmt_opt(fundamentals.pe_ratio));
    println!("Forward P/E:    {}", fmt_opt(fundamentals.forward_pe));
    println!("EPS:            {}", fmt_opt(fundamentals.eps));
    println!("Market Cap:     {}", fmt_opt(fundamentals.market_cap));
    println!("Beta:           {}", fmt_opt(fundamentals.beta));
    println!("P/B Ratio:      {}", fmt_opt(fundamentals.pb_ratio));
    println!("Dividend Yield: {}", fmt_opt(fundamentals.dividend_yield));
    println!("Sector:         {}", fundamentals.sector.as_deref().unwrap_or("unavailable"));
    println!("Industry:       {}", fundamentals.industry.as_deref().unwrap_or("unavailable"));
    Ok(())
}

fn display_kpis(kpis: &KpiSnapshot) {
    println!("\n📊 KEY PERFORMANCE INDICATORS");
    println!("Current Price: {}", fmt_opt(kpis.current_price));
    println!("Day High:      {}", fmt_opt(kpis.day_high));
    println!("Day Low:       {}", fmt_opt(kpis.day_low));
    println!("MA20:          {}", fmt_opt(kpis.ma20));
    println!("MA50:          {}", fmt_opt(kpis.ma50));
    println!("Volatility:    {}", fmt_opt(kpis.volatility));
}

fn display_news(items: &[NewsItem]) {
    if items.is_empty() {
        println!("No recent news found.");
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("\n{}. {} [{}]", i + 1, item.title, item.sentiment.label);
        println!("   {}", item.url);
    }
}

fn display_sentiment(summary: &SentimentSummary) {
    println!("\n🧠 SENTIMENT SUMMARY");
    println!(
        "{} items: {} positive / {} negative / {} neutral, avg polarity {}",
        summary.count, summary.positive, summary.negative, summary.neutral, summary.avg_polarity
    );
}

fn display_output(symbol: &str, output: &PipelineOutput) {
    println!("\n🎉 ANALYSIS COMPLETE: {}", symbol);
    println!("{}", "=".repeat(50));

    display_kpis(&output.kpis);

    if !output.fundamentals.is_empty() {
        println!("\n📉 FUNDAMENTALS");
        println!("P/E: {}  EPS: {}  Beta: {}",
            fmt_opt(output.fundamentals.pe_ratio),
            fmt_opt(output.fundamentals.eps),
            fmt_opt(output.fundamentals.beta));
        if let Some(sector) = output.fundamentals.sector.as_deref() {
            println!("Sector: {}", sector);
        }
    }

    println!("\n📰 NEWS");
    display_news(&output.news_items);
    display_sentiment(&output.sentiment_summary);

    println!("\n📝 REPORT");
    println!("{}", output.report_text);

    println!("\n📄 ARTIFACTS");
    println!("Chart: {}", output.chart_path.display());
    println!("PDF:   {}", output.pdf_path.display());
    println!("\n{}", "=".repeat(50));
}
