//! Report composer: structured prompt assembly and narrative generation
//! The prompt embeds only caller-supplied data; the generator is
//! forbidden from inventing facts not present in it

use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::data::{DataResult, Fundamentals, KpiSnapshot, NewsItem, SentimentSummary};
use crate::llm::CompletionClient;

const SYSTEM_PROMPT: &str = "You are a senior financial analyst.";

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}", v),
        None => "unavailable".to_string(),
    }
}

/// Prompt template builder for report generation
pub struct ReportPrompts;

impl ReportPrompts {
    /// Render each news item as ordinal, title, sentiment label, and
    /// link, in the aggregator's given order.
    pub fn news_section(news_items: &[NewsItem]) -> String {
        news_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                format!(
                    "{}. {} — sentiment: {}\n   {}",
                    i + 1,
                    item.title,
                    item.sentiment.label,
                    item.url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn kpi_section(kpis: &KpiSnapshot) -> String {
        format!(
            "current_price: {}\nday_high: {}\nday_low: {}\nma20: {}\nma50: {}\nvolatility: {}",
            fmt_metric(kpis.current_price),
            fmt_metric(kpis.day_high),
            fmt_metric(kpis.day_low),
            fmt_metric(kpis.ma20),
            fmt_metric(kpis.ma50),
            fmt_metric(kpis.volatility),
        )
    }

    fn fundamentals_section(fundamentals: &Fundamentals) -> String {
        format!(
            "pe_ratio: {}\nforward_pe: {}\neps: {}\nmarket_cap: {}\nbeta: {}\npb_ratio: {}\ndividend_yield: {}\nsector: {}\nindustry: {}",
            fmt_metric(fundamentals.pe_ratio),
            fmt_metric(fundamentals.forward_pe),
            fmt_metric(fundamentals.eps),
            fmt_metric(fundamentals.market_cap),
            fmt_metric(fundamentals.beta),
            fmt_metric(fundamentals.pb_ratio),
            fmt_metric(fundamentals.dividend_yield),
            fundamentals.sector.as_deref().unwrap_or("unavailable"),
            fundamentals.industry.as_deref().unwrap_or("unavailable"),
        )
    }

    fn sentiment_section(summary: &SentimentSummary) -> String {
        format!(
            "count: {}\npositive: {}\nnegative: {}\nneutral: {}\navg_polarity: {}",
            summary.count, summary.positive, summary.negative, summary.neutral, summary.avg_polarity
        )
    }

    /// Fixed ordered outline. The fundamentals section appears only when
    /// a fundamentals snapshot carries any data, shifting the numbering
    /// of the sections after it.
    pub fn outline(with_fundamentals: bool) -> String {
        let mut sections = vec![
            "Executive Summary",
            "Price Performance Overview",
            "Key Indicators (KPIs)",
            "Market Sentiment Analysis",
        ];
        if with_fundamentals {
            sections.push("Fundamental Indicators");
        }
        sections.extend(["Recent News Highlights", "Risks and Opportunities", "Final Recommendation"]);

        sections
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the full analysis prompt from already-computed inputs.
    /// No external lookups happen here.
    #[allow(clippy::too_many_arguments)]
    pub fn analysis_prompt(
        symbol: &str,
        kpis: &KpiSnapshot,
        fundamentals: &Fundamentals,
        news_items: &[NewsItem],
        sentiment_summary: &SentimentSummary,
        chart_path: &Path,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> String {
        let with_fundamentals = !fundamentals.is_empty();

        let fundamentals_block = if with_fundamentals {
            format!(
                "\n### Fundamentals:\n{}\n",
                Self::fundamentals_section(fundamentals)
            )
        } else {
            String::new()
        };

        format!(
            r#"Write a highly structured, professional financial analysis report for **{symbol}**.
Date Range: {start_date} → {end_date}

Use this exact outline:

{outline}

### KPIs:
{kpis}
{fundamentals_block}
### Market Sentiment Summary:
{sentiment}

### Recent News:
{news}

### Chart File Path:
{chart_path}

RULES:
- Use ONLY the provided information. Do NOT invent numbers.
- Tone should match professional equity research reports.
- Keep the content concise, factual, and structured.
- Never hallucinate events or data not included above.
"#,
            symbol = symbol,
            start_date = start_date,
            end_date = end_date,
            outline = Self::outline(with_fundamentals),
            kpis = Self::kpi_section(kpis),
            fundamentals_block = fundamentals_block,
            sentiment = Self::sentiment_section(sentiment_summary),
            news = Self::news_section(news_items),
            chart_path = chart_path.display(),
        )
    }
}

/// Composes the narrative report by delegating generation to the
/// completion client and returning its output verbatim.
pub struct ReportComposer {
    client: CompletionClient,
}

impl ReportComposer {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn compose(
        &self,
        symbol: &str,
        kpis: &KpiSnapshot,
        fundamentals: &Fundamentals,
        news_items: &[NewsItem],
        sentiment_summary: &SentimentSummary,
        chart_path: &Path,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DataResult<String> {
        let prompt = ReportPrompts::analysis_prompt(
            symbol,
            kpis,
            fundamentals,
            news_items,
            sentiment_summary,
            chart_path,
            start_date,
            end_date,
        );

        info!("Composing report for {} ({} news items)", symbol, news_items.len());
        self.client.complete(SYSTEM_PROMPT, &prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SentimentLabel, SentimentScore};
    use std::path::PathBuf;

    fn sample_item(title: &str, polarity: f64) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            url: format!("https://example.com/{}", title.len()),
            source: "test".to_string(),
            description: None,
            published_at: None,
            sentiment: SentimentScore {
                polarity,
                subjectivity: 0.5,
                label: SentimentLabel::from_polarity(polarity),
            },
        }
    }

    fn sample_kpis() -> KpiSnapshot {
        KpiSnapshot {
            current_price: Some(4000.0),
            day_high: Some(4050.0),
            day_low: Some(3950.0),
            ma20: Some(4020.0),
            ma50: None,
            volatility: Some(0.02),
        }
    }

    #[test]
    fn test_outline_numbering_without_fundamentals() {
        let outline = ReportPrompts::outline(false);
        assert!(outline.contains("1. Executive Summary"));
        assert!(outline.contains("5. Recent News Highlights"));
        assert!(outline.contains("7. Final Recommendation"));
        assert!(!outline.contains("Fundamental Indicators"));
    }

    #[test]
    fn test_outline_numbering_with_fundamentals() {
        let outline = ReportPrompts::outline(true);
        assert!(outline.contains("5. Fundamental Indicators"));
        assert!(outline.contains("6. Recent News Highlights"));
        assert!(outline.contains("8. Final Recommendation"));
    }

    #[test]
    fn test_news_section_order_and_shape() {
        let items = vec![
            sample_item("Profits surge", 0.8),
            sample_item("Probe launched", -0.5),
        ];
        let section = ReportPrompts::news_section(&items);
        let lines: Vec<&str> = section.lines().collect();
        assert!(lines[0].starts_with("1. Profits surge — sentiment: positive"));
        assert!(lines[2].starts_with("2. Probe launched — sentiment: negative"));
    }

    #[test]
    fn test_prompt_marks_unavailable_fields() {
        let prompt = ReportPrompts::analysis_prompt(
            "TCS.NS",
            &sample_kpis(),
            &Fundamentals::default(),
            &[sample_item("Steady quarter", 0.0)],
            &SentimentSummary::empty(),
            &PathBuf::from("data/raw/TCS.NS_chart.png"),
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
        );

        assert!(prompt.contains("ma50: unavailable"));
        assert!(prompt.contains("Do NOT invent numbers"));
        assert!(prompt.contains("data/raw/TCS.NS_chart.png"));
        // Empty fundamentals leave no fundamentals section behind
        assert!(!prompt.contains("### Fundamentals:"));
        assert!(prompt.contains("7. Final Recommendation"));
    }

    #[test]
    fn test_prompt_includes_fundamentals_when_present() {
        let fundamentals = Fundamentals {
            pe_ratio: Some(24.5),
            sector: Some("Technology".to_string()),
            ..Fundamentals::default()
        };
        let prompt = ReportPrompts::analysis_prompt(
            "AAPL",
            &sample_kpis(),
            &fundamentals,
            &[],
            &SentimentSummary::empty(),
            &PathBuf::from("data/raw/AAPL_chart.png"),
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"),
        );

        assert!(prompt.contains("### Fundamentals:"));
        assert!(prompt.contains("pe_ratio: 24.5"));
        assert!(prompt.contains("eps: unavailable"));
        assert!(prompt.contains("8. Final Recommendation"));
    }
}
