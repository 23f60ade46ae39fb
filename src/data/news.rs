use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use super::{sentiment, DataError, DataResult, NewsItem};
use crate::config::NewsConfig;

const PRIMARY_SOURCE: &str = "newsapi";
const FALLBACK_SOURCE: &str = "google-news-rss";

/// NewsAPI response structures
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    articles: Option<Vec<NewsApiArticle>>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(default)]
    source: NewsApiSource,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// News aggregator with a keyed search API as the primary source and a
/// keyless feed as the fallback. Source ordering is preserved as given;
/// items are never re-sorted.
pub struct NewsAggregator {
    client: reqwest::Client,
    config: NewsConfig,
}

impl NewsAggregator {
    pub fn new(config: NewsConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("marketbrief/0.1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self { client, config }
    }

    /// Fetch up to `max_items` news items for the query, attaching a
    /// per-item sentiment score. Two-step strategy: the keyed primary
    /// runs first (when a key is configured); on an eligible failure the
    /// keyless feed runs; if both fail the error aggregates both causes.
    pub async fn gather(&self, query: &str, max_items: usize) -> DataResult<Vec<NewsItem>> {
        info!("Fetching news for: {}", query);

        let primary_outcome = match &self.config.api_key {
            Some(key) => self.fetch_newsapi(query, max_items, key).await,
            None => Err(DataError::Config(
                "NEWSAPI_KEY not configured".to_string(),
            )),
        };

        let primary_cause = match primary_outcome {
            Ok(items) => {
                info!("Fetched {} news items from {}", items.len(), PRIMARY_SOURCE);
                return Ok(items);
            }
            Err(e) if e.is_fallback_eligible() => {
                warn!("{} failed: {}, trying {}", PRIMARY_SOURCE, e, FALLBACK_SOURCE);
                e
            }
            Err(e) => return Err(e),
        };

        match self.fetch_feed(query, max_items).await {
            Ok(items) => {
                info!("Fetched {} news items from {}", items.len(), FALLBACK_SOURCE);
                Ok(items)
            }
            Err(fallback_cause) => Err(DataError::SourcesExhausted {
                primary_source: PRIMARY_SOURCE,
                primary_cause: Box::new(primary_cause),
                fallback_source: FALLBACK_SOURCE,
                fallback_cause: Box::new(fallback_cause),
            }),
        }
    }

    /// Keyed search API. Carries the one explicitly enforced per-request
    /// timeout in the system.
    async fn fetch_newsapi(
        &self,
        query: &str,
        max_items: usize,
        api_key: &str,
    ) -> DataResult<Vec<NewsItem>> {
        let url = format!(
            "{}/v2/everything?q={}&pageSize={}&sortBy=relevancy&language=en&apiKey={}",
            self.config.base_url,
            urlencoding::encode(query),
            max_items,
            api_key
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::Api {
                status_code: status,
                message: format!("NewsAPI error: {}", error_text),
            });
        }

        let payload: NewsApiResponse = response.json().await?;

        if payload.status != "ok" {
            return Err(DataError::parse_error(format!(
                "NewsAPI returned status '{}'",
                payload.status
            )));
        }

        let articles = payload
            .articles
            .ok_or_else(|| DataError::parse_error("No articles array in response"))?;

        let items = articles
            .into_iter()
            .take(max_items)
            .map(|a| {
                let title = a.title.unwrap_or_else(|| "No title".to_string());
                let description = a.description;
                let text = match &description {
                    Some(d) => format!("{} {}", title, d),
                    None => title.clone(),
                };
                NewsItem {
                    sentiment: sentiment::score_text(&text),
                    title,
                    url: a.url.unwrap_or_default(),
                    source: a.source.name.unwrap_or_else(|| "Unknown".to_string()),
                    description,
                    published_at: a.published_at,
                }
            })
            .collect();

        Ok(items)
    }

    /// Keyless feed fallback (Google News RSS search)
    async fn fetch_feed(&self, query: &str, max_items: usize) -> DataResult<Vec<NewsItem>> {
        let url = format!(
            "{}/rss/search?q={}&hl=en-US&gl=US&ceid=US:en",
            self.config.feed_base_url,
            urlencoding::encode(query)
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(DataError::Api {
                status_code: status,
                message: "feed request failed".to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let channel = rss::Channel::read_from(&bytes[..])?;

        Ok(feed_items(&channel, max_items))
    }
}

/// Convert feed entries into news items, in feed order, capped at
/// `max_items`.
fn feed_items(channel: &rss::Channel, max_items: usize) -> Vec<NewsItem> {
    channel
        .items()
        .iter()
        .take(max_items)
        .map(|entry| {
            let title = entry.title().unwrap_or("No title").to_string();
            let description = entry.description().map(strip_html);
            let text = match &description {
                Some(d) => format!("{} {}", title, d),
                None => title.clone(),
            };
            NewsItem {
                sentiment: sentiment::score_text(&text),
                title,
                url: entry.link().unwrap_or_default().to_string(),
                source: entry
                    .source()
                    .and_then(|s| s.title())
                    .unwrap_or("Google News")
                    .to_string(),
                description,
                published_at: entry.pub_date().map(String::from),
            }
        })
        .collect()
}

/// Some feeds embed HTML in summaries; strip tags and unescape the
/// common entities before sentiment scoring.
fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}
