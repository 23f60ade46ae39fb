use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Process configuration, loaded once at startup and handed to each
/// collaborator as an explicit config struct. Collaborators never read
/// the environment themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    pub news: NewsConfig,
    pub llm: LlmConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub feed_base_url: String,
    pub max_items: usize,
    /// Per-request timeout on the keyed primary source
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Chart images land here, one per symbol, overwritten on each run
    pub raw_data_dir: PathBuf,
    /// PDF reports land here, one per invocation
    pub reports_dir: PathBuf,
    /// Directory holding the TTF font family used for PDF layout
    pub font_dir: PathBuf,
    pub font_family: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        let config = Config {
            market: MarketConfig {
                base_url: env::var("MARKET_BASE_URL")
                    .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
                timeout_seconds: env::var("MARKET_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid MARKET_TIMEOUT_SECONDS value")?,
            },
            news: NewsConfig {
                api_key: env::var("NEWSAPI_KEY").ok(),
                base_url: env::var("NEWSAPI_BASE_URL")
                    .unwrap_or_else(|_| "https://newsapi.org".to_string()),
                feed_base_url: env::var("NEWS_FEED_BASE_URL")
                    .unwrap_or_else(|_| "https://news.google.com".to_string()),
                max_items: env::var("NEWS_MAX_ITEMS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()
                    .context("Invalid NEWS_MAX_ITEMS value")?,
                timeout_seconds: env::var("NEWS_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .context("Invalid NEWS_TIMEOUT_SECONDS value")?,
            },
            llm: LlmConfig {
                api_key: env::var("OPENAI_API_KEY").ok(),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
                temperature: env::var("LLM_TEMPERATURE")
                    .unwrap_or_else(|_| "0.2".to_string())
                    .parse()
                    .context("Invalid LLM_TEMPERATURE value")?,
                max_tokens: env::var("LLM_MAX_TOKENS")
                    .unwrap_or_else(|_| "1500".to_string())
                    .parse()
                    .context("Invalid LLM_MAX_TOKENS value")?,
                timeout_seconds: env::var("LLM_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("Invalid LLM_TIMEOUT_SECONDS value")?,
            },
            output: OutputConfig {
                raw_data_dir: env::var("RAW_DATA_DIR")
                    .unwrap_or_else(|_| "data/raw".to_string())
                    .into(),
                reports_dir: env::var("REPORTS_DIR")
                    .unwrap_or_else(|_| "data/reports".to_string())
                    .into(),
                font_dir: env::var("FONT_DIR")
                    .unwrap_or_else(|_| "fonts".to_string())
                    .into(),
                font_family: env::var("FONT_FAMILY")
                    .unwrap_or_else(|_| "LiberationSans".to_string()),
            },
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            market: MarketConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
                timeout_seconds: 30,
            },
            news: NewsConfig {
                api_key: None,
                base_url: "https://newsapi.org".to_string(),
                feed_base_url: "https://news.google.com".to_string(),
                max_items: 8,
                timeout_seconds: 15,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                temperature: 0.2,
                max_tokens: 1500,
                timeout_seconds: 60,
            },
            output: OutputConfig {
                raw_data_dir: "data/raw".into(),
                reports_dir: "data/reports".into(),
                font_dir: "fonts".into(),
                font_family: "LiberationSans".to_string(),
            },
        }
    }
}
