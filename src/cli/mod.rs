use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;

pub mod commands;

#[derive(Parser)]
#[command(
    name = "marketbrief",
    about = "Equity research brief pipeline: news, indicators, LLM narrative, PDF report",
    version = "0.1.0",
    author = "jdhiman"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and produce a PDF report
    Analyze {
        /// Symbol to analyze
        #[arg(short, long)]
        symbol: String,

        /// Start of the price history range
        #[arg(long)]
        start_date: NaiveDate,

        /// End of the price history range
        #[arg(long)]
        end_date: NaiveDate,

        /// Cap on fetched news items (overrides NEWS_MAX_ITEMS)
        #[arg(long)]
        max_articles: Option<usize>,
    },

    /// Fetch news for a query and print the sentiment digest
    News {
        /// Search query (ticker or company name)
        #[arg(short, long)]
        query: String,

        /// Cap on fetched news items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Fetch price history and print the KPI snapshot
    Fetch {
        /// Symbol to fetch data for
        #[arg(short, long)]
        symbol: String,

        /// Start of the price history range
        #[arg(long)]
        start_date: NaiveDate,

        /// End of the price history range
        #[arg(long)]
        end_date: NaiveDate,
    },

    /// Fetch the fundamentals snapshot for a symbol
    Fundamentals {
        /// Symbol to fetch fundamentals for
        #[arg(short, long)]
        symbol: String,
    },
}

/// Execute CLI command with loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            symbol,
            start_date,
            end_date,
            max_articles,
        } => {
            info!("Running full analysis for {}", symbol);
            commands::analyze(config, symbol, start_date, end_date, max_articles).await?;
        }
        Commands::News { query, limit } => {
            info!("Fetching news for: {}", query);
            commands::news(config, query, limit).await?;
        }
        Commands::Fetch {
            symbol,
            start_date,
            end_date,
        } => {
            info!("Fetching price history for {}", symbol);
            commands::fetch(config, symbol, start_date, end_date).await?;
        }
        Commands::Fundamentals { symbol } => {
            info!("Fetching fundamentals for {}", symbol);
            commands::fundamentals(config, symbol).await?;
        }
    }
    Ok(())
}
