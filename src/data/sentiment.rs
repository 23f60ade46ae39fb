//! Lexicon-based sentiment scoring and aggregation
//! Pure functions, no I/O

use serde::{Deserialize, Serialize};

use super::NewsItem;

/// Sentiment-bearing keywords (simple lexicon approach)
const POSITIVE_WORDS: &[&str] = &[
    "gain", "gains", "surge", "surges", "rally", "rallies", "jump", "jumps", "rise", "rises",
    "bull", "bullish", "strong", "positive", "growth", "profit", "profits", "beat", "beats",
    "upgrade", "upgraded", "record", "expands", "expansion", "outperform", "breakout", "soar",
    "soars", "win", "wins",
];

const NEGATIVE_WORDS: &[&str] = &[
    "fall", "falls", "drop", "drops", "crash", "crashes", "decline", "declines", "bear",
    "bearish", "weak", "negative", "loss", "losses", "concern", "concerns", "miss", "misses",
    "downgrade", "downgraded", "plunge", "plunges", "slump", "slumps", "lawsuit", "probe",
    "layoff", "layoffs", "warning", "cuts", "slowdown",
];

/// Sentiment classification label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Deterministic labeling under fixed thresholds:
    /// polarity > 0.1 is positive, < -0.1 is negative, else neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.1 {
            SentimentLabel::Positive
        } else if polarity < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Per-text sentiment score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentScore {
    /// -1.0 (negative tone) .. 1.0 (positive tone)
    pub polarity: f64,
    /// 0.0 (objective) .. 1.0 (subjective)
    pub subjectivity: f64,
    pub label: SentimentLabel,
}

impl SentimentScore {
    pub fn neutral() -> Self {
        Self {
            polarity: 0.0,
            subjectivity: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// Aggregate sentiment over a list of news items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentSummary {
    pub count: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub avg_polarity: f64,
}

impl SentimentSummary {
    pub fn empty() -> Self {
        Self {
            count: 0,
            positive: 0,
            negative: 0,
            neutral: 0,
            avg_polarity: 0.0,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Score a piece of text by counting sentiment-bearing words.
/// Polarity is the signed fraction of matched words; subjectivity is the
/// fraction of words that carried sentiment at all. Empty text scores
/// neutral with zero polarity.
pub fn score_text(text: &str) -> SentimentScore {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if tokens.is_empty() {
        return SentimentScore::neutral();
    }

    let mut positive = 0usize;
    let mut negative = 0usize;
    for token in &tokens {
        if POSITIVE_WORDS.contains(&token.as_str()) {
            positive += 1;
        }
        if NEGATIVE_WORDS.contains(&token.as_str()) {
            negative += 1;
        }
    }

    let matched = positive + negative;
    if matched == 0 {
        return SentimentScore::neutral();
    }

    let polarity = round4((positive as f64 - negative as f64) / matched as f64);
    let subjectivity = round4((matched as f64 / tokens.len() as f64).min(1.0));

    SentimentScore {
        polarity,
        subjectivity,
        label: SentimentLabel::from_polarity(polarity),
    }
}

/// Reduce a list of news items into aggregate counts and average polarity.
/// Total over any input; an empty list yields the all-zero summary.
pub fn summarize(items: &[NewsItem]) -> SentimentSummary {
    if items.is_empty() {
        return SentimentSummary::empty();
    }

    let mut positive = 0usize;
    let mut negative = 0usize;
    let mut neutral = 0usize;
    let mut total_polarity = 0.0;

    for item in items {
        total_polarity += item.sentiment.polarity;
        match item.sentiment.label {
            SentimentLabel::Positive => positive += 1,
            SentimentLabel::Negative => negative += 1,
            SentimentLabel::Neutral => neutral += 1,
        }
    }

    SentimentSummary {
        count: items.len(),
        positive,
        negative,
        neutral,
        avg_polarity: round4(total_polarity / items.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_polarity(polarity: f64) -> NewsItem {
        NewsItem {
            title: "t".to_string(),
            url: "https://example.com".to_string(),
            source: "test".to_string(),
            description: None,
            published_at: None,
            sentiment: SentimentScore {
                polarity,
                subjectivity: 0.0,
                label: SentimentLabel::from_polarity(polarity),
            },
        }
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_polarity(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.1), SentimentLabel::Neutral);
        assert_eq!(
            SentimentLabel::from_polarity(0.1000001),
            SentimentLabel::Positive
        );
        assert_eq!(
            SentimentLabel::from_polarity(-0.1000001),
            SentimentLabel::Negative
        );
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn test_score_empty_text_is_neutral() {
        let score = score_text("");
        assert_eq!(score.polarity, 0.0);
        assert_eq!(score.subjectivity, 0.0);
        assert_eq!(score.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_score_directions() {
        let up = score_text("Shares surge on record profit growth");
        assert!(up.polarity > 0.1);
        assert_eq!(up.label, SentimentLabel::Positive);

        let down = score_text("Stock plunges after earnings miss and layoffs");
        assert!(down.polarity < -0.1);
        assert_eq!(down.label, SentimentLabel::Negative);

        let flat = score_text("Company schedules annual shareholder meeting");
        assert_eq!(flat.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), SentimentSummary::empty());
    }

    #[test]
    fn test_summarize_counts_partition() {
        let items = vec![
            item_with_polarity(0.8),
            item_with_polarity(-0.6),
            item_with_polarity(0.0),
            item_with_polarity(0.3),
        ];
        let summary = summarize(&items);
        assert_eq!(summary.count, items.len());
        assert_eq!(
            summary.positive + summary.negative + summary.neutral,
            summary.count
        );
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.avg_polarity, 0.125);
    }

    #[test]
    fn test_avg_polarity_rounds_to_four_places() {
        let items = vec![
            item_with_polarity(0.1),
            item_with_polarity(0.1),
            item_with_polarity(0.1),
        ];
        let summary = summarize(&items);
        assert_eq!(summary.avg_polarity, 0.1);
    }
}
