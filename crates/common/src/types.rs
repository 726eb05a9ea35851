use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative price direction derived from the percent change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Switch points are fixed at ±0.1 percent.
    pub fn from_change_percent(change_percent: f64) -> Self {
        if change_percent > 0.1 {
            Trend::Up
        } else if change_percent < -0.1 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Stable => "→",
        }
    }
}

/// A market blurb attached to one commodity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Canonical quote for one commodity at one point in time.
///
/// Quotes are produced fresh on every aggregation cycle and never mutated
/// afterwards; downstream consumers only ever see clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityQuote {
    pub id: String,
    pub name: String,
    pub name_de: String,
    pub price: f64,
    pub currency: String,
    pub change: f64,
    pub change_percent: f64,
    pub unit: String,
    pub last_updated: DateTime<Utc>,
    pub trend: Trend,
    pub icon: String,
    pub news: Vec<NewsItem>,
}

/// A record exactly as one source reported it, before normalization.
///
/// Numeric fields keep the upstream's verbatim text; turning them into
/// numbers is the normalizer's job, so a mangled field from one source
/// cannot abort a whole cycle.
#[derive(Debug, Clone)]
pub struct RawQuote {
    pub commodity_id: String,
    pub source: String,
    pub price: String,
    pub change: Option<String>,
    pub change_percent: Option<String>,
    pub currency: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// One persisted scrape result, as stored by the scraping collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedRow {
    pub id: String,
    pub commodity_id: String,
    pub price: f64,
    pub currency: String,
    pub change_amount: Option<f64>,
    pub change_percent: Option<f64>,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
}
