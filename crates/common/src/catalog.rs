//! Static description of the tracked commodity set: per-commodity metadata,
//! the last-known-good fallback table, and the canned news feed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NewsItem;

/// Which response shape the quote API returns for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteShape {
    GlobalQuote,
    DailySeries,
    ExchangeRate,
}

/// Live quote API parameters; absent for commodities without a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveEndpoint {
    pub symbol: String,
    pub shape: QuoteShape,
}

/// Compiled-in description of one tracked commodity. Currency and unit are
/// fixed per commodity, not user-configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityMeta {
    pub id: String,
    pub name: String,
    pub name_de: String,
    pub currency: String,
    pub unit: String,
    pub icon: String,
    pub live: Option<LiveEndpoint>,
}

/// Last-known-good values for one commodity
#[derive(Debug, Clone, Copy)]
pub struct MockEntry {
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// The set of commodities one aggregation cycle covers, in display order
#[derive(Debug, Clone, Default)]
pub struct CommodityCatalog {
    entries: Vec<CommodityMeta>,
}

fn meta(
    id: &str,
    name: &str,
    name_de: &str,
    currency: &str,
    unit: &str,
    icon: &str,
    live: Option<LiveEndpoint>,
) -> CommodityMeta {
    CommodityMeta {
        id: id.to_string(),
        name: name.to_string(),
        name_de: name_de.to_string(),
        currency: currency.to_string(),
        unit: unit.to_string(),
        icon: icon.to_string(),
        live,
    }
}

fn listed(symbol: &str, shape: QuoteShape) -> Option<LiveEndpoint> {
    Some(LiveEndpoint {
        symbol: symbol.to_string(),
        shape,
    })
}

impl CommodityCatalog {
    pub fn new(entries: Vec<CommodityMeta>) -> Self {
        Self { entries }
    }

    /// The fixed dashboard set. Butter has no live listing and always
    /// closes the list.
    pub fn default_tracked() -> Self {
        Self::new(vec![
            meta(
                "coffee",
                "Coffee",
                "Kaffeepreise",
                "USD",
                "lb",
                "☕",
                listed("KC=F", QuoteShape::GlobalQuote),
            ),
            meta(
                "sugar",
                "Sugar",
                "Zuckerernte",
                "USD",
                "ton",
                "🍭",
                listed("SB=F", QuoteShape::GlobalQuote),
            ),
            meta(
                "cocoa",
                "Cocoa",
                "Kakaopreise",
                "USD",
                "ton",
                "🍫",
                listed("CC=F", QuoteShape::DailySeries),
            ),
            meta(
                "wheat",
                "Wheat",
                "Weizenpreise",
                "USD",
                "bushel",
                "🌾",
                listed("ZW=F", QuoteShape::DailySeries),
            ),
            meta("butter", "Butter", "Butterbörse", "EUR", "kg", "🧈", None),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&CommodityMeta> {
        self.entries.iter().find(|m| m.id == id)
    }

    pub fn entries(&self) -> &[CommodityMeta] {
        &self.entries
    }
}

/// Fallback values used when no live source succeeds. Identifiers outside
/// the table get a neutral 100 / 0 quote.
pub fn last_known_good(id: &str) -> MockEntry {
    match id {
        "coffee" => MockEntry {
            price: 1.85,
            change: 0.03,
            change_percent: 1.6,
        },
        "sugar" => MockEntry {
            price: 620.0,
            change: 15.0,
            change_percent: 2.5,
        },
        "cocoa" => MockEntry {
            price: 2890.0,
            change: -45.0,
            change_percent: -1.5,
        },
        "wheat" => MockEntry {
            price: 585.0,
            change: 4.5,
            change_percent: 0.8,
        },
        "butter" => MockEntry {
            price: 6.85,
            change: 0.12,
            change_percent: 1.8,
        },
        _ => MockEntry {
            price: 100.0,
            change: 0.0,
            change_percent: 0.0,
        },
    }
}

/// Canned market blurbs per commodity; timestamps are offsets from `now`,
/// newest first.
pub fn static_news(id: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
    match id {
        "coffee" => vec![
            NewsItem {
                id: "coffee-news-1".to_string(),
                title: "Kaffeepreise aus aktueller Marktanalyse".to_string(),
                summary: "Live-Daten von finanzen.net zeigen aktuelle Marktentwicklung"
                    .to_string(),
                timestamp: now - Duration::minutes(30),
                source: "finanzen.net".to_string(),
            },
            NewsItem {
                id: "coffee-news-2".to_string(),
                title: "Rohkaffee-Futures zeigen Volatilität".to_string(),
                summary: "Schwankende Preise aufgrund internationaler Handelsbedingungen"
                    .to_string(),
                timestamp: now - Duration::hours(2),
                source: "Commodities Tracker".to_string(),
            },
        ],
        _ => Vec::new(),
    }
}
