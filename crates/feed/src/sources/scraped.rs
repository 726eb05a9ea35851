//! Adapter over previously persisted scrape rows: the highest-precedence
//! source in the chain. Reads only; the scraping collaborators own writes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use commodity_common::catalog::CommodityMeta;
use commodity_common::{RawQuote, ScrapedRow, SourceError, SourceResult};

use super::QuoteSource;

const SOURCE_NAME: &str = "scraped-store";
const ROWS_TABLE: &str = "scraped_commodity_prices";

/// Read-only view of the persisted scrape results
#[async_trait]
pub trait ScrapedPriceRepository: Send + Sync {
    /// Most recent row for one commodity, if any exists
    async fn latest_for(&self, commodity_id: &str) -> SourceResult<Option<ScrapedRow>>;
}

/// In-memory repository, used in tests and when no store is configured
pub struct InMemoryScrapedRepo {
    rows: RwLock<HashMap<String, Vec<ScrapedRow>>>,
}

impl InMemoryScrapedRepo {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, row: ScrapedRow) -> SourceResult<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| SourceError::Persistence("lock poisoned".to_string()))?;
        rows.entry(row.commodity_id.clone()).or_default().push(row);
        Ok(())
    }
}

impl Default for InMemoryScrapedRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScrapedPriceRepository for InMemoryScrapedRepo {
    async fn latest_for(&self, commodity_id: &str) -> SourceResult<Option<ScrapedRow>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| SourceError::Persistence("lock poisoned".to_string()))?;
        Ok(rows
            .get(commodity_id)
            .and_then(|list| list.iter().max_by_key(|row| row.scraped_at))
            .cloned())
    }
}

/// Repository backed by the hosted store's REST row endpoint
pub struct RestScrapedRepo {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestScrapedRepo {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Persistence(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ScrapedPriceRepository for RestScrapedRepo {
    async fn latest_for(&self, commodity_id: &str) -> SourceResult<Option<ScrapedRow>> {
        let url = format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            ROWS_TABLE
        );

        let filter = format!("eq.{commodity_id}");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("select", "*"),
                ("commodity_id", filter.as_str()),
                ("order", "scraped_at.desc"),
                ("limit", "1"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SourceError::Persistence(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Persistence(format!("HTTP {status}")));
        }

        let mut rows: Vec<ScrapedRow> = response
            .json()
            .await
            .map_err(|e| SourceError::Persistence(e.to_string()))?;

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }
}

/// Quote source reading the most recent persisted row per commodity
pub struct ScrapedRowSource {
    repo: Arc<dyn ScrapedPriceRepository>,
}

impl ScrapedRowSource {
    pub fn new(repo: Arc<dyn ScrapedPriceRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl QuoteSource for ScrapedRowSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_quote(&self, meta: &CommodityMeta) -> SourceResult<RawQuote> {
        let row = self
            .repo
            .latest_for(&meta.id)
            .await?
            .ok_or_else(|| {
                SourceError::Persistence(format!("no scraped rows yet for {}", meta.id))
            })?;

        Ok(RawQuote {
            commodity_id: row.commodity_id,
            source: SOURCE_NAME.to_string(),
            price: row.price.to_string(),
            change: row.change_amount.map(|v| v.to_string()),
            change_percent: row.change_percent.map(|v| v.to_string()),
            currency: Some(row.currency),
            observed_at: Some(row.scraped_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use commodity_common::catalog::CommodityCatalog;

    fn row(commodity_id: &str, price: f64, age_minutes: i64) -> ScrapedRow {
        ScrapedRow {
            id: format!("{commodity_id}-{age_minutes}"),
            commodity_id: commodity_id.to_string(),
            price,
            currency: "USD".to_string(),
            change_amount: Some(0.05),
            change_percent: Some(2.7),
            source_url: "https://finance.yahoo.com/quote/KC=F".to_string(),
            scraped_at: Utc::now() - ChronoDuration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn latest_for_picks_the_newest_row() {
        let repo = InMemoryScrapedRepo::new();
        repo.insert(row("coffee", 1.80, 120)).unwrap();
        repo.insert(row("coffee", 1.92, 5)).unwrap();
        repo.insert(row("coffee", 1.85, 60)).unwrap();

        let latest = repo.latest_for("coffee").await.unwrap().unwrap();
        assert_eq!(latest.price, 1.92);
    }

    #[tokio::test]
    async fn missing_commodity_yields_none() {
        let repo = InMemoryScrapedRepo::new();
        assert!(repo.latest_for("sugar").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn source_converts_a_row_into_a_raw_record() {
        let repo = Arc::new(InMemoryScrapedRepo::new());
        repo.insert(row("coffee", 1.92, 5)).unwrap();
        let source = ScrapedRowSource::new(repo);
        let meta = CommodityCatalog::default_tracked().get("coffee").unwrap().clone();

        let raw = source.fetch_quote(&meta).await.unwrap();
        assert_eq!(raw.commodity_id, "coffee");
        assert_eq!(raw.price, "1.92");
        assert_eq!(raw.change_percent.as_deref(), Some("2.7"));
        assert_eq!(raw.currency.as_deref(), Some("USD"));
        assert!(raw.observed_at.is_some());
    }

    #[tokio::test]
    async fn empty_store_is_a_source_failure() {
        let repo = Arc::new(InMemoryScrapedRepo::new());
        let source = ScrapedRowSource::new(repo);
        let meta = CommodityCatalog::default_tracked().get("butter").unwrap().clone();

        let err = source.fetch_quote(&meta).await.unwrap_err();
        assert!(matches!(err, SourceError::Persistence(_)));
    }
}
