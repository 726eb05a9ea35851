//! Source adapters. Each one wraps a single upstream and converts every
//! failure into a `SourceError` instead of letting it escape.

pub mod alpha_vantage;
pub mod disabled;
pub mod mock;
pub mod scraped;

use std::sync::Arc;

use async_trait::async_trait;

use commodity_common::catalog::CommodityMeta;
use commodity_common::config::FeedSettings;
use commodity_common::{RawQuote, SourceResult};

pub use alpha_vantage::AlphaVantageSource;
pub use disabled::DisabledSource;
pub use mock::MockFallbackSource;
pub use scraped::{InMemoryScrapedRepo, RestScrapedRepo, ScrapedPriceRepository, ScrapedRowSource};

/// One upstream price source.
///
/// Implementations make at most one round trip per call and never retry
/// internally; the chain decides what happens after a failure.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_quote(&self, meta: &CommodityMeta) -> SourceResult<RawQuote>;
}

/// The fixed precedence chain: previously scraped rows win over the live
/// quote API, and the last-known-good table terminates the list. Without a
/// quote API credential the live slot degrades to the always-failing
/// source.
pub fn standard_sources(
    settings: &FeedSettings,
    repo: Arc<dyn ScrapedPriceRepository>,
) -> SourceResult<Vec<Box<dyn QuoteSource>>> {
    let live: Box<dyn QuoteSource> = match settings.quote_api_key.as_deref() {
        Some(key) => Box::new(AlphaVantageSource::new(
            settings.quote_api_base_url.as_str(),
            key,
            settings.request_timeout(),
        )?),
        None => Box::new(DisabledSource::new("quote API credential missing")),
    };

    Ok(vec![
        Box::new(ScrapedRowSource::new(repo)),
        live,
        Box::new(MockFallbackSource::new()),
    ])
}
