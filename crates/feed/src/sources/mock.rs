use async_trait::async_trait;

use commodity_common::catalog::{self, CommodityMeta};
use commodity_common::{RawQuote, SourceResult};

use super::QuoteSource;

const SOURCE_NAME: &str = "mock-fallback";

/// Terminal source in every chain: serves the compiled-in last-known-good
/// table and never fails, so a cycle always ends with a quote.
pub struct MockFallbackSource;

impl MockFallbackSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockFallbackSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for MockFallbackSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_quote(&self, meta: &CommodityMeta) -> SourceResult<RawQuote> {
        let entry = catalog::last_known_good(&meta.id);

        // No observed_at: the normalizer stamps fallback quotes with the
        // current wall-clock time.
        Ok(RawQuote {
            commodity_id: meta.id.clone(),
            source: SOURCE_NAME.to_string(),
            price: entry.price.to_string(),
            change: Some(entry.change.to_string()),
            change_percent: Some(entry.change_percent.to_string()),
            currency: None,
            observed_at: None,
        })
    }
}
