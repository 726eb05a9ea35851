use async_trait::async_trait;
use tracing::debug;

use commodity_common::catalog::CommodityMeta;
use commodity_common::{RawQuote, SourceError, SourceResult};

use super::QuoteSource;

/// Stand-in for the live quote API when no credential is configured.
/// Fails every fetch so the chain moves straight on.
pub struct DisabledSource {
    reason: String,
}

impl DisabledSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl QuoteSource for DisabledSource {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn fetch_quote(&self, meta: &CommodityMeta) -> SourceResult<RawQuote> {
        debug!(commodity = %meta.id, reason = %self.reason, "live source disabled");
        Err(SourceError::NotConfigured)
    }
}
