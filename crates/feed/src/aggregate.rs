//! One aggregation cycle walks the source chain per commodity and always
//! comes back with a full quote list.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use commodity_common::catalog::{self, CommodityCatalog, CommodityMeta};
use commodity_common::{CommodityQuote, SourceError, SourceResult, Trend};

use crate::normalize::normalize;
use crate::sources::QuoteSource;

/// Walks an ordered source chain per tracked commodity, first success
/// wins. The terminal fallback source always succeeds, so `aggregate`
/// itself cannot fail and one input entry always yields one output quote.
pub struct Aggregator {
    sources: Vec<Box<dyn QuoteSource>>,
    catalog: CommodityCatalog,
    source_timeout: Duration,
    call_spacing: Duration,
    // Timestamps must never run backwards for a commodity while the
    // process lives, whichever source happens to win a cycle.
    last_updated_floor: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Aggregator {
    pub fn new(
        sources: Vec<Box<dyn QuoteSource>>,
        catalog: CommodityCatalog,
        source_timeout: Duration,
        call_spacing: Duration,
    ) -> Self {
        Self {
            sources,
            catalog,
            source_timeout,
            call_spacing,
            last_updated_floor: Mutex::new(HashMap::new()),
        }
    }

    /// One cycle over the given commodities, sequential and in input
    /// order. A failure anywhere stays contained in its commodity.
    pub async fn aggregate(&self, tracked: &[CommodityMeta]) -> Vec<CommodityQuote> {
        let mut quotes = Vec::with_capacity(tracked.len());

        for (index, meta) in tracked.iter().enumerate() {
            if index > 0 && !self.call_spacing.is_zero() {
                // Upstream rate limit budget: one call window at a time.
                sleep(self.call_spacing).await;
            }
            quotes.push(self.fetch_one(meta).await);
        }

        info!(count = quotes.len(), "aggregation cycle complete");
        quotes
    }

    async fn fetch_one(&self, meta: &CommodityMeta) -> CommodityQuote {
        for source in &self.sources {
            match self.try_source(source.as_ref(), meta).await {
                Ok(quote) => {
                    info!(
                        commodity = %meta.id,
                        source = source.name(),
                        price = quote.price,
                        "quote resolved"
                    );
                    return self.clamp_last_updated(quote);
                }
                Err(err) => {
                    warn!(
                        commodity = %meta.id,
                        source = source.name(),
                        %err,
                        "source failed, trying next"
                    );
                }
            }
        }

        // Reached only when the chain is misconfigured or the commodity is
        // absent from the catalog; the contract still owes a quote.
        warn!(commodity = %meta.id, "every source failed, synthesizing fallback quote");
        self.clamp_last_updated(synthesize_fallback(meta, Utc::now()))
    }

    async fn try_source(
        &self,
        source: &dyn QuoteSource,
        meta: &CommodityMeta,
    ) -> SourceResult<CommodityQuote> {
        let raw = match timeout(self.source_timeout, source.fetch_quote(meta)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SourceError::Transport(format!(
                    "{} timed out after {:?}",
                    source.name(),
                    self.source_timeout
                )))
            }
        };
        normalize(&raw, &self.catalog, Utc::now())
    }

    fn clamp_last_updated(&self, mut quote: CommodityQuote) -> CommodityQuote {
        let mut floor = self
            .last_updated_floor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = floor.entry(quote.id.clone()).or_insert(quote.last_updated);
        if quote.last_updated < *entry {
            quote.last_updated = *entry;
        } else {
            *entry = quote.last_updated;
        }
        quote
    }
}

/// Quote built straight from the last-known-good table, bypassing the
/// chain entirely.
fn synthesize_fallback(meta: &CommodityMeta, now: DateTime<Utc>) -> CommodityQuote {
    let entry = catalog::last_known_good(&meta.id);
    CommodityQuote {
        id: meta.id.clone(),
        name: meta.name.clone(),
        name_de: meta.name_de.clone(),
        price: entry.price,
        currency: meta.currency.clone(),
        change: entry.change,
        change_percent: entry.change_percent,
        unit: meta.unit.clone(),
        last_updated: now,
        trend: Trend::from_change_percent(entry.change_percent),
        icon: meta.icon.clone(),
        news: catalog::static_news(&meta.id, now),
    }
}
