use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use commodity_common::catalog::{CommodityCatalog, CommodityMeta};
use commodity_common::{RawQuote, SourceError, SourceResult, Trend};
use commodity_feed::aggregate::Aggregator;
use commodity_feed::sources::{MockFallbackSource, QuoteSource};

/// Source that fails every call with a transport error
struct DeadSource;

#[async_trait]
impl QuoteSource for DeadSource {
    fn name(&self) -> &str {
        "dead"
    }

    async fn fetch_quote(&self, _meta: &CommodityMeta) -> SourceResult<RawQuote> {
        Err(SourceError::Transport("connection refused".to_string()))
    }
}

/// Source that hangs until well past any reasonable timeout
struct HangingSource;

#[async_trait]
impl QuoteSource for HangingSource {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn fetch_quote(&self, _meta: &CommodityMeta) -> SourceResult<RawQuote> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(SourceError::Transport("unreachable".to_string()))
    }
}

/// Source that answers a fixed price for exactly one commodity
struct SingleCommoditySource {
    commodity_id: String,
    price: String,
}

impl SingleCommoditySource {
    fn new(commodity_id: &str, price: &str) -> Self {
        Self {
            commodity_id: commodity_id.to_string(),
            price: price.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for SingleCommoditySource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_quote(&self, meta: &CommodityMeta) -> SourceResult<RawQuote> {
        if meta.id != self.commodity_id {
            return Err(SourceError::Transport(format!(
                "no listing for {}",
                meta.id
            )));
        }
        Ok(RawQuote {
            commodity_id: meta.id.clone(),
            source: "fixed".to_string(),
            price: self.price.clone(),
            change: Some("0.05".to_string()),
            change_percent: Some("2.7".to_string()),
            currency: None,
            observed_at: Some(Utc::now()),
        })
    }
}

fn aggregator(sources: Vec<Box<dyn QuoteSource>>, timeout: Duration) -> Aggregator {
    Aggregator::new(
        sources,
        CommodityCatalog::default_tracked(),
        timeout,
        Duration::ZERO,
    )
}

fn tracked(ids: &[&str]) -> Vec<CommodityMeta> {
    let catalog = CommodityCatalog::default_tracked();
    ids.iter()
        .map(|id| catalog.get(id).unwrap().clone())
        .collect()
}

#[tokio::test]
async fn all_sources_failing_yields_the_fallback_table_values() {
    // Given - nothing but dead sources ahead of the terminal fallback
    let aggregator = aggregator(
        vec![
            Box::new(DeadSource),
            Box::new(DeadSource),
            Box::new(MockFallbackSource::new()),
        ],
        Duration::from_millis(200),
    );
    let metas = tracked(&["coffee", "sugar", "butter"]);

    // When
    let quotes = aggregator.aggregate(&metas).await;

    // Then - one quote per commodity, in input order, from the table
    assert_eq!(quotes.len(), 3);

    assert_eq!(quotes[0].id, "coffee");
    assert_eq!(quotes[0].price, 1.85);
    assert_eq!(quotes[0].change, 0.03);

    assert_eq!(quotes[1].id, "sugar");
    assert_eq!(quotes[1].price, 620.0);
    assert_eq!(quotes[1].change, 15.0);

    assert_eq!(quotes[2].id, "butter");
    assert_eq!(quotes[2].price, 6.85);
    assert_eq!(quotes[2].change, 0.12);
}

#[tokio::test]
async fn full_catalog_cycle_keeps_input_order_with_butter_last() {
    let catalog = CommodityCatalog::default_tracked();
    let aggregator = aggregator(
        vec![Box::new(MockFallbackSource::new())],
        Duration::from_millis(200),
    );

    let quotes = aggregator.aggregate(catalog.entries()).await;

    let ids: Vec<&str> = quotes.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["coffee", "sugar", "cocoa", "wheat", "butter"]);
}

#[tokio::test]
async fn timeout_falls_through_to_the_next_source() {
    // Given - the preferred source hangs, a slower-precedence one is healthy
    let aggregator = aggregator(
        vec![
            Box::new(HangingSource),
            Box::new(SingleCommoditySource::new("coffee", "1.92")),
            Box::new(MockFallbackSource::new()),
        ],
        Duration::from_millis(100),
    );
    let metas = tracked(&["coffee", "sugar"]);

    // When
    let quotes = aggregator.aggregate(&metas).await;

    // Then - coffee came from the healthy source, sugar fell through to
    // the table untouched by coffee's trouble
    assert_eq!(quotes[0].id, "coffee");
    assert_eq!(quotes[0].price, 1.92);
    assert_eq!(quotes[1].id, "sugar");
    assert_eq!(quotes[1].price, 620.0);
}

#[tokio::test]
async fn every_quote_satisfies_the_trend_rule() {
    let catalog = CommodityCatalog::default_tracked();
    let aggregator = aggregator(
        vec![
            Box::new(SingleCommoditySource::new("cocoa", "2845.00")),
            Box::new(MockFallbackSource::new()),
        ],
        Duration::from_millis(200),
    );

    let quotes = aggregator.aggregate(catalog.entries()).await;

    for quote in &quotes {
        assert_eq!(
            quote.trend,
            Trend::from_change_percent(quote.change_percent),
            "trend out of step for {}",
            quote.id
        );
    }
}

#[tokio::test]
async fn malformed_numeric_field_survives_as_a_zero_price() {
    let aggregator = aggregator(
        vec![
            Box::new(SingleCommoditySource::new("coffee", "N/A")),
            Box::new(MockFallbackSource::new()),
        ],
        Duration::from_millis(200),
    );
    let metas = tracked(&["coffee"]);

    let quotes = aggregator.aggregate(&metas).await;

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].price, 0.0);
}

#[tokio::test]
async fn commodity_outside_the_catalog_still_gets_a_quote() {
    let aggregator = aggregator(
        vec![Box::new(MockFallbackSource::new())],
        Duration::from_millis(200),
    );
    let metas = vec![CommodityMeta {
        id: "palladium".to_string(),
        name: "Palladium".to_string(),
        name_de: "Palladiumpreise".to_string(),
        currency: "USD".to_string(),
        unit: "oz".to_string(),
        icon: "⚙".to_string(),
        live: None,
    }];

    let quotes = aggregator.aggregate(&metas).await;

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].id, "palladium");
    assert_eq!(quotes[0].price, 100.0);
    assert_eq!(quotes[0].change, 0.0);
    assert_eq!(quotes[0].trend, Trend::Stable);
}
