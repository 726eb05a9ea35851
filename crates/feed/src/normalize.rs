//! Folds heterogeneous raw source records into the canonical quote shape.

use chrono::{DateTime, Utc};

use commodity_common::catalog::{self, CommodityCatalog};
use commodity_common::{CommodityQuote, RawQuote, SourceError, SourceResult, Trend};

/// Lenient numeric parsing for upstream fields: plain decimals, a trailing
/// percent sign, and German digit grouping ("1.234,56") are all accepted.
/// Anything unparseable is 0.0, never a failure.
pub fn parse_decimal(field: &str) -> f64 {
    let cleaned = field.trim().trim_end_matches('%').trim();
    if let Some(value) = to_finite(cleaned) {
        return value;
    }
    let german = cleaned.replace('.', "").replace(',', ".");
    to_finite(&german).unwrap_or(0.0)
}

fn to_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert one raw record into a canonical quote.
///
/// Labels, unit and icon come from the catalog; a reported currency wins
/// over the catalog entry. `now` stamps records whose source reported no
/// timestamp of its own.
pub fn normalize(
    raw: &RawQuote,
    catalog: &CommodityCatalog,
    now: DateTime<Utc>,
) -> SourceResult<CommodityQuote> {
    let meta = catalog
        .get(&raw.commodity_id)
        .ok_or_else(|| SourceError::UnknownCommodity(raw.commodity_id.clone()))?;

    let price = parse_decimal(&raw.price).max(0.0);
    let change = raw.change.as_deref().map(parse_decimal).unwrap_or(0.0);
    let change_percent = raw
        .change_percent
        .as_deref()
        .map(parse_decimal)
        .unwrap_or(0.0);

    Ok(CommodityQuote {
        id: meta.id.clone(),
        name: meta.name.clone(),
        name_de: meta.name_de.clone(),
        price,
        currency: raw
            .currency
            .clone()
            .unwrap_or_else(|| meta.currency.clone()),
        change,
        change_percent,
        unit: meta.unit.clone(),
        last_updated: raw.observed_at.unwrap_or(now),
        trend: Trend::from_change_percent(change_percent),
        icon: meta.icon.clone(),
        news: catalog::static_news(&meta.id, now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn raw(commodity_id: &str) -> RawQuote {
        RawQuote {
            commodity_id: commodity_id.to_string(),
            source: "test".to_string(),
            price: "1.85".to_string(),
            change: Some("0.03".to_string()),
            change_percent: Some("1.6".to_string()),
            currency: None,
            observed_at: None,
        }
    }

    #[test]
    fn parses_plain_and_percent_suffixed_numbers() {
        assert_eq!(parse_decimal("1.85"), 1.85);
        assert_eq!(parse_decimal("1.6000%"), 1.6);
        assert_eq!(parse_decimal("-45"), -45.0);
        assert_eq!(parse_decimal(" 620 "), 620.0);
    }

    #[test]
    fn parses_german_digit_grouping() {
        assert_eq!(parse_decimal("1.234,56"), 1234.56);
        assert_eq!(parse_decimal("6,85"), 6.85);
    }

    #[test]
    fn unparseable_fields_become_zero() {
        assert_eq!(parse_decimal("N/A"), 0.0);
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("NaN"), 0.0);
    }

    #[test]
    fn malformed_price_yields_a_zero_price_quote() {
        let catalog = CommodityCatalog::default_tracked();
        let mut record = raw("coffee");
        record.price = "N/A".to_string();

        let quote = normalize(&record, &catalog, Utc::now()).unwrap();
        assert_eq!(quote.price, 0.0);
    }

    #[test]
    fn unknown_commodity_is_an_error() {
        let catalog = CommodityCatalog::default_tracked();
        let record = raw("palladium");

        let err = normalize(&record, &catalog, Utc::now()).unwrap_err();
        assert!(matches!(err, SourceError::UnknownCommodity(_)));
    }

    #[test]
    fn trend_follows_the_parsed_change_percent() {
        let catalog = CommodityCatalog::default_tracked();

        let mut record = raw("coffee");
        record.change_percent = Some("0.05".to_string());
        let quote = normalize(&record, &catalog, Utc::now()).unwrap();
        assert_eq!(quote.trend, Trend::Stable);

        record.change_percent = Some("-1.5".to_string());
        let quote = normalize(&record, &catalog, Utc::now()).unwrap();
        assert_eq!(quote.trend, Trend::Down);

        record.change_percent = None;
        let quote = normalize(&record, &catalog, Utc::now()).unwrap();
        assert_eq!(quote.change_percent, 0.0);
        assert_eq!(quote.trend, Trend::Stable);
    }

    #[test]
    fn source_timestamp_wins_over_the_clock() {
        let catalog = CommodityCatalog::default_tracked();
        let now = Utc::now();
        let observed = now - ChronoDuration::hours(3);

        let mut record = raw("coffee");
        record.observed_at = Some(observed);
        let quote = normalize(&record, &catalog, now).unwrap();
        assert_eq!(quote.last_updated, observed);

        record.observed_at = None;
        let quote = normalize(&record, &catalog, now).unwrap();
        assert_eq!(quote.last_updated, now);
    }

    #[test]
    fn catalog_fills_labels_and_news() {
        let catalog = CommodityCatalog::default_tracked();
        let quote = normalize(&raw("coffee"), &catalog, Utc::now()).unwrap();

        assert_eq!(quote.name_de, "Kaffeepreise");
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.unit, "lb");
        assert_eq!(quote.news.len(), 2);
    }

    #[test]
    fn reported_currency_wins_over_the_catalog() {
        let catalog = CommodityCatalog::default_tracked();
        let mut record = raw("coffee");
        record.currency = Some("EUR".to_string());

        let quote = normalize(&record, &catalog, Utc::now()).unwrap();
        assert_eq!(quote.currency, "EUR");
    }

    #[test]
    fn negative_price_is_clamped_to_zero() {
        let catalog = CommodityCatalog::default_tracked();
        let mut record = raw("coffee");
        record.price = "-3.5".to_string();

        let quote = normalize(&record, &catalog, Utc::now()).unwrap();
        assert_eq!(quote.price, 0.0);
    }
}
