//! Threshold-based alert bands over one quote list.

use commodity_common::CommodityQuote;

/// A change beyond this magnitude is critical
const CRITICAL_THRESHOLD: f64 = 5.0;
/// A change beyond this magnitude (up to the critical edge) is a warning
const WARNING_THRESHOLD: f64 = 2.0;

/// Result of one alert pass. Never persisted; recomputed per cycle.
#[derive(Debug, Clone, Default)]
pub struct AlertSummary {
    pub critical: Vec<CommodityQuote>,
    pub warnings: Vec<CommodityQuote>,
}

impl AlertSummary {
    pub fn is_quiet(&self) -> bool {
        self.critical.is_empty() && self.warnings.is_empty()
    }
}

/// Partition quotes into alert bands by absolute percent change. Exactly
/// 5.0 percent is still a warning; critical starts strictly above it.
/// Input order is preserved within each band.
pub fn classify(quotes: &[CommodityQuote]) -> AlertSummary {
    let mut summary = AlertSummary::default();

    for quote in quotes {
        let magnitude = quote.change_percent.abs();
        if magnitude > CRITICAL_THRESHOLD {
            summary.critical.push(quote.clone());
        } else if magnitude > WARNING_THRESHOLD {
            summary.warnings.push(quote.clone());
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use commodity_common::Trend;
    use proptest::prelude::*;

    fn quote(id: &str, change_percent: f64) -> CommodityQuote {
        CommodityQuote {
            id: id.to_string(),
            name: id.to_string(),
            name_de: id.to_string(),
            price: 100.0,
            currency: "USD".to_string(),
            change: 0.0,
            change_percent,
            unit: "kg".to_string(),
            last_updated: Utc::now(),
            trend: Trend::from_change_percent(change_percent),
            icon: "📦".to_string(),
            news: Vec::new(),
        }
    }

    #[test]
    fn exactly_five_percent_is_a_warning_not_critical() {
        let summary = classify(&[quote("sugar", 5.0)]);
        assert!(summary.critical.is_empty());
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn exactly_two_percent_raises_nothing() {
        let summary = classify(&[quote("butter", 2.0), quote("cocoa", -2.0)]);
        assert!(summary.is_quiet());
    }

    #[test]
    fn negative_changes_count_by_magnitude() {
        let summary = classify(&[quote("cocoa", -7.2), quote("wheat", -3.1)]);
        assert_eq!(summary.critical.len(), 1);
        assert_eq!(summary.critical[0].id, "cocoa");
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.warnings[0].id, "wheat");
    }

    #[test]
    fn input_order_is_preserved_within_a_band() {
        let quotes = vec![
            quote("coffee", 6.0),
            quote("sugar", 2.5),
            quote("cocoa", -8.0),
            quote("wheat", 4.9),
        ];
        let summary = classify(&quotes);

        let critical_ids: Vec<&str> = summary.critical.iter().map(|q| q.id.as_str()).collect();
        let warning_ids: Vec<&str> = summary.warnings.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(critical_ids, vec!["coffee", "cocoa"]);
        assert_eq!(warning_ids, vec!["sugar", "wheat"]);
    }

    proptest! {
        #[test]
        fn bands_are_disjoint_and_cover_exactly_the_loud_quotes(
            percents in proptest::collection::vec(-20.0f64..20.0, 0..12)
        ) {
            let quotes: Vec<CommodityQuote> = percents
                .iter()
                .enumerate()
                .map(|(i, &pct)| quote(&format!("c{i}"), pct))
                .collect();

            let summary = classify(&quotes);

            for q in &summary.critical {
                prop_assert!(q.change_percent.abs() > 5.0);
            }
            for q in &summary.warnings {
                let magnitude = q.change_percent.abs();
                prop_assert!(magnitude > 2.0 && magnitude <= 5.0);
            }

            let loud = quotes.iter().filter(|q| q.change_percent.abs() > 2.0).count();
            prop_assert_eq!(summary.critical.len() + summary.warnings.len(), loud);
        }
    }
}
