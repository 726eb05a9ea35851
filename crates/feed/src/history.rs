//! Synthetic price history for the chart views. The dashboard only needs a
//! plausible series around the current price, not real historical data.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One sample of a price series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Random walk ending today, oldest first: ±5% daily variation, prices
/// floored at zero and rounded to cents.
pub fn generate_history(base_price: f64, days: u32) -> Vec<PricePoint> {
    let today = Utc::now().date_naive();
    let mut rng = rand::thread_rng();
    let mut current = base_price;
    let mut points = Vec::with_capacity(days as usize + 1);

    for offset in (0..=i64::from(days)).rev() {
        let variation: f64 = rng.gen_range(-0.05..=0.05);
        current = (current * (1.0 + variation)).max(0.0);
        points.push(PricePoint {
            date: today - Duration::days(offset),
            price: (current * 100.0).round() / 100.0,
        });
    }

    points
}
