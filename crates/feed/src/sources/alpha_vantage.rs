//! Live quote API source. The upstream answers one of three JSON shapes
//! depending on the requested function; each shape gets its own typed
//! decoder with explicit failure variants.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use commodity_common::catalog::{CommodityMeta, QuoteShape};
use commodity_common::{RawQuote, SourceError, SourceResult};

use super::QuoteSource;

const SOURCE_NAME: &str = "alpha-vantage";
const USER_AGENT: &str = "commodity-monitor/0.1";

pub struct AlphaVantageSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn query_params(&self, meta: &CommodityMeta) -> SourceResult<Vec<(String, String)>> {
        let live = meta
            .live
            .as_ref()
            .ok_or(SourceError::NotConfigured)?;

        let params = match live.shape {
            QuoteShape::GlobalQuote => vec![
                ("function".to_string(), "GLOBAL_QUOTE".to_string()),
                ("symbol".to_string(), live.symbol.clone()),
                ("apikey".to_string(), self.api_key.clone()),
            ],
            QuoteShape::DailySeries => vec![
                ("function".to_string(), "TIME_SERIES_DAILY".to_string()),
                ("symbol".to_string(), live.symbol.clone()),
                ("outputsize".to_string(), "compact".to_string()),
                ("apikey".to_string(), self.api_key.clone()),
            ],
            QuoteShape::ExchangeRate => vec![
                (
                    "function".to_string(),
                    "CURRENCY_EXCHANGE_RATE".to_string(),
                ),
                ("from_currency".to_string(), live.symbol.clone()),
                ("to_currency".to_string(), meta.currency.clone()),
                ("apikey".to_string(), self.api_key.clone()),
            ],
        };
        Ok(params)
    }
}

#[async_trait::async_trait]
impl QuoteSource for AlphaVantageSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_quote(&self, meta: &CommodityMeta) -> SourceResult<RawQuote> {
        let live = meta.live.as_ref().ok_or(SourceError::NotConfigured)?;
        let params = self.query_params(meta)?;

        info!(commodity = %meta.id, symbol = %live.symbol, "calling quote API");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SourceError::RateLimited(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(SourceError::Transport(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        match live.shape {
            QuoteShape::GlobalQuote => decode_global_quote(&body, meta),
            QuoteShape::DailySeries => decode_daily_series(&body, meta),
            QuoteShape::ExchangeRate => decode_exchange_rate(&body, meta),
        }
    }
}

/// Throttling and hard errors come back as 200 responses with a prose
/// body; check those before attempting the real decode.
#[derive(Debug, Deserialize)]
struct ApiNotice {
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

fn check_notice(body: &str) -> SourceResult<()> {
    if let Ok(notice) = serde_json::from_str::<ApiNotice>(body) {
        if let Some(message) = notice.note.or(notice.information) {
            return Err(SourceError::RateLimited(message));
        }
        if let Some(message) = notice.error_message {
            return Err(SourceError::MalformedPayload(message));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: GlobalQuote,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: String,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
}

fn decode_global_quote(body: &str, meta: &CommodityMeta) -> SourceResult<RawQuote> {
    check_notice(body)?;
    let parsed: GlobalQuoteResponse =
        serde_json::from_str(body).map_err(|e| SourceError::MalformedPayload(e.to_string()))?;
    let quote = parsed.global_quote;

    Ok(RawQuote {
        commodity_id: meta.id.clone(),
        source: SOURCE_NAME.to_string(),
        price: quote.price,
        change: quote.change,
        change_percent: quote.change_percent,
        currency: None,
        observed_at: quote
            .latest_trading_day
            .as_deref()
            .and_then(parse_trading_day),
    })
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    series: BTreeMap<String, DailyBar>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: String,
}

/// The daily series carries no precomputed delta; derive it from the two
/// most recent closes, the same way the yfinance collaborators do with
/// market price vs. previous close.
fn decode_daily_series(body: &str, meta: &CommodityMeta) -> SourceResult<RawQuote> {
    check_notice(body)?;
    let parsed: DailySeriesResponse =
        serde_json::from_str(body).map_err(|e| SourceError::MalformedPayload(e.to_string()))?;

    let mut days = parsed.series.iter().rev();
    let (latest_day, latest_bar) = days
        .next()
        .ok_or_else(|| SourceError::MalformedPayload("empty time series".to_string()))?;

    let latest_close: f64 = latest_bar
        .close
        .trim()
        .parse()
        .map_err(|_| SourceError::MalformedPayload(format!("close `{}`", latest_bar.close)))?;

    let (change, change_percent) = match days.next() {
        Some((_, previous_bar)) => {
            let previous_close: f64 = previous_bar.close.trim().parse().map_err(|_| {
                SourceError::MalformedPayload(format!("close `{}`", previous_bar.close))
            })?;
            let change = latest_close - previous_close;
            let percent = if previous_close != 0.0 {
                change / previous_close * 100.0
            } else {
                0.0
            };
            (
                Some(format!("{change:.4}")),
                Some(format!("{percent:.4}")),
            )
        }
        None => (None, None),
    };

    Ok(RawQuote {
        commodity_id: meta.id.clone(),
        source: SOURCE_NAME.to_string(),
        price: latest_bar.close.clone(),
        change,
        change_percent,
        currency: None,
        observed_at: parse_trading_day(latest_day),
    })
}

#[derive(Debug, Deserialize)]
struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    rate: ExchangeRate,
}

#[derive(Debug, Deserialize)]
struct ExchangeRate {
    #[serde(rename = "5. Exchange Rate")]
    rate: String,
    #[serde(rename = "3. To_Currency Code")]
    to_currency: Option<String>,
    #[serde(rename = "6. Last Refreshed")]
    last_refreshed: Option<String>,
}

fn decode_exchange_rate(body: &str, meta: &CommodityMeta) -> SourceResult<RawQuote> {
    check_notice(body)?;
    let parsed: ExchangeRateResponse =
        serde_json::from_str(body).map_err(|e| SourceError::MalformedPayload(e.to_string()))?;
    let rate = parsed.rate;

    Ok(RawQuote {
        commodity_id: meta.id.clone(),
        source: SOURCE_NAME.to_string(),
        price: rate.rate,
        change: None,
        change_percent: None,
        currency: rate.to_currency,
        observed_at: rate.last_refreshed.as_deref().and_then(parse_refreshed_at),
    })
}

fn parse_trading_day(day: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn parse_refreshed_at(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| Utc.from_utc_datetime(&dt))
}
