use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::time::interval;
use tracing::info;

use commodity_common::catalog::CommodityCatalog;
use commodity_common::config::MonitorConfig;
use commodity_common::CommodityQuote;
use commodity_feed::aggregate::Aggregator;
use commodity_feed::alerts;
use commodity_feed::history;
use commodity_feed::sources::{
    standard_sources, InMemoryScrapedRepo, RestScrapedRepo, ScrapedPriceRepository,
};
use commodity_report::digest::{render_html, signed_percent, DailyReport};
use commodity_report::mailer::ReportMailer;

#[derive(Parser)]
#[command(name = "monitor", about = "Rohstoff price monitoring", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one aggregation cycle and print the quote table
    Fetch,
    /// Keep aggregating on a fixed interval
    Watch {
        /// Seconds between cycles
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
    /// Run one cycle and show the alert bands
    Alerts,
    /// Print a synthetic price history around a commodity's current price
    History {
        /// Commodity identifier, e.g. "butter"
        #[arg(long)]
        id: String,
        /// Days to cover
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Build the daily digest, print it, optionally e-mail it
    Report {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Dispatch through the mail API instead of only printing
        #[arg(long)]
        send: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = MonitorConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let repo: Arc<dyn ScrapedPriceRepository> = match (
        config.feed.scrape_store_url.as_deref(),
        config.feed.scrape_store_key.as_deref(),
    ) {
        (Some(url), Some(key)) => Arc::new(RestScrapedRepo::new(
            url,
            key,
            config.feed.request_timeout(),
        )?),
        _ => {
            info!("no scrape store configured, starting with an empty in-memory store");
            Arc::new(InMemoryScrapedRepo::new())
        }
    };

    let sources = standard_sources(&config.feed, repo)?;
    let catalog = CommodityCatalog::default_tracked();
    let aggregator = Aggregator::new(
        sources,
        catalog.clone(),
        config.feed.request_timeout(),
        config.feed.request_spacing(),
    );
    let tracked = catalog.entries().to_vec();

    match cli.command {
        Command::Fetch => {
            let quotes = aggregator.aggregate(&tracked).await;
            print_quotes(&quotes);
        }
        Command::Watch { interval: seconds } => {
            let mut ticker = interval(Duration::from_secs(seconds.max(1)));
            info!(seconds, "watch loop started");
            loop {
                ticker.tick().await;
                let quotes = aggregator.aggregate(&tracked).await;
                print_quotes(&quotes);
            }
        }
        Command::Alerts => {
            let quotes = aggregator.aggregate(&tracked).await;
            print_alerts(&quotes);
        }
        Command::History { id, days } => {
            let Some(meta) = catalog.get(&id) else {
                bail!("unknown commodity: {id}");
            };
            let quotes = aggregator.aggregate(std::slice::from_ref(meta)).await;
            for point in history::generate_history(quotes[0].price, days) {
                println!("{} {:>10.2}", point.date, point.price);
            }
        }
        Command::Report { to, send } => {
            let quotes = aggregator.aggregate(&tracked).await;
            let date = Utc::now().format("%d.%m.%Y").to_string();
            let report = DailyReport::from_quotes(date, &quotes);

            if send {
                let Some(api_key) = config.report.mail_api_key.as_deref() else {
                    bail!("no mail API key configured, cannot send the report");
                };
                let mailer = ReportMailer::new(
                    config.report.mail_api_url.as_str(),
                    api_key,
                    config.report.sender.as_str(),
                    config.feed.request_timeout(),
                )?;
                let message_id = mailer
                    .send(&to, &report)
                    .await
                    .context("dispatching the report email")?;
                info!(?message_id, "report sent to {to}");
            } else {
                println!("{}", render_html(&report, Utc::now()));
            }
        }
    }

    Ok(())
}

fn print_quotes(quotes: &[CommodityQuote]) {
    println!("{:<3} {:<16} {:>14} {:>9} {:>3}", "", "Rohstoff", "Preis", "Änderung", "");
    for quote in quotes {
        println!("{}", quote_line(quote));
    }

    let positive = quotes.iter().filter(|q| q.change_percent > 0.0).count();
    let critical = quotes
        .iter()
        .filter(|q| q.change_percent.abs() > 5.0)
        .count();
    println!(
        "\n{} Rohstoffe überwacht, {} positive Trends, {} kritische Alarme",
        quotes.len(),
        positive,
        critical
    );
}

fn quote_line(quote: &CommodityQuote) -> String {
    format!(
        "{:<3} {:<16} {:>8.2} {}/{:<6} {:>8} {:>3}",
        quote.icon,
        quote.name_de,
        quote.price,
        quote.currency,
        quote.unit,
        signed_percent(quote.change_percent),
        quote.trend.arrow(),
    )
}

fn print_alerts(quotes: &[CommodityQuote]) {
    let summary = alerts::classify(quotes);

    if summary.is_quiet() {
        println!("Keine kritischen Preisänderungen heute");
        return;
    }

    if !summary.critical.is_empty() {
        println!("Kritische Preisänderungen (>5%)");
        for quote in &summary.critical {
            println!(
                "  {} {} {}",
                quote.icon,
                quote.name_de,
                signed_percent(quote.change_percent)
            );
        }
    }

    if !summary.warnings.is_empty() {
        println!("Warnungen (>2%)");
        for quote in &summary.warnings {
            println!(
                "  {} {} {}",
                quote.icon,
                quote.name_de,
                signed_percent(quote.change_percent)
            );
        }
    }
}
