use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use commodity_common::{CommodityQuote, Trend};

/// One line of the daily digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: String,
    pub name: String,
    pub name_de: String,
    pub price: f64,
    pub currency: String,
    pub unit: String,
    pub change_percent: f64,
    pub trend: Trend,
    pub icon: String,
}

/// A dated digest over one full aggregation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: String,
    pub commodities: Vec<ReportRow>,
}

impl DailyReport {
    pub fn from_quotes(date: impl Into<String>, quotes: &[CommodityQuote]) -> Self {
        Self {
            date: date.into(),
            commodities: quotes
                .iter()
                .map(|quote| ReportRow {
                    id: quote.id.clone(),
                    name: quote.name.clone(),
                    name_de: quote.name_de.clone(),
                    price: quote.price,
                    currency: quote.currency.clone(),
                    unit: quote.unit.clone(),
                    change_percent: quote.change_percent,
                    trend: quote.trend,
                    icon: quote.icon.clone(),
                })
                .collect(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Täglicher Rohstoffbericht - {}", self.date)
    }
}

/// Positive changes get an explicit plus sign, one decimal place
pub fn signed_percent(change_percent: f64) -> String {
    if change_percent > 0.0 {
        format!("+{change_percent:.1}%")
    } else {
        format!("{change_percent:.1}%")
    }
}

fn badge_colors(change_percent: f64) -> (&'static str, &'static str) {
    if change_percent > 0.0 {
        ("#dcfce7", "#166534")
    } else if change_percent < 0.0 {
        ("#fef2f2", "#dc2626")
    } else {
        ("#f3f4f6", "#374151")
    }
}

/// Render the digest as the email body: header with the report date, a
/// short market summary, the price table, a forecast block, and a
/// generated-at footer.
pub fn render_html(report: &DailyReport, generated_at: DateTime<Utc>) -> String {
    let mut rows = String::new();
    for commodity in &report.commodities {
        let (background, color) = badge_colors(commodity.change_percent);
        rows.push_str(&format!(
            r#"      <tr style="border-bottom: 1px solid #e5e5e5;">
        <td style="padding: 12px; text-align: left;">
          <span style="font-size: 18px;">{icon}</span>
          <span style="font-weight: 600; color: #1f2937;">{name_de}</span>
          <span style="font-size: 14px; color: #6b7280;">{name}</span>
        </td>
        <td style="padding: 12px; text-align: right; font-weight: 600; color: #1f2937;">
          {price:.2} {currency}/{unit}
        </td>
        <td style="padding: 12px; text-align: right;">
          <span style="padding: 4px 8px; border-radius: 12px; font-size: 12px; font-weight: 600; background-color: {background}; color: {color};">{percent}</span>
        </td>
      </tr>
"#,
            icon = commodity.icon,
            name_de = commodity.name_de,
            name = commodity.name,
            price = commodity.price,
            currency = commodity.currency,
            unit = commodity.unit,
            background = background,
            color = color,
            percent = signed_percent(commodity.change_percent),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Täglicher Rohstoffbericht</title>
  </head>
  <body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #1f2937; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="text-align: center; margin-bottom: 32px;">
      <h1 style="color: #1f2937; margin-bottom: 8px;">📊 Täglicher Rohstoffbericht</h1>
      <p style="color: #6b7280; margin: 0;">{date}</p>
    </div>
    <div style="background-color: #f9fafb; padding: 24px; border-radius: 8px; margin-bottom: 24px;">
      <h2 style="color: #1f2937; margin-top: 0; margin-bottom: 16px;">📈 Zusammenfassung der Marktlage</h2>
      <p style="color: #4b5563; margin: 0;">
        Der heutige Handel zeigt gemischte Signale bei den wichtigsten Rohstoffen.
        Während Butterpreise weiter steigen, verzeichnet Kakao einen Rückgang aufgrund
        verbesserter Erntebedingungen in Westafrika.
      </p>
    </div>
    <div style="margin-bottom: 24px;">
      <h3 style="color: #1f2937; margin-bottom: 16px;">🥇 Rohstoffpreise im Detail</h3>
      <table style="width: 100%; border-collapse: collapse; background-color: white; border-radius: 8px;">
        <thead>
          <tr style="background-color: #f3f4f6;">
            <th style="padding: 12px; text-align: left; font-weight: 600; color: #374151;">Rohstoff</th>
            <th style="padding: 12px; text-align: right; font-weight: 600; color: #374151;">Preis</th>
            <th style="padding: 12px; text-align: right; font-weight: 600; color: #374151;">Änderung</th>
          </tr>
        </thead>
        <tbody>
{rows}        </tbody>
      </table>
    </div>
    <div style="background-color: #eff6ff; padding: 20px; border-radius: 8px; border-left: 4px solid #3b82f6; margin-bottom: 24px;">
      <h4 style="color: #1e40af; margin-top: 0; margin-bottom: 12px;">🔮 Prognose für morgen</h4>
      <p style="color: #1e40af; margin: 0; font-size: 14px;">
        Aufgrund der aktuellen Markttrends erwarten wir eine Stabilisierung der Butterpreise
        und einen möglichen weiteren Rückgang bei Kakao.
      </p>
    </div>
    <div style="text-align: center; padding-top: 24px; border-top: 1px solid #e5e7eb;">
      <p style="color: #9ca3af; font-size: 12px; margin: 0;">
        Bericht automatisch generiert am {generated_at} | Rohstoff-Monitoring-System
      </p>
    </div>
  </body>
</html>
"#,
        date = report.date,
        rows = rows,
        generated_at = generated_at.format("%d.%m.%Y %H:%M"),
    )
}
