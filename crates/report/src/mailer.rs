use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::digest::{render_html, DailyReport};

const USER_AGENT: &str = "commodity-monitor/0.1";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("mail transport failure: {0}")]
    Transport(String),

    #[error("mail provider rejected the request: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Serialize)]
struct OutgoingEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    html: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Posts the rendered digest to a transactional mail API
pub struct ReportMailer {
    client: Client,
    api_url: String,
    api_key: String,
    sender: String,
}

impl ReportMailer {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        sender: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            sender: sender.into(),
        })
    }

    /// Render and send one report. Returns the provider's message id when
    /// it reports one.
    pub async fn send(
        &self,
        recipient: &str,
        report: &DailyReport,
    ) -> Result<Option<String>, DispatchError> {
        let payload = OutgoingEmail {
            from: &self.sender,
            to: vec![recipient],
            subject: report.subject(),
            html: render_html(report, Utc::now()),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|parsed| parsed.id);

        info!(recipient, date = %report.date, "report email dispatched");
        Ok(message_id)
    }
}
