//! Milestone and anomaly reporting.
//!
//! The notifier channel is the primary operational log of an unattended run:
//! every milestone, anomaly, and fatal error is mirrored to it.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::{Error, Result};

/// Push-messaging sink for progress reports.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
    async fn send_image(&self, caption: &str, png: &[u8]) -> Result<()>;
}

/// Report an anomaly without letting a delivery failure halt the run.
pub async fn report_anomaly<N: Notifier>(notifier: &N, text: &str) {
    warn!("{text}");
    if let Err(e) = notifier.send_text(text).await {
        warn!(error = %e, "failed to deliver anomaly report");
    }
}

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Notifier backed by the Telegram bot API.
pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    chat_id: i64,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{TELEGRAM_API}/bot{token}"),
            chat_id,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn check(response: reqwest::Response) -> Result<()> {
        let api: ApiResponse = response.json().await?;
        if api.ok {
            Ok(())
        } else {
            Err(Error::Notify(api.description.unwrap_or_else(|| {
                "telegram rejected the request".to_string()
            })))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("sendMessage"))
            .json(&serde_json::json!({ "chat_id": self.chat_id, "text": text }))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn send_image(&self, caption: &str, png: &[u8]) -> Result<()> {
        let name = format!("{}.png", Utc::now().format("%Y%m%dT%H%M%S"));
        let photo = reqwest::multipart::Part::bytes(png.to_vec())
            .file_name(name)
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);
        let response = self
            .http
            .post(self.endpoint("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        Self::check(response).await
    }
}
