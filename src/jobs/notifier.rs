use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use super::models::Job;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Upper bound for one sendMessage call
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers one job to the configured recipient
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, job: &Job) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Telegram Bot API sender for a single chat
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, NotifyError> {
        Self::with_endpoint(bot_token, chat_id, TELEGRAM_API_URL, NOTIFY_TIMEOUT)
    }

    /// Sender for a specific Bot API base URL and request timeout
    pub fn with_endpoint(
        bot_token: String,
        chat_id: String,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            bot_token,
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, job: &Job) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let text = render_message(job);

        let resp = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text: &text,
                parse_mode: "HTML",
                disable_web_page_preview: false,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Telegram notification sent for job {:?}", job.id);
        Ok(())
    }
}

/// Render the HTML message for one job
pub fn render_message(job: &Job) -> String {
    format!(
        "<b>🔥 New Relevant Internship / Job</b>\n\n\
         <b>{}</b>\n\
         Company: {}\n\
         Location: {}\n\n\
         🔗 {}",
        escape_html(&job.title),
        escape_html(&job.company),
        escape_html(&job.location),
        escape_html(&job.link),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
