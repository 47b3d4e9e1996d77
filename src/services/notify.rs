use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::notification::NotificationResult;
use crate::models::verdict::VerdictPayload;

/// Delivers the photo and verdict message to a chat channel.
///
/// Delivery problems are reported through [`NotificationResult`], never as an
/// error: a failed post must not fail the invocation.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        verdict: &VerdictPayload,
        image_bytes: &[u8],
        channel: &str,
    ) -> NotificationResult;
}

/// Uploads through Slack's `files.upload` endpoint.
pub struct SlackNotifier {
    http: Client,
    upload_url: String,
    bot_token: String,
    title: String,
}

#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
}

impl SlackNotifier {
    pub fn new(
        upload_url: String,
        bot_token: String,
        device_id: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            upload_url,
            bot_token,
            title: format!("Image_{device_id}"),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.slack_upload_url.clone(),
            config.slack_bot_token.clone(),
            &config.device_id,
            config.requests_timeout(),
        )
    }

    async fn upload(
        &self,
        message: &str,
        image_bytes: &[u8],
        channel: &str,
    ) -> Result<NotificationResult, reqwest::Error> {
        let file = Part::bytes(image_bytes.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;

        let form = Form::new()
            .text("initial_comment", message.to_string())
            .text("channels", channel.to_string())
            .text("title", self.title.clone())
            .part("file", file);

        let response = self
            .http
            .post(&self.upload_url)
            .bearer_auth(&self.bot_token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Ok(NotificationResult::Failed {
                status: Some(status.as_u16()),
                body,
            });
        }

        // Slack reports API errors as 200 with `"ok": false`.
        match serde_json::from_str::<SlackResponse>(&body) {
            Ok(SlackResponse { ok: false }) => Ok(NotificationResult::Failed {
                status: Some(status.as_u16()),
                body,
            }),
            _ => Ok(NotificationResult::Delivered),
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(
        &self,
        verdict: &VerdictPayload,
        image_bytes: &[u8],
        channel: &str,
    ) -> NotificationResult {
        match self.upload(verdict.message(), image_bytes, channel).await {
            Ok(result) => result,
            Err(e) => NotificationResult::Failed {
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            },
        }
    }
}
