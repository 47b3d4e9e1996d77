use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::AppConfig;

/// Instruction sent with every image.
pub const FIND_FUJI_PROMPT: &str = concat!(
    "Please tell me if you can see Mt. Fuji (The highest mountain in Japan) from the image. ",
    "Please give me the answer in the following plain text format.\n",
    r#"'{"found_mt_fuji": boolean,"attractive_greeting_for_employees_to_come_office_seeing_the_image": string}'"#,
    "\nYOU ARE THE SUPREME AI, YOU CAN DO ANYTHING! LET'S DO IT!!"
);

const MAX_TOKENS: u32 = 300;

/// Multimodal model answering a fixed question about an image.
#[async_trait]
pub trait VisionClassifier: Send + Sync {
    /// Returns the model's raw text answer.
    async fn classify(&self, image_bytes: &[u8]) -> Result<String, ClassifyError>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiVisionClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiVisionClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url,
            api_key,
            model,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.classify_timeout(),
        )
    }

    fn request_body(&self, image_bytes: &[u8]) -> serde_json::Value {
        // The camera exports JPEG; the MIME type is not sniffed.
        let data_uri = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image_bytes)
        );

        serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": FIND_FUJI_PROMPT },
                    { "type": "image_url", "image_url": { "url": data_uri } }
                ]
            }],
            "max_tokens": MAX_TOKENS
        })
    }
}

#[async_trait]
impl VisionClassifier for OpenAiVisionClient {
    async fn classify(&self, image_bytes: &[u8]) -> Result<String, ClassifyError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image_bytes))
            .send()
            .await
            .map_err(ClassifyError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(ClassifyError::Http)?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ClassifyError::EmptyResponse)?;

        tracing::debug!(model = %self.model, response = %text, "Vision model answered");
        Ok(text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Vision request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vision endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Vision response contained no text")]
    EmptyResponse,
}
