use garde::Validate;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    /// Soracom auth key ID passed to the `soracom` CLI
    #[garde(length(min = 1))]
    pub soracom_auth_key_id: String,

    /// Soracom auth key passed to the `soracom` CLI
    #[garde(length(min = 1))]
    pub soracom_auth_key: String,

    /// Soracom Cloud Camera device to export snapshots from
    #[garde(length(min = 1))]
    pub device_id: String,

    /// Slack bot token (`xoxb-...`)
    #[garde(length(min = 1))]
    pub slack_bot_token: String,

    /// Slack channel that receives the photo
    #[garde(length(min = 1))]
    pub slack_channel_id: String,

    /// OpenAI API key for the vision model
    #[garde(length(min = 1))]
    pub openai_api_key: String,

    /// Path or name of the `soracom` CLI binary
    #[serde(default = "default_soracom_cli")]
    #[garde(length(min = 1))]
    pub soracom_cli: String,

    #[serde(default = "default_soracom_command_timeout_secs")]
    #[garde(range(min = 1))]
    pub soracom_command_timeout_secs: u64,

    /// Fixed wait between export submission and the first poll
    #[serde(default = "default_export_wait_secs")]
    #[garde(skip)]
    pub export_wait_secs: u64,

    /// Number of polls before giving up on an export. 1 means a single poll.
    #[serde(default = "default_export_poll_attempts")]
    #[garde(range(min = 1, max = 10))]
    pub export_poll_attempts: u32,

    #[serde(default = "default_export_poll_backoff_ms")]
    #[garde(skip)]
    pub export_poll_backoff_ms: u64,

    /// Timeout for the asset download and the Slack upload
    #[serde(default = "default_requests_timeout_secs")]
    #[garde(range(min = 1))]
    pub requests_timeout_secs: u64,

    #[serde(default = "default_openai_base_url")]
    #[garde(length(min = 1))]
    pub openai_base_url: String,

    #[serde(default = "default_openai_model")]
    #[garde(length(min = 1))]
    pub openai_model: String,

    #[serde(default = "default_classify_timeout_secs")]
    #[garde(range(min = 1))]
    pub classify_timeout_secs: u64,

    #[serde(default = "default_slack_upload_url")]
    #[garde(length(min = 1))]
    pub slack_upload_url: String,

    /// Upper bound on a whole invocation, all stages included
    #[serde(default = "default_invocation_deadline_secs")]
    #[garde(range(min = 1))]
    pub invocation_deadline_secs: u64,
}

fn default_soracom_cli() -> String {
    "soracom".to_string()
}

fn default_soracom_command_timeout_secs() -> u64 {
    30
}

fn default_export_wait_secs() -> u64 {
    2
}

fn default_export_poll_attempts() -> u32 {
    1
}

fn default_export_poll_backoff_ms() -> u64 {
    1000
}

fn default_requests_timeout_secs() -> u64 {
    10
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_classify_timeout_secs() -> u64 {
    60
}

fn default_slack_upload_url() -> String {
    "https://slack.com/api/files.upload".to_string()
}

fn default_invocation_deadline_secs() -> u64 {
    120
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Build from an explicit set of variables instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn export_wait(&self) -> Duration {
        Duration::from_secs(self.export_wait_secs)
    }

    pub fn export_poll_backoff(&self) -> Duration {
        Duration::from_millis(self.export_poll_backoff_ms)
    }

    pub fn soracom_command_timeout(&self) -> Duration {
        Duration::from_secs(self.soracom_command_timeout_secs)
    }

    pub fn requests_timeout(&self) -> Duration {
        Duration::from_secs(self.requests_timeout_secs)
    }

    pub fn classify_timeout(&self) -> Duration {
        Duration::from_secs(self.classify_timeout_secs)
    }

    pub fn invocation_deadline(&self) -> Duration {
        Duration::from_secs(self.invocation_deadline_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
