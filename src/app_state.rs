use std::sync::Arc;

use crate::config::{AppConfig, ConfigError};
use crate::services::{
    export::{ImageExporter, SoracomCliExporter},
    fetch::{AssetFetcher, HttpAssetFetcher},
    notify::{Notifier, SlackNotifier},
    vision::{OpenAiVisionClient, VisionClassifier},
};

/// External collaborators used by one invocation.
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<dyn ImageExporter>,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub classifier: Arc<dyn VisionClassifier>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(
        exporter: impl ImageExporter + 'static,
        fetcher: impl AssetFetcher + 'static,
        classifier: impl VisionClassifier + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            exporter: Arc::new(exporter),
            fetcher: Arc::new(fetcher),
            classifier: Arc::new(classifier),
            notifier: Arc::new(notifier),
        }
    }

    /// Wire up the production clients.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            SoracomCliExporter::from_config(config),
            HttpAssetFetcher::new(config.requests_timeout())?,
            OpenAiVisionClient::from_config(config)?,
            SlackNotifier::from_config(config)?,
        ))
    }
}
