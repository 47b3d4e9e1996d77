//! Recording fakes for the pipeline's external collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use finding_fuji::app_state::AppState;
use finding_fuji::models::event::PhotoShootTime;
use finding_fuji::models::export::{ExportJob, ExportStatus, ExportedAsset};
use finding_fuji::models::notification::NotificationResult;
use finding_fuji::models::verdict::VerdictPayload;
use finding_fuji::pipeline::PipelineSettings;
use finding_fuji::services::export::{ExportError, ImageExporter};
use finding_fuji::services::fetch::{AssetFetcher, FetchError};
use finding_fuji::services::notify::Notifier;
use finding_fuji::services::vision::{ClassifyError, VisionClassifier};

pub const DEVICE_ID: &str = "7C12345678AB";
pub const CHANNEL_ID: &str = "C0123456";

/// Settings with no export wait, a single poll and a generous deadline.
pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        device_id: DEVICE_ID.to_string(),
        channel_id: CHANNEL_ID.to_string(),
        export_wait: Duration::ZERO,
        poll_attempts: 1,
        poll_backoff: Duration::from_millis(10),
        deadline: Duration::from_secs(10),
    }
}

pub fn asset(export_id: &str, status: ExportStatus, url: Option<&str>) -> ExportedAsset {
    ExportedAsset {
        export_id: export_id.to_string(),
        status,
        url: url.map(str::to_string),
        requested_time: None,
        expiry_time: None,
    }
}

/// Exporter answering polls from a script.
pub struct FakeExporter {
    export_id: String,
    polls: Mutex<VecDeque<ExportedAsset>>,
    pub submitted: Mutex<Vec<(String, PhotoShootTime)>>,
    pub poll_count: AtomicUsize,
}

impl FakeExporter {
    pub fn scripted(export_id: &str, polls: Vec<ExportedAsset>) -> Self {
        Self {
            export_id: export_id.to_string(),
            polls: Mutex::new(polls.into()),
            submitted: Mutex::new(Vec::new()),
            poll_count: AtomicUsize::new(0),
        }
    }

    pub fn ready(export_id: &str, url: &str) -> Self {
        Self::scripted(
            export_id,
            vec![asset(export_id, ExportStatus::Completed, Some(url))],
        )
    }

    pub fn polls(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageExporter for FakeExporter {
    async fn submit_export(
        &self,
        device_id: &str,
        time: PhotoShootTime,
    ) -> Result<ExportJob, ExportError> {
        self.submitted
            .lock()
            .unwrap()
            .push((device_id.to_string(), time));
        Ok(ExportJob {
            export_id: self.export_id.clone(),
        })
    }

    async fn poll_export(
        &self,
        _device_id: &str,
        job: &ExportJob,
    ) -> Result<ExportedAsset, ExportError> {
        assert_eq!(job.export_id, self.export_id);
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        let next = self.polls.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| asset(&self.export_id, ExportStatus::Processing, None)))
    }
}

/// Fetcher returning fixed bytes and remembering the URLs it was asked for.
pub struct FakeFetcher {
    bytes: Vec<u8>,
    pub urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn returning(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(self.bytes.clone())
    }
}

/// Classifier returning a canned answer, optionally after a delay.
pub struct FakeClassifier {
    response: String,
    delay: Duration,
    pub images: Mutex<Vec<Vec<u8>>>,
}

impl FakeClassifier {
    pub fn answering(response: &str) -> Self {
        Self {
            response: response.to_string(),
            delay: Duration::ZERO,
            images: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(response: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::answering(response)
        }
    }

    pub fn calls(&self) -> usize {
        self.images.lock().unwrap().len()
    }
}

#[async_trait]
impl VisionClassifier for FakeClassifier {
    async fn classify(&self, image_bytes: &[u8]) -> Result<String, ClassifyError> {
        self.images.lock().unwrap().push(image_bytes.to_vec());
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: String,
    pub image: Vec<u8>,
    pub channel: String,
}

/// Notifier recording every delivery and answering with a fixed result.
pub struct RecordingNotifier {
    result: NotificationResult,
    pub deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingNotifier {
    pub fn delivering() -> Self {
        Self::answering(NotificationResult::Delivered)
    }

    pub fn answering(result: NotificationResult) -> Self {
        Self {
            result,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        verdict: &VerdictPayload,
        image_bytes: &[u8],
        channel: &str,
    ) -> NotificationResult {
        self.deliveries.lock().unwrap().push(Delivery {
            message: verdict.message().to_string(),
            image: image_bytes.to_vec(),
            channel: channel.to_string(),
        });
        self.result.clone()
    }
}

/// Handles to the fakes behind an [`AppState`].
pub struct Fakes {
    pub exporter: Arc<FakeExporter>,
    pub fetcher: Arc<FakeFetcher>,
    pub classifier: Arc<FakeClassifier>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Fakes {
    pub fn new(
        exporter: FakeExporter,
        fetcher: FakeFetcher,
        classifier: FakeClassifier,
        notifier: RecordingNotifier,
    ) -> Self {
        Self {
            exporter: Arc::new(exporter),
            fetcher: Arc::new(fetcher),
            classifier: Arc::new(classifier),
            notifier: Arc::new(notifier),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            exporter: self.exporter.clone(),
            fetcher: self.fetcher.clone(),
            classifier: self.classifier.clone(),
            notifier: self.notifier.clone(),
        }
    }
}
