use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::Instrument;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::models::event::{InvocationEvent, PhotoShootTime};
use crate::models::export::ExportJob;
use crate::models::notification::NotificationResult;
use crate::models::verdict::VerdictPayload;
use crate::services::export::ExportError;
use crate::services::verdict::parse_verdict;

/// Per-invocation knobs taken from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub device_id: String,
    pub channel_id: String,
    /// Fixed wait between export submission and the first poll.
    pub export_wait: Duration,
    pub poll_attempts: u32,
    /// Wait before the second poll; doubles for each later one.
    pub poll_backoff: Duration,
    pub deadline: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            device_id: config.device_id.clone(),
            channel_id: config.slack_channel_id.clone(),
            export_wait: config.export_wait(),
            poll_attempts: config.export_poll_attempts,
            poll_backoff: config.export_poll_backoff(),
            deadline: config.invocation_deadline(),
        }
    }
}

/// What one invocation did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub photo_shoot_time: PhotoShootTime,
    pub export_id: String,
    pub image_size: usize,
    pub verdict: VerdictPayload,
    pub notification: NotificationResult,
}

/// Export → fetch → classify → parse → notify, strictly in sequence.
pub struct Pipeline {
    state: AppState,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(state: AppState, settings: PipelineSettings) -> Self {
        Self { state, settings }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(
            AppState::from_config(config)?,
            PipelineSettings::from_config(config),
        ))
    }

    /// Run one invocation under the configured deadline.
    ///
    /// `now` is only used when the event carries no `photo_shoot_time`.
    pub async fn run(
        &self,
        event: &InvocationEvent,
        now: DateTime<Utc>,
    ) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "invocation",
            %run_id,
            device_id = %self.settings.device_id
        );

        let deadline = self.settings.deadline;
        match tokio::time::timeout(deadline, self.run_stages(event, now))
            .instrument(span)
            .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(%run_id, deadline_secs = deadline.as_secs_f64(), "Invocation deadline exceeded");
                Err(PipelineError::Deadline(deadline))
            }
        }
    }

    async fn run_stages(
        &self,
        event: &InvocationEvent,
        now: DateTime<Utc>,
    ) -> Result<RunReport, PipelineError> {
        let photo_shoot_time = PhotoShootTime::resolve(event, now);

        tracing::info!(%photo_shoot_time, "Exporting image from Soracom Cloud Camera Service");
        let (job, url) = self.export(photo_shoot_time).await?;

        let image_bytes = self.state.fetcher.fetch(&url).await?;
        tracing::info!(export_id = %job.export_id, bytes = image_bytes.len(), "Image downloaded");

        tracing::info!("Detecting Mt. Fuji in the image");
        let raw = self.state.classifier.classify(&image_bytes).await?;
        let verdict = parse_verdict(&raw)?;
        tracing::info!(found_mt_fuji = verdict.found_mt_fuji, "Verdict parsed");

        tracing::info!(channel = %self.settings.channel_id, "Posting the result to Slack");
        let notification = self
            .state
            .notifier
            .notify(&verdict, &image_bytes, &self.settings.channel_id)
            .await;

        // A failed post is logged and reported, never raised.
        match &notification {
            NotificationResult::Delivered => tracing::info!("File uploaded successfully"),
            NotificationResult::Failed { status, body } => tracing::warn!(
                status = ?status,
                response = %body,
                "Failed to upload the file"
            ),
        }

        Ok(RunReport {
            photo_shoot_time,
            export_id: job.export_id,
            image_size: image_bytes.len(),
            verdict,
            notification,
        })
    }

    /// Submit the export, wait, then poll until the asset has a URL or the
    /// poll budget is spent.
    async fn export(&self, time: PhotoShootTime) -> Result<(ExportJob, String), PipelineError> {
        let device_id = &self.settings.device_id;
        let job = self.state.exporter.submit_export(device_id, time).await?;
        tracing::info!(export_id = %job.export_id, "Export submitted");

        sleep(self.settings.export_wait).await;

        let attempts = self.settings.poll_attempts.max(1);
        for attempt in 1..=attempts {
            let asset = self.state.exporter.poll_export(device_id, &job).await?;

            if asset.status.is_terminal_failure() {
                return Err(ExportError::JobFailed {
                    export_id: job.export_id.clone(),
                    status: asset.status,
                }
                .into());
            }

            if let Some(url) = asset.download_url() {
                let url = url.to_string();
                tracing::debug!(export_id = %job.export_id, attempt, "Export ready");
                return Ok((job, url));
            }

            if attempt < attempts {
                let backoff = poll_backoff(self.settings.poll_backoff, attempt);
                tracing::info!(
                    export_id = %job.export_id,
                    status = %asset.status,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Export not ready, polling again"
                );
                sleep(backoff).await;
            }
        }

        Err(ExportError::NotReady {
            export_id: job.export_id,
            attempts,
        }
        .into())
    }
}

/// Wait after the `attempt`-th poll: `base * 2^(attempt - 1)`, saturating.
fn poll_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}
