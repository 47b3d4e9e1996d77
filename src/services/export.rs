use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::AppConfig;
use crate::models::event::PhotoShootTime;
use crate::models::export::{ExportJob, ExportStatus, ExportedAsset};

/// Filters applied to every exported snapshot.
const IMAGE_FILTERS: &str = "[wide_angle_correction]";

/// Job-based snapshot export on the camera service.
#[async_trait]
pub trait ImageExporter: Send + Sync {
    /// Request an export of the snapshot taken at `time`.
    async fn submit_export(
        &self,
        device_id: &str,
        time: PhotoShootTime,
    ) -> Result<ExportJob, ExportError>;

    /// Fetch the current descriptor of a previously submitted export.
    async fn poll_export(
        &self,
        device_id: &str,
        job: &ExportJob,
    ) -> Result<ExportedAsset, ExportError>;
}

/// Exporter that drives the `soracom` CLI.
pub struct SoracomCliExporter {
    program: String,
    auth_key_id: String,
    auth_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    export_id: Option<String>,
}

impl SoracomCliExporter {
    pub fn new(program: String, auth_key_id: String, auth_key: String, timeout: Duration) -> Self {
        Self {
            program,
            auth_key_id,
            auth_key,
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.soracom_cli.clone(),
            config.soracom_auth_key_id.clone(),
            config.soracom_auth_key.clone(),
            config.soracom_command_timeout(),
        )
    }

    fn with_auth(&self, mut args: Vec<String>) -> Vec<String> {
        args.extend([
            "--auth-key-id".to_string(),
            self.auth_key_id.clone(),
            "--auth-key".to_string(),
            self.auth_key.clone(),
        ]);
        args
    }

    /// Run the CLI and return its stdout. Arguments are passed as a vector, never through a shell.
    async fn run(&self, operation: &'static str, args: Vec<String>) -> Result<Vec<u8>, ExportError> {
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ExportError::Spawn {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_secs = self.timeout.as_secs(),
                    "soracom CLI timed out, process killed"
                );
                return Err(ExportError::CommandTimeout {
                    operation,
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::CommandFailed {
                operation,
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

/// Arguments for `soracom sora-cam devices images export`, without credentials.
pub fn export_args(device_id: &str, time: PhotoShootTime) -> Vec<String> {
    vec![
        "sora-cam".to_string(),
        "devices".to_string(),
        "images".to_string(),
        "export".to_string(),
        "--image-filters".to_string(),
        IMAGE_FILTERS.to_string(),
        "--device-id".to_string(),
        device_id.to_string(),
        "--time".to_string(),
        time.to_string(),
    ]
}

/// Arguments for `soracom sora-cam devices images get-exported`, without credentials.
pub fn get_exported_args(device_id: &str, export_id: &str) -> Vec<String> {
    vec![
        "sora-cam".to_string(),
        "devices".to_string(),
        "images".to_string(),
        "get-exported".to_string(),
        "--device-id".to_string(),
        device_id.to_string(),
        "--export-id".to_string(),
        export_id.to_string(),
    ]
}

pub fn parse_submit_output(stdout: &[u8]) -> Result<ExportJob, ExportError> {
    let response: SubmitResponse =
        serde_json::from_slice(stdout).map_err(|source| ExportError::Output {
            operation: "export",
            source,
        })?;

    match response.export_id {
        Some(export_id) if !export_id.is_empty() => Ok(ExportJob { export_id }),
        _ => Err(ExportError::MissingExportId),
    }
}

pub fn parse_poll_output(stdout: &[u8]) -> Result<ExportedAsset, ExportError> {
    serde_json::from_slice(stdout).map_err(|source| ExportError::Output {
        operation: "get-exported",
        source,
    })
}

#[async_trait]
impl ImageExporter for SoracomCliExporter {
    async fn submit_export(
        &self,
        device_id: &str,
        time: PhotoShootTime,
    ) -> Result<ExportJob, ExportError> {
        let stdout = self
            .run("export", self.with_auth(export_args(device_id, time)))
            .await?;
        let job = parse_submit_output(&stdout)?;

        tracing::debug!(device_id, export_id = %job.export_id, "Export submitted");
        Ok(job)
    }

    async fn poll_export(
        &self,
        device_id: &str,
        job: &ExportJob,
    ) -> Result<ExportedAsset, ExportError> {
        let stdout = self
            .run(
                "get-exported",
                self.with_auth(get_exported_args(device_id, &job.export_id)),
            )
            .await?;
        parse_poll_output(&stdout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("soracom {operation} exited with {code:?}: {stderr}")]
    CommandFailed {
        operation: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("soracom {operation} did not finish within {timeout:?}")]
    CommandTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Unparsable output from soracom {operation}: {source}")]
    Output {
        operation: &'static str,
        source: serde_json::Error,
    },

    #[error("Export response did not contain an exportId")]
    MissingExportId,

    #[error("Export {export_id} ended with status {status}")]
    JobFailed {
        export_id: String,
        status: ExportStatus,
    },

    #[error("Export {export_id} had no download URL after {attempts} poll(s)")]
    NotReady { export_id: String, attempts: u32 },
}
