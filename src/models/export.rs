use serde::{Deserialize, Serialize};
use strum::Display;

/// State of a Soracom Cloud Camera image export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ExportStatus {
    Initialized,
    Processing,
    Completed,
    Failed,
    LimitExceeded,
    #[serde(other)]
    Unknown,
}

impl ExportStatus {
    /// The export will never produce an asset.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, ExportStatus::Failed | ExportStatus::LimitExceeded)
    }
}

/// Handle for an export request, consumed by the following poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub export_id: String,
}

/// Export descriptor as reported by `get-exported`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAsset {
    /// Not always echoed back; the caller already holds it in [`ExportJob`].
    #[serde(default)]
    pub export_id: String,
    #[serde(default = "unknown_status")]
    pub status: ExportStatus,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub requested_time: Option<i64>,
    #[serde(default)]
    pub expiry_time: Option<i64>,
}

fn unknown_status() -> ExportStatus {
    ExportStatus::Unknown
}

impl ExportedAsset {
    /// Download URL, once the export has finished.
    pub fn download_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }
}
