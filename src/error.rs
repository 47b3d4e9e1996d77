use std::time::Duration;
use strum::Display;

use crate::config::ConfigError;
use crate::services::{
    export::ExportError, fetch::FetchError, verdict::VerdictError, vision::ClassifyError,
};

/// Failure categories an invocation can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    Configuration,
    ExternalCommand,
    Network,
    Format,
    Timeout,
}

/// Error that aborts an invocation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Image download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Could not read verdict: {0}")]
    Verdict(#[from] VerdictError),

    #[error("Invocation exceeded its {0:?} deadline")]
    Deadline(Duration),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(_) => ErrorKind::Configuration,
            PipelineError::Export(ExportError::NotReady { .. }) => ErrorKind::Timeout,
            PipelineError::Export(_) => ErrorKind::ExternalCommand,
            PipelineError::Fetch(_) => ErrorKind::Network,
            PipelineError::Classify(ClassifyError::EmptyResponse) => ErrorKind::Format,
            PipelineError::Classify(_) => ErrorKind::Network,
            PipelineError::Verdict(_) => ErrorKind::Format,
            PipelineError::Deadline(_) => ErrorKind::Timeout,
        }
    }
}
