use serde::Serialize;

/// Outcome of posting the photo to Slack.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationResult {
    Delivered,
    Failed {
        /// HTTP status, absent when the request never got a response.
        status: Option<u16>,
        body: String,
    },
}

impl NotificationResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationResult::Delivered)
    }
}
