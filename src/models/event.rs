use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event handed to the invocation by its scheduler.
///
/// On-demand runs may pin the snapshot time; scheduled runs leave it empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub photo_shoot_time: Option<i64>,
}

/// Snapshot time in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoShootTime(i64);

impl PhotoShootTime {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Use the event's time if present, otherwise `now` truncated to whole seconds.
    pub fn resolve(event: &InvocationEvent, now: DateTime<Utc>) -> Self {
        match event.photo_shoot_time {
            Some(millis) => Self(millis),
            None => Self(now.timestamp() * 1000),
        }
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PhotoShootTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
