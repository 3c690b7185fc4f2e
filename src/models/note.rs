use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::page::VideoId;

/// A timestamped annotation on a video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserNote {
    pub id: String,
    pub video_id: VideoId,
    /// Display label, normally `MM:SS`. Users may edit it freely.
    pub timestamp: String,
    pub seconds: u64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl UserNote {
    pub fn new(video_id: VideoId, seconds: u64, text: impl Into<String>) -> Self {
        Self::with_label(video_id, format_timestamp(seconds), seconds, text)
    }

    pub fn with_label(
        video_id: VideoId,
        timestamp: impl Into<String>,
        seconds: u64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            video_id,
            timestamp: timestamp.into(),
            seconds,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// `MM:SS`, minutes zero-padded to two digits and allowed to grow past 99.
pub fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
