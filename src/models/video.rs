use serde::{Deserialize, Serialize};

use crate::page::VideoId;

/// A chapter marker inside a summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeStamp {
    /// `MM:SS` label.
    pub time: String,
    pub text: String,
    pub seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub title: String,
    pub transcript: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub language: String,
    pub video_id: VideoId,
    pub thumbnail_url: String,
    pub channel_name: String,
    pub video_url: String,
    pub timestamps: Vec<TimeStamp>,
}
