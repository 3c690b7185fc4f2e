use serde::{Deserialize, Serialize};

use crate::page::VideoId;

pub type TabId = i32;

/// Message sent from the background context into a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageMessage {
    NewVideo {
        #[serde(rename = "videoId")]
        video_id: Option<VideoId>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TabStatus {
    Loading,
    Complete,
}

/// One tab lifecycle notification, the shape of `tabs.onUpdated` folded into
/// a single value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    pub tab_id: TabId,
    pub status: Option<TabStatus>,
    pub url: Option<String>,
}

impl TabUpdate {
    pub fn loading(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            status: Some(TabStatus::Loading),
            url: Some(url.into()),
        }
    }

    pub fn complete(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            status: Some(TabStatus::Complete),
            url: Some(url.into()),
        }
    }
}
