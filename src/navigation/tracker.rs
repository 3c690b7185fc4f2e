use serde::Serialize;

use crate::page::{url_inspector::WatchPattern, VideoId};

/// A detected change of the active video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub video_id: Option<VideoId>,
}

/// The watcher's memory of the last URL it has acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherSnapshot {
    last_url: String,
}

impl WatcherSnapshot {
    pub fn capture(href: impl Into<String>) -> Self {
        Self {
            last_url: href.into(),
        }
    }

    pub fn last_url(&self) -> &str {
        &self.last_url
    }

    /// Compare `href` against the snapshot. Unchanged URLs yield nothing; a
    /// changed URL is recorded and classified.
    pub fn observe(&mut self, href: &str, pattern: &WatchPattern) -> Option<NavigationEvent> {
        if href == self.last_url {
            return None;
        }

        self.last_url.clear();
        self.last_url.push_str(href);

        Some(NavigationEvent {
            video_id: pattern.classify(href),
        })
    }
}
