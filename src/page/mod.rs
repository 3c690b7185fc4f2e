//! Host page abstractions.
//!
//! The overlay never touches a browser API directly. A host (a wasm content
//! script in production, fakes in tests) provides these capabilities.

pub mod bridge;
pub mod player;
pub mod url_inspector;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub use bridge::{PageEvent, PageEventBus};
pub use player::{MediaElement, PlayerApi, PlayerBridge, PlayerHost};
pub use url_inspector::{extract_video_id, is_watch_page, VideoId, WatchPattern};

/// Read access to the page's current location.
pub trait PageLocation: Send + Sync {
    /// Full URL string, as `window.location.href` would report it.
    fn href(&self) -> String;
}

/// Portion of the document whose mutations are observed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ObserveScope {
    /// The `<title>` node. Changes on every SPA route switch and rarely otherwise.
    #[default]
    TitleNode,
    /// The whole `<body>` subtree. Every ad, recommendation and chat line fires.
    DocumentBody,
}

impl ObserveScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObserveScope::TitleNode => "title",
            ObserveScope::DocumentBody => "body",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" | "titlenode" => Some(ObserveScope::TitleNode),
            "body" | "documentbody" => Some(ObserveScope::DocumentBody),
            _ => None,
        }
    }
}

/// One raw "something changed" notification from the host document.
///
/// Carries no information about what changed; the navigation watcher only
/// uses it as a prompt to re-read the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationSignal {
    /// Number of mutation records batched into this notification.
    pub records: u32,
}

pub type MutationReceiver = mpsc::UnboundedReceiver<MutationSignal>;

/// Subscription to DOM mutation notifications.
pub trait MutationSource: Send + Sync {
    /// Start observing `scope`. Observation ends when the receiver is dropped.
    fn subscribe(&self, scope: ObserveScope) -> MutationReceiver;
}

/// Page-level presentation hooks (class toggles on `<body>`).
pub trait PageChrome: Send + Sync {
    fn set_class(&self, class_name: &str, enabled: bool);
}
