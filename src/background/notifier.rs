use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::Result;

use crate::page::{url_inspector::WatchPattern, VideoId};

use super::messages::{PageMessage, TabId, TabStatus, TabUpdate};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Privileged extension messaging (`tabs.sendMessage`).
pub trait MessageChannel: Send + Sync {
    fn send_to_tab(&self, tab_id: TabId, message: &PageMessage) -> Result<()>;
}

/// Background-context relay: full page loads of watch pages become one
/// `NEW_VIDEO` message to the page.
///
/// Without a messaging channel every method is a no-op.
pub struct CrossContextNotifier {
    channel: Option<Arc<dyn MessageChannel>>,
    pattern: WatchPattern,
    /// URL of the completed load already relayed, per tab. Cleared when the
    /// tab starts loading again.
    relayed: Mutex<HashMap<TabId, String>>,
}

impl CrossContextNotifier {
    pub fn new(channel: Option<Arc<dyn MessageChannel>>, pattern: WatchPattern) -> Self {
        Self {
            channel,
            pattern,
            relayed: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    pub fn on_installed(&self) {
        log_info!("video learner extension installed");
    }

    /// Handle one tab lifecycle event. Returns true when a message was sent.
    pub fn handle_tab_update(&self, update: &TabUpdate) -> bool {
        let Some(channel) = self.channel.as_ref() else {
            return false;
        };

        match update.status {
            Some(TabStatus::Loading) => {
                self.relayed().remove(&update.tab_id);
                false
            }
            Some(TabStatus::Complete) => {
                let Some(url) = update.url.as_deref() else {
                    return false;
                };
                if !self.pattern.matches(url) {
                    self.relayed().remove(&update.tab_id);
                    return false;
                }

                {
                    let mut relayed = self.relayed();
                    if relayed.get(&update.tab_id).map(String::as_str) == Some(url) {
                        log_debug!("tab {} load of {url} already relayed", update.tab_id);
                        return false;
                    }
                    relayed.insert(update.tab_id, url.to_string());
                }

                let video_id: Option<VideoId> = self.pattern.classify(url);
                let message = PageMessage::NewVideo { video_id };
                match channel.send_to_tab(update.tab_id, &message) {
                    Ok(()) => {
                        log_debug!("relayed {message:?} to tab {}", update.tab_id);
                        true
                    }
                    Err(err) => {
                        log_warn!("failed to notify tab {}: {err:#}", update.tab_id);
                        false
                    }
                }
            }
            None => false,
        }
    }

    pub fn tab_removed(&self, tab_id: TabId) {
        self.relayed().remove(&tab_id);
    }

    fn relayed(&self) -> MutexGuard<'_, HashMap<TabId, String>> {
        match self.relayed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
