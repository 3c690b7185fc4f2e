use tokio::sync::broadcast;

use crate::background::PageMessage;

use super::VideoId;

const EVENT_CAPACITY: usize = 32;

/// Local page-context event, re-dispatched from background messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    VideoChanged { video_id: Option<VideoId> },
}

/// Page-context side of the background channel: turns incoming messages into
/// local events any number of listeners can subscribe to.
#[derive(Clone)]
pub struct PageEventBus {
    sender: broadcast::Sender<PageEvent>,
}

impl Default for PageEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PageEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.sender.subscribe()
    }

    /// Returns how many listeners received the event.
    pub fn dispatch_message(&self, message: &PageMessage) -> usize {
        let event = match message {
            PageMessage::NewVideo { video_id } => PageEvent::VideoChanged {
                video_id: video_id.clone(),
            },
        };

        // No listeners yet is fine; the app performs its own initial check.
        self.sender.send(event).unwrap_or(0)
    }

    /// Parse a raw runtime message and dispatch it. Anything that is not a
    /// known message is dropped.
    pub fn dispatch_json(&self, raw: &str) -> usize {
        match serde_json::from_str::<PageMessage>(raw) {
            Ok(message) => self.dispatch_message(&message),
            Err(err) => {
                log::debug!("ignoring unrecognised runtime message: {err}");
                0
            }
        }
    }
}
