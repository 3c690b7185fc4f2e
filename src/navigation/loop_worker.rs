use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::page::{url_inspector::WatchPattern, MutationReceiver, PageLocation, VideoId};

use super::tracker::WatcherSnapshot;

// Set to false to silence navigation tracing in this module.
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub type NavigationCallback = Box<dyn FnMut(Option<VideoId>) + Send + 'static>;

/// State shared between a running loop and its handle.
pub(super) struct WatcherShared {
    pattern: WatchPattern,
    snapshot: Mutex<WatcherSnapshot>,
    /// `None` once stopped. Held locked while the callback runs so that
    /// `stop()` cannot return during an in-flight callback.
    callback: Mutex<Option<NavigationCallback>>,
}

impl WatcherShared {
    pub(super) fn new(
        pattern: WatchPattern,
        snapshot: WatcherSnapshot,
        callback: NavigationCallback,
    ) -> Self {
        Self {
            pattern,
            snapshot: Mutex::new(snapshot),
            callback: Mutex::new(Some(callback)),
        }
    }

    /// Re-check the location. Returns false once the watcher has been stopped.
    pub(super) fn check(&self, href: &str) -> bool {
        let mut slot = lock(&self.callback);
        let Some(callback) = slot.as_mut() else {
            return false;
        };

        let event = lock(&self.snapshot).observe(href, &self.pattern);
        if let Some(event) = event {
            log_info!("navigation detected: {href} -> {:?}", event.video_id);
            callback(event.video_id);
        }
        true
    }

    pub(super) fn detach(&self) -> bool {
        lock(&self.callback).take().is_some()
    }

    pub(super) fn is_attached(&self) -> bool {
        lock(&self.callback).is_some()
    }

    pub(super) fn last_url(&self) -> String {
        lock(&self.snapshot).last_url().to_string()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub(super) async fn navigation_loop(
    location: Arc<dyn PageLocation>,
    mut mutations: MutationReceiver,
    shared: Arc<WatcherShared>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_debug!("navigation loop cancelled");
                break;
            }
            signal = mutations.recv() => {
                let Some(signal) = signal else {
                    log_debug!("mutation stream closed; navigation loop exiting");
                    break;
                };

                // Collapse whatever else is already queued: one location read
                // covers the whole burst.
                let mut records = u64::from(signal.records);
                let mut bursts = 1u32;
                while let Ok(more) = mutations.try_recv() {
                    records += u64::from(more.records);
                    bursts += 1;
                }
                log_debug!("mutation burst: {bursts} signals, {records} records");

                if !shared.check(&location.href()) {
                    break;
                }
            }
        }
    }
}
