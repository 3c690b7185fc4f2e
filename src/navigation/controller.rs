use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::page::{
    url_inspector::WatchPattern, MutationSource, ObserveScope, PageLocation, VideoId,
};

use super::{
    loop_worker::{navigation_loop, NavigationCallback, WatcherShared},
    tracker::WatcherSnapshot,
};

/// Detects in-place (SPA) navigation between videos.
///
/// Each `start` creates an independent watcher with its own snapshot, so any
/// number of watchers can run against the same page.
#[derive(Clone)]
pub struct NavigationWatcher {
    location: Arc<dyn PageLocation>,
    mutations: Arc<dyn MutationSource>,
    pattern: WatchPattern,
    scope: ObserveScope,
}

impl NavigationWatcher {
    pub fn new(
        location: Arc<dyn PageLocation>,
        mutations: Arc<dyn MutationSource>,
        pattern: WatchPattern,
        scope: ObserveScope,
    ) -> Self {
        Self {
            location,
            mutations,
            pattern,
            scope,
        }
    }

    pub fn scope(&self) -> ObserveScope {
        self.scope
    }

    /// Begin observing. The current URL is captured before this returns and
    /// no callback fires for it; callers do their own initial check.
    ///
    /// `on_change` receives the new video id, or `None` when navigation left
    /// the watch page. It must not call `stop()` on its own handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, on_change: F) -> Result<WatcherHandle>
    where
        F: FnMut(Option<VideoId>) + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| anyhow!("navigation watcher needs a tokio runtime: {err}"))?;

        let snapshot = WatcherSnapshot::capture(self.location.href());
        info!(
            "starting navigation watcher at {} (scope: {})",
            snapshot.last_url(),
            self.scope.as_str()
        );

        let callback: NavigationCallback = Box::new(on_change);
        let shared = Arc::new(WatcherShared::new(self.pattern.clone(), snapshot, callback));
        let receiver = self.mutations.subscribe(self.scope);
        let cancel_token = CancellationToken::new();

        let task = runtime.spawn(navigation_loop(
            self.location.clone(),
            receiver,
            shared.clone(),
            cancel_token.clone(),
        ));

        Ok(WatcherHandle {
            shared,
            cancel_token,
            task: Mutex::new(Some(task)),
        })
    }
}

/// Handle to a running watcher. Dropping it stops the watcher.
pub struct WatcherHandle {
    shared: Arc<WatcherShared>,
    cancel_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WatcherHandle {
    /// Detach from the page. Once this returns no further callback fires.
    /// Calling it again is a no-op.
    pub fn stop(&self) {
        if self.shared.detach() {
            debug!("navigation watcher stopped");
        }
        self.cancel_token.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_attached()
    }

    /// URL the watcher last acted on.
    pub fn last_url(&self) -> String {
        self.shared.last_url()
    }

    /// Stop and wait for the observation task to finish.
    pub async fn shutdown(self) -> Result<()> {
        self.stop();
        let task = match self.task.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match task {
            Some(handle) => handle
                .await
                .context("navigation loop task failed to join"),
            None => Ok(()),
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
