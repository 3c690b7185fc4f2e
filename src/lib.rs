pub mod background;
pub mod export;
pub mod generation;
pub mod models;
pub mod navigation;
pub mod page;
pub mod settings;
pub mod storage;
pub mod store;
pub mod utils;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use generation::{GenerationController, MockGenerator};
use navigation::{NavigationWatcher, WatcherHandle};
use page::{
    MutationSource, PageChrome, PageEvent, PageEventBus, PageLocation, PlayerBridge, PlayerHost,
    VideoId,
};
use settings::LearnerSettings;
use storage::DurableStorage;
use store::{AppStore, SharedStore};

/// Everything the overlay needs from the page it is mounted into.
#[derive(Clone)]
pub struct HostServices {
    pub location: Arc<dyn PageLocation>,
    pub mutations: Arc<dyn MutationSource>,
    /// Storage the host already owns. `None` opens the backend named in
    /// `LearnerSettings`.
    pub storage: Option<Arc<dyn DurableStorage>>,
    pub chrome: Option<Arc<dyn PageChrome>>,
    pub player: Option<Arc<dyn PlayerHost>>,
}

/// A mounted overlay: store, navigation watcher and bridge listener.
pub struct LearnerApp {
    store: SharedStore,
    player: PlayerBridge,
    generation: GenerationController,
    page_events: PageEventBus,
    watcher: WatcherHandle,
    cancel_token: CancellationToken,
    listener: JoinHandle<()>,
    settings: LearnerSettings,
}

impl LearnerApp {
    /// Must be called from within a tokio runtime.
    pub fn mount(host: HostServices, settings: LearnerSettings) -> Result<Self> {
        utils::logging::init();
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| anyhow!("overlay must be mounted inside a tokio runtime: {err}"))?;

        let storage = host
            .storage
            .clone()
            .unwrap_or_else(|| settings.open_storage());
        let mut store = AppStore::new(storage, host.chrome.clone());
        let href = host.location.href();
        if let Some(video_id) = settings.watch_pattern.classify(&href) {
            store.set_current_video_id(Some(video_id));
        }
        let store = store.into_shared();

        // Watcher callbacks and bridge events funnel through one channel so
        // they are applied in arrival order.
        let (video_tx, video_rx) = mpsc::unbounded_channel::<Option<VideoId>>();

        let watcher = NavigationWatcher::new(
            host.location.clone(),
            host.mutations.clone(),
            settings.watch_pattern.clone(),
            settings.observe_scope,
        )
        .start(move |video_id| {
            let _ = video_tx.send(video_id);
        })
        .context("Failed to start navigation watcher")?;

        let page_events = PageEventBus::new();
        let cancel_token = CancellationToken::new();
        let listener = runtime.spawn(apply_video_changes(
            store.clone(),
            video_rx,
            page_events.subscribe(),
            cancel_token.clone(),
        ));

        let player = host
            .player
            .map(PlayerBridge::new)
            .unwrap_or_else(PlayerBridge::detached);
        let generation =
            GenerationController::new(store.clone(), MockGenerator::new(settings.generation))
                .with_default_quiz_questions(settings.default_quiz_questions);

        info!("overlay mounted at {href}");

        Ok(Self {
            store,
            player,
            generation,
            page_events,
            watcher,
            cancel_token,
            listener,
            settings,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn player(&self) -> &PlayerBridge {
        &self.player
    }

    pub fn generation(&self) -> &GenerationController {
        &self.generation
    }

    /// Background messages for this tab are dispatched here.
    pub fn page_events(&self) -> &PageEventBus {
        &self.page_events
    }

    pub fn settings(&self) -> &LearnerSettings {
        &self.settings
    }

    /// Stop watching, drop back to default state and clear the focus class.
    /// Persisted preferences and notes stay in storage.
    pub async fn unmount(self) -> Result<()> {
        self.watcher.shutdown().await?;
        self.cancel_token.cancel();
        self.listener
            .await
            .context("video change listener failed to join")?;
        self.store.lock().await.reset();
        info!("overlay unmounted");
        Ok(())
    }
}

async fn apply_video_changes(
    store: SharedStore,
    mut from_watcher: mpsc::UnboundedReceiver<Option<VideoId>>,
    mut from_bridge: broadcast::Receiver<PageEvent>,
    cancel_token: CancellationToken,
) {
    loop {
        let video_id = tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            next = from_watcher.recv() => match next {
                Some(video_id) => video_id,
                // Watcher stopped; unmount is underway.
                None => break,
            },
            event = from_bridge.recv() => match event {
                Ok(PageEvent::VideoChanged { video_id }) => video_id,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("bridge listener lagged by {skipped} events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        store.lock().await.set_current_video_id(video_id);
    }
    debug!("video change listener exited");
}
