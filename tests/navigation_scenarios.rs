//! End-to-end overlay behaviour against a scripted host page.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::mpsc;
use video_learner_lib::{
    background::{CrossContextNotifier, MessageChannel, PageMessage, TabId, TabUpdate},
    generation::{GenerationDelays, GenerationOutcome},
    navigation::NavigationWatcher,
    page::{
        MediaElement, MutationReceiver, MutationSignal, MutationSource, ObserveScope, PageChrome,
        PageLocation, PlayerHost, VideoId, WatchPattern,
    },
    settings::LearnerSettings,
    storage::{open_storage, DurableStorage, MemoryStorage, StorageBackend, NOTES_KEY},
    store::FOCUS_MODE_CLASS,
    HostServices, LearnerApp,
};

const ABC: &str = "https://www.youtube.com/watch?v=abc123";
const XYZ: &str = "https://www.youtube.com/watch?v=xyz789";
const HOME: &str = "https://www.youtube.com/";

#[derive(Default)]
struct ScriptedPage {
    href: Mutex<String>,
    observers: Mutex<Vec<mpsc::UnboundedSender<MutationSignal>>>,
    classes: Mutex<Vec<(String, bool)>>,
    media_time: Mutex<f64>,
}

impl ScriptedPage {
    fn at(href: &str) -> Arc<Self> {
        let page = Arc::new(Self::default());
        *page.href.lock().unwrap() = href.to_string();
        page
    }

    /// Route change plus the burst of DOM mutations that comes with it.
    fn navigate(&self, href: &str) {
        *self.href.lock().unwrap() = href.to_string();
        self.churn(25);
    }

    fn churn(&self, times: usize) {
        for tx in self.observers.lock().unwrap().iter() {
            for _ in 0..times {
                let _ = tx.send(MutationSignal { records: 2 });
            }
        }
    }
}

impl PageLocation for ScriptedPage {
    fn href(&self) -> String {
        self.href.lock().unwrap().clone()
    }
}

impl MutationSource for ScriptedPage {
    fn subscribe(&self, _scope: ObserveScope) -> MutationReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.lock().unwrap().push(tx);
        rx
    }
}

impl PageChrome for ScriptedPage {
    fn set_class(&self, class_name: &str, enabled: bool) {
        self.classes
            .lock()
            .unwrap()
            .push((class_name.to_string(), enabled));
    }
}

impl MediaElement for ScriptedPage {
    fn current_time(&self) -> f64 {
        *self.media_time.lock().unwrap()
    }

    fn set_current_time(&self, seconds: f64) {
        *self.media_time.lock().unwrap() = seconds;
    }
}

struct MediaOnly(Arc<ScriptedPage>);

impl PlayerHost for MediaOnly {
    fn find_player(&self) -> Option<Arc<dyn video_learner_lib::page::PlayerApi>> {
        None
    }

    fn find_media_element(&self) -> Option<Arc<dyn MediaElement>> {
        Some(self.0.clone())
    }
}

fn host(page: &Arc<ScriptedPage>, storage: Arc<dyn DurableStorage>) -> HostServices {
    HostServices {
        location: page.clone(),
        mutations: page.clone(),
        storage: Some(storage),
        chrome: Some(page.clone()),
        player: Some(Arc::new(MediaOnly(page.clone()))),
    }
}

fn quick_settings() -> LearnerSettings {
    LearnerSettings {
        generation: GenerationDelays::instant(),
        ..LearnerSettings::default()
    }
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

async fn current_video(app: &LearnerApp) -> Option<VideoId> {
    app.store().lock().await.state().current_video_id.clone()
}

#[tokio::test]
async fn switching_videos_fires_once() {
    let page = ScriptedPage::at(ABC);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let handle = NavigationWatcher::new(
        page.clone(),
        page.clone(),
        WatchPattern::default(),
        ObserveScope::TitleNode,
    )
    .start(move |id| sink.lock().unwrap().push(id))
    .unwrap();

    page.navigate(XYZ);
    settle().await;
    page.churn(40);
    settle().await;

    assert_eq!(*seen.lock().unwrap(), vec![Some(VideoId::from("xyz789"))]);
    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn leaving_watch_page_reports_none() {
    let page = ScriptedPage::at(ABC);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let handle = NavigationWatcher::new(
        page.clone(),
        page.clone(),
        WatchPattern::default(),
        ObserveScope::DocumentBody,
    )
    .start(move |id| sink.lock().unwrap().push(id))
    .unwrap();

    page.navigate(HOME);
    settle().await;

    assert_eq!(*seen.lock().unwrap(), vec![None]);
    handle.stop();
    page.navigate(XYZ);
    settle().await;
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn mounted_overlay_follows_navigation() {
    let page = ScriptedPage::at(ABC);
    let app = LearnerApp::mount(host(&page, Arc::new(MemoryStorage::new())), quick_settings())
        .unwrap();
    assert_eq!(current_video(&app).await, Some(VideoId::from("abc123")));

    page.navigate(XYZ);
    settle().await;
    assert_eq!(current_video(&app).await, Some(VideoId::from("xyz789")));

    page.navigate(HOME);
    settle().await;
    assert_eq!(current_video(&app).await, None);

    app.unmount().await.unwrap();
}

#[tokio::test]
async fn background_message_and_watcher_agree() {
    let page = ScriptedPage::at(HOME);
    let app = LearnerApp::mount(host(&page, Arc::new(MemoryStorage::new())), quick_settings())
        .unwrap();
    let mut changes = app.store().lock().await.subscribe();

    // Background relays the completed load while the watcher sees the same route.
    page.navigate(ABC);
    app.page_events()
        .dispatch_json(r#"{"type":"NEW_VIDEO","videoId":"abc123"}"#);
    settle().await;

    assert_eq!(current_video(&app).await, Some(VideoId::from("abc123")));
    let mut video_changes = 0;
    while let Ok(change) = changes.try_recv() {
        if matches!(change, video_learner_lib::store::StateChange::CurrentVideo(_)) {
            video_changes += 1;
        }
    }
    assert_eq!(video_changes, 1);

    app.unmount().await.unwrap();
}

#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<(TabId, PageMessage)>>,
}

impl MessageChannel for RecordingChannel {
    fn send_to_tab(&self, tab_id: TabId, message: &PageMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((tab_id, message.clone()));
        Ok(())
    }
}

#[tokio::test]
async fn notifier_message_reaches_the_store() {
    let page = ScriptedPage::at(HOME);
    let app = LearnerApp::mount(host(&page, Arc::new(MemoryStorage::new())), quick_settings())
        .unwrap();

    let channel = Arc::new(RecordingChannel::default());
    let notifier = CrossContextNotifier::new(Some(channel.clone()), WatchPattern::default());
    assert!(notifier.handle_tab_update(&TabUpdate::complete(7, XYZ)));
    assert!(!notifier.handle_tab_update(&TabUpdate::complete(7, XYZ)));

    for (_, message) in channel.sent.lock().unwrap().iter() {
        app.page_events().dispatch_message(message);
    }
    settle().await;

    assert_eq!(current_video(&app).await, Some(VideoId::from("xyz789")));
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn quiz_request_uses_requested_count() {
    let page = ScriptedPage::at(ABC);
    let app = LearnerApp::mount(host(&page, Arc::new(MemoryStorage::new())), quick_settings())
        .unwrap();

    assert_eq!(app.generation().request_quiz(7).await, GenerationOutcome::Applied);
    let store = app.store().lock().await;
    assert_eq!(store.state().quiz.as_ref().unwrap().questions.len(), 7);
    drop(store);

    app.unmount().await.unwrap();
}

#[tokio::test]
async fn notes_survive_remount_and_removal_persists() {
    let dir = tempfile::tempdir().unwrap();
    let page = ScriptedPage::at(ABC);

    let app = LearnerApp::mount(
        host(&page, open_storage(StorageBackend::JsonFile, dir.path())),
        quick_settings(),
    )
    .unwrap();
    *page.media_time.lock().unwrap() = 83.7;
    let (label, seconds) = app.player().current_timestamp();
    let note = app
        .store()
        .lock()
        .await
        .take_note(label, seconds, "closure capture rules")
        .unwrap();
    assert_eq!(note.timestamp, "01:23");
    app.unmount().await.unwrap();

    let storage = open_storage(StorageBackend::JsonFile, dir.path());
    let app = LearnerApp::mount(host(&page, storage.clone()), quick_settings()).unwrap();
    {
        let mut store = app.store().lock().await;
        assert_eq!(store.state().user_notes, vec![note.clone()]);
        assert!(store.remove_user_note(&note.id));
    }
    assert_eq!(storage.get(NOTES_KEY).unwrap().as_deref(), Some("[]"));

    app.unmount().await.unwrap();
}

#[tokio::test]
async fn seeking_falls_back_to_media_element() {
    let page = ScriptedPage::at(ABC);
    let app = LearnerApp::mount(host(&page, Arc::new(MemoryStorage::new())), quick_settings())
        .unwrap();

    app.player().seek(202);
    assert_eq!(*page.media_time.lock().unwrap(), 202.0);
    assert_eq!(app.player().current_position(), 202);

    app.unmount().await.unwrap();
}

#[tokio::test]
async fn unmount_clears_focus_class_but_keeps_preference() {
    let page = ScriptedPage::at(ABC);
    let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::new());
    let app = LearnerApp::mount(host(&page, storage.clone()), quick_settings()).unwrap();

    app.store().lock().await.set_is_focus_mode(true);
    app.unmount().await.unwrap();
    assert_eq!(
        page.classes.lock().unwrap().last(),
        Some(&(FOCUS_MODE_CLASS.to_string(), false))
    );

    let app = LearnerApp::mount(host(&page, storage), quick_settings()).unwrap();
    assert!(app.store().lock().await.state().is_focus_mode);
    app.unmount().await.unwrap();
}

#[tokio::test]
async fn configured_backend_is_used_when_host_has_no_storage() {
    let dir = tempfile::tempdir().unwrap();
    let page = ScriptedPage::at(ABC);
    let settings = LearnerSettings {
        storage_backend: StorageBackend::Sqlite,
        data_dir: Some(dir.path().to_path_buf()),
        default_quiz_questions: 6,
        ..quick_settings()
    };
    let bare_host = || HostServices {
        storage: None,
        ..host(&page, Arc::new(MemoryStorage::new()))
    };

    let app = LearnerApp::mount(bare_host(), settings.clone()).unwrap();
    app.store().lock().await.set_api_key(Some("sk-sqlite".into()));
    assert_eq!(app.generation().request_default_quiz().await, GenerationOutcome::Applied);
    assert_eq!(
        app.store().lock().await.state().quiz.as_ref().unwrap().questions.len(),
        6
    );
    app.unmount().await.unwrap();
    assert!(dir.path().join("storage.sqlite3").exists());

    let app = LearnerApp::mount(bare_host(), settings).unwrap();
    assert_eq!(
        app.store().lock().await.state().api_key.as_deref(),
        Some("sk-sqlite")
    );
    app.unmount().await.unwrap();
}
