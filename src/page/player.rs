use std::sync::Arc;

use crate::models::note::format_timestamp;

/// Embedded player object exposing the site's JS player API.
pub trait PlayerApi: Send + Sync {
    fn seek_to(&self, seconds: u64);
}

/// Plain `<video>` element fallback.
pub trait MediaElement: Send + Sync {
    /// Playback position in seconds. Hosts may report NaN before metadata loads.
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
}

/// DOM lookups for the player. Both lookups may legitimately find nothing.
pub trait PlayerHost: Send + Sync {
    fn find_player(&self) -> Option<Arc<dyn PlayerApi>>;
    fn find_media_element(&self) -> Option<Arc<dyn MediaElement>>;
}

/// Seek and position access that never fails: a missing player degrades to
/// the media element, and a missing media element degrades to a no-op.
#[derive(Clone)]
pub struct PlayerBridge {
    host: Option<Arc<dyn PlayerHost>>,
}

impl PlayerBridge {
    pub fn new(host: Arc<dyn PlayerHost>) -> Self {
        Self { host: Some(host) }
    }

    /// Bridge for a page with no player at all.
    pub fn detached() -> Self {
        Self { host: None }
    }

    pub fn seek(&self, seconds: u64) {
        let Some(host) = self.host.as_ref() else {
            return;
        };

        if let Some(player) = host.find_player() {
            log::debug!("seeking player to {seconds}s");
            player.seek_to(seconds);
        } else if let Some(media) = host.find_media_element() {
            log::debug!("player API missing; seeking media element to {seconds}s");
            media.set_current_time(seconds as f64);
        } else {
            log::debug!("no player or media element; ignoring seek to {seconds}s");
        }
    }

    /// Whole seconds into playback, 0 without a usable media element.
    pub fn current_position(&self) -> u64 {
        let Some(media) = self.host.as_ref().and_then(|host| host.find_media_element()) else {
            return 0;
        };

        let position = media.current_time();
        if position.is_finite() && position > 0.0 {
            position.floor() as u64
        } else {
            0
        }
    }

    /// Current position as a `MM:SS` label plus the raw seconds, for notes.
    pub fn current_timestamp(&self) -> (String, u64) {
        let seconds = self.current_position();
        (format_timestamp(seconds), seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlayer {
        seeks: Mutex<Vec<u64>>,
    }

    impl PlayerApi for RecordingPlayer {
        fn seek_to(&self, seconds: u64) {
            self.seeks.lock().unwrap().push(seconds);
        }
    }

    struct Video {
        position: Mutex<f64>,
    }

    impl Video {
        fn at(position: f64) -> Arc<Self> {
            Arc::new(Self {
                position: Mutex::new(position),
            })
        }
    }

    impl MediaElement for Video {
        fn current_time(&self) -> f64 {
            *self.position.lock().unwrap()
        }

        fn set_current_time(&self, seconds: f64) {
            *self.position.lock().unwrap() = seconds;
        }
    }

    struct Host {
        player: Option<Arc<RecordingPlayer>>,
        video: Option<Arc<Video>>,
    }

    impl PlayerHost for Host {
        fn find_player(&self) -> Option<Arc<dyn PlayerApi>> {
            self.player.clone().map(|p| p as Arc<dyn PlayerApi>)
        }

        fn find_media_element(&self) -> Option<Arc<dyn MediaElement>> {
            self.video.clone().map(|v| v as Arc<dyn MediaElement>)
        }
    }

    #[test]
    fn seek_prefers_player_api() {
        let player = Arc::new(RecordingPlayer::default());
        let video = Video::at(3.0);
        let bridge = PlayerBridge::new(Arc::new(Host {
            player: Some(player.clone()),
            video: Some(video.clone()),
        }));

        bridge.seek(202);

        assert_eq!(*player.seeks.lock().unwrap(), vec![202]);
        assert_eq!(video.current_time(), 3.0);
    }

    #[test]
    fn seek_falls_back_to_media_element() {
        let video = Video::at(0.0);
        let bridge = PlayerBridge::new(Arc::new(Host {
            player: None,
            video: Some(video.clone()),
        }));

        bridge.seek(45);

        assert_eq!(video.current_time(), 45.0);
        assert_eq!(bridge.current_position(), 45);
    }

    #[test]
    fn seek_without_anything_is_noop() {
        let bridge = PlayerBridge::new(Arc::new(Host {
            player: None,
            video: None,
        }));
        bridge.seek(10);
        PlayerBridge::detached().seek(10);
        assert_eq!(bridge.current_position(), 0);
    }

    #[test]
    fn position_is_floored_and_sanitised() {
        let video = Video::at(125.9);
        let bridge = PlayerBridge::new(Arc::new(Host {
            player: None,
            video: Some(video.clone()),
        }));
        assert_eq!(bridge.current_position(), 125);
        assert_eq!(bridge.current_timestamp(), ("02:05".to_string(), 125));

        video.set_current_time(f64::NAN);
        assert_eq!(bridge.current_position(), 0);
        video.set_current_time(-4.0);
        assert_eq!(bridge.current_position(), 0);
    }
}
