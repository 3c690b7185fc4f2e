use std::{borrow::Cow, fmt};

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use super::PageLocation;

const VIDEO_ID_PARAM: &str = "v";

/// Opaque token naming a video, taken verbatim from the `v` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VideoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for VideoId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VideoId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Host and path that identify a watch page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WatchPattern {
    /// Registrable host; subdomains (`www.`, `m.`) match too.
    pub host: String,
    /// Always compared with a leading `/`; one is added when missing.
    #[serde(deserialize_with = "deserialize_path")]
    pub path: String,
}

fn deserialize_path<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_path(&raw).into_owned())
}

fn normalize_path(path: &str) -> Cow<'_, str> {
    let path = path.trim();
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    }
}

impl Default for WatchPattern {
    fn default() -> Self {
        Self {
            host: "youtube.com".into(),
            path: "/watch".into(),
        }
    }
}

impl WatchPattern {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self {
            host: host.into(),
            path: normalize_path(&path).into_owned(),
        }
    }

    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, href: &str) -> bool {
        Url::parse(href)
            .map(|url| self.matches_url(&url))
            .unwrap_or(false)
    }

    fn matches_url(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let expected = self.host.trim().to_ascii_lowercase();
        if expected.is_empty() {
            return false;
        }

        let host = host.to_ascii_lowercase();
        let host_ok = host == expected
            || host
                .strip_suffix(expected.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'));
        if !host_ok {
            return false;
        }

        let expected = normalize_path(&self.path);
        let path = url.path();
        path == expected || path.strip_suffix('/') == Some(expected.as_ref())
    }

    /// Classify `href`: the video id when it is a watch page, otherwise `None`.
    pub fn classify(&self, href: &str) -> Option<VideoId> {
        let url = Url::parse(href).ok()?;
        if !self.matches_url(&url) {
            return None;
        }
        video_id_from_url(&url)
    }

    /// Canonical watch URL for `video_id` on this pattern's host.
    pub fn watch_url(&self, video_id: &VideoId) -> String {
        let base = format!("https://{}{}", self.host, normalize_path(&self.path));
        match Url::parse(&base) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair(VIDEO_ID_PARAM, video_id.as_str());
                url.into()
            }
            Err(_) => format!("{base}?{VIDEO_ID_PARAM}={video_id}"),
        }
    }
}

/// True iff `href` is a watch page under `pattern`. Never fails; malformed
/// input is simply not a watch page.
pub fn is_watch_page(pattern: &WatchPattern, href: &str) -> bool {
    pattern.matches(href)
}

/// The `v` query parameter of `href`, percent-decoded.
///
/// Absent, empty and unparsable all map to `None`.
pub fn extract_video_id(href: &str) -> Option<VideoId> {
    let url = Url::parse(href).ok()?;
    video_id_from_url(&url)
}

fn video_id_from_url(url: &Url) -> Option<VideoId> {
    url.query_pairs()
        .find(|(key, _)| key == VIDEO_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(VideoId)
}

pub fn is_watch_page_at(pattern: &WatchPattern, location: &dyn PageLocation) -> bool {
    is_watch_page(pattern, &location.href())
}

pub fn extract_video_id_at(location: &dyn PageLocation) -> Option<VideoId> {
    extract_video_id(&location.href())
}
