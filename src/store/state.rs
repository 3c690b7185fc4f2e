use serde::{Deserialize, Serialize};

use crate::{
    models::{CommentVariation, Quiz, UserNote, VideoSummary},
    page::VideoId,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Summary,
    Quiz,
    Notes,
    Comments,
    Settings,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Summary => "summary",
            Tab::Quiz => "quiz",
            Tab::Notes => "notes",
            Tab::Comments => "comments",
            Tab::Settings => "settings",
        }
    }
}

/// Session-wide UI state. Read freely; change only through `AppStore`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub current_video_id: Option<VideoId>,
    pub video_summary: Option<VideoSummary>,
    pub quiz: Option<Quiz>,
    pub user_notes: Vec<UserNote>,
    pub comment_variations: Vec<CommentVariation>,
    pub is_loading: bool,
    pub is_focus_mode: bool,
    pub api_key: Option<String>,
    pub current_tab: Tab,
}

/// What changed, broadcast after every effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    CurrentVideo(Option<VideoId>),
    Summary,
    Quiz,
    Notes,
    Comments,
    Loading(bool),
    FocusMode(bool),
    Tab(Tab),
    ApiKey,
    Cleared,
    Reset,
}
