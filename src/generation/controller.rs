use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;

use crate::{
    export::ExportDocument,
    models::ApiResponse,
    page::VideoId,
    store::{AppStore, SharedStore},
};

use super::{MockGenerator, DEFAULT_QUIZ_QUESTIONS};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Result stored.
    Applied,
    /// Nothing to generate for; the generator was not called.
    Inert,
    /// The viewer moved to another video while the call was in flight.
    Stale,
    Failed(String),
}

/// Runs generation calls against the shared store. The store lock is released
/// while the generator is waiting, so navigation keeps flowing.
///
/// `is_loading` stays set while any request is in flight.
#[derive(Clone)]
pub struct GenerationController {
    store: SharedStore,
    generator: MockGenerator,
    default_quiz_questions: usize,
}

impl GenerationController {
    pub fn new(store: SharedStore, generator: MockGenerator) -> Self {
        Self {
            store,
            generator,
            default_quiz_questions: DEFAULT_QUIZ_QUESTIONS,
        }
    }

    pub fn with_default_quiz_questions(mut self, question_count: usize) -> Self {
        self.default_quiz_questions = question_count;
        self
    }

    pub fn default_quiz_questions(&self) -> usize {
        self.default_quiz_questions
    }

    pub async fn request_summary(&self) -> GenerationOutcome {
        let Some(video_id) = self.begin_for_current_video().await else {
            return GenerationOutcome::Inert;
        };

        let response = self.generator.generate_summary(&video_id).await;
        self.finish(Some(&video_id), "summary", response, |store, summary| {
            store.set_video_summary(Some(summary))
        })
        .await
    }

    pub async fn request_quiz(&self, question_count: usize) -> GenerationOutcome {
        let Some(video_id) = self.begin_for_current_video().await else {
            return GenerationOutcome::Inert;
        };

        let response = self.generator.generate_quiz(&video_id, question_count).await;
        self.finish(Some(&video_id), "quiz", response, |store, quiz| {
            store.set_quiz(Some(quiz))
        })
        .await
    }

    /// Quiz sized by the configured default.
    pub async fn request_default_quiz(&self) -> GenerationOutcome {
        self.request_quiz(self.default_quiz_questions).await
    }

    /// Needs a summary; the comments are written against its title.
    pub async fn request_comments(&self, custom_prompt: Option<&str>) -> GenerationOutcome {
        let (current, summary) = {
            let mut store = self.store.lock().await;
            let Some(summary) = store.state().video_summary.clone() else {
                return GenerationOutcome::Inert;
            };
            let current = store.state().current_video_id.clone();
            store.begin_loading();
            (current, summary)
        };

        let response = self
            .generator
            .generate_comment_variations(
                &summary.video_id,
                &summary.title,
                &summary.summary,
                custom_prompt,
            )
            .await;
        self.finish(current.as_ref(), "comments", response, |store, comments| {
            store.set_comment_variations(comments)
        })
        .await
    }

    /// Write the current summary and quiz to `dir`. `None` without a summary.
    pub async fn export_to(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let document = {
            let store = self.store.lock().await;
            let state = store.state();
            match state.video_summary.as_ref() {
                Some(summary) => ExportDocument::build(summary, state.quiz.as_ref(), Utc::now()),
                None => return Ok(None),
            }
        };
        document.write_to(dir).map(Some)
    }

    async fn begin_for_current_video(&self) -> Option<VideoId> {
        let mut store = self.store.lock().await;
        let video_id = store.state().current_video_id.clone()?;
        store.begin_loading();
        Some(video_id)
    }

    async fn finish<T, F>(
        &self,
        requested: Option<&VideoId>,
        kind: &str,
        response: ApiResponse<T>,
        apply: F,
    ) -> GenerationOutcome
    where
        F: FnOnce(&mut AppStore, T),
    {
        let mut store = self.store.lock().await;
        store.end_loading();

        if store.state().current_video_id.as_ref() != requested {
            log_info!("dropping {kind} for {requested:?}; viewer moved on");
            return GenerationOutcome::Stale;
        }

        match response.into_result() {
            Ok(data) => {
                apply(&mut *store, data);
                GenerationOutcome::Applied
            }
            Err(error) => {
                log_warn!("{kind} generation failed: {error}");
                GenerationOutcome::Failed(error)
            }
        }
    }
}
