//! Study-notes export: summary, key points and quiz answers as one JSON file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Quiz, VideoSummary};

const TITLE_PREFIX_CHARS: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub quiz: Vec<ExportedQuestion>,
    /// RFC 3339 with millisecond precision.
    pub timestamp: String,
}

impl ExportDocument {
    pub fn build(summary: &VideoSummary, quiz: Option<&Quiz>, now: DateTime<Utc>) -> Self {
        let quiz = quiz
            .map(|quiz| {
                quiz.questions
                    .iter()
                    .map(|q| ExportedQuestion {
                        question: q.question.clone(),
                        options: q.options.clone(),
                        answer: q.correct_answer.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: summary.title.clone(),
            summary: summary.summary.clone(),
            key_points: summary.key_points.clone(),
            quiz,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// First 30 characters of the title plus `_notes.json`. Path separators
    /// become underscores so the file always lands in the target directory.
    pub fn file_name(&self) -> String {
        let prefix: String = self
            .title
            .chars()
            .take(TITLE_PREFIX_CHARS)
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{prefix}_notes.json")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize export document")
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.to_json()?)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        log::info!("exported notes to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::QuizQuestion, page::VideoId};
    use chrono::TimeZone;

    fn summary(title: &str) -> VideoSummary {
        VideoSummary {
            title: title.into(),
            transcript: String::new(),
            summary: "short".into(),
            key_points: vec!["one".into(), "two".into()],
            language: "English".into(),
            video_id: VideoId::from("abc123"),
            thumbnail_url: String::new(),
            channel_name: "chan".into(),
            video_url: "https://www.youtube.com/watch?v=abc123".into(),
            timestamps: Vec::new(),
        }
    }

    fn quiz() -> Quiz {
        Quiz {
            id: "q".into(),
            video_id: VideoId::from("abc123"),
            title: "Quiz".into(),
            questions: vec![QuizQuestion {
                id: "1".into(),
                question: "2 + 2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_answer: "4".into(),
                explanation: None,
            }],
            language: "English".into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn document_uses_camel_case_and_quiz_answers() {
        let doc = ExportDocument::build(&summary("Intro"), Some(&quiz()), now());
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(value["keyPoints"], serde_json::json!(["one", "two"]));
        assert_eq!(value["quiz"][0]["answer"], "4");
        assert_eq!(value["timestamp"], "2024-03-01T12:30:00.000Z");
    }

    #[test]
    fn missing_quiz_exports_empty_list() {
        let doc = ExportDocument::build(&summary("Intro"), None, now());
        assert!(doc.quiz.is_empty());
    }

    #[test]
    fn file_name_truncates_by_character() {
        let doc = ExportDocument::build(&summary(&"é".repeat(40)), None, now());
        assert_eq!(doc.file_name(), format!("{}_notes.json", "é".repeat(30)));

        let doc = ExportDocument::build(&summary("a/b\\c"), None, now());
        assert_eq!(doc.file_name(), "a_b_c_notes.json");
    }

    #[test]
    fn write_to_creates_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportDocument::build(&summary("Understanding Modern JavaScript"), None, now());

        let path = doc.write_to(&dir.path().join("exports")).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Understanding Modern JavaScrip_notes.json"
        );
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("\n  \"title\""));
        let parsed: ExportDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, doc);
    }
}
