//! Stand-in for the AI backend: fixed-delay calls returning canned content.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{ApiResponse, CommentVariation, Quiz, QuizQuestion, TimeStamp, VideoSummary},
    page::VideoId,
};

pub const MIN_QUIZ_QUESTIONS: usize = 5;
pub const MAX_QUIZ_QUESTIONS: usize = 20;
pub const DEFAULT_QUIZ_QUESTIONS: usize = 10;

/// Artificial latency per call, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationDelays {
    pub summary_ms: u64,
    pub quiz_ms: u64,
    pub comments_ms: u64,
}

impl Default for GenerationDelays {
    fn default() -> Self {
        Self {
            summary_ms: 2000,
            quiz_ms: 1500,
            comments_ms: 1200,
        }
    }
}

impl GenerationDelays {
    pub fn instant() -> Self {
        Self {
            summary_ms: 0,
            quiz_ms: 0,
            comments_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    delays: GenerationDelays,
}

impl MockGenerator {
    pub fn new(delays: GenerationDelays) -> Self {
        Self { delays }
    }

    async fn pause(ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    pub async fn generate_summary(&self, video_id: &VideoId) -> ApiResponse<VideoSummary> {
        Self::pause(self.delays.summary_ms).await;

        let chapter = |time: &str, text: &str, seconds: u64| TimeStamp {
            time: time.into(),
            text: text.into(),
            seconds,
        };

        ApiResponse::ok(VideoSummary {
            title: "Understanding Modern JavaScript".into(),
            transcript: "Transcript placeholder for the generated summary.".into(),
            summary: "A walkthrough of ES6+ features: arrow functions, destructuring, \
                      async/await and template literals, with examples of how each one \
                      makes everyday code shorter and harder to get wrong."
                .into(),
            key_points: vec![
                "Arrow functions are shorter and bind `this` lexically".into(),
                "Destructuring pulls values out of objects and arrays in one step".into(),
                "async/await reads like synchronous code compared to promise chains".into(),
                "Template literals embed expressions directly in strings".into(),
                "ES modules organise code better than script globals".into(),
            ],
            language: "English".into(),
            video_id: video_id.clone(),
            thumbnail_url: format!("https://i.ytimg.com/vi/{video_id}/maxresdefault.jpg"),
            channel_name: "JavaScript Mastery".into(),
            video_url: format!("https://www.youtube.com/watch?v={video_id}"),
            timestamps: vec![
                chapter("00:45", "Introduction to ES6 features", 45),
                chapter("03:22", "Arrow function syntax", 202),
                chapter("07:15", "Destructuring objects and arrays", 435),
                chapter("12:48", "Working with async/await", 768),
                chapter("18:30", "Real-world examples", 1110),
            ],
        })
    }

    /// `question_count` must be within `MIN_QUIZ_QUESTIONS..=MAX_QUIZ_QUESTIONS`.
    pub async fn generate_quiz(
        &self,
        video_id: &VideoId,
        question_count: usize,
    ) -> ApiResponse<Quiz> {
        if !(MIN_QUIZ_QUESTIONS..=MAX_QUIZ_QUESTIONS).contains(&question_count) {
            return ApiResponse::failure(format!(
                "question count must be between {MIN_QUIZ_QUESTIONS} and {MAX_QUIZ_QUESTIONS}, got {question_count}"
            ));
        }

        Self::pause(self.delays.quiz_ms).await;

        let questions = (0..question_count).map(mock_question).collect();

        ApiResponse::ok(Quiz {
            id: Uuid::new_v4().to_string(),
            video_id: video_id.clone(),
            title: "Modern JavaScript Quiz".into(),
            questions,
            language: "English".into(),
        })
    }

    pub async fn generate_comment_variations(
        &self,
        video_id: &VideoId,
        title: &str,
        _summary: &str,
        custom_prompt: Option<&str>,
    ) -> ApiResponse<Vec<CommentVariation>> {
        Self::pause(self.delays.comments_ms).await;

        if let Some(prompt) = custom_prompt.filter(|p| !p.trim().is_empty()) {
            log::debug!("comment prompt for {video_id} ({title}): {prompt}");
        }

        ApiResponse::ok(
            [
                "The arrow function examples finally made lexical `this` click for me.",
                "The async/await section at 12:48 solved a problem I had this week. Thanks!",
                "How would you handle errors with async/await? A follow-up would be great.",
                "Explained destructuring better than any course I've taken. Subscribed.",
                "Years of JavaScript and I still picked up new tricks around 18:30.",
            ]
            .into_iter()
            .map(CommentVariation::new)
            .collect(),
        )
    }
}

fn mock_question(index: usize) -> QuizQuestion {
    let (topic, benefit) = if index % 2 == 0 {
        ("arrow functions", "provide lexical this binding")
    } else {
        ("async/await", "simplify asynchronous code")
    };
    let correct = format!("They {benefit}");

    QuizQuestion {
        id: Uuid::new_v4().to_string(),
        question: format!("What is the primary benefit of using {topic} in modern JavaScript?"),
        options: vec![
            "They automatically handle memory management".into(),
            correct.clone(),
            format!("They reduce file size by {}0%", index % 3 + 1),
            "They automatically prevent security vulnerabilities".into(),
        ],
        correct_answer: correct,
        explanation: Some(format!(
            "{topic} is a core modern JavaScript feature that keeps code clean and maintainable."
        )),
    }
}
