use serde::{Deserialize, Serialize};

use crate::page::VideoId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub video_id: VideoId,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
    pub language: String,
}

/// A user's walk through a quiz: pick an option, reveal, move on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizProgress {
    current_index: usize,
    selected: Option<String>,
    revealed: bool,
    completed: bool,
    correct: usize,
}

impl QuizProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question<'a>(&self, quiz: &'a Quiz) -> Option<&'a QuizQuestion> {
        quiz.questions.get(self.current_index)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn correct_answers(&self) -> usize {
        self.correct
    }

    /// Choose an option. Ignored once the answer is revealed.
    pub fn select(&mut self, option: impl Into<String>) {
        if !self.revealed && !self.completed {
            self.selected = Some(option.into());
        }
    }

    pub fn reveal(&mut self) {
        if self.selected.is_some() {
            self.revealed = true;
        }
    }

    /// Score the current selection and advance, completing after the last
    /// question.
    pub fn next(&mut self, quiz: &Quiz) {
        if self.completed {
            return;
        }

        if let (Some(question), Some(selected)) =
            (self.current_question(quiz), self.selected.as_deref())
        {
            if selected == question.correct_answer {
                self.correct += 1;
            }
        }

        self.selected = None;
        self.revealed = false;

        if self.current_index + 1 < quiz.questions.len() {
            self.current_index += 1;
        } else {
            self.completed = true;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Percentage of correct answers, rounded to the nearest integer.
    pub fn score_percent(&self, quiz: &Quiz) -> u32 {
        let total = quiz.questions.len();
        if total == 0 {
            return 0;
        }
        ((self.correct as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz(answers: &[&str]) -> Quiz {
        Quiz {
            id: "q".into(),
            video_id: VideoId::from("abc123"),
            title: "Quiz".into(),
            questions: answers
                .iter()
                .enumerate()
                .map(|(i, answer)| QuizQuestion {
                    id: i.to_string(),
                    question: format!("Question {i}"),
                    options: vec![answer.to_string(), "wrong".into()],
                    correct_answer: answer.to_string(),
                    explanation: None,
                })
                .collect(),
            language: "English".into(),
        }
    }

    #[test]
    fn walks_and_scores_quiz() {
        let quiz = quiz(&["a", "b", "c"]);
        let mut progress = QuizProgress::new();

        progress.select("a");
        progress.reveal();
        progress.select("wrong");
        assert_eq!(progress.selected(), Some("a"));
        progress.next(&quiz);

        progress.select("wrong");
        progress.next(&quiz);

        progress.select("c");
        progress.next(&quiz);

        assert!(progress.is_completed());
        assert_eq!(progress.correct_answers(), 2);
        assert_eq!(progress.score_percent(&quiz), 67);
    }

    #[test]
    fn reveal_requires_a_selection() {
        let mut progress = QuizProgress::new();
        progress.reveal();
        assert!(!progress.is_revealed());
    }

    #[test]
    fn reset_starts_over() {
        let quiz = quiz(&["a"]);
        let mut progress = QuizProgress::new();
        progress.select("a");
        progress.next(&quiz);
        assert!(progress.is_completed());

        progress.reset();
        assert_eq!(progress, QuizProgress::default());
        assert_eq!(progress.current_question(&quiz).map(|q| q.id.as_str()), Some("0"));
    }

    #[test]
    fn empty_quiz_scores_zero() {
        let quiz = quiz(&[]);
        let mut progress = QuizProgress::new();
        progress.next(&quiz);
        assert!(progress.is_completed());
        assert_eq!(progress.score_percent(&quiz), 0);
    }
}
