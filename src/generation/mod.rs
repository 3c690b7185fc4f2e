mod controller;
mod service;

pub use controller::{GenerationController, GenerationOutcome};
pub use service::{
    GenerationDelays, MockGenerator, DEFAULT_QUIZ_QUESTIONS, MAX_QUIZ_QUESTIONS, MIN_QUIZ_QUESTIONS,
};
