pub mod api;
pub mod comment;
pub mod note;
pub mod quiz;
pub mod video;

pub use api::ApiResponse;
pub use comment::CommentVariation;
pub use note::{format_timestamp, UserNote};
pub use quiz::{Quiz, QuizProgress, QuizQuestion};
pub use video::{TimeStamp, VideoSummary};
