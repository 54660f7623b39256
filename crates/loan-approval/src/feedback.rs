//! App review form. Submissions are acknowledged and logged, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

const ANONYMOUS: &str = "Anonymous";
const THANK_YOU: &str = "Thank you for your review!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub name: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackAcknowledgement {
    pub message: &'static str,
    pub name: String,
    pub rating: u8,
    pub comments: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

pub fn acknowledge(
    submission: FeedbackSubmission,
    received_at: DateTime<Utc>,
) -> Result<FeedbackAcknowledgement, FeedbackError> {
    if !(1..=5).contains(&submission.rating) {
        return Err(FeedbackError::RatingOutOfRange(submission.rating));
    }

    let name = submission
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ANONYMOUS.to_string());

    info!(rating = submission.rating, "received app review");

    Ok(FeedbackAcknowledgement {
        message: THANK_YOU,
        name,
        rating: submission.rating,
        comments: submission.comments,
        received_at,
    })
}
