//! Error types for goal-line operations.

use thiserror::Error;

/// Errors surfaced by the goal-line widget and its collaborators.
///
/// Geometry and the drag state machine never fail; these cover the
/// boundaries where data comes from the outside world.
#[derive(Debug, Error)]
pub enum GoalLineError {
    #[error("No image for resource slot {source_index}")]
    MissingAsset { source_index: usize },
    #[error("Malformed payload for '{event}': {reason}")]
    MalformedPayload { event: String, reason: String },
    #[error("Invalid orientation: {0} degrees")]
    InvalidOrientation(i64),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for goal-line operations.
pub type GoalLineResult<T> = Result<T, GoalLineError>;
