//! Application error type.

use goalline_core::GoalLineError;
use goalline_render::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    GoalLine(#[from] GoalLineError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Invalid script: {0}")]
    Script(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Browser error: {0}")]
    Dom(String),
}

pub type AppResult<T> = Result<T, AppError>;
