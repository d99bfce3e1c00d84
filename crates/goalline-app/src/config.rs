//! Application configuration.

use crate::error::AppResult;
use goalline_core::GoalLineConfig;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Id of the goal canvas element.
    pub canvas_id: String,
    /// URL prefix the cube images are loaded from.
    pub asset_base_url: String,
    /// Whether cube images are fetched when the goal line is created.
    pub preload_assets: bool,
    pub goal_line: GoalLineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_id: "goal-sector".to_string(),
            asset_base_url: "/static/cubes/".to_string(),
            preload_assets: true,
            goal_line: GoalLineConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.goal_line.validate()?;
        Ok(config)
    }

    /// URL of one cube image.
    pub fn asset_url(&self, name: &str) -> String {
        format!("{}/{}", self.asset_base_url.trim_end_matches('/'), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(r#"{"canvas_id": "goal", "goal_line": {"border_width": 4.0}}"#).unwrap();
        assert_eq!(config.canvas_id, "goal");
        assert_eq!(config.asset_base_url, "/static/cubes/");
        assert!((config.goal_line.border_width - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.goal_line.max_tokens, 6);
    }

    #[test]
    fn test_invalid_goal_line_config_rejected() {
        let err = AppConfig::from_json(r#"{"goal_line": {"row_divisor": 0.0}}"#).unwrap_err();
        assert!(matches!(err, AppError::GoalLine(_)));
    }

    #[test]
    fn test_asset_url() {
        let config = AppConfig::default();
        assert_eq!(config.asset_url("bk3.png"), "/static/cubes/bk3.png");
    }
}
