//! Widget configuration.

use crate::error::{GoalLineError, GoalLineResult};
use serde::{Deserialize, Serialize};

/// Number of cubes a goal may hold in the game.
pub const MAX_GOAL_TOKENS: usize = 6;

/// Tunable layout and styling constants.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalLineConfig {
    /// Canvas width as a fraction of the viewport width.
    pub canvas_width_ratio: f64,
    /// Canvas height as a fraction of the viewport height.
    pub canvas_height_ratio: f64,
    /// Cube image side as a fraction of the viewport height.
    pub cube_ratio: f64,
    /// Extra width of the hit box (and border) around the cube image.
    pub hit_padding_x: f64,
    /// Extra height of the hit box (and border) around the cube image.
    pub hit_padding_y: f64,
    /// The token row sits at `canvas_height / row_divisor`.
    pub row_divisor: f64,
    /// Smallest allowed token x position.
    pub min_margin: f64,
    /// Newly added tokens use a margin of `canvas_width / add_margin_divisor`.
    pub add_margin_divisor: f64,
    /// Gap between added tokens, in multiples of that margin.
    pub add_spacing_factor: f64,
    pub border_radius: f64,
    pub border_width: f64,
    /// Border color as `#rrggbb`.
    pub border_color: String,
    /// Goals larger than this are logged as suspicious.
    pub max_tokens: usize,
}

impl Default for GoalLineConfig {
    fn default() -> Self {
        Self {
            canvas_width_ratio: 0.33,
            canvas_height_ratio: 0.09,
            cube_ratio: 0.06,
            hit_padding_x: 3.0,
            hit_padding_y: 2.0,
            row_divisor: 8.0,
            min_margin: 4.0,
            add_margin_divisor: 100.0,
            add_spacing_factor: 3.0,
            border_radius: 7.0,
            border_width: 2.5,
            border_color: "#ffffff".to_string(),
            max_tokens: MAX_GOAL_TOKENS,
        }
    }
}

impl GoalLineConfig {
    /// Parse a config from JSON and validate it.
    pub fn from_json(json: &str) -> GoalLineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every ratio and divisor is usable.
    pub fn validate(&self) -> GoalLineResult<()> {
        let positive = [
            ("canvas_width_ratio", self.canvas_width_ratio),
            ("canvas_height_ratio", self.canvas_height_ratio),
            ("cube_ratio", self.cube_ratio),
            ("row_divisor", self.row_divisor),
            ("add_margin_divisor", self.add_margin_divisor),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GoalLineError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("hit_padding_x", self.hit_padding_x),
            ("hit_padding_y", self.hit_padding_y),
            ("min_margin", self.min_margin),
            ("add_spacing_factor", self.add_spacing_factor),
            ("border_radius", self.border_radius),
            ("border_width", self.border_width),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(GoalLineError::Config(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GoalLineConfig::from_json(r#"{"min_margin": 8.0}"#).unwrap();
        assert!((config.min_margin - 8.0).abs() < f64::EPSILON);
        assert!((config.canvas_width_ratio - 0.33).abs() < f64::EPSILON);
        assert_eq!(config.max_tokens, MAX_GOAL_TOKENS);
    }

    #[test]
    fn test_rejects_zero_divisor() {
        let err = GoalLineConfig::from_json(r#"{"row_divisor": 0.0}"#).unwrap_err();
        assert!(matches!(err, GoalLineError::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = GoalLineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, GoalLineError::Serialization(_)));
    }
}
