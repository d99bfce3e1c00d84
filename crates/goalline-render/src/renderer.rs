//! Goal-line render routine.

use crate::surface::{DrawSurface, RenderResult, SavedState, StrokeStyle};
use goalline_core::{GoalLineConfig, Layout, Token};
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape, Size};
use peniko::Color;

/// Tolerance for flattening the rounded border into a path.
const BORDER_TOLERANCE: f64 = 0.1;

/// Parse a CSS hex color like "#ff0000".
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') && s.len() == 7 {
        let r = u8::from_str_radix(&s[1..3], 16).ok()?;
        let g = u8::from_str_radix(&s[3..5], 16).ok()?;
        let b = u8::from_str_radix(&s[5..7], 16).ok()?;
        Some(Color::from_rgba8(r, g, b, 255))
    } else {
        None
    }
}

/// Draws the goal line on any [`DrawSurface`].
#[derive(Debug, Clone)]
pub struct GoalLineRenderer {
    border: StrokeStyle,
    border_radius: f64,
    /// Extra width/height of the border around the cube image.
    padding: Size,
}

impl GoalLineRenderer {
    pub fn from_config(config: &GoalLineConfig) -> Self {
        let color = parse_color(&config.border_color).unwrap_or_else(|| {
            log::warn!("Invalid border color '{}', using white", config.border_color);
            Color::WHITE
        });
        Self {
            border: StrokeStyle {
                color,
                width: config.border_width,
            },
            border_radius: config.border_radius,
            padding: Size::new(config.hit_padding_x, config.hit_padding_y),
        }
    }

    pub fn border(&self) -> &StrokeStyle {
        &self.border
    }

    /// Clear the surface and draw every token, back to front.
    ///
    /// A token that fails to draw is logged and skipped; the first such
    /// error is returned after all tokens have been attempted.
    pub fn render<S: DrawSurface>(
        &self,
        surface: &mut S,
        layout: &Layout,
        tokens: &[Token<S::Image>],
    ) -> RenderResult<()> {
        surface.clear(Rect::from_origin_size(Point::ZERO, surface.size()));

        let mut first_error = None;
        for token in tokens {
            if let Err(e) = self.draw_token(surface, layout, token) {
                log::warn!("Failed to draw cube {}: {}", token.order(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn draw_token<S: DrawSurface>(
        &self,
        surface: &mut S,
        layout: &Layout,
        token: &Token<S::Image>,
    ) -> RenderResult<()> {
        let mut surface = SavedState::new(surface);
        let center = layout.cube_center(token.position_x());
        surface.translate(center.to_vec2())?;
        surface.rotate(token.orientation().radians())?;

        let half = layout.cube_dim / 2.0;
        surface.draw_image(token.image(), Rect::new(-half, -half, half, half))?;
        surface.stroke_path(&self.border_path(layout.cube_dim), &self.border)
    }

    /// Rounded border around a cube of side `cube_dim` centered at the origin.
    pub fn border_path(&self, cube_dim: f64) -> BezPath {
        let x0 = -(cube_dim / 2.0) - 1.0;
        let y0 = -(cube_dim / 2.0) - 1.0;
        RoundedRect::new(
            x0,
            y0,
            x0 + cube_dim + self.padding.width,
            y0 + cube_dim + self.padding.height,
            self.border_radius,
        )
        .path_elements(BORDER_TOLERANCE)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawCommand, RecordingSurface};
    use kurbo::Affine;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0000"), Some(Color::from_rgba8(255, 0, 0, 255)));
        assert_eq!(parse_color(" #FFFFFF "), Some(Color::WHITE));
        assert_eq!(parse_color("white"), None);
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#gg0000"), None);
    }

    #[test]
    fn test_invalid_border_color_falls_back() {
        let config = GoalLineConfig {
            border_color: "nope".to_string(),
            ..GoalLineConfig::default()
        };
        let renderer = GoalLineRenderer::from_config(&config);
        assert_eq!(renderer.border().color, Color::WHITE);
        assert!((renderer.border().width - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_border_path_bounds() {
        let renderer = GoalLineRenderer::from_config(&GoalLineConfig::default());
        let bounds = renderer.border_path(60.0).bounding_box();
        assert!((bounds.x0 + 31.0).abs() < 1e-6);
        assert!((bounds.y0 + 31.0).abs() < 1e-6);
        assert!((bounds.x1 - 32.0).abs() < 1e-6);
        assert!((bounds.y1 - 31.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_render_only_clears() {
        let renderer = GoalLineRenderer::from_config(&GoalLineConfig::default());
        let mut surface = RecordingSurface::<&str>::new(Size::new(330.0, 90.0));
        let layout = Layout::compute(Size::new(1000.0, 1000.0), Point::ZERO, &GoalLineConfig::default());

        renderer.render(&mut surface, &layout, &[]).unwrap();
        assert_eq!(
            surface.commands(),
            &[DrawCommand::Clear(Rect::new(0.0, 0.0, 330.0, 90.0))]
        );
        assert_eq!(surface.transform(), Affine::IDENTITY);
    }
}
