//! Layout geometry and hit-testing for the goal-line canvas.

use crate::config::GoalLineConfig;
use kurbo::{Point, Rect, Size, Vec2};

/// Geometry derived from the viewport size.
///
/// All tokens share one row; only their x position varies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Canvas size in canvas pixels.
    pub canvas_size: Size,
    /// Canvas top-left in client coordinates (bounding-rect offset).
    pub offset: Vec2,
    /// Side of the square cube image.
    pub cube_dim: f64,
    /// Hit box of a token (image plus border padding).
    pub token_size: Size,
    /// Top of the token row.
    pub row_y: f64,
    /// Smallest allowed token x position.
    pub min_margin: f64,
}

impl Layout {
    /// Compute the layout for a viewport and the canvas' client-space origin.
    pub fn compute(viewport: Size, canvas_origin: Point, config: &GoalLineConfig) -> Self {
        let canvas_size = Size::new(
            viewport.width * config.canvas_width_ratio,
            viewport.height * config.canvas_height_ratio,
        );
        let cube_dim = viewport.height * config.cube_ratio;
        Self {
            canvas_size,
            offset: canvas_origin.to_vec2(),
            cube_dim,
            token_size: Size::new(cube_dim + config.hit_padding_x, cube_dim + config.hit_padding_y),
            row_y: canvas_size.height / config.row_divisor,
            min_margin: config.min_margin,
        }
    }

    /// Convert a client-space pointer position into canvas coordinates.
    pub fn client_to_canvas(&self, client: Point) -> Point {
        client - self.offset
    }

    /// Largest allowed token x position. Never below `min_margin`.
    pub fn max_x(&self) -> f64 {
        (self.canvas_size.width - self.token_size.width).max(self.min_margin)
    }

    /// Clamp a token x position into `[min_margin, canvas_width - token_width]`.
    pub fn clamp_x(&self, x: f64) -> f64 {
        if x.is_nan() {
            return self.min_margin;
        }
        x.clamp(self.min_margin, self.max_x())
    }

    /// Hit box of a token whose left edge is at `x`.
    pub fn token_rect(&self, x: f64) -> Rect {
        Rect::from_origin_size(Point::new(x, self.row_y), self.token_size)
    }

    /// Half-open hit test: `[x, x + w) × [row_y, row_y + h)`.
    pub fn hits(&self, x: f64, point: Point) -> bool {
        self.token_rect(x).contains(point)
    }

    /// Center of the cube image of a token at `x`, the rotation pivot.
    pub fn cube_center(&self, x: f64) -> Point {
        Point::new(x + self.cube_dim / 2.0, self.row_y + self.cube_dim / 2.0)
    }

    /// Initial x for the `count`-th token added by the local player.
    ///
    /// The first token sits one margin from the left edge, each further one
    /// is spaced by `spacing * margin + token_width`.
    pub fn appended_x(&self, count: usize, config: &GoalLineConfig) -> f64 {
        let margin = self.canvas_size.width / config.add_margin_divisor;
        let step = config.add_spacing_factor * margin + self.token_size.width;
        margin + count as f64 * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        // 330 x 90 canvas, 60px cubes, 63 x 62 hit boxes, row at 11.25
        Layout::compute(Size::new(1000.0, 1000.0), Point::new(20.0, 100.0), &GoalLineConfig::default())
    }

    #[test]
    fn test_compute_from_viewport() {
        let layout = layout();
        assert!((layout.canvas_size.width - 330.0).abs() < 1e-9);
        assert!((layout.canvas_size.height - 90.0).abs() < 1e-9);
        assert!((layout.cube_dim - 60.0).abs() < 1e-9);
        assert!((layout.token_size.width - 63.0).abs() < 1e-9);
        assert!((layout.token_size.height - 62.0).abs() < 1e-9);
        assert!((layout.row_y - 11.25).abs() < 1e-9);
    }

    #[test]
    fn test_client_to_canvas() {
        let layout = layout();
        assert_eq!(layout.client_to_canvas(Point::new(30.0, 110.0)), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_clamp() {
        let layout = layout();
        assert!((layout.clamp_x(-50.0) - 4.0).abs() < f64::EPSILON);
        assert!((layout.clamp_x(1000.0) - 267.0).abs() < 1e-9);
        assert!((layout.clamp_x(100.0) - 100.0).abs() < f64::EPSILON);
        assert!((layout.clamp_x(f64::NAN) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_narrow_canvas() {
        // Canvas narrower than a token: the upper bound collapses to the margin.
        let layout = Layout::compute(Size::new(100.0, 1000.0), Point::ZERO, &GoalLineConfig::default());
        assert!((layout.max_x() - 4.0).abs() < f64::EPSILON);
        assert!((layout.clamp_x(20.0) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_is_half_open() {
        let layout = layout();
        let row = layout.row_y;
        assert!(layout.hits(10.0, Point::new(10.0, row)));
        assert!(layout.hits(10.0, Point::new(72.5, row + 61.5)));
        assert!(!layout.hits(10.0, Point::new(73.5, row + 1.0)));
        assert!(!layout.hits(10.0, Point::new(20.0, row + 62.5)));
        assert!(!layout.hits(10.0, Point::new(20.0, row - 0.5)));
    }

    #[test]
    fn test_cube_center() {
        let layout = layout();
        assert_eq!(layout.cube_center(10.0), Point::new(40.0, 41.25));
    }

    #[test]
    fn test_appended_positions() {
        let layout = layout();
        let config = GoalLineConfig::default();
        let first = layout.appended_x(0, &config);
        let second = layout.appended_x(1, &config);
        assert!((first - 3.3).abs() < 1e-9);
        assert!((second - (3.3 + 9.9 + 63.0)).abs() < 1e-9);
    }
}
