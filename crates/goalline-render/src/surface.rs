//! Drawing surface trait abstraction.

use kurbo::{BezPath, Rect, Size, Vec2};
use peniko::Color;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Draw failed: {0}")]
    DrawFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Stroke parameters for outlines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

impl StrokeStyle {
    /// CSS color string for the stroke (`rgba(r, g, b, a)`).
    pub fn css_color(&self) -> String {
        let c = self.color.to_rgba8();
        format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, f64::from(c.a) / 255.0)
    }
}

/// A 2D drawing surface with a canvas-style transform stack.
///
/// Transforms compose like the HTML canvas: each `translate`/`rotate` is
/// applied in the current local coordinate system.
pub trait DrawSurface {
    /// Drawable image handle.
    type Image;

    /// Current surface size.
    fn size(&self) -> Size;

    /// Resize the backing store. Clears the surface.
    fn resize(&mut self, size: Size) -> RenderResult<()>;

    /// Clear a rectangle to transparent.
    fn clear(&mut self, rect: Rect);

    /// Push the current transform and style state.
    fn save(&mut self);

    /// Pop the state pushed by the matching `save`.
    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2) -> RenderResult<()>;

    fn rotate(&mut self, radians: f64) -> RenderResult<()>;

    /// Draw an image scaled into `rect` (local coordinates).
    fn draw_image(&mut self, image: &Self::Image, rect: Rect) -> RenderResult<()>;

    /// Stroke a path (local coordinates).
    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) -> RenderResult<()>;
}

/// Saved surface state, restored when dropped.
///
/// Derefs to the surface, so drawing happens through the guard and the
/// transform stack is balanced on every exit path, including `?`.
pub struct SavedState<'a, S: DrawSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: DrawSurface + ?Sized> SavedState<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: DrawSurface + ?Sized> Deref for SavedState<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> DerefMut for SavedState<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> Drop for SavedState<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}
