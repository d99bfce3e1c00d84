//! Headless surface that records draw calls.

use crate::surface::{DrawSurface, RenderError, RenderResult, StrokeStyle};
use kurbo::{Affine, BezPath, Rect, Shape, Size, Vec2};

/// One recorded surface call, with transforms resolved to canvas space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand<I> {
    Clear(Rect),
    Save,
    Restore,
    DrawImage {
        image: I,
        rect: Rect,
        transform: Affine,
    },
    StrokePath {
        bounds: Rect,
        transform: Affine,
        width: f64,
    },
}

/// A [`DrawSurface`] that keeps a log of everything drawn on it.
///
/// Used by the replay tool and in tests. Image draws can be made to fail
/// to exercise error paths.
#[derive(Debug)]
pub struct RecordingSurface<I> {
    size: Size,
    transform: Affine,
    stack: Vec<Affine>,
    commands: Vec<DrawCommand<I>>,
    fail_images: bool,
}

impl<I> RecordingSurface<I> {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            transform: Affine::IDENTITY,
            stack: Vec::new(),
            commands: Vec::new(),
            fail_images: false,
        }
    }

    pub fn commands(&self) -> &[DrawCommand<I>] {
        &self.commands
    }

    /// Take the recorded commands (drains the log).
    pub fn take_commands(&mut self) -> Vec<DrawCommand<I>> {
        std::mem::take(&mut self.commands)
    }

    /// Current transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Number of unmatched `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Make every subsequent image draw fail.
    pub fn set_fail_images(&mut self, fail: bool) {
        self.fail_images = fail;
    }

    /// How many times the surface has been cleared.
    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear(_)))
            .count()
    }

    /// Images drawn, in draw order.
    pub fn drawn_images(&self) -> impl Iterator<Item = &I> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::DrawImage { image, .. } => Some(image),
            _ => None,
        })
    }
}

impl<I: Clone> DrawSurface for RecordingSurface<I> {
    type Image = I;

    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) -> RenderResult<()> {
        if !size.is_finite() || size.width < 0.0 || size.height < 0.0 {
            return Err(RenderError::Surface(format!("invalid size {:?}", size)));
        }
        self.size = size;
        Ok(())
    }

    fn clear(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(transform) => {
                self.transform = transform;
                self.commands.push(DrawCommand::Restore);
            }
            None => log::warn!("restore without matching save"),
        }
    }

    fn translate(&mut self, offset: Vec2) -> RenderResult<()> {
        self.transform = self.transform * Affine::translate(offset);
        Ok(())
    }

    fn rotate(&mut self, radians: f64) -> RenderResult<()> {
        self.transform = self.transform * Affine::rotate(radians);
        Ok(())
    }

    fn draw_image(&mut self, image: &I, rect: Rect) -> RenderResult<()> {
        if self.fail_images {
            return Err(RenderError::DrawFailed("image not decoded".to_string()));
        }
        self.commands.push(DrawCommand::DrawImage {
            image: image.clone(),
            rect,
            transform: self.transform,
        });
        Ok(())
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) -> RenderResult<()> {
        self.commands.push(DrawCommand::StrokePath {
            bounds: path.bounding_box(),
            transform: self.transform,
            width: style.width,
        });
        Ok(())
    }
}
