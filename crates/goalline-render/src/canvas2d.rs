//! Canvas 2D surface for the browser.

use crate::surface::{DrawSurface, RenderError, RenderResult, StrokeStyle};
use kurbo::{BezPath, PathEl, Rect, Size, Vec2};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// [`DrawSurface`] backed by an HTML canvas element's 2D context.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    pub fn new(canvas: HtmlCanvasElement) -> RenderResult<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| RenderError::InitFailed(js_error(e)))?
            .ok_or_else(|| RenderError::InitFailed("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::InitFailed("not a CanvasRenderingContext2d".to_string()))?;
        Ok(Self { canvas, context })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl DrawSurface for Canvas2dSurface {
    type Image = HtmlImageElement;

    fn size(&self) -> Size {
        Size::new(f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn resize(&mut self, size: Size) -> RenderResult<()> {
        if !size.is_finite() || size.width < 0.0 || size.height < 0.0 {
            return Err(RenderError::Surface(format!("invalid size {:?}", size)));
        }
        // The backing store is in whole pixels.
        self.canvas.set_width(size.width.round() as u32);
        self.canvas.set_height(size.height.round() as u32);
        Ok(())
    }

    fn clear(&mut self, rect: Rect) {
        self.context
            .clear_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn save(&mut self) {
        self.context.save();
    }

    fn restore(&mut self) {
        self.context.restore();
    }

    fn translate(&mut self, offset: Vec2) -> RenderResult<()> {
        self.context
            .translate(offset.x, offset.y)
            .map_err(|e| RenderError::Surface(js_error(e)))
    }

    fn rotate(&mut self, radians: f64) -> RenderResult<()> {
        self.context
            .rotate(radians)
            .map_err(|e| RenderError::Surface(js_error(e)))
    }

    fn draw_image(&mut self, image: &HtmlImageElement, rect: Rect) -> RenderResult<()> {
        self.context
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
            )
            .map_err(|e| RenderError::DrawFailed(js_error(e)))
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) -> RenderResult<()> {
        let ctx = &self.context;
        ctx.set_stroke_style_str(&style.css_color());
        ctx.set_line_width(style.width);
        ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
                PathEl::ClosePath => ctx.close_path(),
            }
        }
        ctx.stroke();
        Ok(())
    }
}
