//! Goal-Line Render Library
//!
//! Drawing surface abstraction and the goal-line render routine. The default
//! browser implementation draws on a Canvas 2D context; a recording surface
//! is provided for headless use.

mod recording;
mod renderer;
mod surface;
mod view;

#[cfg(target_arch = "wasm32")]
mod canvas2d;

pub use recording::{DrawCommand, RecordingSurface};
pub use renderer::{GoalLineRenderer, parse_color};
pub use surface::{DrawSurface, RenderError, RenderResult, SavedState, StrokeStyle};
pub use view::GoalLineView;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2dSurface;
