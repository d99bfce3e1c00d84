//! A goal-line widget bound to a drawing surface.

use crate::renderer::GoalLineRenderer;
use crate::surface::{DrawSurface, RenderResult};
use goalline_core::{
    AssetProvider, EventChannel, GoalEntry, GoalLineConfig, GoalLineResult, GoalLineUpdate, GoalLineWidget, Layout,
    PointerEvent,
};
use kurbo::{Point, Size};

/// Owns a [`GoalLineWidget`] and the surface it is shown on.
///
/// Every operation forwards to the widget and redraws if the widget
/// reports a visible change. Pointer positions are in client coordinates.
pub struct GoalLineView<S: DrawSurface, C: EventChannel> {
    widget: GoalLineWidget<S::Image, C>,
    surface: S,
    renderer: GoalLineRenderer,
}

impl<S: DrawSurface, C: EventChannel> GoalLineView<S, C> {
    /// Create a view sized for `viewport`, with the canvas at `canvas_origin`.
    pub fn new(
        mut surface: S,
        viewport: Size,
        canvas_origin: Point,
        config: GoalLineConfig,
        channel: C,
    ) -> RenderResult<Self> {
        let layout = Layout::compute(viewport, canvas_origin, &config);
        surface.resize(layout.canvas_size)?;
        let renderer = GoalLineRenderer::from_config(&config);
        let mut view = Self {
            widget: GoalLineWidget::new(layout, config, channel),
            surface,
            renderer,
        };
        view.redraw_if_needed();
        Ok(view)
    }

    pub fn widget(&self) -> &GoalLineWidget<S::Image, C> {
        &self.widget
    }

    /// Mutable widget access. Call [`redraw_if_needed`] afterwards.
    ///
    /// [`redraw_if_needed`]: GoalLineView::redraw_if_needed
    pub fn widget_mut(&mut self) -> &mut GoalLineWidget<S::Image, C> {
        &mut self.widget
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Render if the widget changed since the last frame. Returns true if a
    /// frame was drawn (even a partially failed one).
    pub fn redraw_if_needed(&mut self) -> bool {
        if !self.widget.take_needs_redraw() {
            return false;
        }
        if let Err(e) = self
            .renderer
            .render(&mut self.surface, self.widget.layout(), self.widget.tokens())
        {
            log::error!("Goal line render failed: {}", e);
        }
        true
    }

    // --- Input ---

    pub fn register_input_handlers(&mut self) {
        self.widget.register_input_handlers();
    }

    pub fn deregister_input_handlers(&mut self) {
        self.widget.deregister_input_handlers();
        self.redraw_if_needed();
    }

    /// Route a pointer event given in client coordinates.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        let layout = *self.widget.layout();
        let changed = self
            .widget
            .handle_pointer_event(event.map_position(|p| layout.client_to_canvas(p)));
        self.redraw_if_needed();
        changed
    }

    pub fn pointer_down(&mut self, client: Point) -> Option<usize> {
        let order = self.widget.pointer_down(self.to_canvas(client));
        self.redraw_if_needed();
        order
    }

    pub fn pointer_move(&mut self, client: Point) -> bool {
        let moved = self.widget.pointer_move(self.to_canvas(client));
        self.redraw_if_needed();
        moved
    }

    pub fn pointer_up(&mut self) -> Option<GoalLineUpdate> {
        let update = self.widget.pointer_up();
        self.redraw_if_needed();
        update
    }

    pub fn secondary_click(&mut self, client: Point) -> Option<GoalLineUpdate> {
        let update = self.widget.secondary_click(self.to_canvas(client));
        self.redraw_if_needed();
        update
    }

    fn to_canvas(&self, client: Point) -> Point {
        self.widget.layout().client_to_canvas(client)
    }

    // --- Layout ---

    /// Recompute the layout for a new viewport and redraw.
    pub fn resize(&mut self, viewport: Size, canvas_origin: Point) -> RenderResult<()> {
        let layout = Layout::compute(viewport, canvas_origin, self.widget.config());
        self.surface.resize(layout.canvas_size)?;
        self.widget.resize(layout);
        log::debug!(
            "Goal line resized to {}x{}",
            layout.canvas_size.width,
            layout.canvas_size.height
        );
        self.redraw_if_needed();
        Ok(())
    }

    // --- Sequence operations ---

    pub fn initialize<A>(&mut self, entries: &[GoalEntry], assets: &A, cube_index: &[i32]) -> GoalLineResult<()>
    where
        A: AssetProvider<Image = S::Image>,
    {
        self.widget.initialize(entries, assets, cube_index)?;
        self.redraw_if_needed();
        Ok(())
    }

    pub fn add_token(&mut self, source_index: usize, image: S::Image) -> GoalLineUpdate {
        let update = self.widget.add_token(source_index, image);
        self.redraw_if_needed();
        update
    }

    pub fn clear(&mut self) {
        self.widget.clear();
        self.redraw_if_needed();
    }

    // --- Synchronization ---

    pub fn apply_remote_update(&mut self, update: GoalLineUpdate) -> bool {
        let applied = self.widget.apply_remote_update(update);
        self.redraw_if_needed();
        applied
    }

    /// Decode and apply one inbound update. Malformed updates are ignored.
    pub fn apply_remote_parts(&mut self, kind: &str, order: usize, new_val: f64) -> bool {
        let applied = self.widget.apply_remote_parts(kind, order, new_val);
        self.redraw_if_needed();
        applied
    }

    /// Apply queued inbound updates and redraw once.
    pub fn sync_remote(&mut self) -> usize {
        let applied = self.widget.sync_remote();
        self.redraw_if_needed();
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingSurface;
    use goalline_core::{ImageCache, LocalChannel, MouseButton, Orientation, UPDATE_GOALLINE};
    use serde_json::json;

    type TestView = GoalLineView<RecordingSurface<&'static str>, LocalChannel>;

    /// Canvas at client (50, 20); 330 x 90 with the row at 11.25.
    fn view() -> TestView {
        let mut view = GoalLineView::new(
            RecordingSurface::new(Size::ZERO),
            Size::new(1000.0, 1000.0),
            Point::new(50.0, 20.0),
            GoalLineConfig::default(),
            LocalChannel::new(),
        )
        .unwrap();
        view.register_input_handlers();
        view
    }

    fn assets() -> ImageCache<&'static str> {
        let mut cache = ImageCache::new();
        for name in goalline_core::ASSET_NAMES {
            cache.insert(name, name);
        }
        cache
    }

    fn populated() -> TestView {
        let mut view = view();
        let entries = [
            GoalEntry { idx: 0, x: 10.0, orientation: Orientation::Up },
            GoalEntry { idx: 1, x: 150.0, orientation: Orientation::Up },
        ];
        view.initialize(&entries, &assets(), &[0; 24]).unwrap();
        view.surface_mut().take_commands();
        view
    }

    #[test]
    fn test_new_sizes_surface_and_draws() {
        let view = view();
        assert_eq!(view.surface().size(), Size::new(330.0, 90.0));
        assert_eq!(view.surface().clear_count(), 1);
    }

    #[test]
    fn test_drag_in_client_coordinates_redraws() {
        let mut view = populated();
        // Client (65, 32) is canvas (15, 12), inside token 0.
        assert_eq!(view.pointer_down(Point::new(65.0, 32.0)), Some(0));
        assert_eq!(view.surface().clear_count(), 0);

        assert!(view.pointer_move(Point::new(85.0, 32.0)));
        assert_eq!(view.surface().clear_count(), 1);
        assert_eq!(view.surface().drawn_images().count(), 2);

        let update = view.pointer_up().unwrap();
        assert_eq!(update, GoalLineUpdate::XPos { order: 0, x_pos: 30.0 });
    }

    #[test]
    fn test_miss_does_not_redraw() {
        let mut view = populated();
        assert_eq!(view.pointer_down(Point::new(320.0, 32.0)), None);
        assert!(!view.pointer_move(Point::new(330.0, 32.0)));
        assert!(view.surface().commands().is_empty());
    }

    #[test]
    fn test_contextmenu_event_rotates() {
        let mut view = populated();
        let event = PointerEvent::Down {
            position: Point::new(210.0, 40.0),
            button: MouseButton::Right,
        };
        assert!(view.handle_pointer_event(event));
        assert_eq!(view.widget().token(1).unwrap().orientation(), Orientation::Right);
        assert_eq!(view.surface().clear_count(), 1);
    }

    #[test]
    fn test_resize_redraws_with_same_positions() {
        let mut view = populated();
        view.resize(Size::new(2000.0, 1000.0), Point::ZERO).unwrap();

        assert_eq!(view.surface().size(), Size::new(660.0, 90.0));
        assert_eq!(view.surface().clear_count(), 1);
        let xs: Vec<f64> = view.widget().tokens().iter().map(|t| t.position_x()).collect();
        assert_eq!(xs, vec![10.0, 150.0]);
    }

    #[test]
    fn test_inbound_sync_redraws_once() {
        let mut view = populated();
        let channel = view.widget_mut().channel_mut();
        channel.dispatch(UPDATE_GOALLINE, &json!({"type": "x_pos", "order": 0, "new_val": 40.0}));
        channel.dispatch(UPDATE_GOALLINE, &json!({"type": "orientation", "order": 1, "new_val": 180}));

        assert_eq!(view.sync_remote(), 2);
        assert_eq!(view.surface().clear_count(), 1);
        assert_eq!(view.widget().token(1).unwrap().orientation(), Orientation::Down);
    }

    #[test]
    fn test_malformed_remote_parts_do_not_redraw() {
        let mut view = populated();
        assert!(!view.apply_remote_parts("color", 0, 3.0));
        assert!(!view.apply_remote_parts("orientation", 1, 45.0));
        assert!(view.surface().commands().is_empty());

        assert!(view.apply_remote_parts("x_pos", 0, 40.0));
        assert_eq!(view.surface().clear_count(), 1);
        assert!((view.widget().token(0).unwrap().position_x() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear_redraws_empty() {
        let mut view = populated();
        view.clear();
        assert_eq!(view.surface().clear_count(), 1);
        assert_eq!(view.surface().drawn_images().count(), 0);
    }
}
