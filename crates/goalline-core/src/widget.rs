//! The goal-line widget: tokens, drag/rotate state machine and sync.

use crate::assets::AssetProvider;
use crate::channel::EventChannel;
use crate::config::GoalLineConfig;
use crate::error::{GoalLineError, GoalLineResult};
use crate::input::{DragState, MouseButton, PointerEvent};
use crate::layout::Layout;
use crate::protocol::{GoalEntry, GoalLineUpdate, RemoteUpdate, UPDATE_GOALLINE};
use crate::token::{Orientation, Token};
use kurbo::Point;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Inbound updates decoded by the channel handler, waiting to be applied.
type Inbox = Rc<RefCell<VecDeque<GoalLineUpdate>>>;

/// Interactive goal line owned by one game view.
///
/// The widget never draws. Every mutation that changes what is on screen
/// raises a redraw flag, which the view drains with [`take_needs_redraw`].
///
/// [`take_needs_redraw`]: GoalLineWidget::take_needs_redraw
pub struct GoalLineWidget<I, C: EventChannel> {
    /// Tokens in insertion order; index equals order.
    tokens: Vec<Token<I>>,
    layout: Layout,
    config: GoalLineConfig,
    drag: DragState,
    /// Whether pointer callbacks are attached.
    input_enabled: bool,
    channel: C,
    inbox: Inbox,
    needs_redraw: bool,
}

impl<I, C: EventChannel> GoalLineWidget<I, C> {
    /// Create an empty goal line and subscribe to remote updates on `channel`.
    pub fn new(layout: Layout, config: GoalLineConfig, mut channel: C) -> Self {
        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let sink = Rc::clone(&inbox);
        channel.on(
            UPDATE_GOALLINE,
            Box::new(move |payload: &serde_json::Value| {
                match RemoteUpdate::from_payload(payload).and_then(GoalLineUpdate::try_from) {
                    Ok(update) => sink.borrow_mut().push_back(update),
                    Err(e) => log::warn!("Ignoring inbound goal-line update: {}", e),
                }
            }),
        );

        Self {
            tokens: Vec::new(),
            layout,
            config,
            drag: DragState::Idle,
            input_enabled: false,
            channel,
            inbox,
            needs_redraw: true,
        }
    }

    // --- Accessors ---

    /// Tokens in ascending order (back to front).
    pub fn tokens(&self) -> &[Token<I>] {
        &self.tokens
    }

    pub fn token(&self, order: usize) -> Option<&Token<I>> {
        self.tokens.get(order)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &GoalLineConfig {
        &self.config
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Take the redraw flag, clearing it.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // --- Input registration ---

    /// Start reacting to pointer input (local player is the goal-setter).
    pub fn register_input_handlers(&mut self) {
        self.input_enabled = true;
    }

    /// Stop reacting to pointer input. Token state is kept; an active drag
    /// is committed.
    pub fn deregister_input_handlers(&mut self) {
        self.finish_drag();
        self.input_enabled = false;
    }

    // --- Geometry ---

    /// Topmost token under a canvas-local point. Later tokens win on overlap.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.tokens
            .iter()
            .rev()
            .find(|token| self.layout.hits(token.position_x, point))
            .map(|token| token.order)
    }

    // --- Pointer state machine ---

    /// Route a canvas-local pointer event. Returns true if it changed state.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.pointer_down(position).is_some(),
            PointerEvent::Down {
                position,
                button: MouseButton::Right,
            } => self.secondary_click(position).is_some(),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.pointer_up().is_some(),
            PointerEvent::Move { position } => self.pointer_move(position),
            _ => false,
        }
    }

    /// Primary button pressed. Starts dragging the topmost hit token.
    pub fn pointer_down(&mut self, position: Point) -> Option<usize> {
        if !self.input_enabled {
            return None;
        }
        // A lost pointer-up must not leave two tokens dragging.
        if self.drag.is_dragging() {
            log::debug!("Pointer down during drag; committing previous drag");
            self.finish_drag();
        }

        let order = self.hit_test(position)?;
        if let Some(token) = self.tokens.get_mut(order) {
            token.is_dragging = true;
        }
        self.drag = DragState::Dragging {
            order,
            last_x: position.x,
        };
        log::debug!("Drag start on token {} at x={}", order, position.x);
        Some(order)
    }

    /// Pointer moved. Moves the dragged token by the horizontal delta,
    /// wherever the pointer is.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        if !self.input_enabled {
            return false;
        }
        let DragState::Dragging { order, last_x } = self.drag else {
            return false;
        };
        if !position.x.is_finite() {
            log::debug!("Ignoring pointer move at x={}", position.x);
            return false;
        }

        let dx = position.x - last_x;
        let layout = self.layout;
        if let Some(token) = self.tokens.get_mut(order) {
            token.position_x = layout.clamp_x(token.position_x + dx);
        }
        self.drag = DragState::Dragging {
            order,
            last_x: position.x,
        };
        self.needs_redraw = true;
        true
    }

    /// Primary button released. Commits the drag and emits the position.
    pub fn pointer_up(&mut self) -> Option<GoalLineUpdate> {
        if !self.input_enabled {
            return None;
        }
        self.finish_drag()
    }

    /// Secondary click. Rotates the topmost hit token a quarter turn.
    pub fn secondary_click(&mut self, position: Point) -> Option<GoalLineUpdate> {
        if !self.input_enabled {
            return None;
        }
        let order = self.hit_test(position)?;
        let token = self.tokens.get_mut(order)?;
        token.orientation = token.orientation.rotated();

        let update = GoalLineUpdate::Orientation {
            order,
            orientation: token.orientation,
        };
        log::debug!("Rotated token {} to {}°", order, token.orientation.degrees());
        self.emit(update);
        self.needs_redraw = true;
        Some(update)
    }

    /// End the active drag, if any, and emit its final position.
    fn finish_drag(&mut self) -> Option<GoalLineUpdate> {
        let DragState::Dragging { order, .. } = std::mem::take(&mut self.drag) else {
            return None;
        };
        let token = self.tokens.get_mut(order)?;
        token.is_dragging = false;

        let update = GoalLineUpdate::XPos {
            order,
            x_pos: token.position_x,
        };
        log::debug!("Drag end on token {} at x={}", order, token.position_x);
        self.emit(update);
        Some(update)
    }

    /// Drop the active drag without emitting (the tokens are being replaced).
    fn abandon_drag(&mut self) {
        if let DragState::Dragging { order, .. } = std::mem::take(&mut self.drag) {
            if let Some(token) = self.tokens.get_mut(order) {
                token.is_dragging = false;
            }
        }
    }

    // --- Layout ---

    /// Apply a new layout after a viewport resize.
    ///
    /// Token positions and orientations are kept. An active drag is
    /// committed first, since its pointer bookkeeping belongs to the old
    /// layout.
    pub fn resize(&mut self, layout: Layout) {
        if self.drag.is_dragging() {
            log::debug!("Resize during drag; committing drag");
            self.finish_drag();
        }
        self.layout = layout;
        self.needs_redraw = true;
    }

    // --- Sequence operations ---

    /// Replace the goal line with the server's arrangement.
    ///
    /// Images are resolved up front; if any is missing the goal line is
    /// left untouched.
    pub fn initialize<A>(&mut self, entries: &[GoalEntry], assets: &A, cube_index: &[i32]) -> GoalLineResult<()>
    where
        A: AssetProvider<Image = I>,
    {
        let images = entries
            .iter()
            .map(|entry| {
                assets
                    .token_image(cube_index, entry.idx)
                    .ok_or(GoalLineError::MissingAsset { source_index: entry.idx })
            })
            .collect::<GoalLineResult<Vec<I>>>()?;

        self.abandon_drag();
        let layout = self.layout;
        self.tokens = entries
            .iter()
            .zip(images)
            .enumerate()
            .map(|(order, (entry, image))| {
                Token::new(order, entry.idx, image, layout.clamp_x(entry.x), entry.orientation)
            })
            .collect();

        if self.tokens.len() > self.config.max_tokens {
            log::warn!(
                "Goal has {} cubes, more than the {} a goal can hold",
                self.tokens.len(),
                self.config.max_tokens
            );
        }
        log::info!("Goal line initialized with {} cubes", self.tokens.len());
        self.needs_redraw = true;
        Ok(())
    }

    /// Append a cube moved from the resources onto the goal line.
    ///
    /// The image is taken by value: it now belongs to the goal line. The new
    /// position is broadcast so other participants place it identically.
    pub fn add_token(&mut self, source_index: usize, image: I) -> GoalLineUpdate {
        let order = self.tokens.len();
        let x_pos = self.layout.clamp_x(self.layout.appended_x(order, &self.config));
        self.tokens
            .push(Token::new(order, source_index, image, x_pos, Orientation::Up));

        if self.tokens.len() > self.config.max_tokens {
            log::warn!(
                "Goal has {} cubes, more than the {} a goal can hold",
                self.tokens.len(),
                self.config.max_tokens
            );
        }

        let update = GoalLineUpdate::XPos { order, x_pos };
        self.emit(update);
        self.needs_redraw = true;
        update
    }

    /// Remove every token (a new round begins).
    pub fn clear(&mut self) {
        self.abandon_drag();
        self.tokens.clear();
        self.inbox.borrow_mut().clear();
        self.needs_redraw = true;
    }

    // --- Synchronization ---

    /// Overwrite one token's field from another participant's update.
    ///
    /// Last write wins. Updates for orders not on the goal line are
    /// ignored: they are stale messages racing a clear or initialize.
    pub fn apply_remote_update(&mut self, update: GoalLineUpdate) -> bool {
        let layout = self.layout;
        let Some(token) = self.tokens.get_mut(update.order()) else {
            log::debug!("Ignoring update for missing token {}", update.order());
            return false;
        };

        match update {
            GoalLineUpdate::XPos { x_pos, .. } => {
                token.position_x = layout.clamp_x(x_pos);
            }
            GoalLineUpdate::Orientation { orientation, .. } => {
                token.orientation = orientation;
            }
        }
        self.needs_redraw = true;
        true
    }

    /// Decode and apply one inbound `{type, order, new_val}` update.
    /// Malformed updates are logged and ignored.
    pub fn apply_remote_parts(&mut self, kind: &str, order: usize, new_val: f64) -> bool {
        match RemoteUpdate::from_parts(kind, order, new_val).and_then(GoalLineUpdate::try_from) {
            Ok(update) => self.apply_remote_update(update),
            Err(e) => {
                log::warn!("Ignoring inbound goal-line update: {}", e);
                false
            }
        }
    }

    /// Apply every update received through the channel since the last call.
    /// Returns how many were applied.
    pub fn sync_remote(&mut self) -> usize {
        let pending: Vec<GoalLineUpdate> = self.inbox.borrow_mut().drain(..).collect();
        pending
            .into_iter()
            .filter(|update| self.apply_remote_update(*update))
            .count()
    }

    fn emit(&mut self, update: GoalLineUpdate) {
        match update.to_payload() {
            Ok(payload) => {
                log::debug!("Sending {} {}", update.event_name(), payload);
                self.channel.send(update.event_name(), payload);
            }
            Err(e) => log::error!("Failed to encode {}: {}", update.event_name(), e),
        }
    }
}

impl<I: std::fmt::Debug, C: EventChannel> std::fmt::Debug for GoalLineWidget<I, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalLineWidget")
            .field("tokens", &self.tokens)
            .field("layout", &self.layout)
            .field("drag", &self.drag)
            .field("input_enabled", &self.input_enabled)
            .finish_non_exhaustive()
    }
}
