//! Pointer input types and the drag state machine state.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Option<Self> {
        match code {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Pointer event in canvas-local coordinates.
///
/// A `Down` with the right button is the secondary click that rotates a
/// token; browsers deliver it as `contextmenu`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => position,
        }
    }

    /// The same event with its position mapped through `f`.
    pub fn map_position(self, f: impl FnOnce(Point) -> Point) -> Self {
        match self {
            PointerEvent::Down { position, button } => PointerEvent::Down {
                position: f(position),
                button,
            },
            PointerEvent::Up { position, button } => PointerEvent::Up {
                position: f(position),
                button,
            },
            PointerEvent::Move { position } => PointerEvent::Move { position: f(position) },
        }
    }
}

/// Drag state of the goal line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    /// A token is being dragged.
    Dragging {
        /// Order of the dragged token.
        order: usize,
        /// Pointer x at the previous move (or at pointer-down).
        last_x: f64,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Order of the dragged token, if any.
    pub fn dragged(&self) -> Option<usize> {
        match *self {
            DragState::Dragging { order, .. } => Some(order),
            DragState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_button_codes() {
        assert_eq!(MouseButton::from_dom(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_dom(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_dom(7), None);
    }

    #[test]
    fn test_pointer_event_json() {
        let json = r#"{"kind":"down","position":{"x":12.0,"y":3.0},"button":"right"}"#;
        let event: PointerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            PointerEvent::Down {
                position: Point::new(12.0, 3.0),
                button: MouseButton::Right,
            }
        );
        assert_eq!(event.position(), Point::new(12.0, 3.0));
    }

    #[test]
    fn test_drag_state() {
        assert!(!DragState::default().is_dragging());
        let drag = DragState::Dragging { order: 2, last_x: 5.0 };
        assert!(drag.is_dragging());
        assert_eq!(drag.dragged(), Some(2));
    }
}
