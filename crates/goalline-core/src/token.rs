//! Cube tokens placed on the goal line.

use crate::error::GoalLineError;
use serde::{Deserialize, Serialize};

/// Orientation of a token, in quarter turns.
///
/// Serialized as integer degrees so it matches the wire payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Orientation {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Orientation {
    /// All orientations in clockwise order.
    pub const ALL: [Orientation; 4] = [
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
        Orientation::Left,
    ];

    /// Build from degrees. Any multiple of 90 is accepted and reduced mod 360.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Orientation::Up),
            90 => Some(Orientation::Right),
            180 => Some(Orientation::Down),
            _ => Some(Orientation::Left),
        }
    }

    /// Degrees in `{0, 90, 180, 270}`.
    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Up => 0,
            Orientation::Right => 90,
            Orientation::Down => 180,
            Orientation::Left => 270,
        }
    }

    /// Rotation angle in radians, for the canvas transform.
    pub fn radians(self) -> f64 {
        f64::from(self.degrees()) * std::f64::consts::PI / 180.0
    }

    /// Rotate a quarter turn clockwise (+90 mod 360).
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Up => Orientation::Right,
            Orientation::Right => Orientation::Down,
            Orientation::Down => Orientation::Left,
            Orientation::Left => Orientation::Up,
        }
    }
}

impl From<Orientation> for i64 {
    fn from(orientation: Orientation) -> Self {
        i64::from(orientation.degrees())
    }
}

impl TryFrom<i64> for Orientation {
    type Error = GoalLineError;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        Orientation::from_degrees(degrees).ok_or(GoalLineError::InvalidOrientation(degrees))
    }
}

/// A cube placed on the goal line.
///
/// `I` is the drawable handle owned by this token. Every token holds its own
/// copy so rotation or highlighting never leaks into the shared asset.
#[derive(Debug, Clone)]
pub struct Token<I> {
    pub(crate) order: usize,
    pub(crate) source_index: usize,
    pub(crate) image: I,
    pub(crate) position_x: f64,
    pub(crate) orientation: Orientation,
    pub(crate) is_dragging: bool,
}

impl<I> Token<I> {
    pub(crate) fn new(
        order: usize,
        source_index: usize,
        image: I,
        position_x: f64,
        orientation: Orientation,
    ) -> Self {
        Self {
            order,
            source_index,
            image,
            position_x,
            orientation,
            is_dragging: false,
        }
    }

    /// Stable index within the goal line; also the sync index.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Resource slot this cube came from.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// The drawable owned by this token.
    pub fn image(&self) -> &I {
        &self.image
    }

    /// Horizontal offset of the token's hit box in canvas coordinates.
    pub fn position_x(&self) -> f64 {
        self.position_x
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }
}
