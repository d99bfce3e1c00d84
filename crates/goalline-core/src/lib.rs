//! Goal-Line Core Library
//!
//! Platform-agnostic data structures and logic for the goal-line canvas
//! widget: tokens, layout geometry, the drag/rotate state machine and the
//! synchronization protocol shared with other participants.

pub mod assets;
pub mod channel;
pub mod config;
pub mod error;
pub mod input;
pub mod layout;
pub mod protocol;
pub mod token;
pub mod widget;

pub use assets::{AssetProvider, CubeColor, ImageCache, asset_name, ASSET_NAMES};
pub use channel::{EventChannel, HandlerRegistry, InboundHandler, LocalChannel};
pub use config::GoalLineConfig;
pub use error::{GoalLineError, GoalLineResult};
pub use input::{DragState, MouseButton, PointerEvent};
pub use layout::Layout;
pub use protocol::{GoalEntry, GoalLineUpdate, RemoteUpdate, UPDATE_GOALLINE};
pub use token::{Orientation, Token};
pub use widget::GoalLineWidget;
