//! Goal-Line Application
//!
//! The application shell: a wasm-bindgen entry point that binds the goal
//! canvas to the page and the game socket, and a headless replay driver.

mod config;
mod error;
pub mod replay;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{GoalLine, JsEventChannel, start};
