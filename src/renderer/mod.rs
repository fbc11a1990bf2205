//! Rendering module
//!
//! [`RenderFrame`] is a plain draw list captured from the game state; it is
//! what gets painted and what tests inspect. The Canvas 2D painter only
//! exists in the browser build.

pub mod frame;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;
pub use frame::{RenderFrame, Shape, Sprite};
