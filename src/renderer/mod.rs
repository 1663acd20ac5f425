//! Rendering module
//!
//! The camera is shared by picking and drawing. On the web, elements are
//! painted onto a 2D canvas through the camera projection.

pub mod camera;
#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use camera::{Camera, ndc_to_screen, screen_to_ndc};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
