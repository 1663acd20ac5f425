//! Platform abstraction layer
//!
//! The game core never touches a renderer or the DOM directly. A `Host`
//! provides:
//! - Visual proxies for elements (create/restyle/dispose)
//! - Per-frame scheduling
//! - Win/loss affordances and the timer text

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessHost;
#[cfg(target_arch = "wasm32")]
pub use web::WebHost;

use crate::renderer::Camera;
use crate::sim::{Element, ElementId, ElementKind, Game};

/// Handle for a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Buttons shown when a session ends; acknowledging one restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Affordance {
    Lost,
    Won,
}

impl Affordance {
    /// DOM id of the matching button
    pub fn element_id(&self) -> &'static str {
        match self {
            Affordance::Lost => "lostButton",
            Affordance::Won => "wonButton",
        }
    }
}

/// Rendering/windowing collaborator
pub trait Host {
    /// Create a visual proxy for a newly spawned element
    fn create_proxy(&mut self, element: &Element);

    /// Swap the proxy's material after a kind change
    fn restyle_proxy(&mut self, id: ElementId, kind: ElementKind);

    /// Release the proxy's geometry and material
    fn dispose_proxy(&mut self, id: ElementId);

    /// Release resources shared by every proxy of a session
    fn dispose_shared(&mut self);

    /// Sync proxy transforms and draw the scene
    fn draw(&mut self, game: &Game, camera: &Camera);

    /// Ask for the next frame callback
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending frame callback
    fn cancel_frame(&mut self, handle: FrameHandle);

    fn show_affordance(&mut self, affordance: Affordance);

    fn hide_affordance(&mut self, affordance: Affordance);

    /// Write the "MM:SS" elapsed-time text
    fn set_timer_text(&mut self, text: &str);
}
