//! Browser host
//!
//! Draws on a 2D canvas, writes the timer into the DOM and toggles the
//! win/loss buttons. Frames are scheduled through `requestAnimationFrame`
//! with a callback installed by the entry point.

use std::collections::BTreeMap;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use super::{Affordance, FrameHandle, Host};
use crate::renderer::{Camera, CanvasRenderer};
use crate::sim::{Element, ElementId, ElementKind, Game};

const TIMER_ID: &str = "timer";

pub struct WebHost {
    window: Window,
    document: Document,
    renderer: Option<CanvasRenderer>,
    proxies: BTreeMap<ElementId, ElementKind>,
    /// Invoked by requestAnimationFrame; set once the session exists
    frame_callback: Option<js_sys::Function>,
}

impl WebHost {
    pub fn new(window: Window, document: Document, renderer: Option<CanvasRenderer>) -> Self {
        Self {
            window,
            document,
            renderer,
            proxies: BTreeMap::new(),
            frame_callback: None,
        }
    }

    pub fn set_frame_callback(&mut self, callback: js_sys::Function) {
        self.frame_callback = Some(callback);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }

    fn set_display(&self, id: &str, display: &str) {
        let Some(el) = self
            .document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            log::warn!("Missing DOM element #{}", id);
            return;
        };
        if let Err(e) = el.style().set_property("display", display) {
            log::warn!("Failed to style #{}: {:?}", id, e);
        }
    }
}

impl Host for WebHost {
    fn create_proxy(&mut self, element: &Element) {
        self.proxies.insert(element.id, element.kind());
    }

    fn restyle_proxy(&mut self, id: ElementId, kind: ElementKind) {
        if let Some(current) = self.proxies.get_mut(&id) {
            *current = kind;
        }
    }

    fn dispose_proxy(&mut self, id: ElementId) {
        self.proxies.remove(&id);
    }

    fn dispose_shared(&mut self) {
        // Canvas paths hold no GPU resources
        log::debug!("Shared resources released");
    }

    fn draw(&mut self, game: &Game, camera: &Camera) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.draw(game, camera, &self.proxies);
        }
    }

    fn request_frame(&mut self) -> FrameHandle {
        let Some(callback) = self.frame_callback.as_ref() else {
            log::warn!("No frame callback installed");
            return FrameHandle(0);
        };
        match self.window.request_animation_frame(callback) {
            Ok(id) => FrameHandle(id),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {:?}", e);
        }
    }

    fn show_affordance(&mut self, affordance: Affordance) {
        self.set_display(affordance.element_id(), "block");
    }

    fn hide_affordance(&mut self, affordance: Affordance) {
        self.set_display(affordance.element_id(), "none");
    }

    fn set_timer_text(&mut self, text: &str) {
        if let Some(el) = self.document.get_element_by_id(TIMER_ID) {
            el.set_text_content(Some(text));
        }
    }
}
