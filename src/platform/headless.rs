//! Headless host
//!
//! Keeps the presentation state in memory. Drives the native demo and the
//! session tests.

use std::collections::{BTreeMap, BTreeSet};

use super::{Affordance, FrameHandle, Host};
use crate::renderer::Camera;
use crate::sim::{Element, ElementId, ElementKind, Game};

/// In-memory host that records what a real renderer would show
#[derive(Debug, Default)]
pub struct HeadlessHost {
    /// Live proxies and their current colour category
    pub proxies: BTreeMap<ElementId, ElementKind>,
    /// Currently visible affordances
    pub visible: BTreeSet<Affordance>,
    pub timer_text: String,
    /// Outstanding frame request
    pub pending_frame: Option<FrameHandle>,
    /// Proxies disposed over the host's lifetime
    pub disposed_proxies: usize,
    /// Shared-resource teardowns over the host's lifetime
    pub shared_disposals: usize,
    pub frames_drawn: u64,
    next_frame: i32,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, affordance: Affordance) -> bool {
        self.visible.contains(&affordance)
    }
}

impl Host for HeadlessHost {
    fn create_proxy(&mut self, element: &Element) {
        log::trace!(
            "Proxy {} created ({:?} {:?})",
            element.id,
            element.variant(),
            element.shape
        );
        self.proxies.insert(element.id, element.kind());
    }

    fn restyle_proxy(&mut self, id: ElementId, kind: ElementKind) {
        if let Some(current) = self.proxies.get_mut(&id) {
            *current = kind;
        }
    }

    fn dispose_proxy(&mut self, id: ElementId) {
        if self.proxies.remove(&id).is_some() {
            self.disposed_proxies += 1;
        }
    }

    fn dispose_shared(&mut self) {
        self.shared_disposals += 1;
    }

    fn draw(&mut self, _game: &Game, _camera: &Camera) {
        self.frames_drawn += 1;
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.pending_frame = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending_frame == Some(handle) {
            self.pending_frame = None;
        }
    }

    fn show_affordance(&mut self, affordance: Affordance) {
        self.visible.insert(affordance);
    }

    fn hide_affordance(&mut self, affordance: Affordance) {
        self.visible.remove(&affordance);
    }

    fn set_timer_text(&mut self, text: &str) {
        if self.timer_text != text {
            self.timer_text.clear();
            self.timer_text.push_str(text);
        }
    }
}
