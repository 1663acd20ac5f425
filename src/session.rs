//! Session controller
//!
//! Owns the active `Game` and the frame-loop handle, and translates host
//! callbacks (frame ticks, pointer clicks, button acknowledgements) into game
//! operations. Lifecycle: `Idle -> Running -> Ended -> Running (restart)`.

use glam::{Vec2, Vec3};

use crate::format_elapsed;
use crate::platform::{Affordance, FrameHandle, Host};
use crate::renderer::Camera;
use crate::settings::Settings;
use crate::sim::{ClickEffect, ElementKind, Game, GameEvent, Outcome, Ray, Variant};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No game started yet
    Idle,
    /// A game is in progress
    Running,
    /// The game ended; waiting for the player to acknowledge
    Ended,
}

/// Drives one active game against a host
pub struct Session<H: Host> {
    host: H,
    settings: Settings,
    camera: Camera,
    game: Option<Game>,
    state: SessionState,
    frame: Option<FrameHandle>,
}

impl<H: Host> Session<H> {
    /// Create an idle session; invalid settings fall back to the defaults
    pub fn new(host: H, settings: Settings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Invalid settings ({}), using defaults", e);
                Settings::default()
            }
        };
        let camera = Camera::new(settings.camera_fov_deg, 1.0);
        Self {
            host,
            settings,
            camera,
            game: None,
            state: SessionState::Idle,
            frame: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Update the camera after a viewport resize
    pub fn resize(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
    }

    /// Start a session with the configured element count
    pub fn start(&mut self, seed: u64) {
        self.init_session(self.settings.element_count, seed);
    }

    /// Cancel the running loop, replace the game and populate it
    pub fn init_session(&mut self, element_count: usize, seed: u64) {
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }

        if let Some(mut old) = self.game.take() {
            old.dispose();
            forward_events(&mut old, &mut self.host);
        }
        self.host.hide_affordance(Affordance::Lost);
        self.host.hide_affordance(Affordance::Won);

        let mut game = Game::new(seed, &self.settings);
        for _ in 0..element_count {
            game.spawn_random(self.settings.spawn_half_extents);
        }
        forward_events(&mut game, &mut self.host);

        let count = |v: Variant| game.elements().filter(|e| e.variant() == v).count();
        log::info!(
            "Session started with seed {}: {} elements ({} collect, {} avoid, {} change)",
            seed,
            game.len(),
            count(Variant::Collect),
            count(Variant::Avoid),
            count(Variant::Change)
        );

        self.host.set_timer_text(&format_elapsed(0.0));
        self.game = Some(game);
        self.state = SessionState::Running;
        self.frame = Some(self.host.request_frame());
    }

    /// Per-frame callback: fire timers, move elements, refresh the HUD and
    /// schedule the next frame
    pub fn on_frame(&mut self, dt: f64) {
        // The pending request is the one being serviced now
        self.frame = None;
        let Some(game) = self.game.as_mut() else {
            return;
        };

        game.advance(dt);
        game.render();
        if !game.is_over() {
            self.host.set_timer_text(&format_elapsed(game.elapsed()));
        }
        forward_events(game, &mut self.host);
        self.host.draw(game, &self.camera);

        self.frame = Some(self.host.request_frame());
    }

    /// Resolve a pick ray, click the hit element and check for a win
    pub fn on_pick(&mut self, ray: &Ray) -> Option<ClickEffect> {
        if self.state != SessionState::Running {
            log::debug!("Ignoring pick while {:?}", self.state);
            return None;
        }
        let game = self.game.as_mut()?;
        if game.is_over() {
            return None;
        }

        let id = game.pick(ray)?;
        let effect = game.click(id);
        log::debug!("Picked element {} -> {:?}", id, effect);

        if !game.is_over() && game.check_won() {
            game.end(Outcome::Won);
        }
        forward_events(game, &mut self.host);

        if game.is_over() {
            self.state = SessionState::Ended;
        }
        Some(effect)
    }

    /// Pick through the camera at a pointer position (NDC)
    pub fn on_pointer(&mut self, ndc: Vec2) -> Option<ClickEffect> {
        let ray = self.camera.ray(ndc);
        self.on_pick(&ray)
    }

    /// The player acknowledged a win/loss button: hide it and restart
    pub fn acknowledge(&mut self, affordance: Affordance, seed: u64) {
        if self.state != SessionState::Ended {
            log::debug!("Ignoring {:?} acknowledgement while {:?}", affordance, self.state);
            return;
        }
        self.host.hide_affordance(affordance);
        log::info!("Restarting after {:?}", affordance);
        self.start(seed);
    }

    /// Pointer position (NDC) of a collectible element that a click would
    /// actually hit, preferring the one nearest the camera
    pub fn autoplay_target(&self) -> Option<Vec2> {
        let game = self.game.as_ref()?;
        if game.is_over() {
            return None;
        }
        let mut candidates: Vec<(f32, Vec2)> = game
            .elements()
            .filter(|e| e.kind() == ElementKind::Collect)
            .filter_map(|e| {
                let ndc = self.camera.project(e.position())?;
                let ray = self.camera.ray(ndc);
                (game.pick(&ray) == Some(e.id)).then(|| (distance(&self.camera, e.position()), ndc))
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates.first().map(|&(_, ndc)| ndc)
    }
}

fn distance(camera: &Camera, p: Vec3) -> f32 {
    (p - camera.position).length()
}

/// Forward a game's pending events to the host
fn forward_events<H: Host>(game: &mut Game, host: &mut H) {
    for event in game.drain_events() {
        match event {
            GameEvent::Spawned(id) => {
                if let Some(element) = game.element(id) {
                    host.create_proxy(element);
                }
            }
            GameEvent::KindChanged { id, kind } => host.restyle_proxy(id, kind),
            GameEvent::Removed(id) => host.dispose_proxy(id),
            GameEvent::SharedDisposed => host.dispose_shared(),
            GameEvent::Ended(Outcome::Won) => host.show_affordance(Affordance::Won),
            GameEvent::Ended(Outcome::Lost) => host.show_affordance(Affordance::Lost),
            GameEvent::Ended(Outcome::InProgress) => {}
        }
    }
}
