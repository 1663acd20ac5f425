//! Shape Hunt entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent};

    use shape_hunt::platform::{Affordance, WebHost};
    use shape_hunt::renderer::{CanvasRenderer, screen_to_ndc};
    use shape_hunt::{Session, Settings};

    type WebSession = Rc<RefCell<Session<WebHost>>>;

    fn new_seed(settings: &Settings) -> u64 {
        settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64)
    }

    fn viewport(window: &web_sys::Window) -> (f64, f64) {
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        (w, h)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Shape Hunt starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        let settings = Settings::load();
        let (w, h) = viewport(&window);

        let canvas = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        let renderer = canvas.clone().and_then(CanvasRenderer::new);
        if renderer.is_none() {
            log::error!("No 2D canvas available, running without drawing");
        }

        let mut host = WebHost::new(window.clone(), document.clone(), renderer);
        host.resize(w as u32, h as u32);
        let mut session = Session::new(host, settings);
        session.resize(w as f32, h as f32);
        let session: WebSession = Rc::new(RefCell::new(session));

        install_frame_callback(session.clone());
        setup_click_handler(&window, canvas, session.clone());
        setup_resize_handler(&window, session.clone());
        setup_buttons(&document, session);

        log::info!("Shape Hunt ready");
    }

    /// requestAnimationFrame callback that drives `Session::on_frame`
    fn install_frame_callback(session: WebSession) {
        let mut last_time: Option<f64> = None;
        let inner = session.clone();
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            let dt = last_time.map_or(shape_hunt::consts::FRAME_DT, |last| {
                (time - last) / 1000.0
            });
            last_time = Some(time);
            inner.borrow_mut().on_frame(dt);
        });
        session
            .borrow_mut()
            .host_mut()
            .set_frame_callback(closure.as_ref().unchecked_ref::<js_sys::Function>().clone());
        closure.forget();
    }

    fn setup_click_handler(
        window: &web_sys::Window,
        canvas: Option<HtmlCanvasElement>,
        session: WebSession,
    ) {
        let target_window = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            // Ignore clicks on the buttons
            if let Some(canvas) = canvas.as_ref() {
                let canvas: &JsValue = canvas.as_ref();
                let on_canvas = event.target().is_some_and(|t| t.loose_eq(canvas));
                if !on_canvas {
                    return;
                }
            }
            let (w, h) = viewport(&target_window);
            let ndc = screen_to_ndc(
                event.client_x() as f32,
                event.client_y() as f32,
                w as f32,
                h as f32,
            );
            session.borrow_mut().on_pointer(ndc);
        });
        let _ = window.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_resize_handler(window: &web_sys::Window, session: WebSession) {
        let target_window = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = viewport(&target_window);
            let mut s = session.borrow_mut();
            s.resize(w as f32, h as f32);
            s.host_mut().resize(w as u32, h as u32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &web_sys::Document, session: WebSession) {
        if let Some(btn) = document.get_element_by_id("startButton") {
            let session = session.clone();
            let button = btn.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if let Ok(el) = button.clone().dyn_into::<web_sys::HtmlElement>() {
                    let _ = el.style().set_property("display", "none");
                }
                let mut s = session.borrow_mut();
                let seed = new_seed(s.settings());
                s.start(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for affordance in [Affordance::Lost, Affordance::Won] {
            let Some(btn) = document.get_element_by_id(affordance.element_id()) else {
                continue;
            };
            let session = session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut s = session.borrow_mut();
                let seed = new_seed(s.settings());
                s.acknowledge(affordance, seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shape Hunt (native) starting...");
    log::info!("Native mode runs a headless autoplay session - build for wasm32 to play");

    autoplay::run(shape_hunt::Settings::load());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: a bot clicks reachable red shapes until the session ends
#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::time::{SystemTime, UNIX_EPOCH};

    use shape_hunt::consts::FRAME_DT;
    use shape_hunt::format_elapsed;
    use shape_hunt::platform::HeadlessHost;
    use shape_hunt::sim::Outcome;
    use shape_hunt::{Session, SessionState, Settings};

    /// Give up after ten minutes of simulated play
    const MAX_FRAMES: u64 = 10 * 60 * 60;

    pub fn run(settings: Settings) {
        let seed = settings.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        let click_every = (settings.autoplay_click_interval / FRAME_DT).round().max(1.0) as u64;

        let mut session = Session::new(HeadlessHost::new(), settings);
        session.resize(16.0, 9.0);
        session.start(seed);

        let mut clicks = 0u32;
        for frame in 1..=MAX_FRAMES {
            session.on_frame(FRAME_DT);

            if frame % click_every == 0 {
                if let Some(ndc) = session.autoplay_target() {
                    if let Some(effect) = session.on_pointer(ndc) {
                        clicks += 1;
                        log::info!("Click {} at ({:.2}, {:.2}): {:?}", clicks, ndc.x, ndc.y, effect);
                    }
                }
            }

            if session.state() == SessionState::Ended {
                break;
            }
        }

        let Some(game) = session.game() else {
            return;
        };
        match game.outcome() {
            Outcome::InProgress => log::warn!(
                "Autoplay gave up after {} with {} elements left",
                format_elapsed(game.elapsed()),
                game.len()
            ),
            outcome => log::info!(
                "Autoplay finished: {:?} in {} ({} clicks, seed {})",
                outcome,
                format_elapsed(game.elapsed()),
                clicks,
                game.seed
            ),
        }
    }
}
