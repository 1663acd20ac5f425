//! 2D canvas renderer
//!
//! Paints each element proxy as its projected silhouette: squares for cubes,
//! discs for spheres and the side faces of a spinning pyramid.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use glam::{Vec2, Vec3};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::camera::{Camera, ndc_to_screen};
use crate::sim::{Element, ElementId, ElementKind, Game, Shape};

const BACKGROUND: &str = "black";
const EDGE: &str = "rgba(0, 0, 0, 0.35)";

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub size: (u32, u32),
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let size = (canvas.width(), canvas.height());
        Some(Self { canvas, ctx, size })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.size = (width, height);
    }

    /// Draw every element that has a live proxy, farthest first
    pub fn draw(&self, game: &Game, camera: &Camera, proxies: &BTreeMap<ElementId, ElementKind>) {
        let (w, h) = (self.size.0 as f64, self.size.1 as f64);
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx.fill_rect(0.0, 0.0, w, h);

        let mut visible: Vec<(&Element, ElementKind)> = game
            .elements()
            .filter_map(|e| proxies.get(&e.id).map(|kind| (e, *kind)))
            .collect();
        visible.sort_by(|a, b| a.0.position().z.total_cmp(&b.0.position().z));

        for (element, kind) in visible {
            self.draw_element(element, kind, camera);
        }
    }

    fn to_screen(&self, camera: &Camera, p: Vec3) -> Option<Vec2> {
        let ndc = camera.project(p)?;
        Some(ndc_to_screen(ndc, self.size.0 as f32, self.size.1 as f32))
    }

    fn draw_element(&self, element: &Element, kind: ElementKind, camera: &Camera) {
        let center = element.position();
        let Some(c) = self.to_screen(camera, center) else {
            return;
        };
        // Pixels per world unit at the element's depth
        let scale = camera.ndc_scale(center) * self.size.1 as f32 * 0.5;
        self.ctx.set_fill_style_str(kind.color());
        self.ctx.set_stroke_style_str(EDGE);

        match element.shape {
            Shape::Cube { size } => {
                let px = (size * scale) as f64;
                self.ctx
                    .fill_rect(c.x as f64 - px / 2.0, c.y as f64 - px / 2.0, px, px);
            }
            Shape::Sphere { radius } => {
                self.ctx.begin_path();
                if self
                    .ctx
                    .arc(c.x as f64, c.y as f64, (radius * scale) as f64, 0.0, TAU)
                    .is_ok()
                {
                    self.ctx.fill();
                }
            }
            Shape::Pyramid { radius, height } => {
                let apex = center + Vec3::new(0.0, height * 0.5, 0.0);
                let corners: Vec<Vec3> = (0..4)
                    .map(|k| {
                        let theta = element.rotation() + k as f32 * std::f32::consts::FRAC_PI_2;
                        center + Vec3::new(radius * theta.cos(), -height * 0.5, radius * theta.sin())
                    })
                    .collect();
                let Some(top) = self.to_screen(camera, apex) else {
                    return;
                };
                for k in 0..4 {
                    let (Some(a), Some(b)) = (
                        self.to_screen(camera, corners[k]),
                        self.to_screen(camera, corners[(k + 1) % 4]),
                    ) else {
                        continue;
                    };
                    self.ctx.begin_path();
                    self.ctx.move_to(top.x as f64, top.y as f64);
                    self.ctx.line_to(a.x as f64, a.y as f64);
                    self.ctx.line_to(b.x as f64, b.y as f64);
                    self.ctx.close_path();
                    self.ctx.fill();
                    self.ctx.stroke();
                }
            }
        }
    }
}
