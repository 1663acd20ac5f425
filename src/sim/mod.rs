//! Deterministic game simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timers run on the game clock, never on host timers
//! - Seeded RNG only
//! - Stable iteration order (by element ID)
//! - No rendering or platform dependencies

pub mod behavior;
pub mod element;
pub mod game;
pub mod pick;
pub mod schedule;

pub use behavior::{BehaviorPolicy, ClickRule, MovementRule, TickRule, Variant};
pub use element::{
    Behavior, ClickEffect, Direction, Element, ElementId, ElementKind, Motion, Shape, TickEffect,
};
pub use game::{Game, GameEvent, Outcome};
pub use pick::{Ray, nearest_hit, ray_aabb, ray_sphere};
pub use schedule::{EventQueue, TimerEvent};
