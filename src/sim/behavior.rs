//! Behavior policy table
//!
//! Each element variant is described by three rules instead of an override:
//! how it moves per frame, what a click does, and what its periodic timer does.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Behavior variant, fixed when the element is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    Collect,
    Avoid,
    Change,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Collect, Variant::Avoid, Variant::Change];

    /// Rule set for this variant
    pub fn policy(self) -> &'static BehaviorPolicy {
        match self {
            Variant::Collect => &COLLECT_POLICY,
            Variant::Avoid => &AVOID_POLICY,
            Variant::Change => &CHANGE_POLICY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Collect => "collect",
            Variant::Avoid => "avoid",
            Variant::Change => "change",
        }
    }
}

/// Per-frame movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementRule {
    /// Step along the current direction, masked to the allowed axes
    Translate { axes: Vec3 },
    /// Rotate around the vertical axis, no translation
    Spin,
}

/// Response to being picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRule {
    /// Always collected
    Collect,
    /// Always loses the game
    Lose,
    /// Decided by the element's current kind
    ByKind,
}

/// What the periodic timer mutates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickRule {
    /// Pick a new direction among all six, never repeating the last one
    RandomDirection,
    /// Alternate between left and right
    FlipHorizontal,
    /// Toggle Collect <-> Avoid
    ToggleKind,
}

/// Movement, click and timer rules for one variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorPolicy {
    pub movement: MovementRule,
    pub click: ClickRule,
    pub tick: TickRule,
}

pub const COLLECT_POLICY: BehaviorPolicy = BehaviorPolicy {
    movement: MovementRule::Translate { axes: Vec3::ONE },
    click: ClickRule::Collect,
    tick: TickRule::RandomDirection,
};

pub const AVOID_POLICY: BehaviorPolicy = BehaviorPolicy {
    movement: MovementRule::Translate { axes: Vec3::X },
    click: ClickRule::Lose,
    tick: TickRule::FlipHorizontal,
};

pub const CHANGE_POLICY: BehaviorPolicy = BehaviorPolicy {
    movement: MovementRule::Spin,
    click: ClickRule::ByKind,
    tick: TickRule::ToggleKind,
};
