//! Element entity and its variant state
//!
//! An element is a pickable shape that moves every frame according to its
//! variant's policy and reacts to clicks.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::behavior::{ClickRule, MovementRule, TickRule, Variant};
use crate::consts::*;
use crate::normalize_angle;

/// Unique element handle within a game
pub type ElementId = u32;

/// Whether an element currently counts as collectible or dangerous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Collect,
    Avoid,
}

impl ElementKind {
    pub fn toggled(self) -> Self {
        match self {
            ElementKind::Collect => ElementKind::Avoid,
            ElementKind::Avoid => ElementKind::Collect,
        }
    }

    /// Display colour (red = collect, green = avoid)
    pub fn color(self) -> &'static str {
        match self {
            ElementKind::Collect => "red",
            ElementKind::Avoid => "green",
        }
    }
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Forward,
        Direction::Backward,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
            Direction::Forward => 4,
            Direction::Backward => 5,
        }
    }

    /// Unit vector for this direction (forward is toward the camera)
    pub fn unit(self) -> Vec3 {
        match self {
            Direction::Up => Vec3::Y,
            Direction::Down => Vec3::NEG_Y,
            Direction::Left => Vec3::NEG_X,
            Direction::Right => Vec3::X,
            Direction::Forward => Vec3::Z,
            Direction::Backward => Vec3::NEG_Z,
        }
    }

    /// Draw a uniformly random direction different from `self`
    pub fn next_random<R: Rng + ?Sized>(self, rng: &mut R) -> Direction {
        let last = self.index();
        let mut index = last;
        while index == last {
            index = rng.random_range(0..Self::ALL.len());
        }
        Self::ALL[index]
    }

    /// Left <-> right; anything else resumes moving left
    pub fn flipped_horizontal(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            _ => Direction::Left,
        }
    }
}

/// Shape and size of the element's visual proxy (also its pick volume)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cube { size: f32 },
    Sphere { radius: f32 },
    Pyramid { radius: f32, height: f32 },
}

impl Shape {
    /// Random shape for a variant: cubes collect, spheres avoid, pyramids change
    pub fn random_for<R: Rng + ?Sized>(variant: Variant, rng: &mut R) -> Shape {
        match variant {
            Variant::Collect => Shape::Cube {
                size: rng.random_range(0.4..0.9),
            },
            Variant::Avoid => Shape::Sphere {
                radius: rng.random_range(0.2..0.7),
            },
            Variant::Change => {
                let size = rng.random_range(0.4..0.9);
                Shape::Pyramid {
                    radius: size,
                    height: size,
                }
            }
        }
    }

    /// Radius of a sphere enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Cube { size } => size * 0.5 * 3f32.sqrt(),
            Shape::Sphere { radius } => radius,
            Shape::Pyramid { radius, height } => radius.hypot(height * 0.5),
        }
    }
}

/// Variant-specific state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Collect { direction: Direction },
    Avoid { direction: Direction },
    Change { rotation: f32 },
}

impl Behavior {
    /// Initial state for a freshly created element
    pub fn initial(variant: Variant) -> Self {
        match variant {
            Variant::Collect => Behavior::Collect {
                direction: Direction::Up,
            },
            Variant::Avoid => Behavior::Avoid {
                direction: Direction::Left,
            },
            Variant::Change => Behavior::Change { rotation: 0.0 },
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Behavior::Collect { .. } => Variant::Collect,
            Behavior::Avoid { .. } => Variant::Avoid,
            Behavior::Change { .. } => Variant::Change,
        }
    }
}

/// Per-frame motion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub step: f32,
    pub spin_step: f32,
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            step: ELEMENT_STEP,
            spin_step: SPIN_STEP,
            min: BOUNDS_MIN,
            max: BOUNDS_MAX,
        }
    }
}

impl Motion {
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Result of clicking an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    /// Element was already deleted
    Ignored,
    /// Element is collected and leaves the live set
    Collected,
    /// Player hit a dangerous element
    Lost,
}

/// Result of a timer firing on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEffect {
    None,
    Redirected(Direction),
    KindChanged(ElementKind),
}

/// A pickable shape in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    kind: ElementKind,
    position: Vec3,
    pub shape: Shape,
    behavior: Behavior,
    /// Set once the proxy resources have been released
    released: bool,
}

impl Element {
    /// Create an element; the position is clamped into the movement box
    pub fn new(
        id: ElementId,
        behavior: Behavior,
        kind: ElementKind,
        shape: Shape,
        position: Vec3,
        motion: &Motion,
    ) -> Self {
        Self {
            id,
            kind,
            position: position.clamp(motion.min, motion.max),
            shape,
            behavior,
            released: false,
        }
    }

    /// Create an element of the given variant with random shape (and random kind for Change)
    pub fn spawn<R: Rng + ?Sized>(
        id: ElementId,
        variant: Variant,
        position: Vec3,
        motion: &Motion,
        rng: &mut R,
    ) -> Self {
        let kind = match variant {
            Variant::Collect => ElementKind::Collect,
            Variant::Avoid => ElementKind::Avoid,
            Variant::Change => {
                if rng.random_bool(0.5) {
                    ElementKind::Collect
                } else {
                    ElementKind::Avoid
                }
            }
        };
        let shape = Shape::random_for(variant, rng);
        Self::new(id, Behavior::initial(variant), kind, shape, position, motion)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn variant(&self) -> Variant {
        self.behavior.variant()
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Current movement direction (None for spinning elements)
    pub fn direction(&self) -> Option<Direction> {
        match self.behavior {
            Behavior::Collect { direction } | Behavior::Avoid { direction } => Some(direction),
            Behavior::Change { .. } => None,
        }
    }

    /// Rotation around the vertical axis (radians)
    pub fn rotation(&self) -> f32 {
        match self.behavior {
            Behavior::Change { rotation } => rotation,
            _ => 0.0,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Advance one frame
    pub fn render(&mut self, motion: &Motion) {
        match self.variant().policy().movement {
            MovementRule::Translate { axes } => {
                if let Some(direction) = self.direction() {
                    let delta = direction.unit() * axes * motion.step;
                    self.position = (self.position + delta).clamp(motion.min, motion.max);
                }
            }
            MovementRule::Spin => {
                if let Behavior::Change { rotation } = &mut self.behavior {
                    *rotation = normalize_angle(*rotation + motion.spin_step);
                }
            }
        }
    }

    /// Decide what a click on this element does
    pub fn on_clicked(&self) -> ClickEffect {
        if self.released {
            return ClickEffect::Ignored;
        }
        match self.variant().policy().click {
            ClickRule::Collect => ClickEffect::Collected,
            ClickRule::Lose => ClickEffect::Lost,
            ClickRule::ByKind => match self.kind {
                ElementKind::Collect => ClickEffect::Collected,
                ElementKind::Avoid => ClickEffect::Lost,
            },
        }
    }

    /// Apply the variant's periodic timer rule
    pub fn on_timer<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickEffect {
        if self.released {
            return TickEffect::None;
        }
        match self.variant().policy().tick {
            TickRule::RandomDirection => {
                if let Behavior::Collect { direction } = &mut self.behavior {
                    *direction = direction.next_random(rng);
                    return TickEffect::Redirected(*direction);
                }
                TickEffect::None
            }
            TickRule::FlipHorizontal => {
                if let Behavior::Avoid { direction } = &mut self.behavior {
                    *direction = direction.flipped_horizontal();
                    return TickEffect::Redirected(*direction);
                }
                TickEffect::None
            }
            TickRule::ToggleKind => {
                self.kind = self.kind.toggled();
                TickEffect::KindChanged(self.kind)
            }
        }
    }

    /// Release the element's proxy resources. Returns false if already released.
    pub fn delete(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn element(variant: Variant, kind: ElementKind, position: Vec3) -> Element {
        Element::new(
            1,
            Behavior::initial(variant),
            kind,
            Shape::Cube { size: 0.5 },
            position,
            &Motion::default(),
        )
    }

    #[test]
    fn test_collect_moves_up_first() {
        let motion = Motion::default();
        let mut e = element(Variant::Collect, ElementKind::Collect, Vec3::ZERO);
        e.render(&motion);
        assert!((e.position().y - ELEMENT_STEP).abs() < 1e-6);
        assert_eq!(e.position().x, 0.0);
    }

    #[test]
    fn test_movement_clamps_at_boundary() {
        let motion = Motion::default();
        let mut e = element(
            Variant::Collect,
            ElementKind::Collect,
            Vec3::new(0.0, BOUNDS_MAX.y - 0.005, 0.0),
        );
        for _ in 0..10 {
            e.render(&motion);
        }
        assert_eq!(e.position().y, BOUNDS_MAX.y);
    }

    #[test]
    fn test_spawn_position_clamped() {
        let e = element(
            Variant::Collect,
            ElementKind::Collect,
            Vec3::new(0.0, -2.5, 0.0),
        );
        assert_eq!(e.position().y, BOUNDS_MIN.y);
    }

    #[test]
    fn test_avoid_alternates_left_right() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut e = element(Variant::Avoid, ElementKind::Avoid, Vec3::ZERO);
        assert_eq!(e.direction(), Some(Direction::Left));
        assert_eq!(e.on_timer(&mut rng), TickEffect::Redirected(Direction::Right));
        assert_eq!(e.on_timer(&mut rng), TickEffect::Redirected(Direction::Left));
    }

    #[test]
    fn test_change_spins_in_place() {
        let motion = Motion::default();
        let start = Vec3::new(1.0, 1.0, 0.0);
        let mut e = element(Variant::Change, ElementKind::Collect, start);
        e.render(&motion);
        assert_eq!(e.position(), start);
        assert!((e.rotation() - SPIN_STEP).abs() < 1e-6);
    }

    #[test]
    fn test_change_toggles_kind_and_click() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut e = element(Variant::Change, ElementKind::Avoid, Vec3::ZERO);
        assert_eq!(e.on_clicked(), ClickEffect::Lost);
        assert_eq!(
            e.on_timer(&mut rng),
            TickEffect::KindChanged(ElementKind::Collect)
        );
        assert_eq!(e.on_clicked(), ClickEffect::Collected);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut e = element(Variant::Collect, ElementKind::Collect, Vec3::ZERO);
        assert!(e.delete());
        assert!(!e.delete());
        assert_eq!(e.on_clicked(), ClickEffect::Ignored);
    }

    proptest! {
        #[test]
        fn prop_render_stays_in_bounds(
            seed in any::<u64>(),
            variant_idx in 0usize..3,
            x in -5.0f32..5.0,
            y in -2.5f32..2.5,
            z in -1.0f32..1.0,
            frames in 1usize..2000,
        ) {
            let motion = Motion::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let variant = Variant::ALL[variant_idx];
            let mut e = Element::spawn(1, variant, Vec3::new(x, y, z), &motion, &mut rng);
            prop_assert!(motion.contains(e.position()));
            for frame in 0..frames {
                // A timer fires every 120 frames (two seconds at 60 Hz)
                if frame % 120 == 119 {
                    e.on_timer(&mut rng);
                }
                e.render(&motion);
                prop_assert!(motion.contains(e.position()));
            }
        }

        #[test]
        fn prop_consecutive_directions_differ(seed in any::<u64>(), changes in 1usize..200) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut e = element(Variant::Collect, ElementKind::Collect, Vec3::ZERO);
            for _ in 0..changes {
                let before = e.direction();
                e.on_timer(&mut rng);
                prop_assert_ne!(before, e.direction());
            }
        }
    }
}
