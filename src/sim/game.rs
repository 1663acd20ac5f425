//! Game session aggregate
//!
//! Owns the clock, the outcome and the live element registry. Everything the
//! presentation layer needs to know is reported as `GameEvent`s.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::behavior::Variant;
use super::element::{ClickEffect, Element, ElementId, ElementKind, Motion, TickEffect};
use super::pick::{Ray, nearest_hit};
use super::schedule::EventQueue;
use crate::consts::MIN_TIMER_PERIOD;
use crate::settings::Settings;

/// Session outcome; terminal once it leaves `InProgress`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new element needs a visual proxy
    Spawned(ElementId),
    /// A Change element switched kind (restyle its proxy)
    KindChanged { id: ElementId, kind: ElementKind },
    /// An element left the live set (dispose its proxy)
    Removed(ElementId),
    /// Session-wide resources were released (once per game)
    SharedDisposed,
    /// The game ended (show the matching affordance)
    Ended(Outcome),
}

/// Timer periods per variant (seconds)
#[derive(Debug, Clone, Copy)]
struct Periods {
    collect: f64,
    avoid: f64,
    change: f64,
}

impl Periods {
    fn from_settings(settings: &Settings) -> Self {
        // NaN and tiny periods would stall the catch-up loop in `advance`
        let period = |variant| settings.period(variant).max(MIN_TIMER_PERIOD);
        Self {
            collect: period(Variant::Collect),
            avoid: period(Variant::Avoid),
            change: period(Variant::Change),
        }
    }

    fn get(&self, variant: Variant) -> f64 {
        match variant {
            Variant::Collect => self.collect,
            Variant::Avoid => self.avoid,
            Variant::Change => self.change,
        }
    }
}

/// One play-through
#[derive(Debug)]
pub struct Game {
    /// Seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    elapsed: f64,
    outcome: Outcome,
    /// Live elements (ordered by id for deterministic iteration)
    elements: BTreeMap<ElementId, Element>,
    timers: EventQueue,
    motion: Motion,
    periods: Periods,
    shared_disposed: bool,
    events: Vec<GameEvent>,
    next_id: ElementId,
}

impl Game {
    /// Create an empty game with the given seed
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            elapsed: 0.0,
            outcome: Outcome::InProgress,
            elements: BTreeMap::new(),
            timers: EventQueue::new(),
            motion: settings.motion(),
            periods: Periods::from_settings(settings),
            shared_disposed: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new element ID
    pub fn next_entity_id(&mut self) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Seconds since the session started
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of pending timer events
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Add an element to the live set and start its timer
    pub fn insert(&mut self, element: Element) -> Option<ElementId> {
        if self.is_over() {
            log::debug!("Ignoring insert of element {} after game end", element.id);
            return None;
        }
        let id = element.id;
        let period = self.periods.get(element.variant());
        self.timers.schedule(id, self.elapsed + period, period);
        self.elements.insert(id, element);
        self.events.push(GameEvent::Spawned(id));
        Some(id)
    }

    /// Spawn an element of the given variant with a random shape
    pub fn spawn(&mut self, variant: Variant, position: Vec3) -> Option<ElementId> {
        let id = self.next_entity_id();
        let element = Element::spawn(id, variant, position, &self.motion, &mut self.rng);
        self.insert(element)
    }

    /// Spawn a random variant at a uniformly random point of the spawn volume.
    /// Points are drawn from the part of the volume inside the movement box.
    pub fn spawn_random(&mut self, half_extents: Vec3) -> Option<ElementId> {
        let variant = Variant::ALL[self.rng.random_range(0..Variant::ALL.len())];
        let (lo, hi) = spawn_region(half_extents, &self.motion);
        let position = Vec3::new(
            self.rng.random_range(lo.x..=hi.x),
            self.rng.random_range(lo.y..=hi.y),
            self.rng.random_range(lo.z..=hi.z),
        );
        self.spawn(variant, position)
    }

    /// Advance the clock and fire every timer that came due
    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
        if self.is_over() {
            return;
        }

        while let Some(event) = self.timers.pop_due(self.elapsed) {
            let Some(element) = self.elements.get_mut(&event.element) else {
                continue;
            };
            match element.on_timer(&mut self.rng) {
                TickEffect::Redirected(direction) => {
                    log::trace!("Element {} now moving {:?}", event.element, direction);
                }
                TickEffect::KindChanged(kind) => {
                    log::debug!("Element {} changed to {:?}", event.element, kind);
                    self.events.push(GameEvent::KindChanged {
                        id: event.element,
                        kind,
                    });
                }
                TickEffect::None => {}
            }
            self.timers.reschedule(event);
        }
    }

    /// Render every live element for one frame
    pub fn render(&mut self) {
        if self.is_over() {
            return;
        }
        for element in self.elements.values_mut() {
            element.render(&self.motion);
        }
    }

    /// Nearest live element along a ray
    pub fn pick(&self, ray: &Ray) -> Option<ElementId> {
        nearest_hit(ray, self.elements.values())
    }

    /// Dispatch a click to an element
    pub fn click(&mut self, id: ElementId) -> ClickEffect {
        if self.is_over() {
            log::debug!("Ignoring click on element {} after game end", id);
            return ClickEffect::Ignored;
        }
        let Some(element) = self.elements.get(&id) else {
            log::debug!("Ignoring click on missing element {}", id);
            return ClickEffect::Ignored;
        };

        let effect = element.on_clicked();
        match effect {
            ClickEffect::Collected => {
                self.remove(id);
            }
            ClickEffect::Lost => {
                self.end(Outcome::Lost);
            }
            ClickEffect::Ignored => {}
        }
        effect
    }

    /// Delete an element and drop it from the live set
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(mut element) = self.elements.remove(&id) else {
            return false;
        };
        if element.delete() {
            self.events.push(GameEvent::Removed(id));
        }
        self.timers.cancel(id);
        true
    }

    /// True iff no live element is currently collectible
    pub fn check_won(&self) -> bool {
        !self
            .elements
            .values()
            .any(|e| e.kind() == ElementKind::Collect)
    }

    /// End the game: set the outcome and tear down every element.
    /// Returns false (and changes nothing) if the game already ended.
    pub fn end(&mut self, outcome: Outcome) -> bool {
        debug_assert_ne!(outcome, Outcome::InProgress, "end() needs a terminal outcome");
        if outcome == Outcome::InProgress {
            return false;
        }
        if self.is_over() {
            log::debug!("Game already ended ({:?}), ignoring {:?}", self.outcome, outcome);
            return false;
        }

        self.outcome = outcome;
        self.dispose();
        self.events.push(GameEvent::Ended(outcome));

        log::info!(
            "Game over: {:?} after {}",
            outcome,
            crate::format_elapsed(self.elapsed)
        );
        true
    }

    /// Delete every element, cancel all timers and release shared resources.
    /// Safe to call repeatedly; shared resources are released once.
    pub fn dispose(&mut self) {
        let ids: Vec<ElementId> = self.elements.keys().copied().collect();
        for id in ids {
            self.remove(id);
        }
        self.timers.clear();

        if !self.shared_disposed {
            self.shared_disposed = true;
            self.events.push(GameEvent::SharedDisposed);
        }
    }

    /// Take pending presentation events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Overlap of the origin-centered spawn volume and the movement box
fn spawn_region(half_extents: Vec3, motion: &Motion) -> (Vec3, Vec3) {
    let half = half_extents.abs();
    let lo = (-half).max(motion.min);
    let hi = half.min(motion.max);
    if lo.cmpgt(hi).any() {
        log::warn!("Spawn volume misses the movement box, spawning anywhere in the box");
        return (motion.min, motion.max);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::element::{Behavior, Shape};
    use proptest::prelude::*;

    fn game() -> Game {
        Game::new(12345, &Settings::default())
    }

    fn add(game: &mut Game, variant: Variant, kind: ElementKind) -> ElementId {
        let id = game.next_entity_id();
        let element = Element::new(
            id,
            Behavior::initial(variant),
            kind,
            Shape::Cube { size: 0.5 },
            Vec3::ZERO,
            game.motion(),
        );
        game.insert(element).unwrap()
    }

    #[test]
    fn test_check_won_ignores_avoid_kinds() {
        let mut g = game();
        assert!(g.check_won());

        add(&mut g, Variant::Avoid, ElementKind::Avoid);
        add(&mut g, Variant::Change, ElementKind::Avoid);
        assert!(g.check_won());

        let c = add(&mut g, Variant::Change, ElementKind::Collect);
        assert!(!g.check_won());
        g.remove(c);
        assert!(g.check_won());
    }

    #[test]
    fn test_collect_all_wins() {
        let mut g = game();
        let ids: Vec<_> = (0..5)
            .map(|_| add(&mut g, Variant::Collect, ElementKind::Collect))
            .collect();

        // Click in reverse order
        for (i, id) in ids.iter().rev().enumerate() {
            assert_eq!(g.click(*id), ClickEffect::Collected);
            assert_eq!(g.outcome(), Outcome::InProgress);
            if i + 1 < ids.len() {
                assert!(!g.check_won());
            }
        }
        assert!(g.check_won());
        assert!(g.end(Outcome::Won));
        assert_eq!(g.outcome(), Outcome::Won);
    }

    #[test]
    fn test_avoid_click_loses_immediately() {
        let mut g = game();
        for _ in 0..4 {
            add(&mut g, Variant::Collect, ElementKind::Collect);
        }
        let avoid = add(&mut g, Variant::Avoid, ElementKind::Avoid);

        assert_eq!(g.click(avoid), ClickEffect::Lost);
        assert_eq!(g.outcome(), Outcome::Lost);
        assert!(g.is_empty());
        assert_eq!(g.pending_timers(), 0);
    }

    #[test]
    fn test_end_is_idempotent() {
        let mut g = game();
        add(&mut g, Variant::Collect, ElementKind::Collect);
        add(&mut g, Variant::Avoid, ElementKind::Avoid);
        g.drain_events();

        assert!(g.end(Outcome::Lost));
        let first = g.drain_events();
        assert_eq!(
            first.iter().filter(|e| matches!(e, GameEvent::Removed(_))).count(),
            2
        );
        assert_eq!(
            first.iter().filter(|e| **e == GameEvent::SharedDisposed).count(),
            1
        );
        assert_eq!(first.last(), Some(&GameEvent::Ended(Outcome::Lost)));

        assert!(!g.end(Outcome::Won));
        assert_eq!(g.outcome(), Outcome::Lost);
        assert!(g.drain_events().is_empty());
    }

    #[test]
    fn test_change_element_toggles_after_period() {
        let mut g = game();
        let id = add(&mut g, Variant::Change, ElementKind::Avoid);
        g.drain_events();

        g.advance(crate::consts::CHANGE_PERIOD - 0.005);
        assert_eq!(g.element(id).unwrap().kind(), ElementKind::Avoid);

        g.advance(0.01);
        assert_eq!(g.element(id).unwrap().kind(), ElementKind::Collect);
        assert_eq!(
            g.drain_events(),
            vec![GameEvent::KindChanged {
                id,
                kind: ElementKind::Collect
            }]
        );

        assert_eq!(g.click(id), ClickEffect::Collected);
        assert_eq!(g.outcome(), Outcome::InProgress);
        assert!(g.element(id).is_none());
    }

    #[test]
    fn test_timers_catch_up_on_long_frames() {
        let mut g = game();
        let id = add(&mut g, Variant::Change, ElementKind::Collect);
        // Three toggle periods in a single frame
        g.advance(12.0);
        assert_eq!(g.element(id).unwrap().kind(), ElementKind::Avoid);
        assert_eq!(g.pending_timers(), 1);
    }

    #[test]
    fn test_click_after_end_is_ignored() {
        let mut g = game();
        let a = add(&mut g, Variant::Avoid, ElementKind::Avoid);
        let c = add(&mut g, Variant::Collect, ElementKind::Collect);
        g.click(a);
        assert_eq!(g.click(c), ClickEffect::Ignored);
        assert_eq!(g.click(a), ClickEffect::Ignored);
        assert!(g.insert(Element::new(
            99,
            Behavior::initial(Variant::Collect),
            ElementKind::Collect,
            Shape::Cube { size: 0.5 },
            Vec3::ZERO,
            &Motion::default(),
        ))
        .is_none());
    }

    #[test]
    fn test_dispose_without_outcome() {
        let mut g = game();
        add(&mut g, Variant::Collect, ElementKind::Collect);
        g.dispose();
        g.dispose();
        assert_eq!(g.outcome(), Outcome::InProgress);
        assert!(g.is_empty());
        assert_eq!(g.pending_timers(), 0);
        let events = g.drain_events();
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::SharedDisposed).count(),
            1
        );
    }

    #[test]
    fn test_elapsed_keeps_running_after_end() {
        let mut g = game();
        g.advance(1.5);
        g.end(Outcome::Won);
        g.advance(0.5);
        assert!((g.elapsed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_population() {
        let half = crate::consts::SPAWN_HALF_EXTENTS;
        let mut g1 = game();
        let mut g2 = game();
        for _ in 0..15 {
            g1.spawn_random(half);
            g2.spawn_random(half);
        }
        let a: Vec<_> = g1.elements().map(|e| (e.variant(), e.kind(), e.position())).collect();
        let b: Vec<_> = g2.elements().map(|e| (e.variant(), e.kind(), e.position())).collect();
        assert_eq!(a, b);
    }
    #[test]
    fn test_spawn_positions_spread_over_overlap() {
        let mut g = game();
        for _ in 0..600 {
            g.spawn_random(crate::consts::SPAWN_HALF_EXTENTS);
        }
        let motion = *g.motion();
        assert!(g.elements().all(|e| motion.contains(e.position())));

        // Overlap spans y in [-2, 2.5]; nothing piles up on the floor of the box
        let ys: Vec<f32> = g.elements().map(|e| e.position().y).collect();
        assert!(ys.iter().filter(|y| **y == motion.min.y).count() <= 1);
        let low = ys.iter().filter(|y| **y < -1.55).count();
        assert!((20..120).contains(&low), "{low} of 600 in the lowest tenth");
    }

    #[test]
    fn test_unvalidated_settings_cannot_stall_frames() {
        let settings = Settings {
            spin_step: 1e30,
            change_period: 1e-300,
            ..Settings::default()
        };
        let mut g = Game::new(1, &settings);
        let id = g.spawn(Variant::Change, Vec3::ZERO).unwrap();
        g.advance(0.5);
        g.render();
        assert!(g.element(id).unwrap().rotation().abs() <= std::f32::consts::PI);
        assert_eq!(g.pending_timers(), 1);
    }

    fn shuffled_indices(max: usize) -> impl Strategy<Value = Vec<usize>> {
        (1..=max).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    }

    proptest! {
        #[test]
        fn prop_check_won_iff_no_collect_kind(
            population in prop::collection::vec((0usize..3, any::<bool>()), 0..20),
        ) {
            let mut g = game();
            let mut collectible = 0;
            for (variant_idx, starts_collect) in population {
                let variant = Variant::ALL[variant_idx];
                let kind = match variant {
                    Variant::Collect => ElementKind::Collect,
                    Variant::Avoid => ElementKind::Avoid,
                    Variant::Change if starts_collect => ElementKind::Collect,
                    Variant::Change => ElementKind::Avoid,
                };
                if kind == ElementKind::Collect {
                    collectible += 1;
                }
                add(&mut g, variant, kind);
            }
            prop_assert_eq!(g.check_won(), collectible == 0);
        }

        #[test]
        fn prop_collecting_in_any_order_wins(order in shuffled_indices(12)) {
            let mut g = game();
            let ids: Vec<_> = order
                .iter()
                .map(|_| add(&mut g, Variant::Collect, ElementKind::Collect))
                .collect();
            for (i, &idx) in order.iter().enumerate() {
                prop_assert_eq!(g.click(ids[idx]), ClickEffect::Collected);
                prop_assert_eq!(g.check_won(), i + 1 == order.len());
                if g.check_won() {
                    g.end(Outcome::Won);
                }
            }
            prop_assert_eq!(g.outcome(), Outcome::Won);
        }
    }
}
