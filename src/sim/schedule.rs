//! Timer event queue
//!
//! Per-element periodic timers are scheduled events on the game clock. The
//! queue is drained once per frame before elements render, so timer firings
//! are ordered by due time (then insertion order) and fully deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::element::ElementId;

/// A pending timer firing
#[derive(Debug, Clone, Copy)]
pub struct TimerEvent {
    /// Game clock time (seconds) at which the event fires
    pub due: f64,
    /// Seconds until the following firing
    pub period: f64,
    pub element: ElementId,
    seq: u64,
}

impl PartialEq for TimerEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimerEvent {}

impl PartialOrd for TimerEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEvent {
    // Reversed so the BinaryHeap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of timer events keyed by due time
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<TimerEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a periodic timer whose first firing is at `due`
    pub fn schedule(&mut self, element: ElementId, due: f64, period: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(TimerEvent {
            due,
            period,
            element,
            seq,
        });
    }

    /// Pop the earliest event if it is due at `now`
    pub fn pop_due(&mut self, now: f64) -> Option<TimerEvent> {
        if self.heap.peek().is_some_and(|e| e.due <= now) {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Queue the next firing of a periodic event
    pub fn reschedule(&mut self, event: TimerEvent) {
        self.schedule(event.element, event.due + event.period, event.period);
    }

    /// Drop all timers for one element
    pub fn cancel(&mut self, element: ElementId) {
        self.heap.retain(|e| e.element != element);
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
