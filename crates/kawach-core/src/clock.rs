//! Injectable time sources and the per-engine timer queue.
//!
//! Engines never sleep and never spawn callbacks. They read the current time
//! from a [`Clock`] and keep every pending delay in a [`TimerQueue`]; the
//! hosting shell calls `poll()` on the engine, which pops whatever has come
//! due. Production code uses [`SystemClock`]; tests use [`ManualClock`] and
//! move virtual time forward explicitly.
//!
//! Every timer carries the run generation it was scheduled under. When an
//! engine resets it cancels the queue and bumps its generation, so even a
//! timer that somehow survived cannot touch the new run.

use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

/// Monotonic time source measured from an arbitrary origin.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock backed [`Clock`] using [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is the moment of construction.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock advanced by hand.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the engine.
///
/// ```rust
/// use std::time::Duration;
/// use kawach_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let engine_view = clock.clone();
/// clock.advance(Duration::from_millis(1500));
/// assert_eq!(engine_view.now(), Duration::from_millis(1500));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Jumps to an absolute time. Moving backwards is ignored.
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Handle for cancelling a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A pending timer popped from the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Timer<K> {
    pub id: TimerId,
    pub due: Duration,
    pub generation: u64,
    pub kind: K,
}

/// Ordered set of pending timers owned by a single engine instance.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: Vec<Timer<K>>,
}

impl<K> TimerQueue<K> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Schedules `kind` to fire at `due` under the given run generation.
    pub fn schedule(&mut self, kind: K, due: Duration, generation: u64) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            due,
            generation,
            kind,
        });
        id
    }

    /// Cancels a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    /// Cancels every pending timer.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Whether the timer is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|timer| timer.due).min()
    }

    /// Removes and returns the earliest timer due at or before `now`.
    ///
    /// Timers with equal due times fire in scheduling order.
    pub fn pop_due(&mut self, now: Duration) -> Option<Timer<K>> {
        let position = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)?;
        Some(self.pending.remove(position))
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_never_moves_backwards() {
        let clock = ManualClock::new();
        clock.set(Duration::from_secs(5));
        clock.set(Duration::from_secs(2));
        assert_eq!(clock.now(), Duration::from_secs(5));
    }

    #[test]
    fn test_pop_due_orders_by_due_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule("late", Duration::from_secs(3), 0);
        queue.schedule("first", Duration::from_secs(1), 0);
        queue.schedule("second", Duration::from_secs(1), 0);

        assert!(queue.pop_due(Duration::from_millis(999)).is_none());

        let now = Duration::from_secs(3);
        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(now))
            .map(|timer| timer.kind)
            .collect();
        assert_eq!(order, vec!["first", "second", "late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_removes_only_target() {
        let mut queue = TimerQueue::new();
        let keep = queue.schedule(1, Duration::from_secs(1), 0);
        let cancelled = queue.schedule(2, Duration::from_secs(1), 0);

        assert!(queue.cancel(cancelled));
        assert!(!queue.cancel(cancelled));
        assert!(queue.is_pending(keep));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(Duration::from_secs(1)));
    }
}
