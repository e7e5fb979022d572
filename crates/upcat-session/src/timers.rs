//! Virtual-time scheduling for the simulated latencies.
//!
//! The session never sleeps. Deferred work is queued in [`Timers`]
//! against a virtual timeline measured from session start, and the
//! owner fires due work by advancing that timeline. Drivers translate
//! real time with a [`Clock`]; tests advance the timeline directly.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Source of real time for drivers.
///
/// Mirrors the shape of `std::time::Instant` so both native
/// (`std::time::Instant`) and WASM (`web_time::Instant`) clocks fit.
pub trait Clock {
    /// Point-in-time type.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since an earlier instant.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Measures elapsed time on a [`Clock`] since construction.
///
/// Feed [`Stopwatch::elapsed`] into
/// [`Studio::advance_to`](crate::Studio::advance_to) to keep the virtual
/// timeline in step with real time.
pub struct Stopwatch<C: Clock> {
    clock: C,
    origin: C::Instant,
}

impl<C: Clock> Stopwatch<C> {
    /// Start measuring now.
    pub fn start(clock: C) -> Self {
        let origin = clock.now();
        Self { clock, origin }
    }

    /// Time since [`start`](Self::start).
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed(&self.origin)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Create a clock at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }
}

impl Clock for ManualClock {
    type Instant = Duration;

    fn now(&self) -> Duration {
        self.now.get()
    }

    fn elapsed(&self, since: &Duration) -> Duration {
        self.now.get().saturating_sub(*since)
    }
}

impl<C: Clock> Clock for &C {
    type Instant = C::Instant;

    fn now(&self) -> Self::Instant {
        (**self).now()
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        (**self).elapsed(since)
    }
}

struct Scheduled<T> {
    deadline: Duration,
    seq: u64,
    event: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the max-heap pops the earliest deadline first, and
    // among equal deadlines the one scheduled first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Queue of deferred events on a virtual timeline.
pub struct Timers<T> {
    now: Duration,
    seq: u64,
    queue: BinaryHeap<Scheduled<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }
}

impl<T> Timers<T> {
    /// Create an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queue `event` to fire `delay` after the current virtual time.
    /// Returns the deadline.
    pub fn schedule_in(&mut self, delay: Duration, event: T) -> Duration {
        let deadline = self.now.saturating_add(delay);
        self.queue.push(Scheduled {
            deadline,
            seq: self.seq,
            event,
        });
        self.seq += 1;
        deadline
    }

    /// Deadline of the earliest queued event.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|s| s.deadline)
    }

    /// Pop the earliest event due at or before `until`, moving the
    /// virtual time to its deadline.
    ///
    /// Events scheduled while handling a popped event are relative to
    /// that event's deadline, so chained delays add up exactly.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        if self.queue.peek()?.deadline > until {
            return None;
        }
        let scheduled = self.queue.pop()?;
        self.now = self.now.max(scheduled.deadline);
        Some(scheduled.event)
    }

    /// Move the virtual time to `to`. Time never moves backwards.
    pub fn settle_at(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn pops_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule_in(secs(3), "c");
        timers.schedule_in(secs(1), "a");
        timers.schedule_in(secs(2), "b");

        let mut fired = Vec::new();
        while let Some(e) = timers.pop_due(secs(10)) {
            fired.push(e);
        }
        assert_eq!(fired, ["a", "b", "c"]);
        assert_eq!(timers.now(), secs(3));
    }

    #[test]
    fn ties_fire_in_scheduling_order() {
        let mut timers = Timers::new();
        for i in 0..5 {
            timers.schedule_in(secs(2), i);
        }
        let fired: Vec<_> = std::iter::from_fn(|| timers.pop_due(secs(2))).collect();
        assert_eq!(fired, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut timers = Timers::new();
        timers.schedule_in(secs(2), ());
        assert!(timers.pop_due(Duration::from_millis(1999)).is_none());
        assert_eq!(timers.next_deadline(), Some(secs(2)));
        assert!(timers.pop_due(secs(2)).is_some());
        assert!(timers.is_empty());
    }

    #[test]
    fn chained_schedules_are_relative_to_firing_deadline() {
        let mut timers = Timers::new();
        timers.schedule_in(secs(2), 1);
        assert_eq!(timers.pop_due(secs(10)), Some(1));
        assert_eq!(timers.schedule_in(secs(2), 2), secs(4));
    }

    #[test]
    fn settle_never_moves_backwards() {
        let mut timers: Timers<()> = Timers::new();
        timers.settle_at(secs(5));
        timers.settle_at(secs(1));
        assert_eq!(timers.now(), secs(5));
    }

    #[test]
    fn stopwatch_follows_manual_clock() {
        let clock = ManualClock::new();
        clock.advance(secs(7));
        let watch = Stopwatch::start(&clock);
        assert_eq!(watch.elapsed(), Duration::ZERO);
        clock.advance(Duration::from_millis(1500));
        assert_eq!(watch.elapsed(), Duration::from_millis(1500));
    }
}
