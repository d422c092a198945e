//! Cooperative timer service.
//!
//! Timers never fire on their own: the event loop asks the manager which
//! timers are due and dispatches them on the same thread. Every operation
//! takes the current time explicitly, which keeps timing behaviour
//! reproducible in tests; the `*_now` conveniences read the system clock.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

#[derive(Debug)]
struct TimerData {
    next_fire: Instant,
    interval: Duration,
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time).
///
/// Entries of stopped timers stay in the heap and are skipped when popped.
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages the pending timers of one `Forms` instance.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn schedule(&mut self, now: Instant, interval: Duration, kind: TimerKind) -> TimerId {
        let next_fire = now + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?interval, ?kind, "timer scheduled");
        id
    }

    /// Start a one-shot timer firing `duration` after `now`.
    pub fn start_one_shot_at(&mut self, now: Instant, duration: Duration) -> TimerId {
        self.schedule(now, duration, TimerKind::OneShot)
    }

    /// Start a repeating timer whose first fire is `interval` after `now`.
    pub fn start_repeating_at(&mut self, now: Instant, interval: Duration) -> TimerId {
        self.schedule(now, interval, TimerKind::Repeating)
    }

    /// Stop and remove a timer.
    ///
    /// Stopping a timer that already fired (one-shot) or was stopped before
    /// reports [`TimerError::InvalidTimerId`] and changes nothing.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    fn drop_stale_front(&mut self) {
        while let Some(entry) = self.queue.peek() {
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live {
                break;
            }
            self.queue.pop();
        }
    }

    /// Time from `now` until the next timer fires, if any.
    pub fn time_until_next_at(&mut self, now: Instant) -> Option<Duration> {
        self.drop_stale_front();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Collect all timers due at `now`, in firing order.
    ///
    /// One-shot timers are removed; repeating timers are rescheduled one
    /// interval after `now`.
    #[tracing::instrument(skip(self), target = "forma::timer", level = "trace")]
    pub fn process_expired_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get_mut(entry.id) else {
                continue;
            };
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(entry.id);

            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(entry.id);
                }
                TimerKind::Repeating => {
                    timer.next_fire = now + timer.interval;
                    self.queue.push(TimerQueueEntry {
                        id: entry.id,
                        fire_time: timer.next_fire,
                    });
                }
            }
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let t0 = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot_at(t0, ms(100));

        assert!(timers.process_expired_at(t0 + ms(50)).is_empty());
        assert_eq!(timers.process_expired_at(t0 + ms(100)), vec![id]);
        assert!(!timers.is_active(id));
        assert!(timers.process_expired_at(t0 + ms(500)).is_empty());
    }

    #[test]
    fn test_repeating_reschedules() {
        let t0 = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_repeating_at(t0, ms(10));

        assert_eq!(timers.process_expired_at(t0 + ms(10)), vec![id]);
        assert_eq!(timers.time_until_next_at(t0 + ms(10)), Some(ms(10)));
        assert_eq!(timers.process_expired_at(t0 + ms(20)), vec![id]);
        assert!(timers.is_active(id));
    }

    #[test]
    fn test_stop_is_safe_when_due() {
        let t0 = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot_at(t0, ms(10));

        assert!(timers.stop(id).is_ok());
        assert!(timers.stop(id).is_err());
        assert!(timers.process_expired_at(t0 + ms(10)).is_empty());
        assert_eq!(timers.time_until_next_at(t0), None);
    }

    #[test]
    fn test_fire_order() {
        let t0 = Instant::now();
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot_at(t0, ms(30));
        let early = timers.start_one_shot_at(t0, ms(10));

        assert_eq!(timers.process_expired_at(t0 + ms(40)), vec![early, late]);
        assert_eq!(timers.active_count(), 0);
    }
}
