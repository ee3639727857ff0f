//! Cosmetic timer queue.
//!
//! Deferred presentation steps (bar expansion, overlay removal, UI restore)
//! are queued here with an absolute due time and fired by whoever drives
//! `tick(now)`. Nothing correctness-critical lives in a timer: dropping the
//! queue early only skips animation polish.

use std::collections::BTreeMap;

/// Handle returned by [`TimerQueue::schedule`]; orders by due time, then
/// by scheduling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId {
    due_ms: u64,
    seq: u64,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    entries: BTreeMap<TimerId, T>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, task: T) -> TimerId {
        let id = TimerId {
            due_ms,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(id, task);
        id
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Remove and return every task due at or before `now_ms`, oldest first.
    pub fn pop_due(&mut self, now_ms: u64) -> Vec<(TimerId, T)> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if entry.key().due_ms > now_ms {
                break;
            }
            due.push(entry.remove_entry());
        }
        due
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_due_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(20, "b");
        q.schedule(10, "a");
        q.schedule(20, "c");
        q.schedule(30, "d");

        let fired: Vec<_> = q.pop_due(20).into_iter().map(|(_, t)| t).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut q = TimerQueue::new();
        let id = q.schedule(5, ());
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.pop_due(100).is_empty());
    }
}
