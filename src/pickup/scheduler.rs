// Tick-based deferred execution
// Submissions are lock-free and may come from any thread; due tasks run on the thread that advances ticks

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crossbeam_queue::SegQueue;
use parking_lot::Mutex;

pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs actions at or after a delay measured in simulation ticks
pub trait DeferredExecutor {
    fn schedule_after(&self, ticks: u32, action: DeferredTask);
}

impl<X: DeferredExecutor + ?Sized> DeferredExecutor for Arc<X> {
    fn schedule_after(&self, ticks: u32, action: DeferredTask) {
        (**self).schedule_after(ticks, action)
    }
}

/// Task waiting in the queue, ordered by due tick then submission order
struct Pending {
    due_tick: u64,
    sequence: u64,
    task: DeferredTask,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due_tick == other.due_tick && self.sequence == other.sequence
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_tick, self.sequence).cmp(&(other.due_tick, other.sequence))
    }
}

/// Deferred-execution queue driven by the host's simulation tick
pub struct TickScheduler {
    current_tick: AtomicU64,
    next_sequence: AtomicU64,
    /// New submissions (any thread)
    inbox: SegQueue<Pending>,
    /// Min-heap of tasks not yet due
    pending: Mutex<BinaryHeap<Reverse<Pending>>>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            current_tick: AtomicU64::new(0),
            next_sequence: AtomicU64::new(0),
            inbox: SegQueue::new(),
            pending: Mutex::new(BinaryHeap::new()),
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick.load(AtomicOrdering::Acquire)
    }

    /// Tasks submitted but not yet run
    pub fn pending_count(&self) -> usize {
        self.inbox.len() + self.pending.lock().len()
    }

    /// Advance the clock by `ticks` and run everything that came due
    /// Tasks scheduled by a running task are picked up on a later advance
    /// Returns the number of tasks run
    pub fn advance(&self, ticks: u64) -> usize {
        let now = self.current_tick.fetch_add(ticks, AtomicOrdering::AcqRel) + ticks;

        let due = {
            let mut pending = self.pending.lock();
            while let Some(task) = self.inbox.pop() {
                pending.push(Reverse(task));
            }

            let mut due = Vec::new();
            while pending.peek().is_some_and(|Reverse(task)| task.due_tick <= now) {
                if let Some(Reverse(task)) = pending.pop() {
                    due.push(task);
                }
            }
            due
        };

        // Lock released before running so tasks can schedule follow-ups
        let count = due.len();
        for pending in due {
            (pending.task)();
        }

        count
    }

    /// Drop everything still queued (host shutdown)
    pub fn clear(&self) {
        while self.inbox.pop().is_some() {}
        self.pending.lock().clear();
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredExecutor for TickScheduler {
    fn schedule_after(&self, ticks: u32, action: DeferredTask) {
        let due_tick = self.current_tick() + ticks as u64;
        let sequence = self.next_sequence.fetch_add(1, AtomicOrdering::Relaxed);
        self.inbox.push(Pending {
            due_tick,
            sequence,
            task: action,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> DeferredTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |id: u32| -> DeferredTask {
            let sink = sink.clone();
            Box::new(move || sink.lock().push(id))
        };
        (log, make)
    }

    #[test]
    fn test_tasks_run_no_earlier_than_delay() {
        let scheduler = TickScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule_after(5, task(1));
        scheduler.schedule_after(4, task(2));

        assert_eq!(scheduler.advance(3), 0);
        assert!(log.lock().is_empty());

        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(*log.lock(), vec![2]);

        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(*log.lock(), vec![2, 1]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_same_tick_runs_in_submission_order() {
        let scheduler = TickScheduler::new();
        let (log, task) = recorder();

        for id in 0..5 {
            scheduler.schedule_after(6, task(id));
        }
        scheduler.advance(10);

        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_delay_is_relative_to_submission_tick() {
        let scheduler = TickScheduler::new();
        let (log, task) = recorder();

        scheduler.advance(100);
        scheduler.schedule_after(4, task(7));

        assert_eq!(scheduler.advance(3), 0);
        assert_eq!(scheduler.advance(1), 1);
        assert_eq!(*log.lock(), vec![7]);
        assert_eq!(scheduler.current_tick(), 104);
    }

    #[test]
    fn test_submissions_from_other_threads() {
        let scheduler = Arc::new(TickScheduler::new());
        let (log, task) = recorder();
        let task = Arc::new(task);

        let handles: Vec<_> = (0..4)
            .map(|id| {
                let scheduler = scheduler.clone();
                let task = task.clone();
                std::thread::spawn(move || scheduler.schedule_after(1, task(id)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(scheduler.advance(1), 4);
        assert_eq!(log.lock().len(), 4);
    }

    #[test]
    fn test_clear_drops_pending() {
        let scheduler = TickScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule_after(1, task(1));
        scheduler.clear();

        assert_eq!(scheduler.advance(5), 0);
        assert!(log.lock().is_empty());
    }
}
