//! Clocks and deferred tasks
//!
//! Timers on the cart page (removal transitions, toast lifetimes, row
//! effects) are modelled as tasks queued against a [`Clock`]. Nothing here
//! sleeps: the owner asks [`Scheduler::pop_due`] for work whenever time may
//! have moved, which lets tests drive virtual time with [`ManualClock`].

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

// =============================================================================
// Clocks
// =============================================================================

/// Monotonic time source measured from the start of a session
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Duration;
}

/// Virtual clock advanced by hand
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Clock backed by tokio time, so paused test runtimes control it too
#[derive(Debug, Clone)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Handle returned for every scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    due: Duration,
    handle: TaskHandle,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.handle == other.handle
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // handles grow monotonically, so equal deadlines run in scheduling order
        (self.due, self.handle).cmp(&(other.due, other.handle))
    }
}

/// Deadline-ordered queue of deferred tasks
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Entry<T>>>,
    cancelled: HashSet<TaskHandle>,
    next_handle: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            cancelled: HashSet::new(),
            next_handle: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` to run once the clock reaches `due`.
    pub fn schedule_at(&mut self, due: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.queue.push(Reverse(Entry { due, handle, task }));
        handle
    }

    /// Prevents a queued task from running. Returns `false` if it already ran
    /// or was never scheduled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let pending = self.queue.iter().any(|Reverse(e)| e.handle == handle);
        pending && self.cancelled.insert(handle)
    }

    /// Takes the earliest task due at or before `now`, with its deadline.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        self.drop_cancelled_head();
        let due = self
            .queue
            .peek()
            .is_some_and(|Reverse(entry)| entry.due <= now);
        if !due {
            return None;
        }
        self.queue.pop().map(|Reverse(entry)| (entry.due, entry.task))
    }

    /// Deadline of the earliest live task
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.drop_cancelled_head();
        self.queue.peek().map(|Reverse(e)| e.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.cancelled.clear();
    }

    fn drop_cancelled_head(&mut self) {
        while let Some(Reverse(entry)) = self.queue.peek() {
            if !self.cancelled.remove(&entry.handle) {
                break;
            }
            self.queue.pop();
        }
    }
}
