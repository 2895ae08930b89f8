//! One-shot cancelable deferred actions.
//!
//! A [`Scheduler`] runs an action once after a delay and hands back a
//! [`TimerHandle`] that can cancel it. Cancelling after the action fired, or
//! cancelling twice, is a no-op.
//!
//! Two schedulers are provided: [`ThreadScheduler`] waits on a dedicated
//! thread per timer, and [`ManualScheduler`] runs on a virtual clock that
//! the owner advances explicitly (frame loops and tests).

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Deferred action run by a scheduler.
pub type Action = Box<dyn FnOnce() + Send + 'static>;

const PENDING: u8 = 0;
const CANCELLED: u8 = 1;
const FIRED: u8 = 2;

/// Handle to a scheduled action.
pub trait TimerHandle: Send + Sync {
    /// Prevent the action from running if it has not started yet.
    fn cancel(&self);

    /// True until the action fired or was cancelled.
    fn is_pending(&self) -> bool;
}

/// Source of one-shot deferred actions.
pub trait Scheduler: Send + Sync {
    /// Handle type returned by [`Scheduler::schedule`].
    type Handle: TimerHandle + 'static;

    /// Run `action` once after `delay`.
    fn schedule(&self, delay: Duration, action: Action) -> Self::Handle;
}

#[derive(Debug, Default)]
struct TimerStatus(AtomicU8);

impl TimerStatus {
    fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire) == PENDING
    }

    fn transition(&self, to: u8) -> bool {
        self.0
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

static THREAD_TIMER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Scheduler that waits for each timer on its own named thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadScheduler {
    _private: (),
}

impl ThreadScheduler {
    /// Create a thread-backed scheduler.
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default)]
struct ThreadTimer {
    status: TimerStatus,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Handle for a [`ThreadScheduler`] timer.
#[derive(Debug, Clone)]
pub struct ThreadTimerHandle {
    timer: Arc<ThreadTimer>,
}

impl TimerHandle for ThreadTimerHandle {
    fn cancel(&self) {
        if self.timer.status.transition(CANCELLED) {
            let _guard = self.timer.lock.lock().expect("timer lock");
            self.timer.wake.notify_all();
        }
    }

    fn is_pending(&self) -> bool {
        self.timer.status.is_pending()
    }
}

impl Scheduler for ThreadScheduler {
    type Handle = ThreadTimerHandle;

    fn schedule(&self, delay: Duration, action: Action) -> Self::Handle {
        let timer = Arc::new(ThreadTimer::default());
        let worker = Arc::clone(&timer);
        let deadline = Instant::now() + delay;
        let id = THREAD_TIMER_COUNTER.fetch_add(1, Ordering::Relaxed);
        let spawned = thread::Builder::new()
            .name(format!("liveplot-timer-{id}"))
            .spawn(move || {
                let mut guard = worker.lock.lock().expect("timer lock");
                loop {
                    if !worker.status.is_pending() {
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    guard = worker
                        .wake
                        .wait_timeout(guard, deadline - now)
                        .expect("timer lock")
                        .0;
                }
                drop(guard);
                if worker.status.transition(FIRED) {
                    action();
                }
            });
        if let Err(err) = spawned {
            tracing::warn!(target: "liveplot.timer", id, %err, "failed to spawn timer thread");
            timer.status.transition(CANCELLED);
        }
        ThreadTimerHandle { timer }
    }
}

struct ManualEntry {
    due: Duration,
    seq: u64,
    status: Arc<TimerStatus>,
    action: Action,
}

#[derive(Default)]
struct ManualQueue {
    now: Duration,
    next_seq: u64,
    entries: Vec<ManualEntry>,
}

impl ManualQueue {
    fn pop_due(&mut self, until: Duration) -> Option<ManualEntry> {
        self.entries.retain(|entry| entry.status.is_pending());
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(position, _)| position)?;
        Some(self.entries.swap_remove(position))
    }
}

/// Scheduler driven by an explicitly advanced virtual clock.
///
/// Actions run on the thread calling [`ManualScheduler::advance`], in due
/// order, and never while the scheduler's own lock is held, so an action may
/// schedule further timers.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualQueue>>,
}

impl ManualScheduler {
    /// Create a scheduler with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.inner.lock().expect("manual scheduler lock").now
    }

    /// Number of timers that are still pending.
    pub fn pending(&self) -> usize {
        let queue = self.inner.lock().expect("manual scheduler lock");
        queue
            .entries
            .iter()
            .filter(|entry| entry.status.is_pending())
            .count()
    }

    /// Advance the clock, running every action that becomes due.
    ///
    /// Returns the number of actions that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let until = self.now() + by;
        let mut fired = 0;
        loop {
            let entry = {
                let mut queue = self.inner.lock().expect("manual scheduler lock");
                match queue.pop_due(until) {
                    Some(entry) => {
                        queue.now = queue.now.max(entry.due);
                        entry
                    }
                    None => {
                        queue.now = queue.now.max(until);
                        break;
                    }
                }
            };
            if entry.status.transition(FIRED) {
                (entry.action)();
                fired += 1;
            }
        }
        fired
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Handle for a [`ManualScheduler`] timer.
#[derive(Debug, Clone)]
pub struct ManualTimerHandle {
    status: Arc<TimerStatus>,
}

impl TimerHandle for ManualTimerHandle {
    fn cancel(&self) {
        self.status.transition(CANCELLED);
    }

    fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualTimerHandle;

    fn schedule(&self, delay: Duration, action: Action) -> Self::Handle {
        let status = Arc::new(TimerStatus::default());
        let mut queue = self.inner.lock().expect("manual scheduler lock");
        queue.entries.retain(|entry| entry.status.is_pending());
        let seq = queue.next_seq;
        queue.next_seq += 1;
        let due = queue.now + delay;
        queue.entries.push(ManualEntry {
            due,
            seq,
            status: Arc::clone(&status),
            action,
        });
        ManualTimerHandle { status }
    }
}
