//! `open` → `start` → `stop` → `close`, per `spec.md` §4.E.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use tokio::task::JoinHandle;

const CREATED: u8 = 0;
const OPEN: u8 = 1;
const STARTED: u8 = 2;
const STOPPED: u8 = 3;
const CLOSED: u8 = 4;

/// Drives the pool's lifecycle state machine and owns the background
/// cleanup/re-announce timer tasks armed by [`Lifecycle::start`].
#[derive(Default)]
pub struct Lifecycle {
    state: AtomicU8,
    tasks: parking_lot::Mutex<Vec<JoinHandle<()>>>,
}

impl Lifecycle {
    /// Creates a lifecycle in the initial `created` state.
    pub fn new() -> Self {
        Self { state: AtomicU8::new(CREATED), tasks: parking_lot::Mutex::new(Vec::new()) }
    }

    /// Transitions `created`/`closed` → `open`. Idempotent: returns `false`
    /// if already open.
    pub fn open(&self) -> bool {
        self.state
            .compare_exchange(CREATED, OPEN, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Arms the cleanup/re-announce timers, registering their `JoinHandle`s
    /// so [`Self::stop`] can cancel them. No-op if not currently `open`.
    pub fn start(&self, tasks: Vec<JoinHandle<()>>) {
        if self
            .state
            .compare_exchange(OPEN, STARTED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.tasks.lock() = tasks;
        }
    }

    /// Disarms the timers started by [`Self::start`].
    pub fn stop(&self) {
        if self
            .state
            .compare_exchange(STARTED, STOPPED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            for task in self.tasks.lock().drain(..) {
                task.abort();
            }
        }
    }

    /// Marks the pool permanently closed. The caller is responsible for
    /// clearing pool state (see [`crate::pool::TxPool::clear`]).
    pub fn close(&self) {
        self.stop();
        self.state.store(CLOSED, Ordering::SeqCst);
    }

    /// Whether the pool currently accepts mutation (`started`, or `open`
    /// without timers armed yet).
    pub fn is_accepting(&self) -> bool {
        matches!(self.state.load(Ordering::SeqCst), OPEN | STARTED)
    }
}

/// Shared handle to a [`Lifecycle`], cloned into the timer tasks it spawns.
pub type LifecycleHandle = Arc<Lifecycle>;
