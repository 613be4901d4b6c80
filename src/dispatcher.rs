//! Delayed task queue bound to the UI thread.
//!
//! Tasks are posted with a minimum delay and run by the frame loop through
//! [`Dispatcher::run_due`]. Every posted task gets a [`TimerHandle`] that can
//! cancel it until it has run.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::host::UiHost;

pub type UiTask = Box<dyn FnOnce(&mut dyn UiHost)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

struct Scheduled {
    handle: TimerHandle,
    due: Instant,
    task: UiTask,
}

struct Queue {
    next_id: u64,
    tasks: Vec<Scheduled>,
}

/// Shared handle to the UI-thread task queue. Clones refer to the same queue.
#[derive(Clone)]
pub struct Dispatcher {
    clock: Rc<dyn Clock>,
    queue: Rc<RefCell<Queue>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(SystemClock))
    }

    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Rc::new(RefCell::new(Queue {
                next_id: 1,
                tasks: Vec::new(),
            })),
        }
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Post `task` to run no earlier than `delay` from now.
    pub fn delay(
        &self,
        delay: Duration,
        task: impl FnOnce(&mut dyn UiHost) + 'static,
    ) -> TimerHandle {
        let due = self.clock.now() + delay;
        let mut queue = self.queue.borrow_mut();
        let handle = TimerHandle(queue.next_id);
        queue.next_id += 1;
        queue.tasks.push(Scheduled {
            handle,
            due,
            task: Box::new(task),
        });
        handle
    }

    /// Remove a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        let mut queue = self.queue.borrow_mut();
        match queue.tasks.iter().position(|s| s.handle == handle) {
            Some(idx) => {
                queue.tasks.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.queue
            .borrow()
            .tasks
            .iter()
            .any(|s| s.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    /// Earliest deadline among pending tasks, for sleeping the event loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.borrow().tasks.iter().map(|s| s.due).min()
    }

    /// Run every task whose deadline has passed, in (deadline, post order).
    /// Returns how many ran.
    ///
    /// Tasks leave the queue one at a time, so a running task can still cancel
    /// a later one from the same batch. Tasks posted during the batch wait for
    /// the next call.
    pub fn run_due(&self, host: &mut dyn UiHost) -> usize {
        let now = self.clock.now();
        let batch_end = self.queue.borrow().next_id;
        let mut count = 0;
        while let Some(scheduled) = self.pop_due(now, batch_end) {
            (scheduled.task)(host);
            count += 1;
        }
        count
    }

    fn pop_due(&self, now: Instant, batch_end: u64) -> Option<Scheduled> {
        let mut queue = self.queue.borrow_mut();
        // Handles are issued in increasing order, so they break deadline ties.
        let idx = queue
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now && s.handle.0 < batch_end)
            .min_by_key(|(_, s)| (s.due, s.handle.0))
            .map(|(i, _)| i)?;
        Some(queue.tasks.remove(idx))
    }
}
