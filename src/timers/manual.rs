//! Deterministic [`Scheduler`] for driving timed behavior without a browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{Scheduler, Task};

struct Pending {
    due: u64,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: u64,
    seq: u64,
    queue: Vec<Pending>,
}

/// A clock that only moves when told to. Tasks run in due order, ties in the
/// order they were scheduled.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

pub struct ManualHandle {
    cancelled: Rc<Cell<bool>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancelled.set(true);
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.clock.borrow().now
    }

    /// Tasks that are neither run nor cancelled.
    pub fn pending(&self) -> usize {
        self.clock
            .borrow()
            .queue
            .iter()
            .filter(|p| !p.cancelled.get())
            .count()
    }

    /// Advances the clock by `ms`, running every task that falls due on the way.
    /// Tasks scheduled by running tasks also run if they fall inside the window.
    pub fn advance(&self, ms: u64) {
        let until = self.clock.borrow().now + ms;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                clock.queue.retain(|p| !p.cancelled.get());
                let earliest = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= until)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);
                earliest.map(|i| {
                    let pending = clock.queue.remove(i);
                    clock.now = pending.due;
                    pending
                })
            };
            match next {
                Some(pending) => {
                    pending.cancelled.set(true);
                    (pending.task)();
                }
                None => break,
            }
        }
        self.clock.borrow_mut().now = until;
    }

    fn push(&self, delay_ms: u32, task: Task) -> Rc<Cell<bool>> {
        let cancelled = Rc::new(Cell::new(false));
        let mut clock = self.clock.borrow_mut();
        clock.seq += 1;
        let pending = Pending {
            due: clock.now + u64::from(delay_ms),
            seq: clock.seq,
            cancelled: cancelled.clone(),
            task,
        };
        clock.queue.push(pending);
        cancelled
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule(&self, delay_ms: u32, task: Task) -> ManualHandle {
        ManualHandle {
            cancelled: self.push(delay_ms, task),
        }
    }

    fn defer(&self, delay_ms: u32, task: Task) {
        self.push(delay_ms, task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let log = log.clone();
            move |label: &'static str| -> Task {
                let log = log.clone();
                Box::new(move || log.borrow_mut().push(label))
            }
        };
        (log, make)
    }

    #[test]
    fn runs_in_due_order() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();
        clock.defer(140, task("late"));
        clock.defer(60, task("early"));
        clock.defer(60, task("early-second"));

        clock.advance(59);
        assert!(log.borrow().is_empty());
        clock.advance(1);
        assert_eq!(*log.borrow(), vec!["early", "early-second"]);
        clock.advance(100);
        assert_eq!(*log.borrow(), vec!["early", "early-second", "late"]);
        assert_eq!(clock.now(), 160);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn dropping_handle_cancels() {
        let clock = ManualScheduler::new();
        let (log, task) = recorder();
        let handle = clock.schedule(10, task("cancelled"));
        let _kept = clock.schedule(10, task("kept"));
        drop(handle);
        assert_eq!(clock.pending(), 1);

        clock.advance(10);
        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn tasks_scheduled_while_running_fire_within_window() {
        let clock = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        {
            let inner_clock = clock.clone();
            let hits = hits.clone();
            clock.defer(
                16,
                Box::new(move || {
                    hits.set(hits.get() + 1);
                    let hits = hits.clone();
                    inner_clock.defer(16, Box::new(move || hits.set(hits.get() + 1)));
                }),
            );
        }
        clock.advance(31);
        assert_eq!(hits.get(), 1);
        clock.advance(1);
        assert_eq!(hits.get(), 2);
    }
}
