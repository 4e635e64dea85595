use gloo_timers::callback::Timeout;

#[cfg(feature = "test-dom")]
mod manual;
#[cfg(feature = "test-dom")]
pub use manual::{ManualHandle, ManualScheduler};

pub type Task = Box<dyn FnOnce()>;

/// Deferred callbacks on the page's event loop.
pub trait Scheduler: Clone + 'static {
    /// Dropping the handle cancels the task if it has not run yet.
    type Handle: 'static;

    fn schedule(&self, delay_ms: u32, task: Task) -> Self::Handle;

    /// Fire-and-forget; the task cannot be cancelled.
    fn defer(&self, delay_ms: u32, task: Task);
}

/// `setTimeout` through gloo.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooScheduler;

impl Scheduler for GlooScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Task) -> Timeout {
        Timeout::new(delay_ms, task)
    }

    fn defer(&self, delay_ms: u32, task: Task) {
        Timeout::new(delay_ms, task).forget();
    }
}
