//! Rate limiters and cancellable one-shot tasks.
//!
//! `ThrottleGuard` and `DebounceGuard` are reusable primitives for
//! high-frequency listeners (resize, input, scroll). `ScheduledTask` is the
//! cancel-and-reschedule timer the contact form uses for its reset.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::{TimerId, Timers};

/// Leading-edge throttle: invokes immediately, then ignores calls until
/// `interval_ms` has elapsed since the last invocation.
pub struct ThrottleGuard<T: Timers + ?Sized, A> {
    timers: Rc<T>,
    interval_ms: f64,
    last_run: Cell<Option<f64>>,
    callback: Box<dyn Fn(A)>,
}

impl<T: Timers + ?Sized, A> ThrottleGuard<T, A> {
    pub fn new(timers: Rc<T>, interval_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            timers,
            interval_ms: f64::from(interval_ms),
            last_run: Cell::new(None),
            callback: Box::new(callback),
        }
    }

    /// Returns whether the callback ran.
    pub fn call(&self, arg: A) -> bool {
        let now = self.timers.now_ms();
        if let Some(last) = self.last_run.get() {
            if now - last < self.interval_ms {
                return false;
            }
        }
        self.last_run.set(Some(now));
        (self.callback)(arg);
        true
    }
}

struct DebounceState<A> {
    timer: Option<TimerId>,
    latest: Option<A>,
}

/// Trailing debounce: runs once `wait_ms` after the most recent call, with
/// that call's argument. Every call restarts the wait.
pub struct DebounceGuard<T: Timers + ?Sized + 'static, A: 'static> {
    timers: Rc<T>,
    wait_ms: u32,
    callback: Rc<dyn Fn(A)>,
    state: Rc<RefCell<DebounceState<A>>>,
}

impl<T: Timers + ?Sized + 'static, A: 'static> DebounceGuard<T, A> {
    pub fn new(timers: Rc<T>, wait_ms: u32, callback: impl Fn(A) + 'static) -> Self {
        Self {
            timers,
            wait_ms,
            callback: Rc::new(callback),
            state: Rc::new(RefCell::new(DebounceState {
                timer: None,
                latest: None,
            })),
        }
    }

    pub fn call(&self, arg: A) {
        self.cancel();

        let state = self.state.clone();
        let callback = self.callback.clone();
        let id = self.timers.set_timeout(
            self.wait_ms,
            Box::new(move || {
                let latest = {
                    let mut s = state.borrow_mut();
                    s.timer = None;
                    s.latest.take()
                };
                if let Some(arg) = latest {
                    callback(arg);
                }
            }),
        );

        let mut s = self.state.borrow_mut();
        s.timer = Some(id);
        s.latest = Some(arg);
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) {
        let pending = {
            let mut s = self.state.borrow_mut();
            s.latest = None;
            s.timer.take()
        };
        if let Some(id) = pending {
            self.timers.clear_timeout(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().timer.is_some()
    }
}

/// A one-shot timer that can be cancelled. Scheduling while a run is
/// pending cancels the pending run first, so at most one is ever queued.
pub struct ScheduledTask<T: Timers + ?Sized> {
    timers: Rc<T>,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl<T: Timers + ?Sized> ScheduledTask<T> {
    pub fn new(timers: Rc<T>) -> Self {
        Self {
            timers,
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn schedule(&self, delay_ms: u32, task: impl FnOnce() + 'static) {
        self.cancel();
        let pending = self.pending.clone();
        let id = self.timers.set_timeout(
            delay_ms,
            Box::new(move || {
                pending.set(None);
                task();
            }),
        );
        self.pending.set(Some(id));
    }

    /// Returns whether a pending run was cancelled.
    pub fn cancel(&self) -> bool {
        match self.pending.take() {
            Some(id) => {
                self.timers.clear_timeout(id);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}
