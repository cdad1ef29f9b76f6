//! Debounced state transitions.
//!
//! A transition is requested as soon as its condition is observed but only
//! takes effect when the settle timer expires. The target is read when the
//! timer fires, so a later request for a different state redirects a pending
//! transition.

use super::state::State;
use crate::os::OneShotTimer;

/// Behaviour when a different target is requested while a countdown is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RearmPolicy {
    /// Swap the target, keep the deadline armed by the first request.
    KeepDeadline,
    /// Swap the target and start a fresh countdown.
    Restart,
}

#[derive(Debug)]
pub struct TransitionScheduler {
    next: State,
    timer: OneShotTimer,
    policy: RearmPolicy,
}

impl TransitionScheduler {
    pub const fn new(initial: State, policy: RearmPolicy) -> Self {
        Self {
            next: initial,
            timer: OneShotTimer::new(),
            policy,
        }
    }

    /// Ask for `target` to become current after `delay_ms`.
    ///
    /// Re-requesting the pending target is a no-op.
    pub fn request(&mut self, target: State, delay_ms: u32, now: u32) {
        if self.next == target {
            return;
        }
        self.next = target;

        match self.policy {
            RearmPolicy::KeepDeadline if self.timer.is_running() => {}
            _ => self.timer.start(now, delay_ms),
        }
    }

    /// Fires at most once per armed countdown, yielding the target held at fire time.
    pub fn poll(&mut self, now: u32) -> Option<State> {
        if self.timer.poll(now) {
            Some(self.next)
        } else {
            None
        }
    }

    #[inline]
    pub fn next_state(&self) -> State {
        self.next
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.timer.is_running()
    }

    pub fn remaining(&self, now: u32) -> u32 {
        self.timer.remaining(now)
    }

    /// Drop any pending countdown and treat `state` as already reached.
    pub fn reset(&mut self, state: State) {
        self.timer.stop();
        self.next = state;
    }
}
