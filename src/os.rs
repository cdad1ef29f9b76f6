//! Software timekeeping driven by the millisecond system tick

/// Lifecycle of a one-shot countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Finished,
}

/// Countdown that fires exactly once after `duration_ms`.
///
/// The timer never reads a clock itself: callers pass the current
/// millisecond tick to [`start`](Self::start) and [`poll`](Self::poll).
/// All arithmetic wraps, so a running timer survives the 32-bit tick
/// counter rolling over.
#[derive(Debug, Clone, Copy)]
pub struct OneShotTimer {
    started: u32,
    duration_ms: u32,
    state: TimerState,
}

impl OneShotTimer {
    pub const fn new() -> Self {
        Self {
            started: 0,
            duration_ms: 0,
            state: TimerState::Stopped,
        }
    }

    /// Begin a fresh countdown from `now`.
    pub fn start(&mut self, now: u32, duration_ms: u32) {
        self.started = now;
        self.duration_ms = duration_ms;
        self.state = TimerState::Running;
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    #[inline]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Milliseconds left before expiry, zero when not running.
    pub fn remaining(&self, now: u32) -> u32 {
        if !self.is_running() {
            return 0;
        }
        self.duration_ms
            .saturating_sub(now.wrapping_sub(self.started))
    }

    /// Returns `true` on the first poll at or after expiry, then never again
    /// until restarted.
    pub fn poll(&mut self, now: u32) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        if now.wrapping_sub(self.started) >= self.duration_ms {
            self.state = TimerState::Finished;
            return true;
        }
        false
    }
}

impl Default for OneShotTimer {
    fn default() -> Self {
        Self::new()
    }
}
