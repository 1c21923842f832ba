//! Frame-driven step timer
//!
//! Nothing in the player owns a real OS timer. The game loop hands every
//! component the elapsed milliseconds since the last frame, and a `StepTimer`
//! turns that into a count of fixed-period ticks. Cancelling is just flipping
//! `active` off, so clearing a timer twice is harmless.

#[derive(Debug, Clone)]
pub struct StepTimer {
    period_ms: u32,
    elapsed_ms: u32,
    /// Ticks left before the timer stops by itself
    remaining: u32,
    active: bool,
}

impl StepTimer {
    /// Fires exactly `count` times, then deactivates
    pub fn counted(period_ms: u32, count: u32) -> Self {
        Self {
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
            remaining: count,
            active: count > 0,
        }
    }

    /// A timer that never fires
    pub fn idle() -> Self {
        Self::counted(1, 0)
    }

    /// Advance by `dt_ms`; returns how many ticks fired
    pub fn advance(&mut self, dt_ms: u32) -> u32 {
        if !self.active {
            return 0;
        }
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let fired = (self.elapsed_ms / self.period_ms).min(self.remaining);
        self.elapsed_ms %= self.period_ms;
        self.remaining -= fired;
        if self.remaining == 0 {
            self.active = false;
        }
        fired
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }
}
