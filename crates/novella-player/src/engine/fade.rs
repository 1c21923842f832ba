//! Linear volume ramps in a fixed number of discrete steps.
//!
//! `Δ = peak / steps`, one step every `duration / steps` ms. The last step
//! always lands exactly on the endpoint.

use super::timer::StepTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

#[derive(Debug, Clone)]
pub struct Fade {
    direction: FadeDirection,
    /// Fade-in: target volume. Fade-out: volume we started from.
    peak: f32,
    steps: u32,
    step: u32,
    timer: StepTimer,
}

impl Fade {
    /// Ramp 0 → `target`
    pub fn fade_in(target: f32, duration_ms: u32, steps: u32) -> Self {
        Self::new(FadeDirection::In, target, duration_ms, steps)
    }

    /// Ramp `from` → 0
    pub fn fade_out(from: f32, duration_ms: u32, steps: u32) -> Self {
        Self::new(FadeDirection::Out, from, duration_ms, steps)
    }

    fn new(direction: FadeDirection, peak: f32, duration_ms: u32, steps: u32) -> Self {
        let steps = steps.max(1);
        Self {
            direction,
            peak: peak.clamp(0.0, 1.0),
            steps,
            step: 0,
            timer: StepTimer::counted(duration_ms / steps, steps),
        }
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    /// Fade-out: the volume to restore on the source once it is paused
    pub fn peak(&self) -> f32 {
        self.peak
    }

    fn delta(&self) -> f32 {
        self.peak / self.steps as f32
    }

    /// Volume after the steps taken so far
    pub fn volume(&self) -> f32 {
        if self.is_finished() {
            return match self.direction {
                FadeDirection::In => self.peak,
                FadeDirection::Out => 0.0,
            };
        }
        let travelled = self.delta() * self.step as f32;
        match self.direction {
            FadeDirection::In => travelled.clamp(0.0, self.peak),
            FadeDirection::Out => (self.peak - travelled).clamp(0.0, self.peak),
        }
    }

    /// Advance by `dt_ms`. Returns the new volume if at least one step fired.
    pub fn advance(&mut self, dt_ms: u32) -> Option<f32> {
        let fired = self.timer.advance(dt_ms);
        if fired == 0 {
            return None;
        }
        self.step = (self.step + fired).min(self.steps);
        Some(self.volume())
    }

    /// Master volume changed. A fade-in heads for the new target; a fade-out
    /// never rises above it. Step progress is kept; only Δ changes.
    pub fn retarget(&mut self, target: f32) {
        let target = target.clamp(0.0, 1.0);
        match self.direction {
            FadeDirection::In => self.peak = target,
            FadeDirection::Out => self.peak = self.peak.min(target),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}
