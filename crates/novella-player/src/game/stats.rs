//! Affection and energy
//!
//! Energy pays for user actions: a message costs `exchange_cost`, a narrator
//! event `event_cost`. Spending is optimistic; the next backend report
//! overwrites whatever was deducted locally. An affection change is shown
//! as a delta for `affection_flash_ms`.

use novella_common::{StatsConfig, StatsUpdate};

use crate::engine::timer::StepTimer;

pub struct StatsTracker {
    affection: i32,
    energy: u32,
    /// Last affection delta while it is still on screen
    change: Option<i32>,
    change_timer: StepTimer,
    config: StatsConfig,
}

impl StatsTracker {
    pub fn new(config: StatsConfig) -> Self {
        Self {
            affection: 0,
            energy: config.initial_energy,
            change: None,
            change_timer: StepTimer::idle(),
            config,
        }
    }

    /// Take the backend's numbers. Returns the affection delta, if any.
    pub fn receive(&mut self, update: StatsUpdate) -> Option<i32> {
        if let Some(energy) = update.energy {
            self.energy = energy;
        }
        let affection = update.affection?;
        let delta = affection - self.affection;
        self.affection = affection;
        if delta == 0 {
            return None;
        }
        tracing::debug!("Affection {} ({:+})", affection, delta);
        self.change = Some(delta);
        self.change_timer = StepTimer::counted(self.config.affection_flash_ms, 1);
        Some(delta)
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.energy >= cost
    }

    pub fn spend(&mut self, cost: u32) {
        self.energy = self.energy.saturating_sub(cost);
    }

    pub fn exchange_cost(&self) -> u32 {
        self.config.exchange_cost
    }

    pub fn event_cost(&self) -> u32 {
        self.config.event_cost
    }

    /// Expire the affection delta
    pub fn update(&mut self, dt_ms: u32) {
        if self.change_timer.advance(dt_ms) > 0 {
            self.change = None;
        }
    }

    pub fn affection(&self) -> i32 {
        self.affection
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn affection_change(&self) -> Option<i32> {
        self.change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> StatsTracker {
        StatsTracker::new(StatsConfig::default())
    }

    #[test]
    fn affection_delta_expires() {
        let mut stats = tracker();
        assert_eq!(stats.receive(StatsUpdate::affection(5)), Some(5));
        assert_eq!(stats.affection_change(), Some(5));

        stats.update(1999);
        assert_eq!(stats.affection_change(), Some(5));
        stats.update(1);
        assert_eq!(stats.affection_change(), None);
        assert_eq!(stats.affection(), 5);
    }

    #[test]
    fn new_delta_restarts_the_display() {
        let mut stats = tracker();
        stats.receive(StatsUpdate::affection(5));
        stats.update(1500);
        assert_eq!(stats.receive(StatsUpdate::affection(2)), Some(-3));
        stats.update(1500);
        assert_eq!(stats.affection_change(), Some(-3));
    }

    #[test]
    fn unchanged_affection_shows_nothing() {
        let mut stats = tracker();
        stats.receive(StatsUpdate::affection(0));
        assert_eq!(stats.affection_change(), None);
        stats.receive(StatsUpdate::energy(40));
        assert_eq!(stats.energy(), 40);
        assert_eq!(stats.affection_change(), None);
    }

    #[test]
    fn spending_never_goes_negative() {
        let mut stats = tracker();
        stats.receive(StatsUpdate::energy(1));
        assert!(stats.can_afford(stats.exchange_cost()));
        assert!(!stats.can_afford(stats.event_cost()));
        stats.spend(2);
        assert_eq!(stats.energy(), 0);
        assert!(!stats.can_afford(1));
        assert!(stats.can_afford(0));
    }
}
