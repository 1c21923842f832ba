//! Playback engine: timers, fades, audio mixing and the frame loop.
//!
//! There is no window: `run` drives a `PresentationFacade` from a recorded
//! session script at a fixed 30 fps and logs what the chrome would draw.

pub mod fade;
pub mod output;
pub mod sound_engine;
pub mod timer;

use std::time::Duration;

use anyhow::Result;

use crate::game::dialog::{RevealState, SceneEvent};
use crate::game::emotion::AnimationEvent;
use crate::game::presentation::{PresentationEvent, PresentationFacade};
use crate::game::script::{Script, Step};

pub const FPS: u32 = 30;
pub const FRAME_MS: u32 = 1000 / FPS;

/// Frames appended after the last step so fades can finish
const TAIL_MS: u32 = 2000;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Click automatically after a scene has been settled this long
    pub auto_advance_ms: Option<u32>,
    /// Sleep between frames instead of running as fast as possible
    pub realtime: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub scenes_shown: u32,
    pub punches: u32,
    pub auto_advances: u32,
    pub background_changes: u32,
}

struct Player<'a> {
    facade: &'a mut PresentationFacade,
    options: &'a RunOptions,
    stats: RunStats,
    /// How long the current scene has been fully shown
    settled_ms: u32,
}

impl Player<'_> {
    fn step(&mut self, step: &Step) {
        match step {
            Step::World(world) => self.facade.set_world(world.clone()),
            Step::Scenes(batch) => self.facade.receive_scenes(batch.clone()),
            Step::Failure(hint) => self.facade.receive_failure(hint),
            Step::Advance(clicks) => {
                for _ in 0..*clicks {
                    if !self.facade.request_advance() {
                        tracing::debug!("Click ignored, nothing to advance");
                    }
                }
            }
            Step::Wait(ms) => self.frames(*ms),
            Step::Exchange => {
                if !self.facade.begin_exchange() {
                    tracing::warn!("Message not sent");
                }
            }
            Step::Event(narration) => {
                if !self.facade.trigger_event(narration) {
                    tracing::warn!("Event not triggered");
                }
            }
            Step::Stats(update) => self.facade.receive_stats(*update),
            Step::Reset => self.facade.reset(),
            Step::Restore(scene) => self.facade.restore(scene.clone()),
            Step::Volume { volume, muted } => self.facade.set_volume(*volume, *muted),
            Step::ToggleMusic => {
                let playing = self.facade.toggle_music();
                tracing::info!("Music {}", if playing { "on" } else { "off" });
            }
        }
        let events = self.facade.take_events();
        self.report(events);
    }

    /// Run frames covering `ms` of playback
    fn frames(&mut self, ms: u32) {
        let mut left = ms;
        while left > 0 {
            let dt = left.min(FRAME_MS);
            left -= dt;

            let events = self.facade.update(dt);
            self.report(events);
            self.stats.frames += 1;
            self.auto_advance(dt);

            if self.options.realtime {
                std::thread::sleep(Duration::from_millis(dt as u64));
            }
        }
    }

    fn auto_advance(&mut self, dt: u32) {
        let Some(delay) = self.options.auto_advance_ms else {
            return;
        };
        let frame = self.facade.frame();
        if frame.reveal != RevealState::Settled || frame.queued == 0 {
            self.settled_ms = 0;
            return;
        }
        self.settled_ms += dt;
        if self.settled_ms >= delay {
            self.settled_ms = 0;
            self.stats.auto_advances += 1;
            self.facade.request_advance();
            let events = self.facade.take_events();
            self.report(events);
        }
    }

    fn report(&mut self, events: Vec<PresentationEvent>) {
        for event in events {
            match event {
                PresentationEvent::Scene(SceneEvent::CurrentChanged(scene)) => {
                    self.stats.scenes_shown += 1;
                    let kind = if scene.is_event { "event" } else { "scene" };
                    tracing::info!("[{}] {} {:?}", scene.emotion, kind, scene.primary_text());
                    if let Some(note) = scene.annotation() {
                        tracing::info!("    ({})", note);
                    }
                }
                PresentationEvent::Scene(SceneEvent::RevealCompleted) => {
                    tracing::debug!("Reveal complete");
                }
                PresentationEvent::Scene(SceneEvent::QueueDrained) => {
                    tracing::debug!("Waiting for input");
                }
                PresentationEvent::Scene(SceneEvent::Cleared) => {
                    tracing::debug!("Scene cleared");
                }
                PresentationEvent::Animation(AnimationEvent::PunchStarted { emotion, chain }) => {
                    tracing::debug!("Punch {} (chain {})", emotion, chain);
                }
                PresentationEvent::Animation(other) => tracing::trace!("{:?}", other),
                PresentationEvent::AffectionChanged { affection, delta } => {
                    tracing::info!("Affection {} ({:+})", affection, delta);
                }
                PresentationEvent::OutOfEnergy { needed, available } => {
                    tracing::warn!("Not enough energy: need {}, have {}", needed, available);
                }
                PresentationEvent::BackgroundChanged(background) => {
                    self.stats.background_changes += 1;
                    match background {
                        Some(path) => tracing::info!("Background {}", path),
                        None => tracing::info!("Background hidden"),
                    }
                }
            }
        }
    }
}

/// Play a session script through the facade
pub fn run(facade: &mut PresentationFacade, script: &Script, options: &RunOptions) -> Result<RunStats> {
    tracing::info!("Playing {} steps at {} fps", script.steps.len(), FPS);

    let mut player = Player {
        facade,
        options,
        stats: RunStats::default(),
        settled_ms: 0,
    };
    for step in &script.steps {
        player.step(step);
    }
    player.frames(TAIL_MS);

    player.stats.punches = player.facade.punch_count();
    let frame = player.facade.frame();
    tracing::info!(
        "Finished at {:?}: {} on screen ({} particles), background {:?}, music {:?} (playing={}), ambience {:?}, affection {}, energy {}",
        player.facade.world().location,
        frame.emotion,
        frame.particles.len(),
        frame.background,
        frame.audio.music.active,
        frame.audio.music_playing,
        frame.audio.ambience.active,
        frame.affection,
        frame.energy
    );
    player.facade.teardown();
    Ok(player.stats)
}
