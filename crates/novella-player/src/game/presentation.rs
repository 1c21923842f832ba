//! Presentation facade
//!
//! Glues the scene queue, the emotion animation, the mixer and asset
//! resolution together. The network side feeds scenes and world updates in;
//! the chrome reads one `PresentationFrame` per frame.

use std::rc::Rc;

use novella_common::{EmotionTag, PlayerConfig, Scene, StatsUpdate, WorldState};

use super::dialog::{RevealState, SceneEvent, SceneOrchestrator};
use super::emotion::{AnimationEvent, AnimationPhase, EmotionAnimationController, Glow, Pose};
use super::particles::ParticleSprite;
use super::stats::StatsTracker;
use crate::assets::{self, AssetProbe};
use crate::engine::output::AudioOutput;
use crate::engine::sound_engine::{AudioMixer, AudioState};

/// Everything that happened during one call into the facade
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    Scene(SceneEvent),
    Animation(AnimationEvent),
    /// Resolved background path, `None` when no candidate could be loaded
    BackgroundChanged(Option<String>),
    AffectionChanged { affection: i32, delta: i32 },
    /// A message or event was refused for lack of energy
    OutOfEnergy { needed: u32, available: u32 },
}

/// Snapshot handed to the renderer
#[derive(Debug, Clone)]
pub struct PresentationFrame {
    pub scene: Option<Rc<Scene>>,
    pub displayed_text: String,
    pub annotation: Option<String>,
    pub reveal: RevealState,
    /// Typing indicator
    pub awaiting_response: bool,
    pub queued: usize,
    /// Emotion the character shows; survives the current scene being cleared
    pub emotion: EmotionTag,
    pub character_image: Option<String>,
    pub phase: AnimationPhase,
    pub pose: Pose,
    pub glow: Glow,
    pub brightness: f32,
    pub particles: Vec<ParticleSprite>,
    pub background: Option<String>,
    pub audio: AudioState,
    pub affection: i32,
    pub energy: u32,
    /// Recent affection change, shown for a moment
    pub affection_change: Option<i32>,
}

pub struct PresentationFacade {
    orchestrator: SceneOrchestrator,
    animation: EmotionAnimationController,
    mixer: AudioMixer,
    stats: StatsTracker,
    probe: Box<dyn AssetProbe>,
    world: WorldState,
    background: Option<String>,
    character_image: Option<String>,
    outfit: String,
    default_outfit: String,
    events: Vec<PresentationEvent>,
}

impl PresentationFacade {
    pub fn new(config: &PlayerConfig, output: Box<dyn AudioOutput>, probe: Box<dyn AssetProbe>) -> Self {
        let background = assets::first_loadable(
            probe.as_ref(),
            std::iter::once(assets::background_path(assets::DEFAULT_BACKGROUND)),
        );
        let mut facade = Self {
            orchestrator: SceneOrchestrator::new(config.reveal.clone()),
            animation: EmotionAnimationController::new(&config.animation),
            mixer: AudioMixer::new(output, config.audio.clone()),
            stats: StatsTracker::new(config.stats.clone()),
            probe,
            world: WorldState::default(),
            background,
            character_image: None,
            outfit: config.assets.outfit.clone(),
            default_outfit: config.assets.default_outfit.clone(),
            events: Vec::new(),
        };
        facade.refresh_character();
        facade
    }

    /// A batch of scenes arrived from the backend
    pub fn receive_scenes(&mut self, scenes: Vec<Scene>) {
        self.orchestrator.enqueue(scenes);
        self.pump();
    }

    /// The backend request failed
    pub fn receive_failure(&mut self, retry_hint: &str) {
        self.orchestrator.enqueue_failure(retry_hint);
        self.pump();
    }

    /// Affection / energy from the backend
    pub fn receive_stats(&mut self, update: StatsUpdate) {
        if let Some(delta) = self.stats.receive(update) {
            self.events.push(PresentationEvent::AffectionChanged {
                affection: self.stats.affection(),
                delta,
            });
        }
    }

    /// The user sent a message. Refused without energy, while scenes are
    /// still queued, or while a reply is pending.
    pub fn begin_exchange(&mut self) -> bool {
        let cost = self.stats.exchange_cost();
        if !self.afford(cost) {
            return false;
        }
        let started = self.orchestrator.begin_exchange();
        if started {
            self.stats.spend(cost);
        }
        self.pump();
        started
    }

    /// Narrator interlude; the character keeps the emotion on screen.
    /// Refused without energy or while a reply is pending.
    pub fn trigger_event(&mut self, narration: &str) -> bool {
        if self.orchestrator.awaiting_response() {
            tracing::debug!("Event refused, reply still pending");
            return false;
        }
        let cost = self.stats.event_cost();
        if !self.afford(cost) {
            return false;
        }
        self.stats.spend(cost);
        let emotion = self.animation.emotion();
        self.orchestrator
            .enqueue(std::iter::once(Scene::event(narration, emotion)));
        self.pump();
        true
    }

    pub fn request_advance(&mut self) -> bool {
        let advanced = self.orchestrator.request_advance();
        self.pump();
        advanced
    }

    pub fn reset(&mut self) {
        self.orchestrator.reset();
        self.pump();
    }

    /// Show the last scene of an existing conversation
    pub fn restore(&mut self, scene: Scene) {
        self.orchestrator.restore(scene);
        self.pump();
    }

    /// New location / time / music descriptor
    pub fn set_world(&mut self, world: WorldState) {
        let location = world.location.as_ref().map(|l| l.as_str());
        if let Some(wanted) = assets::resolve_background(location, world.time_of_day) {
            let chain = assets::background_chain(location, world.time_of_day);
            let resolved = assets::first_loadable(self.probe.as_ref(), chain);
            if resolved != self.background {
                tracing::debug!("Background -> {:?} (wanted {})", resolved, wanted);
                self.background = resolved.clone();
                self.events.push(PresentationEvent::BackgroundChanged(resolved));
            }
        }
        self.mixer.apply_world(&world);
        self.world = world;
    }

    pub fn set_volume(&mut self, volume: f32, muted: bool) {
        self.mixer.set_master_volume(volume, muted);
    }

    pub fn toggle_music(&mut self) -> bool {
        self.mixer.toggle_music()
    }

    /// Advance every component by one frame
    pub fn update(&mut self, dt_ms: u32) -> Vec<PresentationEvent> {
        let scene_events = self.orchestrator.update(dt_ms);
        self.handle_scene_events(scene_events);
        let animation_events = self.animation.update(dt_ms);
        self.events
            .extend(animation_events.into_iter().map(PresentationEvent::Animation));
        self.mixer.update(dt_ms);
        self.stats.update(dt_ms);
        std::mem::take(&mut self.events)
    }

    /// Events raised by facade calls since the last `update`
    pub fn take_events(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn frame(&self) -> PresentationFrame {
        PresentationFrame {
            scene: self.orchestrator.current().cloned(),
            displayed_text: self.orchestrator.displayed_text().to_string(),
            annotation: self.orchestrator.annotation().map(str::to_string),
            reveal: self.orchestrator.state(),
            awaiting_response: self.orchestrator.awaiting_response(),
            queued: self.orchestrator.queue_len(),
            emotion: self.animation.emotion(),
            character_image: self.character_image.clone(),
            phase: self.animation.phase(),
            pose: self.animation.pose(),
            glow: self.animation.glow(),
            brightness: self.animation.brightness(),
            particles: self.animation.burst().map(|b| b.sprites()).unwrap_or_default(),
            background: self.background.clone(),
            audio: self.mixer.state(),
            affection: self.stats.affection(),
            energy: self.stats.energy(),
            affection_change: self.stats.affection_change(),
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Emotion switches that played a punch so far
    pub fn punch_count(&self) -> u32 {
        self.animation.punch_count()
    }

    /// Release audio; the facade stays readable afterwards
    pub fn teardown(&mut self) {
        self.mixer.teardown();
    }

    fn afford(&mut self, cost: u32) -> bool {
        if self.stats.can_afford(cost) {
            return true;
        }
        let available = self.stats.energy();
        tracing::debug!("Not enough energy: need {}, have {}", cost, available);
        self.events.push(PresentationEvent::OutOfEnergy { needed: cost, available });
        false
    }

    fn pump(&mut self) {
        let scene_events = self.orchestrator.take_events();
        self.handle_scene_events(scene_events);
    }

    fn handle_scene_events(&mut self, scene_events: Vec<SceneEvent>) {
        for event in scene_events {
            if let SceneEvent::CurrentChanged(scene) = &event {
                if scene.emotion != self.animation.emotion() {
                    self.animation.set_emotion(scene.emotion);
                    self.refresh_character();
                }
            }
            self.events.push(PresentationEvent::Scene(event));
        }
    }

    fn refresh_character(&mut self) {
        let chain = assets::character_chain(&self.outfit, &self.default_outfit, self.animation.emotion());
        self.character_image = assets::first_loadable(self.probe.as_ref(), chain);
        if self.character_image.is_none() {
            tracing::debug!("No sprite for {}, hiding character", self.animation.emotion());
        }
    }
}
