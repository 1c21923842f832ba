//! Character emotion animation
//!
//! Every emotion has a profile: a one-shot "punch" motion played when the
//! character switches into it, a looping idle motion, glow and brightness,
//! and a particle burst. A switch runs punch → settle → idle as a single
//! chain; a newer switch replaces the chain outright.

use rand::rngs::StdRng;
use rand::SeedableRng;

use novella_common::{AnimationConfig, EmotionTag};

use super::particles::{ParticleBurst, ParticleSpec};

/// Sprite transform relative to its resting place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale: f32,
    /// Degrees
    pub rotation: f32,
}

impl Pose {
    pub const REST: Pose = pose(0.0, 0.0, 1.0, 0.0);

    pub fn lerp(&self, to: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            offset_x: self.offset_x + (to.offset_x - self.offset_x) * t,
            offset_y: self.offset_y + (to.offset_y - self.offset_y) * t,
            scale: self.scale + (to.scale - self.scale) * t,
            rotation: self.rotation + (to.rotation - self.rotation) * t,
        }
    }
}

const fn pose(offset_x: f32, offset_y: f32, scale: f32, rotation: f32) -> Pose {
    Pose {
        offset_x,
        offset_y,
        scale,
        rotation,
    }
}

/// Keyframes spaced evenly over `duration_ms`, linearly interpolated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub keyframes: &'static [Pose],
    pub duration_ms: u32,
}

impl Motion {
    pub fn sample(&self, elapsed_ms: u32) -> Pose {
        match self.keyframes {
            [] => Pose::REST,
            [only] => *only,
            frames => {
                if elapsed_ms >= self.duration_ms {
                    return frames[frames.len() - 1];
                }
                let spans = (frames.len() - 1) as f32;
                let pos = elapsed_ms as f32 / self.duration_ms.max(1) as f32 * spans;
                let index = (pos.floor() as usize).min(frames.len() - 2);
                frames[index].lerp(&frames[index + 1], pos - index as f32)
            }
        }
    }

    /// Sample as a loop
    pub fn sample_looped(&self, elapsed_ms: u32) -> Pose {
        self.sample(elapsed_ms % self.duration_ms.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: [u8; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionProfile {
    pub punch: Motion,
    pub idle: Motion,
    pub glow: Glow,
    pub brightness: f32,
    pub particles: ParticleSpec,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

const BREATHE: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(0.0, -8.0, 1.0, 0.0), pose(0.0, 0.0, 1.0, 0.0)];
const BOUNCE: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(0.0, -12.0, 1.01, 0.0), pose(0.0, 0.0, 1.0, 0.0)];
const SLUMP: &[Pose] = &[pose(0.0, 4.0, 0.99, 0.0), pose(0.0, 8.0, 0.98, 0.0), pose(0.0, 4.0, 0.99, 0.0)];
const SEETHE: &[Pose] = &[pose(-2.0, 0.0, 1.02, 0.0), pose(2.0, 0.0, 1.02, 0.0), pose(-2.0, 0.0, 1.02, 0.0)];
const SWAY: &[Pose] = &[pose(0.0, 0.0, 1.0, -1.5), pose(0.0, -4.0, 1.0, 1.5), pose(0.0, 0.0, 1.0, -1.5)];
const TREMBLE: &[Pose] = &[pose(-3.0, 0.0, 1.0, 0.0), pose(3.0, -2.0, 1.0, 0.0), pose(-3.0, 0.0, 1.0, 0.0)];
const DRIFT: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(0.0, -5.0, 1.01, 0.0), pose(0.0, 0.0, 1.0, 0.0)];
const LEAN_AWAY: &[Pose] = &[pose(6.0, 0.0, 0.99, 2.0), pose(8.0, 0.0, 0.99, 3.0), pose(6.0, 0.0, 0.99, 2.0)];

const NOD: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(0.0, 6.0, 1.0, 0.0), pose(0.0, 0.0, 1.0, 0.0)];
const HOP: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(0.0, -30.0, 1.05, 0.0),
    pose(0.0, 0.0, 1.0, 0.0),
    pose(0.0, -15.0, 1.02, 0.0),
    pose(0.0, 0.0, 1.0, 0.0),
];
const SINK: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(0.0, 20.0, 0.97, 0.0), pose(0.0, 10.0, 0.98, 0.0)];
const STOMP: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(-10.0, 5.0, 1.08, -2.0),
    pose(10.0, 5.0, 1.08, 2.0),
    pose(-6.0, 0.0, 1.04, -1.0),
    pose(0.0, 0.0, 1.0, 0.0),
];
const SHRINK: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(-8.0, 6.0, 0.96, -4.0), pose(-4.0, 3.0, 0.98, -2.0)];
const JOLT: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(0.0, -40.0, 1.1, 0.0),
    pose(0.0, -10.0, 1.03, 0.0),
    pose(0.0, 0.0, 1.0, 0.0),
];
const SHAKE: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(-15.0, 0.0, 1.02, -3.0),
    pose(15.0, 0.0, 1.02, 3.0),
    pose(-15.0, 0.0, 1.02, -3.0),
    pose(15.0, 0.0, 1.02, 3.0),
    pose(0.0, 0.0, 1.0, 0.0),
];
const EXHALE: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(0.0, 5.0, 1.02, 0.0), pose(0.0, 0.0, 1.0, 0.0)];
const RECOIL: &[Pose] = &[pose(0.0, 0.0, 1.0, 0.0), pose(20.0, 0.0, 0.97, 5.0), pose(8.0, 0.0, 0.99, 2.0)];
const FLINCH: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(-20.0, 10.0, 0.95, -5.0),
    pose(-10.0, 5.0, 0.97, -2.0),
    pose(0.0, 0.0, 1.0, 0.0),
];
const TWIRL: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(0.0, -10.0, 1.04, 4.0),
    pose(0.0, -5.0, 1.02, -3.0),
    pose(0.0, 0.0, 1.0, 0.0),
];
const SURGE: &[Pose] = &[
    pose(0.0, 0.0, 1.0, 0.0),
    pose(0.0, -8.0, 1.1, 0.0),
    pose(0.0, -4.0, 1.06, 0.0),
    pose(0.0, 0.0, 1.03, 0.0),
];

const WARM: &[[u8; 3]] = &[[255, 214, 102], [255, 170, 90], [255, 240, 180]];
const BLUE: &[[u8; 3]] = &[[120, 160, 230], [90, 120, 200]];
const RED: &[[u8; 3]] = &[[230, 60, 50], [255, 110, 60]];
const PINK: &[[u8; 3]] = &[[255, 160, 190], [255, 120, 170], [255, 210, 225]];
const WHITE: &[[u8; 3]] = &[[255, 255, 255], [230, 230, 255]];
const GREEN: &[[u8; 3]] = &[[150, 220, 150], [200, 240, 180]];
const MURK: &[[u8; 3]] = &[[130, 150, 80], [110, 110, 90]];
const VIOLET: &[[u8; 3]] = &[[150, 110, 200], [90, 80, 150]];

const fn motion(keyframes: &'static [Pose], duration_ms: u32) -> Motion {
    Motion {
        keyframes,
        duration_ms,
    }
}

const fn glow(color: [u8; 3], intensity: f32) -> Glow {
    Glow { color, intensity }
}

const fn burst(count: u32, palette: &'static [[u8; 3]], distance: f32, duration_ms: u32) -> ParticleSpec {
    ParticleSpec {
        count,
        palette,
        distance,
        duration_ms,
    }
}

static NEUTRAL: EmotionProfile = EmotionProfile {
    punch: motion(NOD, 300),
    idle: motion(BREATHE, 6000),
    glow: glow([255, 255, 255], 0.0),
    brightness: 1.05,
    particles: burst(4, WHITE, 40.0, 600),
};
static JOY: EmotionProfile = EmotionProfile {
    punch: motion(HOP, 600),
    idle: motion(BOUNCE, 2000),
    glow: glow([255, 214, 102], 0.6),
    brightness: 1.15,
    particles: burst(16, WARM, 140.0, 1200),
};
static SAD: EmotionProfile = EmotionProfile {
    punch: motion(SINK, 800),
    idle: motion(SLUMP, 7000),
    glow: glow([90, 120, 200], 0.4),
    brightness: 0.85,
    particles: burst(8, BLUE, 60.0, 1800),
};
static ANGRY: EmotionProfile = EmotionProfile {
    punch: motion(STOMP, 500),
    idle: motion(SEETHE, 400),
    glow: glow([230, 60, 50], 0.7),
    brightness: 1.05,
    particles: burst(14, RED, 120.0, 900),
};
static SHY: EmotionProfile = EmotionProfile {
    punch: motion(SHRINK, 600),
    idle: motion(SWAY, 4000),
    glow: glow([255, 160, 190], 0.5),
    brightness: 1.1,
    particles: burst(10, PINK, 80.0, 1400),
};
static SURPRISE: EmotionProfile = EmotionProfile {
    punch: motion(JOLT, 400),
    idle: motion(DRIFT, 3000),
    glow: glow([255, 255, 200], 0.6),
    brightness: 1.2,
    particles: burst(12, WHITE, 160.0, 800),
};
static PANIC: EmotionProfile = EmotionProfile {
    punch: motion(SHAKE, 600),
    idle: motion(TREMBLE, 250),
    glow: glow([200, 200, 255], 0.5),
    brightness: 1.0,
    particles: burst(14, WHITE, 100.0, 700),
};
static RELAX: EmotionProfile = EmotionProfile {
    punch: motion(EXHALE, 900),
    idle: motion(BREATHE, 8000),
    glow: glow([150, 220, 150], 0.3),
    brightness: 1.05,
    particles: burst(6, GREEN, 50.0, 2000),
};
static DISGUST: EmotionProfile = EmotionProfile {
    punch: motion(RECOIL, 500),
    idle: motion(LEAN_AWAY, 5000),
    glow: glow([130, 150, 80], 0.4),
    brightness: 0.9,
    particles: burst(8, MURK, 70.0, 1000),
};
static FRIGHTENED: EmotionProfile = EmotionProfile {
    punch: motion(FLINCH, 500),
    idle: motion(TREMBLE, 300),
    glow: glow([150, 110, 200], 0.5),
    brightness: 0.85,
    particles: burst(10, VIOLET, 90.0, 900),
};
static FLIRTATIOUS: EmotionProfile = EmotionProfile {
    punch: motion(TWIRL, 700),
    idle: motion(SWAY, 3500),
    glow: glow([255, 120, 170], 0.6),
    brightness: 1.15,
    particles: burst(14, PINK, 110.0, 1600),
};
static HEATED: EmotionProfile = EmotionProfile {
    punch: motion(SURGE, 600),
    idle: motion(BOUNCE, 1200),
    glow: glow([255, 90, 90], 0.8),
    brightness: 1.2,
    particles: burst(16, RED, 130.0, 1300),
};

pub fn profile(emotion: EmotionTag) -> &'static EmotionProfile {
    match emotion {
        EmotionTag::Neutral => &NEUTRAL,
        EmotionTag::Joy => &JOY,
        EmotionTag::Sad => &SAD,
        EmotionTag::Angry => &ANGRY,
        EmotionTag::Shy => &SHY,
        EmotionTag::Surprise => &SURPRISE,
        EmotionTag::Panic => &PANIC,
        EmotionTag::Relax => &RELAX,
        EmotionTag::Disgust => &DISGUST,
        EmotionTag::Frightened => &FRIGHTENED,
        EmotionTag::Flirtatious => &FLIRTATIOUS,
        EmotionTag::Heated => &HEATED,
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationPhase {
    Punching { elapsed_ms: u32 },
    SettlingToIdle { elapsed_ms: u32, from: Pose },
    Idling { elapsed_ms: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    PunchStarted { emotion: EmotionTag, chain: u64 },
    /// A newer emotion arrived before the punch finished
    PunchCancelled { emotion: EmotionTag, chain: u64 },
    SettleStarted { emotion: EmotionTag },
    IdleEntered { emotion: EmotionTag },
}

pub struct EmotionAnimationController {
    emotion: EmotionTag,
    phase: AnimationPhase,
    /// Bumped on every switch; identifies the running punch chain
    chain: u64,
    settle_ms: u32,
    punches: u32,
    burst: Option<ParticleBurst>,
    rng: StdRng,
    events: Vec<AnimationEvent>,
}

impl EmotionAnimationController {
    /// Starts idling in NEUTRAL with no punch
    pub fn new(config: &AnimationConfig) -> Self {
        let rng = match config.particle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            emotion: EmotionTag::Neutral,
            phase: AnimationPhase::Idling { elapsed_ms: 0 },
            chain: 0,
            settle_ms: config.settle_ms,
            punches: 0,
            burst: None,
            rng,
            events: Vec::new(),
        }
    }

    /// Switch emotion. Same emotion is a no-op (the idle loop keeps running).
    pub fn set_emotion(&mut self, emotion: EmotionTag) {
        if emotion == self.emotion {
            return;
        }
        if let AnimationPhase::Punching { .. } = self.phase {
            tracing::debug!("Punch for {} (chain {}) cancelled", self.emotion, self.chain);
            self.events.push(AnimationEvent::PunchCancelled {
                emotion: self.emotion,
                chain: self.chain,
            });
        }

        self.chain += 1;
        self.emotion = emotion;
        self.phase = AnimationPhase::Punching { elapsed_ms: 0 };
        self.punches += 1;

        let spec = profile(emotion).particles;
        self.burst = Some(ParticleBurst::generate(emotion, &spec, &mut self.rng));

        tracing::debug!("Emotion -> {} (chain {})", emotion, self.chain);
        self.events.push(AnimationEvent::PunchStarted {
            emotion,
            chain: self.chain,
        });
    }

    /// Advance the chain and the particle burst
    pub fn update(&mut self, dt_ms: u32) -> Vec<AnimationEvent> {
        if let Some(burst) = self.burst.as_mut() {
            burst.advance(dt_ms);
            if burst.is_expired() {
                self.burst = None;
            }
        }

        let profile = profile(self.emotion);
        let mut remaining = dt_ms;
        loop {
            match self.phase {
                AnimationPhase::Punching { elapsed_ms } => {
                    let elapsed = elapsed_ms.saturating_add(remaining);
                    if elapsed < profile.punch.duration_ms {
                        self.phase = AnimationPhase::Punching { elapsed_ms: elapsed };
                        break;
                    }
                    remaining = elapsed - profile.punch.duration_ms;
                    self.phase = AnimationPhase::SettlingToIdle {
                        elapsed_ms: 0,
                        from: profile.punch.sample(profile.punch.duration_ms),
                    };
                    self.events.push(AnimationEvent::SettleStarted {
                        emotion: self.emotion,
                    });
                }
                AnimationPhase::SettlingToIdle { elapsed_ms, from } => {
                    let elapsed = elapsed_ms.saturating_add(remaining);
                    if elapsed < self.settle_ms {
                        self.phase = AnimationPhase::SettlingToIdle {
                            elapsed_ms: elapsed,
                            from,
                        };
                        break;
                    }
                    remaining = elapsed - self.settle_ms;
                    self.phase = AnimationPhase::Idling { elapsed_ms: 0 };
                    self.events.push(AnimationEvent::IdleEntered {
                        emotion: self.emotion,
                    });
                }
                AnimationPhase::Idling { elapsed_ms } => {
                    let period = profile.idle.duration_ms.max(1);
                    self.phase = AnimationPhase::Idling {
                        elapsed_ms: (elapsed_ms % period).saturating_add(remaining % period) % period,
                    };
                    break;
                }
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Current sprite transform
    pub fn pose(&self) -> Pose {
        let profile = profile(self.emotion);
        match self.phase {
            AnimationPhase::Punching { elapsed_ms } => profile.punch.sample(elapsed_ms),
            AnimationPhase::SettlingToIdle { elapsed_ms, from } => {
                from.lerp(&Pose::REST, elapsed_ms as f32 / self.settle_ms.max(1) as f32)
            }
            AnimationPhase::Idling { elapsed_ms } => profile.idle.sample_looped(elapsed_ms),
        }
    }

    pub fn emotion(&self) -> EmotionTag {
        self.emotion
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn glow(&self) -> Glow {
        profile(self.emotion).glow
    }

    pub fn brightness(&self) -> f32 {
        profile(self.emotion).brightness
    }

    /// Punches started since construction
    pub fn punch_count(&self) -> u32 {
        self.punches
    }

    pub fn burst(&self) -> Option<&ParticleBurst> {
        self.burst.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> EmotionAnimationController {
        EmotionAnimationController::new(&AnimationConfig {
            settle_ms: 150,
            particle_seed: Some(42),
        })
    }

    #[test]
    fn starts_idle_in_neutral() {
        let anim = controller();
        assert_eq!(anim.emotion(), EmotionTag::Neutral);
        assert_eq!(anim.phase(), AnimationPhase::Idling { elapsed_ms: 0 });
        assert_eq!(anim.punch_count(), 0);
        assert!(anim.burst().is_none());
    }

    #[test]
    fn repeated_emotion_does_not_punch() {
        let mut anim = controller();
        for emotion in [EmotionTag::Neutral, EmotionTag::Joy, EmotionTag::Joy, EmotionTag::Sad] {
            anim.set_emotion(emotion);
            anim.update(2000);
        }
        assert_eq!(anim.punch_count(), 2);
    }

    #[test]
    fn punch_then_settle_then_idle() {
        let mut anim = controller();
        anim.set_emotion(EmotionTag::Joy);
        let events = anim.update(100);
        assert_eq!(
            events,
            vec![AnimationEvent::PunchStarted {
                emotion: EmotionTag::Joy,
                chain: 1
            }]
        );

        let events = anim.update(500);
        assert_eq!(events, vec![AnimationEvent::SettleStarted { emotion: EmotionTag::Joy }]);
        assert!(matches!(anim.phase(), AnimationPhase::SettlingToIdle { elapsed_ms: 0, .. }));

        let events = anim.update(150);
        assert_eq!(events, vec![AnimationEvent::IdleEntered { emotion: EmotionTag::Joy }]);
        assert_eq!(anim.pose(), Pose::REST);
    }

    #[test]
    fn large_step_runs_whole_chain() {
        let mut anim = controller();
        anim.set_emotion(EmotionTag::Angry);
        let events = anim.update(5000);
        assert_eq!(events.len(), 3);
        assert!(matches!(anim.phase(), AnimationPhase::Idling { .. }));
    }

    #[test]
    fn new_emotion_cancels_running_punch() {
        let mut anim = controller();
        anim.set_emotion(EmotionTag::Joy);
        anim.update(200);
        anim.set_emotion(EmotionTag::Sad);
        let events = anim.update(0);
        assert_eq!(
            events,
            vec![
                AnimationEvent::PunchCancelled {
                    emotion: EmotionTag::Joy,
                    chain: 1
                },
                AnimationEvent::PunchStarted {
                    emotion: EmotionTag::Sad,
                    chain: 2
                },
            ]
        );
        assert_eq!(anim.phase(), AnimationPhase::Punching { elapsed_ms: 0 });
    }

    #[test]
    fn punch_pose_follows_keyframes() {
        let mut anim = controller();
        anim.set_emotion(EmotionTag::Joy);
        anim.update(150); // quarter of the hop: top of the first jump
        let pose = anim.pose();
        assert!((pose.offset_y + 30.0).abs() < 1e-3, "got {:?}", pose);
    }

    #[test]
    fn every_change_regenerates_burst() {
        let mut anim = controller();
        anim.set_emotion(EmotionTag::Joy);
        assert_eq!(anim.burst().map(|b| b.particles.len()), Some(16));
        anim.set_emotion(EmotionTag::Sad);
        let burst = anim.burst().unwrap();
        assert_eq!(burst.emotion, EmotionTag::Sad);
        assert_eq!(burst.particles.len(), 8);

        anim.update(1800);
        assert!(anim.burst().is_none());
    }

    #[test]
    fn glow_and_brightness_follow_emotion() {
        let mut anim = controller();
        anim.set_emotion(EmotionTag::Sad);
        assert!(anim.brightness() < 1.0);
        assert_eq!(anim.glow().color, [90, 120, 200]);
    }

    #[test]
    fn every_emotion_has_a_usable_profile() {
        for emotion in EmotionTag::ALL {
            let p = profile(emotion);
            assert!(p.punch.duration_ms > 0, "{}", emotion);
            assert!(p.idle.duration_ms > 0, "{}", emotion);
            assert!(p.particles.count > 0, "{}", emotion);
            assert!(!p.particles.palette.is_empty(), "{}", emotion);
        }
    }

    #[test]
    fn idle_loops() {
        let anim_pose = |ms| profile(EmotionTag::Neutral).idle.sample_looped(ms);
        assert_eq!(anim_pose(0), anim_pose(6000));
        assert!((anim_pose(3000).offset_y + 8.0).abs() < 1e-3);
    }
}
