//! Decorative particle bursts shown on emotion changes
//!
//! Purely cosmetic: a burst is generated, flies outward, and expires.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::Rng;

use novella_common::EmotionTag;

/// Burst parameters for one emotion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub count: u32,
    pub palette: &'static [[u8; 3]],
    /// Nominal travel distance in pixels
    pub distance: f32,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Direction of travel (radians)
    pub angle: f32,
    pub distance: f32,
    pub delay_ms: u32,
    pub size: f32,
    pub color: [u8; 3],
}

impl Particle {
    /// Offset from the burst origin and opacity at `elapsed_ms`
    pub fn sample(&self, elapsed_ms: u32, duration_ms: u32) -> (f32, f32, f32) {
        let flight = duration_ms.saturating_sub(self.delay_ms).max(1) as f32;
        let t = (elapsed_ms.saturating_sub(self.delay_ms) as f32 / flight).clamp(0.0, 1.0);
        let travelled = self.distance * t;
        (
            self.angle.cos() * travelled,
            self.angle.sin() * travelled,
            1.0 - t,
        )
    }
}

/// One particle as drawn this frame, offset from the character's centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub size: f32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone)]
pub struct ParticleBurst {
    pub emotion: EmotionTag,
    pub particles: Vec<Particle>,
    pub duration_ms: u32,
    elapsed_ms: u32,
}

impl ParticleBurst {
    /// Spread `spec.count` particles evenly around the circle, jittering
    /// direction, distance, delay and size
    pub fn generate(emotion: EmotionTag, spec: &ParticleSpec, rng: &mut StdRng) -> Self {
        let count = spec.count.max(1);
        let max_delay = spec.duration_ms / 4;
        let particles = (0..count)
            .map(|i| {
                let base = i as f32 / count as f32 * TAU;
                let color = if spec.palette.is_empty() {
                    [255, 255, 255]
                } else {
                    spec.palette[rng.gen_range(0..spec.palette.len())]
                };
                Particle {
                    angle: base + rng.gen_range(-0.3..0.3),
                    distance: spec.distance * rng.gen_range(0.7..1.3),
                    delay_ms: rng.gen_range(0..=max_delay),
                    size: rng.gen_range(4.0..10.0),
                    color,
                }
            })
            .collect();

        Self {
            emotion,
            particles,
            duration_ms: spec.duration_ms,
            elapsed_ms: 0,
        }
    }

    pub fn advance(&mut self, dt_ms: u32) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
    }

    /// Where every particle is right now
    pub fn sprites(&self) -> Vec<ParticleSprite> {
        self.particles
            .iter()
            .map(|p| {
                let (x, y, opacity) = p.sample(self.elapsed_ms, self.duration_ms);
                ParticleSprite {
                    x,
                    y,
                    opacity,
                    size: p.size,
                    color: p.color,
                }
            })
            .collect()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const SPARKS: ParticleSpec = ParticleSpec {
        count: 12,
        palette: &[[255, 220, 120], [255, 180, 200]],
        distance: 120.0,
        duration_ms: 1200,
    };

    #[test]
    fn burst_is_jittered_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let burst = ParticleBurst::generate(EmotionTag::Joy, &SPARKS, &mut rng);
        assert_eq!(burst.particles.len(), 12);
        for p in &burst.particles {
            assert!(p.distance >= 84.0 && p.distance <= 156.0);
            assert!(p.delay_ms <= 300);
            assert!(SPARKS.palette.contains(&p.color));
        }
    }

    #[test]
    fn same_seed_same_burst() {
        let a = ParticleBurst::generate(EmotionTag::Sad, &SPARKS, &mut StdRng::seed_from_u64(7));
        let b = ParticleBurst::generate(EmotionTag::Sad, &SPARKS, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn burst_expires_after_duration() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut burst = ParticleBurst::generate(EmotionTag::Joy, &SPARKS, &mut rng);
        burst.advance(1199);
        assert!(!burst.is_expired());
        burst.advance(1);
        assert!(burst.is_expired());
    }

    #[test]
    fn sprites_follow_elapsed_time() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut burst = ParticleBurst::generate(EmotionTag::Joy, &SPARKS, &mut rng);
        let start = burst.sprites();
        assert_eq!(start.len(), 12);
        assert!(start.iter().all(|s| s.x == 0.0 && s.y == 0.0 && s.opacity == 1.0));

        burst.advance(1200);
        assert!(burst.sprites().iter().all(|s| s.opacity == 0.0));
    }

    #[test]
    fn particle_fades_as_it_travels() {
        let p = Particle {
            angle: 0.0,
            distance: 100.0,
            delay_ms: 0,
            size: 5.0,
            color: [0, 0, 0],
        };
        let (x, y, opacity) = p.sample(500, 1000);
        assert!((x - 50.0).abs() < 1e-3);
        assert!(y.abs() < 1e-3);
        assert!((opacity - 0.5).abs() < 1e-6);
        assert_eq!(p.sample(2000, 1000).2, 0.0);
    }
}
