//! Presentation logic
//!
//!   dialog:       scene queue and typewriter reveal
//!   emotion:      punch / settle / idle animation per emotion
//!   particles:    cosmetic bursts on emotion changes
//!   presentation: facade tying scenes, animation, audio and assets together
//!   script:       recorded session scripts for headless playback
//!   stats:        affection / energy and what actions cost

pub mod dialog;
pub mod emotion;
pub mod particles;
pub mod presentation;
pub mod script;
pub mod stats;
