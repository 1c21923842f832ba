//! Sound engine: three-layer mixer
//!
//!   Music:    one looping track per `BgmMode`, switched by fading the old
//!             track out completely before the new one is even opened
//!   Ambience: zero or more loops per (location, time), swapped with
//!             overlapping fades
//!   Effects:  one-shots on arriving at a new location, no fades
//!
//! Everything advances in `update(dt_ms)`; nothing here blocks.

use novella_common::{AudioConfig, TimeOfDay, WorldState};

use super::fade::{Fade, FadeDirection};
use super::output::{AudioOutput, AudioSource, SoundError};
use crate::assets::sound::{ambience_for, effect_for};

/// A loaded source plus the ramp currently applied to it
struct Channel {
    key: String,
    source: Box<dyn AudioSource>,
    fade: Option<Fade>,
    playing: bool,
}

impl Channel {
    /// Step the ramp. Returns true once a fade-out has fully completed.
    fn advance(&mut self, dt_ms: u32) -> bool {
        let Some(fade) = self.fade.as_mut() else {
            return false;
        };
        if let Some(volume) = fade.advance(dt_ms) {
            self.source.set_volume(volume);
        }
        if !fade.is_finished() {
            return false;
        }
        let faded_out = fade.direction() == FadeDirection::Out;
        if faded_out {
            // Silent now; pause, then put the volume back for reuse
            let restore = fade.peak();
            self.source.pause();
            self.source.set_volume(restore);
            self.playing = false;
        }
        self.fade = None;
        faded_out
    }

    fn fade_in(&mut self, target: f32, duration_ms: u32, steps: u32) {
        self.source.set_volume(0.0);
        self.fade = Some(Fade::fade_in(target, duration_ms, steps));
    }

    fn begin_fade_out(&mut self, duration_ms: u32, steps: u32) {
        if self.is_fading_out() {
            return;
        }
        self.fade = Some(Fade::fade_out(self.source.volume(), duration_ms, steps));
    }

    fn is_fading_out(&self) -> bool {
        self.fade.as_ref().map(|f| f.direction()) == Some(FadeDirection::Out)
    }

    /// New level from the volume settings. A running fade keeps its
    /// progress; a fade-out is capped at the new level.
    fn retarget(&mut self, target: f32) {
        match self.fade.as_mut() {
            Some(fade) => {
                fade.retarget(target);
                self.source.set_volume(fade.volume());
            }
            None => self.source.set_volume(target),
        }
    }

    fn release(&mut self) {
        if let Some(fade) = self.fade.as_mut() {
            fade.cancel();
        }
        self.fade = None;
        self.source.pause();
        self.source.stop();
        self.playing = false;
    }
}

/// A missing device was already logged at startup; anything else is news
fn report_unavailable(layer: &str, key: &str, err: &SoundError) {
    if err.is_no_device() {
        tracing::debug!("{} '{}' skipped: {}", layer, key, err);
    } else {
        tracing::warn!("{} '{}' unavailable: {}", layer, key, err);
    }
}

/// Snapshot of one fading layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerState {
    /// Sound keys currently owned by the layer (fading-out sources excluded)
    pub active: Vec<String>,
    pub volume: f32,
    pub target: f32,
    pub fading: Option<FadeDirection>,
}

/// What the chrome needs to know about audio
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioState {
    pub music: LayerState,
    /// Track waiting for the current one to fade out
    pub pending_music: Option<String>,
    /// False when the track could not start (device, autoplay) or is toggled off
    pub music_playing: bool,
    pub music_enabled: bool,
    pub ambience: LayerState,
    pub effects_playing: usize,
    pub effects_fired: u32,
    pub master_volume: f32,
    pub muted: bool,
}

/// Central sound engine, owns every playing source
pub struct AudioMixer {
    output: Box<dyn AudioOutput>,
    config: AudioConfig,
    master_volume: f32,
    muted: bool,

    music: Option<Channel>,
    pending_music: Option<String>,
    /// Last requested track key (to avoid restarting the same track)
    requested_music: Option<String>,
    music_enabled: bool,

    ambience: Vec<Channel>,
    ambience_fading: Vec<Channel>,
    ambience_key: String,

    /// One-shots, kept only until they finish
    effects: Vec<Box<dyn AudioSource>>,
    last_location: Option<String>,
    effects_fired: u32,

    released: bool,
}

impl AudioMixer {
    pub fn new(output: Box<dyn AudioOutput>, config: AudioConfig) -> Self {
        Self {
            output,
            master_volume: config.master_volume.clamp(0.0, 1.0),
            muted: config.muted,
            config,
            music: None,
            pending_music: None,
            requested_music: None,
            music_enabled: true,
            ambience: Vec::new(),
            ambience_fading: Vec::new(),
            ambience_key: String::new(),
            effects: Vec::new(),
            last_location: None,
            effects_fired: 0,
            released: false,
        }
    }

    fn level(&self, ratio: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * ratio).clamp(0.0, 1.0)
        }
    }

    fn music_target(&self) -> f32 {
        self.level(self.config.bgm_ratio)
    }

    fn ambience_target(&self) -> f32 {
        self.level(self.config.ambience_ratio)
    }

    fn effect_target(&self) -> f32 {
        self.level(self.config.sfx_ratio)
    }

    /// React to a new world descriptor: music theme, ambience, arrival effect
    pub fn apply_world(&mut self, world: &WorldState) {
        if let Some(mode) = world.bgm_mode {
            self.set_music(mode.sound_key());
        }
        let location = world.location.as_ref().map(|l| l.as_str());
        self.set_ambience(location, world.time_of_day);
        self.observe_location(location);
    }

    /// Switch the music track. Same key as last requested is a no-op.
    pub fn set_music(&mut self, key: &str) {
        if self.released || self.requested_music.as_deref() == Some(key) {
            return;
        }
        self.requested_music = Some(key.to_string());

        match self.music.as_ref().map(|ch| ch.playing) {
            None => self.start_music(key),
            Some(false) => {
                // Never audible (refused or toggled off), nothing to fade
                if let Some(mut old) = self.music.take() {
                    old.release();
                }
                self.start_music(key);
            }
            Some(true) => {
                let (duration, steps) = (self.config.bgm_fade_ms, self.config.fade_steps);
                if let Some(ch) = self.music.as_mut() {
                    tracing::debug!("Music: fading out '{}' for '{}'", ch.key, key);
                    ch.begin_fade_out(duration, steps);
                }
                self.pending_music = Some(key.to_string());
            }
        }
    }

    fn start_music(&mut self, key: &str) {
        self.pending_music = None;
        let mut source = match self.output.open(key, true) {
            Ok(source) => source,
            Err(e) => {
                report_unavailable("Music", key, &e);
                self.music = None;
                return;
            }
        };
        source.set_volume(0.0);
        let mut ch = Channel {
            key: key.to_string(),
            source,
            fade: None,
            playing: false,
        };
        if self.music_enabled {
            match ch.source.play() {
                Ok(()) => {
                    ch.playing = true;
                    ch.fade_in(self.music_target(), self.config.bgm_fade_ms, self.config.fade_steps);
                    tracing::debug!("Music: fading in '{}'", key);
                }
                Err(e) => tracing::warn!("Music '{}' did not start: {}", key, e),
            }
        }
        self.music = Some(ch);
    }

    /// Switch ambience loops for a place. `None` location keeps what plays.
    pub fn set_ambience(&mut self, location: Option<&str>, time: Option<TimeOfDay>) {
        let Some(location) = location else {
            return;
        };
        if self.released {
            return;
        }
        let keys = ambience_for(location, time);
        let joined = keys.join("|");
        if joined == self.ambience_key {
            return;
        }
        tracing::debug!("Ambience: '{}' -> '{}'", self.ambience_key, joined);
        self.ambience_key = joined;

        for mut ch in self.ambience.drain(..) {
            if ch.playing {
                ch.begin_fade_out(self.config.ambience_fade_out_ms, self.config.fade_steps);
                self.ambience_fading.push(ch);
            } else {
                ch.release();
            }
        }

        let target = self.ambience_target();
        for key in keys {
            let mut source = match self.output.open(key, true) {
                Ok(source) => source,
                Err(e) => {
                    report_unavailable("Ambience", key, &e);
                    continue;
                }
            };
            source.set_volume(0.0);
            let mut ch = Channel {
                key: key.to_string(),
                source,
                fade: None,
                playing: false,
            };
            match ch.source.play() {
                Ok(()) => {
                    ch.playing = true;
                    ch.fade_in(target, self.config.ambience_fade_in_ms, self.config.fade_steps);
                }
                Err(e) => tracing::warn!("Ambience '{}' did not start: {}", key, e),
            }
            self.ambience.push(ch);
        }
    }

    /// Fire the arrival effect when the location differs from the last one seen
    pub fn observe_location(&mut self, location: Option<&str>) {
        let Some(location) = location else {
            return;
        };
        if self.released || self.last_location.as_deref() == Some(location) {
            return;
        }
        self.last_location = Some(location.to_string());

        let Some(key) = effect_for(location) else {
            return;
        };
        match self.output.open(key, false) {
            Ok(mut source) => {
                source.set_volume(self.effect_target());
                match source.play() {
                    Ok(()) => {
                        tracing::debug!("Effect '{}' for {}", key, location);
                        self.effects_fired += 1;
                        self.effects.push(source);
                    }
                    Err(e) => tracing::warn!("Effect '{}' did not start: {}", key, e),
                }
            }
            Err(e) => report_unavailable("Effect", key, &e),
        }
    }

    /// Apply master volume / mute to every layer right away
    pub fn set_master_volume(&mut self, volume: f32, muted: bool) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.muted = muted;

        let music = self.music_target();
        if let Some(ch) = self.music.as_mut() {
            ch.retarget(music);
        }
        let ambience = self.ambience_target();
        for ch in self.ambience.iter_mut().chain(self.ambience_fading.iter_mut()) {
            ch.retarget(ambience);
        }
        let effect = self.effect_target();
        for source in &mut self.effects {
            source.set_volume(effect);
        }
    }

    /// User music toggle. Returns whether music is audible afterwards.
    /// Turning it on retries a refused start exactly once.
    pub fn toggle_music(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.music_enabled = !self.music_enabled;

        if self.music_enabled {
            let target = self.music_target();
            let (duration, steps) = (self.config.bgm_fade_ms, self.config.fade_steps);
            match self.music.as_mut() {
                Some(ch) => match ch.source.play() {
                    Ok(()) => {
                        ch.playing = true;
                        ch.fade_in(target, duration, steps);
                    }
                    Err(e) => tracing::warn!("Music '{}' still refused: {}", ch.key, e),
                },
                None => {
                    if let Some(key) = self.requested_music.clone() {
                        self.start_music(&key);
                    }
                }
            }
        } else if let Some(mut ch) = self.music.take() {
            if ch.is_fading_out() {
                ch.release();
                if let Some(next) = self.pending_music.take() {
                    self.start_music(&next);
                }
            } else {
                ch.fade = None;
                ch.source.pause();
                ch.playing = false;
                self.music = Some(ch);
            }
        }

        let playing = self.music.as_ref().map(|c| c.playing).unwrap_or(false);
        tracing::debug!("Music toggled: enabled={} playing={}", self.music_enabled, playing);
        playing
    }

    /// Advance all fades and drop finished one-shots
    pub fn update(&mut self, dt_ms: u32) {
        if self.released {
            return;
        }

        let music_done = self.music.as_mut().map(|ch| ch.advance(dt_ms)).unwrap_or(false);
        if music_done {
            if let Some(mut old) = self.music.take() {
                tracing::debug!("Music '{}' faded out", old.key);
                old.release();
            }
            if let Some(next) = self.pending_music.take() {
                self.start_music(&next);
            }
        }

        for ch in &mut self.ambience {
            ch.advance(dt_ms);
        }
        self.ambience_fading.retain_mut(|ch| {
            if ch.advance(dt_ms) {
                ch.release();
                false
            } else {
                true
            }
        });

        self.effects.retain(|source| !source.is_finished());
    }

    /// Pause and release every source. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(mut ch) = self.music.take() {
            ch.release();
        }
        self.pending_music = None;
        for mut ch in self.ambience.drain(..).chain(self.ambience_fading.drain(..)) {
            ch.release();
        }
        for mut source in self.effects.drain(..) {
            source.pause();
            source.stop();
        }
        tracing::info!("Audio released");
    }

    pub fn state(&self) -> AudioState {
        let music = match &self.music {
            Some(ch) => LayerState {
                active: vec![ch.key.clone()],
                volume: ch.source.volume(),
                target: self.music_target(),
                fading: ch.fade.as_ref().map(|f| f.direction()),
            },
            None => LayerState {
                target: self.music_target(),
                ..Default::default()
            },
        };
        let ambience = LayerState {
            active: self.ambience.iter().map(|c| c.key.clone()).collect(),
            volume: self.ambience.first().map(|c| c.source.volume()).unwrap_or(0.0),
            target: self.ambience_target(),
            fading: self
                .ambience
                .iter()
                .chain(self.ambience_fading.iter())
                .find_map(|c| c.fade.as_ref().map(|f| f.direction())),
        };
        AudioState {
            music,
            pending_music: self.pending_music.clone(),
            music_playing: self.music.as_ref().map(|c| c.playing).unwrap_or(false),
            music_enabled: self.music_enabled,
            ambience,
            effects_playing: self.effects.len(),
            effects_fired: self.effects_fired,
            master_volume: self.master_volume,
            muted: self.muted,
        }
    }
}

impl Drop for AudioMixer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::output::testing::{Call, Log, RecordingOutput};
    use crate::engine::output::SilentOutput;
    use novella_common::BgmMode;

    fn loud() -> AudioConfig {
        AudioConfig {
            master_volume: 1.0,
            ..AudioConfig::default()
        }
    }

    fn mixer() -> (AudioMixer, Log) {
        let (out, log) = RecordingOutput::new();
        (AudioMixer::new(Box::new(out), loud()), log)
    }

    fn opened(log: &Log) -> Vec<String> {
        log.borrow().iter().map(|s| s.borrow().key.clone()).collect()
    }

    fn volume_of(log: &Log, index: usize) -> f32 {
        log.borrow()[index].borrow().volume
    }

    #[test]
    fn first_track_fades_in_to_music_level() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        assert_eq!(opened(&log), vec!["bgm_lobby"]);
        assert_eq!(volume_of(&log, 0), 0.0);
        assert!(log.borrow()[0].borrow().looping);

        mix.update(750);
        assert!((volume_of(&log, 0) - 0.225).abs() < 1e-4);
        mix.update(750);
        assert_eq!(volume_of(&log, 0), 0.45);
        assert!(mix.state().music_playing);
    }

    #[test]
    fn crossfade_is_sequential() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.update(1500);

        mix.set_music("bgm_tense");
        assert_eq!(mix.state().pending_music.as_deref(), Some("bgm_tense"));

        mix.update(750);
        let half = volume_of(&log, 0);
        assert!((half - 0.225).abs() <= 0.45 / 20.0 + 1e-4, "got {}", half);
        // New track not even opened while the old one is audible
        assert_eq!(opened(&log), vec!["bgm_lobby"]);

        mix.update(750);
        {
            let entries = log.borrow();
            let old = entries[0].borrow();
            let tail = &old.calls[old.calls.len() - 5..];
            assert_eq!(
                tail,
                &[Call::Volume(0.0), Call::Pause, Call::Volume(0.45), Call::Pause, Call::Stop]
            );
            assert!(old.stopped);
            assert!(!old.playing);
        }
        assert_eq!(opened(&log), vec!["bgm_lobby", "bgm_tense"]);
        assert_eq!(volume_of(&log, 1), 0.0);

        mix.update(1500);
        assert_eq!(volume_of(&log, 1), 0.45);
    }

    #[test]
    fn same_mode_twice_is_ignored() {
        let (mut mix, log) = mixer();
        let world = WorldState::default().with_bgm(BgmMode::Romantic);
        mix.apply_world(&world);
        mix.update(500);
        mix.apply_world(&world);
        mix.update(2000);
        assert_eq!(opened(&log), vec!["bgm_romantic"]);
    }

    #[test]
    fn latest_request_wins_during_fade_out() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.update(1500);
        mix.set_music("bgm_daily");
        mix.update(300);
        mix.set_music("bgm_tense");
        mix.update(1500);
        assert_eq!(opened(&log), vec!["bgm_lobby", "bgm_tense"]);
    }

    #[test]
    fn change_during_fade_in_fades_out_from_current_level() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.update(750);
        mix.set_music("bgm_daily");
        assert_eq!(mix.state().music.fading, Some(FadeDirection::Out));
        mix.update(750);
        assert!(volume_of(&log, 0) < 0.225);
        mix.update(750);
        assert_eq!(opened(&log), vec!["bgm_lobby", "bgm_daily"]);
    }

    #[test]
    fn ambience_swaps_whole_set() {
        let (mut mix, log) = mixer();
        mix.set_ambience(Some("GARDEN"), Some(TimeOfDay::Night));
        assert_eq!(opened(&log), vec!["amb_crickets", "amb_owl"]);
        mix.update(1000);
        assert_eq!(volume_of(&log, 0), 0.25);
        assert_eq!(volume_of(&log, 1), 0.25);

        mix.set_ambience(Some("BEACH"), Some(TimeOfDay::Night));
        assert_eq!(opened(&log), vec!["amb_crickets", "amb_owl", "amb_beach"]);
        assert_eq!(mix.state().ambience.active, vec!["amb_beach"]);

        mix.update(800);
        assert!(log.borrow()[0].borrow().stopped);
        assert!(log.borrow()[1].borrow().stopped);
        mix.update(200);
        assert_eq!(volume_of(&log, 2), 0.25);
    }

    #[test]
    fn same_ambience_key_does_not_restart() {
        let (mut mix, log) = mixer();
        mix.set_ambience(Some("BALCONY"), Some(TimeOfDay::Night));
        mix.set_ambience(Some("GARDEN"), Some(TimeOfDay::Night));
        assert_eq!(opened(&log).len(), 2);
        mix.set_ambience(None, None);
        assert_eq!(mix.state().ambience.active.len(), 2);
    }

    #[test]
    fn effect_fires_once_per_distinct_location() {
        let (mut mix, log) = mixer();
        for place in ["BAR", "BAR", "BEACH", "BEACH", "BAR"] {
            mix.observe_location(Some(place));
        }
        assert_eq!(opened(&log), vec!["sfx_door_open", "sfx_seagull", "sfx_door_open"]);
        assert_eq!(mix.state().effects_fired, 3);
        assert!((volume_of(&log, 0) - 0.6).abs() < 1e-6);
        assert!(!log.borrow()[0].borrow().looping);
    }

    #[test]
    fn location_without_effect_still_counts_as_visited() {
        let (mut mix, log) = mixer();
        mix.observe_location(Some("BAR"));
        mix.observe_location(Some("GARDEN"));
        mix.observe_location(Some("BAR"));
        assert_eq!(opened(&log).len(), 2);
    }

    #[test]
    fn finished_effects_are_dropped() {
        let (mut mix, log) = mixer();
        mix.observe_location(Some("BEACH"));
        assert_eq!(mix.state().effects_playing, 1);
        log.borrow()[0].borrow_mut().finished = true;
        mix.update(16);
        assert_eq!(mix.state().effects_playing, 0);
    }

    #[test]
    fn master_volume_retargets_running_fade() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.update(750); // 10 of 20 steps
        mix.set_master_volume(0.5, false);
        assert!((volume_of(&log, 0) - 0.1125).abs() < 1e-4);
        mix.update(750);
        assert!((volume_of(&log, 0) - 0.225).abs() < 1e-6);
    }

    #[test]
    fn mute_silences_settled_layers_immediately() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.set_ambience(Some("BEACH"), None);
        mix.update(2000);
        mix.set_master_volume(1.0, true);
        assert_eq!(volume_of(&log, 0), 0.0);
        assert_eq!(volume_of(&log, 1), 0.0);
        assert!(mix.state().muted);

        mix.set_master_volume(0.8, false);
        assert!((volume_of(&log, 0) - 0.36).abs() < 1e-6);
    }

    #[test]
    fn mute_silences_music_fading_out() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.update(1500);
        mix.set_music("bgm_tense");
        mix.update(150);
        assert!(volume_of(&log, 0) > 0.3);

        mix.set_master_volume(1.0, true);
        assert_eq!(volume_of(&log, 0), 0.0);
        assert_eq!(mix.state().music.fading, Some(FadeDirection::Out));

        // The crossfade still completes and the next track comes in silent
        mix.update(1350);
        assert!(log.borrow()[0].borrow().stopped);
        assert_eq!(opened(&log), vec!["bgm_lobby", "bgm_tense"]);
        mix.update(1500);
        assert_eq!(volume_of(&log, 1), 0.0);
    }

    #[test]
    fn mute_silences_ambience_fading_out() {
        let (mut mix, log) = mixer();
        mix.set_ambience(Some("BEACH"), Some(TimeOfDay::Day));
        mix.update(1000);
        mix.set_ambience(Some("BAR"), Some(TimeOfDay::Night));
        mix.update(120);
        assert!(volume_of(&log, 0) > 0.15);

        mix.set_master_volume(1.0, true);
        for entry in log.borrow().iter() {
            assert_eq!(entry.borrow().volume, 0.0, "{} still audible", entry.borrow().key);
        }
        mix.update(800);
        assert!(log.borrow()[0].borrow().stopped);
    }

    #[test]
    fn lower_volume_caps_fade_out_level() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.update(1500);
        mix.set_music("bgm_daily");
        mix.set_master_volume(0.5, false);
        assert!(volume_of(&log, 0) <= 0.225 + 1e-6);
        mix.set_master_volume(1.0, false);
        assert!(volume_of(&log, 0) <= 0.225 + 1e-6);
    }

    #[test]
    fn refused_autoplay_is_not_playing_and_not_retried() {
        let (mut out, log) = RecordingOutput::new();
        out.refuse_play.insert("bgm_lobby".to_string());
        let mut mix = AudioMixer::new(Box::new(out), loud());
        mix.set_music("bgm_lobby");
        mix.update(5000);
        assert!(!mix.state().music_playing);
        assert_eq!(opened(&log).len(), 1);

        // toggle off then on: one user-driven retry, still refused
        assert!(!mix.toggle_music());
        assert!(!mix.toggle_music());
        assert_eq!(opened(&log).len(), 1);
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_daily");
        mix.update(1500);
        assert!(!mix.toggle_music());
        assert!(!log.borrow()[0].borrow().playing);
        assert!(mix.toggle_music());
        mix.update(1500);
        assert!(log.borrow()[0].borrow().playing);
        assert_eq!(volume_of(&log, 0), 0.45);
    }

    #[test]
    fn missing_track_leaves_music_silent() {
        let (mut out, log) = RecordingOutput::new();
        out.missing.insert("bgm_tense".to_string());
        let mut mix = AudioMixer::new(Box::new(out), loud());
        mix.set_music("bgm_tense");
        assert!(opened(&log).is_empty());
        assert!(!mix.state().music_playing);
    }

    #[test]
    fn no_device_leaves_every_layer_silent() {
        let mut mix = AudioMixer::new(Box::new(SilentOutput), loud());
        for place in ["BAR", "BEACH", "GARDEN"] {
            mix.apply_world(&WorldState::at(place, TimeOfDay::Night).with_bgm(BgmMode::Lobby));
            mix.update(100);
        }
        let state = mix.state();
        assert!(!state.music_playing);
        assert!(state.ambience.active.is_empty());
        assert_eq!(state.effects_fired, 0);
        assert!(!mix.toggle_music());
    }

    #[test]
    fn teardown_releases_everything_once() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        mix.set_ambience(Some("GARDEN"), Some(TimeOfDay::Night));
        mix.observe_location(Some("BAR"));
        mix.teardown();
        mix.teardown();
        for entry in log.borrow().iter() {
            let s = entry.borrow();
            assert!(s.stopped, "{} still alive", s.key);
            assert_eq!(s.calls.iter().filter(|c| **c == Call::Stop).count(), 1);
        }
        mix.set_music("bgm_tense");
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn drop_releases_sources() {
        let (mut mix, log) = mixer();
        mix.set_music("bgm_lobby");
        drop(mix);
        assert!(log.borrow()[0].borrow().stopped);
    }
}
