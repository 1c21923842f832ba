//! Audio output backends
//!
//! The mixer only talks to `AudioOutput` / `AudioSource`. Production uses
//! rodio (one `Sink` per source); when no device is available the player
//! falls back to `SilentOutput`, which refuses every source so the mixer ends
//! up in its regular "not playing" state.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use thiserror::Error;

use crate::assets;

#[derive(Error, Debug)]
pub enum SoundError {
    #[error("Sound not found: {0}")]
    NotFound(String),

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Playback refused: {0}")]
    Playback(String),

    #[error("No audio output: {0}")]
    NoDevice(String),
}

impl SoundError {
    /// Nothing to play on; reported once when the output was opened
    pub fn is_no_device(&self) -> bool {
        matches!(self, SoundError::NoDevice(_))
    }
}

pub type Result<T> = std::result::Result<T, SoundError>;

/// One loaded sound. Sources are created paused at their initial volume.
pub trait AudioSource {
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    /// Stop and release the underlying stream
    fn stop(&mut self);
    /// Non-looping sources report true once they ran to completion
    fn is_finished(&self) -> bool;
}

pub trait AudioOutput {
    /// Load the sound named `key` (file stem under `sounds/`)
    fn open(&mut self, key: &str, looping: bool) -> Result<Box<dyn AudioSource>>;
}

// ---------------------------------------------------------------------------
// rodio
// ---------------------------------------------------------------------------

/// rodio output stream plus the directory sound files are read from
pub struct RodioOutput {
    /// Must be kept alive for as long as any sink plays
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sound_dir: PathBuf,
}

impl RodioOutput {
    /// Open the default device. Returns None if no audio device is available.
    pub fn new(sound_dir: PathBuf) -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => {
                tracing::info!("Audio output initialized (sounds from {})", sound_dir.display());
                Some(Self {
                    _stream: stream,
                    handle,
                    sound_dir,
                })
            }
            Err(e) => {
                tracing::warn!("Failed to initialize audio: {}", e);
                None
            }
        }
    }
}

impl AudioOutput for RodioOutput {
    fn open(&mut self, key: &str, looping: bool) -> Result<Box<dyn AudioSource>> {
        let path = self.sound_dir.join(assets::sound_file_name(key));
        let file = File::open(&path).map_err(|_| SoundError::NotFound(path.display().to_string()))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| SoundError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let sink = Sink::try_new(&self.handle).map_err(|e| SoundError::Playback(e.to_string()))?;
        sink.pause();
        sink.set_volume(0.0);
        if looping {
            sink.append(decoder.repeat_infinite());
        } else {
            sink.append(decoder);
        }
        tracing::debug!("Opened '{}' (loop={})", path.display(), looping);
        Ok(Box::new(RodioSource { sink, volume: 0.0 }))
    }
}

struct RodioSource {
    sink: Sink,
    volume: f32,
}

impl AudioSource for RodioSource {
    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn play(&mut self) -> Result<()> {
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

// ---------------------------------------------------------------------------
// No device
// ---------------------------------------------------------------------------

/// Used when no audio device could be opened
#[derive(Debug, Default)]
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn open(&mut self, key: &str, _looping: bool) -> Result<Box<dyn AudioSource>> {
        Err(SoundError::NoDevice(key.to_string()))
    }
}


// ---------------------------------------------------------------------------
// Test backend
// ---------------------------------------------------------------------------
