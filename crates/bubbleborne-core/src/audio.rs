//! Sound playback service.
//!
//! Gameplay code requests cues through [`SoundService`]; it never waits for or
//! learns about the outcome. [`AudioPool`] is the reference service: a fixed
//! set of channels, each busy for the length of the clip it plays. When every
//! channel is busy the request is dropped with a warning.
//!
//! # Example
//!
//! ```
//! use bubbleborne_core::audio::{AudioConfig, AudioPool, SoundCue, SoundService};
//!
//! let mut pool = AudioPool::new(&AudioConfig { channels: 1, ..AudioConfig::default() });
//! pool.play(SoundCue::BubblePop);
//! pool.play(SoundCue::BubbleHit); // dropped: no free channel
//! assert_eq!(pool.active_count(), 1);
//!
//! let finished = pool.release_finished(10.0);
//! assert_eq!(finished, vec![SoundCue::BubblePop]);
//! assert_eq!(pool.active_count(), 0);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ensure_positive, ConfigError};

/// Sound effects the simulation can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// A player pushed a bubble.
    BubblePush,
    /// A bubble was hit and shrank.
    BubbleHit,
    /// A bubble started dying.
    BubblePop,
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BubblePush => write!(f, "BubblePush"),
            Self::BubbleHit => write!(f, "BubbleHit"),
            Self::BubblePop => write!(f, "BubblePop"),
        }
    }
}

/// Fire-and-forget sound playback.
pub trait SoundService {
    /// Requests playback of a cue.
    fn play(&mut self, cue: SoundCue);

    /// Advances playback clocks by `dt` seconds.
    fn advance(&mut self, _dt: f32) {}
}

/// A service that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl SoundService for Silence {
    fn play(&mut self, _cue: SoundCue) {}
}

impl<S: SoundService + ?Sized> SoundService for Rc<RefCell<S>> {
    fn play(&mut self, cue: SoundCue) {
        self.borrow_mut().play(cue);
    }

    fn advance(&mut self, dt: f32) {
        self.borrow_mut().advance(dt);
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// One entry of the sound bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    /// Cue this sound answers to.
    pub cue: SoundCue,
    /// Clip length in seconds at pitch 1.
    pub clip_length: f32,
    /// Playback volume in `[0, 1]`.
    pub volume: f32,
    /// Playback pitch in `[0.1, 3]`; higher pitch finishes sooner.
    pub pitch: f32,
}

impl Sound {
    /// A sound at full volume and normal pitch.
    #[must_use]
    pub const fn new(cue: SoundCue, clip_length: f32) -> Self {
        Self {
            cue,
            clip_length,
            volume: 1.0,
            pitch: 1.0,
        }
    }

    fn playback_time(&self) -> f32 {
        self.clip_length / self.pitch
    }
}

/// Channel pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Number of simultaneous channels.
    pub channels: usize,
    /// Sound bank.
    pub sounds: Vec<Sound>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            channels: 10,
            sounds: vec![
                Sound::new(SoundCue::BubblePush, 0.25),
                Sound::new(SoundCue::BubbleHit, 0.35),
                Sound::new(SoundCue::BubblePop, 0.6),
            ],
        }
    }
}

impl AudioConfig {
    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty pool or a sound with
    /// a non-positive length, out-of-range volume or out-of-range pitch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.channels",
                reason: "must be at least 1".to_string(),
            });
        }
        for sound in &self.sounds {
            ensure_positive("audio.sounds.clip_length", sound.clip_length)?;
            if !(0.0..=1.0).contains(&sound.volume) {
                return Err(ConfigError::InvalidValue {
                    field: "audio.sounds.volume",
                    reason: format!("{} volume {} not in [0, 1]", sound.cue, sound.volume),
                });
            }
            if !(0.1..=3.0).contains(&sound.pitch) {
                return Err(ConfigError::InvalidValue {
                    field: "audio.sounds.pitch",
                    reason: format!("{} pitch {} not in [0.1, 3]", sound.cue, sound.pitch),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Pool
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Playback {
    cue: SoundCue,
    remaining: f32,
    volume: f32,
}

/// Fixed-size channel pool.
#[derive(Debug, Clone)]
pub struct AudioPool {
    channels: Vec<Option<Playback>>,
    bank: BTreeMap<SoundCue, Sound>,
    master_volume: f32,
    dropped: u64,
}

impl AudioPool {
    /// Builds a pool from configuration. Later bank entries replace earlier
    /// entries with the same cue.
    #[must_use]
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            channels: vec![None; config.channels],
            bank: config
                .sounds
                .iter()
                .map(|sound| (sound.cue, sound.clone()))
                .collect(),
            master_volume: 1.0,
            dropped: 0,
        }
    }

    /// Starts a cue on a free channel and returns the channel index.
    ///
    /// Returns `None` (after logging a warning) if the cue is not in the bank
    /// or every channel is busy.
    pub fn start(&mut self, cue: SoundCue) -> Option<usize> {
        let Some(sound) = self.bank.get(&cue) else {
            warn!(%cue, "sound cue not found in bank");
            self.dropped += 1;
            return None;
        };
        let Some(index) = self.channels.iter().position(Option::is_none) else {
            warn!(%cue, channels = self.channels.len(), "no free audio channel, dropping sound");
            self.dropped += 1;
            return None;
        };
        self.channels[index] = Some(Playback {
            cue,
            remaining: sound.playback_time(),
            volume: sound.volume * self.master_volume,
        });
        Some(index)
    }

    /// Advances every busy channel and frees those whose clip ended.
    /// Returns the cues that finished, in channel order.
    pub fn release_finished(&mut self, dt: f32) -> Vec<SoundCue> {
        let mut finished = Vec::new();
        for channel in &mut self.channels {
            if let Some(playback) = channel {
                playback.remaining -= dt;
                if playback.remaining <= 0.0 {
                    finished.push(playback.cue);
                    *channel = None;
                }
            }
        }
        finished
    }

    /// Stops every channel.
    pub fn stop_all(&mut self) {
        self.channels.iter_mut().for_each(|channel| *channel = None);
    }

    /// Sets the master volume applied to every channel, clamped to `[0, 1]`.
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        for playback in self.channels.iter_mut().flatten() {
            if let Some(sound) = self.bank.get(&playback.cue) {
                playback.volume = sound.volume * self.master_volume;
            }
        }
    }

    /// Number of busy channels.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }

    /// Whether any channel is playing `cue`.
    #[must_use]
    pub fn is_playing(&self, cue: SoundCue) -> bool {
        self.channels.iter().flatten().any(|p| p.cue == cue)
    }

    /// Volume of the sound on a channel, if busy.
    #[must_use]
    pub fn channel_volume(&self, index: usize) -> Option<f32> {
        self.channels.get(index).copied().flatten().map(|p| p.volume)
    }

    /// Number of requests dropped since creation.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for AudioPool {
    fn default() -> Self {
        Self::new(&AudioConfig::default())
    }
}

impl SoundService for AudioPool {
    fn play(&mut self, cue: SoundCue) {
        self.start(cue);
    }

    fn advance(&mut self, dt: f32) {
        self.release_finished(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod pool_tests {
        use super::*;

        #[test]
        fn fills_channels_in_order() {
            let mut pool = AudioPool::default();
            assert_eq!(pool.start(SoundCue::BubblePush), Some(0));
            assert_eq!(pool.start(SoundCue::BubbleHit), Some(1));
            assert!(pool.is_playing(SoundCue::BubbleHit));
            assert_eq!(pool.active_count(), 2);
        }

        #[test]
        fn exhaustion_drops_request() {
            let mut pool = AudioPool::new(&AudioConfig {
                channels: 2,
                ..AudioConfig::default()
            });
            pool.play(SoundCue::BubblePop);
            pool.play(SoundCue::BubblePop);
            pool.play(SoundCue::BubblePop);
            assert_eq!(pool.active_count(), 2);
            assert_eq!(pool.dropped(), 1);
        }

        #[test]
        fn unknown_cue_dropped() {
            let mut pool = AudioPool::new(&AudioConfig {
                channels: 4,
                sounds: vec![Sound::new(SoundCue::BubblePop, 0.5)],
            });
            assert_eq!(pool.start(SoundCue::BubblePush), None);
            assert_eq!(pool.dropped(), 1);
            assert_eq!(pool.active_count(), 0);
        }

        #[test]
        fn channel_returns_after_clip() {
            let mut pool = AudioPool::default();
            pool.play(SoundCue::BubblePush);
            assert!(pool.release_finished(0.1).is_empty());
            assert_eq!(pool.release_finished(0.2), vec![SoundCue::BubblePush]);
            assert_eq!(pool.active_count(), 0);
        }

        #[test]
        fn pitch_shortens_playback() {
            let mut pool = AudioPool::new(&AudioConfig {
                channels: 1,
                sounds: vec![Sound {
                    pitch: 2.0,
                    ..Sound::new(SoundCue::BubbleHit, 1.0)
                }],
            });
            pool.play(SoundCue::BubbleHit);
            assert_eq!(pool.release_finished(0.5), vec![SoundCue::BubbleHit]);
        }

        #[test]
        fn master_volume_scales_channels() {
            let mut pool = AudioPool::default();
            let channel = pool.start(SoundCue::BubblePop).unwrap();
            pool.set_master_volume(0.5);
            assert_eq!(pool.channel_volume(channel), Some(0.5));
            pool.stop_all();
            assert_eq!(pool.channel_volume(channel), None);
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn default_is_valid() {
            assert!(AudioConfig::default().validate().is_ok());
        }

        #[test]
        fn zero_channels_rejected() {
            let config = AudioConfig {
                channels: 0,
                ..AudioConfig::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn loud_sound_rejected() {
            let config = AudioConfig {
                channels: 1,
                sounds: vec![Sound {
                    volume: 1.5,
                    ..Sound::new(SoundCue::BubblePop, 0.5)
                }],
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue { field: "audio.sounds.volume", .. })
            ));
        }
    }
}
