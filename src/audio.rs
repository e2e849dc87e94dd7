//! Audio cues
//!
//! The simulation never plays sound itself; the frame loop turns game events
//! into named cues and hands them to an `AudioAdapter` through `AudioManager`.

use std::collections::HashSet;

use anyhow::Result;

use crate::sim::{GameEvent, KillCause};

/// Named sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Player fired a volley
    Shoot,
    /// Enemy destroyed by a bullet or the shield
    Explosion,
    /// Power-up collected
    PowerUp,
    /// Start the looping background track
    BackgroundStart,
    /// Stop the background track
    BackgroundStop,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Shoot => "shoot",
            Cue::Explosion => "explosion",
            Cue::PowerUp => "powerup",
            Cue::BackgroundStart => "background-loop-start",
            Cue::BackgroundStop => "background-stop",
        }
    }

    fn is_music(&self) -> bool {
        matches!(self, Cue::BackgroundStart | Cue::BackgroundStop)
    }
}

/// Cue raised by a game event, if any
pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::Shot { .. } => Some(Cue::Shoot),
        GameEvent::EnemyDestroyed { cause, .. } => match cause {
            KillCause::Bullet | KillCause::Shield => Some(Cue::Explosion),
            // The pickup cue covers a bomb
            KillCause::Bomb => None,
        },
        GameEvent::PowerUpCollected(_) => Some(Cue::PowerUp),
        GameEvent::GameOver { .. } | GameEvent::Terminated => Some(Cue::BackgroundStop),
        GameEvent::Restarted => Some(Cue::BackgroundStart),
        _ => None,
    }
}

/// What the backend did with a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueOutcome {
    Played,
    /// No sound is loaded for this cue
    Unavailable,
}

/// Platform audio backend. Fire-and-forget: playback runs independently of
/// the simulation.
pub trait AudioAdapter {
    fn play(&mut self, cue: Cue, volume: f32) -> Result<CueOutcome>;

    /// Release device handles
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager<A: AudioAdapter> {
    backend: A,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// The session wants music, whether or not it can be heard
    music_requested: bool,
    /// The backend confirmed the music is running
    music_playing: bool,
    missing: HashSet<Cue>,
}

impl<A: AudioAdapter> AudioManager<A> {
    pub fn new(backend: A) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            music_requested: false,
            music_playing: false,
            missing: HashSet::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio. Muting stops the music; unmuting resumes it
    /// if the session still wants it.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted == muted {
            return;
        }
        self.muted = muted;
        let result = if muted && self.music_playing {
            self.send_music(Cue::BackgroundStop)
        } else if !muted && self.music_requested && !self.music_playing {
            self.send_music(Cue::BackgroundStart)
        } else {
            Ok(())
        };
        if let Err(err) = result {
            log::warn!("Failed to update music after mute change: {err:#}");
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    pub fn backend(&self) -> &A {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut A {
        &mut self.backend
    }

    fn effective_volume(&self, cue: Cue) -> f32 {
        if self.muted {
            0.0
        } else if cue.is_music() {
            self.master_volume * self.music_volume
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a cue. Missing sounds are a no-op; backend failures propagate.
    pub fn play(&mut self, cue: Cue) -> Result<()> {
        match cue {
            Cue::BackgroundStart => {
                self.music_requested = true;
                if self.music_playing || self.muted {
                    return Ok(());
                }
                self.send_music(cue)
            }
            Cue::BackgroundStop => {
                self.music_requested = false;
                if !self.music_playing {
                    return Ok(());
                }
                self.send_music(cue)
            }
            _ => {
                let vol = self.effective_volume(cue);
                if vol <= 0.0 {
                    return Ok(());
                }
                self.send(cue, vol)
            }
        }
    }

    /// Forward a music cue; the playing flag follows only a backend that accepted it
    fn send_music(&mut self, cue: Cue) -> Result<()> {
        let vol = self.effective_volume(cue);
        self.send(cue, vol)?;
        self.music_playing = cue == Cue::BackgroundStart;
        Ok(())
    }

    fn send(&mut self, cue: Cue, vol: f32) -> Result<()> {
        match self.backend.play(cue, vol)? {
            CueOutcome::Played => {}
            CueOutcome::Unavailable => {
                if self.missing.insert(cue) {
                    log::debug!("No sound loaded for cue '{}', skipping", cue.as_str());
                }
            }
        }
        Ok(())
    }

    /// Play whatever cue an event raises
    pub fn handle_event(&mut self, event: &GameEvent) -> Result<()> {
        match cue_for(event) {
            Some(cue) => self.play(cue),
            None => Ok(()),
        }
    }

    /// Stop music and release the backend; errors are logged, not returned
    pub fn shutdown(&mut self) {
        if let Err(err) = self.play(Cue::BackgroundStop) {
            log::warn!("Failed to stop background music: {err:#}");
        }
        if let Err(err) = self.backend.shutdown() {
            log::warn!("Audio backend shutdown failed: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EnemyKind, PowerUpKind};
    use glam::Vec2;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(Cue, f32)>,
        unavailable: Vec<Cue>,
        fail: bool,
    }

    impl AudioAdapter for Recorder {
        fn play(&mut self, cue: Cue, volume: f32) -> Result<CueOutcome> {
            if self.fail {
                anyhow::bail!("device lost");
            }
            if self.unavailable.contains(&cue) {
                return Ok(CueOutcome::Unavailable);
            }
            self.played.push((cue, volume));
            Ok(CueOutcome::Played)
        }
    }

    #[test]
    fn test_event_cues() {
        assert_eq!(cue_for(&GameEvent::Shot { bullets: 3 }), Some(Cue::Shoot));
        assert_eq!(
            cue_for(&GameEvent::EnemyDestroyed {
                kind: EnemyKind::Ship,
                at: Vec2::ZERO,
                cause: KillCause::Bullet,
            }),
            Some(Cue::Explosion)
        );
        assert_eq!(
            cue_for(&GameEvent::EnemyDestroyed {
                kind: EnemyKind::Ufo,
                at: Vec2::ZERO,
                cause: KillCause::Bomb,
            }),
            None
        );
        assert_eq!(
            cue_for(&GameEvent::PowerUpCollected(PowerUpKind::Bomb)),
            Some(Cue::PowerUp)
        );
        assert_eq!(
            cue_for(&GameEvent::GameOver { score: 1 }),
            Some(Cue::BackgroundStop)
        );
        assert_eq!(cue_for(&GameEvent::Restarted), Some(Cue::BackgroundStart));
        assert_eq!(cue_for(&GameEvent::DifficultyRaised { level: 1 }), None);
    }

    #[test]
    fn test_music_start_stop_tracked() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.play(Cue::BackgroundStart).unwrap();
        audio.play(Cue::BackgroundStart).unwrap();
        assert!(audio.is_music_playing());
        audio.play(Cue::BackgroundStop).unwrap();
        audio.play(Cue::BackgroundStop).unwrap();
        assert!(!audio.is_music_playing());

        let cues: Vec<Cue> = audio.backend().played.iter().map(|(c, _)| *c).collect();
        assert_eq!(cues, vec![Cue::BackgroundStart, Cue::BackgroundStop]);
    }

    #[test]
    fn test_missing_sound_is_noop() {
        let recorder = Recorder {
            unavailable: vec![Cue::Explosion],
            ..Default::default()
        };
        let mut audio = AudioManager::new(recorder);
        assert!(audio.play(Cue::Explosion).is_ok());
        assert!(audio.play(Cue::Explosion).is_ok());
        assert!(audio.play(Cue::Shoot).is_ok());
        assert_eq!(audio.backend().played.len(), 1);
    }

    #[test]
    fn test_muted_skips_effects() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.play(Cue::Shoot).unwrap();
        assert!(audio.backend().played.is_empty());
    }

    #[test]
    fn test_music_requested_while_muted_starts_on_unmute() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.play(Cue::BackgroundStart).unwrap();
        assert!(!audio.is_music_playing());
        assert!(audio.backend().played.is_empty());

        audio.set_muted(false);
        assert!(audio.is_music_playing());
        audio.play(Cue::BackgroundStart).unwrap();
        let cues: Vec<Cue> = audio.backend().played.iter().map(|(c, _)| *c).collect();
        assert_eq!(cues, vec![Cue::BackgroundStart]);
    }

    #[test]
    fn test_mute_stops_music_and_unmute_resumes() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.play(Cue::BackgroundStart).unwrap();
        audio.set_muted(true);
        assert!(!audio.is_music_playing());
        audio.set_muted(false);
        assert!(audio.is_music_playing());

        let cues: Vec<Cue> = audio.backend().played.iter().map(|(c, _)| *c).collect();
        assert_eq!(
            cues,
            vec![Cue::BackgroundStart, Cue::BackgroundStop, Cue::BackgroundStart]
        );
    }

    #[test]
    fn test_music_stopped_while_muted_stays_off() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_muted(true);
        audio.play(Cue::BackgroundStart).unwrap();
        audio.play(Cue::BackgroundStop).unwrap();
        audio.set_muted(false);
        assert!(!audio.is_music_playing());
        assert!(audio.backend().played.is_empty());
    }

    #[test]
    fn test_failed_music_start_can_retry() {
        let mut audio = AudioManager::new(Recorder {
            fail: true,
            ..Default::default()
        });
        assert!(audio.play(Cue::BackgroundStart).is_err());
        assert!(!audio.is_music_playing());

        audio.backend_mut().fail = false;
        audio.play(Cue::BackgroundStart).unwrap();
        assert!(audio.is_music_playing());
        assert_eq!(audio.backend().played.len(), 1);
    }

    #[test]
    fn test_volume_mixing() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        audio.set_music_volume(2.0);
        audio.play(Cue::Shoot).unwrap();
        audio.play(Cue::BackgroundStart).unwrap();
        let played = &audio.backend().played;
        assert!((played[0].1 - 0.25).abs() < 1e-6);
        assert!((played[1].1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_backend_failure_propagates() {
        let recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut audio = AudioManager::new(recorder);
        assert!(audio.play(Cue::Shoot).is_err());
        // Shutdown swallows the failure
        audio.shutdown();
    }
}
