//! Headless platform
//!
//! Adapters for running a session without a window: scripted or autopilot
//! input, JSON-lines frame output and logged audio cues.

use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::{InputAdapter, RenderAdapter};
use crate::audio::{AudioAdapter, Cue, CueOutcome};
use crate::sim::{Command, FrameSnapshot, GamePhase, HeldKeys, InputEvent, InputFrame};

/// Replays a fixed list of input frames, then closes
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputFrame>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Load a JSON array of input frames
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading input script {}", path.display()))?;
        let frames: Vec<InputFrame> = serde_json::from_str(&json)
            .with_context(|| format!("parsing input script {}", path.display()))?;
        log::info!("Loaded {} scripted input frames", frames.len());
        Ok(Self::new(frames))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputAdapter for ScriptedInput {
    fn poll(&mut self) -> Result<Option<InputFrame>> {
        Ok(self.frames.pop_front())
    }
}

/// Frames per left/right sweep
const SWEEP_PERIOD: u64 = 90;

/// Plays by itself: holds fire, sweeps side to side and presses restart
/// periodically. Restart is ignored by the core unless the run is over.
#[derive(Debug, Clone)]
pub struct Autopilot {
    frame: u64,
    /// Frames before quit is pressed, `None` runs forever
    duration: Option<u64>,
    restart_every: u64,
    quit_sent: bool,
}

impl Autopilot {
    pub fn new(duration: Option<u64>) -> Self {
        Self {
            frame: 0,
            duration,
            restart_every: 180,
            quit_sent: false,
        }
    }

    pub fn with_restart_every(mut self, frames: u64) -> Self {
        self.restart_every = frames.max(1);
        self
    }

    fn held(&self) -> HeldKeys {
        let leftward = (self.frame / SWEEP_PERIOD) % 2 == 0;
        HeldKeys {
            left: leftward,
            right: !leftward,
            shoot: true,
            ..Default::default()
        }
    }
}

impl InputAdapter for Autopilot {
    fn poll(&mut self) -> Result<Option<InputFrame>> {
        if self.quit_sent {
            return Ok(None);
        }
        if self.duration.is_some_and(|limit| self.frame >= limit) {
            self.quit_sent = true;
            return Ok(Some(InputFrame::pressed(Command::Quit)));
        }

        let mut frame = InputFrame::snapshot(self.held());
        if self.frame > 0 && self.frame % self.restart_every == 0 {
            frame.events.push(InputEvent::Pressed(Command::Restart));
        }
        self.frame += 1;
        Ok(Some(frame))
    }
}

/// Writes one JSON snapshot per line, every `stride` frames and on every
/// phase change
pub struct JsonRenderer<W: Write> {
    out: W,
    stride: u64,
    frames: u64,
    last_phase: Option<GamePhase>,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stride: 1,
            frames: 0,
            last_phase: None,
        }
    }

    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderAdapter for JsonRenderer<W> {
    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<()> {
        let phase_changed = self.last_phase != Some(frame.phase);
        if phase_changed {
            match frame.phase {
                GamePhase::GameOver => log::info!("GAME OVER - score {}", frame.score),
                GamePhase::Paused => log::info!("PAUSED"),
                _ => {}
            }
            self.last_phase = Some(frame.phase);
        }

        if phase_changed || self.frames % self.stride == 0 {
            serde_json::to_writer(&mut self.out, frame).context("encoding frame snapshot")?;
            writeln!(self.out).context("writing frame snapshot")?;
        }
        self.frames += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.out.flush().context("flushing frame output")
    }
}

/// Logs cues instead of playing them
#[derive(Debug, Clone, Default)]
pub struct LogAudio {
    missing: HashSet<Cue>,
    played: Vec<Cue>,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report these cues as having no loaded sound
    pub fn with_missing(cues: impl IntoIterator<Item = Cue>) -> Self {
        Self {
            missing: cues.into_iter().collect(),
            played: Vec::new(),
        }
    }

    pub fn played(&self) -> &[Cue] {
        &self.played
    }
}

impl AudioAdapter for LogAudio {
    fn play(&mut self, cue: Cue, volume: f32) -> Result<CueOutcome> {
        if self.missing.contains(&cue) {
            return Ok(CueOutcome::Unavailable);
        }
        log::debug!("cue {} (volume {:.2})", cue.as_str(), volume);
        self.played.push(cue);
        Ok(CueOutcome::Played)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::GameState;

    #[test]
    fn test_scripted_input_closes_when_exhausted() {
        let mut input = ScriptedInput::new(vec![
            InputFrame::pressed(Command::Shoot),
            InputFrame::default(),
        ]);
        assert_eq!(
            input.poll().unwrap(),
            Some(InputFrame::pressed(Command::Shoot))
        );
        assert_eq!(input.remaining(), 1);
        assert!(input.poll().unwrap().is_some());
        assert!(input.poll().unwrap().is_none());
    }

    #[test]
    fn test_script_parses_from_json() {
        let frames: Vec<InputFrame> = serde_json::from_str(
            r#"[
                {"events": [{"Pressed": "MoveLeft"}], "held": null},
                {
                    "events": [],
                    "held": {
                        "left": false, "right": true, "up": false, "down": false, "shoot": true
                    }
                }
            ]"#,
        )
        .unwrap();
        assert_eq!(frames[0].events, vec![InputEvent::Pressed(Command::MoveLeft)]);
        assert!(frames[1].held.is_some_and(|h| h.right && h.shoot));
    }

    #[test]
    fn test_autopilot_quits_after_duration() {
        let mut pilot = Autopilot::new(Some(3));
        for _ in 0..3 {
            let frame = pilot.poll().unwrap().unwrap();
            assert!(frame.held.is_some_and(|h| h.shoot));
        }
        assert_eq!(
            pilot.poll().unwrap(),
            Some(InputFrame::pressed(Command::Quit))
        );
        assert!(pilot.poll().unwrap().is_none());
    }

    #[test]
    fn test_autopilot_sweeps_and_restarts() {
        let mut pilot = Autopilot::new(None).with_restart_every(100);
        let first = pilot.poll().unwrap().unwrap();
        assert!(first.held.is_some_and(|h| h.left && !h.right));
        assert!(first.events.is_empty());

        let mut frame = first;
        for _ in 1..=SWEEP_PERIOD {
            frame = pilot.poll().unwrap().unwrap();
        }
        assert!(frame.held.is_some_and(|h| h.right && !h.left));

        for _ in (SWEEP_PERIOD + 1)..=100 {
            frame = pilot.poll().unwrap().unwrap();
        }
        assert_eq!(frame.events, vec![InputEvent::Pressed(Command::Restart)]);
    }

    #[test]
    fn test_json_renderer_stride_and_phase_changes() {
        let mut state = GameState::new(GameConfig::default(), 1);
        let mut renderer = JsonRenderer::new(Vec::new()).with_stride(10);
        for _ in 0..5 {
            renderer.draw(&state.snapshot()).unwrap();
        }
        state.phase = GamePhase::GameOver;
        renderer.draw(&state.snapshot()).unwrap();
        renderer.shutdown().unwrap();

        assert_eq!(renderer.frames_drawn(), 6);
        let text = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let last: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(last["phase"], "GameOver");
    }

    #[test]
    fn test_log_audio_reports_missing() {
        let mut audio = LogAudio::with_missing([Cue::Explosion]);
        assert_eq!(audio.play(Cue::Explosion, 1.0).unwrap(), CueOutcome::Unavailable);
        assert_eq!(audio.play(Cue::Shoot, 1.0).unwrap(), CueOutcome::Played);
        assert_eq!(audio.played(), &[Cue::Shoot]);
    }
}
