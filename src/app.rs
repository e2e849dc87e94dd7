//! Frame loop
//!
//! Owns the session and the three platform adapters. Each frame polls input,
//! runs fixed simulation steps, forwards events to audio and draws.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::audio::{AudioAdapter, AudioManager, Cue};
use crate::consts::{MAX_FRAME_TIME, MAX_SUBSTEPS};
use crate::platform::{InputAdapter, RenderAdapter};
use crate::sim::{Controls, GameEvent, GamePhase, GameState, InputFrame, TickInput, tick};

/// How wall-clock time drives the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Measure elapsed time and sleep to hold the target frame rate
    RealTime,
    /// Exactly one simulation step per frame, no sleeping
    Unthrottled,
}

/// Why `Game::run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Quit command reached the session
    Quit,
    /// Input adapter closed
    InputClosed,
    /// Frame limit reached
    FrameLimit,
}

/// A running game bound to its platform adapters
pub struct Game<R: RenderAdapter, I: InputAdapter, A: AudioAdapter> {
    state: GameState,
    controls: Controls,
    renderer: R,
    input: I,
    audio: AudioManager<A>,
    pacing: Pacing,
    sim_dt: f32,
    accumulator: f32,
    /// Input not yet consumed by a simulation step
    pending: TickInput,
    frame_limit: Option<u64>,
    frames: u64,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
    started: Instant,
    torn_down: bool,
}

impl<R: RenderAdapter, I: InputAdapter, A: AudioAdapter> Game<R, I, A> {
    pub fn new(state: GameState, renderer: R, input: I, audio: A) -> Self {
        let sim_dt = state.config.sim_dt();
        Self {
            state,
            controls: Controls::new(),
            renderer,
            input,
            audio: AudioManager::new(audio),
            pacing: Pacing::Unthrottled,
            sim_dt,
            accumulator: 0.0,
            pending: TickInput::default(),
            frame_limit: None,
            frames: 0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
            started: Instant::now(),
            torn_down: false,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Stop after this many frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn audio(&self) -> &AudioManager<A> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager<A> {
        &mut self.audio
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second over the last 60 real-time frames
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Run until quit, input closes or the frame limit. Adapters are torn
    /// down on every exit path.
    pub fn run(&mut self) -> Result<ExitReason> {
        log::info!(
            "Starting session: {}x{} at {} fps, {} controls",
            self.state.config.screen_width,
            self.state.config.screen_height,
            self.state.config.target_fps,
            self.state.config.control_scheme.as_str()
        );

        let result = self
            .audio
            .play(Cue::BackgroundStart)
            .context("starting background music")
            .and_then(|_| self.frame_loop());

        match &result {
            Ok(reason) => log::info!(
                "Session ended ({:?}) after {} frames, score {}, {} fps",
                reason,
                self.frames,
                self.state.score,
                self.fps
            ),
            Err(err) => log::error!("Session aborted: {err:#}"),
        }
        self.teardown();
        result
    }

    fn frame_loop(&mut self) -> Result<ExitReason> {
        let frame_budget = Duration::from_secs_f32(self.sim_dt);
        let mut last = Instant::now();

        loop {
            if self.frame_limit.is_some_and(|limit| self.frames >= limit) {
                return Ok(ExitReason::FrameLimit);
            }
            let frame_start = Instant::now();

            let frame_time = match self.pacing {
                Pacing::RealTime => {
                    let elapsed = frame_start.duration_since(last).as_secs_f32();
                    last = frame_start;
                    elapsed
                }
                Pacing::Unthrottled => self.sim_dt,
            };

            let Some(frame) = self.input.poll().context("polling input")? else {
                return Ok(ExitReason::InputClosed);
            };
            self.step(&frame, frame_time)?;

            self.renderer
                .draw(&self.state.snapshot())
                .context("drawing frame")?;
            self.frames += 1;

            if self.state.phase == GamePhase::Terminated {
                return Ok(ExitReason::Quit);
            }

            if self.pacing == Pacing::RealTime {
                self.track_fps();
                if self.frames % 600 == 0 {
                    log::debug!("{} fps", self.fps);
                }
                if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
                    std::thread::sleep(rest);
                }
            }
        }
    }

    /// Feed one frame of input and `frame_time` seconds into the simulation
    pub fn step(&mut self, frame: &InputFrame, frame_time: f32) -> Result<()> {
        let input = self.controls.translate(frame);
        self.pending.merge(input);

        self.accumulator += frame_time.min(MAX_FRAME_TIME);
        let mut substeps = 0;
        while self.accumulator >= self.sim_dt && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.pending, self.sim_dt);
            self.accumulator -= self.sim_dt;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.pending.clear_one_shots();
        }
        if substeps == MAX_SUBSTEPS {
            // Fell behind; drop the backlog rather than spiral
            self.accumulator = self.accumulator.min(self.sim_dt);
        }

        for event in self.state.drain_events() {
            if event == GameEvent::Restarted {
                self.controls.reset();
                self.pending = TickInput::default();
            }
            self.audio
                .handle_event(&event)
                .with_context(|| format!("playing cue for {:?}", event))?;
        }
        Ok(())
    }

    fn track_fps(&mut self) {
        let time = self.started.elapsed().as_secs_f64() * 1000.0;
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % 60;

        // Oldest to newest frame
        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time - oldest_time;
            if elapsed > 0.0 {
                self.fps = (60000.0 / elapsed).round() as u32;
            }
        }
    }

    /// Release adapters; safe to call more than once
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.audio.shutdown();
        if let Err(err) = self.renderer.shutdown() {
            log::warn!("Renderer shutdown failed: {err:#}");
        }
        if let Err(err) = self.input.shutdown() {
            log::warn!("Input shutdown failed: {err:#}");
        }
        log::debug!("Platform adapters released");
    }
}

impl<R: RenderAdapter, I: InputAdapter, A: AudioAdapter> Drop for Game<R, I, A> {
    fn drop(&mut self) {
        self.teardown();
    }
}
