//! Platform abstraction layer
//!
//! The core never talks to a window, keyboard or sound device directly.
//! Front-ends implement these adapters:
//! - `RenderAdapter` draws a read-only frame view
//! - `InputAdapter` reports key edges or held-key snapshots
//! - `AudioAdapter` (in `crate::audio`) plays named cues

pub mod headless;

use anyhow::Result;

use crate::sim::{FrameSnapshot, InputFrame};

pub use crate::audio::AudioAdapter;

/// Draws one frame. Must not mutate the session.
pub trait RenderAdapter {
    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<()>;

    /// Release the surface
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Source of player commands
pub trait InputAdapter {
    /// Input for the coming frame, or `None` once the source is closed
    /// (window closed, script exhausted)
    fn poll(&mut self) -> Result<Option<InputFrame>>;

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
