//! Space Fighter - a 2D arcade shooter core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, motion, spawning, collisions, session state)
//! - `settings`: Startup configuration surface
//! - `audio`: Cue vocabulary and audio adapter management
//! - `platform`: Render/input/audio adapter contracts plus a headless implementation
//! - `app`: Frame loop tying the simulation to a platform

pub mod app;
pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;

pub use app::{ExitReason, Game, Pacing};
pub use settings::{ControlScheme, GameConfig};

use glam::Vec2;

/// Reference tuning values. Speeds are pixels/second, tuned against a 60 Hz
/// frame rate.
pub mod consts {
    /// Default playfield size
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    /// Target frame rate
    pub const TARGET_FPS: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest wall-clock gap fed into the accumulator (seconds)
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 100.0;
    pub const PLAYER_BASE_SPEED: f32 = 600.0;
    pub const PLAYER_BOOST_SPEED: f32 = 900.0;
    pub const PLAYER_MAX_SPEED: f32 = 900.0;
    pub const PLAYER_ACCELERATION: f32 = 60.0;
    pub const PLAYER_DECELERATION: f32 = 0.9;
    /// Frame rate the per-frame deceleration factor is expressed against
    pub const REFERENCE_FRAME_RATE: f32 = 60.0;
    /// Highest power-up level (7-way spread)
    pub const MAX_POWER_UP_LEVEL: u8 = 3;

    /// Bullet defaults
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 10.0;
    pub const BULLET_SPEED: f32 = 420.0;
    /// Degrees between adjacent bullets in a spread
    pub const SPREAD_STEP_DEG: f32 = 15.0;

    /// Enemy defaults
    pub const SHIP_WIDTH: f32 = 60.0;
    pub const SHIP_HEIGHT: f32 = 80.0;
    pub const UFO_WIDTH: f32 = 30.0;
    pub const UFO_HEIGHT: f32 = 40.0;
    pub const ENEMY_SPEED: f32 = 120.0;

    /// Power-up defaults
    pub const POWER_UP_SIZE: f32 = 20.0;
    pub const POWER_UP_SPEED: f32 = 120.0;

    /// Particle defaults
    pub const PARTICLE_MAX_DRIFT: f32 = 120.0;
    pub const PARTICLE_MIN_SIZE: f32 = 5.0;
    pub const PARTICLE_MAX_SIZE: f32 = 15.0;
    pub const PARTICLE_MIN_LIFE: f32 = 0.5;
    pub const PARTICLE_MAX_LIFE: f32 = 1.5;
    /// Explosion palette (0xRRGGBB): orange, orange-red, red
    pub const EXPLOSION_COLORS: [u32; 3] = [0xFFA500, 0xFF4500, 0xFF0000];
}

/// Unit direction for an angle in degrees measured clockwise from straight up
#[inline]
pub fn heading(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}
