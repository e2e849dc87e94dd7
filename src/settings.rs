//! Game configuration
//!
//! Static startup parameters. Nothing here changes at runtime except through
//! the difficulty ramp, which works on copies held by the session.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How directional input turns into player motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Position moves by direction * speed; diagonals are normalized
    Discrete,
    /// Presses accelerate a velocity that decays every frame
    #[default]
    Momentum,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Discrete => "discrete",
            ControlScheme::Momentum => "momentum",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "discrete" | "direct" => Some(ControlScheme::Discrete),
            "momentum" | "continuous" => Some(ControlScheme::Momentum),
            _ => None,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Playfield ===
    pub screen_width: f32,
    pub screen_height: f32,
    pub target_fps: u32,

    // === Player ===
    pub control_scheme: ControlScheme,
    pub player_width: f32,
    pub player_height: f32,
    /// Cruising speed (pixels/second)
    pub base_speed: f32,
    /// Speed while a SpeedBoost is active
    pub boost_speed: f32,
    /// Velocity cap for the momentum scheme
    pub max_speed: f32,
    /// Velocity gained per accelerate impulse
    pub acceleration: f32,
    /// Velocity multiplier per 1/60 s (momentum scheme)
    pub deceleration: f32,
    /// Keep firing while shoot is held
    pub auto_fire: bool,
    /// Seconds between volleys while fire is held
    pub shoot_delay: f32,
    pub bullet_speed: f32,

    // === Enemies ===
    pub enemy_speed: f32,
    /// Probability that a spawned enemy is a UFO
    pub ufo_chance: f64,
    /// Seconds between periodic enemy spawns, `None` disables them
    pub enemy_spawn_interval: Option<f32>,
    /// Enemies kept alive at all times (0 = no fixed roster)
    pub enemy_roster: usize,
    /// Chance per second that each enemy fires a bullet
    pub enemy_fire_chance: f64,

    // === Power-ups ===
    pub power_up_speed: f32,
    pub power_up_spawn_interval: f32,
    /// The spawn interval never ramps below this
    pub min_power_up_interval: f32,
    pub max_power_ups: usize,
    pub rapid_fire_duration: f32,
    pub speed_boost_duration: f32,
    /// Whether enemies wiped by a Bomb count toward the score
    pub bomb_awards_score: bool,

    // === Difficulty ===
    pub difficulty_interval: f32,
    /// Applied to every live enemy's speed per difficulty step
    pub difficulty_multiplier: f32,
    /// Applied to the power-up spawn interval per difficulty step
    pub power_up_interval_multiplier: f32,

    // === Scoring / effects ===
    pub score_per_kill: u64,
    pub particles_per_burst: usize,
    pub max_particles: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            target_fps: TARGET_FPS,

            control_scheme: ControlScheme::Momentum,
            player_width: PLAYER_SIZE,
            player_height: PLAYER_SIZE,
            base_speed: PLAYER_BASE_SPEED,
            boost_speed: PLAYER_BOOST_SPEED,
            max_speed: PLAYER_MAX_SPEED,
            acceleration: PLAYER_ACCELERATION,
            deceleration: PLAYER_DECELERATION,
            auto_fire: true,
            shoot_delay: 0.2,
            bullet_speed: BULLET_SPEED,

            enemy_speed: ENEMY_SPEED,
            ufo_chance: 0.2,
            enemy_spawn_interval: Some(2.0),
            enemy_roster: 0,
            enemy_fire_chance: 0.0,

            power_up_speed: POWER_UP_SPEED,
            power_up_spawn_interval: 10.0,
            min_power_up_interval: 1.0,
            max_power_ups: 3,
            rapid_fire_duration: 10.0,
            speed_boost_duration: 5.0,
            bomb_awards_score: false,

            difficulty_interval: 30.0,
            difficulty_multiplier: 1.1,
            power_up_interval_multiplier: 0.9,

            score_per_kill: 1,
            particles_per_burst: 20,
            max_particles: 500,
        }
    }
}

impl GameConfig {
    /// Rules of the blit-surface front-end: a recycled roster of five
    /// enemies, direct movement, one volley per press and bombs that pay out
    pub fn classic() -> Self {
        Self {
            control_scheme: ControlScheme::Discrete,
            auto_fire: false,
            enemy_spawn_interval: None,
            enemy_roster: 5,
            bomb_awards_score: true,
            particles_per_burst: 30,
            ..Self::default()
        }
    }

    /// Fixed simulation timestep derived from the target frame rate
    pub fn sim_dt(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Reject values that would break the simulation invariants
    pub fn validate(&self) -> Result<()> {
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            bail!(
                "playfield must have positive size, got {}x{}",
                self.screen_width,
                self.screen_height
            );
        }
        if self.player_width > self.screen_width || self.player_height > self.screen_height {
            bail!("player does not fit inside the playfield");
        }
        if self.target_fps == 0 {
            bail!("target_fps must be at least 1");
        }
        for (name, value) in [
            ("base_speed", self.base_speed),
            ("boost_speed", self.boost_speed),
            ("max_speed", self.max_speed),
            ("bullet_speed", self.bullet_speed),
            ("enemy_speed", self.enemy_speed),
            ("power_up_speed", self.power_up_speed),
            ("power_up_spawn_interval", self.power_up_spawn_interval),
            ("min_power_up_interval", self.min_power_up_interval),
            ("difficulty_interval", self.difficulty_interval),
            ("shoot_delay", self.shoot_delay),
        ] {
            if !(value > 0.0) {
                bail!("{name} must be positive, got {value}");
            }
        }
        if let Some(interval) = self.enemy_spawn_interval {
            if !(interval > 0.0) {
                bail!("enemy_spawn_interval must be positive, got {interval}");
            }
        }
        if !(0.0..=1.0).contains(&self.deceleration) {
            bail!("deceleration must be within [0, 1], got {}", self.deceleration);
        }
        if !(self.difficulty_multiplier >= 1.0) {
            bail!(
                "difficulty_multiplier must not slow enemies, got {}",
                self.difficulty_multiplier
            );
        }
        if !(self.power_up_interval_multiplier > 0.0 && self.power_up_interval_multiplier <= 1.0) {
            bail!(
                "power_up_interval_multiplier must be within (0, 1], got {}",
                self.power_up_interval_multiplier
            );
        }
        if !(0.0..=1.0).contains(&self.ufo_chance) || !(0.0..=1.0).contains(&self.enemy_fire_chance)
        {
            bail!("probabilities must be within [0, 1]");
        }
        Ok(())
    }

    /// Load a JSON config file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
