//! Session state and core simulation types
//!
//! The session exclusively owns the player and every entity collection.
//! Entities never reach back into it; score and removals are applied here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::entity::{Aabb, Bullet, Enemy, EnemyKind, Particle, Player, PowerUp, PowerUpKind};
use super::spawner::Spawner;
use crate::consts::*;
use crate::settings::GameConfig;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen until pause is pressed again
    Paused,
    /// Run ended; waiting for restart or quit
    GameOver,
    /// Quit requested; the frame loop should exit
    Terminated,
}

/// What removed an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KillCause {
    Bullet,
    Shield,
    Bomb,
}

/// Observable things that happened during a tick, drained by the frame loop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A volley left the player's ship
    Shot { bullets: usize },
    EnemyDestroyed {
        kind: EnemyKind,
        at: Vec2,
        cause: KillCause,
    },
    PowerUpCollected(PowerUpKind),
    SpeedBoostExpired,
    RapidFireExpired,
    DifficultyRaised { level: u32 },
    Paused,
    Resumed,
    GameOver { score: u64 },
    Restarted,
    Terminated,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Startup parameters
    pub config: GameConfig,
    /// Seed the session RNG started from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Monotonic within a run; reset only by restart
    pub score: u64,
    /// Simulation tick counter for the current run
    pub time_ticks: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Particle>,
    /// Spawn and difficulty timers
    pub spawner: Spawner,
    /// Seconds since the last held-fire volley
    pub shoot_timer: f32,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new session with the given config and seed
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut state = Self {
            player: Player::new(&config),
            spawner: Spawner::new(&config),
            shoot_timer: config.shoot_delay,
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            score: 0,
            time_ticks: 0,
            enemies: Vec::new(),
            bullets: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.fill_roster();
        log::info!("Session started (seed {})", seed);
        state
    }

    /// Reinitialize every part of the run and return to Playing.
    /// The RNG keeps its sequence so consecutive runs differ.
    pub fn restart(&mut self) {
        self.player = Player::new(&self.config);
        self.spawner = Spawner::new(&self.config);
        self.shoot_timer = self.config.shoot_delay;
        self.score = 0;
        self.time_ticks = 0;
        self.enemies.clear();
        self.bullets.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.fill_roster();
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::Restarted);
        log::info!("Session restarted");
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn playfield(&self) -> Aabb {
        Aabb::from_size(self.config.screen_width, self.config.screen_height)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Top the enemy roster back up to its configured minimum
    pub fn fill_roster(&mut self) {
        while self.enemies.len() < self.config.enemy_roster {
            self.spawn_roster_enemy();
        }
    }

    /// Spawn one ship just above the top edge, staggered 50-150 px
    pub fn spawn_roster_enemy(&mut self) {
        let kind = EnemyKind::Ship;
        let size = kind.size();
        let max_x = (self.config.screen_width - size.x).max(0.0);
        let x = self.rng.random_range(0.0..=max_x);
        let y = self.config.screen_height + self.rng.random_range(50.0..=150.0);
        let speed = self.spawner.enemy_speed;
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, kind, Vec2::new(x, y), speed));
    }

    /// Emit a burst of explosion particles at `center`
    pub fn spawn_explosion(&mut self, center: Vec2) {
        let count = self.config.particles_per_burst;
        let cap = self.config.max_particles;
        if cap == 0 {
            return;
        }
        for _ in 0..count {
            let vel = Vec2::new(
                self.rng.random_range(-PARTICLE_MAX_DRIFT..=PARTICLE_MAX_DRIFT),
                self.rng.random_range(-PARTICLE_MAX_DRIFT..=PARTICLE_MAX_DRIFT),
            );
            let color = EXPLOSION_COLORS[self.rng.random_range(0..EXPLOSION_COLORS.len())];
            let size = self.rng.random_range(PARTICLE_MIN_SIZE..=PARTICLE_MAX_SIZE);
            let lifetime = self.rng.random_range(PARTICLE_MIN_LIFE..=PARTICLE_MAX_LIFE);
            self.particles.push(Particle {
                pos: center,
                vel,
                color,
                size,
                lifetime,
            });
        }
        // Oldest particles make room
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
    }

    /// Read-only view for render adapters
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            tick: self.time_ticks,
            phase: self.phase,
            score: self.score,
            difficulty_level: self.spawner.difficulty_level,
            player: &self.player,
            enemies: &self.enemies,
            bullets: &self.bullets,
            power_ups: &self.power_ups,
            particles: &self.particles,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrameSnapshot<'a> {
    pub tick: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub difficulty_level: u32,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub power_ups: &'a [PowerUp],
    pub particles: &'a [Particle],
}
