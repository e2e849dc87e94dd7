//! Time-driven spawning and the difficulty ramp

use glam::Vec2;
use rand::Rng;

use super::entity::{Bullet, Enemy, EnemyKind, PowerUp, PowerUpKind};
use super::state::{GameEvent, GameState};
use crate::consts::POWER_UP_SIZE;
use crate::settings::GameConfig;

/// Spawn and difficulty timers (seconds)
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    pub enemy_timer: f32,
    pub power_up_timer: f32,
    /// Current power-up spawn interval; shrinks with difficulty
    pub power_up_interval: f32,
    pub difficulty_timer: f32,
    /// Difficulty steps taken this run
    pub difficulty_level: u32,
    /// Speed handed to newly spawned enemies; ramps with difficulty
    pub enemy_speed: f32,
}

impl Spawner {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            enemy_timer: 0.0,
            power_up_timer: 0.0,
            power_up_interval: config.power_up_spawn_interval,
            difficulty_timer: 0.0,
            difficulty_level: 0,
            enemy_speed: config.enemy_speed,
        }
    }
}

/// Run every spawn timer forward by `dt`
pub fn update(state: &mut GameState, dt: f32) {
    if let Some(interval) = state.config.enemy_spawn_interval {
        state.spawner.enemy_timer += dt;
        while state.spawner.enemy_timer >= interval {
            state.spawner.enemy_timer -= interval;
            spawn_enemy(state);
        }
    }
    state.fill_roster();

    state.spawner.power_up_timer += dt;
    if state.spawner.power_up_timer >= state.spawner.power_up_interval {
        state.spawner.power_up_timer = 0.0;
        spawn_power_up(state);
    }

    enemy_fire(state, dt);

    state.spawner.difficulty_timer += dt;
    if state.spawner.difficulty_timer >= state.config.difficulty_interval {
        state.spawner.difficulty_timer = 0.0;
        raise_difficulty(state);
    }
}

/// Spawn an enemy just above the top edge at a random column
pub fn spawn_enemy(state: &mut GameState) {
    let kind = if state.rng.random_bool(state.config.ufo_chance) {
        EnemyKind::Ufo
    } else {
        EnemyKind::Ship
    };
    let size = kind.size();
    let max_x = (state.config.screen_width - size.x).max(0.0);
    let x = state.rng.random_range(0.0..=max_x);
    let pos = Vec2::new(x, state.config.screen_height);
    let speed = state.spawner.enemy_speed;
    let id = state.next_entity_id();
    log::debug!("Spawned {:?} #{} at x={:.0}", kind, id, x);
    state.enemies.push(Enemy::new(id, kind, pos, speed));
}

/// Spawn a random power-up unless the live cap is reached.
/// Returns whether one was spawned.
pub fn spawn_power_up(state: &mut GameState) -> bool {
    if state.power_ups.len() >= state.config.max_power_ups {
        return false;
    }
    let index = state.rng.random_range(0..PowerUpKind::ALL.len() as u8);
    let Some(kind) = PowerUpKind::from_index(index) else {
        debug_assert!(false, "power-up index {index} out of range");
        log::warn!("Ignoring out-of-range power-up index {}", index);
        return false;
    };
    let max_x = (state.config.screen_width - POWER_UP_SIZE).max(0.0);
    let x = state.rng.random_range(0.0..=max_x);
    let pos = Vec2::new(x, state.config.screen_height);
    let speed = state.config.power_up_speed;
    let id = state.next_entity_id();
    log::debug!("Spawned {:?} power-up #{}", kind, id);
    state.power_ups.push(PowerUp::new(id, kind, pos, speed));
    true
}

/// Each live enemy fires downward with `enemy_fire_chance` per second
fn enemy_fire(state: &mut GameState, dt: f32) {
    let chance = (state.config.enemy_fire_chance * dt as f64).clamp(0.0, 1.0);
    if chance <= 0.0 {
        return;
    }
    let mut muzzles = Vec::new();
    for enemy in &state.enemies {
        if state.rng.random_bool(chance) {
            muzzles.push(Vec2::new(enemy.pos.x + enemy.size.x / 2.0, enemy.pos.y));
        }
    }
    let speed = state.config.bullet_speed;
    for muzzle in muzzles {
        let id = state.next_entity_id();
        state.bullets.push(Bullet::enemy(id, muzzle, speed));
    }
}

/// One difficulty step: faster enemies, more frequent power-ups
pub fn raise_difficulty(state: &mut GameState) {
    let multiplier = state.config.difficulty_multiplier;
    for enemy in &mut state.enemies {
        enemy.speed *= multiplier;
    }
    state.spawner.enemy_speed *= multiplier;
    state.spawner.power_up_interval = (state.spawner.power_up_interval
        * state.config.power_up_interval_multiplier)
        .max(state.config.min_power_up_interval);
    state.spawner.difficulty_level += 1;

    let level = state.spawner.difficulty_level;
    log::info!(
        "Difficulty {}: enemy speed {:.1}, power-up every {:.2}s",
        level,
        state.spawner.enemy_speed,
        state.spawner.power_up_interval
    );
    state.events.push(GameEvent::DifficultyRaised { level });
}
