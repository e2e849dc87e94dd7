//! Entity model and per-entity motion rules
//!
//! World coordinates are y-up: the player sits near the bottom edge, enemies
//! and power-ups enter at the top and drift toward negative y. Every entity
//! position is the bottom-left corner of its bounding box.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::heading;
use crate::settings::GameConfig;

/// Sizes and lifetimes below this count as zero
pub const EXPIRY_EPSILON: f32 = 1e-4;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Bottom-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Box anchored at the origin, used for the playfield
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Overlap test; boxes that only share an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        self.min.x < b_max.x
            && other.min.x < a_max.x
            && self.min.y < b_max.y
            && other.min.y < a_max.y
    }

    /// True once no part of this box remains inside `field`
    pub fn is_outside(&self, field: &Aabb) -> bool {
        let max = self.max();
        let field_max = field.max();
        max.x < field.min.x
            || self.min.x > field_max.x
            || max.y < field.min.y
            || self.min.y > field_max.y
    }

    /// Bottom-left position that keeps a box of `size` fully inside this one
    pub fn clamp_min(&self, pos: Vec2, size: Vec2) -> Vec2 {
        let upper = (self.max() - size).max(self.min);
        pos.clamp(self.min, upper)
    }
}

/// Anything with a collision box
pub trait Body {
    fn bounds(&self) -> Aabb;
}

/// An entity that moves on its own and eventually leaves play
pub trait Mover: Body {
    fn advance(&mut self, dt: f32);
    fn is_gone(&self, field: &Aabb) -> bool;
}

/// Advance every entity and drop the ones that left play.
/// Returns how many were removed.
pub fn advance_all<T: Mover>(items: &mut Vec<T>, dt: f32, field: &Aabb) -> usize {
    let before = items.len();
    for item in items.iter_mut() {
        item.advance(dt);
    }
    items.retain(|item| !item.is_gone(field));
    before - items.len()
}

/// Bullet angles (degrees) for each power-up level
pub fn spread_angles(level: u8) -> &'static [f32] {
    const S: f32 = SPREAD_STEP_DEG;
    const LEVEL_0: [f32; 1] = [0.0];
    const LEVEL_1: [f32; 3] = [-S, 0.0, S];
    const LEVEL_2: [f32; 5] = [-2.0 * S, -S, 0.0, S, 2.0 * S];
    const LEVEL_3: [f32; 7] = [-3.0 * S, -2.0 * S, -S, 0.0, S, 2.0 * S, 3.0 * S];
    match level {
        0 => &LEVEL_0,
        1 => &LEVEL_1,
        2 => &LEVEL_2,
        _ => &LEVEL_3,
    }
}

/// Buffs that ran out during a timer update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpiredBuffs {
    pub speed_boost: bool,
    pub rapid_fire: bool,
}

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Momentum-scheme velocity (pixels/second)
    pub vel: Vec2,
    pub size: Vec2,
    pub base_speed: f32,
    /// Current speed, raised while a SpeedBoost is active
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    /// Per-frame velocity multiplier
    pub deceleration: f32,
    pub shield: bool,
    /// Spread level in [0, MAX_POWER_UP_LEVEL]
    pub power_up_level: u8,
    /// Seconds left on the speed boost
    pub speed_boost_timer: f32,
    /// Seconds left before one power-up level is lost
    pub rapid_fire_timer: f32,
}

impl Player {
    /// Fresh player centered horizontally near the bottom edge
    pub fn new(config: &GameConfig) -> Self {
        let size = Vec2::new(config.player_width, config.player_height);
        let field = Aabb::from_size(config.screen_width, config.screen_height);
        let start = Vec2::new(config.screen_width / 2.0 - size.x / 2.0, 100.0);
        Self {
            pos: field.clamp_min(start, size),
            vel: Vec2::ZERO,
            size,
            base_speed: config.base_speed,
            speed: config.base_speed,
            max_speed: config.max_speed,
            acceleration: config.acceleration,
            deceleration: config.deceleration,
            shield: false,
            power_up_level: 0,
            speed_boost_timer: 0.0,
            rapid_fire_timer: 0.0,
        }
    }

    /// Speed relative to cruising speed (1.0 unless boosted)
    pub fn speed_factor(&self) -> f32 {
        if self.base_speed > 0.0 {
            self.speed / self.base_speed
        } else {
            1.0
        }
    }

    /// Direct movement: position += direction * speed, diagonals scaled by 1/sqrt(2)
    pub fn move_direct(&mut self, dir: IVec2, dt: f32) {
        let mut step = dir.clamp(IVec2::splat(-1), IVec2::ONE).as_vec2();
        if step.x != 0.0 && step.y != 0.0 {
            step *= std::f32::consts::FRAC_1_SQRT_2;
        }
        self.pos += step * self.speed * dt;
    }

    /// Momentum movement: add an acceleration impulse per pressed axis
    pub fn accelerate(&mut self, impulse: IVec2) {
        let factor = self.speed_factor();
        let cap = self.max_speed * factor;
        let delta = impulse.as_vec2() * self.acceleration * factor;
        self.vel = (self.vel + delta).clamp(Vec2::splat(-cap), Vec2::splat(cap));
    }

    /// Zero the velocity on released axes
    pub fn stop_axes(&mut self, x: bool, y: bool) {
        if x {
            self.vel.x = 0.0;
        }
        if y {
            self.vel.y = 0.0;
        }
    }

    /// Momentum movement: position += velocity, then velocity decays by
    /// `deceleration` per reference frame, whatever the step size
    pub fn drift(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel *= self.deceleration.powf(dt * REFERENCE_FRAME_RATE);
        if self.vel.length_squared() < EXPIRY_EPSILON {
            self.vel = Vec2::ZERO;
        }
    }

    /// Keep the whole ship inside the playfield
    pub fn clamp_to(&mut self, field: &Aabb) {
        let clamped = field.clamp_min(self.pos, self.size);
        if clamped.x != self.pos.x {
            self.vel.x = 0.0;
        }
        if clamped.y != self.pos.y {
            self.vel.y = 0.0;
        }
        self.pos = clamped;
    }

    /// Count buff timers down, reverting effects that expire
    pub fn update_timers(&mut self, dt: f32) -> ExpiredBuffs {
        let mut expired = ExpiredBuffs::default();
        if self.speed_boost_timer > 0.0 {
            self.speed_boost_timer -= dt;
            if self.speed_boost_timer <= 0.0 {
                self.speed_boost_timer = 0.0;
                self.speed = self.base_speed;
                expired.speed_boost = true;
            }
        }
        if self.rapid_fire_timer > 0.0 {
            self.rapid_fire_timer -= dt;
            if self.rapid_fire_timer <= 0.0 {
                self.rapid_fire_timer = 0.0;
                self.power_up_level = self.power_up_level.saturating_sub(1);
                expired.rapid_fire = true;
            }
        }
        expired
    }

    /// Raise the spread level by one, capped at the maximum
    pub fn raise_power_level(&mut self) {
        self.power_up_level = (self.power_up_level + 1).min(MAX_POWER_UP_LEVEL);
    }

    /// Angles of the volley fired at the current level
    pub fn bullet_angles(&self) -> &'static [f32] {
        spread_angles(self.power_up_level)
    }

    /// Top-center of the ship, where bullets leave
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

impl Body for Player {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Ship,
    Ufo,
}

impl EnemyKind {
    pub fn size(&self) -> Vec2 {
        match self {
            EnemyKind::Ship => Vec2::new(SHIP_WIDTH, SHIP_HEIGHT),
            EnemyKind::Ufo => Vec2::new(UFO_WIDTH, UFO_HEIGHT),
        }
    }
}

/// An enemy descending toward the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Downward speed (pixels/second), always positive
    pub speed: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, speed: f32) -> Self {
        debug_assert!(speed > 0.0, "enemy speed must be positive");
        Self {
            id,
            kind,
            pos,
            size: kind.size(),
            speed,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

impl Body for Enemy {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

impl Mover for Enemy {
    fn advance(&mut self, dt: f32) {
        self.pos.y -= self.speed * dt;
    }

    /// Gone once its top edge drops below the playfield
    fn is_gone(&self, field: &Aabb) -> bool {
        self.bounds().max().y < field.min.y
    }
}

/// Who fired a bullet; decides its vertical direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

impl BulletOwner {
    /// +1 for upward travel, -1 for downward
    pub fn vertical_sign(&self) -> f32 {
        match self {
            BulletOwner::Player => 1.0,
            BulletOwner::Enemy => -1.0,
        }
    }
}

/// A projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub owner: BulletOwner,
    pub pos: Vec2,
    pub size: Vec2,
    /// Degrees from the direction of travel, positive = toward +x
    pub angle: f32,
    pub speed: f32,
}

impl Bullet {
    /// Player bullet whose bottom-center sits at `muzzle`
    pub fn player(id: u32, muzzle: Vec2, angle: f32, speed: f32) -> Self {
        let size = Vec2::new(BULLET_WIDTH, BULLET_HEIGHT);
        Self {
            id,
            owner: BulletOwner::Player,
            pos: Vec2::new(muzzle.x - size.x / 2.0, muzzle.y),
            size,
            angle,
            speed,
        }
    }

    /// Enemy bullet whose top-center sits at `muzzle`
    pub fn enemy(id: u32, muzzle: Vec2, speed: f32) -> Self {
        let size = Vec2::new(BULLET_WIDTH, BULLET_HEIGHT);
        Self {
            id,
            owner: BulletOwner::Enemy,
            pos: Vec2::new(muzzle.x - size.x / 2.0, muzzle.y - size.y),
            size,
            angle: 0.0,
            speed,
        }
    }
}

impl Body for Bullet {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

impl Mover for Bullet {
    fn advance(&mut self, dt: f32) {
        let dir = heading(self.angle);
        self.pos.x += self.speed * dir.x * dt;
        self.pos.y += self.owner.vertical_sign() * self.speed * dir.y * dt;
    }

    fn is_gone(&self, field: &Aabb) -> bool {
        self.bounds().is_outside(field)
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    RapidFire,
    Bomb,
    SpeedBoost,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::Bomb,
        PowerUpKind::SpeedBoost,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(&self) -> u8 {
        match self {
            PowerUpKind::Shield => 0,
            PowerUpKind::RapidFire => 1,
            PowerUpKind::Bomb => 2,
            PowerUpKind::SpeedBoost => 3,
        }
    }
}

/// A falling power-up capsule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
}

impl PowerUp {
    pub fn new(id: u32, kind: PowerUpKind, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size: Vec2::splat(POWER_UP_SIZE),
            speed,
        }
    }
}

impl Body for PowerUp {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

impl Mover for PowerUp {
    fn advance(&mut self, dt: f32) {
        self.pos.y -= self.speed * dt;
    }

    fn is_gone(&self, field: &Aabb) -> bool {
        self.bounds().max().y < field.min.y
    }
}

/// A particle for explosion effects (not gameplay-affecting)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Constant drift (pixels/second)
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
    /// Seconds remaining
    pub lifetime: f32,
}

impl Particle {
    pub fn is_expired(&self) -> bool {
        self.size <= EXPIRY_EPSILON || self.lifetime <= EXPIRY_EPSILON
    }
}

impl Body for Particle {
    fn bounds(&self) -> Aabb {
        Aabb::new(self.pos - Vec2::splat(self.size / 2.0), Vec2::splat(self.size))
    }
}

impl Mover for Particle {
    /// Shrinks at size/lifetime per second so it vanishes exactly as its life runs out
    fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        if dt >= self.lifetime {
            self.size = 0.0;
            self.lifetime = 0.0;
            return;
        }
        self.size -= self.size / self.lifetime * dt;
        self.lifetime -= dt;
    }

    fn is_gone(&self, _field: &Aabb) -> bool {
        self.is_expired()
    }
}
