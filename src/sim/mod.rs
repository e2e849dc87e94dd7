//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Seeded RNG only
//! - Caller-supplied timestep
//! - No rendering, audio or input dependencies

pub mod collision;
pub mod entity;
pub mod input;
pub mod powerup;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{CollisionReport, collides};
pub use entity::{
    Aabb, Body, Bullet, BulletOwner, Enemy, EnemyKind, Mover, Particle, Player, PowerUp,
    PowerUpKind, spread_angles,
};
pub use input::{Command, Controls, HeldKeys, InputEvent, InputFrame};
pub use spawner::Spawner;
pub use state::{FrameSnapshot, GameEvent, GamePhase, GameState, KillCause};
pub use tick::{TickInput, shoot, tick};
