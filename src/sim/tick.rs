//! Per-frame simulation tick
//!
//! One call advances the session by one frame in a fixed order:
//! input, motion, spawning, collisions.

use glam::IVec2;

use super::collision;
use super::entity::{Bullet, advance_all};
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use crate::settings::ControlScheme;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held direction, each component in [-1, 1]
    pub axis: IVec2,
    /// Acceleration impulses this frame (momentum scheme)
    pub impulse: IVec2,
    /// Horizontal movement key released this frame
    pub release_x: bool,
    /// Vertical movement key released this frame
    pub release_y: bool,
    /// Shoot pressed this frame
    pub shoot: bool,
    /// Shoot is being held
    pub shoot_held: bool,
    /// Pause toggle
    pub pause: bool,
    pub quit: bool,
    /// Start a new run (only honoured after game over)
    pub restart: bool,
}

impl TickInput {
    /// True if any edge-triggered field is set
    pub fn has_one_shots(&self) -> bool {
        self.impulse != IVec2::ZERO
            || self.release_x
            || self.release_y
            || self.shoot
            || self.pause
            || self.quit
            || self.restart
    }

    /// Keep held state only; edges apply to a single tick
    pub fn clear_one_shots(&mut self) {
        *self = Self {
            axis: self.axis,
            shoot_held: self.shoot_held,
            ..Self::default()
        };
    }

    /// Fold a newer input on top of one that has not been ticked yet.
    /// Held state comes from `next`; edges from both are kept.
    pub fn merge(&mut self, next: TickInput) {
        self.axis = next.axis;
        self.shoot_held = next.shoot_held;
        self.impulse = (self.impulse + next.impulse).clamp(IVec2::splat(-1), IVec2::ONE);
        self.release_x |= next.release_x;
        self.release_y |= next.release_y;
        self.shoot |= next.shoot;
        // Two pause presses in one frame cancel out
        self.pause ^= next.pause;
        self.quit |= next.quit;
        self.restart |= next.restart;
    }
}

/// Advance the session by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.quit && state.phase != GamePhase::Terminated {
        state.phase = GamePhase::Terminated;
        state.events.push(GameEvent::Terminated);
        log::info!("Quit requested (score {})", state.score);
        return;
    }

    match state.phase {
        GamePhase::Terminated => return,
        GamePhase::GameOver => {
            if input.restart {
                state.restart();
            }
            return;
        }
        GamePhase::Paused => {
            if !input.pause {
                return;
            }
            state.phase = GamePhase::Playing;
            state.events.push(GameEvent::Resumed);
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
        }
    }

    state.time_ticks += 1;

    steer_player(state, input, dt);
    handle_fire(state, input, dt);

    advance_motion(state, dt);

    spawner::update(state, dt);

    let report = collision::resolve(state);
    if report.fatal {
        game_over(state);
    }
}

/// Apply directional input according to the control scheme
fn steer_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let player = &mut state.player;
    match state.config.control_scheme {
        ControlScheme::Discrete => player.move_direct(input.axis, dt),
        ControlScheme::Momentum => {
            player.stop_axes(input.release_x, input.release_y);
            player.accelerate(input.impulse);
            player.drift(dt);
        }
    }
    let field = state.playfield();
    state.player.clamp_to(&field);
}

/// A press fires at once; holding fires again every `shoot_delay`
fn handle_fire(state: &mut GameState, input: &TickInput, dt: f32) {
    state.shoot_timer += dt;
    let held_ready =
        state.config.auto_fire && input.shoot_held && state.shoot_timer >= state.config.shoot_delay;
    if input.shoot || held_ready {
        shoot(state);
    }
}

/// Fire one volley at the player's current spread level.
/// Returns the number of bullets created.
pub fn shoot(state: &mut GameState) -> usize {
    let muzzle = state.player.muzzle();
    let speed = state.config.bullet_speed;
    let angles = state.player.bullet_angles();
    for &angle in angles {
        let id = state.next_entity_id();
        state.bullets.push(Bullet::player(id, muzzle, angle, speed));
    }
    state.shoot_timer = 0.0;
    state.events.push(GameEvent::Shot {
        bullets: angles.len(),
    });
    angles.len()
}

/// Move every entity, count buff timers down and drop what left play
fn advance_motion(state: &mut GameState, dt: f32) {
    let expired = state.player.update_timers(dt);
    if expired.speed_boost {
        state.events.push(GameEvent::SpeedBoostExpired);
    }
    if expired.rapid_fire {
        state.events.push(GameEvent::RapidFireExpired);
    }

    let field = state.playfield();
    let escaped = advance_all(&mut state.enemies, dt, &field);
    if escaped > 0 {
        log::debug!("{} enemies left the playfield", escaped);
    }
    advance_all(&mut state.bullets, dt, &field);
    advance_all(&mut state.power_ups, dt, &field);
    advance_all(&mut state.particles, dt, &field);
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.events.push(GameEvent::GameOver { score: state.score });
    log::info!("Game over - final score {}", state.score);
}
