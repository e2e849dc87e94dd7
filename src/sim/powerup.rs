//! Power-up effects

use super::entity::PowerUpKind;
use super::state::{GameEvent, GameState, KillCause};

/// Apply a collected power-up to the session
pub fn apply(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Shield => {
            state.player.shield = true;
        }
        PowerUpKind::RapidFire => {
            state.player.raise_power_level();
            state.player.rapid_fire_timer = state.config.rapid_fire_duration;
        }
        PowerUpKind::Bomb => detonate_bomb(state),
        PowerUpKind::SpeedBoost => {
            state.player.speed = state.config.boost_speed;
            state.player.speed_boost_timer = state.config.speed_boost_duration;
        }
    }
    log::debug!("Applied {:?} power-up", kind);
    state.events.push(GameEvent::PowerUpCollected(kind));
}

/// Apply a power-up given by raw index. Out-of-range indices fail fast in
/// debug builds and are ignored otherwise.
pub fn apply_index(state: &mut GameState, index: u8) {
    match PowerUpKind::from_index(index) {
        Some(kind) => apply(state, kind),
        None => {
            debug_assert!(false, "power-up index {index} out of range");
            log::warn!("Ignoring out-of-range power-up index {}", index);
        }
    }
}

/// Destroy every live enemy, then refill the roster if the config keeps one
fn detonate_bomb(state: &mut GameState) {
    let destroyed = std::mem::take(&mut state.enemies);
    let count = destroyed.len() as u64;
    for enemy in &destroyed {
        let at = enemy.center();
        state.spawn_explosion(at);
        state.events.push(GameEvent::EnemyDestroyed {
            kind: enemy.kind,
            at,
            cause: KillCause::Bomb,
        });
    }
    if state.config.bomb_awards_score {
        state.score += count * state.config.score_per_kill;
    }
    state.fill_roster();
    log::debug!("Bomb destroyed {} enemies", count);
}
