//! Collision detection and resolution
//!
//! All passes use mark-and-sweep: a scan only marks indices, removals are
//! applied after the scan finishes, so no element is skipped or visited twice.

use glam::Vec2;

use super::entity::{Body, BulletOwner, EnemyKind};
use super::powerup;
use super::state::{GameEvent, GameState, KillCause};

/// Bounding-box overlap between two bodies
#[inline]
pub fn collides(a: &impl Body, b: &impl Body) -> bool {
    a.bounds().intersects(&b.bounds())
}

/// Summary of one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    /// Enemies destroyed by player bullets
    pub enemies_shot: usize,
    /// Hits soaked up by the shield
    pub shield_hits: usize,
    pub power_ups_collected: usize,
    /// An unshielded hit ended the run; later passes were skipped
    pub fatal: bool,
}

/// Remove every element whose flag is set
fn sweep<T>(items: &mut Vec<T>, dead: &[bool]) {
    let mut idx = 0;
    items.retain(|_| {
        let keep = !dead[idx];
        idx += 1;
        keep
    });
}

/// Run every pass in order: bullets vs enemies, player vs enemies,
/// player vs enemy bullets, player vs power-ups
pub fn resolve(state: &mut GameState) -> CollisionReport {
    let mut report = CollisionReport {
        enemies_shot: bullets_vs_enemies(state),
        ..Default::default()
    };

    let contact = player_vs_enemies(state);
    report.shield_hits += contact.absorbed;
    if contact.fatal {
        report.fatal = true;
        return report;
    }

    let contact = player_vs_enemy_bullets(state);
    report.shield_hits += contact.absorbed;
    if contact.fatal {
        report.fatal = true;
        return report;
    }

    report.power_ups_collected = player_vs_power_ups(state);
    report
}

/// Each enemy takes the first unspent player bullet touching it.
/// Returns the number of enemies destroyed.
pub fn bullets_vs_enemies(state: &mut GameState) -> usize {
    let mut bullet_spent = vec![false; state.bullets.len()];
    let mut enemy_dead = vec![false; state.enemies.len()];

    for (ei, enemy) in state.enemies.iter().enumerate() {
        let enemy_box = enemy.bounds();
        let hit = (0..state.bullets.len()).find(|&bi| {
            let bullet = &state.bullets[bi];
            !bullet_spent[bi]
                && bullet.owner == BulletOwner::Player
                && bullet.bounds().intersects(&enemy_box)
        });
        if let Some(bi) = hit {
            bullet_spent[bi] = true;
            enemy_dead[ei] = true;
        }
    }

    let kills: Vec<(EnemyKind, Vec2)> = state
        .enemies
        .iter()
        .zip(&enemy_dead)
        .filter(|(_, dead)| **dead)
        .map(|(e, _)| (e.kind, e.center()))
        .collect();
    if kills.is_empty() {
        return 0;
    }

    sweep(&mut state.enemies, &enemy_dead);
    sweep(&mut state.bullets, &bullet_spent);

    for &(kind, at) in &kills {
        state.score += state.config.score_per_kill;
        state.spawn_explosion(at);
        state.events.push(GameEvent::EnemyDestroyed {
            kind,
            at,
            cause: KillCause::Bullet,
        });
    }
    kills.len()
}

/// Outcome of a hazard pass against the player
#[derive(Debug, Clone, Copy, Default)]
struct Contact {
    absorbed: usize,
    fatal: bool,
}

/// The shield absorbs one enemy (which is destroyed); any other contact is fatal
/// and stops the scan
fn player_vs_enemies(state: &mut GameState) -> Contact {
    let mut contact = Contact::default();
    let mut enemy_dead = vec![false; state.enemies.len()];
    let player_box = state.player.bounds();

    for (ei, enemy) in state.enemies.iter().enumerate() {
        if !enemy.bounds().intersects(&player_box) {
            continue;
        }
        if state.player.shield {
            state.player.shield = false;
            enemy_dead[ei] = true;
            contact.absorbed += 1;
        } else {
            contact.fatal = true;
            break;
        }
    }

    if contact.absorbed > 0 {
        let absorbed: Vec<(EnemyKind, Vec2)> = state
            .enemies
            .iter()
            .zip(&enemy_dead)
            .filter(|(_, dead)| **dead)
            .map(|(e, _)| (e.kind, e.center()))
            .collect();
        sweep(&mut state.enemies, &enemy_dead);
        for (kind, at) in absorbed {
            state.spawn_explosion(at);
            state.events.push(GameEvent::EnemyDestroyed {
                kind,
                at,
                cause: KillCause::Shield,
            });
        }
    }
    contact
}

/// Enemy bullets follow the same rule as enemy contact
fn player_vs_enemy_bullets(state: &mut GameState) -> Contact {
    let mut contact = Contact::default();
    let mut bullet_spent = vec![false; state.bullets.len()];
    let player_box = state.player.bounds();

    for (bi, bullet) in state.bullets.iter().enumerate() {
        if bullet.owner != BulletOwner::Enemy || !bullet.bounds().intersects(&player_box) {
            continue;
        }
        if state.player.shield {
            state.player.shield = false;
            bullet_spent[bi] = true;
            contact.absorbed += 1;
        } else {
            contact.fatal = true;
            break;
        }
    }

    if contact.absorbed > 0 {
        sweep(&mut state.bullets, &bullet_spent);
    }
    contact
}

/// Collect every touching power-up and apply its effect.
/// Returns the number collected.
fn player_vs_power_ups(state: &mut GameState) -> usize {
    let taken: Vec<bool> = state
        .power_ups
        .iter()
        .map(|p| collides(p, &state.player))
        .collect();
    let kinds: Vec<_> = state
        .power_ups
        .iter()
        .zip(&taken)
        .filter(|(_, hit)| **hit)
        .map(|(p, _)| p.kind)
        .collect();
    if kinds.is_empty() {
        return 0;
    }

    sweep(&mut state.power_ups, &taken);
    for &kind in &kinds {
        powerup::apply(state, kind);
    }
    kinds.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::entity::{Bullet, Enemy, PowerUp, PowerUpKind};

    fn empty_state() -> GameState {
        let config = GameConfig {
            enemy_spawn_interval: None,
            ..GameConfig::default()
        };
        GameState::new(config, 77)
    }

    fn add_enemy(state: &mut GameState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, EnemyKind::Ship, pos, 120.0));
        id
    }

    fn add_bullet(state: &mut GameState, muzzle: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.bullets.push(Bullet::player(id, muzzle, 0.0, 420.0));
        id
    }

    #[test]
    fn test_bullet_kills_enemy_and_scores() {
        let mut state = empty_state();
        add_enemy(&mut state, Vec2::new(100.0, 400.0));
        add_bullet(&mut state, Vec2::new(130.0, 410.0));

        let report = resolve(&mut state);
        assert_eq!(report.enemies_shot, 1);
        assert!(state.enemies.is_empty());
        assert!(state.bullets.is_empty());
        assert_eq!(state.score, 1);
        assert_eq!(state.particles.len(), state.config.particles_per_burst);
    }

    #[test]
    fn test_one_bullet_cannot_score_twice() {
        let mut state = empty_state();
        // Two overlapping enemies, one bullet inside both
        add_enemy(&mut state, Vec2::new(100.0, 400.0));
        add_enemy(&mut state, Vec2::new(110.0, 400.0));
        add_bullet(&mut state, Vec2::new(140.0, 420.0));

        let report = resolve(&mut state);
        assert_eq!(report.enemies_shot, 1);
        assert_eq!(state.score, 1);
        assert_eq!(state.enemies.len(), 1);
        // First enemy in order claims the bullet
        assert_eq!(state.enemies[0].pos.x, 110.0);
    }

    #[test]
    fn test_enemy_consumes_only_first_bullet() {
        let mut state = empty_state();
        add_enemy(&mut state, Vec2::new(100.0, 400.0));
        let first = add_bullet(&mut state, Vec2::new(120.0, 410.0));
        let second = add_bullet(&mut state, Vec2::new(140.0, 410.0));

        resolve(&mut state);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].id, second);
        assert_ne!(state.bullets[0].id, first);
    }

    #[test]
    fn test_enemy_bullets_do_not_hit_enemies() {
        let mut state = empty_state();
        add_enemy(&mut state, Vec2::new(100.0, 400.0));
        let id = state.next_entity_id();
        state
            .bullets
            .push(Bullet::enemy(id, Vec2::new(130.0, 450.0), 420.0));

        resolve(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_unshielded_contact_is_fatal() {
        let mut state = empty_state();
        state.player.pos = Vec2::new(400.0, 500.0);
        state.player.size = Vec2::new(60.0, 80.0);
        add_enemy(&mut state, Vec2::new(400.0, 500.0));

        let report = resolve(&mut state);
        assert!(report.fatal);
    }

    #[test]
    fn test_shield_absorbs_exactly_one() {
        let mut state = empty_state();
        state.player.shield = true;
        let player_pos = state.player.pos;
        let absorbed = add_enemy(&mut state, player_pos);

        let report = resolve(&mut state);
        assert!(!report.fatal);
        assert_eq!(report.shield_hits, 1);
        assert!(!state.player.shield);
        assert!(state.enemies.iter().all(|e| e.id != absorbed));
    }

    #[test]
    fn test_second_contact_after_shield_is_fatal() {
        let mut state = empty_state();
        state.player.shield = true;
        let player_pos = state.player.pos;
        add_enemy(&mut state, player_pos);
        add_enemy(&mut state, player_pos + Vec2::new(20.0, 0.0));

        let report = resolve(&mut state);
        assert!(report.fatal);
        assert_eq!(report.shield_hits, 1);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_fatal_contact_skips_power_ups() {
        let mut state = empty_state();
        let player_pos = state.player.pos;
        add_enemy(&mut state, player_pos);
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp::new(id, PowerUpKind::Shield, player_pos, 120.0));

        let report = resolve(&mut state);
        assert!(report.fatal);
        assert_eq!(state.power_ups.len(), 1);
        assert!(!state.player.shield);
    }

    #[test]
    fn test_enemy_bullet_against_shield_and_player() {
        let mut state = empty_state();
        state.player.shield = true;
        let muzzle = state.player.center();
        let id = state.next_entity_id();
        state.bullets.push(Bullet::enemy(id, muzzle, 420.0));
        let report = resolve(&mut state);
        assert!(!report.fatal);
        assert!(state.bullets.is_empty());

        let id = state.next_entity_id();
        state.bullets.push(Bullet::enemy(id, muzzle, 420.0));
        assert!(resolve(&mut state).fatal);
    }

    #[test]
    fn test_power_up_pickup() {
        let mut state = empty_state();
        let center = state.player.center();
        let id = state.next_entity_id();
        state
            .power_ups
            .push(PowerUp::new(id, PowerUpKind::RapidFire, center, 120.0));
        let id = state.next_entity_id();
        state.power_ups.push(PowerUp::new(
            id,
            PowerUpKind::Shield,
            Vec2::new(0.0, 580.0),
            120.0,
        ));

        let report = resolve(&mut state);
        assert_eq!(report.power_ups_collected, 1);
        assert_eq!(state.player.power_up_level, 1);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].kind, PowerUpKind::Shield);
    }

    #[test]
    fn test_collides_needs_overlap() {
        let a = Enemy::new(1, EnemyKind::Ship, Vec2::new(100.0, 100.0), 120.0);
        let touching = Enemy::new(2, EnemyKind::Ship, a.pos + Vec2::new(a.size.x, 0.0), 120.0);
        let overlapping = Enemy::new(3, EnemyKind::Ship, a.pos + a.size * 0.5, 120.0);
        assert!(!collides(&a, &touching));
        assert!(collides(&a, &overlapping));
        assert!(collides(&overlapping, &a));
    }

    #[test]
    fn test_sweep_preserves_order() {
        let mut items = vec![1, 2, 3, 4, 5];
        sweep(&mut items, &[false, true, false, true, false]);
        assert_eq!(items, vec![1, 3, 5]);
    }
}
