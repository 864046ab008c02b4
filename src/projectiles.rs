//! Projectile integration with swept wall collision and hit resolution.
//!
//! Each tick a bullet is, in order: expired by age, dropped if its new cell
//! or any cell it skipped over blocks projectiles, then tested against the
//! actors it can hurt. Survivors keep flying.

use tracing::{debug, info};

use crate::config::Frame;
use crate::enemies::{BOSS_HEIGHT, REGULAR_HEIGHT};
use crate::entities::{Enemy, EnemyKind, Player, Projectile};
use crate::maze::{grid_line, Maze};
use crate::player;

/// Height the player is hit-tested at.
pub const PLAYER_HEIGHT: f64 = 150.0;

/// Why a bullet stopped flying before hit tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Expired,
    Wall,
}

/// Advance both bullet collections one tick.
pub fn advance_all(
    player_bullets: &mut Vec<Projectile>,
    hostile_bullets: &mut Vec<Projectile>,
    maze: &Maze,
    enemies: &mut Vec<Enemy>,
    player: &mut Player,
    frame: Frame,
) {
    advance_player_bullets(player_bullets, maze, enemies, frame);
    advance_hostile_bullets(hostile_bullets, maze, player, frame);
}

/// Player bullets hurt enemies. The first enemy in roster order that a bullet
/// overlaps takes the hit.
pub fn advance_player_bullets(
    bullets: &mut Vec<Projectile>,
    maze: &Maze,
    enemies: &mut Vec<Enemy>,
    frame: Frame,
) {
    bullets.retain_mut(|b| {
        if let Err(why) = fly(b, maze, frame) {
            debug!(?why, "player bullet removed");
            return false;
        }
        let Some(idx) = enemies.iter().position(|e| overlaps(b, e, maze, frame)) else {
            return true;
        };
        damage_enemy(enemies, idx);
        false
    });
}

/// Hostile bullets hurt the player. A bullet that overlaps the player is
/// spent even when the hit is absorbed by invulnerability or invincibility.
pub fn advance_hostile_bullets(
    bullets: &mut Vec<Projectile>,
    maze: &Maze,
    player: &mut Player,
    frame: Frame,
) {
    bullets.retain_mut(|b| {
        if fly(b, maze, frame).is_err() {
            return false;
        }
        let target = player::world_position(player, maze, frame.config);
        let dx = b.pos.x - target.x;
        let dz = b.pos.z - target.y;
        let r = frame.config.hit_radius();
        if dx * dx + dz * dz < r * r && (b.pos.y - PLAYER_HEIGHT).abs() < frame.config.hit_band() {
            player::take_hit(player, frame);
            return false;
        }
        true
    });
}

/// Age, move and sweep one bullet. On error the bullet is gone.
pub fn fly(bullet: &mut Projectile, maze: &Maze, frame: Frame) -> Result<(), Removal> {
    if frame.since(bullet.created_at) > frame.config.bullet_lifetime_ms {
        return Err(Removal::Expired);
    }

    let cs = frame.config.cell_size;
    let from = maze.cell_at(bullet.pos.x, bullet.pos.z, cs);
    let next = bullet.pos + bullet.vel;
    let to = maze.cell_at(next.x, next.z, cs);

    if maze.blocks_projectile(to) {
        return Err(Removal::Wall);
    }
    if from != to {
        let line = grid_line(from, to);
        let skipped = &line[1..line.len() - 1];
        if skipped.iter().any(|&cell| maze.blocks_projectile(cell)) {
            return Err(Removal::Wall);
        }
    }

    bullet.pos = next;
    Ok(())
}

fn overlaps(bullet: &Projectile, enemy: &Enemy, maze: &Maze, frame: Frame) -> bool {
    let at = maze.to_world(enemy.row, enemy.col, frame.config.cell_size);
    let height = if enemy.is_boss() { BOSS_HEIGHT } else { REGULAR_HEIGHT };
    let dx = bullet.pos.x - at.x;
    let dz = bullet.pos.z - at.y;
    let r = frame.config.hit_radius();
    dx * dx + dz * dz < r * r && (bullet.pos.y - height).abs() < frame.config.hit_band()
}

/// Regular enemies die outright; the boss loses one health and dies at zero.
fn damage_enemy(enemies: &mut Vec<Enemy>, idx: usize) {
    let dead = match &mut enemies[idx].kind {
        EnemyKind::Boss { health } => {
            *health = health.saturating_sub(1);
            debug!(health = *health, "boss hit");
            *health == 0
        }
        EnemyKind::Regular => true,
    };
    if !dead {
        return;
    }
    let e = enemies.remove(idx);
    if e.is_boss() {
        info!("boss defeated");
    } else {
        info!(row = e.row, col = e.col, "enemy destroyed");
    }
}
