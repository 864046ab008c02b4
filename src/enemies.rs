//! Enemy AI: roster spawning, freeze handling, contact damage, patrol and
//! chase for regular enemies, homing for the boss, and enemy fire.

use glam::{DVec2, DVec3};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::{Frame, GameConfig};
use crate::entities::{
    BulletOwner, Cell, CellPos, Direction, Enemy, EnemyKind, Player, Projectile,
};
use crate::maze::Maze;
use crate::player;

/// Hit-test height of a regular enemy.
pub const REGULAR_HEIGHT: f64 = 150.0;
/// Hit-test and muzzle height of the boss.
pub const BOSS_HEIGHT: f64 = 200.0;
/// Mean muzzle height of a hovering regular enemy.
const REGULAR_MUZZLE_HEIGHT: f64 = 200.0;

// ── Spawning ─────────────────────────────────────────────────────────────────

/// Build the roster for a freshly loaded level. Spawn markers are turned into
/// floor as their enemies are created, in row-major order.
pub fn spawn_roster(
    maze: &mut Maze,
    boss_arena: bool,
    config: &GameConfig,
    level_index: usize,
    now: u64,
) -> Vec<Enemy> {
    if boss_arena {
        let (row, col) = maze.center();
        info!(row, col, "boss spawned");
        return vec![Enemy {
            row: row as f64,
            col: col as f64,
            facing: Direction::North,
            last_move_at: now,
            last_shot_at: now,
            rotation: 0.0,
            frozen_at: None,
            kind: EnemyKind::Boss {
                health: config.boss_health,
            },
        }];
    }

    let mut rng = StdRng::seed_from_u64(config.enemy_seed.wrapping_add(level_index as u64));
    let markers: Vec<CellPos> = maze
        .iter()
        .filter(|(_, cell)| *cell == Cell::EnemySpawn)
        .map(|(pos, _)| pos)
        .collect();

    let mut roster = Vec::with_capacity(markers.len());
    for pos in markers {
        let facing = initial_facing(maze, pos, &mut rng);
        maze.set(pos, Cell::Floor);
        roster.push(Enemy {
            row: pos.0 as f64,
            col: pos.1 as f64,
            facing,
            last_move_at: now,
            last_shot_at: now,
            rotation: 0.0,
            frozen_at: None,
            kind: EnemyKind::Regular,
        });
    }
    debug!(count = roster.len(), level = level_index, "enemies spawned");
    roster
}

/// Random heading toward an adjacent floor cell, or any heading if boxed in.
fn initial_facing(maze: &Maze, (row, col): CellPos, rng: &mut StdRng) -> Direction {
    let open: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| {
            let (dr, dc) = d.offset();
            maze.get((row + dr, col + dc)) == Some(Cell::Floor)
        })
        .collect();
    let pool: &[Direction] = if open.is_empty() { &Direction::ALL } else { &open };
    pool.choose(rng).copied().unwrap_or(Direction::North)
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Everything one enemy may touch besides itself.
struct Surroundings<'w> {
    maze: &'w Maze,
    player: &'w mut Player,
    freeze_traps: &'w mut Vec<CellPos>,
    hostile_bullets: &'w mut Vec<Projectile>,
}

/// Advance every enemy by one tick, in roster order.
pub fn update_all(
    enemies: &mut [Enemy],
    maze: &Maze,
    player: &mut Player,
    freeze_traps: &mut Vec<CellPos>,
    hostile_bullets: &mut Vec<Projectile>,
    frame: Frame,
) {
    let mut world = Surroundings {
        maze,
        player,
        freeze_traps,
        hostile_bullets,
    };
    for (idx, enemy) in enemies.iter_mut().enumerate() {
        if !well_formed(enemy, maze) {
            warn!(idx, row = enemy.row, col = enemy.col, "skipping malformed enemy");
            continue;
        }
        update_one(enemy, &mut world, frame);
    }
}

fn well_formed(enemy: &Enemy, maze: &Maze) -> bool {
    enemy.row.is_finite() && enemy.col.is_finite() && maze.in_bounds(enemy.cell())
}

fn update_one(enemy: &mut Enemy, world: &mut Surroundings, frame: Frame) {
    let here = enemy.cell();
    trigger_trap(enemy, here, world.freeze_traps, frame.now);
    let frozen = is_frozen(enemy, frame);

    // Contact is checked even while frozen.
    if within(enemy, world.player, 0.5, true) {
        player::take_hit(world.player, frame);
    }

    if frozen {
        spin(enemy, frame.config.enemy_rotation_speed * 0.2);
        return;
    }

    spin(enemy, frame.config.enemy_rotation_speed);
    match enemy.kind {
        EnemyKind::Boss { .. } => boss_step(enemy, world, frame),
        EnemyKind::Regular => regular_step(enemy, world, frame),
    }
}

fn spin(enemy: &mut Enemy, degrees: f64) {
    enemy.rotation = (enemy.rotation + degrees) % 360.0;
}

/// Frozen now? Clears an elapsed freeze as a side effect.
fn is_frozen(enemy: &mut Enemy, frame: Frame) -> bool {
    match enemy.frozen_at {
        None => false,
        Some(t) if frame.policy.indefinite_freeze || frame.since(t) < frame.config.freeze_ms => {
            true
        }
        Some(_) => {
            enemy.frozen_at = None;
            debug!(row = enemy.row, col = enemy.col, "enemy thawed");
            false
        }
    }
}

/// Consume a freeze trap at `cell`, if any. Returns whether one fired.
fn trigger_trap(enemy: &mut Enemy, cell: CellPos, traps: &mut Vec<CellPos>, now: u64) -> bool {
    let Some(idx) = traps.iter().position(|t| *t == cell) else {
        return false;
    };
    traps.remove(idx);
    enemy.frozen_at = Some(now);
    info!(row = cell.0, col = cell.1, "enemy caught in freeze trap");
    true
}

/// Both grid coordinates within `reach` of the player's cell.
fn within(enemy: &Enemy, player: &Player, reach: f64, inclusive: bool) -> bool {
    let dr = (enemy.row - player.row as f64).abs();
    let dc = (enemy.col - player.col as f64).abs();
    if inclusive {
        dr <= reach && dc <= reach
    } else {
        dr < reach && dc < reach
    }
}

// ── Boss ─────────────────────────────────────────────────────────────────────

fn boss_step(enemy: &mut Enemy, world: &mut Surroundings, frame: Frame) {
    if world.player.is_cloaked() {
        return;
    }
    let start = DVec2::new(enemy.col, enemy.row);
    let target = DVec2::new(world.player.col as f64, world.player.row as f64);
    let to = target - start;
    let next = start + to / to.length().max(1.0) * frame.config.boss_step;

    let next_cell = (next.y.round() as i64, next.x.round() as i64);
    if !trigger_trap(enemy, next_cell, world.freeze_traps, frame.now) {
        enemy.row = next.y;
        enemy.col = next.x;
        if within(enemy, world.player, 0.5, false) {
            player::take_hit(world.player, frame);
        }
    }

    if frame.since(enemy.last_shot_at) > frame.config.enemy_fire_interval_ms {
        boss_fire(start.y, start.x, world, frame);
        enemy.last_shot_at = frame.now;
    }
}

/// Aimed straight at the player, from the boss's pre-move position.
fn boss_fire(row: f64, col: f64, world: &mut Surroundings, frame: Frame) {
    let cs = frame.config.cell_size;
    let from = world.maze.to_world(row, col, cs);
    let to = player::world_position(world.player, world.maze, frame.config);
    let delta = to - from;
    let dir = delta / delta.length().max(1.0);

    world.hostile_bullets.push(Projectile {
        pos: DVec3::new(from.x, BOSS_HEIGHT, from.y),
        vel: DVec3::new(dir.x, 0.0, dir.y) * frame.config.boss_bullet_speed,
        created_at: frame.now,
        owner: BulletOwner::Hostile,
    });
}

// ── Regular ──────────────────────────────────────────────────────────────────

fn regular_step(enemy: &mut Enemy, world: &mut Surroundings, frame: Frame) {
    let here = enemy.cell();
    let target = world.player.cell();
    let move_due = frame.since(enemy.last_move_at) >= frame.config.enemy_move_interval_ms;

    if !world.player.is_cloaked() && world.maze.line_of_sight(here, target) {
        let facing = facing_toward(here, target);
        enemy.facing = facing;
        if move_due {
            try_step(enemy, facing, world, frame);
        }
        if frame.since(enemy.last_shot_at) > frame.config.enemy_fire_interval_ms
            && aimed_fire(here, target, world, frame)
        {
            enemy.last_shot_at = frame.now;
        }
    } else if move_due {
        let facing = enemy.facing;
        for dir in [facing, facing.reverse(), facing.right(), facing.left()] {
            if try_step(enemy, dir, world, frame) {
                break;
            }
        }
    }
}

/// Same row or column picks that axis; otherwise the axis with the larger
/// displacement.
pub fn facing_toward((r0, c0): CellPos, (r1, c1): CellPos) -> Direction {
    let (dr, dc) = (r1 - r0, c1 - c0);
    if dr == 0 || (dc != 0 && dc.abs() > dr.abs()) {
        if dc > 0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if dr > 0 {
        Direction::South
    } else {
        Direction::North
    }
}

/// Move one cell in `dir` if walkable. Returns whether the enemy moved.
fn try_step(enemy: &mut Enemy, dir: Direction, world: &mut Surroundings, frame: Frame) -> bool {
    let (row, col) = enemy.cell();
    let (dr, dc) = dir.offset();
    let next = (row + dr, col + dc);
    if !world.maze.enemy_can_enter(next) {
        return false;
    }

    enemy.row = next.0 as f64;
    enemy.col = next.1 as f64;
    enemy.facing = dir;
    enemy.last_move_at = frame.now;

    if within(enemy, world.player, 0.5, false) {
        player::take_hit(world.player, frame);
    }
    trigger_trap(enemy, next, world.freeze_traps, frame.now);
    true
}

/// Shoot along the shared row or column. Returns false when not aligned.
fn aimed_fire(from: CellPos, to: CellPos, world: &mut Surroundings, frame: Frame) -> bool {
    let dir = if from.0 == to.0 {
        DVec2::new(if to.1 > from.1 { 1.0 } else { -1.0 }, 0.0)
    } else if from.1 == to.1 {
        DVec2::new(0.0, if to.0 > from.0 { 1.0 } else { -1.0 })
    } else {
        return false;
    };

    let cfg = frame.config;
    let origin = world.maze.to_world(from.0 as f64, from.1 as f64, cfg.cell_size)
        + dir * cfg.enemy_muzzle_offset();
    // Muzzle bobs with the enemy's hover.
    let height = REGULAR_MUZZLE_HEIGHT + 20.0 * (frame.now as f64 * 0.003).sin();

    world.hostile_bullets.push(Projectile {
        pos: DVec3::new(origin.x, height, origin.y),
        vel: DVec3::new(dir.x, 0.0, dir.y) * cfg.bullet_speed,
        created_at: frame.now,
        owner: BulletOwner::Hostile,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_prefers_shared_axis() {
        assert_eq!(facing_toward((3, 3), (3, 7)), Direction::East);
        assert_eq!(facing_toward((3, 3), (3, 1)), Direction::West);
        assert_eq!(facing_toward((3, 3), (6, 3)), Direction::South);
        assert_eq!(facing_toward((3, 3), (1, 3)), Direction::North);
        assert_eq!(facing_toward((3, 3), (4, 9)), Direction::East);
        assert_eq!(facing_toward((3, 3), (9, 4)), Direction::South);
    }

    #[test]
    fn spawn_markers_become_floor() {
        let mut maze = Maze::parse("11111\n13051\n10501\n11111").unwrap();
        let roster = spawn_roster(&mut maze, false, &GameConfig::default(), 0, 0);
        assert_eq!(roster.len(), 2);
        assert_eq!(maze.find(Cell::EnemySpawn), None);
        assert_eq!((roster[0].row, roster[0].col), (1.0, 3.0));
        assert_eq!((roster[1].row, roster[1].col), (2.0, 2.0));
    }
}
