//! Player controller: grid movement, aim, firing, traps, pickups and the
//! interact action.
//!
//! Functions here mutate the player (and whatever slices of the world they
//! are handed) in place and report outcomes that the orchestrator turns into
//! status changes or level transitions.

use glam::{DVec2, DVec3};
use tracing::{debug, info};

use crate::config::{Frame, GameConfig};
use crate::entities::{
    BulletOwner, Cell, CellPos, CoinLedger, DefeatCause, Enemy, Inventory, ItemMode, Player,
    Projectile,
};
use crate::maze::Maze;

/// Height of player bullets above the floor.
fn bullet_height(config: &GameConfig) -> f64 {
    10.0 + config.cell_size / 3.0
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn spawn(config: &GameConfig, (row, col): CellPos) -> Player {
    Player {
        row,
        col,
        angle: 0.0,
        health: config.initial_health,
        inventory: Inventory::default(),
        item_mode: None,
        last_hit_at: None,
        last_shot_at: None,
        immobilized_at: None,
        cloaked_at: None,
        ammo_used: 0,
        ammo_limit: config.initial_ammo_limit,
    }
}

/// World (x, z) of the player's cell centre.
pub fn world_position(player: &Player, maze: &Maze, config: &GameConfig) -> DVec2 {
    maze.to_world(player.row as f64, player.col as f64, config.cell_size)
}

// ── Timed statuses ───────────────────────────────────────────────────────────

pub fn immobilized(player: &Player, frame: Frame) -> bool {
    player
        .immobilized_at
        .is_some_and(|t| frame.since(t) <= frame.config.immobilize_ms)
}

/// Lapse the cloak and the immobilisation once their windows have passed.
pub fn expire_statuses(player: &mut Player, frame: Frame) {
    if let Some(t) = player.cloaked_at {
        if !frame.policy.indefinite_cloak && frame.since(t) > frame.config.cloak_ms {
            player.cloaked_at = None;
            info!("cloak expired");
        }
    }
    if let Some(t) = player.immobilized_at {
        if frame.since(t) > frame.config.immobilize_ms {
            player.immobilized_at = None;
            debug!("immobilisation lifted");
        }
    }
}

/// Apply one point of damage unless the player is invulnerable or still
/// inside the invincibility window. Returns whether damage was dealt.
pub fn take_hit(player: &mut Player, frame: Frame) -> bool {
    if frame.policy.invulnerable {
        return false;
    }
    if let Some(t) = player.last_hit_at {
        if frame.since(t) <= frame.config.player_invincibility_ms {
            return false;
        }
    }
    player.health = player.health.saturating_sub(1);
    player.last_hit_at = Some(frame.now);
    debug!(health = player.health, "player hit");
    true
}

pub fn heal(player: &mut Player, amount: u32, config: &GameConfig) {
    player.health = (player.health + amount).min(config.max_health);
}

// ── Movement ─────────────────────────────────────────────────────────────────

/// Add `degrees` to the aim, wrapped into [0, 360).
pub fn rotate(player: &mut Player, degrees: f64) {
    player.angle = (player.angle + degrees).rem_euclid(360.0);
}

/// Step one grid move along the aim (or against it). Returns whether the
/// player actually moved.
pub fn try_move(player: &mut Player, maze: &Maze, forward: bool, frame: Frame) -> bool {
    let rad = player.angle.to_radians();
    let sign = if forward { 1.0 } else { -1.0 };
    let dir = DVec2::new(-rad.sin(), rad.cos()) * sign;
    let reach = frame.config.player_step;

    let next = (
        player.row - (dir.y * reach).round() as i64,
        player.col + (dir.x * reach).round() as i64,
    );
    if next == player.cell() || !maze.player_can_enter(next, frame.policy.wall_phasing) {
        return false;
    }
    player.row = next.0;
    player.col = next.1;
    true
}

/// Resolve the trap under the player after a move.
pub fn step_on_trap(player: &mut Player, maze: &Maze, frame: Frame) -> Option<DefeatCause> {
    if frame.policy.ignore_traps {
        return None;
    }
    match maze.get(player.cell())? {
        Cell::ImmobilizeTrap => {
            player.immobilized_at = Some(frame.now);
            info!(row = player.row, col = player.col, "player immobilised");
            None
        }
        Cell::DeadlyTrap => Some(DefeatCause::DeadlyTrap),
        _ => None,
    }
}

/// Collect coins within reach of the player on `level` and pay out any coin
/// bonus whose threshold has now been crossed. Returns the number collected.
pub fn collect_coins(
    player: &mut Player,
    coins: &mut CoinLedger,
    level: usize,
    maze: &Maze,
    config: &GameConfig,
) -> usize {
    let here = world_position(player, maze, config);
    let reach = config.coin_pickup_radius();

    let in_reach: Vec<usize> = coins
        .positions
        .iter()
        .enumerate()
        .filter(|(_, c)| c.distance_squared(here) < reach * reach)
        .map(|(i, _)| i)
        .collect();

    let picked = in_reach
        .into_iter()
        .filter(|&i| coins.collect(level, i))
        .count();
    if picked == 0 {
        return 0;
    }

    let total = coins.total_collected();
    debug!(picked, total, "coins collected");
    for (tier, bonus) in config.coin_bonuses.iter().enumerate() {
        if total >= bonus.coins && coins.bonuses_granted.insert(tier) {
            player.ammo_limit = bonus.ammo_limit;
            heal(player, bonus.health, config);
            info!(coins = bonus.coins, ammo_limit = bonus.ammo_limit, "coin bonus");
        }
    }
    picked
}

// ── Firing ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    /// Immobilised or still on cooldown.
    Blocked,
    /// The limit was already reached; the run is lost.
    OutOfAmmo,
}

pub fn fire(
    player: &mut Player,
    bullets: &mut Vec<Projectile>,
    maze: &Maze,
    frame: Frame,
) -> FireOutcome {
    if immobilized(player, frame) {
        return FireOutcome::Blocked;
    }
    if let Some(t) = player.last_shot_at {
        if frame.since(t) < frame.config.player_fire_interval_ms {
            return FireOutcome::Blocked;
        }
    }
    if !frame.policy.unlimited_ammo {
        if player.ammo_used >= player.ammo_limit {
            return FireOutcome::OutOfAmmo;
        }
        player.ammo_used += 1;
    }
    player.last_shot_at = Some(frame.now);

    // Aim angle grows counter-clockwise; world x grows clockwise from north.
    let heading = (360.0 - player.angle).rem_euclid(360.0).to_radians();
    let dir = DVec2::new(heading.sin(), -heading.cos());
    let origin = world_position(player, maze, frame.config) + dir * frame.config.muzzle_distance();
    let speed = frame.policy.bullet_speed(frame.config);

    bullets.push(Projectile {
        pos: DVec3::new(origin.x, bullet_height(frame.config), origin.y),
        vel: DVec3::new(dir.x, 0.0, dir.y) * speed,
        created_at: frame.now,
        owner: BulletOwner::Player,
    });
    debug!(used = player.ammo_used, limit = player.ammo_limit, "player fired");
    FireOutcome::Fired
}

// ── Interact ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Standing on the exit with the key.
    ReachedExit,
    /// Standing on the exit without the key.
    MissingKey,
    PickedUp(ItemMode),
    DroppedKey,
    Cloaked,
    DeployedTrap { frozen: usize },
    Nothing,
}

/// Use whatever the player is standing on, or failing that, the selected
/// item. Pickups clear their cell and select the picked item.
pub fn interact(
    player: &mut Player,
    maze: &mut Maze,
    enemies: &mut [Enemy],
    freeze_traps: &mut Vec<CellPos>,
    frame: Frame,
) -> Interaction {
    let here = player.cell();
    let Some(cell) = maze.get(here) else {
        return Interaction::Nothing;
    };

    match cell {
        Cell::Exit if player.inventory.has_key => Interaction::ReachedExit,
        Cell::Exit => {
            info!("the exit needs the key");
            Interaction::MissingKey
        }
        Cell::Key if !player.inventory.has_key => {
            player.inventory.has_key = true;
            pick_up(player, maze, here, ItemMode::Key)
        }
        Cell::CloakPickup => {
            player.inventory.cloaks += 1;
            pick_up(player, maze, here, ItemMode::Cloak)
        }
        Cell::FreezeTrapPickup => {
            player.inventory.freeze_traps += 1;
            pick_up(player, maze, here, ItemMode::FreezeTrap)
        }
        _ => use_selected(player, maze, cell, enemies, freeze_traps, frame),
    }
}

fn pick_up(player: &mut Player, maze: &mut Maze, here: CellPos, item: ItemMode) -> Interaction {
    maze.set(here, Cell::Floor);
    player.item_mode = Some(item);
    info!(?item, "picked up");
    Interaction::PickedUp(item)
}

fn use_selected(
    player: &mut Player,
    maze: &mut Maze,
    cell: Cell,
    enemies: &mut [Enemy],
    freeze_traps: &mut Vec<CellPos>,
    frame: Frame,
) -> Interaction {
    let here = player.cell();
    match player.item_mode {
        Some(ItemMode::Key) if player.inventory.has_key && cell == Cell::Floor => {
            maze.set(here, Cell::Key);
            player.inventory.has_key = false;
            player.item_mode = None;
            info!(row = here.0, col = here.1, "key dropped");
            Interaction::DroppedKey
        }
        Some(ItemMode::Cloak) if player.inventory.cloaks > 0 && !player.is_cloaked() => {
            player.cloaked_at = Some(frame.now);
            player.inventory.cloaks -= 1;
            if player.inventory.cloaks == 0 {
                fall_back_selection(player);
            }
            info!(left = player.inventory.cloaks, "cloak activated");
            Interaction::Cloaked
        }
        Some(ItemMode::FreezeTrap) if player.inventory.freeze_traps > 0 && cell == Cell::Floor => {
            freeze_traps.push(here);
            player.inventory.freeze_traps -= 1;
            if player.inventory.freeze_traps == 0 {
                fall_back_selection(player);
            }
            let frozen = freeze_nearby(enemies, here, frame.now);
            info!(row = here.0, col = here.1, frozen, "freeze trap deployed");
            Interaction::DeployedTrap { frozen }
        }
        _ => Interaction::Nothing,
    }
}

fn fall_back_selection(player: &mut Player) {
    player.item_mode = player.inventory.has_key.then_some(ItemMode::Key);
}

/// Freeze every enemy within Manhattan distance 2 of `at`.
fn freeze_nearby(enemies: &mut [Enemy], (row, col): CellPos, now: u64) -> usize {
    let mut frozen = 0;
    for enemy in enemies.iter_mut() {
        let dist = (enemy.row - row as f64).abs() + (enemy.col - col as f64).abs();
        if dist <= 2.0 {
            enemy.frozen_at = Some(now);
            frozen += 1;
        }
    }
    frozen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationPolicy;

    #[test]
    fn rotate_wraps_both_ways() {
        let cfg = GameConfig::default();
        let mut p = spawn(&cfg, (1, 1));
        rotate(&mut p, -15.0);
        assert_eq!(p.angle, 345.0);
        rotate(&mut p, 30.0);
        assert_eq!(p.angle, 15.0);
    }

    #[test]
    fn invincibility_window_blocks_second_hit() {
        let cfg = GameConfig::default();
        let policy = SimulationPolicy::default();
        let mut p = spawn(&cfg, (1, 1));
        assert!(take_hit(&mut p, Frame::new(&cfg, &policy, 5_000)));
        assert!(!take_hit(&mut p, Frame::new(&cfg, &policy, 6_200)));
        assert!(take_hit(&mut p, Frame::new(&cfg, &policy, 6_201)));
        assert_eq!(p.health, cfg.initial_health - 2);
    }

    #[test]
    fn heal_is_capped() {
        let cfg = GameConfig::default();
        let mut p = spawn(&cfg, (1, 1));
        p.health = 98;
        heal(&mut p, 5, &cfg);
        assert_eq!(p.health, 100);
    }
}
