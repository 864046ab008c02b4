use glam::DVec2;

use maze_hunter::config::{CoinBonus, Frame, GameConfig, SimulationPolicy};
use maze_hunter::entities::*;
use maze_hunter::maze::Maze;
use maze_hunter::player::{self, FireOutcome, Interaction};

const ROOM: &str = "
1111111
1000001
1000001
1000001
1000001
1000001
1111111
";

fn setup(at: CellPos) -> (GameConfig, SimulationPolicy, Maze, Player) {
    let cfg = GameConfig::default();
    let p = player::spawn(&cfg, at);
    (cfg, SimulationPolicy::default(), Maze::parse(ROOM).unwrap(), p)
}

fn idle(row: i64, col: i64) -> Enemy {
    Enemy {
        row: row as f64,
        col: col as f64,
        facing: Direction::North,
        last_move_at: 0,
        last_shot_at: 0,
        rotation: 0.0,
        frozen_at: None,
        kind: EnemyKind::Regular,
    }
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn forward_follows_the_aim() {
    let (cfg, policy, maze, mut p) = setup((3, 3));
    let frame = Frame::new(&cfg, &policy, 0);

    assert!(player::try_move(&mut p, &maze, true, frame));
    assert_eq!(p.cell(), (2, 3)); // north

    player::rotate(&mut p, 90.0);
    assert!(player::try_move(&mut p, &maze, true, frame));
    assert_eq!(p.cell(), (2, 2)); // west

    assert!(player::try_move(&mut p, &maze, false, frame));
    assert_eq!(p.cell(), (2, 3)); // backing up goes east
}

#[test]
fn diagonal_aim_moves_diagonally() {
    let (cfg, policy, maze, mut p) = setup((3, 3));
    player::rotate(&mut p, 45.0);
    assert!(player::try_move(&mut p, &maze, true, Frame::new(&cfg, &policy, 0)));
    assert_eq!(p.cell(), (2, 2));
}

#[test]
fn walls_and_boundary_block_unless_phasing() {
    let (cfg, mut policy, maze, mut p) = setup((1, 1));
    assert!(!player::try_move(&mut p, &maze, true, Frame::new(&cfg, &policy, 0)));
    assert_eq!(p.cell(), (1, 1));

    policy.wall_phasing = true;
    assert!(player::try_move(&mut p, &maze, true, Frame::new(&cfg, &policy, 0)));
    assert_eq!(p.cell(), (0, 1));
    // Never off the grid.
    assert!(!player::try_move(&mut p, &maze, true, Frame::new(&cfg, &policy, 0)));
    assert_eq!(p.cell(), (0, 1));
}

#[test]
fn traps_immobilise_or_kill() {
    let (cfg, mut policy, mut maze, mut p) = setup((2, 2));
    maze.set((2, 2), Cell::ImmobilizeTrap);
    assert_eq!(player::step_on_trap(&mut p, &maze, Frame::new(&cfg, &policy, 50)), None);
    assert_eq!(p.immobilized_at, Some(50));

    maze.set((2, 2), Cell::DeadlyTrap);
    assert_eq!(
        player::step_on_trap(&mut p, &maze, Frame::new(&cfg, &policy, 60)),
        Some(DefeatCause::DeadlyTrap)
    );

    policy.ignore_traps = true;
    assert_eq!(player::step_on_trap(&mut p, &maze, Frame::new(&cfg, &policy, 70)), None);
}

#[test]
fn statuses_expire_after_their_windows() {
    let (cfg, policy, _, mut p) = setup((2, 2));
    p.immobilized_at = Some(0);
    p.cloaked_at = Some(0);

    player::expire_statuses(&mut p, Frame::new(&cfg, &policy, 2500));
    assert!(p.is_immobilized());
    player::expire_statuses(&mut p, Frame::new(&cfg, &policy, 2501));
    assert!(!p.is_immobilized());
    assert!(p.is_cloaked());

    player::expire_statuses(&mut p, Frame::new(&cfg, &policy, 7001));
    assert!(!p.is_cloaked());
}

// ── Firing ────────────────────────────────────────────────────────────────────

#[test]
fn bullet_spawns_at_the_muzzle_heading_north() {
    let (cfg, policy, maze, mut p) = setup((3, 3));
    let mut bullets = Vec::new();

    let out = player::fire(&mut p, &mut bullets, &maze, Frame::new(&cfg, &policy, 100));
    assert_eq!(out, FireOutcome::Fired);
    assert_eq!(p.ammo_used, 1);

    let b = &bullets[0];
    assert_eq!(b.owner, BulletOwner::Player);
    assert_eq!(b.created_at, 100);
    assert!((b.pos.x).abs() < 1e-9);
    assert!((b.pos.z + 133.0).abs() < 1e-9);
    assert!((b.pos.y - (10.0 + 266.0 / 3.0)).abs() < 1e-9);
    assert!((b.vel.z + 8.0).abs() < 1e-9);
}

#[test]
fn bullet_follows_aim_to_the_west() {
    let (cfg, policy, maze, mut p) = setup((3, 3));
    let mut bullets = Vec::new();
    player::rotate(&mut p, 90.0);
    player::fire(&mut p, &mut bullets, &maze, Frame::new(&cfg, &policy, 100));
    assert!((bullets[0].vel.x + 8.0).abs() < 1e-9);
    assert!(bullets[0].vel.z.abs() < 1e-9);
}

#[test]
fn fire_cooldown_and_ammo_limit() {
    let (mut cfg, policy, maze, _) = setup((3, 3));
    cfg.initial_ammo_limit = 2;
    let mut p = player::spawn(&cfg, (3, 3));
    let mut bullets = Vec::new();
    let mut fire_at = |p: &mut Player, now| {
        player::fire(p, &mut bullets, &maze, Frame::new(&cfg, &policy, now))
    };

    assert_eq!(fire_at(&mut p, 1000), FireOutcome::Fired);
    assert_eq!(fire_at(&mut p, 1079), FireOutcome::Blocked);
    assert_eq!(fire_at(&mut p, 1080), FireOutcome::Fired);
    assert_eq!(fire_at(&mut p, 1200), FireOutcome::OutOfAmmo);
    assert_eq!(p.ammo_used, 2);
}

#[test]
fn unlimited_ammo_and_fast_bullets() {
    let (cfg, _, maze, mut p) = setup((3, 3));
    let policy = SimulationPolicy::cheating();
    let mut bullets = Vec::new();
    p.ammo_used = p.ammo_limit;

    let out = player::fire(&mut p, &mut bullets, &maze, Frame::new(&cfg, &policy, 0));
    assert_eq!(out, FireOutcome::Fired);
    assert_eq!(p.ammo_used, p.ammo_limit);
    assert!((bullets[0].vel.z + 16.0).abs() < 1e-9);
}

#[test]
fn immobilised_player_cannot_fire() {
    let (cfg, policy, maze, mut p) = setup((3, 3));
    p.immobilized_at = Some(0);
    let mut bullets = Vec::new();
    let out = player::fire(&mut p, &mut bullets, &maze, Frame::new(&cfg, &policy, 100));
    assert_eq!(out, FireOutcome::Blocked);
    assert!(bullets.is_empty());
}

// ── Interact ──────────────────────────────────────────────────────────────────

#[test]
fn pickups_clear_the_cell_and_select_the_item() {
    let (cfg, policy, mut maze, mut p) = setup((2, 2));
    let frame = Frame::new(&cfg, &policy, 0);
    let mut traps = Vec::new();

    maze.set((2, 2), Cell::Key);
    let got = player::interact(&mut p, &mut maze, &mut [], &mut traps, frame);
    assert_eq!(got, Interaction::PickedUp(ItemMode::Key));
    assert!(p.inventory.has_key);
    assert_eq!(maze.get((2, 2)), Some(Cell::Floor));

    maze.set((2, 2), Cell::CloakPickup);
    player::interact(&mut p, &mut maze, &mut [], &mut traps, frame);
    assert_eq!(p.inventory.cloaks, 1);
    assert_eq!(p.item_mode, Some(ItemMode::Cloak));

    maze.set((2, 2), Cell::FreezeTrapPickup);
    player::interact(&mut p, &mut maze, &mut [], &mut traps, frame);
    assert_eq!(p.inventory.freeze_traps, 1);
    assert_eq!(p.item_mode, Some(ItemMode::FreezeTrap));
}

#[test]
fn exit_needs_the_key() {
    let (cfg, policy, mut maze, mut p) = setup((2, 2));
    let frame = Frame::new(&cfg, &policy, 0);
    maze.set((2, 2), Cell::Exit);

    let got = player::interact(&mut p, &mut maze, &mut [], &mut Vec::new(), frame);
    assert_eq!(got, Interaction::MissingKey);

    p.inventory.has_key = true;
    let got = player::interact(&mut p, &mut maze, &mut [], &mut Vec::new(), frame);
    assert_eq!(got, Interaction::ReachedExit);
}

#[test]
fn key_can_be_dropped_on_floor() {
    let (cfg, policy, mut maze, mut p) = setup((2, 2));
    p.inventory.has_key = true;
    p.item_mode = Some(ItemMode::Key);

    let got = player::interact(&mut p, &mut maze, &mut [], &mut Vec::new(), Frame::new(&cfg, &policy, 0));
    assert_eq!(got, Interaction::DroppedKey);
    assert!(!p.inventory.has_key);
    assert_eq!(maze.get((2, 2)), Some(Cell::Key));
}

#[test]
fn last_cloak_falls_back_to_key_selection() {
    let (cfg, policy, mut maze, mut p) = setup((2, 2));
    p.inventory.cloaks = 1;
    p.inventory.has_key = true;
    p.item_mode = Some(ItemMode::Cloak);

    let got = player::interact(&mut p, &mut maze, &mut [], &mut Vec::new(), Frame::new(&cfg, &policy, 300));
    assert_eq!(got, Interaction::Cloaked);
    assert_eq!(p.cloaked_at, Some(300));
    assert_eq!(p.inventory.cloaks, 0);
    assert_eq!(p.item_mode, Some(ItemMode::Key));

    // Nothing left to use.
    p.item_mode = Some(ItemMode::Cloak);
    let got = player::interact(&mut p, &mut maze, &mut [], &mut Vec::new(), Frame::new(&cfg, &policy, 400));
    assert_eq!(got, Interaction::Nothing);
}

#[test]
fn deployed_trap_freezes_enemies_within_two_cells() {
    let (cfg, policy, mut maze, mut p) = setup((3, 3));
    p.inventory.freeze_traps = 1;
    p.item_mode = Some(ItemMode::FreezeTrap);
    let mut enemies = vec![idle(3, 5), idle(2, 2), idle(5, 5)];
    let mut traps = Vec::new();

    let got = player::interact(&mut p, &mut maze, &mut enemies, &mut traps, Frame::new(&cfg, &policy, 900));
    assert_eq!(got, Interaction::DeployedTrap { frozen: 2 });
    assert_eq!(traps, vec![(3, 3)]);
    assert_eq!(enemies[0].frozen_at, Some(900));
    assert_eq!(enemies[1].frozen_at, Some(900));
    assert_eq!(enemies[2].frozen_at, None);
    assert_eq!(p.item_mode, None);
}

// ── Coins ─────────────────────────────────────────────────────────────────────

#[test]
fn coins_are_collected_once_and_pay_bonuses() {
    let (mut cfg, _, maze, mut p) = setup((2, 2));
    cfg.coin_bonuses = vec![CoinBonus { coins: 2, ammo_limit: 30, health: 5 }];
    let here = maze.to_world(2.0, 2.0, cfg.cell_size);
    let mut coins = CoinLedger {
        positions: vec![here, here + DVec2::new(50.0, 0.0), here + DVec2::new(200.0, 0.0)],
        ..Default::default()
    };

    assert_eq!(player::collect_coins(&mut p, &mut coins, 0, &maze, &cfg), 2);
    assert_eq!(coins.total_collected(), 2);
    assert_eq!(p.ammo_limit, 30);
    assert_eq!(p.health, cfg.initial_health + 5);

    // Already collected, and the bonus is not paid twice.
    assert_eq!(player::collect_coins(&mut p, &mut coins, 0, &maze, &cfg), 0);
    assert_eq!(p.health, cfg.initial_health + 5);
    assert!(!coins.is_collected(0, 2));
}
