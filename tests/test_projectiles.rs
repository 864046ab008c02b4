use glam::DVec3;

use maze_hunter::config::{Frame, GameConfig, SimulationPolicy};
use maze_hunter::entities::*;
use maze_hunter::maze::Maze;
use maze_hunter::player;
use maze_hunter::projectiles::{self, Removal};

const OPEN: &str = "
1111111
1000001
1000001
1000001
1000001
1000001
1111111
";

const PILLAR: &str = "
1111111
1000001
1000001
1001001
1000001
1000001
1111111
";

fn bullet(x: f64, y: f64, z: f64, vel: DVec3, created_at: u64, owner: BulletOwner) -> Projectile {
    Projectile { pos: DVec3::new(x, y, z), vel, created_at, owner }
}

fn enemy(row: f64, col: f64, kind: EnemyKind) -> Enemy {
    Enemy {
        row,
        col,
        facing: Direction::North,
        last_move_at: 0,
        last_shot_at: 0,
        rotation: 0.0,
        frozen_at: None,
        kind,
    }
}

// ── Flight ────────────────────────────────────────────────────────────────────

#[test]
fn bullet_moves_by_exactly_its_velocity() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();
    let mut b = bullet(0.0, 98.0, 0.0, DVec3::new(8.0, 0.0, -3.0), 0, BulletOwner::Player);

    projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 16)).unwrap();
    assert_eq!(b.pos, DVec3::new(8.0, 98.0, -3.0));
    projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 500)).unwrap();
    assert_eq!(b.pos, DVec3::new(16.0, 98.0, -6.0));
}

#[test]
fn fast_bullet_cannot_skip_over_a_wall() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let frame = Frame::new(&cfg, &policy, 10);

    // Starts in (3,2), lands in (3,4); (3,3) lies between.
    let x = -266.0;
    let vel = DVec3::new(600.0, 0.0, 0.0);

    let pillar = Maze::parse(PILLAR).unwrap();
    let mut b = bullet(x, 98.0, 0.0, vel, 0, BulletOwner::Player);
    assert_eq!(projectiles::fly(&mut b, &pillar, frame), Err(Removal::Wall));

    let open = Maze::parse(OPEN).unwrap();
    let mut b = bullet(x, 98.0, 0.0, vel, 0, BulletOwner::Player);
    assert_eq!(projectiles::fly(&mut b, &open, frame), Ok(()));
    assert_eq!(open.cell_at(b.pos.x, b.pos.z, cfg.cell_size), (3, 4));
}

#[test]
fn bullet_entering_a_wall_cell_is_dropped() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(PILLAR).unwrap();

    // Centre of (3,2) heading east; the cell edge is 133 away.
    let mut b = bullet(-266.0, 98.0, 0.0, DVec3::new(140.0, 0.0, 0.0), 0, BulletOwner::Player);
    assert_eq!(
        projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 10)),
        Err(Removal::Wall)
    );
}

#[test]
fn bullet_entering_the_boundary_ring_is_dropped() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();

    // Centre of (1,3) heading north into row 0.
    let mut b = bullet(0.0, 98.0, -532.0, DVec3::new(0.0, 0.0, -200.0), 0, BulletOwner::Player);
    assert_eq!(
        projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 10)),
        Err(Removal::Wall)
    );
}

#[test]
fn lifetime_boundary() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();
    let vel = DVec3::new(0.001, 0.0, 0.0);

    let mut b = bullet(0.0, 98.0, 0.0, vel, 1000, BulletOwner::Player);
    assert_eq!(projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 4999)), Ok(()));
    assert_eq!(projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 5000)), Ok(()));
    assert_eq!(
        projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 5001)),
        Err(Removal::Expired)
    );
}

#[test]
fn expiry_is_checked_before_walls() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(PILLAR).unwrap();
    let mut b = bullet(-266.0, 98.0, 0.0, DVec3::new(600.0, 0.0, 0.0), 0, BulletOwner::Player);
    assert_eq!(
        projectiles::fly(&mut b, &maze, Frame::new(&cfg, &policy, 9000)),
        Err(Removal::Expired)
    );
}

// ── Hits ──────────────────────────────────────────────────────────────────────

#[test]
fn killing_blow_removes_only_the_boss() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();
    let mut enemies = vec![
        enemy(2.0, 2.0, EnemyKind::Regular),
        enemy(4.0, 4.0, EnemyKind::Boss { health: 1 }),
        enemy(5.0, 5.0, EnemyKind::Regular),
    ];
    // Boss centre is (266, 266); the bullet arrives there at boss height.
    let mut bullets = vec![bullet(
        258.0,
        200.0,
        266.0,
        DVec3::new(8.0, 0.0, 0.0),
        0,
        BulletOwner::Player,
    )];

    projectiles::advance_player_bullets(
        &mut bullets,
        &maze,
        &mut enemies,
        Frame::new(&cfg, &policy, 10),
    );

    assert!(bullets.is_empty());
    assert_eq!(enemies.len(), 2);
    assert!(enemies.iter().all(|e| !e.is_boss()));
    assert_eq!((enemies[0].row, enemies[1].row), (2.0, 5.0));
}

#[test]
fn boss_soaks_hits_until_zero() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();
    let mut enemies = vec![enemy(4.0, 4.0, EnemyKind::Boss { health: 3 })];
    let mut bullets = vec![bullet(258.0, 200.0, 266.0, DVec3::new(8.0, 0.0, 0.0), 0, BulletOwner::Player)];

    projectiles::advance_player_bullets(&mut bullets, &maze, &mut enemies, Frame::new(&cfg, &policy, 10));
    assert_eq!(enemies[0].boss_health(), Some(2));
}

#[test]
fn bullet_over_an_enemy_head_misses() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();
    let mut enemies = vec![enemy(4.0, 4.0, EnemyKind::Regular)];
    // Regular enemies are hit-tested at 150; 150 + 133 is outside the band.
    let mut bullets = vec![bullet(258.0, 290.0, 266.0, DVec3::new(8.0, 0.0, 0.0), 0, BulletOwner::Player)];

    projectiles::advance_player_bullets(&mut bullets, &maze, &mut enemies, Frame::new(&cfg, &policy, 10));
    assert_eq!(bullets.len(), 1);
    assert_eq!(enemies.len(), 1);
}

#[test]
fn hostile_bullets_are_spent_even_during_invincibility() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy::default();
    let maze = Maze::parse(OPEN).unwrap();
    let mut p = player::spawn(&cfg, (1, 1));
    // Player centre is (-532, -532).
    let mut bullets = vec![
        bullet(-540.0, 150.0, -532.0, DVec3::new(8.0, 0.0, 0.0), 0, BulletOwner::Hostile),
        bullet(-524.0, 150.0, -532.0, DVec3::new(-8.0, 0.0, 0.0), 0, BulletOwner::Hostile),
    ];

    projectiles::advance_hostile_bullets(&mut bullets, &maze, &mut p, Frame::new(&cfg, &policy, 100));
    assert!(bullets.is_empty());
    assert_eq!(p.health, cfg.initial_health - 1);
    assert_eq!(p.last_hit_at, Some(100));
}

#[test]
fn invulnerable_player_takes_no_damage() {
    let cfg = GameConfig::default();
    let policy = SimulationPolicy { invulnerable: true, ..Default::default() };
    let maze = Maze::parse(OPEN).unwrap();
    let mut p = player::spawn(&cfg, (1, 1));
    let mut bullets = vec![bullet(-540.0, 150.0, -532.0, DVec3::new(8.0, 0.0, 0.0), 0, BulletOwner::Hostile)];

    projectiles::advance_hostile_bullets(&mut bullets, &maze, &mut p, Frame::new(&cfg, &policy, 100));
    assert!(bullets.is_empty());
    assert_eq!(p.health, cfg.initial_health);
}
