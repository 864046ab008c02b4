//! All game entity types: pure data, no simulation logic.

use std::collections::BTreeSet;

use glam::{DVec2, DVec3};

// ── Grid cells ────────────────────────────────────────────────────────────────

/// What occupies one maze cell. Discriminants are the level-data codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Floor = 0,
    Wall = 1,
    Key = 2,
    PlayerStart = 3,
    Exit = 4,
    /// Replaced by floor once its enemy has been spawned.
    EnemySpawn = 5,
    FreezeTrapPickup = 6,
    CloakPickup = 7,
    ImmobilizeTrap = 8,
    DeadlyTrap = 9,
}

impl Cell {
    pub fn from_code(code: u8) -> Option<Cell> {
        Some(match code {
            0 => Cell::Floor,
            1 => Cell::Wall,
            2 => Cell::Key,
            3 => Cell::PlayerStart,
            4 => Cell::Exit,
            5 => Cell::EnemySpawn,
            6 => Cell::FreezeTrapPickup,
            7 => Cell::CloakPickup,
            8 => Cell::ImmobilizeTrap,
            9 => Cell::DeadlyTrap,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Cells a regular enemy may step onto.
    pub fn enemy_walkable(self) -> bool {
        matches!(self, Cell::Floor | Cell::PlayerStart)
    }

    /// Cells the player may step onto without phasing.
    pub fn player_walkable(self) -> bool {
        self != Cell::Wall
    }
}

/// Grid heading. North is row - 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// (d_row, d_col)
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn reverse(self) -> Direction {
        self.rotated(2)
    }

    pub fn right(self) -> Direction {
        self.rotated(1)
    }

    pub fn left(self) -> Direction {
        self.rotated(3)
    }

    fn rotated(self, quarter_turns: usize) -> Direction {
        let idx = Direction::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Direction::ALL[(idx + quarter_turns) % 4]
    }
}

/// A grid cell address. Signed so that neighbours of edge cells can be named.
pub type CellPos = (i64, i64);

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Hostile,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// World position; y is height.
    pub pos: DVec3,
    /// Displacement applied once per tick.
    pub vel: DVec3,
    pub created_at: u64,
    pub owner: BulletOwner,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum EnemyKind {
    /// Grid-locked patroller, dies on the first hit.
    Regular,
    /// Homes in continuously and soaks `health` hits.
    Boss { health: u32 },
}

/// One roster entry. Rotation and freeze state live here so removal is a
/// single erase.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    /// Integral for regular enemies, fractional for the boss.
    pub row: f64,
    pub col: f64,
    pub facing: Direction,
    pub last_move_at: u64,
    pub last_shot_at: u64,
    /// Presentation yaw in degrees.
    pub rotation: f64,
    /// Tick time at which a freeze began.
    pub frozen_at: Option<u64>,
    pub kind: EnemyKind,
}

impl Enemy {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss { .. })
    }

    pub fn boss_health(&self) -> Option<u32> {
        match self.kind {
            EnemyKind::Boss { health } => Some(health),
            EnemyKind::Regular => None,
        }
    }

    /// Nearest grid cell.
    pub fn cell(&self) -> CellPos {
        (self.row.round() as i64, self.col.round() as i64)
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Which item the interact action works with when the player is not
/// standing on a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemMode {
    Key,
    FreezeTrap,
    Cloak,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    pub has_key: bool,
    pub freeze_traps: u32,
    pub cloaks: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub row: i64,
    pub col: i64,
    /// Degrees, 0 = north, increasing counter-clockwise.
    pub angle: f64,
    pub health: u32,
    pub inventory: Inventory,
    pub item_mode: Option<ItemMode>,
    pub last_hit_at: Option<u64>,
    pub last_shot_at: Option<u64>,
    pub immobilized_at: Option<u64>,
    pub cloaked_at: Option<u64>,
    pub ammo_used: u32,
    pub ammo_limit: u32,
}

impl Player {
    pub fn cell(&self) -> CellPos {
        (self.row, self.col)
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloaked_at.is_some()
    }

    pub fn is_immobilized(&self) -> bool {
        self.immobilized_at.is_some()
    }
}

// ── Coins ─────────────────────────────────────────────────────────────────────

/// Coin positions for the current level plus the per-level collected sets
/// that survive level changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoinLedger {
    /// World (x, z) of each coin on the current level.
    pub positions: Vec<DVec2>,
    /// Collected coin indices, one set per level.
    pub collected: Vec<BTreeSet<usize>>,
    /// Indices into `GameConfig::coin_bonuses` already paid out.
    pub bonuses_granted: BTreeSet<usize>,
}

impl CoinLedger {
    pub fn total_collected(&self) -> usize {
        self.collected.iter().map(BTreeSet::len).sum()
    }

    pub fn is_collected(&self, level: usize, index: usize) -> bool {
        self.collected
            .get(level)
            .is_some_and(|set| set.contains(&index))
    }

    /// Marks a coin collected. Returns false if it already was.
    pub fn collect(&mut self, level: usize, index: usize) -> bool {
        if self.collected.len() <= level {
            self.collected.resize_with(level + 1, BTreeSet::new);
        }
        self.collected[level].insert(index)
    }
}

// ── Status and input ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefeatCause {
    Killed,
    OutOfAmmo,
    DeadlyTrap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    Victory,
    Defeat(DefeatCause),
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::Playing
    }
}

/// A discrete request from the input collaborator, consumed at tick start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputIntent {
    RotateLeft,
    RotateRight,
    MoveForward,
    MoveBackward,
    Fire,
    Interact,
    SelectItem(ItemMode),
    ToggleCheat,
    TogglePhase,
    /// Start a fresh run; honoured once the game is over.
    Restart,
    /// Zoom, presets, orbit. Only the renderer cares.
    Camera,
}
