//! Read-only view of the world for renderers and HUDs.

use glam::{DVec2, DVec3};

use crate::config::{Frame, SimulationPolicy};
use crate::entities::{CellPos, Direction, GameStatus, Inventory, ItemMode};
use crate::maze::Maze;
use crate::player;
use crate::world::GameState;

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub row: i64,
    pub col: i64,
    pub angle: f64,
    pub health: u32,
    pub max_health: u32,
    pub inventory: Inventory,
    pub item_mode: Option<ItemMode>,
    pub ammo_left: Option<u32>,
    pub cloaked: bool,
    /// Remaining cloak time; `None` while uncloaked or cloaked indefinitely.
    pub cloak_left_ms: Option<u64>,
    pub immobilized: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyView {
    pub row: f64,
    pub col: f64,
    pub facing: Direction,
    pub rotation: f64,
    pub frozen: bool,
    pub boss_health: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoinView {
    pub pos: DVec2,
    pub cell: CellPos,
}

/// Everything drawable at one instant.
#[derive(Clone, Debug)]
pub struct Snapshot<'a> {
    pub level: usize,
    pub level_count: usize,
    pub maze: &'a Maze,
    /// World units per grid cell, for mapping bullet positions back to cells.
    pub cell_size: f64,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub player_bullets: Vec<DVec3>,
    pub hostile_bullets: Vec<DVec3>,
    /// Uncollected coins only.
    pub coins: Vec<CoinView>,
    pub freeze_traps: &'a [CellPos],
    pub coins_collected: usize,
    pub status: GameStatus,
    pub policy: SimulationPolicy,
    pub frame: u64,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot<'_> {
        let frame = Frame::new(&self.config, &self.policy, self.now);
        let p = &self.player;
        let cs = self.config.cell_size;

        let cloak_left_ms = match p.cloaked_at {
            Some(t) if !self.policy.indefinite_cloak => {
                Some(self.config.cloak_ms.saturating_sub(frame.since(t)))
            }
            _ => None,
        };

        let player = PlayerView {
            row: p.row,
            col: p.col,
            angle: p.angle,
            health: p.health,
            max_health: self.config.max_health,
            inventory: p.inventory.clone(),
            item_mode: p.item_mode,
            ammo_left: (!self.policy.unlimited_ammo)
                .then(|| p.ammo_limit.saturating_sub(p.ammo_used)),
            cloaked: p.is_cloaked(),
            cloak_left_ms,
            immobilized: player::immobilized(p, frame),
        };

        let enemies = self
            .enemies
            .iter()
            .map(|e| EnemyView {
                row: e.row,
                col: e.col,
                facing: e.facing,
                rotation: e.rotation,
                frozen: e.frozen_at.is_some_and(|t| {
                    self.policy.indefinite_freeze || frame.since(t) < self.config.freeze_ms
                }),
                boss_health: e.boss_health(),
            })
            .collect();

        let coins = self
            .coins
            .positions
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.coins.is_collected(self.level_index, *i))
            .map(|(_, &pos)| CoinView {
                pos,
                cell: self.maze.cell_at(pos.x, pos.y, cs),
            })
            .collect();

        Snapshot {
            level: self.level_index,
            level_count: self.levels.len(),
            maze: &self.maze,
            cell_size: cs,
            player,
            enemies,
            player_bullets: self.player_bullets.iter().map(|b| b.pos).collect(),
            hostile_bullets: self.hostile_bullets.iter().map(|b| b.pos).collect(),
            coins,
            freeze_traps: &self.freeze_traps,
            coins_collected: self.coins.total_collected(),
            status: self.status,
            policy: self.policy,
            frame: self.frame,
        }
    }
}
