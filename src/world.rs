//! World state: the live maze, actors, bullets, coins and level progression.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::{GameConfig, SimulationPolicy};
use crate::enemies;
use crate::entities::{
    Cell, CellPos, CoinLedger, Enemy, GameStatus, ItemMode, Player, Projectile,
};
use crate::error::GameError;
use crate::levels::{self, Level};
use crate::maze::Maze;
use crate::player;

/// The whole simulation. Fields are public so the orchestrator can hand
/// disjoint borrows to each subsystem.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub policy: SimulationPolicy,
    /// Pristine level data; never mutated.
    pub levels: Vec<Level>,
    pub level_index: usize,
    /// Live copy of the current level. Pickups, dropped keys and cleared
    /// spawn markers are written here.
    pub maze: Maze,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub player_bullets: Vec<Projectile>,
    pub hostile_bullets: Vec<Projectile>,
    /// Deployed freeze traps.
    pub freeze_traps: Vec<CellPos>,
    pub coins: CoinLedger,
    pub status: GameStatus,
    /// Ticks processed.
    pub frame: u64,
    /// Timestamp of the latest tick.
    pub now: u64,
}

impl GameState {
    pub fn new(config: GameConfig, levels: Vec<Level>, now: u64) -> Result<Self, GameError> {
        let first = levels.first().ok_or(GameError::NoLevels)?;
        let start = first
            .maze
            .find(Cell::PlayerStart)
            .ok_or(GameError::MissingPlayerStart)?;

        let mut state = GameState {
            player: player::spawn(&config, start),
            maze: first.maze.clone(),
            config,
            policy: SimulationPolicy::default(),
            levels,
            level_index: 0,
            enemies: Vec::new(),
            player_bullets: Vec::new(),
            hostile_bullets: Vec::new(),
            freeze_traps: Vec::new(),
            coins: CoinLedger::default(),
            status: GameStatus::Playing,
            frame: 0,
            now,
        };
        state.load_level(0, now);
        Ok(state)
    }

    pub fn with_builtin_levels(config: GameConfig, now: u64) -> Result<Self, GameError> {
        Self::new(config, levels::builtin()?, now)
    }

    pub fn is_final_level(&self) -> bool {
        self.level_index + 1 >= self.levels.len()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Move on to the next level. Inventory other than the key, the cloak,
    /// health and coin progress carry over. Does nothing on the last level.
    pub fn advance_level(&mut self, now: u64) {
        if self.is_final_level() {
            warn!(level = self.level_index, "no level after the last one");
            return;
        }
        self.load_level(self.level_index + 1, now);
        info!(level = self.level_index, "level advanced");
    }

    /// Start a fresh run from the first level. Cheats stay as they were, but
    /// wall phasing is switched off.
    pub fn reset(&mut self, now: u64) {
        self.player = player::spawn(&self.config, (0, 0));
        self.coins = CoinLedger::default();
        self.status = GameStatus::Playing;
        self.policy.wall_phasing = false;
        self.frame = 0;
        self.load_level(0, now);
        info!("game reset");
    }

    /// Replace the live maze with a fresh copy of level `index` and rebuild
    /// everything that belongs to a single level.
    fn load_level(&mut self, index: usize, now: u64) {
        let level = &self.levels[index];
        self.level_index = index;
        self.maze = level.maze.clone();
        self.now = now;

        if let Some((row, col)) = self.maze.find(Cell::PlayerStart) {
            self.player.row = row;
            self.player.col = col;
        }
        self.player.inventory.has_key = false;
        if self.player.item_mode == Some(ItemMode::Key) {
            self.player.item_mode = None;
        }
        self.player.ammo_used = 0;
        self.player.last_hit_at = None;
        self.player.immobilized_at = None;

        self.player_bullets.clear();
        self.hostile_bullets.clear();
        self.freeze_traps.clear();
        self.enemies =
            enemies::spawn_roster(&mut self.maze, level.boss_arena, &self.config, index, now);
        self.coins.positions = place_coins(&self.maze, level.boss_arena, &self.config, index);
    }
}

/// Deterministic coin layout: a seeded sample of floor cell centres in
/// row-major order. Boss arenas carry none.
pub fn place_coins(
    maze: &Maze,
    boss_arena: bool,
    config: &GameConfig,
    level_index: usize,
) -> Vec<DVec2> {
    if boss_arena {
        return Vec::new();
    }
    let floor: Vec<DVec2> = maze
        .iter()
        .filter(|(_, cell)| *cell == Cell::Floor)
        .map(|((r, c), _)| maze.to_world(r as f64, c as f64, config.cell_size))
        .collect();
    let mut rng = StdRng::seed_from_u64(config.coin_seed.wrapping_add(level_index as u64));
    let count = config.coins_per_level.min(floor.len());
    floor.choose_multiple(&mut rng, count).copied().collect()
}
