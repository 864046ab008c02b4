//! Tunable constants and the cheat/debug policy.
//!
//! Times are milliseconds of wall-clock elapsed since start. Speeds are
//! per-tick displacements: a bullet moves by exactly its stored velocity
//! every frame regardless of frame duration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// One-time reward for crossing a cumulative coin count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinBonus {
    pub coins: usize,
    pub ammo_limit: u32,
    pub health: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Timing ───────────────────────────────────────────────────────────────
    pub player_invincibility_ms: u64,
    pub immobilize_ms: u64,
    pub freeze_ms: u64,
    pub bullet_lifetime_ms: u64,
    pub player_fire_interval_ms: u64,
    pub enemy_fire_interval_ms: u64,
    pub enemy_move_interval_ms: u64,
    pub cloak_ms: u64,

    // ── Speeds ───────────────────────────────────────────────────────────────
    pub bullet_speed: f64,
    pub boss_bullet_speed: f64,
    /// Grid cells per tick.
    pub boss_step: f64,
    /// Degrees per tick.
    pub enemy_rotation_speed: f64,
    /// Grid cells per move intent, rounded to the nearest cell.
    pub player_step: f64,
    /// Degrees per rotate intent.
    pub rotation_step: f64,

    // ── World ────────────────────────────────────────────────────────────────
    /// Edge length of one grid cell in world units.
    pub cell_size: f64,
    pub coins_per_level: usize,
    pub coin_seed: u64,
    pub enemy_seed: u64,

    // ── Player ───────────────────────────────────────────────────────────────
    pub max_health: u32,
    pub initial_health: u32,
    pub initial_ammo_limit: u32,
    pub coin_bonuses: Vec<CoinBonus>,

    pub boss_health: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_invincibility_ms: 1200,
            immobilize_ms: 2500,
            freeze_ms: 6000,
            bullet_lifetime_ms: 4000,
            player_fire_interval_ms: 80,
            enemy_fire_interval_ms: 150,
            enemy_move_interval_ms: 1000,
            cloak_ms: 7000,

            bullet_speed: 8.0,
            boss_bullet_speed: 6.0,
            boss_step: 0.002,
            enemy_rotation_speed: 1.5,
            player_step: 1.25,
            rotation_step: 15.0,

            cell_size: (2000 * 2 / 15) as f64,
            coins_per_level: 50,
            coin_seed: 423,
            enemy_seed: 789,

            max_health: 100,
            initial_health: 15,
            initial_ammo_limit: 20,
            coin_bonuses: vec![
                CoinBonus { coins: 50, ammo_limit: 30, health: 5 },
                CoinBonus { coins: 100, ammo_limit: 50, health: 5 },
            ],

            boss_health: 10,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Horizontal radius for bullet-vs-actor hits.
    pub fn hit_radius(&self) -> f64 {
        self.cell_size / 3.0
    }

    /// Vertical tolerance for bullet-vs-actor hits.
    pub fn hit_band(&self) -> f64 {
        self.cell_size / 2.0
    }

    /// Gun barrel length; bullets spawn this far ahead of the player.
    pub fn muzzle_distance(&self) -> f64 {
        self.cell_size / 2.0
    }

    /// Spawn offset that keeps an enemy bullet clear of its own body.
    pub fn enemy_muzzle_offset(&self) -> f64 {
        self.cell_size / 4.0
    }

    pub fn coin_pickup_radius(&self) -> f64 {
        self.cell_size / 2.5
    }
}

/// Cheat and debug overrides, consulted at each check site that they affect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationPolicy {
    /// Firing never consumes ammo and never runs out.
    pub unlimited_ammo: bool,
    /// Player may walk through walls (never out of the grid).
    pub wall_phasing: bool,
    /// A frozen enemy stays frozen until the policy is lifted.
    pub indefinite_freeze: bool,
    /// Bullets and enemy contact never hurt the player.
    pub invulnerable: bool,
    /// Immobilize and deadly traps do nothing.
    pub ignore_traps: bool,
    /// An active cloak never lapses.
    pub indefinite_cloak: bool,
    /// Player bullets travel at double speed.
    pub fast_bullets: bool,
}

impl SimulationPolicy {
    /// Everything on except wall phasing, which has its own toggle.
    pub fn cheating() -> Self {
        Self {
            unlimited_ammo: true,
            wall_phasing: false,
            indefinite_freeze: true,
            invulnerable: true,
            ignore_traps: true,
            indefinite_cloak: true,
            fast_bullets: true,
        }
    }

    pub fn is_cheating(&self) -> bool {
        self.unlimited_ammo
            || self.indefinite_freeze
            || self.invulnerable
            || self.ignore_traps
            || self.indefinite_cloak
            || self.fast_bullets
    }

    /// Flip between the normal rules and [`SimulationPolicy::cheating`].
    /// Phasing is always switched off. Returns the new cheating state.
    pub fn toggle_cheat(&mut self) -> bool {
        *self = if self.is_cheating() {
            Self::default()
        } else {
            Self::cheating()
        };
        self.is_cheating()
    }

    /// Phasing can only be toggled while cheating.
    pub fn toggle_phasing(&mut self) -> bool {
        if self.is_cheating() {
            self.wall_phasing = !self.wall_phasing;
        }
        self.wall_phasing
    }

    pub fn bullet_speed(&self, config: &GameConfig) -> f64 {
        if self.fast_bullets {
            config.bullet_speed * 2.0
        } else {
            config.bullet_speed
        }
    }
}

/// Everything a subsystem needs to know about "now" for one tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub config: &'a GameConfig,
    pub policy: &'a SimulationPolicy,
    pub now: u64,
}

impl<'a> Frame<'a> {
    pub fn new(config: &'a GameConfig, policy: &'a SimulationPolicy, now: u64) -> Self {
        Self { config, policy, now }
    }

    /// Milliseconds since `then`; zero if `then` lies in the future.
    pub fn since(&self, then: u64) -> u64 {
        self.now.saturating_sub(then)
    }
}
