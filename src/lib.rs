//! Simulation core for a grid-maze shooter.
//!
//! The library owns the whole world state and advances it one frame at a
//! time through [`compute::tick`]. Rendering, menus and key bindings live in
//! the binary and only ever read a [`snapshot::Snapshot`].

pub mod compute;
pub mod config;
pub mod enemies;
pub mod entities;
pub mod error;
pub mod levels;
pub mod maze;
pub mod player;
pub mod projectiles;
pub mod snapshot;
pub mod world;

pub use compute::tick;
pub use config::{GameConfig, SimulationPolicy};
pub use error::GameError;
pub use world::GameState;
