//! Static level data. Layouts are one digit per cell (see [`Cell`]).

use crate::entities::Cell;
use crate::error::GameError;
use crate::maze::Maze;

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub maze: Maze,
    /// Spawns a single boss at the centre instead of scanning spawn markers,
    /// and carries no coins.
    pub boss_arena: bool,
}

impl Level {
    pub fn parse(layout: &str, boss_arena: bool) -> Result<Level, GameError> {
        let maze = Maze::parse(layout)?;
        if maze.find(Cell::PlayerStart).is_none() {
            return Err(GameError::MissingPlayerStart);
        }
        Ok(Level { maze, boss_arena })
    }
}

const LEVEL_1: &str = "
111111111111111
130000010000051
101110010111001
100010000100001
111010111101101
100000100000101
101111101110101
100600001000101
101011111011101
100010000010001
111010111010111
100000107000801
101111101111101
100050000092041
111111111111111
";

const LEVEL_2: &str = "
111111111111111
100000000000041
101111011111101
101000010000101
101011110110101
100010005010001
111010111011111
100000103000001
101111101111101
100060100000701
111010111110101
100010000810101
101110111010101
150000002010001
111111111111111
";

const BOSS_ARENA: &str = "
111111111111111
130000000000001
101101000101101
100000000000001
100100000001001
100000000000001
101000010000101
100000000000001
101000010000101
100000000000001
100100000001001
100000000000001
101101000101101
100000006020041
111111111111111
";

/// The three shipped levels; the last is the boss fight.
pub fn builtin() -> Result<Vec<Level>, GameError> {
    Ok(vec![
        Level::parse(LEVEL_1, false)?,
        Level::parse(LEVEL_2, false)?,
        Level::parse(BOSS_ARENA, true)?,
    ])
}
