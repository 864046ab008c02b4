//! Error type for level data and config loading.

/// Failures at the edges of the simulation: level data and config files.
///
/// Nothing inside a tick returns one of these; see `compute::tick`.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("maze layout is empty")]
    EmptyMaze,

    #[error("maze row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell {ch:?} at row {row}, col {col}")]
    InvalidCell { row: usize, col: usize, ch: char },

    #[error("maze has no player start cell")]
    MissingPlayerStart,

    #[error("no levels supplied")]
    NoLevels,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
