//! Spatial grid: cell lookup, passability, grid↔world conversion, grid line
//! traversal and line of sight.
//!
//! World space is centred on the maze: x grows with column, z with row, and
//! the centre of cell (r, c) sits at `c·size - offset + size/2`,
//! `r·size - offset + size/2` where `offset = rows·size / 2`.

use glam::DVec2;

use crate::entities::{Cell, CellPos};
use crate::error::GameError;

#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    cells: Vec<Vec<Cell>>,
}

impl Maze {
    /// Parse a layout of one digit per cell, one row per line. Blank lines
    /// and surrounding whitespace are ignored.
    pub fn parse(layout: &str) -> Result<Maze, GameError> {
        let mut cells = Vec::new();
        for line in layout.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let row_idx = cells.len();
            let row = line
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    ch.to_digit(10)
                        .and_then(|d| Cell::from_code(d as u8))
                        .ok_or(GameError::InvalidCell { row: row_idx, col, ch })
                })
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(row);
        }
        Maze::from_cells(cells)
    }

    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Result<Maze, GameError> {
        let expected = cells.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(GameError::EmptyMaze);
        }
        if let Some((row, r)) = cells.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(GameError::RaggedRow {
                row,
                expected,
                found: r.len(),
            });
        }
        Ok(Maze { cells })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    pub fn in_bounds(&self, (row, col): CellPos) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.cols()
    }

    /// Outermost ring of the grid.
    pub fn is_boundary(&self, (row, col): CellPos) -> bool {
        self.in_bounds((row, col))
            && (row == 0
                || col == 0
                || row as usize == self.rows() - 1
                || col as usize == self.cols() - 1)
    }

    pub fn get(&self, pos: CellPos) -> Option<Cell> {
        if self.in_bounds(pos) {
            Some(self.cells[pos.0 as usize][pos.1 as usize])
        } else {
            None
        }
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: CellPos, cell: Cell) {
        if self.in_bounds(pos) {
            self.cells[pos.0 as usize][pos.1 as usize] = cell;
        }
    }

    pub fn is_wall(&self, pos: CellPos) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }

    /// Out of the grid, on the boundary ring, or a wall.
    pub fn blocks_projectile(&self, pos: CellPos) -> bool {
        !self.in_bounds(pos) || self.is_boundary(pos) || self.is_wall(pos)
    }

    /// Phasing lifts walls and the boundary ring but never the grid edge.
    pub fn player_can_enter(&self, pos: CellPos, phasing: bool) -> bool {
        match self.get(pos) {
            None => false,
            Some(_) if phasing => true,
            Some(cell) => !self.is_boundary(pos) && cell.player_walkable(),
        }
    }

    pub fn enemy_can_enter(&self, pos: CellPos) -> bool {
        match self.get(pos) {
            Some(cell) => !self.is_boundary(pos) && cell.enemy_walkable(),
            None => false,
        }
    }

    /// Row-major cells with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| ((r as i64, c as i64), *cell))
        })
    }

    /// First cell of the given kind in row-major order.
    pub fn find(&self, kind: Cell) -> Option<CellPos> {
        self.iter().find(|(_, cell)| *cell == kind).map(|(pos, _)| pos)
    }

    pub fn center(&self) -> CellPos {
        ((self.rows() / 2) as i64, (self.cols() / 2) as i64)
    }

    // ── World space ──────────────────────────────────────────────────────────

    pub fn world_offset(&self, cell_size: f64) -> f64 {
        (self.rows() as f64 * cell_size / 2.0).floor()
    }

    /// World (x, z) of a cell centre. Accepts fractional grid positions.
    pub fn to_world(&self, row: f64, col: f64, cell_size: f64) -> DVec2 {
        let offset = self.world_offset(cell_size);
        DVec2::new(
            col * cell_size - offset + cell_size / 2.0,
            row * cell_size - offset + cell_size / 2.0,
        )
    }

    /// Grid cell containing world point (x, z). May be out of bounds.
    pub fn cell_at(&self, x: f64, z: f64, cell_size: f64) -> CellPos {
        let offset = self.world_offset(cell_size);
        (
            ((z + offset) / cell_size).floor() as i64,
            ((x + offset) / cell_size).floor() as i64,
        )
    }

    // ── Sight ────────────────────────────────────────────────────────────────

    /// True when both cells share a row or column and no wall lies strictly
    /// between them. Unaligned cells never see each other.
    pub fn line_of_sight(&self, from: CellPos, to: CellPos) -> bool {
        let ((r0, c0), (r1, c1)) = (from, to);
        if r0 == r1 {
            let (lo, hi) = (c0.min(c1), c0.max(c1));
            ((lo + 1)..hi).all(|c| !self.is_wall((r0, c)))
        } else if c0 == c1 {
            let (lo, hi) = (r0.min(r1), r0.max(r1));
            ((lo + 1)..hi).all(|r| !self.is_wall((r, c0)))
        } else {
            false
        }
    }
}

/// Every cell on the integer line from `from` to `to`, both ends included
/// (Bresenham, all octants).
pub fn grid_line(from: CellPos, to: CellPos) -> Vec<CellPos> {
    let (mut r, mut c) = from;
    let (r1, c1) = to;
    let dr = (r1 - r).abs();
    let dc = (c1 - c).abs();
    let sr = if r < r1 { 1 } else { -1 };
    let sc = if c < c1 { 1 } else { -1 };
    let mut err = dc - dr;

    let mut cells = Vec::with_capacity((dr.max(dc) + 1) as usize);
    loop {
        cells.push((r, c));
        if (r, c) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dr {
            err -= dr;
            c += sc;
        }
        if e2 < dc {
            err += dc;
            r += sr;
        }
    }
    cells
}
