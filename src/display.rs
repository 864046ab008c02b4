//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and a read-only snapshot of the
//! world. The maze is drawn top-down, two terminal columns per grid cell.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use maze_hunter::entities::{Cell, CellPos, DefeatCause, GameStatus, ItemMode};
use maze_hunter::maze::Maze;
use maze_hunter::snapshot::{EnemyView, PlayerView, Snapshot};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_WALL: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PLAYER_CLOAKED: Color = Color::DarkGrey;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Red;
const C_FROZEN: Color = Color::Cyan;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_HOSTILE: Color = Color::Magenta;
const C_COIN: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_CHEAT: Color = Color::Magenta;

/// Screen row of grid row 0.
const MAZE_TOP: u16 = 2;
/// Screen column of grid column 0.
const MAZE_LEFT: u16 = 1;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, snap: &Snapshot, paused: bool) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, snap)?;
    draw_maze(out, snap.maze)?;

    for &(row, col) in snap.freeze_traps {
        put(out, (row, col), "❄ ", C_FROZEN)?;
    }
    for coin in &snap.coins {
        put(out, coin.cell, "· ", C_COIN)?;
    }
    for enemy in &snap.enemies {
        draw_enemy(out, enemy)?;
    }
    draw_bullets(out, snap)?;
    draw_player(out, &snap.player)?;

    let bottom = MAZE_TOP + snap.maze.rows() as u16 + 1;
    draw_controls_hint(out, bottom)?;

    if snap.status.is_over() {
        draw_game_over(out, snap)?;
    } else if paused {
        draw_banner(out, snap, &[("PAUSED", Color::Yellow), ("P - Resume", Color::White)])?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, bottom + 1))?;
    out.flush()?;
    Ok(())
}

fn screen_pos((row, col): CellPos) -> Option<(u16, u16)> {
    if row < 0 || col < 0 {
        return None;
    }
    Some((MAZE_LEFT + col as u16 * 2, MAZE_TOP + row as u16))
}

fn put<W: Write>(out: &mut W, cell: CellPos, glyph: &str, color: Color) -> std::io::Result<()> {
    if let Some((x, y)) = screen_pos(cell) {
        out.queue(cursor::MoveTo(x, y))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, snap: &Snapshot) -> std::io::Result<()> {
    let p = &snap.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(format!("Level {}/{}  ", snap.level + 1, snap.level_count)))?;

    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!("HP {:>3}/{}  ", p.health, p.max_health)))?;

    out.queue(style::SetForegroundColor(C_HUD))?;
    let ammo = match p.ammo_left {
        Some(n) => n.to_string(),
        None => "∞".to_string(),
    };
    out.queue(Print(format!("Ammo {ammo:>3}  Coins {:>3}  ", snap.coins_collected)))?;

    let item = match p.item_mode {
        Some(ItemMode::Key) => "key",
        Some(ItemMode::FreezeTrap) => "trap",
        Some(ItemMode::Cloak) => "cloak",
        None => "-",
    };
    let key = if p.inventory.has_key { "K" } else { "_" };
    out.queue(Print(format!(
        "[{key}] traps {} cloaks {}  using {item}",
        p.inventory.freeze_traps, p.inventory.cloaks
    )))?;

    // Second row: timed statuses and cheats
    out.queue(cursor::MoveTo(1, 1))?;
    if p.cloaked {
        out.queue(style::SetForegroundColor(C_PLAYER_CLOAKED))?;
        match p.cloak_left_ms {
            Some(ms) => out.queue(Print(format!("CLOAKED {:>2}s  ", ms / 1000 + 1)))?,
            None => out.queue(Print("CLOAKED  "))?,
        };
    }
    if p.immobilized {
        out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
        out.queue(Print("IMMOBILISED  "))?;
    }
    if snap.policy.is_cheating() {
        out.queue(style::SetForegroundColor(C_CHEAT))?;
        out.queue(Print("CHEAT"))?;
        if snap.policy.wall_phasing {
            out.queue(Print(" +PHASE"))?;
        }
    }
    Ok(())
}

// ── Maze ──────────────────────────────────────────────────────────────────────

fn cell_glyph(cell: Cell) -> (&'static str, Color) {
    match cell {
        Cell::Wall => ("██", C_WALL),
        Cell::Key => ("⚷ ", Color::Yellow),
        Cell::Exit => ("▒▒", Color::Green),
        Cell::FreezeTrapPickup => ("✱ ", C_FROZEN),
        Cell::CloakPickup => ("◌ ", Color::Magenta),
        Cell::ImmobilizeTrap => ("^^", Color::DarkYellow),
        Cell::DeadlyTrap => ("xx", Color::Red),
        Cell::Floor | Cell::PlayerStart | Cell::EnemySpawn => ("  ", Color::Reset),
    }
}

fn draw_maze<W: Write>(out: &mut W, maze: &Maze) -> std::io::Result<()> {
    for (pos, cell) in maze.iter() {
        if matches!(cell, Cell::Floor | Cell::PlayerStart | Cell::EnemySpawn) {
            continue;
        }
        let (glyph, color) = cell_glyph(cell);
        put(out, pos, glyph, color)?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

/// Aim arrow for the eight nearest headings. Angle grows counter-clockwise
/// from north.
fn aim_arrow(angle: f64) -> &'static str {
    const ARROWS: [&str; 8] = ["↑ ", "↖ ", "← ", "↙ ", "↓ ", "↘ ", "→ ", "↗ "];
    let octant = ((angle.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    ARROWS[octant]
}

fn draw_player<W: Write>(out: &mut W, p: &PlayerView) -> std::io::Result<()> {
    let color = if p.cloaked { C_PLAYER_CLOAKED } else { C_PLAYER };
    put(out, (p.row, p.col), aim_arrow(p.angle), color)
}

fn draw_enemy<W: Write>(out: &mut W, enemy: &EnemyView) -> std::io::Result<()> {
    let cell = (enemy.row.round() as i64, enemy.col.round() as i64);
    let (glyph, color) = match enemy.boss_health {
        Some(_) => ("◉◉", C_BOSS),
        None => ("◆ ", C_ENEMY),
    };
    let color = if enemy.frozen { C_FROZEN } else { color };
    put(out, cell, glyph, color)?;

    if let (Some(health), Some((x, y))) = (enemy.boss_health, screen_pos(cell)) {
        out.queue(cursor::MoveTo(x, y.saturating_sub(1)))?;
        out.queue(style::SetForegroundColor(C_BOSS))?;
        out.queue(Print(format!("{health}")))?;
    }
    Ok(())
}

fn draw_bullets<W: Write>(out: &mut W, snap: &Snapshot) -> std::io::Result<()> {
    let cs = snap.cell_size;
    for b in &snap.player_bullets {
        put(out, snap.maze.cell_at(b.x, b.z, cs), "•", C_BULLET_PLAYER)?;
    }
    for b in &snap.hostile_bullets {
        put(out, snap.maze.cell_at(b.x, b.z, cs), "•", C_BULLET_HOSTILE)?;
    }
    Ok(())
}

// ── Controls hint ─────────────────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, row: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, row))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "A D : Turn  W S : Move  SPACE : Shoot  E : Use  5 6 7 : Item  C V : Cheat  P : Pause  Q : Quit",
    ))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, snap: &Snapshot) -> std::io::Result<()> {
    let (title, color) = match snap.status {
        GameStatus::Victory => ("YOU  ESCAPED", Color::Green),
        GameStatus::Defeat(DefeatCause::Killed) => ("YOU  DIED", Color::Red),
        GameStatus::Defeat(DefeatCause::OutOfAmmo) => ("OUT OF AMMO", Color::Red),
        GameStatus::Defeat(DefeatCause::DeadlyTrap) => ("DEADLY TRAP", Color::Red),
        GameStatus::Playing => return Ok(()),
    };
    let coins = format!("Coins: {}", snap.coins_collected);
    draw_banner(
        out,
        snap,
        &[
            (title, color),
            (&coins, Color::Yellow),
            ("R - Play Again  Q - Quit", Color::White),
        ],
    )
}

fn draw_banner<W: Write>(
    out: &mut W,
    snap: &Snapshot,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = MAZE_LEFT + snap.maze.cols() as u16;
    let start_row = (MAZE_TOP + snap.maze.rows() as u16 / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}
