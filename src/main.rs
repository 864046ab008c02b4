mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use maze_hunter::entities::{InputIntent, ItemMode};
use maze_hunter::{tick, GameConfig, GameState, SimulationPolicy};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

// ── Held-key constants ────────────────────────────────────────────────────────

/// Min frames between 15° turns while A/D is held.
const TURN_COOLDOWN: u32 = 2;

/// Min frames between grid steps while W/S is held.
const MOVE_COOLDOWN: u32 = 4;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: char, frame: u64) -> bool {
    [key.to_ascii_lowercase(), key.to_ascii_uppercase()]
        .iter()
        .any(|c| {
            key_frame
                .get(&KeyCode::Char(*c))
                .is_some_and(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        })
}

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "maze_hunter", about = "Top-down maze shooter in the terminal")]
struct Cli {
    /// JSON file overriding any of the tuning constants
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs here (the terminal belongs to the game). Filter with RUST_LOG.
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    /// Start with cheat mode on
    #[arg(long)]
    cheat: bool,
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ── Title screen ──────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> anyhow::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "▒  MAZE  HUNTER  ▒";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    let lines: &[(&str, Color, &str)] = &[
        ("⚷ ", Color::Yellow, "Find the key, then reach the exit ▒▒"),
        ("◆ ", Color::Green, "Guards patrol and shoot on sight"),
        ("✱ ", Color::Cyan, "Freeze traps stop guards that step on them"),
        ("◌ ", Color::Magenta, "Cloaks hide you for a few seconds"),
        ("^^", Color::DarkYellow, "Snares hold you in place"),
        ("xx", Color::Red, "Deadly traps end the run"),
    ];
    for (i, (sym, color, desc)) in lines.iter().enumerate() {
        let row = cy.saturating_sub(4) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(22), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("  {desc}")))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(22), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("ENTER : Start   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// One-shot keys map straight to an intent.
fn press_intent(code: KeyCode) -> Option<InputIntent> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    Some(match c.to_ascii_lowercase() {
        'e' => InputIntent::Interact,
        '5' => InputIntent::SelectItem(ItemMode::Key),
        '6' => InputIntent::SelectItem(ItemMode::FreezeTrap),
        '7' => InputIntent::SelectItem(ItemMode::Cloak),
        'c' => InputIntent::ToggleCheat,
        'v' => InputIntent::TogglePhase,
        'r' => InputIntent::Restart,
        _ => return None,
    })
}

/// Runs until the player quits. Simulation time only advances while
/// unpaused, so timers and cooldowns hold still during a pause.
///
/// Input model follows a `key_frame` map of the frame each key was last
/// seen; held keys (turn, move, fire) act every frame they are fresh, while
/// one-shot keys turn into a single intent on press.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut turn_cooldown: u32 = 0;
    let mut move_cooldown: u32 = 0;
    let mut frame: u64 = 0;
    let mut sim_now: u64 = state.now;
    let mut paused = false;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut intents: Vec<InputIntent> = Vec::new();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            paused = !paused;
                            info!(paused, "pause toggled");
                        }
                        _ if !paused => intents.extend(press_intent(code)),
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let dt = last.elapsed().as_millis() as u64;
        last = Instant::now();

        if !paused {
            sim_now += dt;

            // ── Held keys ─────────────────────────────────────────────────────
            if turn_cooldown == 0 {
                if is_held(&key_frame, 'a', frame) {
                    intents.push(InputIntent::RotateLeft);
                    turn_cooldown = TURN_COOLDOWN;
                } else if is_held(&key_frame, 'd', frame) {
                    intents.push(InputIntent::RotateRight);
                    turn_cooldown = TURN_COOLDOWN;
                }
            }
            if move_cooldown == 0 {
                if is_held(&key_frame, 'w', frame) {
                    intents.push(InputIntent::MoveForward);
                    move_cooldown = MOVE_COOLDOWN;
                } else if is_held(&key_frame, 's', frame) {
                    intents.push(InputIntent::MoveBackward);
                    move_cooldown = MOVE_COOLDOWN;
                }
            }
            // The simulation enforces the fire interval.
            if is_held(&key_frame, ' ', frame) {
                intents.push(InputIntent::Fire);
            }

            turn_cooldown = turn_cooldown.saturating_sub(1);
            move_cooldown = move_cooldown.saturating_sub(1);

            tick(state, sim_now, &intents);
        }

        display::render(out, &state.snapshot(), paused)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let mut state = GameState::with_builtin_levels(config, 0).context("building levels")?;
    if cli.cheat {
        state.policy = SimulationPolicy::cheating();
    }
    info!(levels = state.level_count(), "starting");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the game loop never
    // blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = match show_menu(&mut out, &rx) {
        Ok(MenuResult::Start) => game_loop(&mut out, &mut state, &rx),
        Ok(MenuResult::Quit) => Ok(()),
        Err(e) => Err(e),
    };

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!(
        status = ?state.status,
        coins = state.coins.total_collected(),
        "exiting"
    );
    result
}
