//! Frame orchestration.
//!
//! `tick` is the only entry point that advances time. It consumes the
//! intents collected since the last frame, then runs enemy AI, projectiles
//! and status timers in that order. Every timestamp it hands down comes from
//! the caller, so a scripted clock gives a fully reproducible run.

use tracing::{debug, info};

use crate::config::Frame;
use crate::entities::{DefeatCause, GameStatus, InputIntent};
use crate::player::{self, FireOutcome, Interaction};
use crate::world::GameState;
use crate::{enemies, projectiles};

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame at time `now` (milliseconds).
pub fn tick(state: &mut GameState, now: u64, intents: &[InputIntent]) {
    state.now = now;

    if state.status.is_over() {
        if intents.contains(&InputIntent::Restart) {
            state.reset(now);
        }
        return;
    }

    // ── 1. Input ─────────────────────────────────────────────────────────────
    for &intent in intents {
        apply_intent(state, intent, now);
        if state.status.is_over() {
            return;
        }
    }

    let frame = Frame::new(&state.config, &state.policy, now);

    // ── 2. Enemy AI ──────────────────────────────────────────────────────────
    enemies::update_all(
        &mut state.enemies,
        &state.maze,
        &mut state.player,
        &mut state.freeze_traps,
        &mut state.hostile_bullets,
        frame,
    );
    if state.player.health == 0 {
        end(&mut state.status, GameStatus::Defeat(DefeatCause::Killed));
        return;
    }

    // ── 3. Projectiles ───────────────────────────────────────────────────────
    projectiles::advance_all(
        &mut state.player_bullets,
        &mut state.hostile_bullets,
        &state.maze,
        &mut state.enemies,
        &mut state.player,
        frame,
    );
    if state.player.health == 0 {
        end(&mut state.status, GameStatus::Defeat(DefeatCause::Killed));
        return;
    }

    // ── 4. Status timers ─────────────────────────────────────────────────────
    player::expire_statuses(&mut state.player, frame);
    state.frame += 1;
}

fn end(status: &mut GameStatus, outcome: GameStatus) {
    *status = outcome;
    info!(?outcome, "game over");
}

// ── Intents ──────────────────────────────────────────────────────────────────

/// While immobilised only presentation and restart requests get through.
fn allowed_while_immobilized(intent: InputIntent) -> bool {
    matches!(intent, InputIntent::Camera | InputIntent::Restart)
}

fn apply_intent(state: &mut GameState, intent: InputIntent, now: u64) {
    let frame = Frame::new(&state.config, &state.policy, now);
    if player::immobilized(&state.player, frame) && !allowed_while_immobilized(intent) {
        return;
    }

    match intent {
        InputIntent::RotateLeft => player::rotate(&mut state.player, state.config.rotation_step),
        InputIntent::RotateRight => player::rotate(&mut state.player, -state.config.rotation_step),
        InputIntent::MoveForward | InputIntent::MoveBackward => {
            let forward = intent == InputIntent::MoveForward;
            if player::try_move(&mut state.player, &state.maze, forward, frame) {
                after_move(state, now);
            }
        }
        InputIntent::Fire => {
            let outcome = player::fire(
                &mut state.player,
                &mut state.player_bullets,
                &state.maze,
                frame,
            );
            if outcome == FireOutcome::OutOfAmmo {
                end(&mut state.status, GameStatus::Defeat(DefeatCause::OutOfAmmo));
            }
        }
        InputIntent::Interact => interact(state, now),
        InputIntent::SelectItem(item) => {
            state.player.item_mode = Some(item);
            debug!(?item, "item selected");
        }
        InputIntent::ToggleCheat => toggle_cheat(state, now),
        InputIntent::TogglePhase => {
            let on = state.policy.toggle_phasing();
            info!(on, "wall phasing");
        }
        // Restart only matters once the game is over.
        InputIntent::Restart | InputIntent::Camera => {}
    }
}

/// Traps, then coins, on the cell just entered.
fn after_move(state: &mut GameState, now: u64) {
    let frame = Frame::new(&state.config, &state.policy, now);
    if let Some(cause) = player::step_on_trap(&mut state.player, &state.maze, frame) {
        end(&mut state.status, GameStatus::Defeat(cause));
        return;
    }
    player::collect_coins(
        &mut state.player,
        &mut state.coins,
        state.level_index,
        &state.maze,
        &state.config,
    );
}

fn interact(state: &mut GameState, now: u64) {
    let frame = Frame::new(&state.config, &state.policy, now);
    let outcome = player::interact(
        &mut state.player,
        &mut state.maze,
        &mut state.enemies,
        &mut state.freeze_traps,
        frame,
    );
    if outcome != Interaction::ReachedExit {
        return;
    }
    if state.is_final_level() {
        end(&mut state.status, GameStatus::Victory);
    } else {
        state.advance_level(now);
    }
}

/// Leaving cheat mode restarts an active cloak and thaws enemies whose
/// freeze has already run its normal course.
fn toggle_cheat(state: &mut GameState, now: u64) {
    let cheating = state.policy.toggle_cheat();
    info!(cheating, "cheat mode");
    if cheating {
        return;
    }
    if state.player.cloaked_at.is_some() {
        state.player.cloaked_at = Some(now);
    }
    let freeze_ms = state.config.freeze_ms;
    for enemy in &mut state.enemies {
        if enemy
            .frozen_at
            .is_some_and(|t| now.saturating_sub(t) >= freeze_ms)
        {
            enemy.frozen_at = None;
        }
    }
}
