use std::str::FromStr;

use crate::game::{Direction, GameState};
use crate::instance::InstanceContext;
use crate::log;
use crate::store::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    pub fn direction(self) -> Direction {
        match self {
            Key::ArrowUp => Direction::UP,
            Key::ArrowDown => Direction::DOWN,
            Key::ArrowLeft => Direction::LEFT,
            Key::ArrowRight => Direction::RIGHT,
        }
    }
}

impl FromStr for Key {
    type Err = String;

    /// Accepts the DOM key names and `w`/`a`/`s`/`d`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ArrowUp" | "w" | "W" => Ok(Key::ArrowUp),
            "ArrowDown" | "s" | "S" => Ok(Key::ArrowDown),
            "ArrowLeft" | "a" | "A" => Ok(Key::ArrowLeft),
            "ArrowRight" | "d" | "D" => Ok(Key::ArrowRight),
            other => Err(format!("Unknown key: {:?}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Applied(Direction),
    /// Same axis as the current motion.
    Rejected,
    NotOwner,
    GameOver,
    NoGame,
}

/// Writes the key's direction into the shared game, if this instance owns the
/// snake and the key turns off the current axis.
pub fn apply_key(ctx: &InstanceContext, key: Key) -> Result<InputOutcome, StoreError> {
    let Some(mut state) = GameState::load(ctx.store())? else {
        return Ok(InputOutcome::NoGame);
    };
    if !state.is_owned_by(ctx.instance_id()) {
        return Ok(InputOutcome::NotOwner);
    }
    if state.loss_reason().is_some() {
        return Ok(InputOutcome::GameOver);
    }

    let next = key.direction();
    if !state.direction.accepts(next) {
        return Ok(InputOutcome::Rejected);
    }

    state.direction = next;
    state.save(ctx.store())?;
    log!("[{}] direction ({}, {})", ctx.instance_id(), next.x(), next.y());
    Ok(InputOutcome::Applied(next))
}
