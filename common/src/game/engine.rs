use crate::defaults::BOARD_SIZE;
use crate::log;
use crate::registry::InstanceRegistry;
use crate::InstanceId;
use super::game_rng::GameRng;
use super::game_state::GameState;
use super::types::Point;

/// Shifts every segment into its predecessor's cell, then steps the head.
/// Returns whether the snake moved; an idle direction or an empty snake
/// leaves it in place.
pub fn advance(state: &mut GameState) -> bool {
    if state.direction.is_idle() || state.snake.is_empty() {
        return false;
    }

    for i in (0..state.snake.len() - 1).rev() {
        state.snake[i + 1] = state.snake[i];
    }

    let direction = state.direction;
    let head = state.head_mut();
    head.x += direction.x();
    head.y += direction.y();
    true
}

pub fn detect_self_collision(state: &GameState) -> bool {
    let head = state.head();
    state.snake.iter().skip(1).any(|segment| *segment == head)
}

/// The head only reaches the apple when both are drawn by the same instance;
/// equal coordinates on two different boards do not count.
pub fn detect_apple_collision(state: &GameState) -> bool {
    state.head() == state.apple && state.snake_owner_id == state.apple_owner_id
}

/// Grows the snake by one (a copy of the tail, which separates on the next
/// move) and moves the apple elsewhere.
pub fn eat_apple(state: &mut GameState, registry: &InstanceRegistry<'_>, rng: &mut GameRng) {
    let tail = state.tail();
    state.snake.push(tail);
    relocate_apple(state, registry, rng);
}

/// Runs the apple check and, on a hit, grows the snake. Returns whether the
/// apple was eaten.
pub fn check_apple_collision(
    state: &mut GameState,
    registry: &InstanceRegistry<'_>,
    rng: &mut GameRng,
) -> bool {
    if !detect_apple_collision(state) {
        return false;
    }
    eat_apple(state, registry, rng);
    log!(
        "[{}] ate the apple, length {}; next apple at ({}, {}) on {}",
        state.snake_owner_id,
        state.snake.len(),
        state.apple.x,
        state.apple.y,
        state.apple_owner_id
    );
    true
}

/// Draws cells until one is free of the snake, then hands the apple to a
/// random registered instance (the current one included). An empty registry
/// keeps the current apple owner.
pub fn relocate_apple(state: &mut GameState, registry: &InstanceRegistry<'_>, rng: &mut GameRng) {
    let cells = (BOARD_SIZE * BOARD_SIZE) as usize;
    if state.snake.len() < cells {
        loop {
            let candidate = Point::new(
                rng.random_range(1..=BOARD_SIZE),
                rng.random_range(1..=BOARD_SIZE),
            );
            if !state.occupies(candidate) {
                state.apple = candidate;
                break;
            }
        }
    }

    let instance_ids: Vec<InstanceId> = registry.list_all().map(|d| d.instance_id).collect();
    if let Some(owner) = rng.choose(&instance_ids) {
        state.apple_owner_id = owner.clone();
    }
}
