use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_APPLE, DEFAULT_SNAKE_START, GAME_STATE_KEY};
use crate::store::{SharedStore, StoreError, StoreExt};
use crate::InstanceId;
use crate::log;
use super::types::{Direction, LossReason, Point};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameStatus {
    #[default]
    Playing,
    Lost { reason: LossReason },
}

/// Where the snake/ownership pair stands, as seen by any instance reading the
/// store. The transition between two owners happens inside a single tick and
/// is never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GamePhase {
    #[default]
    Idle,
    Moving(InstanceId),
    Lost(LossReason),
}

/// The single shared snake/apple/ownership record.
///
/// Owner ids are weak references: they may name an instance that has since
/// left the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub snake_owner_id: InstanceId,
    pub apple_owner_id: InstanceId,
    /// Head first, never empty.
    pub snake: Vec<Point>,
    pub apple: Point,
    pub direction: Direction,
    #[serde(default)]
    pub status: GameStatus,
}

impl GameState {
    pub fn new(owner: InstanceId) -> Self {
        let (snake_x, snake_y) = DEFAULT_SNAKE_START;
        let (apple_x, apple_y) = DEFAULT_APPLE;
        Self {
            snake_owner_id: owner.clone(),
            apple_owner_id: owner,
            snake: vec![Point::new(snake_x, snake_y)],
            apple: Point::new(apple_x, apple_y),
            direction: Direction::IDLE,
            status: GameStatus::Playing,
        }
    }

    /// Absent and malformed records load as `Ok(None)`; malformed includes an
    /// empty snake and any cell off the board. A failing store is an error.
    pub fn load(store: &dyn SharedStore) -> Result<Option<Self>, StoreError> {
        let state = store.read::<GameState>(GAME_STATE_KEY)?;
        Ok(state.filter(|state| {
            let usable = state.is_on_board();
            if !usable {
                log!("Discarding game state with an empty snake or cells off the board");
            }
            usable
        }))
    }

    pub fn is_on_board(&self) -> bool {
        !self.snake.is_empty()
            && self.apple.is_on_board()
            && self.snake.iter().all(Point::is_on_board)
    }

    pub fn save(&self, store: &dyn SharedStore) -> Result<(), StoreError> {
        store.write(GAME_STATE_KEY, self)
    }

    pub fn head(&self) -> Point {
        self.snake[0]
    }

    pub fn head_mut(&mut self) -> &mut Point {
        &mut self.snake[0]
    }

    pub fn tail(&self) -> Point {
        self.snake[self.snake.len() - 1]
    }

    pub fn is_owned_by(&self, instance_id: &InstanceId) -> bool {
        self.snake_owner_id == *instance_id
    }

    pub fn occupies(&self, point: Point) -> bool {
        self.snake.contains(&point)
    }

    pub fn loss_reason(&self) -> Option<LossReason> {
        match self.status {
            GameStatus::Playing => None,
            GameStatus::Lost { reason } => Some(reason),
        }
    }

    pub fn mark_lost(&mut self, reason: LossReason) {
        self.status = GameStatus::Lost { reason };
    }

    pub fn phase(&self) -> GamePhase {
        if let Some(reason) = self.loss_reason() {
            GamePhase::Lost(reason)
        } else if self.direction.is_idle() {
            GamePhase::Idle
        } else {
            GamePhase::Moving(self.snake_owner_id.clone())
        }
    }
}
