use serde::{Deserialize, Serialize};

use crate::defaults::BOARD_SIZE;
use crate::registry::Geometry;

/// A board cell, 1-indexed: both coordinates live in `[1, BOARD_SIZE]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_on_board(&self) -> bool {
        (1..=BOARD_SIZE).contains(&self.x) && (1..=BOARD_SIZE).contains(&self.y)
    }

    pub fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    pub fn set_along(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Horizontal => self.x = value,
            Axis::Vertical => self.y = value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

impl Geometry {
    pub fn origin(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.screen_x,
            Axis::Vertical => self.screen_y,
        }
    }

    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Unit step applied to the head each tick. Stored as `{x, y}`; anything but
/// idle or one of the four unit vectors is rejected when read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Point", into = "Point")]
pub struct Direction {
    x: i32,
    y: i32,
}

impl Direction {
    pub const IDLE: Direction = Direction { x: 0, y: 0 };
    pub const RIGHT: Direction = Direction { x: 1, y: 0 };
    pub const LEFT: Direction = Direction { x: -1, y: 0 };
    pub const DOWN: Direction = Direction { x: 0, y: 1 };
    pub const UP: Direction = Direction { x: 0, y: -1 };

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }

    pub fn component(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    pub fn axis(&self) -> Option<Axis> {
        if self.x != 0 {
            Some(Axis::Horizontal)
        } else if self.y != 0 {
            Some(Axis::Vertical)
        } else {
            None
        }
    }

    /// A new direction is only taken when it turns off the current axis of
    /// motion; reversing (or repeating) along that axis is refused.
    pub fn accepts(&self, next: Direction) -> bool {
        match self.axis() {
            None => true,
            Some(axis) => next.axis() != Some(axis),
        }
    }
}

impl TryFrom<Point> for Direction {
    type Error = String;

    fn try_from(vector: Point) -> Result<Self, Self::Error> {
        match (vector.x, vector.y) {
            (0, 0) | (1, 0) | (-1, 0) | (0, 1) | (0, -1) => Ok(Direction {
                x: vector.x,
                y: vector.y,
            }),
            (x, y) => Err(format!("({}, {}) is not a unit direction", x, y)),
        }
    }
}

impl From<Direction> for Point {
    fn from(direction: Direction) -> Self {
        Point::new(direction.x, direction.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LossReason {
    SelfCollision,
    UnresolvedBoundary,
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LossReason::SelfCollision => write!(f, "the snake ran into itself"),
            LossReason::UnresolvedBoundary => {
                write!(f, "the snake left the board with no instance next to it")
            }
        }
    }
}
