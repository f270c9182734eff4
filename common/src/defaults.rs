/// Cells per side of every instance's board.
pub const BOARD_SIZE: i32 = 25;

/// Pixel size of one board cell, used to translate board coordinates into
/// absolute screen coordinates.
pub const CELL_SIZE: i32 = 20;

pub const GAME_STATE_KEY: &str = "game-state";
pub const INSTANCE_REGISTRY_KEY: &str = "instance-registry";

pub const DEFAULT_SNAKE_START: (i32, i32) = (11, 11);
pub const DEFAULT_APPLE: (i32, i32) = (5, 5);
