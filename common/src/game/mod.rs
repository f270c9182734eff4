mod engine;
mod game_rng;
mod game_state;
mod handoff;
mod types;

pub use engine::{
    advance, check_apple_collision, detect_apple_collision, detect_self_collision, eat_apple,
    relocate_apple,
};
pub use game_rng::GameRng;
pub use game_state::{GamePhase, GameState, GameStatus};
pub use handoff::{
    CoordinateRemap, HandoffOutcome, HandoffPolicy, crossed_axis, find_aligned_instance,
    resolve_boundary, transfer_ownership,
};
pub use types::{Axis, Direction, LossReason, Point};
