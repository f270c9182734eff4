//! Passing the snake to the instance whose viewport continues the board edge
//! the head just reached. Adjacency is derived only from the geometries the
//! instances report about themselves.

use serde::{Deserialize, Serialize};

use crate::defaults::{BOARD_SIZE, CELL_SIZE};
use crate::log;
use crate::registry::{Geometry, InstanceDescriptor, InstanceRegistry};
use crate::InstanceId;
use super::game_state::GameState;
use super::types::{Axis, Point};

/// How the head's coordinate along the edge is carried into the next board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateRemap {
    /// Keep the board coordinate as is. Only correct when every instance sits
    /// on the same pixel grid.
    Preserve,
    /// Go through absolute screen pixels into the target's board.
    Translate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandoffPolicy {
    pub remap: CoordinateRemap,
    /// With no other instance registered, wrap around the own board instead
    /// of ending the game.
    pub wrap_when_alone: bool,
}

impl Default for HandoffPolicy {
    fn default() -> Self {
        Self {
            remap: CoordinateRemap::Translate,
            wrap_when_alone: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The head is not on an edge it is moving across.
    Stayed,
    HandedOff(InstanceId),
    Wrapped,
    Unresolved,
}

/// The axis whose edge the head has reached while moving toward it. The
/// horizontal axis is checked first.
pub fn crossed_axis(state: &GameState) -> Option<Axis> {
    let head = state.head();
    [Axis::Horizontal, Axis::Vertical].into_iter().find(|&axis| {
        let step = state.direction.component(axis);
        let coordinate = head.along(axis);
        (step < 0 && coordinate <= 1) || (step > 0 && coordinate >= BOARD_SIZE)
    })
}

/// Screen pixel of the head along `axis` for a board placed at `geometry`.
fn absolute_coordinate(geometry: &Geometry, head: Point, axis: Axis) -> i32 {
    geometry.origin(axis) + head.along(axis) * CELL_SIZE
}

/// First registered instance, other than `self_id`, whose viewport spans the
/// head's screen position along the edge. The span is widened by one cell on
/// each side.
pub fn find_aligned_instance(
    crossed: Axis,
    head: Point,
    self_id: &InstanceId,
    self_geometry: &Geometry,
    registry: &InstanceRegistry<'_>,
) -> Option<InstanceDescriptor> {
    let along = crossed.other();
    let abs_coord = absolute_coordinate(self_geometry, head, along);

    registry.list_all().find(|candidate| {
        if candidate.instance_id == *self_id {
            return false;
        }
        let origin = candidate.geometry.origin(along);
        let extent = candidate.geometry.extent(along);
        origin + CELL_SIZE <= abs_coord && origin + extent + CELL_SIZE >= abs_coord
    })
}

/// Moves the head to the entry edge of the next board and re-points the
/// snake at its new owner.
pub fn transfer_ownership(
    state: &mut GameState,
    next: &InstanceDescriptor,
    crossed: Axis,
    self_geometry: &Geometry,
    remap: CoordinateRemap,
) {
    let along = crossed.other();
    let entry = entry_coordinate(state, crossed);
    let head = state.head();
    let carried = match remap {
        CoordinateRemap::Preserve => head.along(along),
        CoordinateRemap::Translate => {
            let pixels = absolute_coordinate(self_geometry, head, along) - next.geometry.origin(along);
            pixels.div_euclid(CELL_SIZE).clamp(1, BOARD_SIZE)
        }
    };

    state.snake_owner_id = next.instance_id.clone();
    let head = state.head_mut();
    head.set_along(crossed, entry);
    head.set_along(along, carried);
}

/// The edge opposite the exit: leaving toward positive enters at 1.
fn entry_coordinate(state: &GameState, crossed: Axis) -> i32 {
    if state.direction.component(crossed) > 0 {
        1
    } else {
        BOARD_SIZE
    }
}

/// Runs after the snake moved. On an edge, looks for the next owner; failing
/// that, wraps on the own board when this instance is the only one registered
/// and the policy allows it.
pub fn resolve_boundary(
    state: &mut GameState,
    self_id: &InstanceId,
    self_geometry: &Geometry,
    registry: &InstanceRegistry<'_>,
    policy: HandoffPolicy,
) -> HandoffOutcome {
    let Some(crossed) = crossed_axis(state) else {
        return HandoffOutcome::Stayed;
    };

    let head = state.head();
    if let Some(next) = find_aligned_instance(crossed, head, self_id, self_geometry, registry) {
        transfer_ownership(state, &next, crossed, self_geometry, policy.remap);
        log!(
            "[{}] handed the snake to {}, head now at ({}, {})",
            self_id,
            next.instance_id,
            state.head().x,
            state.head().y
        );
        return HandoffOutcome::HandedOff(next.instance_id);
    }

    if policy.wrap_when_alone && is_only_instance(self_id, registry) {
        let entry = entry_coordinate(state, crossed);
        state.head_mut().set_along(crossed, entry);
        return HandoffOutcome::Wrapped;
    }

    log!(
        "[{}] no instance continues the board at ({}, {})",
        self_id,
        head.x,
        head.y
    );
    HandoffOutcome::Unresolved
}

fn is_only_instance(self_id: &InstanceId, registry: &InstanceRegistry<'_>) -> bool {
    let mut all = registry.list_all();
    matches!((all.next(), all.next()), (Some(only), None) if only.instance_id == *self_id)
}
