//! The per-instance frame step. Time is passed in, so a test can step the
//! driver through any sequence of frames without a real clock.

use std::time::Duration;

use crate::game::{
    GameState, HandoffOutcome, LossReason, advance, check_apple_collision,
    detect_self_collision, resolve_boundary,
};
use crate::instance::InstanceContext;
use crate::registry::InstanceRegistry;
use crate::store::StoreError;
use crate::InstanceId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Less than one tick interval since the last tick.
    Throttled,
    /// Another instance owns the snake; this one only renders.
    NotOwner,
    Stepped(StepReport),
    Lost(LossReason),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub moved: bool,
    pub ate_apple: bool,
    pub handed_off_to: Option<InstanceId>,
    pub wrapped: bool,
}

/// What one frame produced: the state every instance renders from, and what
/// (if anything) this instance did to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub state: Option<GameState>,
    pub outcome: TickOutcome,
}

pub struct TickDriver {
    tick_interval: Duration,
    last_tick: Option<Duration>,
}

impl TickDriver {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            last_tick: None,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    fn is_due(&self, now: Duration) -> bool {
        match self.last_tick {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.tick_interval,
        }
    }

    /// One frame at time `now` (measured from any fixed origin).
    pub fn frame(&mut self, ctx: &mut InstanceContext, now: Duration) -> Result<Frame, StoreError> {
        if let Some(reason) = ctx.terminal() {
            return Ok(Frame {
                state: GameState::load(ctx.store())?,
                outcome: TickOutcome::Lost(reason),
            });
        }

        let mut state = ctx.load_or_bootstrap()?;
        if let Some(reason) = state.loss_reason() {
            ctx.mark_terminal(reason);
            return Ok(Frame {
                state: Some(state),
                outcome: TickOutcome::Lost(reason),
            });
        }

        if !self.is_due(now) {
            return Ok(Frame {
                state: Some(state),
                outcome: TickOutcome::Throttled,
            });
        }
        self.last_tick = Some(now);

        if !state.is_owned_by(ctx.instance_id()) {
            return Ok(Frame {
                state: Some(state),
                outcome: TickOutcome::NotOwner,
            });
        }

        let outcome = step_owned(ctx, &mut state);
        state.save(ctx.store())?;
        if let TickOutcome::Lost(reason) = outcome {
            ctx.mark_terminal(reason);
        }
        Ok(Frame {
            state: Some(state),
            outcome,
        })
    }
}

/// One tick by the owning instance: move, collide, eat, and hand off at the
/// edge. Marks the state lost on a collision or an unresolved edge.
pub fn step_owned(ctx: &mut InstanceContext, state: &mut GameState) -> TickOutcome {
    let mut report = StepReport {
        moved: advance(state),
        ..StepReport::default()
    };

    if report.moved && detect_self_collision(state) {
        state.mark_lost(LossReason::SelfCollision);
        return TickOutcome::Lost(LossReason::SelfCollision);
    }

    let instance_id = ctx.instance_id().clone();
    let geometry = ctx.geometry();
    let policy = ctx.policy();
    let store = ctx.store_handle();
    let registry = InstanceRegistry::new(store.as_ref());

    report.ate_apple = check_apple_collision(state, &registry, ctx.rng());

    if report.moved {
        match resolve_boundary(state, &instance_id, &geometry, &registry, policy) {
            HandoffOutcome::Stayed => return TickOutcome::Stepped(report),
            HandoffOutcome::HandedOff(next) => report.handed_off_to = Some(next),
            HandoffOutcome::Wrapped => report.wrapped = true,
            HandoffOutcome::Unresolved => {
                state.mark_lost(LossReason::UnresolvedBoundary);
                return TickOutcome::Lost(LossReason::UnresolvedBoundary);
            }
        }

        // The head was placed on the entry edge; it may have landed on the body.
        if detect_self_collision(state) {
            state.mark_lost(LossReason::SelfCollision);
            return TickOutcome::Lost(LossReason::SelfCollision);
        }
    }

    TickOutcome::Stepped(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::defaults::BOARD_SIZE;
    use crate::game::{Direction, GameRng, HandoffPolicy, Point};
    use crate::registry::Geometry;
    use crate::store::{MemoryStore, SharedStore};

    const INTERVAL: Duration = Duration::from_millis(100);

    fn join(store: &MemoryStore, id: &str, geometry: Geometry) -> InstanceContext {
        join_with(store, id, geometry, HandoffPolicy::default())
    }

    fn join_with(
        store: &MemoryStore,
        id: &str,
        geometry: Geometry,
        policy: HandoffPolicy,
    ) -> InstanceContext {
        let ctx = InstanceContext::new(Arc::new(store.clone()), InstanceId::from(id), geometry, policy)
            .with_rng(GameRng::new(42));
        ctx.announce().unwrap();
        ctx
    }

    fn set_snake(store: &MemoryStore, snake: &[(i32, i32)], direction: Direction) {
        let mut state = GameState::load(store).unwrap().unwrap();
        state.snake = snake.iter().map(|&(x, y)| Point::new(x, y)).collect();
        state.direction = direction;
        state.save(store).unwrap();
    }

    fn stepped(frame: &Frame) -> &StepReport {
        match &frame.outcome {
            TickOutcome::Stepped(report) => report,
            other => panic!("expected a step, got {:?}", other),
        }
    }

    #[test]
    fn test_lone_instance_loses_at_right_edge() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "a", Geometry::new(0, 0, 500, 500));
        set_snake(&store, &[(BOARD_SIZE - 1, 12)], Direction::RIGHT);

        let mut driver = TickDriver::new(INTERVAL);
        let frame = driver.frame(&mut ctx, Duration::ZERO).unwrap();

        assert_eq!(frame.outcome, TickOutcome::Lost(LossReason::UnresolvedBoundary));
        assert_eq!(ctx.terminal(), Some(LossReason::UnresolvedBoundary));
        assert_eq!(
            GameState::load(&store).unwrap().unwrap().loss_reason(),
            Some(LossReason::UnresolvedBoundary)
        );
    }

    #[test]
    fn test_idle_snake_on_apple_grows() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "a", Geometry::new(0, 0, 500, 500));
        let mut state = GameState::load(&store).unwrap().unwrap();
        state.snake = vec![Point::new(5, 5)];
        state.apple = Point::new(5, 5);
        state.save(&store).unwrap();

        let mut driver = TickDriver::new(INTERVAL);
        let frame = driver.frame(&mut ctx, Duration::ZERO).unwrap();
        let report = stepped(&frame);
        assert!(report.ate_apple);
        assert!(!report.moved);

        let state = GameState::load(&store).unwrap().unwrap();
        assert_eq!(state.snake.len(), 2);
        assert_ne!(state.apple, Point::new(5, 5));
        assert!(!state.occupies(state.apple));

        // Standing still on its own grown tail is not a collision.
        let frame = driver.frame(&mut ctx, INTERVAL).unwrap();
        assert!(matches!(frame.outcome, TickOutcome::Stepped(_)));
    }

    #[test]
    fn test_turning_into_body_loses() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "a", Geometry::new(0, 0, 500, 500));
        set_snake(
            &store,
            &[(6, 6), (7, 6), (7, 5), (6, 5), (5, 5)],
            Direction::UP,
        );

        let mut driver = TickDriver::new(INTERVAL);
        let frame = driver.frame(&mut ctx, Duration::ZERO).unwrap();
        assert_eq!(frame.outcome, TickOutcome::Lost(LossReason::SelfCollision));
    }

    #[test]
    fn test_snake_crosses_into_instance_below() {
        let store = MemoryStore::new();
        let mut top = join(&store, "a", Geometry::new(0, 0, 500, 500));
        let mut bottom = join(&store, "b", Geometry::new(0, 540, 500, 500));
        set_snake(&store, &[(10, BOARD_SIZE - 1), (10, BOARD_SIZE - 2)], Direction::DOWN);

        let mut top_driver = TickDriver::new(INTERVAL);
        let mut bottom_driver = TickDriver::new(INTERVAL);

        assert_eq!(
            bottom_driver.frame(&mut bottom, Duration::ZERO).unwrap().outcome,
            TickOutcome::NotOwner
        );

        let frame = top_driver.frame(&mut top, Duration::ZERO).unwrap();
        assert_eq!(stepped(&frame).handed_off_to, Some(InstanceId::from("b")));
        let state = frame.state.unwrap();
        assert_eq!(state.snake_owner_id, InstanceId::from("b"));
        assert_eq!(state.head(), Point::new(10, 1));

        let frame = bottom_driver.frame(&mut bottom, INTERVAL).unwrap();
        assert!(stepped(&frame).moved);
        assert_eq!(frame.state.unwrap().head(), Point::new(10, 2));

        assert_eq!(
            top_driver.frame(&mut top, INTERVAL).unwrap().outcome,
            TickOutcome::NotOwner
        );
    }

    #[test]
    fn test_ticks_are_throttled_to_speed() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "a", Geometry::new(0, 0, 500, 500));
        set_snake(&store, &[(5, 5)], Direction::RIGHT);

        let mut driver = TickDriver::new(INTERVAL);
        assert!(stepped(&driver.frame(&mut ctx, Duration::ZERO).unwrap()).moved);
        let frame = driver.frame(&mut ctx, Duration::from_millis(40)).unwrap();
        assert_eq!(frame.outcome, TickOutcome::Throttled);
        // Throttled frames still carry the state for rendering.
        assert_eq!(frame.state.unwrap().head(), Point::new(6, 5));
        assert!(stepped(&driver.frame(&mut ctx, Duration::from_millis(100)).unwrap()).moved);
        assert_eq!(GameState::load(&store).unwrap().unwrap().head(), Point::new(7, 5));
    }

    #[test]
    fn test_loss_is_observed_by_other_instances() {
        let store = MemoryStore::new();
        let mut owner = join(&store, "a", Geometry::new(0, 0, 500, 500));
        let mut far = join(&store, "b", Geometry::new(0, 5000, 500, 500));
        set_snake(&store, &[(BOARD_SIZE - 1, 12)], Direction::RIGHT);

        TickDriver::new(INTERVAL).frame(&mut owner, Duration::ZERO).unwrap();

        let mut driver = TickDriver::new(INTERVAL);
        let frame = driver.frame(&mut far, Duration::ZERO).unwrap();
        assert_eq!(frame.outcome, TickOutcome::Lost(LossReason::UnresolvedBoundary));
        assert_eq!(far.terminal(), Some(LossReason::UnresolvedBoundary));
    }

    #[test]
    fn test_terminal_instance_stops_advancing() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "a", Geometry::new(0, 0, 500, 500));
        set_snake(&store, &[(5, 5)], Direction::RIGHT);
        ctx.mark_terminal(LossReason::SelfCollision);

        let frame = TickDriver::new(INTERVAL).frame(&mut ctx, Duration::ZERO).unwrap();
        assert_eq!(frame.outcome, TickOutcome::Lost(LossReason::SelfCollision));
        assert_eq!(GameState::load(&store).unwrap().unwrap().head(), Point::new(5, 5));
    }

    #[test]
    fn test_cleared_session_bootstraps_on_next_frame() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "b", Geometry::new(0, 0, 500, 500));
        store.clear().unwrap();

        let frame = TickDriver::new(INTERVAL).frame(&mut ctx, Duration::ZERO).unwrap();
        assert!(frame.state.unwrap().is_owned_by(&InstanceId::from("b")));
    }

    #[test]
    fn test_state_off_the_board_is_replaced_not_advanced() {
        let store = MemoryStore::new();
        let mut ctx = join(&store, "a", Geometry::new(0, 0, 500, 500));
        set_snake(&store, &[(i32::MAX, 3)], Direction::RIGHT);

        let frame = TickDriver::new(INTERVAL).frame(&mut ctx, Duration::ZERO).unwrap();
        assert!(!stepped(&frame).moved);
        let state = frame.state.unwrap();
        assert_eq!(state.snake, vec![Point::new(11, 11)]);
        assert_eq!(state.direction, Direction::IDLE);
    }

    #[test]
    fn test_lone_wrapping_snake_never_overlaps_itself() {
        let store = MemoryStore::new();
        let policy = HandoffPolicy {
            wrap_when_alone: true,
            ..HandoffPolicy::default()
        };
        let mut ctx = join_with(&store, "a", Geometry::new(0, 0, 500, 500), policy);
        set_snake(&store, &[(11, 11)], Direction::RIGHT);

        let mut driver = TickDriver::new(INTERVAL);
        let turns = [Direction::DOWN, Direction::LEFT, Direction::UP, Direction::RIGHT];
        for tick in 0..400u32 {
            if tick % 9 == 0 {
                let mut state = GameState::load(&store).unwrap().unwrap();
                let next = turns[(tick / 9) as usize % turns.len()];
                if state.direction.accepts(next) {
                    state.direction = next;
                    state.save(&store).unwrap();
                }
            }

            let frame = driver.frame(&mut ctx, INTERVAL * tick).unwrap();
            let report = match frame.outcome {
                TickOutcome::Stepped(report) => report,
                TickOutcome::Lost(_) => break,
                other => panic!("unexpected outcome {:?}", other),
            };
            let state = frame.state.unwrap();
            let head = state.head();
            assert!((1..=BOARD_SIZE).contains(&head.x) && (1..=BOARD_SIZE).contains(&head.y));
            if !report.ate_apple {
                for (i, segment) in state.snake.iter().enumerate() {
                    assert!(!state.snake[i + 1..].contains(segment));
                }
            }
        }
    }
}
