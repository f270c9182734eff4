use crate::defaults::BOARD_SIZE;
use crate::game::{GamePhase, GameState, LossReason, Point};
use crate::InstanceId;

/// What one instance may draw: the snake only while it owns it, the apple
/// only while the apple is placed on its board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardView {
    /// Head first.
    pub snake: Vec<Point>,
    pub apple: Option<Point>,
    pub phase: GamePhase,
}

impl BoardView {
    pub fn for_instance(state: &GameState, instance_id: &InstanceId) -> Self {
        let snake = if state.is_owned_by(instance_id) {
            state.snake.clone()
        } else {
            Vec::new()
        };
        let apple = (state.apple_owner_id == *instance_id).then_some(state.apple);
        Self {
            snake,
            apple,
            phase: state.phase(),
        }
    }

    pub fn lost(&self) -> Option<LossReason> {
        match self.phase {
            GamePhase::Lost(reason) => Some(reason),
            _ => None,
        }
    }

    /// `BOARD_SIZE` rows of `BOARD_SIZE` characters: `@` head, `o` body,
    /// `*` apple, `.` empty. Cells outside the board are not drawn.
    pub fn render_ascii(&self) -> String {
        let size = BOARD_SIZE as usize;
        let mut grid = vec![vec!['.'; size]; size];
        let mut put = |point: Point, glyph: char| {
            if point.is_on_board() {
                grid[(point.y - 1) as usize][(point.x - 1) as usize] = glyph;
            }
        };

        if let Some(apple) = self.apple {
            put(apple, '*');
        }
        for (index, segment) in self.snake.iter().enumerate().rev() {
            put(*segment, if index == 0 { '@' } else { 'o' });
        }

        let mut out = String::with_capacity(size * (size + 1));
        for row in grid {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

/// Consumer of each frame's view; pixel drawing lives behind this.
pub trait RenderAdapter {
    fn render(&mut self, instance_id: &InstanceId, view: &BoardView);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        let mut state = GameState::new(InstanceId::from("a"));
        state.snake = vec![Point::new(2, 1), Point::new(1, 1)];
        state.apple = Point::new(3, 2);
        state.apple_owner_id = InstanceId::from("b");
        state
    }

    #[test]
    fn test_owner_sees_snake_only() {
        let view = BoardView::for_instance(&state(), &InstanceId::from("a"));
        assert_eq!(view.snake.len(), 2);
        assert!(view.apple.is_none());
    }

    #[test]
    fn test_apple_instance_sees_apple_only() {
        let view = BoardView::for_instance(&state(), &InstanceId::from("b"));
        assert!(view.snake.is_empty());
        assert_eq!(view.apple, Some(Point::new(3, 2)));
    }

    #[test]
    fn test_ascii_grid() {
        let mut state = state();
        state.apple_owner_id = InstanceId::from("a");
        let text = BoardView::for_instance(&state, &InstanceId::from("a")).render_ascii();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), BOARD_SIZE as usize);
        assert!(rows[0].starts_with("o@."));
        assert!(rows[1].starts_with("..*"));
        assert!(rows.iter().all(|row| row.len() == BOARD_SIZE as usize));
    }

    #[test]
    fn test_view_carries_phase() {
        let mut state = state();
        assert_eq!(
            BoardView::for_instance(&state, &InstanceId::from("b")).phase,
            GamePhase::Idle
        );

        state.direction = crate::game::Direction::UP;
        let view = BoardView::for_instance(&state, &InstanceId::from("b"));
        assert_eq!(view.phase, GamePhase::Moving(InstanceId::from("a")));
        assert_eq!(view.lost(), None);

        state.mark_lost(LossReason::SelfCollision);
        let view = BoardView::for_instance(&state, &InstanceId::from("b"));
        assert_eq!(view.lost(), Some(LossReason::SelfCollision));
    }
}
