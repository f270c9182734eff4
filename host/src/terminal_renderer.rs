use common::board_view::{BoardView, RenderAdapter};
use common::game::GamePhase;
use common::InstanceId;

/// Prints a board whenever what this instance may draw changes. Boards with
/// nothing on them are skipped, so a simulated session shows the owner's
/// board as the snake travels.
#[derive(Default)]
pub struct TerminalRenderer {
    last: Option<BoardView>,
    show_empty: bool,
}

impl TerminalRenderer {
    pub fn new(show_empty: bool) -> Self {
        Self {
            last: None,
            show_empty,
        }
    }
}

impl RenderAdapter for TerminalRenderer {
    fn render(&mut self, instance_id: &InstanceId, view: &BoardView) {
        if self.last.as_ref() == Some(view) {
            return;
        }
        self.last = Some(view.clone());

        let empty = view.snake.is_empty() && view.apple.is_none();
        if empty && !self.show_empty {
            return;
        }

        let mut out = format!("== {} ==\n{}", instance_id, view.render_ascii());
        match &view.phase {
            GamePhase::Idle => out.push_str("Waiting for a direction key.\n"),
            GamePhase::Moving(owner) if owner != instance_id => {
                out.push_str(&format!("The snake is on {}.\n", owner));
            }
            GamePhase::Moving(_) => {}
            GamePhase::Lost(reason) => out.push_str(&format!("You lost: {}.\n", reason)),
        }
        println!("{}", out);
    }
}
