use engine::Vec2;

use super::{clamp_to_box, MinigameInput, MinigameStatus, PanelRect};

const CURSOR_SPEED: f32 = 500.0;
const CURSOR_BOUNDS: Vec2 = Vec2::new(350.0, 230.0);
const CURSOR_START: Vec2 = Vec2::new(0.0, -180.0);
const PICK_RADIUS: f32 = 80.0;
const TIME_LIMIT_SECONDS: f32 = 15.0;
const HORN: PanelRect = PanelRect::new(Vec2::ZERO, Vec2::new(50.0, 50.0));
const TRASH_HALF_EXTENTS: Vec2 = Vec2::new(30.0, 30.0);
const TRASH_START: [Vec2; 4] = [
    Vec2::new(-25.0, 20.0),
    Vec2::new(25.0, 20.0),
    Vec2::new(-20.0, -25.0),
    Vec2::new(20.0, -25.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrashPiece {
    pub position: Vec2,
    pub cleared: bool,
}

/// Drag the trash off the golden horn, then pick the horn up.
#[derive(Debug, Clone)]
pub(crate) struct DragSort {
    cursor: Vec2,
    pieces: Vec<TrashPiece>,
    dragging: Option<usize>,
    horn_revealed: bool,
    remaining_seconds: f32,
}

impl Default for DragSort {
    fn default() -> Self {
        Self {
            cursor: CURSOR_START,
            pieces: TRASH_START
                .iter()
                .map(|&position| TrashPiece {
                    position,
                    cleared: false,
                })
                .collect(),
            dragging: None,
            horn_revealed: false,
            remaining_seconds: TIME_LIMIT_SECONDS,
        }
    }
}

impl DragSort {
    #[cfg(test)]
    pub(crate) fn pieces(&self) -> &[TrashPiece] {
        &self.pieces
    }

    #[cfg(test)]
    pub(crate) fn horn_revealed(&self) -> bool {
        self.horn_revealed
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, input: &MinigameInput) -> MinigameStatus {
        self.cursor = clamp_to_box(
            self.cursor + input.cursor_move * (CURSOR_SPEED * dt_seconds),
            CURSOR_BOUNDS,
        );

        if input.pressed {
            if self.horn_revealed && self.cursor.distance(HORN.center) <= PICK_RADIUS {
                return MinigameStatus::Succeeded;
            }
            self.dragging = self
                .pieces
                .iter()
                .position(|piece| {
                    !piece.cleared && self.cursor.distance(piece.position) <= PICK_RADIUS
                });
        }

        if let Some(index) = self.dragging {
            self.pieces[index].position = self.cursor;
        }

        if input.released {
            if let Some(index) = self.dragging.take() {
                let piece = &mut self.pieces[index];
                if !PanelRect::new(piece.position, TRASH_HALF_EXTENTS).overlaps(&HORN) {
                    piece.cleared = true;
                }
            }
            if !self.horn_revealed && self.pieces.iter().all(|piece| piece.cleared) {
                self.horn_revealed = true;
            }
        }

        self.remaining_seconds -= dt_seconds;
        if self.remaining_seconds <= 0.0 {
            self.remaining_seconds = 0.0;
            return MinigameStatus::Failed;
        }
        MinigameStatus::Active
    }

    pub(crate) fn status_lines(&self) -> Vec<String> {
        let cleared = self.pieces.iter().filter(|piece| piece.cleared).count();
        let goal = if self.horn_revealed {
            "Grab the golden horn!".to_string()
        } else {
            format!("Trash cleared: {cleared}/{}", self.pieces.len())
        };
        vec![
            "Dig out the horn".to_string(),
            goal,
            format!("{:.2}s", self.remaining_seconds.max(0.0)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn move_cursor_to(game: &mut DragSort, target: Vec2) {
        game.cursor = target;
    }

    fn press() -> MinigameInput {
        MinigameInput {
            pressed: true,
            held: true,
            ..MinigameInput::default()
        }
    }

    fn release() -> MinigameInput {
        MinigameInput {
            released: true,
            ..MinigameInput::default()
        }
    }

    fn drag_piece_away(game: &mut DragSort, index: usize, drop_at: Vec2) {
        move_cursor_to(game, game.pieces[index].position);
        assert_eq!(game.update(0.01, &press()), MinigameStatus::Active);
        move_cursor_to(game, drop_at);
        assert_eq!(game.update(0.01, &release()), MinigameStatus::Active);
    }

    #[test]
    fn cursor_is_clamped() {
        let mut game = DragSort::default();
        let input = MinigameInput {
            cursor_move: Vec2::new(-1.0, 0.0),
            ..MinigameInput::default()
        };
        game.update(2.0, &input);
        assert_eq!(game.cursor.x, -CURSOR_BOUNDS.x);
    }

    #[test]
    fn dropping_back_on_horn_keeps_piece() {
        let mut game = DragSort::default();
        drag_piece_away(&mut game, 0, Vec2::new(10.0, 0.0));
        assert!(!game.pieces()[0].cleared);
    }

    #[test]
    fn clearing_all_pieces_reveals_horn_then_press_succeeds() {
        let mut game = DragSort::default();
        let drops = [
            Vec2::new(-250.0, 150.0),
            Vec2::new(250.0, 150.0),
            Vec2::new(-250.0, -150.0),
            Vec2::new(250.0, -150.0),
        ];
        for (index, drop_at) in drops.into_iter().enumerate() {
            assert!(!game.horn_revealed());
            drag_piece_away(&mut game, index, drop_at);
        }
        assert!(game.pieces().iter().all(|piece| piece.cleared));
        assert!(game.horn_revealed());

        move_cursor_to(&mut game, Vec2::new(0.0, 30.0));
        assert_eq!(game.update(0.01, &press()), MinigameStatus::Succeeded);
    }

    #[test]
    fn press_on_hidden_horn_is_not_success() {
        let mut game = DragSort::default();
        move_cursor_to(&mut game, Vec2::ZERO);
        assert_eq!(game.update(0.01, &press()), MinigameStatus::Active);
    }

    #[test]
    fn times_out_after_fifteen_seconds() {
        let mut game = DragSort::default();
        assert_eq!(game.update(14.9, &MinigameInput::default()), MinigameStatus::Active);
        assert_eq!(game.update(0.2, &MinigameInput::default()), MinigameStatus::Failed);
    }
}
