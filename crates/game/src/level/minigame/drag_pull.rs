use engine::Vec2;

use super::{clamp_to_box, MinigameInput, MinigameStatus, PanelRect};

const CURSOR_SPEED: f32 = 500.0;
const PULL_SPEED: f32 = 200.0;
const GRAB_RADIUS: f32 = 50.0;
const TIME_LIMIT_SECONDS: f32 = 10.0;
const PIPE_HALF_EXTENTS: Vec2 = Vec2::new(100.0, 300.0);
const CURSOR_INSET: f32 = 30.0;
const ITEM_START: Vec2 = Vec2::new(0.0, -200.0);
const ITEM_HALF_EXTENTS: Vec2 = Vec2::new(20.0, 20.0);
const TARGET: PanelRect = PanelRect::new(Vec2::new(0.0, 240.0), Vec2::new(60.0, 20.0));

/// Hook the item at the bottom of the pipe and drag it up into the target.
#[derive(Debug, Clone)]
pub(crate) struct DragPull {
    cursor: Vec2,
    item: Vec2,
    grabbing: bool,
    remaining_seconds: f32,
}

impl Default for DragPull {
    fn default() -> Self {
        Self {
            cursor: Vec2::ZERO,
            item: ITEM_START,
            grabbing: false,
            remaining_seconds: TIME_LIMIT_SECONDS,
        }
    }
}

impl DragPull {
    #[cfg(test)]
    pub(crate) fn cursor(&self) -> Vec2 {
        self.cursor
    }

    #[cfg(test)]
    pub(crate) fn item(&self) -> Vec2 {
        self.item
    }

    #[cfg(test)]
    pub(crate) fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    pub(crate) fn update(&mut self, dt_seconds: f32, input: &MinigameInput) -> MinigameStatus {
        if !input.held {
            self.grabbing = false;
        } else if self.cursor.distance(self.item) <= GRAB_RADIUS {
            self.grabbing = true;
        }

        let bounds = Vec2::new(
            PIPE_HALF_EXTENTS.x - CURSOR_INSET,
            PIPE_HALF_EXTENTS.y - CURSOR_INSET,
        );
        self.cursor = clamp_to_box(
            self.cursor + input.cursor_move * (CURSOR_SPEED * dt_seconds),
            bounds,
        );

        if self.grabbing {
            let direction = (self.cursor - self.item).normalized_or_zero();
            let mut next = self.item + direction * (PULL_SPEED * dt_seconds);
            next.y = next.y.max(ITEM_START.y);
            self.item = next;
        }

        if PanelRect::new(self.item, ITEM_HALF_EXTENTS).overlaps(&TARGET) {
            return MinigameStatus::Succeeded;
        }

        self.remaining_seconds -= dt_seconds;
        if self.remaining_seconds <= 0.0 {
            self.remaining_seconds = 0.0;
            return MinigameStatus::Failed;
        }
        MinigameStatus::Active
    }

    pub(crate) fn status_lines(&self) -> Vec<String> {
        let travel = TARGET.center.y - ITEM_START.y;
        let progress = ((self.item.y - ITEM_START.y) / travel).clamp(0.0, 1.0);
        let filled = (progress * 20.0).round() as usize;
        vec![
            "Pull the item out of the pipe".to_string(),
            format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled)),
            format!(
                "{} {:.2}s",
                if self.grabbing { "Holding" } else { "Hold E near it" },
                self.remaining_seconds.max(0.0)
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    fn steer(direction: Vec2, held: bool) -> MinigameInput {
        MinigameInput {
            cursor_move: direction,
            held,
            ..MinigameInput::default()
        }
    }

    #[test]
    fn cursor_is_clamped_inside_pipe() {
        let mut game = DragPull::default();
        game.update(5.0, &steer(Vec2::new(1.0, 0.0), false));
        assert_eq!(game.cursor().x, PIPE_HALF_EXTENTS.x - CURSOR_INSET);
    }

    #[test]
    fn press_far_from_item_does_not_grab() {
        let mut game = DragPull::default();
        let press = MinigameInput {
            pressed: true,
            held: true,
            ..MinigameInput::default()
        };
        game.update(TICK, &press);
        assert!(!game.is_grabbing());
    }

    #[test]
    fn grab_and_pull_up_reaches_target() {
        let mut game = DragPull::default();
        // Cursor from (0,0) down to the item at (0,-200): 0.4 s at 500/s.
        for _ in 0..24 {
            game.update(TICK, &steer(Vec2::new(0.0, -1.0), false));
        }
        let press = MinigameInput {
            pressed: true,
            held: true,
            ..MinigameInput::default()
        };
        game.update(TICK, &press);
        assert!(game.is_grabbing());

        let mut status = MinigameStatus::Active;
        for _ in 0..600 {
            status = game.update(TICK, &steer(Vec2::new(0.0, 1.0), true));
            if status != MinigameStatus::Active {
                break;
            }
        }
        assert_eq!(status, MinigameStatus::Succeeded);
    }

    #[test]
    fn holding_while_sweeping_onto_item_grabs_it() {
        let mut game = DragPull::default();
        for _ in 0..24 {
            game.update(TICK, &steer(Vec2::new(0.0, -1.0), true));
        }
        assert!(game.is_grabbing());
    }

    #[test]
    fn item_never_drops_below_start() {
        let mut game = DragPull {
            grabbing: true,
            cursor: Vec2::new(0.0, -270.0),
            ..DragPull::default()
        };
        game.update(0.5, &steer(Vec2::ZERO, true));
        assert!(game.item().y >= ITEM_START.y);
    }

    #[test]
    fn release_stops_pulling() {
        let mut game = DragPull {
            grabbing: true,
            cursor: Vec2::new(0.0, 100.0),
            ..DragPull::default()
        };
        let release = MinigameInput {
            released: true,
            ..MinigameInput::default()
        };
        game.update(TICK, &release);
        assert!(!game.is_grabbing());
        assert_eq!(game.item(), ITEM_START);
    }

    #[test]
    fn times_out_after_ten_seconds() {
        let mut game = DragPull::default();
        let mut status = MinigameStatus::Active;
        for _ in 0..601 {
            status = game.update(TICK, &MinigameInput::default());
            if status != MinigameStatus::Active {
                break;
            }
        }
        assert_eq!(status, MinigameStatus::Failed);
    }
}
