use engine::{InputAction, InputSnapshot};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PauseChoice {
    Resume,
    QuitGame,
}

impl PauseChoice {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PauseChoice::Resume => "Resume",
            PauseChoice::QuitGame => "Quit game",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PauseEvent {
    Opened,
    Resumed,
    SelectionMoved,
    QuitChosen,
}

/// Player-opened pause panel. While open the level does not tick.
#[derive(Debug, Clone, Default)]
pub(crate) struct PauseMenu {
    open: bool,
    selected: usize,
}

impl PauseMenu {
    pub(crate) const CHOICES: [PauseChoice; 2] = [PauseChoice::Resume, PauseChoice::QuitGame];

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn selected(&self) -> PauseChoice {
        Self::CHOICES[self.selected]
    }

    /// The pause key toggles the panel; everything else only matters while
    /// it is open.
    pub(crate) fn update(&mut self, input: &InputSnapshot) -> Option<PauseEvent> {
        if input.was_pressed(InputAction::Pause) {
            if self.open {
                self.close();
                return Some(PauseEvent::Resumed);
            }
            self.open = true;
            self.selected = 0;
            info!("level_paused");
            return Some(PauseEvent::Opened);
        }
        if !self.open {
            return None;
        }
        if input.was_pressed(InputAction::Interact) {
            return Some(match self.selected() {
                PauseChoice::Resume => {
                    self.close();
                    PauseEvent::Resumed
                }
                PauseChoice::QuitGame => {
                    info!("pause_quit_chosen");
                    PauseEvent::QuitChosen
                }
            });
        }
        let step = if input.was_pressed(InputAction::MoveUp) {
            Self::CHOICES.len() - 1
        } else if input.was_pressed(InputAction::MoveDown) {
            1
        } else {
            return None;
        };
        self.selected = (self.selected + step) % Self::CHOICES.len();
        Some(PauseEvent::SelectionMoved)
    }

    pub(crate) fn close(&mut self) {
        if self.open {
            info!("level_resumed");
        }
        self.open = false;
        self.selected = 0;
    }
}
