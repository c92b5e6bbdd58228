use tracing::debug;

/// Which control set currently receives input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum InputRouting {
    #[default]
    Character,
    Minigame,
    Cutscene,
}

impl InputRouting {
    pub(crate) fn character_enabled(self) -> bool {
        self == InputRouting::Character
    }

    pub(crate) fn enter_minigame(&mut self) {
        self.switch(InputRouting::Minigame);
    }

    pub(crate) fn exit_minigame(&mut self) {
        if *self == InputRouting::Minigame {
            self.switch(InputRouting::Character);
        }
    }

    pub(crate) fn enter_cutscene(&mut self) {
        self.switch(InputRouting::Cutscene);
    }

    pub(crate) fn exit_cutscene(&mut self) {
        if *self == InputRouting::Cutscene {
            self.switch(InputRouting::Character);
        }
    }

    fn switch(&mut self, next: InputRouting) {
        if *self != next {
            debug!(from = ?*self, to = ?next, "input_routing_changed");
            *self = next;
        }
    }
}
