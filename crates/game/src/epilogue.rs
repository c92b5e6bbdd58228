use engine::{
    HudAnchor, HudPanel, HudTone, InputAction, InputSnapshot, Scene, SceneCommand, SceneKey,
    SceneWorld,
};
use tracing::info;

const FADE_IN_SECONDS: f32 = 1.0;
const CLOSING_LINES: [&str; 3] = [
    "The truck rolls out with the last of the trash.",
    "Somewhere, a golden horn sounds.",
    "Thanks for playing!",
];

/// Closing screen after the last level. Hands back to the main menu.
#[derive(Debug)]
pub(crate) struct EpilogueScene {
    menu_key: SceneKey,
    finished: bool,
    elapsed: f32,
}

impl EpilogueScene {
    pub(crate) fn new(menu_key: SceneKey) -> Self {
        Self {
            menu_key,
            finished: false,
            elapsed: 0.0,
        }
    }

    fn write_hud(&self, world: &mut SceneWorld) {
        let opacity = (self.elapsed / FADE_IN_SECONDS).min(1.0);
        let hud = world.hud_mut();
        hud.clear();
        let mut panel = HudPanel::new(HudAnchor::Center).with_opacity(opacity);
        for line in CLOSING_LINES {
            panel = panel.with_line(line, HudTone::Primary);
        }
        hud.push_panel(panel);
        if opacity >= 1.0 {
            hud.push_panel(
                HudPanel::new(HudAnchor::BottomCenter)
                    .with_line("Press E to return to menu", HudTone::Dim),
            );
        }
    }
}

impl Scene for EpilogueScene {
    fn load(&mut self, world: &mut SceneWorld) {
        info!("epilogue_started");
        self.finished = false;
        self.elapsed = 0.0;
        self.write_hud(world);
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Exit;
        }
        self.elapsed += fixed_dt_seconds;
        self.write_hud(world);
        if !self.finished
            && self.elapsed >= FADE_IN_SECONDS
            && input.was_pressed(InputAction::Interact)
        {
            self.finished = true;
            info!("epilogue_finished");
            return SceneCommand::HardResetTo(self.menu_key);
        }
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, _world: &mut SceneWorld) {}
}
