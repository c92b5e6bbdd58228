use engine::{
    HudAnchor, HudPanel, HudTone, InputAction, InputSnapshot, Scene, SceneCommand, SceneKey,
    SceneWorld,
};
use tracing::info;

const TITLE: &str = "SCAVENGE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Play,
    Exit,
}

impl MenuChoice {
    const ALL: [MenuChoice; 2] = [MenuChoice::Play, MenuChoice::Exit];

    fn label(self) -> &'static str {
        match self {
            MenuChoice::Play => "Play",
            MenuChoice::Exit => "Exit",
        }
    }
}

/// Title screen. Play starts the level scene from scratch.
pub(crate) struct MenuScene {
    level_key: SceneKey,
    selected: usize,
}

impl MenuScene {
    pub(crate) fn new(level_key: SceneKey) -> Self {
        Self {
            level_key,
            selected: 0,
        }
    }

    fn selected(&self) -> MenuChoice {
        MenuChoice::ALL[self.selected]
    }

    fn write_hud(&self, world: &mut SceneWorld) {
        let hud = world.hud_mut();
        hud.clear();
        let mut panel = HudPanel::new(HudAnchor::Center).with_line(TITLE, HudTone::Accent);
        for choice in MenuChoice::ALL {
            let marker = if choice == self.selected() { ">" } else { " " };
            panel = panel.with_line(format!("{marker} {}", choice.label()), HudTone::Primary);
        }
        hud.push_panel(panel);
        hud.push_panel(
            HudPanel::new(HudAnchor::BottomCenter)
                .with_line("W/S to choose, E to confirm", HudTone::Dim),
        );
    }
}

impl Scene for MenuScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.selected = 0;
        self.write_hud(world);
        info!("main_menu_shown");
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Exit;
        }
        if input.was_pressed(InputAction::Interact) {
            let choice = self.selected();
            info!(choice = choice.label(), "menu_choice");
            return match choice {
                MenuChoice::Play => SceneCommand::HardResetTo(self.level_key),
                MenuChoice::Exit => SceneCommand::Exit,
            };
        }
        if input.was_pressed(InputAction::MoveUp) {
            self.selected = (self.selected + MenuChoice::ALL.len() - 1) % MenuChoice::ALL.len();
        } else if input.was_pressed(InputAction::MoveDown) {
            self.selected = (self.selected + 1) % MenuChoice::ALL.len();
        }
        self.write_hud(world);
        SceneCommand::None
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, _world: &mut SceneWorld) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: SceneKey = SceneKey(1);

    fn pressed(action: InputAction) -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(action)
    }

    fn loaded() -> (MenuScene, SceneWorld) {
        let mut scene = MenuScene::new(LEVEL);
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        (scene, world)
    }

    #[test]
    fn play_starts_the_level_fresh() {
        let (mut scene, mut world) = loaded();
        assert_eq!(
            scene.update(0.1, &pressed(InputAction::Interact), &mut world),
            SceneCommand::HardResetTo(LEVEL)
        );
    }

    #[test]
    fn exit_choice_quits_and_selection_wraps() {
        let (mut scene, mut world) = loaded();
        assert_eq!(
            scene.update(0.1, &pressed(InputAction::MoveUp), &mut world),
            SceneCommand::None
        );
        let panel = world.hud().find_panel(HudAnchor::Center).expect("menu panel");
        let texts: Vec<&str> = panel.lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec![TITLE, "  Play", "> Exit"]);
        assert_eq!(
            scene.update(0.1, &pressed(InputAction::Interact), &mut world),
            SceneCommand::Exit
        );
    }

    #[test]
    fn window_close_exits() {
        let (mut scene, mut world) = loaded();
        let close = InputSnapshot::empty().with_quit_requested();
        assert_eq!(scene.update(0.1, &close, &mut world), SceneCommand::Exit);
    }

    #[test]
    fn reload_resets_selection() {
        let (mut scene, mut world) = loaded();
        scene.update(0.1, &pressed(InputAction::MoveDown), &mut world);
        scene.load(&mut world);
        assert_eq!(
            scene.update(0.1, &pressed(InputAction::Interact), &mut world),
            SceneCommand::HardResetTo(LEVEL)
        );
    }
}
