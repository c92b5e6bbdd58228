use engine::{InputSnapshot, Scene, SceneCommand, SceneKey, SceneWorld};
use tracing::{error, info};

use super::audio::TracingAudioSink;
use super::controller::{LevelController, LevelSignal};
use super::hud::write_level_hud;
use super::plan::LevelPlan;

/// Hosts one level at a time. Restarting and advancing both rebuild the level
/// through a hard reset of this scene.
pub(crate) struct LevelScene {
    own_key: SceneKey,
    menu_key: SceneKey,
    epilogue_key: SceneKey,
    start_level: Option<String>,
    requested_level: Option<String>,
    controller: Option<LevelController<TracingAudioSink>>,
}

impl LevelScene {
    pub(crate) fn new(
        own_key: SceneKey,
        menu_key: SceneKey,
        epilogue_key: SceneKey,
        start_level: Option<String>,
    ) -> Self {
        Self {
            own_key,
            menu_key,
            epilogue_key,
            requested_level: start_level.clone(),
            start_level,
            controller: None,
        }
    }

    /// Tears the running level down. The controller is dropped, so a second
    /// call is a no-op.
    fn retire_level(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.teardown();
        }
    }

    /// Leaves this scene for good; the next visit starts from the first level.
    fn leave_to(&mut self, key: SceneKey) -> SceneCommand {
        self.retire_level();
        self.requested_level = self.start_level.clone();
        SceneCommand::HardResetTo(key)
    }

    fn command_for(&mut self, signal: LevelSignal) -> SceneCommand {
        match signal {
            LevelSignal::Continue => SceneCommand::None,
            LevelSignal::Restart => {
                info!(level = ?self.requested_level, "level_restart");
                SceneCommand::HardResetTo(self.own_key)
            }
            LevelSignal::Advance(Some(next)) => {
                self.requested_level = Some(next);
                SceneCommand::HardResetTo(self.own_key)
            }
            LevelSignal::Advance(None) => self.leave_to(self.epilogue_key),
            LevelSignal::QuitToMenu => {
                info!(level = ?self.requested_level, "level_quit_to_menu");
                self.leave_to(self.menu_key)
            }
            LevelSignal::Quit => SceneCommand::Exit,
        }
    }
}

impl Scene for LevelScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let Some(defs) = world.def_database() else {
            error!("level_load_failed_no_content");
            return;
        };
        let audio = TracingAudioSink::from_defs(defs);
        let plan = match LevelPlan::resolve(defs, self.requested_level.as_deref()) {
            Ok(plan) => plan,
            Err(err) => {
                error!(error = %err, "level_load_failed");
                return;
            }
        };
        self.requested_level = Some(plan.def_name.clone());

        let mut controller = LevelController::new(plan, audio);
        controller.spawn_into(world);
        write_level_hud(&controller, world.hud_mut());
        info!(
            level = controller.def_name(),
            entity_count = world.entity_count(),
            "level_loaded"
        );
        self.controller = Some(controller);
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
        let Some(controller) = self.controller.as_mut() else {
            return SceneCommand::Exit;
        };
        let signal = controller.update(fixed_dt_seconds, input);
        controller.sync_world(world);
        write_level_hud(controller, world.hud_mut());
        self.command_for(signal)
    }

    fn render(&mut self, _world: &SceneWorld) {}

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.retire_level();
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let controller = self.controller.as_ref()?;
        Some(format!(
            "{} | {}",
            controller.label(),
            controller.timer().text()
        ))
    }
}
