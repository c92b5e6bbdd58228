use engine::{ContentRequest, LoopConfig, Scene, SceneKey};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::epilogue::EpilogueScene;
use crate::level::LevelScene;
use crate::menu::MenuScene;

const ENABLED_MODS_ENV_VAR: &str = "SCAVENGE_ENABLED_MODS";
const START_LEVEL_ENV_VAR: &str = "SCAVENGE_START_LEVEL";

const MENU_SCENE: SceneKey = SceneKey(0);
const LEVEL_SCENE: SceneKey = SceneKey(1);
const EPILOGUE_SCENE: SceneKey = SceneKey(2);

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scenes: Vec<Box<dyn Scene>>,
    pub(crate) initial_scene: SceneKey,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Scavenge Startup ===");

    let start_level = std::env::var(START_LEVEL_ENV_VAR)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|level| !level.is_empty());
    if let Some(level) = &start_level {
        info!(level = %level, "start_level_override");
    }
    // Order matches the scene keys above.
    let scenes: Vec<Box<dyn Scene>> = vec![
        Box::new(MenuScene::new(LEVEL_SCENE)),
        Box::new(LevelScene::new(
            LEVEL_SCENE,
            MENU_SCENE,
            EPILOGUE_SCENE,
            start_level,
        )),
        Box::new(EpilogueScene::new(MENU_SCENE)),
    ];
    let config = LoopConfig {
        content_request: ContentRequest {
            enabled_mods: read_list_env(ENABLED_MODS_ENV_VAR),
            compiler_version: env!("CARGO_PKG_VERSION").to_string(),
            game_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        ..LoopConfig::default()
    };

    AppWiring {
        config,
        scenes,
        initial_scene: MENU_SCENE,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn read_list_env(var: &str) -> Vec<String> {
    std::env::var(var)
        .ok()
        .map(|raw| parse_list(&raw))
        .unwrap_or_default()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}
