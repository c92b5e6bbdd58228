use engine::{
    DefDatabase, DialogueDef, EntityArchetype, FailZoneDef, InteractionDef, LevelDef,
    RenderableKind, TaskCountDef, Vec2,
};
use thiserror::Error;

use super::narration::NarrationRequest;

#[derive(Debug, Error)]
pub(crate) enum LevelLoadError {
    #[error("content defines no levels")]
    NoLevels,
    #[error("unknown level {name:?}")]
    UnknownLevel { name: String },
    #[error("level {level:?} references unknown entity def {entity:?}")]
    UnknownEntity { level: String, entity: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Visual {
    pub renderable: RenderableKind,
    pub tint: [u8; 4],
}

impl Visual {
    fn of(archetype: &EntityArchetype) -> Self {
        Self {
            renderable: archetype.renderable.clone(),
            tint: archetype.tint,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PlacedCollectible {
    pub visual: Visual,
    pub interaction: InteractionDef,
    pub interaction_radius: f32,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub(crate) struct PlacedProp {
    pub visual: Visual,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
pub(crate) struct PlacedNpc {
    pub label: String,
    pub visual: Visual,
    pub position: Vec2,
    pub interaction_radius: f32,
    pub dialogue: Option<DialogueDef>,
}

/// A level with every content reference resolved.
#[derive(Debug, Clone)]
pub(crate) struct LevelPlan {
    pub def_name: String,
    pub label: String,
    pub time_limit_seconds: f32,
    pub next_level: Option<String>,
    pub player_visual: Visual,
    pub player_speed: f32,
    pub player_spawn: Vec2,
    pub delivery_visual: Visual,
    pub delivery_position: Vec2,
    pub delivery_radius: f32,
    pub tasks: Vec<TaskCountDef>,
    pub first_trash_line: Option<NarrationRequest>,
    pub golden_horn_line: Option<NarrationRequest>,
    pub collectibles: Vec<PlacedCollectible>,
    pub props: Vec<PlacedProp>,
    pub npcs: Vec<PlacedNpc>,
    pub fail_zones: Vec<FailZoneDef>,
}

impl LevelPlan {
    /// Resolves `name`, or the start level when `None`.
    pub(crate) fn resolve(defs: &DefDatabase, name: Option<&str>) -> Result<Self, LevelLoadError> {
        let level = match name {
            Some(name) => defs.level(name).ok_or_else(|| LevelLoadError::UnknownLevel {
                name: name.to_string(),
            })?,
            None => defs.start_level().ok_or(LevelLoadError::NoLevels)?,
        };
        Self::from_level(defs, level)
    }

    fn from_level(defs: &DefDatabase, level: &LevelDef) -> Result<Self, LevelLoadError> {
        let archetype = |entity: &str| {
            defs.entity_def_by_name(entity)
                .ok_or_else(|| LevelLoadError::UnknownEntity {
                    level: level.def_name.clone(),
                    entity: entity.to_string(),
                })
        };
        let narration = |line: &Option<String>| {
            line.as_deref()
                .and_then(|name| defs.voice_line(name))
                .map(NarrationRequest::from_voice_line)
        };

        let player = archetype(&level.player)?;
        let delivery = archetype(&level.delivery.entity)?;

        let mut collectibles = Vec::new();
        let mut props = Vec::new();
        for placement in &level.placements {
            let def = archetype(&placement.entity)?;
            match def.interaction {
                Some(interaction) => collectibles.push(PlacedCollectible {
                    visual: Visual::of(def),
                    interaction,
                    interaction_radius: def.interaction_radius,
                    position: placement.position,
                }),
                None => props.push(PlacedProp {
                    visual: Visual::of(def),
                    position: placement.position,
                }),
            }
        }

        let npcs = level
            .npcs
            .iter()
            .map(|npc| {
                let def = archetype(&npc.entity)?;
                Ok(PlacedNpc {
                    label: def.label.clone(),
                    visual: Visual::of(def),
                    position: npc.position,
                    interaction_radius: def.interaction_radius,
                    dialogue: npc
                        .dialogue
                        .as_deref()
                        .and_then(|name| defs.dialogue(name))
                        .cloned(),
                })
            })
            .collect::<Result<Vec<_>, LevelLoadError>>()?;

        Ok(Self {
            def_name: level.def_name.clone(),
            label: level.label.clone(),
            time_limit_seconds: level.time_limit_seconds,
            next_level: level.next_level.clone(),
            player_visual: Visual::of(player),
            player_speed: player.move_speed,
            player_spawn: level.player_spawn,
            delivery_visual: Visual::of(delivery),
            delivery_position: level.delivery.position,
            delivery_radius: level.delivery.radius,
            tasks: level.tasks.clone(),
            first_trash_line: narration(&level.first_trash_line),
            golden_horn_line: narration(&level.golden_horn_line),
            collectibles,
            props,
            npcs,
            fail_zones: level.fail_zones.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;

    use engine::{compile_def_database, AppPaths, ContentRequest, MinigameKind};
    use tempfile::TempDir;

    use super::*;
    use crate::level::collectible::CollectibleKind;
    use crate::level::fixtures::scenario_defs;

    fn shipped_defs(cache: &TempDir) -> DefDatabase {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
        let paths = AppPaths {
            base_content_dir: root.join("assets").join("base"),
            mods_dir: root.join("mods"),
            cache_dir: cache.path().to_path_buf(),
            root,
        };
        compile_def_database(&paths, &ContentRequest::default()).expect("compile shipped defs")
    }

    #[test]
    fn unknown_level_name_is_reported() {
        let defs = scenario_defs();
        let error = LevelPlan::resolve(&defs, Some("level.missing")).expect_err("unknown");
        assert!(matches!(error, LevelLoadError::UnknownLevel { name } if name == "level.missing"));
    }

    #[test]
    fn placements_split_into_collectibles_and_props() {
        let defs = scenario_defs();
        let plan = LevelPlan::resolve(&defs, None).expect("start");
        assert_eq!(plan.def_name, "level.scenario");
        assert_eq!(plan.collectibles.len(), 6);
        assert_eq!(plan.props.len(), 1);
        assert_eq!(plan.npcs.len(), 1);
        assert!(plan.npcs[0].dialogue.is_some());
        assert_eq!(plan.player_speed, 5.0);
        assert!(plan.first_trash_line.is_some());
    }

    #[test]
    fn shipped_levels_chain_from_start_and_can_be_completed() {
        let cache = TempDir::new().expect("temp");
        let defs = shipped_defs(&cache);

        let mut visited = HashSet::new();
        let mut minigames = HashSet::new();
        let mut next = None;
        loop {
            let plan = LevelPlan::resolve(&defs, next.as_deref()).expect("resolve shipped level");
            assert!(visited.insert(plan.def_name.clone()), "level chain loops");
            assert!(!plan.tasks.is_empty(), "{} has no tasks", plan.def_name);

            for task in &plan.tasks {
                let available = plan
                    .collectibles
                    .iter()
                    .filter(|placed| {
                        CollectibleKind::from_interaction(placed.interaction).0 == task.category
                    })
                    .count() as u32;
                assert!(
                    available >= task.count,
                    "{} needs {} {} but places {available}",
                    plan.def_name,
                    task.count,
                    task.category.as_str()
                );
            }
            minigames.extend(plan.collectibles.iter().filter_map(|placed| {
                match placed.interaction {
                    InteractionDef::Minigame(kind) => Some(kind),
                    InteractionDef::Collectible(_) => None,
                }
            }));

            match plan.next_level {
                Some(name) => next = Some(name),
                None => break,
            }
        }

        assert_eq!(visited.len(), defs.levels().len());
        assert_eq!(minigames.len(), MinigameKind::ALL.len());
    }
}
