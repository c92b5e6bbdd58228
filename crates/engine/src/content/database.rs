use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::app::{RenderableKind, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityDefId(pub u32);

/// Task category carried by every collectible; the variant name doubles as the
/// on-screen counter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectibleCategory {
    InstantTrash,
    CarryTrash,
    GoldenHorn,
}

impl CollectibleCategory {
    pub const ALL: [CollectibleCategory; 3] = [
        CollectibleCategory::InstantTrash,
        CollectibleCategory::CarryTrash,
        CollectibleCategory::GoldenHorn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectibleCategory::InstantTrash => "InstantTrash",
            CollectibleCategory::CarryTrash => "CarryTrash",
            CollectibleCategory::GoldenHorn => "GoldenHorn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
    }

    pub fn counts_as_trash(self) -> bool {
        matches!(
            self,
            CollectibleCategory::InstantTrash | CollectibleCategory::CarryTrash
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinigameKind {
    TimingBar,
    ClickCount,
    DragPull,
    DragSort,
}

impl MinigameKind {
    pub const ALL: [MinigameKind; 4] = [
        MinigameKind::TimingBar,
        MinigameKind::ClickCount,
        MinigameKind::DragPull,
        MinigameKind::DragSort,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MinigameKind::TimingBar => "TimingBar",
            MinigameKind::ClickCount => "ClickCount",
            MinigameKind::DragPull => "DragPull",
            MinigameKind::DragSort => "DragSort",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// What interacting with an entity of this archetype does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionDef {
    Collectible(CollectibleCategory),
    /// A golden-horn proxy that opens a minigame instead of being picked up.
    Minigame(MinigameKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityArchetype {
    pub id: EntityDefId,
    pub def_name: String,
    pub label: String,
    pub renderable: RenderableKind,
    pub tint: [u8; 4],
    pub move_speed: f32,
    pub interaction: Option<InteractionDef>,
    pub interaction_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceLineDef {
    pub def_name: String,
    pub caption: String,
    pub duration_seconds: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLineDef {
    pub speaker: String,
    pub text: String,
    pub voice: Option<String>,
    pub delay_after_seconds: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueDef {
    pub def_name: String,
    pub lines: Vec<DialogueLineDef>,
    pub camera_focus: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCountDef {
    pub category: CollectibleCategory,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementDef {
    pub entity: String,
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcPlacementDef {
    pub entity: String,
    pub position: Vec2,
    pub dialogue: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailZoneDef {
    pub center: Vec2,
    pub half_extents: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDef {
    pub entity: String,
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub def_name: String,
    pub label: String,
    pub start: bool,
    pub time_limit_seconds: f32,
    pub player: String,
    pub player_spawn: Vec2,
    pub delivery: DeliveryDef,
    pub tasks: Vec<TaskCountDef>,
    pub first_trash_line: Option<String>,
    pub golden_horn_line: Option<String>,
    pub placements: Vec<PlacementDef>,
    pub npcs: Vec<NpcPlacementDef>,
    pub fail_zones: Vec<FailZoneDef>,
    pub next_level: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct DefDatabase {
    entity_defs: Vec<EntityArchetype>,
    voice_lines: Vec<VoiceLineDef>,
    dialogues: Vec<DialogueDef>,
    levels: Vec<LevelDef>,
    entity_ids_by_name: HashMap<String, EntityDefId>,
}

impl DefDatabase {
    /// Inputs must already be sorted by def name; ids follow that order.
    pub(crate) fn from_parts(
        mut entity_defs: Vec<EntityArchetype>,
        voice_lines: Vec<VoiceLineDef>,
        dialogues: Vec<DialogueDef>,
        levels: Vec<LevelDef>,
    ) -> Self {
        let mut entity_ids_by_name = HashMap::with_capacity(entity_defs.len());
        for (idx, def) in entity_defs.iter_mut().enumerate() {
            let id = EntityDefId(idx as u32);
            def.id = id;
            entity_ids_by_name.insert(def.def_name.clone(), id);
        }
        Self {
            entity_defs,
            voice_lines,
            dialogues,
            levels,
            entity_ids_by_name,
        }
    }

    pub fn entity_def_id_by_name(&self, name: &str) -> Option<EntityDefId> {
        self.entity_ids_by_name.get(name).copied()
    }

    pub fn entity_def(&self, id: EntityDefId) -> Option<&EntityArchetype> {
        self.entity_defs.get(id.0 as usize)
    }

    pub fn entity_def_by_name(&self, name: &str) -> Option<&EntityArchetype> {
        self.entity_def_id_by_name(name)
            .and_then(|id| self.entity_def(id))
    }

    pub fn entity_defs(&self) -> &[EntityArchetype] {
        &self.entity_defs
    }

    pub fn voice_lines(&self) -> &[VoiceLineDef] {
        &self.voice_lines
    }

    pub fn voice_line(&self, name: &str) -> Option<&VoiceLineDef> {
        self.voice_lines.iter().find(|line| line.def_name == name)
    }

    pub fn dialogue(&self, name: &str) -> Option<&DialogueDef> {
        self.dialogues.iter().find(|dialogue| dialogue.def_name == name)
    }

    pub fn level(&self, name: &str) -> Option<&LevelDef> {
        self.levels.iter().find(|level| level.def_name == name)
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    /// The level flagged `start`, else the first by name.
    pub fn start_level(&self) -> Option<&LevelDef> {
        self.levels
            .iter()
            .find(|level| level.start)
            .or_else(|| self.levels.first())
    }
}
