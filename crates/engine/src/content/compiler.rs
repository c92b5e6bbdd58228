use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::app::{RenderableKind, Vec2};
use crate::sprite_keys::validate_sprite_key;
use crate::AppPaths;

use super::database::{
    CollectibleCategory, DefDatabase, DeliveryDef, DialogueDef, DialogueLineDef, EntityArchetype,
    EntityDefId, FailZoneDef, InteractionDef, LevelDef, MinigameKind, NpcPlacementDef,
    PlacementDef, TaskCountDef, VoiceLineDef,
};
use super::discovery::{collect_xml_files, discover_mod_sources};
use super::types::{ContentPlanError, ContentRequest};

const DEFAULT_MOVE_SPEED: f32 = 5.0;
const DEFAULT_INTERACTION_RADIUS: f32 = 1.0;
const DEFAULT_DELIVERY_RADIUS: f32 = 1.5;
const DEFAULT_TIME_LIMIT_SECONDS: f32 = 420.0;
const DEFAULT_DELAY_AFTER_SECONDS: f32 = 1.0;
const DEFAULT_TINT: [u8; 4] = [200, 200, 200, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorCode {
    Discovery,
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownDefType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateDefInMod,
    UnresolvedReference,
}

#[derive(Debug, Clone)]
pub struct ContentCompileError {
    pub code: ContentErrorCode,
    pub message: String,
    pub mod_id: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for ContentCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} (mod={}, file={}",
            self.code,
            self.message,
            self.mod_id,
            self.file_path.display()
        )?;
        if let Some(loc) = self.location {
            write!(f, ", line={}, column={}", loc.line, loc.column)?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for ContentCompileError {}

/// A def plus the file it came from, kept so merge-time errors can point at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Sourced<T> {
    pub file: PathBuf,
    pub def: T,
}

/// Everything one mod declares; this is what the cache stores per mod.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ModDefs {
    pub mod_id: String,
    pub entity_defs: Vec<Sourced<EntityArchetype>>,
    pub voice_lines: Vec<Sourced<VoiceLineDef>>,
    pub dialogues: Vec<Sourced<DialogueDef>>,
    pub levels: Vec<Sourced<LevelDef>>,
}

/// Compiles every enabled mod from XML, skipping the cache entirely.
pub fn compile_def_database(
    app_paths: &AppPaths,
    request: &ContentRequest,
) -> Result<DefDatabase, ContentCompileError> {
    let sources = discover_mod_sources(app_paths, request)
        .map_err(|error| discovery_error(error, &app_paths.root))?;
    let mut compiled = Vec::with_capacity(sources.len());
    for source in sources {
        compiled.push(compile_mod_defs(&source.source_dir, &source.mod_id)?);
    }
    def_database_from_mod_defs(compiled)
}

pub(crate) fn compile_mod_defs(
    source_dir: &Path,
    mod_id: &str,
) -> Result<ModDefs, ContentCompileError> {
    let files = collect_xml_files(source_dir).map_err(|error| match error {
        ContentPlanError::ReadDir { path, source } | ContentPlanError::ReadFile { path, source } => {
            read_error(mod_id, path, source)
        }
        other => discovery_error(other, source_dir),
    })?;

    let mut defs = ModDefs {
        mod_id: mod_id.to_string(),
        ..ModDefs::default()
    };
    let mut seen = HashSet::<(&'static str, String)>::new();
    for (_, path) in files {
        let raw = fs::read_to_string(&path).map_err(|source| read_error(mod_id, path.clone(), source))?;
        let doc = Document::parse(&raw).map_err(|error| ContentCompileError {
            code: ContentErrorCode::XmlMalformed,
            message: format!("malformed XML: {error}"),
            mod_id: mod_id.to_string(),
            file_path: path.clone(),
            location: Some(SourceLocation {
                line: error.pos().row as usize,
                column: error.pos().col as usize,
            }),
        })?;
        let ctx = ParseCtx {
            mod_id,
            file_path: &path,
            doc: &doc,
        };
        parse_defs_document(&ctx, &mut defs, &mut seen)?;
    }
    Ok(defs)
}

/// Merges mods in load order; a later mod replaces an earlier def of the same
/// kind and name. References are resolved against the merged set.
pub(crate) fn def_database_from_mod_defs(
    mods: Vec<ModDefs>,
) -> Result<DefDatabase, ContentCompileError> {
    let mut entity_defs = BTreeMap::<String, (String, Sourced<EntityArchetype>)>::new();
    let mut voice_lines = BTreeMap::<String, (String, Sourced<VoiceLineDef>)>::new();
    let mut dialogues = BTreeMap::<String, (String, Sourced<DialogueDef>)>::new();
    let mut levels = BTreeMap::<String, (String, Sourced<LevelDef>)>::new();

    for module in mods {
        let mod_id = module.mod_id;
        for def in module.entity_defs {
            entity_defs.insert(def.def.def_name.clone(), (mod_id.clone(), def));
        }
        for def in module.voice_lines {
            voice_lines.insert(def.def.def_name.clone(), (mod_id.clone(), def));
        }
        for def in module.dialogues {
            dialogues.insert(def.def.def_name.clone(), (mod_id.clone(), def));
        }
        for def in module.levels {
            levels.insert(def.def.def_name.clone(), (mod_id.clone(), def));
        }
    }

    for (mod_id, sourced) in dialogues.values() {
        for line in &sourced.def.lines {
            if let Some(voice) = &line.voice {
                require(voice_lines.contains_key(voice), "VoiceLineDef", voice, mod_id, sourced)?;
            }
        }
    }
    for (mod_id, sourced) in levels.values() {
        let level = &sourced.def;
        require(entity_defs.contains_key(&level.player), "EntityDef", &level.player, mod_id, sourced)?;
        require(
            entity_defs.contains_key(&level.delivery.entity),
            "EntityDef",
            &level.delivery.entity,
            mod_id,
            sourced,
        )?;
        for placement in &level.placements {
            require(
                entity_defs.contains_key(&placement.entity),
                "EntityDef",
                &placement.entity,
                mod_id,
                sourced,
            )?;
        }
        for npc in &level.npcs {
            require(entity_defs.contains_key(&npc.entity), "EntityDef", &npc.entity, mod_id, sourced)?;
            if let Some(dialogue) = &npc.dialogue {
                require(dialogues.contains_key(dialogue), "DialogueDef", dialogue, mod_id, sourced)?;
            }
        }
        for line in [&level.first_trash_line, &level.golden_horn_line].into_iter().flatten() {
            require(voice_lines.contains_key(line), "VoiceLineDef", line, mod_id, sourced)?;
        }
        if let Some(next) = &level.next_level {
            require(levels.contains_key(next), "LevelDef", next, mod_id, sourced)?;
        }
    }

    Ok(DefDatabase::from_parts(
        entity_defs.into_values().map(|(_, s)| s.def).collect(),
        voice_lines.into_values().map(|(_, s)| s.def).collect(),
        dialogues.into_values().map(|(_, s)| s.def).collect(),
        levels.into_values().map(|(_, s)| s.def).collect(),
    ))
}

fn require<T>(
    resolved: bool,
    kind: &str,
    name: &str,
    mod_id: &str,
    referrer: &Sourced<T>,
) -> Result<(), ContentCompileError> {
    if resolved {
        return Ok(());
    }
    Err(ContentCompileError {
        code: ContentErrorCode::UnresolvedReference,
        message: format!("reference to unknown {kind} '{name}'"),
        mod_id: mod_id.to_string(),
        file_path: referrer.file.clone(),
        location: None,
    })
}

struct ParseCtx<'a, 'input> {
    mod_id: &'a str,
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl ParseCtx<'_, '_> {
    fn error(&self, code: ContentErrorCode, message: String, node: Node<'_, '_>) -> ContentCompileError {
        let pos = self.doc.text_pos_at(node.range().start);
        ContentCompileError {
            code,
            message,
            mod_id: self.mod_id.to_string(),
            file_path: self.file_path.to_path_buf(),
            location: Some(SourceLocation {
                line: pos.row as usize,
                column: pos.col as usize,
            }),
        }
    }

    fn sourced<T>(&self, def: T) -> Sourced<T> {
        Sourced {
            file: self.file_path.to_path_buf(),
            def,
        }
    }

    /// Element children of `node`, rejecting repeats of the same tag.
    fn fields<'n, 'i>(
        &self,
        node: Node<'n, 'i>,
        owner: &str,
    ) -> Result<Vec<(&'n str, Node<'n, 'i>)>, ContentCompileError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for field in node.children().filter(|child| child.is_element()) {
            let name = field.tag_name().name();
            if !seen.insert(name) {
                return Err(self.error(
                    ContentErrorCode::DuplicateField,
                    format!("duplicate field <{name}> in <{owner}>"),
                    field,
                ));
            }
            out.push((name, field));
        }
        Ok(out)
    }

    fn list_items<'n, 'i>(
        &self,
        node: Node<'n, 'i>,
    ) -> Result<Vec<Node<'n, 'i>>, ContentCompileError> {
        node.children()
            .filter(|child| child.is_element())
            .map(|child| {
                if child.tag_name().name() == "li" {
                    Ok(child)
                } else {
                    Err(self.error(
                        ContentErrorCode::UnknownField,
                        format!(
                            "<{}> may only contain <li> items, found <{}>",
                            node.tag_name().name(),
                            child.tag_name().name()
                        ),
                        child,
                    ))
                }
            })
            .collect()
    }

    fn unknown(&self, field: Node<'_, '_>, owner: &str) -> ContentCompileError {
        self.error(
            ContentErrorCode::UnknownField,
            format!("unknown field <{}> in <{owner}>", field.tag_name().name()),
            field,
        )
    }

    fn missing(&self, node: Node<'_, '_>, field: &str, owner: &str) -> ContentCompileError {
        self.error(
            ContentErrorCode::MissingField,
            format!("missing required field <{field}> in <{owner}>"),
            node,
        )
    }

    fn text(&self, node: Node<'_, '_>) -> Result<String, ContentCompileError> {
        let value = node.text().map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Err(self.error(
                ContentErrorCode::MissingField,
                format!("field <{}> must not be empty", node.tag_name().name()),
                node,
            ));
        }
        Ok(value.to_string())
    }

    fn invalid(&self, node: Node<'_, '_>, message: String) -> ContentCompileError {
        self.error(ContentErrorCode::InvalidValue, message, node)
    }

    fn non_negative(&self, node: Node<'_, '_>) -> Result<f32, ContentCompileError> {
        let value = self.text(node)?;
        match value.parse::<f32>() {
            Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(parsed),
            _ => Err(self.invalid(
                node,
                format!(
                    "<{}> '{value}' must be a finite number >= 0",
                    node.tag_name().name()
                ),
            )),
        }
    }

    fn positive(&self, node: Node<'_, '_>) -> Result<f32, ContentCompileError> {
        let parsed = self.non_negative(node)?;
        if parsed > 0.0 {
            Ok(parsed)
        } else {
            Err(self.invalid(node, format!("<{}> must be > 0", node.tag_name().name())))
        }
    }

    fn count(&self, node: Node<'_, '_>) -> Result<u32, ContentCompileError> {
        let value = self.text(node)?;
        value.parse::<u32>().map_err(|_| {
            self.invalid(node, format!("<{}> '{value}' must be a whole number >= 0", node.tag_name().name()))
        })
    }

    fn flag(&self, node: Node<'_, '_>) -> Result<bool, ContentCompileError> {
        match self.text(node)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.invalid(node, format!("'{other}' must be true or false"))),
        }
    }

    /// `x,y` in world units.
    fn vec2(&self, node: Node<'_, '_>) -> Result<Vec2, ContentCompileError> {
        let value = self.text(node)?;
        let parsed = value
            .split_once(',')
            .and_then(|(x, y)| Some(Vec2::new(x.trim().parse().ok()?, y.trim().parse().ok()?)));
        match parsed {
            Some(v) if v.x.is_finite() && v.y.is_finite() => Ok(v),
            _ => Err(self.invalid(
                node,
                format!("<{}> '{value}' must be 'x,y'", node.tag_name().name()),
            )),
        }
    }
}

fn parse_defs_document(
    ctx: &ParseCtx<'_, '_>,
    out: &mut ModDefs,
    seen: &mut HashSet<(&'static str, String)>,
) -> Result<(), ContentCompileError> {
    let root = ctx.doc.root_element();
    if root.tag_name().name() != "Defs" {
        return Err(ctx.error(
            ContentErrorCode::InvalidRoot,
            "root element must be <Defs>".to_string(),
            root,
        ));
    }

    for child in root.children().filter(|node| node.is_element()) {
        let (kind, def_name) = match child.tag_name().name() {
            "EntityDef" => {
                let def = parse_entity_def(ctx, child)?;
                let name = def.def_name.clone();
                out.entity_defs.push(ctx.sourced(def));
                ("EntityDef", name)
            }
            "VoiceLineDef" => {
                let def = parse_voice_line_def(ctx, child)?;
                let name = def.def_name.clone();
                out.voice_lines.push(ctx.sourced(def));
                ("VoiceLineDef", name)
            }
            "DialogueDef" => {
                let def = parse_dialogue_def(ctx, child)?;
                let name = def.def_name.clone();
                out.dialogues.push(ctx.sourced(def));
                ("DialogueDef", name)
            }
            "LevelDef" => {
                let def = parse_level_def(ctx, child)?;
                let name = def.def_name.clone();
                out.levels.push(ctx.sourced(def));
                ("LevelDef", name)
            }
            other => {
                return Err(ctx.error(
                    ContentErrorCode::UnknownDefType,
                    format!(
                        "unsupported def type <{other}>; expected EntityDef, VoiceLineDef, DialogueDef or LevelDef"
                    ),
                    child,
                ))
            }
        };
        if !seen.insert((kind, def_name.clone())) {
            return Err(ctx.error(
                ContentErrorCode::DuplicateDefInMod,
                format!(
                    "duplicate {kind} '{def_name}' in mod '{}'; each mod may define a defName once",
                    ctx.mod_id
                ),
                child,
            ));
        }
    }
    Ok(())
}

fn parse_entity_def(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<EntityArchetype, ContentCompileError> {
    const OWNER: &str = "EntityDef";
    let mut def_name = None;
    let mut label = None;
    let mut renderable = None;
    let mut tint = DEFAULT_TINT;
    let mut move_speed = DEFAULT_MOVE_SPEED;
    let mut interaction = None;
    let mut interaction_radius = DEFAULT_INTERACTION_RADIUS;

    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "defName" => def_name = Some(ctx.text(field)?),
            "label" => label = Some(ctx.text(field)?),
            "renderable" => renderable = Some(parse_renderable(ctx, field)?),
            "color" => tint = parse_color(ctx, field)?,
            "moveSpeed" => move_speed = ctx.non_negative(field)?,
            "interaction" => interaction = Some(parse_interaction(ctx, field)?),
            "interactionRadius" => interaction_radius = ctx.positive(field)?,
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }

    Ok(EntityArchetype {
        id: EntityDefId(0),
        def_name: def_name.ok_or_else(|| ctx.missing(node, "defName", OWNER))?,
        label: label.ok_or_else(|| ctx.missing(node, "label", OWNER))?,
        renderable: renderable.ok_or_else(|| ctx.missing(node, "renderable", OWNER))?,
        tint,
        move_speed,
        interaction,
        interaction_radius,
    })
}

fn parse_renderable(
    ctx: &ParseCtx<'_, '_>,
    field: Node<'_, '_>,
) -> Result<RenderableKind, ContentCompileError> {
    let value = ctx.text(field)?;
    if value == "Placeholder" {
        return Ok(RenderableKind::Placeholder);
    }
    if let Some(key) = value.strip_prefix("Sprite:") {
        validate_sprite_key(key).map_err(|error| ctx.invalid(field, error.to_string()))?;
        return Ok(RenderableKind::Sprite(key.to_string()));
    }
    Err(ctx.invalid(
        field,
        format!("invalid renderable '{value}'; expected Placeholder or Sprite:<key>"),
    ))
}

fn parse_interaction(
    ctx: &ParseCtx<'_, '_>,
    field: Node<'_, '_>,
) -> Result<InteractionDef, ContentCompileError> {
    let value = ctx.text(field)?;
    if let Some(kind) = value.strip_prefix("Minigame:") {
        return MinigameKind::parse(kind)
            .map(InteractionDef::Minigame)
            .ok_or_else(|| ctx.invalid(field, format!("unknown minigame '{kind}'")));
    }
    CollectibleCategory::parse(&value)
        .map(InteractionDef::Collectible)
        .ok_or_else(|| {
            ctx.invalid(
                field,
                format!(
                    "invalid interaction '{value}'; expected InstantTrash, CarryTrash, GoldenHorn or Minigame:<kind>"
                ),
            )
        })
}

/// `#RRGGBB` or `#RRGGBBAA`.
fn parse_color(ctx: &ParseCtx<'_, '_>, field: Node<'_, '_>) -> Result<[u8; 4], ContentCompileError> {
    let value = ctx.text(field)?;
    let hex = value.strip_prefix('#').unwrap_or_default();
    let channel = |idx: usize| {
        hex.get(idx * 2..idx * 2 + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    let parsed = match hex.len() {
        6 => (|| Some([channel(0)?, channel(1)?, channel(2)?, 255]))(),
        8 => (|| Some([channel(0)?, channel(1)?, channel(2)?, channel(3)?]))(),
        _ => None,
    };
    parsed.ok_or_else(|| ctx.invalid(field, format!("color '{value}' must be #RRGGBB or #RRGGBBAA")))
}

fn parse_voice_line_def(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<VoiceLineDef, ContentCompileError> {
    const OWNER: &str = "VoiceLineDef";
    let mut def_name = None;
    let mut caption = None;
    let mut duration_seconds = None;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "defName" => def_name = Some(ctx.text(field)?),
            "caption" => caption = Some(ctx.text(field)?),
            "durationSeconds" => duration_seconds = Some(ctx.positive(field)?),
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(VoiceLineDef {
        def_name: def_name.ok_or_else(|| ctx.missing(node, "defName", OWNER))?,
        caption: caption.ok_or_else(|| ctx.missing(node, "caption", OWNER))?,
        duration_seconds,
    })
}

fn parse_dialogue_def(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<DialogueDef, ContentCompileError> {
    const OWNER: &str = "DialogueDef";
    let mut def_name = None;
    let mut lines = None;
    let mut camera_focus = None;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "defName" => def_name = Some(ctx.text(field)?),
            "cameraFocus" => camera_focus = Some(ctx.vec2(field)?),
            "lines" => {
                let mut parsed = Vec::new();
                for item in ctx.list_items(field)? {
                    parsed.push(parse_dialogue_line(ctx, item)?);
                }
                if parsed.is_empty() {
                    return Err(ctx.invalid(field, "<lines> must contain at least one <li>".to_string()));
                }
                lines = Some(parsed);
            }
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(DialogueDef {
        def_name: def_name.ok_or_else(|| ctx.missing(node, "defName", OWNER))?,
        lines: lines.ok_or_else(|| ctx.missing(node, "lines", OWNER))?,
        camera_focus,
    })
}

fn parse_dialogue_line(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<DialogueLineDef, ContentCompileError> {
    const OWNER: &str = "lines/li";
    let mut speaker = None;
    let mut text = None;
    let mut voice = None;
    let mut delay_after_seconds = DEFAULT_DELAY_AFTER_SECONDS;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "speaker" => speaker = Some(ctx.text(field)?),
            "text" => text = Some(ctx.text(field)?),
            "voice" => voice = Some(ctx.text(field)?),
            "delayAfter" => delay_after_seconds = ctx.non_negative(field)?,
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(DialogueLineDef {
        speaker: speaker.ok_or_else(|| ctx.missing(node, "speaker", OWNER))?,
        text: text.ok_or_else(|| ctx.missing(node, "text", OWNER))?,
        voice,
        delay_after_seconds,
    })
}

fn parse_level_def(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<LevelDef, ContentCompileError> {
    const OWNER: &str = "LevelDef";
    let mut def_name = None;
    let mut label = None;
    let mut start = false;
    let mut time_limit_seconds = DEFAULT_TIME_LIMIT_SECONDS;
    let mut player = None;
    let mut player_spawn = Vec2::ZERO;
    let mut delivery = None;
    let mut tasks = Vec::new();
    let mut first_trash_line = None;
    let mut golden_horn_line = None;
    let mut placements = Vec::new();
    let mut npcs = Vec::new();
    let mut fail_zones = Vec::new();
    let mut next_level = None;

    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "defName" => def_name = Some(ctx.text(field)?),
            "label" => label = Some(ctx.text(field)?),
            "start" => start = ctx.flag(field)?,
            "timeLimitSeconds" => time_limit_seconds = ctx.positive(field)?,
            "player" => player = Some(ctx.text(field)?),
            "playerSpawn" => player_spawn = ctx.vec2(field)?,
            "delivery" => delivery = Some(parse_delivery(ctx, field)?),
            "tasks" => tasks = parse_tasks(ctx, field)?,
            "firstTrashLine" => first_trash_line = Some(ctx.text(field)?),
            "goldenHornLine" => golden_horn_line = Some(ctx.text(field)?),
            "placements" => {
                for item in ctx.list_items(field)? {
                    placements.push(parse_placement(ctx, item)?);
                }
            }
            "npcs" => {
                for item in ctx.list_items(field)? {
                    npcs.push(parse_npc(ctx, item)?);
                }
            }
            "failZones" => {
                for item in ctx.list_items(field)? {
                    fail_zones.push(parse_fail_zone(ctx, item)?);
                }
            }
            "nextLevel" => next_level = Some(ctx.text(field)?),
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }

    Ok(LevelDef {
        def_name: def_name.ok_or_else(|| ctx.missing(node, "defName", OWNER))?,
        label: label.ok_or_else(|| ctx.missing(node, "label", OWNER))?,
        start,
        time_limit_seconds,
        player: player.ok_or_else(|| ctx.missing(node, "player", OWNER))?,
        player_spawn,
        delivery: delivery.ok_or_else(|| ctx.missing(node, "delivery", OWNER))?,
        tasks,
        first_trash_line,
        golden_horn_line,
        placements,
        npcs,
        fail_zones,
        next_level,
    })
}

fn parse_delivery(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<DeliveryDef, ContentCompileError> {
    const OWNER: &str = "delivery";
    let mut entity = None;
    let mut position = None;
    let mut radius = DEFAULT_DELIVERY_RADIUS;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "entity" => entity = Some(ctx.text(field)?),
            "position" => position = Some(ctx.vec2(field)?),
            "radius" => radius = ctx.positive(field)?,
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(DeliveryDef {
        entity: entity.ok_or_else(|| ctx.missing(node, "entity", OWNER))?,
        position: position.ok_or_else(|| ctx.missing(node, "position", OWNER))?,
        radius,
    })
}

fn parse_tasks(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<Vec<TaskCountDef>, ContentCompileError> {
    const OWNER: &str = "tasks/li";
    let mut tasks = Vec::<TaskCountDef>::new();
    for item in ctx.list_items(node)? {
        let mut category = None;
        let mut count = None;
        for (name, field) in ctx.fields(item, OWNER)? {
            match name {
                "category" => {
                    let value = ctx.text(field)?;
                    let parsed = CollectibleCategory::parse(&value)
                        .ok_or_else(|| ctx.invalid(field, format!("unknown category '{value}'")))?;
                    if tasks.iter().any(|task| task.category == parsed) {
                        return Err(ctx.invalid(
                            field,
                            format!("category '{value}' is listed more than once"),
                        ));
                    }
                    category = Some(parsed);
                }
                "count" => count = Some(ctx.count(field)?),
                _ => return Err(ctx.unknown(field, OWNER)),
            }
        }
        tasks.push(TaskCountDef {
            category: category.ok_or_else(|| ctx.missing(item, "category", OWNER))?,
            count: count.ok_or_else(|| ctx.missing(item, "count", OWNER))?,
        });
    }
    Ok(tasks)
}

fn parse_placement(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<PlacementDef, ContentCompileError> {
    const OWNER: &str = "placements/li";
    let mut entity = None;
    let mut position = None;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "entity" => entity = Some(ctx.text(field)?),
            "position" => position = Some(ctx.vec2(field)?),
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(PlacementDef {
        entity: entity.ok_or_else(|| ctx.missing(node, "entity", OWNER))?,
        position: position.ok_or_else(|| ctx.missing(node, "position", OWNER))?,
    })
}

fn parse_npc(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<NpcPlacementDef, ContentCompileError> {
    const OWNER: &str = "npcs/li";
    let mut entity = None;
    let mut position = None;
    let mut dialogue = None;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "entity" => entity = Some(ctx.text(field)?),
            "position" => position = Some(ctx.vec2(field)?),
            "dialogue" => dialogue = Some(ctx.text(field)?),
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(NpcPlacementDef {
        entity: entity.ok_or_else(|| ctx.missing(node, "entity", OWNER))?,
        position: position.ok_or_else(|| ctx.missing(node, "position", OWNER))?,
        dialogue,
    })
}

fn parse_fail_zone(
    ctx: &ParseCtx<'_, '_>,
    node: Node<'_, '_>,
) -> Result<FailZoneDef, ContentCompileError> {
    const OWNER: &str = "failZones/li";
    let mut center = None;
    let mut half_extents = None;
    for (name, field) in ctx.fields(node, OWNER)? {
        match name {
            "center" => center = Some(ctx.vec2(field)?),
            "halfExtents" => {
                let value = ctx.vec2(field)?;
                if value.x <= 0.0 || value.y <= 0.0 {
                    return Err(ctx.invalid(field, "halfExtents must be > 0 on both axes".to_string()));
                }
                half_extents = Some(value);
            }
            _ => return Err(ctx.unknown(field, OWNER)),
        }
    }
    Ok(FailZoneDef {
        center: center.ok_or_else(|| ctx.missing(node, "center", OWNER))?,
        half_extents: half_extents.ok_or_else(|| ctx.missing(node, "halfExtents", OWNER))?,
    })
}

fn read_error(mod_id: &str, path: PathBuf, source: std::io::Error) -> ContentCompileError {
    ContentCompileError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read content: {source}"),
        mod_id: mod_id.to_string(),
        file_path: path,
        location: None,
    }
}

fn discovery_error(error: ContentPlanError, root: &Path) -> ContentCompileError {
    match error {
        ContentPlanError::EnabledModMissing {
            mod_id,
            expected_dir,
        } => ContentCompileError {
            code: ContentErrorCode::Discovery,
            message: format!(
                "enabled mod '{mod_id}' not found at {}; check the enabled mod list",
                expected_dir.display()
            ),
            mod_id,
            file_path: expected_dir,
            location: None,
        },
        other => ContentCompileError {
            code: ContentErrorCode::Discovery,
            message: other.to_string(),
            mod_id: "<discovery>".to_string(),
            file_path: root.to_path_buf(),
            location: None,
        },
    }
}
