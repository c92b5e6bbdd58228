mod atomic_io;
mod cache;
mod compiler;
mod database;
mod discovery;
mod hashing;
mod pipeline;
mod planner;
mod types;

pub use cache::ContentCacheError;
pub use compiler::{compile_def_database, ContentCompileError, ContentErrorCode, SourceLocation};
pub use database::{
    CollectibleCategory, DefDatabase, DeliveryDef, DialogueDef, DialogueLineDef, EntityArchetype,
    EntityDefId, FailZoneDef, InteractionDef, LevelDef, MinigameKind, NpcPlacementDef,
    PlacementDef, TaskCountDef, VoiceLineDef,
};
pub use pipeline::{build_or_load_def_database, ContentPipelineError};
pub use planner::build_compile_plan;
pub use types::{
    CompileAction, CompilePlan, CompileReason, ContentPlanError, ContentRequest,
    ContentStatusSummary, ModCompileDecision,
};
