use std::path::PathBuf;

use thiserror::Error;

/// Which mods to load on top of `base`, and the versions cached output is keyed on.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub enabled_mods: Vec<String>,
    pub compiler_version: String,
    pub game_version: String,
}

impl Default for ContentRequest {
    fn default() -> Self {
        Self {
            enabled_mods: Vec::new(),
            compiler_version: "dev".to_string(),
            game_version: "dev".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileAction {
    UseCache,
    Compile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileReason {
    CacheValid,
    ManifestMissing,
    ManifestUnreadable,
    DefsMissing,
    FormatMismatch,
    VersionMismatch,
    ModIdMismatch,
    ModLoadIndexMismatch,
    EnabledModsHashMismatch,
    InputHashMismatch,
}

#[derive(Debug, Clone)]
pub struct ModCompileDecision {
    pub mod_id: String,
    pub mod_load_index: u32,
    pub source_dir: PathBuf,
    pub xml_file_count: usize,
    pub input_hash_sha256_hex: String,
    pub defs_path: PathBuf,
    pub manifest_path: PathBuf,
    pub action: CompileAction,
    pub reason: CompileReason,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentStatusSummary {
    pub total_mods: usize,
    pub compile_count: usize,
    pub cache_hit_count: usize,
}

impl ContentStatusSummary {
    pub fn from_decisions(decisions: &[ModCompileDecision]) -> Self {
        let compile_count = decisions
            .iter()
            .filter(|decision| decision.action == CompileAction::Compile)
            .count();
        Self {
            total_mods: decisions.len(),
            compile_count,
            cache_hit_count: decisions.len() - compile_count,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.compile_count > 0 {
            "compiled"
        } else {
            "cached"
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilePlan {
    pub decisions: Vec<ModCompileDecision>,
    pub enabled_mods_hash_sha256_hex: String,
    pub summary: ContentStatusSummary,
}

#[derive(Debug, Error)]
pub enum ContentPlanError {
    #[error("enabled mod id cannot be empty")]
    EmptyEnabledMod,
    #[error("mod '{mod_id}' is enabled more than once")]
    DuplicateEnabledMod { mod_id: String },
    #[error("enabled mod '{mod_id}' has no directory at {expected_dir}")]
    EnabledModMissing {
        mod_id: String,
        expected_dir: PathBuf,
    },
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create content cache directory {path}: {source}")]
    CreateCacheLayout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
