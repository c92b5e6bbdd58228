use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::atomic_io::write_text_atomic;
use super::compiler::ModDefs;
use super::types::{CompileReason, ContentPlanError, ContentRequest};

/// Bumped whenever the serialized `ModDefs` shape changes.
pub(crate) const CACHE_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum ContentCacheError {
    #[error("content cache io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode content cache {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode content cache {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("content cache {path} belongs to mod '{found}', expected '{expected}'")]
    ModMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CacheManifest {
    pub format_version: u16,
    pub compiler_version: String,
    pub game_version: String,
    pub mod_id: String,
    pub mod_load_index: u32,
    pub enabled_mods_hash_sha256_hex: String,
    pub input_hash_sha256_hex: String,
}

impl CacheManifest {
    pub(crate) fn expected(
        request: &ContentRequest,
        mod_id: &str,
        mod_load_index: u32,
        enabled_mods_hash_sha256_hex: &str,
        input_hash_sha256_hex: &str,
    ) -> Self {
        Self {
            format_version: CACHE_FORMAT_VERSION,
            compiler_version: request.compiler_version.clone(),
            game_version: request.game_version.clone(),
            mod_id: mod_id.to_string(),
            mod_load_index,
            enabled_mods_hash_sha256_hex: enabled_mods_hash_sha256_hex.to_string(),
            input_hash_sha256_hex: input_hash_sha256_hex.to_string(),
        }
    }

    /// First field that disagrees with `expected`, in the order a rebuild is
    /// most likely to be explained by.
    pub(crate) fn mismatch_against(&self, expected: &CacheManifest) -> Option<CompileReason> {
        if self.format_version != expected.format_version {
            Some(CompileReason::FormatMismatch)
        } else if self.compiler_version != expected.compiler_version
            || self.game_version != expected.game_version
        {
            Some(CompileReason::VersionMismatch)
        } else if self.mod_id != expected.mod_id {
            Some(CompileReason::ModIdMismatch)
        } else if self.mod_load_index != expected.mod_load_index {
            Some(CompileReason::ModLoadIndexMismatch)
        } else if self.enabled_mods_hash_sha256_hex != expected.enabled_mods_hash_sha256_hex {
            Some(CompileReason::EnabledModsHashMismatch)
        } else if self.input_hash_sha256_hex != expected.input_hash_sha256_hex {
            Some(CompileReason::InputHashMismatch)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ManifestReadState {
    Missing,
    Unreadable,
    Present(CacheManifest),
}

pub(crate) fn read_manifest(path: &Path) -> Result<ManifestReadState, ContentPlanError> {
    if !path.exists() {
        return Ok(ManifestReadState::Missing);
    }
    let raw = fs::read_to_string(path).map_err(|source| ContentPlanError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match serde_json::from_str::<CacheManifest>(&raw) {
        Ok(manifest) => ManifestReadState::Present(manifest),
        Err(_) => ManifestReadState::Unreadable,
    })
}

pub(crate) fn content_cache_dir(cache_dir: &Path) -> PathBuf {
    cache_dir.join("content")
}

pub(crate) fn defs_path(cache_dir: &Path, mod_id: &str) -> PathBuf {
    content_cache_dir(cache_dir).join(format!("{mod_id}.defs.json"))
}

pub(crate) fn manifest_path(cache_dir: &Path, mod_id: &str) -> PathBuf {
    content_cache_dir(cache_dir).join(format!("{mod_id}.manifest.json"))
}

/// Defs land before the manifest, so a crash in between leaves a manifest
/// that no longer matches and the mod is rebuilt next run.
pub(crate) fn write_mod_cache(
    defs_path: &Path,
    manifest_path: &Path,
    manifest: &CacheManifest,
    defs: &ModDefs,
) -> Result<(), ContentCacheError> {
    write_json(defs_path, defs)?;
    write_json(manifest_path, manifest)
}

pub(crate) fn read_cached_defs(path: &Path, mod_id: &str) -> Result<ModDefs, ContentCacheError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentCacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let defs = serde_json::from_str::<ModDefs>(&raw).map_err(|source| ContentCacheError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if defs.mod_id != mod_id {
        return Err(ContentCacheError::ModMismatch {
            path: path.to_path_buf(),
            expected: mod_id.to_string(),
            found: defs.mod_id,
        });
    }
    Ok(defs)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ContentCacheError> {
    let text = serde_json::to_string(value).map_err(|source| ContentCacheError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    write_text_atomic(path, &text).map_err(|source| ContentCacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}
