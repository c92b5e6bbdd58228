use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::discovery::collect_xml_files;
use super::types::ContentPlanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModInputHash {
    pub xml_file_count: usize,
    pub hash_hex: String,
}

pub(crate) fn hash_enabled_mods_list(mod_ids_in_order: &[String]) -> String {
    let mut hasher = Sha256::new();
    for mod_id in mod_ids_in_order {
        hasher.update(mod_id.as_bytes());
        hasher.update([0u8]);
    }
    to_hex_lower(&hasher.finalize())
}

/// Hashes relative path and bytes of every XML file; renames count as edits.
pub(crate) fn hash_mod_xml_inputs(mod_dir: &Path) -> Result<ModInputHash, ContentPlanError> {
    let files = collect_xml_files(mod_dir)?;
    let mut hasher = Sha256::new();
    for (rel, path) in &files {
        let bytes = fs::read(path).map_err(|source| ContentPlanError::ReadFile {
            path: path.clone(),
            source,
        })?;
        hasher.update(rel.as_bytes());
        hasher.update([0u8]);
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(ModInputHash {
        xml_file_count: files.len(),
        hash_hex: to_hex_lower(&hasher.finalize()),
    })
}

pub(crate) fn to_hex_lower(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}
