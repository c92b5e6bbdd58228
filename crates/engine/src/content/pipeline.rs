use thiserror::Error;
use tracing::{info, warn};

use crate::AppPaths;

use super::cache::{
    read_cached_defs, read_manifest, write_mod_cache, CacheManifest, ContentCacheError,
    ManifestReadState,
};
use super::compiler::{compile_mod_defs, def_database_from_mod_defs, ContentCompileError, ModDefs};
use super::database::DefDatabase;
use super::planner::build_compile_plan;
use super::types::{CompileAction, ContentPlanError, ContentRequest, ModCompileDecision};

#[derive(Debug, Error)]
pub enum ContentPipelineError {
    #[error(transparent)]
    Plan(#[from] ContentPlanError),
    #[error(transparent)]
    Compile(#[from] ContentCompileError),
    #[error(transparent)]
    Cache(#[from] ContentCacheError),
}

/// Loads each mod from cache when its manifest still matches, recompiling
/// the rest, then merges everything into one database.
pub fn build_or_load_def_database(
    app_paths: &AppPaths,
    request: &ContentRequest,
) -> Result<DefDatabase, ContentPipelineError> {
    let plan = build_compile_plan(app_paths, request)?;
    let enabled_hash = plan.enabled_mods_hash_sha256_hex.as_str();
    for decision in &plan.decisions {
        info!(
            mod_id = %decision.mod_id,
            mod_load_index = decision.mod_load_index,
            action = ?decision.action,
            reason = ?decision.reason,
            xml_file_count = decision.xml_file_count,
            input_hash = %decision.input_hash_sha256_hex,
            "content_compile_plan_decision"
        );
    }

    let mut mods = Vec::<ModDefs>::with_capacity(plan.decisions.len());
    for decision in &plan.decisions {
        let expected = CacheManifest::expected(
            request,
            &decision.mod_id,
            decision.mod_load_index,
            enabled_hash,
            &decision.input_hash_sha256_hex,
        );
        let defs = match decision.action {
            CompileAction::Compile => compile_and_cache_mod(decision, &expected)?,
            CompileAction::UseCache => match load_cached_mod(decision, &expected) {
                Ok(defs) => {
                    info!(
                        mod_id = %decision.mod_id,
                        defs_path = %decision.defs_path.display(),
                        "content_cache_hit"
                    );
                    defs
                }
                Err(reason) => {
                    warn!(
                        mod_id = %decision.mod_id,
                        reason = %reason,
                        "content_cache_invalid_rebuilding_mod"
                    );
                    compile_and_cache_mod(decision, &expected)?
                }
            },
        };
        mods.push(defs);
    }

    info!(
        total_mods = plan.summary.total_mods,
        compile_count = plan.summary.compile_count,
        cache_hit_count = plan.summary.cache_hit_count,
        content_status = plan.summary.status_label(),
        enabled_mods_hash = %enabled_hash,
        "content_pipeline_summary"
    );

    Ok(def_database_from_mod_defs(mods)?)
}

fn compile_and_cache_mod(
    decision: &ModCompileDecision,
    manifest: &CacheManifest,
) -> Result<ModDefs, ContentPipelineError> {
    let defs = compile_mod_defs(&decision.source_dir, &decision.mod_id)?;
    write_mod_cache(&decision.defs_path, &decision.manifest_path, manifest, &defs)?;
    Ok(defs)
}

/// Re-checks the manifest right before reading, since the plan may be stale.
fn load_cached_mod(
    decision: &ModCompileDecision,
    expected: &CacheManifest,
) -> Result<ModDefs, String> {
    match read_manifest(&decision.manifest_path) {
        Ok(ManifestReadState::Present(manifest)) => {
            if let Some(reason) = manifest.mismatch_against(expected) {
                return Err(format!("manifest changed since planning: {reason:?}"));
            }
        }
        Ok(ManifestReadState::Missing) => return Err("manifest missing".to_string()),
        Ok(ManifestReadState::Unreadable) => return Err("manifest unreadable".to_string()),
        Err(error) => return Err(error.to_string()),
    }
    read_cached_defs(&decision.defs_path, &decision.mod_id).map_err(|error| error.to_string())
}
