use std::fs;
use std::path::Path;

use crate::AppPaths;

use super::cache::{
    content_cache_dir, defs_path, manifest_path, read_manifest, CacheManifest, ManifestReadState,
};
use super::discovery::discover_mod_sources;
use super::hashing::{hash_enabled_mods_list, hash_mod_xml_inputs};
use super::types::{
    CompileAction, CompilePlan, CompileReason, ContentPlanError, ContentRequest,
    ContentStatusSummary, ModCompileDecision,
};

/// Decides per mod whether the cached defs can be reused.
pub fn build_compile_plan(
    app_paths: &AppPaths,
    request: &ContentRequest,
) -> Result<CompilePlan, ContentPlanError> {
    let sources = discover_mod_sources(app_paths, request)?;
    let mod_ids = sources
        .iter()
        .map(|source| source.mod_id.clone())
        .collect::<Vec<_>>();
    let enabled_mods_hash_sha256_hex = hash_enabled_mods_list(&mod_ids);

    let cache_dir = content_cache_dir(&app_paths.cache_dir);
    fs::create_dir_all(&cache_dir).map_err(|source| ContentPlanError::CreateCacheLayout {
        path: cache_dir.clone(),
        source,
    })?;

    let mut decisions = Vec::with_capacity(sources.len());
    for source in sources {
        let input = hash_mod_xml_inputs(&source.source_dir)?;
        let defs_path = defs_path(&app_paths.cache_dir, &source.mod_id);
        let manifest_path = manifest_path(&app_paths.cache_dir, &source.mod_id);
        let expected = CacheManifest::expected(
            request,
            &source.mod_id,
            source.mod_load_index,
            &enabled_mods_hash_sha256_hex,
            &input.hash_hex,
        );
        let reason = evaluate_cache_validity(&manifest_path, &defs_path, &expected)?;
        let action = match reason {
            CompileReason::CacheValid => CompileAction::UseCache,
            _ => CompileAction::Compile,
        };
        decisions.push(ModCompileDecision {
            mod_id: source.mod_id,
            mod_load_index: source.mod_load_index,
            source_dir: source.source_dir,
            xml_file_count: input.xml_file_count,
            input_hash_sha256_hex: input.hash_hex,
            defs_path,
            manifest_path,
            action,
            reason,
        });
    }

    let summary = ContentStatusSummary::from_decisions(&decisions);
    Ok(CompilePlan {
        decisions,
        enabled_mods_hash_sha256_hex,
        summary,
    })
}

fn evaluate_cache_validity(
    manifest_path: &Path,
    defs_path: &Path,
    expected: &CacheManifest,
) -> Result<CompileReason, ContentPlanError> {
    let reason = match read_manifest(manifest_path)? {
        ManifestReadState::Missing => CompileReason::ManifestMissing,
        ManifestReadState::Unreadable => CompileReason::ManifestUnreadable,
        ManifestReadState::Present(manifest) => match manifest.mismatch_against(expected) {
            Some(reason) => reason,
            None if !defs_path.is_file() => CompileReason::DefsMissing,
            None => CompileReason::CacheValid,
        },
    };
    Ok(reason)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::content::cache::write_mod_cache;
    use crate::content::compiler::ModDefs;

    fn setup_app_paths(root: &Path) -> AppPaths {
        let paths = AppPaths {
            root: root.to_path_buf(),
            base_content_dir: root.join("assets").join("base"),
            mods_dir: root.join("mods"),
            cache_dir: root.join("cache"),
        };
        fs::create_dir_all(&paths.base_content_dir).expect("base");
        fs::create_dir_all(paths.mods_dir.join("night")).expect("mod");
        fs::write(paths.base_content_dir.join("defs.xml"), "<Defs/>").expect("base xml");
        fs::write(paths.mods_dir.join("night").join("defs.xml"), "<Defs/>").expect("mod xml");
        paths
    }

    fn request() -> ContentRequest {
        ContentRequest {
            enabled_mods: vec!["night".to_string()],
            ..ContentRequest::default()
        }
    }

    fn seed_cache_from_plan(plan: &CompilePlan, request: &ContentRequest) {
        for decision in &plan.decisions {
            let manifest = CacheManifest::expected(
                request,
                &decision.mod_id,
                decision.mod_load_index,
                &plan.enabled_mods_hash_sha256_hex,
                &decision.input_hash_sha256_hex,
            );
            let defs = ModDefs {
                mod_id: decision.mod_id.clone(),
                ..ModDefs::default()
            };
            write_mod_cache(&decision.defs_path, &decision.manifest_path, &manifest, &defs)
                .expect("seed cache");
        }
    }

    #[test]
    fn cold_cache_compiles_every_mod() {
        let temp = TempDir::new().expect("temp");
        let app = setup_app_paths(temp.path());

        let plan = build_compile_plan(&app, &request()).expect("plan");
        assert_eq!(plan.summary.compile_count, 2);
        assert!(plan
            .decisions
            .iter()
            .all(|decision| decision.reason == CompileReason::ManifestMissing));
        assert_eq!(plan.summary.status_label(), "compiled");
    }

    #[test]
    fn warm_cache_hits_until_inputs_change() {
        let temp = TempDir::new().expect("temp");
        let app = setup_app_paths(temp.path());
        let req = request();
        let cold = build_compile_plan(&app, &req).expect("plan");
        seed_cache_from_plan(&cold, &req);

        let warm = build_compile_plan(&app, &req).expect("plan");
        assert_eq!(warm.summary.cache_hit_count, 2);
        assert_eq!(warm.summary.status_label(), "cached");

        fs::write(app.mods_dir.join("night").join("defs.xml"), "<Defs></Defs>").expect("edit");
        let edited = build_compile_plan(&app, &req).expect("plan");
        assert_eq!(edited.decisions[0].action, CompileAction::UseCache);
        assert_eq!(edited.decisions[1].reason, CompileReason::InputHashMismatch);
    }

    #[test]
    fn version_change_and_missing_defs_invalidate() {
        let temp = TempDir::new().expect("temp");
        let app = setup_app_paths(temp.path());
        let req = request();
        let cold = build_compile_plan(&app, &req).expect("plan");
        seed_cache_from_plan(&cold, &req);

        let bumped = ContentRequest {
            game_version: "next".to_string(),
            ..req.clone()
        };
        let plan = build_compile_plan(&app, &bumped).expect("plan");
        assert!(plan
            .decisions
            .iter()
            .all(|decision| decision.reason == CompileReason::VersionMismatch));

        fs::remove_file(&cold.decisions[0].defs_path).expect("remove defs");
        let plan = build_compile_plan(&app, &req).expect("plan");
        assert_eq!(plan.decisions[0].reason, CompileReason::DefsMissing);
    }

    #[test]
    fn changing_mod_list_invalidates_base() {
        let temp = TempDir::new().expect("temp");
        let app = setup_app_paths(temp.path());
        let req = request();
        let cold = build_compile_plan(&app, &req).expect("plan");
        seed_cache_from_plan(&cold, &req);

        let base_only = build_compile_plan(&app, &ContentRequest::default()).expect("plan");
        assert_eq!(
            base_only.decisions[0].reason,
            CompileReason::EnabledModsHashMismatch
        );
    }
}
