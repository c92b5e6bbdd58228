use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::AppPaths;

use super::types::{ContentPlanError, ContentRequest};

pub(crate) const BASE_MOD_ID: &str = "base";

#[derive(Debug, Clone)]
pub(crate) struct ModSource {
    pub mod_id: String,
    pub mod_load_index: u32,
    pub source_dir: PathBuf,
}

/// `base` first, then enabled mods in request order.
pub(crate) fn discover_mod_sources(
    app_paths: &AppPaths,
    request: &ContentRequest,
) -> Result<Vec<ModSource>, ContentPlanError> {
    let mut seen = HashSet::from([BASE_MOD_ID.to_string()]);
    let mut sources = Vec::with_capacity(request.enabled_mods.len() + 1);
    sources.push(ModSource {
        mod_id: BASE_MOD_ID.to_string(),
        mod_load_index: 0,
        source_dir: app_paths.base_content_dir.clone(),
    });

    for raw_id in &request.enabled_mods {
        let mod_id = raw_id.trim();
        if mod_id.is_empty() {
            return Err(ContentPlanError::EmptyEnabledMod);
        }
        if !seen.insert(mod_id.to_string()) {
            return Err(ContentPlanError::DuplicateEnabledMod {
                mod_id: mod_id.to_string(),
            });
        }
        let source_dir = app_paths.mods_dir.join(mod_id);
        if !source_dir.is_dir() {
            return Err(ContentPlanError::EnabledModMissing {
                mod_id: mod_id.to_string(),
                expected_dir: source_dir,
            });
        }
        sources.push(ModSource {
            mod_id: mod_id.to_string(),
            mod_load_index: sources.len() as u32,
            source_dir,
        });
    }

    Ok(sources)
}

/// Every `.xml` file under `root`, keyed and sorted by its `/`-joined relative path.
pub(crate) fn collect_xml_files(root: &Path) -> Result<Vec<(String, PathBuf)>, ContentPlanError> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| ContentPlanError::ReadDir {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| ContentPlanError::ReadDir {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if is_xml_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    files.push((normalize_rel_path(rel), path.clone()));
                }
            }
        }
    }
    files.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(files)
}

fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn app_paths(root: &Path) -> AppPaths {
        AppPaths {
            root: root.to_path_buf(),
            base_content_dir: root.join("assets").join("base"),
            mods_dir: root.join("mods"),
            cache_dir: root.join("cache"),
        }
    }

    #[test]
    fn base_loads_first_then_request_order() {
        let temp = TempDir::new().expect("tempdir");
        let paths = app_paths(temp.path());
        fs::create_dir_all(&paths.base_content_dir).expect("base");
        fs::create_dir_all(paths.mods_dir.join("night")).expect("night");
        fs::create_dir_all(paths.mods_dir.join("extra")).expect("extra");
        let request = ContentRequest {
            enabled_mods: vec!["night".to_string(), " extra ".to_string()],
            ..ContentRequest::default()
        };

        let sources = discover_mod_sources(&paths, &request).expect("discover");
        let order: Vec<_> = sources
            .iter()
            .map(|source| (source.mod_id.as_str(), source.mod_load_index))
            .collect();
        assert_eq!(order, vec![("base", 0), ("night", 1), ("extra", 2)]);
    }

    #[test]
    fn rejects_duplicate_base_and_missing_mods() {
        let temp = TempDir::new().expect("tempdir");
        let paths = app_paths(temp.path());
        fs::create_dir_all(&paths.base_content_dir).expect("base");

        let duplicate = ContentRequest {
            enabled_mods: vec!["base".to_string()],
            ..ContentRequest::default()
        };
        assert!(matches!(
            discover_mod_sources(&paths, &duplicate),
            Err(ContentPlanError::DuplicateEnabledMod { .. })
        ));

        let missing = ContentRequest {
            enabled_mods: vec!["ghost".to_string()],
            ..ContentRequest::default()
        };
        assert!(matches!(
            discover_mod_sources(&paths, &missing),
            Err(ContentPlanError::EnabledModMissing { .. })
        ));

        let empty = ContentRequest {
            enabled_mods: vec!["  ".to_string()],
            ..ContentRequest::default()
        };
        assert!(matches!(
            discover_mod_sources(&paths, &empty),
            Err(ContentPlanError::EmptyEnabledMod)
        ));
    }

    #[test]
    fn xml_files_sorted_by_relative_path() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("levels")).expect("levels");
        fs::write(root.join("levels").join("b.xml"), "<Defs/>").expect("b");
        fs::write(root.join("entities.XML"), "<Defs/>").expect("entities");
        fs::write(root.join("readme.txt"), "skip").expect("txt");

        let files = collect_xml_files(root).expect("collect");
        let names: Vec<_> = files.iter().map(|(rel, _)| rel.as_str()).collect();
        assert_eq!(names, vec!["entities.XML", "levels/b.xml"]);
    }
}
