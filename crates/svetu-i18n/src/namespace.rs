//! Repair of bundles whose keys are nested twice under their own namespace.
//!
//! A bundle for module `admin` is expected to look like
//! `{"admin": {"title": ...}}`. Exports from the translation admin used to
//! produce `{"admin": {"admin": {"title": ...}}}`, which leaves every key one
//! level too deep.

use crate::dictionary::{merge_maps, MessageDictionary};
use crate::error::{I18nError, I18nResult};
use crate::module::ModuleName;
use crate::provider::is_directory;
use serde_json::Value;
use std::path::{Path, PathBuf};
use svetu_common::write_atomic;
use tracing::{debug, info, warn};

/// Collapses `module.module.*` into `module.*`, repeatedly, with the inner
/// entries winning on conflicts. Returns `true` if anything changed.
pub fn normalize_namespace(module: &ModuleName, dictionary: &mut MessageDictionary) -> bool {
    let name = module.as_str();
    let mut changed = false;

    while let Some(Value::Object(outer)) = dictionary.root_mut().get_mut(name) {
        if !matches!(outer.get(name), Some(Value::Object(_))) {
            break;
        }
        if let Some(Value::Object(inner)) = outer.remove(name) {
            merge_maps(outer, inner);
            changed = true;
        }
    }

    changed
}

/// Rewrites every `<dir>/<locale>/<module>.json` bundle that has a doubled
/// namespace and returns the paths that were (or, with `dry_run`, would be)
/// fixed, sorted.
///
/// # Errors
///
/// Fails on unreadable directories or files and on bundles that are not
/// valid message trees.
pub async fn fix_namespace_files(dir: impl AsRef<Path>, dry_run: bool) -> I18nResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut fixed = Vec::new();

    for path in bundle_files(dir).await? {
        let Some(module) = module_from_path(&path) else {
            warn!("Skipping file with invalid module name: {}", path.display());
            continue;
        };

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| I18nError::io(&path, &e))?;
        let mut dictionary = MessageDictionary::from_json_str(&text).map_err(|e| {
            I18nError::InvalidBundle {
                reason: format!("{}: {e}", path.display()),
            }
        })?;

        if !normalize_namespace(&module, &mut dictionary) {
            continue;
        }

        if dry_run {
            info!("Would fix double namespace in {}", path.display());
        } else {
            write_atomic(&path, dictionary.to_json_pretty()?)
                .await
                .map_err(|e| I18nError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
            info!("Fixed double namespace in {}", path.display());
        }
        fixed.push(path);
    }

    fixed.sort();
    Ok(fixed)
}

fn module_from_path(path: &Path) -> Option<ModuleName> {
    let stem = path.file_stem()?.to_str()?;
    ModuleName::new(stem).ok()
}

/// JSON files one directory level below `dir`.
async fn bundle_files(dir: &Path) -> I18nResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut locales = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| I18nError::io(dir, &e))?;

    while let Some(entry) = locales.next_entry().await.map_err(|e| I18nError::io(dir, &e))? {
        let locale_dir = entry.path();
        if !is_directory(&locale_dir).await {
            continue;
        }

        let mut bundles = tokio::fs::read_dir(&locale_dir)
            .await
            .map_err(|e| I18nError::io(&locale_dir, &e))?;
        while let Some(bundle) = bundles
            .next_entry()
            .await
            .map_err(|e| I18nError::io(&locale_dir, &e))?
        {
            let path = bundle.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
    }

    debug!("Found {} bundle files under {}", files.len(), dir.display());
    Ok(files)
}
