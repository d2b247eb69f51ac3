use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{IngestRunManifest, StateIndex, WageIndex};
use crate::store::IndexStore;
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let store = IndexStore::new(args.cache_root.clone());

    info!(cache_root = %store.root().display(), "status requested");

    match latest_run_manifest(&store.manifest_dir())? {
        Some(path) => {
            let manifest: IngestRunManifest = read_json(&path)?;
            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                finished_at = %manifest.finished_at,
                occupation = %manifest.settings.occupation_filter,
                hours_per_year = manifest.settings.hours_per_year,
                rounding_precision = manifest.settings.rounding_precision,
                warnings = manifest.warnings.len(),
                "loaded latest ingest run manifest"
            );
        }
        None => warn!(path = %store.manifest_dir().display(), "no ingest run manifest found"),
    }

    let area_path = store.area_index_path();
    if area_path.is_file() {
        let states: StateIndex = read_json(&area_path)?;
        let area_groups: usize = states.values().map(|entry| entry.areas.len()).sum();
        let counties: usize = states
            .values()
            .flat_map(|entry| entry.areas.iter())
            .map(|group| group.counties.len())
            .sum();
        info!(
            path = %area_path.display(),
            states = states.len(),
            area_groups,
            counties,
            "area index"
        );
    } else {
        warn!(path = %area_path.display(), "area index missing");
    }

    let wage_files = store.wage_index_files()?;
    if wage_files.is_empty() {
        warn!(root = %store.root().display(), "no wage index artifacts");
    }
    for path in wage_files {
        let wages: WageIndex = read_json(&path)?;
        let entries: usize = wages.values().map(Vec::len).sum();
        info!(
            path = %path.display(),
            areas = wages.len(),
            entries,
            "wage index"
        );
    }

    Ok(())
}

fn latest_run_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.is_dir() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();
        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("ingest_run_") && name.ends_with(".json"))
            .unwrap_or(false);
        if is_run_manifest && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}
