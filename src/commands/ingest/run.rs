use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use super::geography::{GeographyParse, parse_geography};
use super::wages::{WageParse, parse_wages};
use crate::cli::IngestArgs;
use crate::model::{ArtifactPaths, IngestCounts, IngestRunManifest, SourceEntry, WageSettings};
use crate::store::IndexStore;
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let store = IndexStore::new(args.cache_root.clone());
    let manifest_dir = store.manifest_dir();
    ensure_directory(&manifest_dir)?;

    let run_manifest_path = args.run_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!("ingest_run_{}.json", utc_compact_string(started_ts)))
    });

    let settings = settings_from_args(&args);
    info!(
        cache_root = %args.cache_root.display(),
        run_id = %run_id,
        occupation = %settings.occupation_filter,
        hours_per_year = settings.hours_per_year,
        "starting ingest"
    );

    let mut sources = Vec::new();

    let geography = match &args.geography_path {
        Some(path) => {
            sources.push(source_entry("geography", path)?);
            Some(parse_geography(open_extract(path)?, path)?)
        }
        None => None,
    };
    let wages = match &args.wage_path {
        Some(path) => {
            sources.push(source_entry("wage", path)?);
            Some(parse_wages(open_extract(path)?, path, &settings)?)
        }
        None => None,
    };

    let mut artifacts = ArtifactPaths {
        cache_root: args.cache_root.display().to_string(),
        ..ArtifactPaths::default()
    };
    if let Some(parsed) = &geography {
        let path = store.save_area_index(&parsed.index)?;
        artifacts.area_index_path = Some(path.display().to_string());
    }
    if let Some(parsed) = &wages {
        let path = store.save_wage_index(&settings.occupation_filter, &parsed.index)?;
        artifacts.wage_index_path = Some(path.display().to_string());
    }

    let counts = collect_counts(geography.as_ref(), wages.as_ref());
    let warnings = wages.map(|parsed| parsed.warnings).unwrap_or_default();

    let manifest = IngestRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        status: "completed".to_string(),
        started_at,
        finished_at: now_utc_string(),
        command: render_ingest_command(&args),
        settings,
        sources,
        artifacts,
        counts,
        warnings,
    };

    write_json_pretty(&run_manifest_path, &manifest)?;

    info!(path = %run_manifest_path.display(), "wrote ingest run manifest");
    info!(
        states = manifest.counts.states,
        area_groups = manifest.counts.area_groups,
        wage_areas = manifest.counts.wage_areas,
        wage_rows_matched = manifest.counts.wage_rows_matched,
        warnings = manifest.warnings.len(),
        "ingest completed"
    );

    Ok(())
}

pub(super) fn settings_from_args(args: &IngestArgs) -> WageSettings {
    WageSettings {
        occupation_filter: args.occupation.clone(),
        hours_per_year: args.hours_per_year,
        rounding_precision: args.rounding_precision,
    }
}

fn open_extract(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn source_entry(kind: &str, path: &Path) -> Result<SourceEntry> {
    let (sha256, bytes) = sha256_file(path)?;
    Ok(SourceEntry {
        kind: kind.to_string(),
        path: path.display().to_string(),
        sha256,
        bytes,
    })
}

pub(super) fn collect_counts(
    geography: Option<&GeographyParse>,
    wages: Option<&WageParse>,
) -> IngestCounts {
    let mut counts = IngestCounts::default();

    if let Some(parsed) = geography {
        counts.geography_rows_read = parsed.stats.rows_read;
        counts.geography_noise_rows = parsed.stats.noise_rows;
        counts.states = parsed.stats.states;
        counts.area_groups = parsed.stats.area_groups;
        counts.county_rows = parsed.stats.county_rows;
        counts.state_code_conflicts = parsed.stats.state_code_conflicts;
    }

    if let Some(parsed) = wages {
        counts.wage_rows_read = parsed.stats.rows_read;
        counts.wage_noise_rows = parsed.stats.noise_rows;
        counts.wage_areas = parsed.stats.areas;
        counts.wage_rows_matched = parsed.stats.rows_matched;
        counts.wage_values_unreported = parsed.stats.values_unreported;
        counts.wage_values_unparseable = parsed.stats.values_unparseable;
    }

    counts
}

pub(super) fn render_ingest_command(args: &IngestArgs) -> String {
    let mut command = vec![
        "wagemap".to_string(),
        "ingest".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
    ];

    if let Some(path) = &args.geography_path {
        command.push("--geography-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.wage_path {
        command.push("--wage-path".to_string());
        command.push(path.display().to_string());
    }

    command.push("--occupation".to_string());
    command.push(args.occupation.clone());
    command.push("--hours-per-year".to_string());
    command.push(args.hours_per_year.to_string());
    command.push("--rounding-precision".to_string());
    command.push(args.rounding_precision.to_string());

    if let Some(path) = &args.run_manifest_path {
        command.push("--run-manifest-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
