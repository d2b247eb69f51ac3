use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::IndexError;
use crate::model::{StateIndex, WageIndex};
use crate::util::{read_json, write_json_pretty};

const AREA_INDEX_FILE: &str = "db_area.json";
const WAGE_INDEX_PREFIX: &str = "db_wage_";

#[derive(Debug, Clone)]
pub struct IndexStore {
    root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub occupation_filter: String,
    pub states: StateIndex,
    pub wages: WageIndex,
}

impl IndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.root.join("manifests")
    }

    pub fn area_index_path(&self) -> PathBuf {
        self.root.join(AREA_INDEX_FILE)
    }

    pub fn wage_index_path(&self, occupation_filter: &str) -> PathBuf {
        self.root.join(format!(
            "{WAGE_INDEX_PREFIX}{}.json",
            artifact_slug(occupation_filter)
        ))
    }

    pub fn save_area_index(&self, index: &StateIndex) -> Result<PathBuf> {
        let path = self.area_index_path();
        write_json_pretty(&path, index)?;
        info!(path = %path.display(), states = index.len(), "wrote area index");
        Ok(path)
    }

    pub fn save_wage_index(&self, occupation_filter: &str, index: &WageIndex) -> Result<PathBuf> {
        let path = self.wage_index_path(occupation_filter);
        write_json_pretty(&path, index)?;
        info!(
            path = %path.display(),
            occupation = occupation_filter,
            areas = index.len(),
            "wrote wage index"
        );
        Ok(path)
    }

    pub fn load_area_index(&self) -> Result<StateIndex> {
        load_artifact("area", &self.area_index_path())
    }

    pub fn load_wage_index(&self, occupation_filter: &str) -> Result<WageIndex> {
        load_artifact("wage", &self.wage_index_path(occupation_filter))
    }

    pub fn load_snapshot(&self, occupation_filter: &str) -> Result<IndexSnapshot> {
        let states = self.load_area_index()?;
        let wages = self.load_wage_index(occupation_filter)?;

        info!(
            root = %self.root.display(),
            occupation = occupation_filter,
            states = states.len(),
            wage_areas = wages.len(),
            "loaded index snapshot"
        );

        Ok(IndexSnapshot {
            occupation_filter: occupation_filter.to_string(),
            states,
            wages,
        })
    }

    pub fn wage_index_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("failed to read {}", self.root.display()))?;
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read entry in {}", self.root.display()))?;
            let path = entry.path();
            let is_wage_artifact = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(WAGE_INDEX_PREFIX) && name.ends_with(".json"))
                .unwrap_or(false);
            if is_wage_artifact && path.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

pub fn artifact_slug(occupation_filter: &str) -> String {
    if occupation_filter.is_empty() {
        return "all".to_string();
    }

    occupation_filter
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn load_artifact<T: DeserializeOwned>(kind: &'static str, path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(IndexError::NotBuilt {
            kind,
            path: path.to_path_buf(),
        }
        .into());
    }

    debug!(kind, path = %path.display(), "loading index artifact");
    read_json(path).map_err(|err| {
        anyhow::Error::from(IndexError::InvalidArtifact {
            kind,
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnualWage, AreaGroup, StateEntry};

    fn sample_states() -> StateIndex {
        let mut states = StateIndex::new();
        states.get_or_insert_with("Texas", || StateEntry {
            state_code: "TX".to_string(),
            areas: vec![AreaGroup {
                area_code: "19100".to_string(),
                bls_name: "Dallas-Fort Worth-Arlington, TX".to_string(),
                counties: vec!["Dallas County".to_string(), "Collin County".to_string()],
            }],
        });
        states.get_or_insert_with("Delaware", || StateEntry {
            state_code: "DE".to_string(),
            areas: vec![AreaGroup {
                area_code: "1000005".to_string(),
                bls_name: "Sussex Delaware Non metropolitan area".to_string(),
                counties: vec!["Sussex County".to_string()],
            }],
        });
        states
    }

    fn sample_wages() -> WageIndex {
        let mut wages = WageIndex::new();
        wages.get_or_insert_with("19100", Vec::new).push(AnnualWage {
            level1_salary: Some("75000.00".parse().unwrap()),
            avg_salary: Some("110000.50".parse().unwrap()),
            ..AnnualWage::default()
        });
        wages.get_or_insert_with("1000005", Vec::new);
        wages
    }

    #[test]
    fn persisted_indexes_reload_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());

        let states = sample_states();
        let wages = sample_wages();
        store.save_area_index(&states).unwrap();
        store.save_wage_index("15-1252", &wages).unwrap();

        let snapshot = store.load_snapshot("15-1252").unwrap();
        assert_eq!(snapshot.states, states);
        assert_eq!(snapshot.wages, wages);
        assert_eq!(
            snapshot.states.keys().collect::<Vec<_>>(),
            vec!["Texas", "Delaware"]
        );
        assert_eq!(
            snapshot.wages.get("19100").unwrap()[0]
                .avg_salary
                .map(|value| value.to_string())
                .as_deref(),
            Some("110000.50")
        );
    }

    #[test]
    fn missing_artifacts_report_not_built() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());

        let err = store.load_area_index().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::NotBuilt { kind: "area", .. })
        ));

        store.save_area_index(&sample_states()).unwrap();
        let err = store.load_snapshot("15-1252").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::NotBuilt { kind: "wage", .. })
        ));
    }

    #[test]
    fn corrupt_artifact_is_not_confused_with_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        fs::write(store.area_index_path(), b"[1, 2").unwrap();

        let err = store.load_area_index().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::InvalidArtifact { kind: "area", .. })
        ));
    }

    #[test]
    fn wage_artifacts_are_named_per_filter() {
        let store = IndexStore::new("cache");
        assert_eq!(
            store.wage_index_path("15-1252"),
            PathBuf::from("cache").join("db_wage_15-1252.json")
        );
        assert_ne!(store.wage_index_path("15-1252"), store.wage_index_path("15-1253"));
        assert_eq!(artifact_slug(""), "all");
        assert_eq!(artifact_slug("15/12 52"), "15_12_52");
    }

    #[test]
    fn wage_index_files_lists_only_wage_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::new(dir.path());
        store.save_area_index(&sample_states()).unwrap();
        store.save_wage_index("15-1253", &sample_wages()).unwrap();
        store.save_wage_index("15-1252", &sample_wages()).unwrap();

        let names: Vec<String> = store
            .wage_index_files()
            .unwrap()
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()).map(String::from))
            .collect();
        assert_eq!(names, vec!["db_wage_15-1252.json", "db_wage_15-1253.json"]);
    }
}
