use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use super::fields::{for_each_line, is_section_noise, split_fields};
use crate::error::IndexError;
use crate::model::{AreaGroup, AreaRecord, StateEntry, StateIndex};

const GEOGRAPHY_MIN_FIELDS: usize = 5;
const TRAILING_FIELDS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GeographyStats {
    pub rows_read: usize,
    pub noise_rows: usize,
    pub county_rows: usize,
    pub states: usize,
    pub area_groups: usize,
    pub state_code_conflicts: usize,
}

#[derive(Debug)]
pub(crate) struct GeographyParse {
    pub index: StateIndex,
    pub stats: GeographyStats,
}

pub(crate) fn parse_geography<R: BufRead>(reader: R, source: &Path) -> Result<GeographyParse> {
    let mut builder = StateIndexBuilder::default();
    let mut stats = GeographyStats::default();

    let rows_read = for_each_line(reader, source, |line, text| {
        let fields = split_fields(text);
        let area_code = fields.first().copied().unwrap_or_default();
        if is_section_noise(area_code) {
            stats.noise_rows += 1;
            return Ok(());
        }

        let record = area_record(&fields).ok_or_else(|| IndexError::MalformedRow {
            kind: "geography",
            path: source.to_path_buf(),
            line,
            expected: GEOGRAPHY_MIN_FIELDS,
            found: fields.len(),
        })?;

        if builder.push(record) {
            stats.state_code_conflicts += 1;
            warn!(
                source = %source.display(),
                line,
                "state code differs from earlier rows of the same state; keeping the first"
            );
        }
        stats.county_rows += 1;
        Ok(())
    })?;

    let index = builder.finish();
    stats.rows_read = rows_read;
    stats.states = index.len();
    stats.area_groups = index.values().map(|entry| entry.areas.len()).sum();

    debug!(
        source = %source.display(),
        rows = stats.rows_read,
        states = stats.states,
        area_groups = stats.area_groups,
        "parsed geography extract"
    );

    Ok(GeographyParse { index, stats })
}

pub(crate) fn area_record(fields: &[&str]) -> Option<AreaRecord> {
    if fields.len() < GEOGRAPHY_MIN_FIELDS {
        return None;
    }

    let tail = fields.len() - TRAILING_FIELDS;
    Some(AreaRecord {
        area_code: fields[0].to_string(),
        area_name: fields[1..tail].join(","),
        state_code: fields[tail].to_string(),
        state_name: fields[tail + 1].to_string(),
        county_name: fields[tail + 2].to_string(),
    })
}

#[derive(Debug, Default)]
struct StateIndexBuilder {
    index: StateIndex,
    groups: HashMap<(String, String), usize>,
}

impl StateIndexBuilder {
    fn push(&mut self, record: AreaRecord) -> bool {
        let entry = self
            .index
            .get_or_insert_with(&record.state_name, || StateEntry {
                state_code: record.state_code.clone(),
                areas: Vec::new(),
            });
        let conflict = entry.state_code != record.state_code;

        let key = (record.state_name, record.area_code);
        let position = match self.groups.get(&key) {
            Some(&position) => position,
            None => {
                entry.areas.push(AreaGroup {
                    area_code: key.1.clone(),
                    bls_name: record.area_name,
                    counties: Vec::new(),
                });
                let position = entry.areas.len() - 1;
                self.groups.insert(key, position);
                position
            }
        };

        entry.areas[position].counties.push(record.county_name);
        conflict
    }

    fn finish(self) -> StateIndex {
        self.index
    }
}
