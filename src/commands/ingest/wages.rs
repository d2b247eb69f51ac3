use std::io::BufRead;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use super::fields::{for_each_line, is_section_noise, split_fields};
use crate::error::IndexError;
use crate::model::{AnnualWage, WageIndex, WageRecord, WageSettings};
use crate::salary::{Salary, SalaryParseError};

const AREA_CODE: usize = 0;
const OCCUPATION_CODE: usize = 1;
const LEVEL1: usize = 3;
const LEVEL2: usize = 4;
const LEVEL3: usize = 5;
const LEVEL4: usize = 6;
const AVERAGE: usize = 7;
const WAGE_MIN_FIELDS: usize = AVERAGE + 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WageStats {
    pub rows_read: usize,
    pub noise_rows: usize,
    pub areas: usize,
    pub rows_matched: usize,
    pub values_unreported: usize,
    pub values_unparseable: usize,
}

#[derive(Debug)]
pub(crate) struct WageParse {
    pub index: WageIndex,
    pub stats: WageStats,
    pub warnings: Vec<String>,
}

pub(crate) fn parse_wages<R: BufRead>(
    reader: R,
    source: &Path,
    settings: &WageSettings,
) -> Result<WageParse> {
    let mut index = WageIndex::new();
    let mut stats = WageStats::default();
    let mut warnings = Vec::new();

    let rows_read = for_each_line(reader, source, |line, text| {
        let fields = split_fields(text);
        let area_code = fields.first().copied().unwrap_or_default();
        if is_section_noise(area_code) {
            stats.noise_rows += 1;
            return Ok(());
        }

        let record = wage_record(&fields).ok_or_else(|| IndexError::MalformedRow {
            kind: "wage",
            path: source.to_path_buf(),
            line,
            expected: WAGE_MIN_FIELDS,
            found: fields.len(),
        })?;

        let wages = index.get_or_insert_with(&record.area_code, Vec::new);
        if !record.occupation_code.contains(settings.occupation_filter.as_str()) {
            return Ok(());
        }

        let mut annualize = |column: &str, raw: &str| {
            let annual = parse_hourly(raw).and_then(|hourly| {
                hourly
                    .map(|value| {
                        Salary::annualize(value, settings.hours_per_year, settings.rounding_precision)
                    })
                    .transpose()
            });
            match annual {
                Ok(Some(value)) => Some(value),
                Ok(None) => {
                    stats.values_unreported += 1;
                    None
                }
                Err(err) => {
                    stats.values_unparseable += 1;
                    let message = format!(
                        "{}:{line}: {column} for area {} treated as not reported: {err}",
                        source.display(),
                        record.area_code
                    );
                    warn!(source = %source.display(), line, column, value = raw, "unparseable hourly wage");
                    warnings.push(message);
                    None
                }
            }
        };

        let wage = AnnualWage {
            level1_salary: annualize("level1", &record.level1),
            level2_salary: annualize("level2", &record.level2),
            level3_salary: annualize("level3", &record.level3),
            level4_salary: annualize("level4", &record.level4),
            avg_salary: annualize("avg", &record.average),
        };
        wages.push(wage);
        stats.rows_matched += 1;
        Ok(())
    })?;

    stats.rows_read = rows_read;
    stats.areas = index.len();

    debug!(
        source = %source.display(),
        occupation = %settings.occupation_filter,
        rows = stats.rows_read,
        areas = stats.areas,
        matched = stats.rows_matched,
        "parsed wage extract"
    );

    Ok(WageParse {
        index,
        stats,
        warnings,
    })
}

pub(crate) fn wage_record(fields: &[&str]) -> Option<WageRecord> {
    if fields.len() < WAGE_MIN_FIELDS {
        return None;
    }

    Some(WageRecord {
        area_code: fields[AREA_CODE].to_string(),
        occupation_code: fields[OCCUPATION_CODE].to_string(),
        level1: fields[LEVEL1].to_string(),
        level2: fields[LEVEL2].to_string(),
        level3: fields[LEVEL3].to_string(),
        level4: fields[LEVEL4].to_string(),
        average: fields[AVERAGE].to_string(),
    })
}

fn parse_hourly(raw: &str) -> Result<Option<Salary>, SalaryParseError> {
    match raw.parse::<Salary>() {
        Ok(value) => Ok(Some(value)),
        Err(SalaryParseError::Empty) => Ok(None),
        Err(err) => Err(err),
    }
}
