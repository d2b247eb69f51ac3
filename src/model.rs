use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::cli::WageLevel;
use crate::salary::{Salary, blank_when_absent};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&index| &self.entries[index].1)
    }

    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let index = match self.positions.get(key) {
            Some(&index) => index,
            None => {
                self.entries.push((key.to_string(), make()));
                let index = self.entries.len() - 1;
                self.positions.insert(key.to_string(), index);
                index
            }
        };
        &mut self.entries[index].1
    }

    fn insert_new(&mut self, key: String, value: V) -> bool {
        if self.contains_key(&key) {
            return false;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if !map.insert_new(key.clone(), value) {
                        return Err(serde::de::Error::custom(format!("duplicate key: {key}")));
                    }
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRecord {
    pub area_code: String,
    pub area_name: String,
    pub state_code: String,
    pub state_name: String,
    pub county_name: String,
}

/// Persisted as a single-key object: `{ "<areaCode>": { "blsName", "counties" } }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaGroup {
    pub area_code: String,
    pub bls_name: String,
    pub counties: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AreaGroupBodyRef<'a> {
    bls_name: &'a str,
    counties: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AreaGroupBody {
    bls_name: String,
    #[serde(default)]
    counties: Vec<String>,
}

impl Serialize for AreaGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.area_code,
            &AreaGroupBodyRef {
                bls_name: &self.bls_name,
                counties: &self.counties,
            },
        )?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for AreaGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, AreaGroupBody>::deserialize(deserializer)?;
        let found = raw.len();
        let mut entries = raw.into_iter();
        match (entries.next(), entries.next()) {
            (Some((area_code, body)), None) => Ok(Self {
                area_code,
                bls_name: body.bls_name,
                counties: body.counties,
            }),
            _ => Err(serde::de::Error::custom(format!(
                "area group must have exactly one area code, found {found}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    #[serde(rename = "stateCode")]
    pub state_code: String,
    #[serde(rename = "blsCodesAndCounties", default)]
    pub areas: Vec<AreaGroup>,
}

pub type StateIndex = OrderedMap<StateEntry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WageRecord {
    pub area_code: String,
    pub occupation_code: String,
    pub level1: String,
    pub level2: String,
    pub level3: String,
    pub level4: String,
    pub average: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualWage {
    #[serde(with = "blank_when_absent", default)]
    pub level1_salary: Option<Salary>,
    #[serde(with = "blank_when_absent", default)]
    pub level2_salary: Option<Salary>,
    #[serde(with = "blank_when_absent", default)]
    pub level3_salary: Option<Salary>,
    #[serde(with = "blank_when_absent", default)]
    pub level4_salary: Option<Salary>,
    #[serde(with = "blank_when_absent", default)]
    pub avg_salary: Option<Salary>,
}

impl AnnualWage {
    pub fn level(&self, level: WageLevel) -> Option<Salary> {
        match level {
            WageLevel::Level1 => self.level1_salary,
            WageLevel::Level2 => self.level2_salary,
            WageLevel::Level3 => self.level3_salary,
            WageLevel::Level4 => self.level4_salary,
            WageLevel::Avg => self.avg_salary,
        }
    }
}

pub type WageIndex = OrderedMap<Vec<AnnualWage>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub kind: String,
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WageSettings {
    pub occupation_filter: String,
    pub hours_per_year: u32,
    pub rounding_precision: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestCounts {
    pub geography_rows_read: usize,
    pub geography_noise_rows: usize,
    pub states: usize,
    pub area_groups: usize,
    pub county_rows: usize,
    pub state_code_conflicts: usize,
    pub wage_rows_read: usize,
    pub wage_noise_rows: usize,
    pub wage_areas: usize,
    pub wage_rows_matched: usize,
    pub wage_values_unreported: usize,
    pub wage_values_unparseable: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub cache_root: String,
    pub area_index_path: Option<String>,
    pub wage_index_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: String,
    pub command: String,
    pub settings: WageSettings,
    pub sources: Vec<SourceEntry>,
    pub artifacts: ArtifactPaths,
    pub counts: IngestCounts,
    pub warnings: Vec<String>,
}
