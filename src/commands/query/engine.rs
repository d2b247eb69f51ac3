use serde::Serialize;

use crate::cli::WageLevel;
use crate::model::{StateIndex, WageIndex};
use crate::salary::Salary;
use crate::store::IndexSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateMatch {
    pub state_name: String,
    pub state_code: String,
    pub counties: Vec<String>,
}

pub fn fetch_counties_by_wage(
    states: &StateIndex,
    wages: &WageIndex,
    state_name: &str,
    current_salary: Salary,
    level: WageLevel,
) -> Vec<String> {
    let Some(state) = states.get(state_name) else {
        return Vec::new();
    };

    let mut counties: Vec<String> = state
        .areas
        .iter()
        .filter(|group| {
            wages
                .get(&group.area_code)
                .and_then(|entries| entries.first())
                .and_then(|wage| wage.level(level))
                .is_some_and(|threshold| current_salary >= threshold)
        })
        .flat_map(|group| group.counties.iter().cloned())
        .collect();

    counties.sort();
    counties
}

pub fn eligible_states(
    snapshot: &IndexSnapshot,
    current_salary: Salary,
    level: WageLevel,
) -> Vec<StateMatch> {
    snapshot
        .states
        .iter()
        .filter_map(|(state_name, entry)| {
            let counties = fetch_counties_by_wage(
                &snapshot.states,
                &snapshot.wages,
                state_name,
                current_salary,
                level,
            );
            (!counties.is_empty()).then(|| StateMatch {
                state_name: state_name.to_string(),
                state_code: entry.state_code.clone(),
                counties,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnualWage, AreaGroup, StateEntry};

    fn dec(raw: &str) -> Salary {
        raw.parse().unwrap()
    }

    fn group(code: &str, counties: &[&str]) -> AreaGroup {
        AreaGroup {
            area_code: code.to_string(),
            bls_name: format!("area {code}"),
            counties: counties.iter().map(|county| county.to_string()).collect(),
        }
    }

    fn level3(value: &str) -> AnnualWage {
        AnnualWage {
            level3_salary: Some(dec(value)),
            ..AnnualWage::default()
        }
    }

    fn fixture() -> IndexSnapshot {
        let mut states = StateIndex::new();
        states.get_or_insert_with("Delaware", || StateEntry {
            state_code: "DE".to_string(),
            areas: vec![group("1000005", &["Sussex County"])],
        });
        states.get_or_insert_with("Texas", || StateEntry {
            state_code: "TX".to_string(),
            areas: vec![
                group("19100", &["Dallas County", "Collin County"]),
                group("26420", &["Harris County", "Collin County"]),
                group("41700", &["Bexar County"]),
                group("99999", &["Loving County"]),
            ],
        });

        let mut wages = WageIndex::new();
        wages.get_or_insert_with("1000005", Vec::new).push(level3("41600.00"));
        wages.get_or_insert_with("19100", Vec::new).push(level3("95000.00"));
        wages
            .get_or_insert_with("26420", Vec::new)
            .extend([level3("90000.00"), level3("10.00")]);
        wages
            .get_or_insert_with("41700", Vec::new)
            .push(AnnualWage::default());

        IndexSnapshot {
            occupation_filter: "15-1252".to_string(),
            states,
            wages,
        }
    }

    fn query(snapshot: &IndexSnapshot, state: &str, salary: &str) -> Vec<String> {
        fetch_counties_by_wage(
            &snapshot.states,
            &snapshot.wages,
            state,
            dec(salary),
            WageLevel::Level3,
        )
    }

    #[test]
    fn sussex_scenario_matches_at_or_above_prevailing_wage() {
        let snapshot = fixture();
        assert_eq!(query(&snapshot, "Delaware", "42000"), vec!["Sussex County"]);
        assert_eq!(query(&snapshot, "Delaware", "41600"), vec!["Sussex County"]);
        assert!(query(&snapshot, "Delaware", "40000").is_empty());
    }

    #[test]
    fn unknown_state_yields_empty_result() {
        let snapshot = fixture();
        assert!(query(&snapshot, "Atlantis", "1000000").is_empty());
        assert!(query(&snapshot, "delaware", "1000000").is_empty());
    }

    #[test]
    fn qualifying_areas_contribute_all_counties_sorted_with_duplicates() {
        let snapshot = fixture();
        assert_eq!(
            query(&snapshot, "Texas", "100000"),
            vec!["Collin County", "Collin County", "Dallas County", "Harris County"]
        );
    }

    #[test]
    fn only_first_wage_entry_of_an_area_is_used() {
        let snapshot = fixture();
        assert!(query(&snapshot, "Texas", "50000").is_empty());
    }

    #[test]
    fn missing_level_and_missing_wage_area_never_qualify() {
        let snapshot = fixture();
        let counties = query(&snapshot, "Texas", "100000000");
        assert!(!counties.contains(&"Bexar County".to_string()));
        assert!(!counties.contains(&"Loving County".to_string()));
    }

    #[test]
    fn results_grow_monotonically_with_salary() {
        let snapshot = fixture();
        for state in ["Delaware", "Texas"] {
            let mut previous: Vec<String> = Vec::new();
            for salary in ["0", "41599.99", "41600", "90000", "94999.99", "95000", "200000"] {
                let current = query(&snapshot, state, salary);
                assert!(current.windows(2).all(|pair| pair[0] <= pair[1]));
                assert!(previous.iter().all(|county| current.contains(county)));
                previous = current;
            }
        }
    }

    #[test]
    fn eligible_states_keeps_index_order_and_skips_empty_states() {
        let snapshot = fixture();

        let matches = eligible_states(&snapshot, dec("92000"), WageLevel::Level3);
        assert_eq!(
            matches,
            vec![
                StateMatch {
                    state_name: "Delaware".to_string(),
                    state_code: "DE".to_string(),
                    counties: vec!["Sussex County".to_string()],
                },
                StateMatch {
                    state_name: "Texas".to_string(),
                    state_code: "TX".to_string(),
                    counties: vec!["Collin County".to_string(), "Harris County".to_string()],
                },
            ]
        );

        assert!(eligible_states(&snapshot, dec("100"), WageLevel::Level3).is_empty());
        assert!(eligible_states(&snapshot, dec("1000000"), WageLevel::Level1).is_empty());
    }
}
