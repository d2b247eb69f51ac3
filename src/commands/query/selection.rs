use std::collections::BTreeMap;

use super::engine::StateMatch;

const COUNTY_SUFFIX: &str = " County";

pub type Selection = BTreeMap<String, Vec<String>>;

pub fn build_selection(matches: &[StateMatch]) -> Selection {
    let mut selection = Selection::new();
    for state in matches {
        let counties = state
            .counties
            .iter()
            .map(|county| strip_county_suffix(county).to_string())
            .collect();
        selection.insert(state.state_code.clone(), counties);
    }
    selection
}

pub fn strip_county_suffix(county: &str) -> &str {
    county
        .split_once(COUNTY_SUFFIX)
        .map_or(county, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_county_suffix_cuts_at_first_occurrence() {
        assert_eq!(strip_county_suffix("Sussex County"), "Sussex");
        assert_eq!(strip_county_suffix("Anchorage Municipality"), "Anchorage Municipality");
        assert_eq!(strip_county_suffix("Orleans Parish"), "Orleans Parish");
        assert_eq!(strip_county_suffix("Kings County County"), "Kings");
    }

    #[test]
    fn build_selection_keys_by_state_code() {
        let matches = vec![
            StateMatch {
                state_name: "Texas".to_string(),
                state_code: "TX".to_string(),
                counties: vec!["Collin County".to_string(), "Dallas County".to_string()],
            },
            StateMatch {
                state_name: "Delaware".to_string(),
                state_code: "DE".to_string(),
                counties: vec!["Sussex County".to_string()],
            },
        ];

        let selection = build_selection(&matches);
        assert_eq!(selection.keys().collect::<Vec<_>>(), vec!["DE", "TX"]);
        assert_eq!(selection["TX"], vec!["Collin", "Dallas"]);
        assert_eq!(
            serde_json::to_value(&selection).unwrap(),
            serde_json::json!({ "DE": ["Sussex"], "TX": ["Collin", "Dallas"] })
        );
    }

    #[test]
    fn later_state_replaces_earlier_entry_with_same_code() {
        let matches = vec![
            StateMatch {
                state_name: "Guam".to_string(),
                state_code: "GU".to_string(),
                counties: vec!["Guam".to_string()],
            },
            StateMatch {
                state_name: "Guam Territory".to_string(),
                state_code: "GU".to_string(),
                counties: vec!["Hagatna County".to_string()],
            },
        ];

        let selection = build_selection(&matches);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection["GU"], vec!["Hagatna"]);
    }
}
