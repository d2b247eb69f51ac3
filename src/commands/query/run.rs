use anyhow::Result;
use tracing::{info, warn};

use super::engine::{StateMatch, eligible_states, fetch_counties_by_wage};
use super::output::{QueryResponse, stdout_writer, write_json_response, write_text_response};
use super::selection::build_selection;
use crate::cli::QueryArgs;
use crate::store::{IndexSnapshot, IndexStore};
use crate::util::write_json_pretty;

pub fn run(args: QueryArgs) -> Result<()> {
    let store = IndexStore::new(args.cache_root.clone());
    let snapshot = store.load_snapshot(&args.occupation)?;
    if snapshot.wages.is_empty() {
        warn!(occupation = %args.occupation, "wage index has no areas");
    }

    let response = build_response(&snapshot, &args);
    info!(
        level = args.level.as_str(),
        salary = %args.salary,
        states = response.states_matched,
        counties = response.counties_matched,
        "query completed"
    );

    if let Some(path) = &args.selection_path {
        let selection = build_selection(&response.results);
        write_json_pretty(path, &selection)?;
        info!(path = %path.display(), states = selection.len(), "wrote county selection");
    }

    let mut output = stdout_writer();
    if args.json {
        write_json_response(&mut output, &response)
    } else {
        write_text_response(&mut output, &response)
    }
}

pub(super) fn build_response(snapshot: &IndexSnapshot, args: &QueryArgs) -> QueryResponse {
    let results = match &args.state {
        Some(state_name) => single_state(snapshot, state_name, args),
        None => eligible_states(snapshot, args.salary, args.level),
    };

    QueryResponse {
        occupation: snapshot.occupation_filter.clone(),
        salary: args.salary.to_string(),
        level: args.level.as_str().to_string(),
        level_key: args.level.salary_key(),
        state_filter: args.state.clone(),
        states_matched: results.len(),
        counties_matched: results.iter().map(|state| state.counties.len()).sum(),
        results,
    }
}

fn single_state(snapshot: &IndexSnapshot, state_name: &str, args: &QueryArgs) -> Vec<StateMatch> {
    let Some(entry) = snapshot.states.get(state_name) else {
        let similar = snapshot
            .states
            .keys()
            .find(|known| known.eq_ignore_ascii_case(state_name))
            .unwrap_or_default();
        warn!(state = state_name, similar, "state not present in area index");
        return Vec::new();
    };

    let counties = fetch_counties_by_wage(
        &snapshot.states,
        &snapshot.wages,
        state_name,
        args.salary,
        args.level,
    );
    if counties.is_empty() {
        return Vec::new();
    }

    vec![StateMatch {
        state_name: state_name.to_string(),
        state_code: entry.state_code.clone(),
        counties,
    }]
}
