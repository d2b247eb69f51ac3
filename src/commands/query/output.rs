use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use super::engine::StateMatch;

#[derive(Debug, Clone, Serialize)]
pub(super) struct QueryResponse {
    pub occupation: String,
    pub salary: String,
    pub level: String,
    pub level_key: String,
    pub state_filter: Option<String>,
    pub states_matched: usize,
    pub counties_matched: usize,
    pub results: Vec<StateMatch>,
}

pub(super) fn write_json_response<W: Write>(output: &mut W, response: &QueryResponse) -> Result<()> {
    serde_json::to_writer_pretty(&mut *output, response)
        .context("failed to serialize query json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub(super) fn write_text_response<W: Write>(output: &mut W, response: &QueryResponse) -> Result<()> {
    writeln!(
        output,
        "Occupation: {}\tLevel: {}\tSalary: {}",
        response.occupation, response.level, response.salary
    )?;
    writeln!(
        output,
        "States: {}\tCounties: {}",
        response.states_matched, response.counties_matched
    )?;

    for state in &response.results {
        writeln!(output, "State: {} ({})", state.state_name, state.state_code)?;
        writeln!(output, "\t{}", state.counties.join(", "))?;
    }

    output.flush()?;
    Ok(())
}

pub(super) fn stdout_writer() -> io::BufWriter<io::StdoutLock<'static>> {
    io::BufWriter::new(io::stdout().lock())
}
