use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};

const BYTE_ORDER_MARK: char = '\u{feff}';
const QUOTE: char = '"';

pub(super) fn split_fields(line: &str) -> Vec<&str> {
    line.split(',').map(strip_delimiters).collect()
}

fn strip_delimiters(field: &str) -> &str {
    let field = field.strip_prefix(QUOTE).unwrap_or(field);
    field.strip_suffix(QUOTE).unwrap_or(field)
}

pub(super) fn is_section_noise(area_code: &str) -> bool {
    area_code.contains("Area")
}

pub(super) fn for_each_line<R, F>(mut reader: R, source: &Path, mut visit: F) -> Result<usize>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<()>,
{
    let mut buffer = String::new();
    let mut line_number = 0;
    let mut visited = 0;

    loop {
        buffer.clear();
        let read = reader
            .read_line(&mut buffer)
            .with_context(|| format!("failed to read line {} of {}", line_number + 1, source.display()))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let mut text = buffer.as_str();
        if line_number == 1 {
            text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        }
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        visited += 1;
        visit(line_number, text)?;
    }

    Ok(visited)
}
