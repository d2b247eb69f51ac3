use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("{kind} index not built: {} is missing (run `wagemap ingest` first)", .path.display())]
    NotBuilt { kind: &'static str, path: PathBuf },

    #[error(
        "{}:{line}: malformed {kind} row: expected at least {expected} fields, found {found}",
        .path.display()
    )]
    MalformedRow {
        kind: &'static str,
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid {kind} artifact {}: {reason}", .path.display())]
    InvalidArtifact {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
}
