//src/error.rs

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures talking to the gene database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open gene database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("gene database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Failures reading the alias table.
#[derive(Error, Debug)]
pub enum AliasError {
    #[error("failed to read alias table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failures of the presence/absence reporting collaborator.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Status {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program} produced no output")]
    EmptyOutput { program: String },

    #[error("{program} produced output that is not valid UTF-8")]
    Encoding { program: String },

    #[error("gene database query failed: {0}")]
    Store(#[from] StoreError),
}

/// Everything that can interrupt a gene exploration session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The user dismissed a prompt where there is nothing to go back to.
    #[error("user cancelled the operation")]
    UserCancelled,

    #[error("could not find locus tag {alias} in the aliases file; it might not be in this database")]
    UnknownGene { alias: String },

    #[error("{feature} is not yet implemented")]
    NotImplemented { feature: &'static str },

    #[error("export failed: {0}")]
    ExportFailed(#[from] ExportError),

    /// The dataset violates an assumption the workflow relies on.
    #[error("data integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Aliases(#[from] AliasError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("workflow step {0} was reached without the context it needs")]
    OutOfOrder(&'static str),
}

impl SessionError {
    /// Recoverable errors are shown to the user and the current menu is presented again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::UnknownGene { .. }
                | SessionError::NotImplemented { .. }
                | SessionError::ExportFailed(_)
        )
    }
}
