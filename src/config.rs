//src/config.rs

use std::path::PathBuf;

use clap::Parser;

use crate::error::SessionError;

/// Program run when no in-process presence/absence table is requested.
pub const DEFAULT_PRESENCE_ABSENCE_COMMAND: &str = "db_getPresenceAbsenceTable.py";

/// Explore one gene of an ITEP database: sequences, clustering runs and related genes.
#[derive(Parser, Debug, Clone)]
#[command(name = "itep-gene")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// ITEP installation root (database in db/, alias table in aliases/)
    #[arg(long, env = "ITEP_ROOT")]
    pub root: Option<PathBuf>,

    /// Gene database (default: <root>/db/DATABASE.sqlite)
    #[arg(long, short = 'd', env = "ITEP_DATABASE")]
    pub database: Option<PathBuf>,

    /// Tab-separated geneid/alias table, optionally gzipped (default: <root>/aliases/aliases)
    #[arg(long, short = 'a', env = "ITEP_ALIASES")]
    pub aliases: Option<PathBuf>,

    /// Program producing presence/absence tables, called as `<program> -r <run> -c <cluster>`
    #[arg(long, default_value = DEFAULT_PRESENCE_ABSENCE_COMMAND)]
    pub presence_absence_command: PathBuf,

    /// Compute presence/absence tables from the database instead of running a program
    #[arg(long)]
    pub builtin_presence_absence: bool,

    /// Locus tag to start with instead of prompting
    #[arg(long, short = 'l')]
    pub locus_tag: Option<String>,
}

impl Config {
    pub fn database_path(&self) -> Result<PathBuf, SessionError> {
        self.resolve(&self.database, &["db", "DATABASE.sqlite"], "--database")
    }

    pub fn aliases_path(&self) -> Result<PathBuf, SessionError> {
        self.resolve(&self.aliases, &["aliases", "aliases"], "--aliases")
    }

    fn resolve(
        &self,
        explicit: &Option<PathBuf>,
        under_root: &[&str],
        flag: &str,
    ) -> Result<PathBuf, SessionError> {
        if let Some(path) = explicit {
            return Ok(path.clone());
        }
        match &self.root {
            Some(root) => Ok(under_root.iter().fold(root.clone(), |p, part| p.join(part))),
            None => Err(SessionError::Config(format!(
                "no {flag} given and ITEP_ROOT is not set"
            ))),
        }
    }
}
