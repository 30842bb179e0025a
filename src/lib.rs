// src/lib.rs
pub mod aliases;
pub mod config;
pub mod error;
pub mod export;
pub mod membership;
pub mod presenter;
pub mod resolver;
pub mod session;
pub mod store;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use crate::aliases::AliasIndex;
pub use crate::config::Config;
pub use crate::error::{AliasError, ExportError, SessionError, StoreError};
pub use crate::export::{CommandReporter, ExportGenerator, PresenceAbsenceReporter, StoreReporter};
pub use crate::presenter::{Presenter, TerminalPresenter};
pub use crate::store::{GeneStore, SqliteStore};
pub use crate::types::{ExportArtifact, GeneRecord, Molecule};
pub use crate::workflow::{WorkflowController, WorkflowState};

/// Everything a session needs that lives for the whole process: the database
/// connection, the alias table and the presence/absence reporter.
///
/// The connection is closed when the workspace is dropped, on every exit path.
pub struct Workspace {
    store: SqliteStore,
    aliases: Arc<AliasIndex>,
    reporter: Box<dyn PresenceAbsenceReporter>,
    initial_alias: Option<String>,
}

impl Workspace {
    /// Opens the database and loads the alias table named by `config`.
    pub fn open(config: &Config) -> Result<Self, SessionError> {
        let store = SqliteStore::open(config.database_path()?)?;
        let aliases = AliasIndex::cached(config.aliases_path()?)?;

        let reporter: Box<dyn PresenceAbsenceReporter> = if config.builtin_presence_absence {
            Box::new(StoreReporter)
        } else {
            Box::new(CommandReporter::new(&config.presence_absence_command))
        };

        Ok(Self {
            store,
            aliases,
            reporter,
            initial_alias: config.locus_tag.clone(),
        })
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    /// A controller for one gene-focused session over this workspace.
    pub fn controller<P: Presenter>(&self, presenter: P) -> WorkflowController<'_, P> {
        WorkflowController::new(&self.aliases, &self.store, self.reporter.as_ref(), presenter)
            .with_initial_alias(self.initial_alias.clone())
    }
}

/// Opens a workspace from `config` and runs one exploration session with `presenter`.
pub fn explore_gene<P: Presenter>(config: &Config, presenter: P) -> Result<(), SessionError> {
    let workspace = Workspace::open(config)?;
    let result = workspace.controller(presenter).run();
    result
}
