//src/workflow.rs

use std::fmt;

use crate::aliases::AliasIndex;
use crate::error::SessionError;
use crate::export::{ExportGenerator, PresenceAbsenceReporter};
use crate::membership::ClusterMembershipIndex;
use crate::presenter::Presenter;
use crate::resolver::GeneResolver;
use crate::session::{ClusterSelection, SessionState};
use crate::store::GeneStore;
use crate::types::{ExportArtifact, Molecule};

const LOCUS_TAG_PROMPT: &str = "Please enter the locus tag of the gene you wish to study.";

const NO_MEMBERSHIP_MESSAGE: &str = "The chosen gene is not found in any clustering results!";

const RUN_MENU_MESSAGE: &str = "\
Please choose one of the following sets of settings to use for the analysis.

OrthoMCL runs are useful for identifying orthologs (genes likely to share a function).

maxbit runs are useful for identifying broader gene families. c_xxx in the following
list means xxx was used as a cutoff. Higher cutoffs mean more stringent similarity to
define a family of related genes.

Note that only the runs that contain your gene are listed here.";

/// Actions offered once a gene is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopAction {
    NucleotideFasta,
    AminoAcidFasta,
    RelatedGenes,
}

impl TopAction {
    pub const ALL: [TopAction; 3] = [
        TopAction::NucleotideFasta,
        TopAction::AminoAcidFasta,
        TopAction::RelatedGenes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TopAction::NucleotideFasta => "Nucleotide FASTA",
            TopAction::AminoAcidFasta => "Amino acid FASTA",
            TopAction::RelatedGenes => "Related genes in other organisms",
        }
    }
}

/// Actions scoped to the cluster of the selected run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterAction {
    AminoAcidFasta,
    NucleotideFasta,
    CrudeAlignment,
    CrudeTree,
    DisplayTree,
    PresenceAbsence,
}

impl ClusterAction {
    pub const ALL: [ClusterAction; 6] = [
        ClusterAction::AminoAcidFasta,
        ClusterAction::NucleotideFasta,
        ClusterAction::CrudeAlignment,
        ClusterAction::CrudeTree,
        ClusterAction::DisplayTree,
        ClusterAction::PresenceAbsence,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClusterAction::AminoAcidFasta => "Make amino acid FASTA file",
            ClusterAction::NucleotideFasta => "Make nucleotide FASTA file",
            ClusterAction::CrudeAlignment => "Make a crude AA alignment",
            ClusterAction::CrudeTree => "Make a crude Newick tree from AA alignment",
            ClusterAction::DisplayTree => "Display a crude Newick tree from AA alignment",
            ClusterAction::PresenceAbsence => "Get a presence and absence table",
        }
    }
}

/// Where the controller is in the exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    GeneSelected,
    TopChoice,
    RelatedGenesRunSelected,
    /// A cluster action was picked and runs on the next step.
    ClusterAction(ClusterAction),
    Ended,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::ClusterAction(action) => write!(f, "ClusterAction({action:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

fn labels<T: Copy>(actions: &[T], label: fn(T) -> &'static str) -> Vec<String> {
    actions.iter().map(|&a| label(a).to_string()).collect()
}

/// Drives one gene-focused exploration: gene selection, top-level exports and
/// the related-genes drill-down.
pub struct WorkflowController<'a, P: Presenter> {
    aliases: &'a AliasIndex,
    store: &'a dyn GeneStore,
    reporter: &'a dyn PresenceAbsenceReporter,
    presenter: P,
    session: SessionState,
    state: WorkflowState,
    initial_alias: Option<String>,
}

impl<'a, P: Presenter> WorkflowController<'a, P> {
    pub fn new(
        aliases: &'a AliasIndex,
        store: &'a dyn GeneStore,
        reporter: &'a dyn PresenceAbsenceReporter,
        presenter: P,
    ) -> Self {
        Self {
            aliases,
            store,
            reporter,
            presenter,
            session: SessionState::new(),
            state: WorkflowState::Start,
            initial_alias: None,
        }
    }

    /// Answer the first locus-tag prompt with `alias` instead of asking.
    pub fn with_initial_alias(mut self, alias: Option<String>) -> Self {
        self.initial_alias = alias;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Runs until the user cancels at a point with nothing to go back to (`Ok`)
    /// or a fatal error occurs (diagnostic shown, `Err`).
    pub fn run(&mut self) -> Result<(), SessionError> {
        loop {
            match self.step() {
                Ok(WorkflowState::Ended) => return Ok(()),
                Ok(_) => {}
                Err(SessionError::UserCancelled) => {
                    log::info!("User cancelled in state {}; ending session", self.state);
                    self.state = WorkflowState::Ended;
                    return Ok(());
                }
                Err(err) => {
                    log::error!("Fatal error in state {}: {}", self.state, err);
                    self.state = WorkflowState::Ended;
                    self.presenter.show(
                        "Error",
                        &format!(
                            "The program encountered the following error:\n\n{err}\n\n\
                             The program will now terminate."
                        ),
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Performs exactly one transition. Recoverable errors are shown and the
    /// current menu is re-entered; everything else is returned.
    pub fn step(&mut self) -> Result<WorkflowState, SessionError> {
        let next = match self.state {
            WorkflowState::Start => {
                let attempt = self.select_gene();
                self.recover(attempt, WorkflowState::Start)?
            }
            WorkflowState::GeneSelected => WorkflowState::TopChoice,
            WorkflowState::TopChoice => {
                let attempt = self.top_choice();
                self.recover(attempt, WorkflowState::TopChoice)?
            }
            WorkflowState::RelatedGenesRunSelected => self.cluster_menu()?,
            WorkflowState::ClusterAction(action) => {
                let attempt = self.run_cluster_action(action);
                self.recover(attempt, WorkflowState::RelatedGenesRunSelected)?
            }
            WorkflowState::Ended => WorkflowState::Ended,
        };

        if next != self.state {
            log::debug!("Workflow {} -> {}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    fn recover(
        &mut self,
        attempt: Result<WorkflowState, SessionError>,
        stay: WorkflowState,
    ) -> Result<WorkflowState, SessionError> {
        match attempt {
            Err(err) if err.is_recoverable() => {
                log::warn!("{err}");
                let title = match err {
                    SessionError::NotImplemented { .. } => "Feature not available",
                    _ => "Error",
                };
                self.presenter.show(title, &err.to_string());
                Ok(stay)
            }
            other => other,
        }
    }

    // Start -> GeneSelected
    fn select_gene(&mut self) -> Result<WorkflowState, SessionError> {
        let answer = match self.initial_alias.take() {
            Some(alias) => alias,
            None => self
                .presenter
                .prompt_text(LOCUS_TAG_PROMPT)
                .ok_or(SessionError::UserCancelled)?,
        };
        let alias = answer.trim();
        if alias.is_empty() {
            self.presenter.show("Error", "Please enter a locus tag.");
            return Ok(WorkflowState::Start);
        }

        let gene = GeneResolver::new(self.aliases, self.store).resolve(alias)?;
        let memberships = ClusterMembershipIndex::new(self.store).memberships_for(&gene.gene_id)?;
        log::info!(
            "Selected gene {} ({}) with {} clustering runs",
            gene.gene_id,
            alias,
            memberships.len()
        );
        self.session.load_gene(alias, gene, memberships);
        Ok(WorkflowState::GeneSelected)
    }

    // TopChoice -> TopChoice | RelatedGenesRunSelected
    fn top_choice(&mut self) -> Result<WorkflowState, SessionError> {
        let focus = self
            .session
            .focus()
            .ok_or(SessionError::OutOfOrder("top choice"))?;
        let message = focus.gene.describe(&focus.alias);

        let picked = self
            .presenter
            .choose(
                "Select an analysis",
                &message,
                &labels(&TopAction::ALL, TopAction::label),
            )
            .ok_or(SessionError::UserCancelled)?;

        let action = TopAction::ALL
            .get(picked)
            .copied()
            .ok_or(SessionError::OutOfOrder("top choice"))?;
        match action {
            TopAction::NucleotideFasta => self.show_gene_fasta(Molecule::Nucleotide),
            TopAction::AminoAcidFasta => self.show_gene_fasta(Molecule::AminoAcid),
            TopAction::RelatedGenes => self.choose_run(),
        }
    }

    fn show_gene_fasta(&mut self, molecule: Molecule) -> Result<WorkflowState, SessionError> {
        let gene = self
            .session
            .gene()
            .ok_or(SessionError::OutOfOrder("gene FASTA"))?;
        let artifact = ExportGenerator::single_gene_fasta(gene, molecule);
        self.display(artifact);
        Ok(WorkflowState::TopChoice)
    }

    fn choose_run(&mut self) -> Result<WorkflowState, SessionError> {
        let runs: Vec<String> = self
            .session
            .memberships()
            .ok_or(SessionError::OutOfOrder("related genes"))?
            .keys()
            .cloned()
            .collect();

        if runs.is_empty() {
            self.presenter.show("Related genes", NO_MEMBERSHIP_MESSAGE);
            return Ok(WorkflowState::TopChoice);
        }

        let Some(picked) = self
            .presenter
            .choose("Select a cluster run", RUN_MENU_MESSAGE, &runs)
        else {
            return Ok(WorkflowState::TopChoice);
        };

        let run = runs
            .get(picked)
            .ok_or(SessionError::OutOfOrder("run selection"))?;
        match self.session.select_run(run) {
            Some(selection) => {
                log::info!(
                    "Selected run {} (cluster {})",
                    selection.run_id(),
                    selection.cluster_id()
                );
                Ok(WorkflowState::RelatedGenesRunSelected)
            }
            None => Err(SessionError::OutOfOrder("run selection")),
        }
    }

    // RelatedGenesRunSelected -> ClusterAction | TopChoice
    fn cluster_menu(&mut self) -> Result<WorkflowState, SessionError> {
        let picked = self.presenter.choose(
            "Choose an analysis",
            "What do you want to do with it?",
            &labels(&ClusterAction::ALL, ClusterAction::label),
        );
        match picked {
            Some(idx) => ClusterAction::ALL
                .get(idx)
                .copied()
                .map(WorkflowState::ClusterAction)
                .ok_or(SessionError::OutOfOrder("cluster menu")),
            None => {
                self.session.clear_selection();
                Ok(WorkflowState::TopChoice)
            }
        }
    }

    // ClusterAction -> RelatedGenesRunSelected
    fn run_cluster_action(&mut self, action: ClusterAction) -> Result<WorkflowState, SessionError> {
        let selection = self
            .session
            .selection()
            .cloned()
            .ok_or(SessionError::OutOfOrder("cluster action"))?;
        let artifact = self.dispatch(action, &selection)?;
        self.display(artifact);
        Ok(WorkflowState::RelatedGenesRunSelected)
    }

    fn dispatch(
        &self,
        action: ClusterAction,
        selection: &ClusterSelection,
    ) -> Result<ExportArtifact, SessionError> {
        let exporter = ExportGenerator::new(self.store, self.reporter);
        let (run_id, cluster_id) = (selection.run_id(), selection.cluster_id());
        match action {
            ClusterAction::AminoAcidFasta => {
                exporter.cluster_fasta(run_id, cluster_id, Molecule::AminoAcid)
            }
            ClusterAction::NucleotideFasta => {
                exporter.cluster_fasta(run_id, cluster_id, Molecule::Nucleotide)
            }
            ClusterAction::CrudeAlignment => exporter.crude_alignment(run_id, cluster_id),
            ClusterAction::CrudeTree => exporter.crude_tree(run_id, cluster_id),
            ClusterAction::DisplayTree => exporter.display_crude_tree(run_id, cluster_id),
            ClusterAction::PresenceAbsence => exporter.presence_absence_table(run_id, cluster_id),
        }
    }

    fn display(&mut self, artifact: ExportArtifact) {
        self.presenter.show(&artifact.label, &artifact.text);
    }
}
