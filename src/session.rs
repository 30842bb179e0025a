//src/session.rs

use crate::types::{ClusterId, GeneRecord, Memberships, RunId};

/// The gene a session is focused on, with everything discovered about it up front.
#[derive(Debug, Clone)]
pub struct FocusGene {
    pub alias: String,
    pub gene: GeneRecord,
    pub memberships: Memberships,
}

/// A run the user drilled into, paired with the focus gene's cluster in that run.
/// Only [`SessionState::select_run`] can build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSelection {
    run_id: RunId,
    cluster_id: ClusterId,
}

impl ClusterSelection {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }
}

/// Context accumulated while exploring one gene.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    focus: Option<FocusGene>,
    selection: Option<ClusterSelection>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the focus gene and drops any run selection.
    pub fn load_gene(&mut self, alias: &str, gene: GeneRecord, memberships: Memberships) {
        self.focus = Some(FocusGene {
            alias: alias.to_string(),
            gene,
            memberships,
        });
        self.selection = None;
    }

    pub fn focus(&self) -> Option<&FocusGene> {
        self.focus.as_ref()
    }

    pub fn gene(&self) -> Option<&GeneRecord> {
        self.focus.as_ref().map(|f| &f.gene)
    }

    pub fn memberships(&self) -> Option<&Memberships> {
        self.focus.as_ref().map(|f| &f.memberships)
    }

    pub fn selection(&self) -> Option<&ClusterSelection> {
        self.selection.as_ref()
    }

    /// Selects `run_id` if the focus gene has a membership in it.
    /// Returns `None` and leaves the state untouched otherwise.
    pub fn select_run(&mut self, run_id: &str) -> Option<&ClusterSelection> {
        let cluster_id = *self.memberships()?.get(run_id)?;
        self.selection = Some(ClusterSelection {
            run_id: run_id.to_string(),
            cluster_id,
        });
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_store;
    use crate::store::GeneStore;

    fn loaded() -> SessionState {
        let gene = sample_store().gene_info(&["G1".to_string()]).unwrap().remove(0);
        let mut memberships = Memberships::new();
        memberships.insert("orthomcl_I_2.0".to_string(), 7);

        let mut session = SessionState::new();
        session.load_gene("b0001", gene, memberships);
        session
    }

    #[test]
    fn test_new_session_is_empty() {
        let mut session = SessionState::new();
        assert!(session.focus().is_none());
        assert!(session.select_run("orthomcl_I_2.0").is_none());
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_select_run_requires_membership() {
        let mut session = loaded();

        assert!(session.select_run("maxbit_c_0.4").is_none());
        assert!(session.selection().is_none());

        let selected = session.select_run("orthomcl_I_2.0").unwrap();
        assert_eq!(selected.run_id(), "orthomcl_I_2.0");
        assert_eq!(selected.cluster_id(), 7);
    }

    #[test]
    fn test_clear_and_reload_drop_selection() {
        let mut session = loaded();
        session.select_run("orthomcl_I_2.0");
        session.clear_selection();
        assert!(session.selection().is_none());
        assert_eq!(session.gene().unwrap().gene_id, "G1");

        session.select_run("orthomcl_I_2.0");
        let gene = session.gene().unwrap().clone();
        session.load_gene("again", gene, Memberships::new());
        assert!(session.selection().is_none());
        assert_eq!(session.focus().unwrap().alias, "again");
    }
}
