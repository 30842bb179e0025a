//src/membership.rs

use crate::error::SessionError;
use crate::store::GeneStore;
use crate::types::Memberships;

/// Finds which clustering runs group a gene with others.
pub struct ClusterMembershipIndex<'a> {
    store: &'a dyn GeneStore,
}

impl<'a> ClusterMembershipIndex<'a> {
    pub fn new(store: &'a dyn GeneStore) -> Self {
        Self { store }
    }

    /// run id -> cluster id for every run containing `gene_id`.
    ///
    /// An empty map is a normal answer. A run that places the gene in two
    /// different clusters is a [`SessionError::Integrity`].
    pub fn memberships_for(&self, gene_id: &str) -> Result<Memberships, SessionError> {
        let found = self
            .store
            .clusters_containing_genes(&[gene_id.to_string()])?;

        let mut memberships = Memberships::new();
        for m in found {
            match memberships.get(&m.run_id) {
                Some(&existing) if existing != m.cluster_id => {
                    return Err(SessionError::Integrity(format!(
                        "gene {} is in clusters {} and {} of run {}",
                        gene_id, existing, m.cluster_id, m.run_id
                    )));
                }
                _ => {
                    memberships.insert(m.run_id, m.cluster_id);
                }
            }
        }

        log::debug!("Gene {} belongs to {} clustering runs", gene_id, memberships.len());
        Ok(memberships)
    }
}
