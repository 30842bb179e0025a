//src/resolver.rs

use crate::aliases::AliasIndex;
use crate::error::SessionError;
use crate::store::GeneStore;
use crate::types::GeneRecord;

/// Turns a user-supplied locus tag into the gene's full record.
pub struct GeneResolver<'a> {
    aliases: &'a AliasIndex,
    store: &'a dyn GeneStore,
}

impl<'a> GeneResolver<'a> {
    pub fn new(aliases: &'a AliasIndex, store: &'a dyn GeneStore) -> Self {
        Self { aliases, store }
    }

    /// Unknown aliases are a recoverable [`SessionError::UnknownGene`]; anything but
    /// exactly one record for a known id is a fatal [`SessionError::Integrity`].
    pub fn resolve(&self, alias: &str) -> Result<GeneRecord, SessionError> {
        let gene_id = self
            .aliases
            .lookup(alias)
            .ok_or_else(|| SessionError::UnknownGene {
                alias: alias.to_string(),
            })?;

        let mut records = self.store.gene_info(&[gene_id.to_string()])?;
        if records.len() != 1 {
            return Err(SessionError::Integrity(format!(
                "expected exactly one record for gene {} (alias {}), found {}",
                gene_id,
                alias,
                records.len()
            )));
        }

        log::debug!("Resolved alias {} to gene {}", alias, gene_id);
        Ok(records.remove(0))
    }
}
