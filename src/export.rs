//src/export.rs

use std::path::{Path, PathBuf};
use std::process::Command;

use ahash::{AHashMap, AHashSet};

use crate::error::{ExportError, SessionError};
use crate::store::GeneStore;
use crate::types::{ClusterId, ExportArtifact, GeneId, GeneRecord, Molecule};

/// Computes a presence/absence table for one cluster across all organisms.
pub trait PresenceAbsenceReporter {
    fn presence_absence(
        &self,
        store: &dyn GeneStore,
        run_id: &str,
        cluster_id: ClusterId,
    ) -> Result<String, ExportError>;
}

/// Runs an external program as `<program> -r <run> -c <cluster>` and returns its stdout verbatim.
#[derive(Debug, Clone)]
pub struct CommandReporter {
    program: PathBuf,
}

impl CommandReporter {
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }
}

impl PresenceAbsenceReporter for CommandReporter {
    fn presence_absence(
        &self,
        _store: &dyn GeneStore,
        run_id: &str,
        cluster_id: ClusterId,
    ) -> Result<String, ExportError> {
        let program = self.program.display().to_string();
        log::debug!("Running {} -r {} -c {}", program, run_id, cluster_id);

        let output = Command::new(&self.program)
            .arg("-r")
            .arg(run_id)
            .arg("-c")
            .arg(cluster_id.to_string())
            .output()
            .map_err(|source| ExportError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExportError::Status {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout).map_err(|_| ExportError::Encoding {
            program: program.clone(),
        })?;
        if text.trim().is_empty() {
            return Err(ExportError::EmptyOutput { program });
        }
        Ok(text)
    }
}

/// Builds the table in-process from the gene store.
///
/// ```text
/// runid  clusterid  <organism 1>  <organism 2> ...
/// <run>  <cluster>  <count 1>     <count 2> ...
/// ```
/// Counts are cluster members per organism; 0 means absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreReporter;

impl PresenceAbsenceReporter for StoreReporter {
    fn presence_absence(
        &self,
        store: &dyn GeneStore,
        run_id: &str,
        cluster_id: ClusterId,
    ) -> Result<String, ExportError> {
        let organisms = store.organisms()?;
        let members = store.genes_in_cluster(run_id, cluster_id)?;
        let records = store.gene_info(&members)?;

        let mut counts: AHashMap<&str, u32> = AHashMap::new();
        for record in &records {
            *counts.entry(record.organism.as_str()).or_insert(0) += 1;
        }

        let mut header = String::from("runid\tclusterid");
        let mut row = format!("{run_id}\t{cluster_id}");
        for organism in &organisms {
            header.push('\t');
            header.push_str(organism);
            row.push('\t');
            row.push_str(&counts.get(organism.as_str()).copied().unwrap_or(0).to_string());
        }
        Ok(format!("{header}\n{row}\n"))
    }
}

/// Produces the derived views offered by the workflow.
pub struct ExportGenerator<'a> {
    store: &'a dyn GeneStore,
    reporter: &'a dyn PresenceAbsenceReporter,
}

impl<'a> ExportGenerator<'a> {
    pub fn new(store: &'a dyn GeneStore, reporter: &'a dyn PresenceAbsenceReporter) -> Self {
        Self { store, reporter }
    }

    /// Exactly one newline-terminated FASTA record for `gene`.
    pub fn single_gene_fasta(gene: &GeneRecord, molecule: Molecule) -> ExportArtifact {
        ExportArtifact::new(
            format!("{} {} FASTA", gene.gene_id, molecule),
            gene.fasta_record(molecule),
        )
    }

    /// One FASTA record per cluster member, in the order the store returns them.
    pub fn cluster_fasta(
        &self,
        run_id: &str,
        cluster_id: ClusterId,
        molecule: Molecule,
    ) -> Result<ExportArtifact, SessionError> {
        let members = self.store.genes_in_cluster(run_id, cluster_id)?;
        if members.is_empty() {
            return Err(SessionError::Integrity(format!(
                "cluster {cluster_id} of run {run_id} has no members"
            )));
        }

        // A member listed twice still yields a single record.
        let mut seen = AHashSet::with_capacity(members.len());
        let members: Vec<GeneId> = members.into_iter().filter(|id| seen.insert(id.clone())).collect();

        let records = self.store.gene_info(&members)?;
        let mut per_gene: AHashMap<&str, usize> = AHashMap::with_capacity(members.len());
        for record in &records {
            *per_gene.entry(record.gene_id.as_str()).or_insert(0) += 1;
        }
        for id in &members {
            let found = per_gene.get(id.as_str()).copied().unwrap_or(0);
            if found != 1 {
                return Err(SessionError::Integrity(format!(
                    "expected exactly one record for gene {id} in cluster {cluster_id} of run {run_id}, found {found}"
                )));
            }
        }

        let mut text = String::new();
        for record in &records {
            text.push_str(&record.fasta_record(molecule));
        }
        log::info!(
            "Exported {} {} records for cluster {} of run {}",
            records.len(),
            molecule,
            cluster_id,
            run_id
        );
        Ok(ExportArtifact::new(
            format!("{run_id} cluster {cluster_id} {molecule} FASTA"),
            text,
        ))
    }

    pub fn presence_absence_table(
        &self,
        run_id: &str,
        cluster_id: ClusterId,
    ) -> Result<ExportArtifact, SessionError> {
        // Losing the database is fatal even when it happens inside a report.
        let text = self
            .reporter
            .presence_absence(self.store, run_id, cluster_id)
            .map_err(|err| match err {
                ExportError::Store(source) => SessionError::Store(source),
                other => SessionError::ExportFailed(other),
            })?;
        Ok(ExportArtifact::new(
            format!("{run_id} cluster {cluster_id} presence/absence"),
            text,
        ))
    }

    pub fn crude_alignment(
        &self,
        _run_id: &str,
        _cluster_id: ClusterId,
    ) -> Result<ExportArtifact, SessionError> {
        Err(SessionError::NotImplemented {
            feature: "crude amino acid alignment",
        })
    }

    pub fn crude_tree(
        &self,
        _run_id: &str,
        _cluster_id: ClusterId,
    ) -> Result<ExportArtifact, SessionError> {
        Err(SessionError::NotImplemented {
            feature: "crude Newick tree construction",
        })
    }

    pub fn display_crude_tree(
        &self,
        _run_id: &str,
        _cluster_id: ClusterId,
    ) -> Result<ExportArtifact, SessionError> {
        Err(SessionError::NotImplemented {
            feature: "crude Newick tree display",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MAX_IDS_PER_QUERY;
    use crate::test_support::{sample_store, store_with_large_cluster, FailingReporter};
    use std::collections::BTreeSet;

    /// Splits FASTA text into (header, sequence) pairs.
    fn records(text: &str) -> BTreeSet<(String, String)> {
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len() % 2, 0, "unpaired FASTA line in {text:?}");
        lines
            .chunks(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect()
    }

    #[test]
    fn test_single_gene_fasta_is_idempotent() {
        let store = sample_store();
        let gene = store.gene_info(&["G1".to_string()]).unwrap().remove(0);

        let first = ExportGenerator::single_gene_fasta(&gene, Molecule::Nucleotide);
        let second = ExportGenerator::single_gene_fasta(&gene, Molecule::Nucleotide);
        assert_eq!(first.text, ">G1 Putative kinase\nATGAAACGC\n");
        assert_eq!(first, second);

        let amino = ExportGenerator::single_gene_fasta(&gene, Molecule::AminoAcid);
        assert_eq!(amino.text, ">G1 Putative kinase\nMKR\n");
    }

    #[test]
    fn test_cluster_fasta_matches_member_records() {
        let store = sample_store();
        let exporter = ExportGenerator::new(&store, &StoreReporter);

        for molecule in [Molecule::AminoAcid, Molecule::Nucleotide] {
            let artifact = exporter.cluster_fasta("orthomcl_I_2.0", 7, molecule).unwrap();
            let expected: String = store
                .gene_info(&["G1".into(), "G2".into(), "G3".into()])
                .unwrap()
                .iter()
                .map(|g| ExportGenerator::single_gene_fasta(g, molecule).text)
                .collect();

            assert_eq!(records(&artifact.text).len(), 3);
            assert_eq!(records(&artifact.text), records(&expected));
        }
    }

    #[test]
    fn test_cluster_fasta_empty_cluster_is_integrity_error() {
        let store = sample_store();
        let exporter = ExportGenerator::new(&store, &StoreReporter);
        let err = exporter
            .cluster_fasta("orthomcl_I_2.0", 999, Molecule::AminoAcid)
            .unwrap_err();
        assert!(matches!(err, SessionError::Integrity(_)));
    }

    #[test]
    fn test_cluster_fasta_member_without_record() {
        let store = sample_store();
        let exporter = ExportGenerator::new(&store, &StoreReporter);
        let err = exporter
            .cluster_fasta("maxbit_c_0.4", 3, Molecule::Nucleotide)
            .unwrap_err();
        assert!(matches!(err, SessionError::Integrity(msg) if msg.contains("G7")));
    }

    #[test]
    fn test_cluster_fasta_duplicate_record_is_integrity_error() {
        let store = sample_store();
        let exporter = ExportGenerator::new(&store, &StoreReporter);
        let err = exporter
            .cluster_fasta("dup_run", 1, Molecule::AminoAcid)
            .unwrap_err();
        assert!(matches!(err, SessionError::Integrity(msg) if msg.contains("G6") && msg.contains("found 2")));
    }

    #[test]
    fn test_cluster_fasta_larger_than_one_query() {
        let size = MAX_IDS_PER_QUERY * 3 + 1;
        let store = store_with_large_cluster(size);
        let exporter = ExportGenerator::new(&store, &StoreReporter);

        let artifact = exporter.cluster_fasta("big_run", 1, Molecule::AminoAcid).unwrap();
        assert_eq!(records(&artifact.text).len(), size);
        assert!(artifact.text.contains(">fig|1.peg.1 Kinase family protein\nM\n"));

        let table = StoreReporter.presence_absence(&store, "big_run", 1).unwrap();
        let per_organism = size / 3;
        assert_eq!(
            table,
            format!(
                "runid\tclusterid\tOrganism 0\tOrganism 1\tOrganism 2\n\
                 big_run\t1\t{}\t{}\t{}\n",
                per_organism + 1,
                per_organism,
                per_organism
            )
        );
    }

    #[test]
    fn test_store_reporter_counts_per_organism() {
        let store = sample_store();
        let text = StoreReporter
            .presence_absence(&store, "maxbit_c_0.4", 12)
            .unwrap();
        assert_eq!(
            text,
            "runid\tclusterid\tBacillus subtilis\tEscherichia coli\tSalmonella enterica\n\
             maxbit_c_0.4\t12\t1\t1\t0\n"
        );
    }

    #[test]
    fn test_presence_absence_failure_is_reported() {
        let store = sample_store();
        let exporter = ExportGenerator::new(&store, &FailingReporter);
        let err = exporter.presence_absence_table("orthomcl_I_2.0", 7).unwrap_err();
        assert!(matches!(err, SessionError::ExportFailed(ExportError::EmptyOutput { .. })));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unimplemented_exports() {
        let store = sample_store();
        let exporter = ExportGenerator::new(&store, &StoreReporter);
        for result in [
            exporter.crude_alignment("orthomcl_I_2.0", 7),
            exporter.crude_tree("orthomcl_I_2.0", 7),
            exporter.display_crude_tree("orthomcl_I_2.0", 7),
        ] {
            assert!(matches!(result, Err(SessionError::NotImplemented { .. })));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_command_reporter_returns_stdout_verbatim() {
        let store = sample_store();
        let text = CommandReporter::new("echo")
            .presence_absence(&store, "orthomcl_I_2.0", 7)
            .unwrap();
        assert_eq!(text, "-r orthomcl_I_2.0 -c 7\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_reporter_failures() {
        let store = sample_store();

        let err = CommandReporter::new("false")
            .presence_absence(&store, "run", 1)
            .unwrap_err();
        assert!(matches!(err, ExportError::Status { .. }));

        let err = CommandReporter::new("true")
            .presence_absence(&store, "run", 1)
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyOutput { .. }));

        let err = CommandReporter::new("/nonexistent/db_getPresenceAbsenceTable.py")
            .presence_absence(&store, "run", 1)
            .unwrap_err();
        assert!(matches!(err, ExportError::Spawn { .. }));
    }
}
