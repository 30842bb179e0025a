//src/types.rs

use std::collections::BTreeMap;
use std::fmt;

/// Canonical gene identifier as stored in the `processed` table (e.g. `fig|83333.1.peg.4`).
pub type GeneId = String;

/// Identifier of one clustering run (e.g. `all_I_2.0_c_0.4_m_maxbit`).
pub type RunId = String;

/// Cluster number assigned within a single clustering run.
pub type ClusterId = i64;

/// run id -> cluster id for one gene. Run ids are unique keys.
pub type Memberships = BTreeMap<RunId, ClusterId>;

/// Which sequence of a gene an export should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Molecule {
    Nucleotide,
    AminoAcid,
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Molecule::Nucleotide => write!(f, "nucleotide"),
            Molecule::AminoAcid => write!(f, "amino acid"),
        }
    }
}

/// The full descriptive record of one gene.
/// Immutable once fetched from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    pub gene_id: GeneId,
    pub organism: String,
    pub organism_id: String,
    pub contig_id: String,
    pub start: i64,
    pub stop: i64,
    pub strand: String,
    pub annotation: String,
    pub nucleotide: String,
    pub amino_acid: String,
}

impl GeneRecord {
    /// The sequence for the requested molecule type.
    pub fn sequence(&self, molecule: Molecule) -> &str {
        match molecule {
            Molecule::Nucleotide => &self.nucleotide,
            Molecule::AminoAcid => &self.amino_acid,
        }
    }

    /// One FASTA record: `>{gene_id} {annotation}\n{sequence}\n`.
    pub fn fasta_record(&self, molecule: Molecule) -> String {
        format!(
            ">{} {}\n{}\n",
            self.gene_id,
            self.annotation,
            self.sequence(molecule)
        )
    }

    /// Human-readable summary shown above the top-level menu.
    pub fn describe(&self, alias: &str) -> String {
        format!(
            "You selected {alias}. Here is some basic information about this gene.\n\n\
             ITEP gene ID: {}\n\
             Organism: {}\n\
             Organism ID: {}\n\
             Contig ID: {}\n\
             Start location: {}\n\
             Stop location: {}\n\
             Strand: {}\n\
             Annotated Function: {}\n\n\
             What do you want to know about this gene?",
            self.gene_id,
            self.organism,
            self.organism_id,
            self.contig_id,
            self.start,
            self.stop,
            self.strand,
            self.annotation,
        )
    }
}

/// One (run, cluster) pair a gene belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterMembership {
    pub run_id: RunId,
    pub cluster_id: ClusterId,
}

/// A derived text payload handed to the presentation layer and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub label: String,
    pub text: String,
}

impl ExportArtifact {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}
