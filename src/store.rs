//src/store.rs

use std::path::Path;

use rusqlite::{params_from_iter, Connection, OpenFlags, Row};

use crate::error::StoreError;
use crate::types::{ClusterId, ClusterMembership, GeneId, GeneRecord};

/// Read-only queries the exploration workflow needs from the gene database.
pub trait GeneStore {
    /// Descriptive records for every id found. Missing ids are simply absent from the result.
    fn gene_info(&self, ids: &[GeneId]) -> Result<Vec<GeneRecord>, StoreError>;

    /// Every (run, cluster) pair containing any of the given genes.
    fn clusters_containing_genes(&self, ids: &[GeneId])
        -> Result<Vec<ClusterMembership>, StoreError>;

    /// Members of one cluster, in whatever order the store returns them.
    fn genes_in_cluster(&self, run_id: &str, cluster_id: ClusterId)
        -> Result<Vec<GeneId>, StoreError>;

    /// Distinct organism names represented in the dataset, sorted.
    fn organisms(&self) -> Result<Vec<String>, StoreError>;
}

/// Column order shared by every gene query.
const GENE_COLUMNS: &str =
    "geneid, organism, organismid, contigid, start, stop, strand, annotation, nucseq, aaseq";

/// Ids bound per `IN (...)` query; SQLite rejects statements with too many variables.
pub const MAX_IDS_PER_QUERY: usize = 900;

/// SQLite-backed store. The connection is opened once and closed on drop.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens an existing database read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Opened gene database {}", path.display());
        Ok(Self { conn })
    }

    /// Wraps an already-open connection (used for in-memory databases).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn row_to_gene(row: &Row<'_>) -> rusqlite::Result<GeneRecord> {
        Ok(GeneRecord {
            gene_id: row.get(0)?,
            organism: row.get(1)?,
            organism_id: row.get(2)?,
            contig_id: row.get(3)?,
            start: row.get(4)?,
            stop: row.get(5)?,
            strand: row.get(6)?,
            annotation: row.get(7)?,
            nucleotide: row.get(8)?,
            amino_acid: row.get(9)?,
        })
    }
}

/// `?, ?, ?` for an `IN (...)` clause with `n` bound values.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl GeneStore for SqliteStore {
    fn gene_info(&self, ids: &[GeneId]) -> Result<Vec<GeneRecord>, StoreError> {
        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = format!(
                "SELECT {GENE_COLUMNS} FROM processed WHERE geneid IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), Self::row_to_gene)?;
            for row in rows {
                records.push(row?);
            }
        }
        Ok(records)
    }

    fn clusters_containing_genes(
        &self,
        ids: &[GeneId],
    ) -> Result<Vec<ClusterMembership>, StoreError> {
        let mut memberships = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = format!(
                "SELECT runid, clusterid FROM clusters WHERE geneid IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok(ClusterMembership {
                    run_id: row.get(0)?,
                    cluster_id: row.get(1)?,
                })
            })?;
            for row in rows {
                memberships.push(row?);
            }
        }
        Ok(memberships)
    }

    fn genes_in_cluster(
        &self,
        run_id: &str,
        cluster_id: ClusterId,
    ) -> Result<Vec<GeneId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT geneid FROM clusters WHERE runid = ?1 AND clusterid = ?2")?;
        let genes = stmt
            .query_map(rusqlite::params![run_id, cluster_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(genes)
    }

    fn organisms(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT organism FROM processed ORDER BY organism")?;
        let organisms = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(organisms)
    }
}
