//src/aliases.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use flate2::read::MultiGzDecoder;
use parking_lot::Mutex;

use crate::error::AliasError;
use crate::types::GeneId;

/// Process-wide cache of alias tables, keyed by the path they were loaded from.
static ALIAS_CACHE: Mutex<Vec<(PathBuf, Arc<AliasIndex>)>> = parking_lot::const_mutex(Vec::new());

/// In-memory map from user-facing locus tags to canonical gene ids.
#[derive(Debug, Default, Clone)]
pub struct AliasIndex {
    alias_to_gene: AHashMap<String, GeneId>,
    /// Number of aliases that were re-mapped to a different gene while loading.
    collisions: usize,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an alias table in the format:
    /// ```text
    /// <geneid>\t<alias>
    /// ```
    /// Trailing `\r`/`\n` are stripped. Lines with fewer than two fields are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut index = Self::new();

        for (line_no, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim_end_matches(&['\r', '\n'][..]);
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split('\t');
            let (gene_id, alias) = match (parts.next(), parts.next()) {
                (Some(gene_id), Some(alias)) if !gene_id.is_empty() && !alias.is_empty() => {
                    (gene_id, alias)
                }
                _ => {
                    log::warn!("Skipping malformed alias line {}: {:?}", line_no + 1, line);
                    continue;
                }
            };

            index.insert(alias, gene_id);
        }

        Ok(index)
    }

    /// Reads an alias table from disk; files ending in `.gz` are decompressed on the fly.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AliasError> {
        let path = path.as_ref();
        let io_err = |source: io::Error| AliasError::Io {
            path: path.to_path_buf(),
            source,
        };

        let f = File::open(path).map_err(io_err)?;
        let is_gz = path
            .extension()
            .map(|ext| ext == "gz")
            .unwrap_or(false);

        let reader: Box<dyn BufRead> = if is_gz {
            Box::new(BufReader::new(MultiGzDecoder::new(f)))
        } else {
            Box::new(BufReader::new(f))
        };

        let index = Self::from_reader(reader).map_err(io_err)?;
        log::info!(
            "Loaded {} aliases from {} ({} collisions)",
            index.len(),
            path.display(),
            index.collisions
        );
        Ok(index)
    }

    /// Same as [`AliasIndex::load`], but each path is only read once per process.
    pub fn cached<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, AliasError> {
        let path = path.as_ref();
        let mut cache = ALIAS_CACHE.lock();
        if let Some((_, index)) = cache.iter().find(|(p, _)| p == path) {
            log::debug!("Alias table {} served from cache", path.display());
            return Ok(Arc::clone(index));
        }

        let index = Arc::new(Self::load(path)?);
        cache.push((path.to_path_buf(), Arc::clone(&index)));
        Ok(index)
    }

    /// Adds one mapping. The last mapping seen for an alias wins.
    pub fn insert(&mut self, alias: &str, gene_id: &str) {
        if let Some(previous) = self
            .alias_to_gene
            .insert(alias.to_string(), gene_id.to_string())
        {
            if previous != gene_id {
                log::warn!(
                    "Alias {} maps to both {} and {}; keeping {}",
                    alias,
                    previous,
                    gene_id,
                    gene_id
                );
                self.collisions += 1;
            }
        }
    }

    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.alias_to_gene.get(alias).map(String::as_str)
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.alias_to_gene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alias_to_gene.is_empty()
    }
}
