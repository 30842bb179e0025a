//src/test_support.rs
//
// Shared fixtures for the unit tests: a small in-memory gene database,
// its alias table, and a presenter that replays scripted answers.

use std::collections::VecDeque;
use std::io::Cursor;

use rusqlite::Connection;

use crate::aliases::AliasIndex;
use crate::error::ExportError;
use crate::export::PresenceAbsenceReporter;
use crate::presenter::Presenter;
use crate::store::{GeneStore, SqliteStore};
use crate::types::ClusterId;

const SCHEMA: &str = "
CREATE TABLE processed (
    geneid TEXT, organism TEXT, organismid TEXT, contig_mod TEXT, contigid TEXT,
    start INTEGER, stop INTEGER, strand TEXT, strandnum INTEGER,
    annotation TEXT, nucseq TEXT, aaseq TEXT
);
CREATE TABLE clusters (runid TEXT, clusterid INTEGER, geneid TEXT);
";

const DATA: &str = "
INSERT INTO processed VALUES
 ('G1', 'Escherichia coli', '83333.1', 'c1', '83333.1.contig.1', 190, 255, '+', 1, 'Putative kinase', 'ATGAAACGC', 'MKR'),
 ('G2', 'Salmonella enterica', '90371.1', 'c2', '90371.1.contig.1', 10, 75, '-', -1, 'Putative kinase', 'ATGAAGCGT', 'MKR'),
 ('G3', 'Bacillus subtilis', '224308.1', 'c3', '224308.1.contig.1', 500, 565, '+', 1, 'Serine kinase', 'ATGCAACGC', 'MQR'),
 ('G4', 'Escherichia coli', '83333.1', 'c1', '83333.1.contig.1', 900, 1200, '+', 1, 'Hypothetical protein', 'ATGTTT', 'MF'),
 ('G5', 'Bacillus subtilis', '224308.1', 'c3', '224308.1.contig.2', 40, 105, '-', -1, 'Kinase family protein', 'ATGGGG', 'MG'),
 ('G6', 'Escherichia coli', '83333.1', 'c1', '83333.1.contig.1', 1, 30, '+', 1, 'Duplicated row', 'ATG', 'M'),
 ('G6', 'Escherichia coli', '83333.1', 'c1', '83333.1.contig.1', 1, 30, '+', 1, 'Duplicated row', 'ATG', 'M');
INSERT INTO clusters VALUES
 ('orthomcl_I_2.0', 7, 'G1'),
 ('orthomcl_I_2.0', 7, 'G2'),
 ('orthomcl_I_2.0', 7, 'G3'),
 ('maxbit_c_0.4', 12, 'G1'),
 ('maxbit_c_0.4', 12, 'G5'),
 ('maxbit_c_0.4', 3, 'G7'),
 ('dup_run', 1, 'G2'),
 ('dup_run', 1, 'G6');
";

/// Genes G1..G5 (G4 belongs to no cluster), a duplicated G6 clustered with G2,
/// and a clustered G7 with no descriptive record.
pub fn sample_store() -> SqliteStore {
    let conn = Connection::open_in_memory().expect("in-memory database");
    conn.execute_batch(SCHEMA).expect("schema");
    conn.execute_batch(DATA).expect("data");
    SqliteStore::from_connection(conn)
}

/// `size` genes spread over three organisms, all in cluster 1 of `big_run`.
pub fn store_with_large_cluster(size: usize) -> SqliteStore {
    let mut conn = Connection::open_in_memory().expect("in-memory database");
    conn.execute_batch(SCHEMA).expect("schema");

    let tx = conn.transaction().expect("transaction");
    {
        let mut gene = tx
            .prepare(
                "INSERT INTO processed VALUES \
                 (?1, ?2, 'org', 'c', 'ctg', 1, 3, '+', 1, 'Kinase family protein', 'ATG', 'M')",
            )
            .expect("insert gene");
        let mut member = tx
            .prepare("INSERT INTO clusters VALUES ('big_run', 1, ?1)")
            .expect("insert member");
        for i in 0..size {
            let id = format!("fig|{}.peg.{}", i % 3, i);
            gene.execute(rusqlite::params![id, format!("Organism {}", i % 3)])
                .expect("gene row");
            member.execute([&id]).expect("member row");
        }
    }
    tx.commit().expect("commit");
    SqliteStore::from_connection(conn)
}

pub fn sample_aliases() -> AliasIndex {
    let text = "G1\tb0001\nG2\tSTM0001\nG3\tBSU0001\nG4\tb0004\nG6\tdup0001\nG7\tghost0001\n";
    AliasIndex::from_reader(Cursor::new(text)).expect("alias table")
}

/// A reporter standing in for a broken external program.
pub struct FailingReporter;

impl PresenceAbsenceReporter for FailingReporter {
    fn presence_absence(
        &self,
        _store: &dyn GeneStore,
        _run_id: &str,
        _cluster_id: ClusterId,
    ) -> Result<String, ExportError> {
        Err(ExportError::EmptyOutput {
            program: "db_getPresenceAbsenceTable.py".to_string(),
        })
    }
}

/// Replays answers in order. Text prompts take the answer verbatim; menus take
/// it as the label of the choice to pick. `None` (or running out) cancels.
#[derive(Default)]
pub struct ScriptedPresenter {
    answers: VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub menus: Vec<(String, Vec<String>)>,
    pub shown: Vec<(String, String)>,
}

impl ScriptedPresenter {
    pub fn new(answers: &[Option<&str>]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.map(str::to_string)).collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn shown_text(&self) -> Vec<&str> {
        self.shown.iter().map(|(_, text)| text.as_str()).collect()
    }
}

impl Presenter for ScriptedPresenter {
    fn prompt_text(&mut self, message: &str) -> Option<String> {
        self.prompts.push(message.to_string());
        self.answers.pop_front().flatten()
    }

    fn choose(&mut self, title: &str, _message: &str, choices: &[String]) -> Option<usize> {
        self.menus.push((title.to_string(), choices.to_vec()));
        let answer = self.answers.pop_front().flatten()?;
        let idx = choices
            .iter()
            .position(|c| *c == answer)
            .unwrap_or_else(|| panic!("scripted answer {answer:?} not in menu {choices:?}"));
        Some(idx)
    }

    fn show(&mut self, title: &str, text: &str) {
        self.shown.push((title.to_string(), text.to_string()));
    }
}
