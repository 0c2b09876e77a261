use crate::{checksum::Checksum, group::GroupingTable};
use serde::{Serialize, Serializer};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Serialize `path` as a string, replacing bytes that are not valid UTF-8.
fn serialize_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// A scanned file whose checksum could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    #[serde(serialize_with = "serialize_lossy")]
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one run: what was scanned, how it grouped, and what could not be read.
#[derive(Debug, Clone, Default)]
pub struct Report {
    files: Vec<PathBuf>,
    table: GroupingTable,
    failures: Vec<Failure>,
}

impl Report {
    pub fn new(files: Vec<PathBuf>, table: GroupingTable, failures: Vec<Failure>) -> Self {
        debug_assert_eq!(
            files.len(),
            table.values().map(Vec::len).sum::<usize>() + failures.len()
        );
        Report {
            files,
            table,
            failures,
        }
    }

    /// Every scanned path, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Full grouping table, including single-member groups.
    pub fn table(&self) -> &GroupingTable {
        &self.table
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    /// Number of distinct contents among the files that were hashed.
    pub fn unique_files(&self) -> usize {
        self.table.len()
    }

    /// Number of files beyond the first in each group, i.e. copies that could be removed. This
    /// counts extra copies, not groups.
    pub fn duplicate_files(&self) -> usize {
        self.table.values().map(|paths| paths.len() - 1).sum()
    }

    /// # Returns
    ///
    /// Groups with at least two members, in checksum order.
    pub fn duplicates(&self) -> BTreeMap<&Checksum, &[PathBuf]> {
        self.table
            .iter()
            .filter(|(_, paths)| 1 < paths.len())
            .map(|(checksum, paths)| (checksum, paths.as_slice()))
            .collect()
    }
}
