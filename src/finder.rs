use crate::{
    checksum::{checksum_file, HashAlgorithm, DEFAULT_CHUNK_SIZE},
    error::Result,
    group::group_by_checksum,
    report::{Failure, Report},
    scan::{resolve_roots, scan, ScanOptions},
};
use std::path::Path;

/// Everything a run needs besides the root directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderConfig {
    pub scan: ScanOptions,
    pub algorithm: HashAlgorithm,
    /// Bytes read per hasher update.
    pub chunk_size: usize,
    /// Record unreadable files in the report instead of aborting on the first one.
    pub keep_going: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        FinderConfig {
            scan: ScanOptions::default(),
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            keep_going: false,
        }
    }
}

/// Scan `dirs`, checksum every file found and group the files by checksum.
///
/// Files are hashed one at a time in lexicographic order. Unless `config.keep_going` is set, the
/// first file that cannot be read aborts the run with an error naming it.
///
/// # Returns
///
/// The report for this run; nothing is kept between runs.
pub fn find_duplicates<P: AsRef<Path>>(dirs: &[P], config: &FinderConfig) -> Result<Report> {
    let roots = resolve_roots(dirs)?;
    let files: Vec<_> = scan(&roots, &config.scan).into_iter().collect();
    log::info!("found {} files under {} roots", files.len(), roots.len());

    let mut pairs = Vec::with_capacity(files.len());
    let mut failures = Vec::new();
    for path in &files {
        match checksum_file(path, config.algorithm, config.chunk_size) {
            Ok(checksum) => {
                log::debug!("{} {}", checksum, path.display());
                pairs.push((checksum, path.clone()));
            }
            Err(err) if config.keep_going => {
                log::warn!("skipping: {}", err);
                failures.push(Failure {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    let table = group_by_checksum(pairs);
    log::info!(
        "{} distinct contents among {} hashed files",
        table.len(),
        files.len() - failures.len()
    );

    Ok(Report::new(files, table, failures))
}
