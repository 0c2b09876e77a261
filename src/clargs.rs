use crate::{
    checksum::HashAlgorithm,
    finder::FinderConfig,
    scan::ScanOptions,
};
use std::path::PathBuf;
use structopt::StructOpt;

fn parse_chunk_size(src: &str) -> Result<usize, String> {
    match src.parse::<usize>() {
        Ok(0) => Err("chunk size must be greater than zero".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

/// Find duplicate files by content hash.
///
/// hashdup walks the given directories, checksums every file and reports groups of files with
/// identical content. Anything under a directory whose path contains `node_modules`, `venv` or
/// `__pycache__` is skipped.
#[derive(StructOpt, Debug)]
#[structopt(name = "hashdup")]
pub struct Opt {
    /// Search subdirectories recursively.
    #[structopt(short = "r", long = "recursive")]
    pub recursive: bool,

    /// Include hidden files (names starting with a dot).
    #[structopt(short = "i", long = "include-hidden")]
    pub include_hidden: bool,

    /// Increase output verbosity; repeat for more detail.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    /// Content digest used to compare files.
    #[structopt(
        short = "a",
        long = "algorithm",
        default_value = "md5",
        possible_values = &HashAlgorithm::VARIANTS,
        case_insensitive = true
    )]
    pub algorithm: HashAlgorithm,

    /// Bytes read per hasher update.
    #[structopt(
        long = "chunk-size",
        default_value = "10240",
        parse(try_from_str = parse_chunk_size)
    )]
    pub chunk_size: usize,

    /// Skip files that cannot be read and list them at the end instead of aborting.
    #[structopt(short = "k", long = "keep-going")]
    pub keep_going: bool,

    /// Print the report as JSON.
    #[structopt(long = "json")]
    pub json: bool,

    /// Disable colored output.
    #[structopt(long = "no-color")]
    pub no_color: bool,

    /// One or more directories to search for duplicate files.
    #[structopt(parse(from_os_str), required = true, min_values = 1)]
    pub directories: Vec<PathBuf>,
}

impl Opt {
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig {
            scan: ScanOptions {
                recursive: self.recursive,
                include_hidden: self.include_hidden,
            },
            algorithm: self.algorithm,
            chunk_size: self.chunk_size,
            keep_going: self.keep_going,
        }
    }
}
