use crate::error::{Error, Result};
use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::{
    fmt,
    fs::File,
    io::{self, Read},
    path::Path,
    str::FromStr,
};

/// Number of bytes read from a file per hasher update.
pub const DEFAULT_CHUNK_SIZE: usize = 10240;

/// Content digest used to decide whether two files are duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl HashAlgorithm {
    pub const VARIANTS: [&'static str; 2] = ["md5", "sha256"];

    /// # Returns
    ///
    /// Width of the hex representation of a checksum produced by `self`.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha256 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => write!(f, "md5"),
            HashAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!(
                "unknown hash algorithm `{}`, expected one of: {}",
                other,
                Self::VARIANTS.join(", ")
            )),
        }
    }
}

/// Lowercase hex digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Checksum(pub(crate) String);

impl Checksum {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Feed `reader` into a fresh `D` hasher `chunk_size` bytes at a time.
///
/// # Returns
///
/// The finalized digest as lowercase hex.
fn hash_reader<D: Digest>(mut reader: impl Read, chunk_size: usize) -> io::Result<String> {
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut hasher = D::new();

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break Ok(to_hex(&hasher.finalize())),
            Ok(size) => hasher.update(&buffer[..size]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => break Err(err),
        }
    }
}

/// # Returns
///
/// `algorithm` checksum of the contents of the file whose filepath is `path`. The file is read
/// sequentially, so memory use stays at one chunk regardless of file size.
pub fn checksum_file(path: &Path, algorithm: HashAlgorithm, chunk_size: usize) -> Result<Checksum> {
    let read_error = |source| Error::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let hex = match algorithm {
        HashAlgorithm::Md5 => hash_reader::<Md5>(file, chunk_size),
        HashAlgorithm::Sha256 => hash_reader::<Sha256>(file, chunk_size),
    }
    .map_err(read_error)?;

    debug_assert_eq!(algorithm.hex_len(), hex.len());
    Ok(Checksum(hex))
}
