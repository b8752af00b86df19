//! Streaming file hasher.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing md5, sha1 or
//! sha256 digests of file contents. Files are read in fixed-size chunks, so
//! memory use does not grow with file size.
//!
//! [`files_identical`] performs the byte-for-byte comparison used by
//! paranoid mode before a deletion.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Sha256);
//! let digest = hasher.hash_file(Path::new("Cargo.toml")).unwrap();
//! assert_eq!(digest.len(), 64);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::HashError;
use crate::error::ConfigError;
use crate::signal::CancellationToken;

/// Read buffer size for hashing and comparison (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Supported content digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (128-bit), fastest, default
    #[default]
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
    /// SHA-256 (256-bit)
    Sha256,
}

impl HashAlgorithm {
    /// All algorithms, in the order they are listed to users.
    pub const ALL: [HashAlgorithm; 3] = [Self::Md5, Self::Sha1, Self::Sha256];

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    /// Length of the hex digest this algorithm produces.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            _ => Err(ConfigError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
    cancel: Option<CancellationToken>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl Hasher {
    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            chunk_size: CHUNK_SIZE,
            cancel: None,
        }
    }

    /// Override the read chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Abort long reads when the token is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Compute the lowercase hex digest of a file's full content.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or fully read,
    /// or [`HashError::Cancelled`] if cancellation was requested mid-read.
    pub fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        match self.algorithm {
            HashAlgorithm::Md5 => self.digest_reader::<Md5, _>(path, file),
            HashAlgorithm::Sha1 => self.digest_reader::<Sha1, _>(path, file),
            HashAlgorithm::Sha256 => self.digest_reader::<Sha256, _>(path, file),
        }
    }

    /// Compute the hex digest of an in-memory buffer.
    #[must_use]
    pub fn hash_bytes(&self, data: &[u8]) -> String {
        match self.algorithm {
            HashAlgorithm::Md5 => hex_digest(&Md5::digest(data)),
            HashAlgorithm::Sha1 => hex_digest(&Sha1::digest(data)),
            HashAlgorithm::Sha256 => hex_digest(&Sha256::digest(data)),
        }
    }

    fn digest_reader<D: Digest, R: Read>(
        &self,
        path: &Path,
        mut reader: R,
    ) -> Result<String, HashError> {
        let mut digest = D::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            if self.is_cancelled() {
                return Err(HashError::Cancelled(path.to_path_buf()));
            }
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
            };
            digest.update(&buffer[..n]);
        }

        Ok(hex_digest(digest.finalize().as_slice()))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Compare two files byte for byte.
///
/// Returns `Ok(false)` as soon as a size or content difference is found.
///
/// # Errors
///
/// Returns an I/O error if either file cannot be opened or read.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let mut fa = File::open(a)?;
    let mut fb = File::open(b)?;

    if fa.metadata()?.len() != fb.metadata()?.len() {
        return Ok(false);
    }

    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let na = fill_buffer(&mut fa, &mut buf_a)?;
        let nb = fill_buffer(&mut fb, &mut buf_b)?;
        if na != nb || buf_a[..na] != buf_b[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}

/// Read until the buffer is full or EOF, returning the bytes read.
fn fill_buffer<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
