use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Fail with `ChecksumMismatch` unless `path` hashes to `expected`.
pub fn verify(path: &Path, expected: &str) -> Result<()> {
    let actual = compute_sha256(path)?;
    let expected = normalise_hex(expected);
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ChecksumMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        })
    }
}

/// Lowercase hex SHA-256 of the file at `path`.
pub fn compute_sha256(path: &Path) -> Result<String> {
    let file = File::open(path)
        .map_err(|e| Error::artifact(format!("failed to open {}: {e}", path.display())))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
