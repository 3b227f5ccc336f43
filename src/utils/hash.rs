// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 prfflow contributors

//! Content hashing
//!
//! Uses BLAKE3 to compare collected outputs with their sources.

use blake3::Hasher;
use std::io::Read;
use std::path::Path;

use crate::errors::PrfError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the hex digest of a file, streaming its contents
pub fn hash_file(path: &Path) -> Result<String, PrfError> {
    let read_error = |e: std::io::Error| PrfError::FileReadError {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let mut file = std::fs::File::open(path).map_err(read_error)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer).map_err(read_error)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Whether `path` exists and has the given digest
pub fn has_digest(path: &Path, digest: &str) -> bool {
    path.is_file() && hash_file(path).map(|d| d == digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_file_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, b"volume").unwrap();
        std::fs::write(&b, b"volume").unwrap();
        std::fs::write(&c, b"other").unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
        assert_ne!(hash_file(&a).unwrap(), hash_file(&c).unwrap());
    }

    #[test]
    fn test_hash_matches_blake3() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big");
        let data = vec![7u8; CHUNK_SIZE * 2 + 5];
        std::fs::write(&path, &data).unwrap();

        assert_eq!(hash_file(&path).unwrap(), blake3::hash(&data).to_hex().to_string());
    }

    #[test]
    fn test_has_digest_missing_file() {
        assert!(!has_digest(Path::new("/nonexistent/file"), "abc"));
    }
}
