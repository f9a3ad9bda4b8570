// src/snapshot/hash.rs

use std::io::Read;
use std::path::Path;

use anyhow::Result;
use blake3::Hasher;

use crate::fs::FileSystem;

/// Compute the blake3 hash of one file's contents, reading through the
/// filesystem abstraction.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut reader = fs.open_read(path)?;
    let mut hasher = Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
