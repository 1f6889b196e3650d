//! File hashing utilities

use blake3::Hasher;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::utils::config::HashingConsts;

/// Hash a file with blake3 and count the bytes hashed. Returns `(hex digest, size)`.
/// Uses memory-mapped I/O for files above threshold, chunked reading otherwise.
pub fn hash_file(path: &Path) -> io::Result<(String, u64)> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut hasher = Hasher::new();

    let size = if len > HashingConsts::HASH_MMAP_THRESHOLD {
        // Memory-mapped I/O for large files (Blake3 already uses SIMD internally)
        let mmap = unsafe { Mmap::map(&file)? };
        hasher.update(&mmap);
        mmap.len() as u64
    } else {
        hash_reader(file, &mut hasher)?
    };

    Ok((hasher.finalize().to_hex().to_string(), size))
}

/// Stream `reader` through `hasher` in fixed chunks; returns the byte count.
fn hash_reader<R: Read>(mut reader: R, hasher: &mut Hasher) -> io::Result<u64> {
    let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    let mut total = 0_u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
        total += n as u64;
    }
    Ok(total)
}

/// Hex digest of an in-memory buffer (same algorithm as [`hash_file`]).
pub fn hash_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
