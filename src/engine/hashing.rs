//! Content digests for `--check-hash`.

use blake3::Hasher;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::utils::config::HashingConsts;

/// Blake3 digest of the file at `path`. `size` is the scanned size; above
/// [`HashingConsts::HASH_MMAP_THRESHOLD`] the file is mapped instead of streamed.
pub fn hash_file(path: &Path, size: u64) -> io::Result<[u8; 32]> {
    let file = File::open(path)?;
    let mut hasher = Hasher::new();
    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        // SAFETY: read-only mapping; a concurrent writer only changes the digest.
        let map = unsafe { Mmap::map(&file)? };
        hasher.update(&map);
    } else {
        hasher.update_reader(BufReader::with_capacity(
            HashingConsts::HASH_READ_CHUNK_SIZE,
            file,
        ))?;
    }
    Ok(*hasher.finalize().as_bytes())
}

/// Digests match, or neither side was hashed.
pub fn hash_equals(a: &Option<[u8; 32]>, b: &Option<[u8; 32]>) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_blake3() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("f");
        std::fs::write(&p, b"hello dirclone").unwrap();
        let got = hash_file(&p, 14).unwrap();
        assert_eq!(got, *blake3::hash(b"hello dirclone").as_bytes());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hash_file(&dir.path().join("nope"), 0).is_err());
    }
}
