// Local file digests, computed the same way the storage service reports
// them: hex-encoded MD5 over the raw bytes.

use crate::error::{Result, StorageError};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read size used when hashing local files (1 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 20;

/// Lowercase hex MD5 of the file at `path`.
pub fn file_md5(path: &Path) -> Result<String> {
    file_md5_with_block_size(path, DEFAULT_BLOCK_SIZE)
}

/// Like [`file_md5`] with an explicit read size. The result only depends
/// on the file contents.
pub fn file_md5_with_block_size(path: &Path, block_size: usize) -> Result<String> {
    let mut file = File::open(path).map_err(|e| StorageError::not_found(path, e))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; block_size.max(1)];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StorageError::not_found(path, e)),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn known_digests() {
        let empty = fixture(b"");
        assert_eq!(file_md5(empty.path()).unwrap(), "d41d8cd98f00b204e9800998ecf8427e");

        let fox = fixture(b"The quick brown fox jumps over the lazy dog");
        assert_eq!(file_md5(fox.path()).unwrap(), "9e107d9d372bb6826bd81d3542a419d6");
    }

    #[test]
    fn block_size_does_not_change_digest() {
        let contents: Vec<u8> = (0..10_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let file = fixture(&contents);
        let expected = file_md5(file.path()).unwrap();
        for block_size in [1, 7, 64, 4096, 9_999, 10_000, 10_001, DEFAULT_BLOCK_SIZE] {
            assert_eq!(
                file_md5_with_block_size(file.path(), block_size).unwrap(),
                expected,
                "block size {block_size}"
            );
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.bin");
        match file_md5(&missing).unwrap_err() {
            StorageError::NotFound { path, .. } => assert_eq!(path, missing),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
