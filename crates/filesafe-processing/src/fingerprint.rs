//! Streaming content fingerprints.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Compute the lowercase hex SHA-256 digest of a file, reading it once in
/// fixed-size chunks. Memory use is constant regardless of file size.
pub async fn fingerprint_file(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        let digest = fingerprint_file(&path).await.unwrap();
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(digest.len(), 64);
    }

    #[tokio::test]
    async fn empty_file_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        tokio::fs::write(&path, b"").await.unwrap();

        assert_eq!(
            fingerprint_file(&path).await.unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn multi_chunk_matches_single_shot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data = vec![0xabu8; READ_CHUNK_SIZE * 3 + 17];
        tokio::fs::write(&path, &data).await.unwrap();

        let expected = hex::encode(Sha256::digest(&data));
        assert_eq!(fingerprint_file(&path).await.unwrap(), expected);
    }
}
