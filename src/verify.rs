use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub const HASH_LEN: usize = 32;
pub type HashResult = [u8; HASH_LEN];

pub fn hash_bytes(bytes: &[u8]) -> HashResult {
    let mut result = [0; HASH_LEN];
    result.copy_from_slice(Sha256::digest(bytes).as_slice());
    result
}

/// Hashes a file without reading it into memory at once.
pub fn hash_file(path: &Path) -> io::Result<HashResult> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0; 4096];
    loop {
        let size = file.read(&mut buf)?;
        if size == 0 {
            break;
        }
        hasher.update(&buf[..size]);
    }
    let mut result = [0; HASH_LEN];
    result.copy_from_slice(hasher.finalize().as_slice());
    Ok(result)
}

/// How the content already at a destination compares with what we are about
/// to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    Absent,
    Same,
    Different,
}

pub fn compare_existing(path: &Path, bytes: &[u8]) -> io::Result<Existing> {
    match hash_file(path) {
        Ok(hash) if hash == hash_bytes(bytes) => Ok(Existing::Same),
        Ok(_) => Ok(Existing::Different),
        Err(ref err) if err.kind() == io::ErrorKind::NotFound => Ok(Existing::Absent),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_hash_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &content).unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(&content));
    }

    #[test]
    fn test_compare_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.pdf");
        assert_eq!(compare_existing(&path, b"%PDF").unwrap(), Existing::Absent);
        fs::write(&path, b"%PDF").unwrap();
        assert_eq!(compare_existing(&path, b"%PDF").unwrap(), Existing::Same);
        assert_eq!(compare_existing(&path, b"%PDF-2").unwrap(), Existing::Different);
    }
}
