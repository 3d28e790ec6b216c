//! Content fingerprints using blake3.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash an in-memory buffer.
    #[cfg(test)]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Lowercase hex, the form stored in snapshots.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars are enough for log lines
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Stream the whole file through blake3.
pub fn fingerprint_file(path: &Path) -> io::Result<Fingerprint> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(Fingerprint::new(*hasher.finalize().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_matches_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.png");
        let content = vec![7u8; 200_000];
        std::fs::write(&path, &content).unwrap();

        let from_file = fingerprint_file(&path).unwrap();
        assert_eq!(from_file, Fingerprint::of_bytes(&content));
        assert_eq!(from_file.to_hex().len(), 64);
        assert_eq!(from_file.to_string().len(), 16);
    }

    #[test]
    fn test_content_sensitivity() {
        assert_ne!(Fingerprint::of_bytes(b"a"), Fingerprint::of_bytes(b"b"));
    }

    #[test]
    fn test_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(fingerprint_file(&dir.path().join("nope")).is_err());
    }
}
