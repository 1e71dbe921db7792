use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha512};

/// Block size used when streaming a file into the hasher (§6).
const BLOCK_SIZE: usize = 2 * 1024 * 1024;

/// SHA-512 over the full contents of `path`, read in 2 MiB blocks, rendered
/// as a 128-character lowercase hex digest.
///
/// Deliberate deviation from the original implementation this is distilled
/// from (which hashed with SHA3-512): the specification's external-interface
/// text calls for SHA-512 and that's what's implemented here, documented in
/// DESIGN.md rather than silently "fixed".
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha512::new();
    let mut buf = vec![0u8; BLOCK_SIZE];

    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(hex_lower(&hasher.finalize()))
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02x}").expect("writing to a String cannot fail");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_identical_content_identically() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"hello").unwrap();
        std::fs::write(&b, b"hello").unwrap();

        let ha = hash_file(&a).unwrap();
        let hb = hash_file(&b).unwrap();

        assert_eq!(ha, hb);
        assert_eq!(ha.len(), 128);
        assert!(ha.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hashes_differing_content_differently() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, b"hello").unwrap();
        std::fs::write(&b, b"world").unwrap();

        assert_ne!(hash_file(&a).unwrap(), hash_file(&b).unwrap());
    }

    #[test]
    fn hashes_content_spanning_multiple_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data = vec![0xab_u8; BLOCK_SIZE + 17];
        std::fs::write(&path, &data).unwrap();

        let digest = hash_file(&path).unwrap();
        assert_eq!(digest.len(), 128);
    }
}
