//! Content digests for crate members using BLAKE3

use blake3::Hasher;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compute the content digest of a byte slice, as lowercase hex.
pub fn digest_bytes(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hex::encode(hasher.finalize().as_bytes())
}

/// Compute the content digest of a file by streaming its bytes.
///
/// The digest is a function of file content only, never of metadata,
/// timestamps, or permissions.
pub fn digest_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize().as_bytes()))
}
