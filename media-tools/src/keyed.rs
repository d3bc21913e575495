//! Videos whose first bytes are scrambled with a per-link key.
//!
//! Such links carry the key after a trailing `*`: `https://host/lesson.mkv*9b2c41`. The file is
//! downloaded as-is and its header is XOR-ed back in place.

use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

/// Number of leading bytes that are scrambled.
pub const HEADER_LEN: usize = 28;

/// Splits `url*key` into the download URL and the key.
pub fn split_key(url: &str) -> Option<(&str, &str)> {
    let (base, key) = url.rsplit_once('*')?;
    if base.is_empty() || key.is_empty() || key.contains(['/', '?', '#']) {
        return None;
    }
    Some((base, key))
}

/// XORs the first [`HEADER_LEN`] bytes: byte `i` with key byte `i`, or with `i` once the key
/// runs out. Applying it twice restores the input.
pub fn xor_header(data: &mut [u8], key: &[u8]) {
    for (i, byte) in data.iter_mut().take(HEADER_LEN).enumerate() {
        *byte ^= key.get(i).copied().unwrap_or(i as u8);
    }
}

/// Unscrambles the header of the file at `path` in place.
pub async fn decrypt_file(path: &Path, key: &str) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .await?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    (&mut file)
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .await?;
    xor_header(&mut header, key.as_bytes());
    file.seek(SeekFrom::Start(0)).await?;
    file.write_all(&header).await?;
    file.flush().await?;
    debug!(path = %path.display(), bytes = header.len(), "Header decrypted");
    Ok(())
}
