//! Direct HTTP downloads, streamed chunk by chunk to disk.

use std::path::Path;
use tokio::io::AsyncWriteExt;
use topic_upload::DownloadError;
use tracing::info;

use crate::format::human_readable_size;

/// GETs `url` into `dest`. Non-2xx responses fail and leave no file behind.
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), DownloadError> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Http(format!("{} for {}", status, url)));
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut written: u64 = 0;
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                let _ = tokio::fs::remove_file(dest).await;
                return Err(DownloadError::Http(e.to_string()));
            }
        };
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!(
        url = %url,
        path = %dest.display(),
        size = %human_readable_size(written),
        "HTTP download finished"
    );
    Ok(())
}
