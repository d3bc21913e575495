//! yt-dlp invocation with aria2c as the external downloader.

use std::path::{Path, PathBuf};
use topic_upload::DownloadError;
use tracing::info;

use crate::process;

pub const YT_DLP: &str = "yt-dlp";

/// Extensions yt-dlp may leave behind, in lookup order, after the bare name.
const OUTPUT_SUFFIXES: [&str; 4] = ["webm", "mkv", "mp4", "mp4.webm"];

/// Arguments for a regular (unencrypted) download of `url` capped at `quality` pixels high.
pub fn stream_args(url: &str, output_template: &Path, quality: u32) -> Vec<String> {
    vec![
        "-f".to_string(),
        format!("b[height<={q}]/bv[height<={q}]+ba/b", q = quality),
        "-o".to_string(),
        output_template.to_string_lossy().into_owned(),
        "-R".to_string(),
        "25".to_string(),
        "--fragment-retries".to_string(),
        "25".to_string(),
        "--external-downloader".to_string(),
        "aria2c".to_string(),
        "--downloader-args".to_string(),
        "aria2c: -x 16 -j 32".to_string(),
        url.to_string(),
    ]
}

/// Arguments for fetching the still-encrypted tracks of a DASH manifest.
pub fn encrypted_args(mpd_url: &str, output_template: &Path, quality: u32) -> Vec<String> {
    vec![
        "-f".to_string(),
        format!("bv[height<={}]+ba/b", quality),
        "-o".to_string(),
        output_template.to_string_lossy().into_owned(),
        "--allow-unplayable-formats".to_string(),
        "--no-check-certificate".to_string(),
        "--external-downloader".to_string(),
        "aria2c".to_string(),
        mpd_url.to_string(),
    ]
}

/// Finds the file yt-dlp produced for `stem` in `dir`.
pub async fn locate_output(dir: &Path, stem: &str) -> Option<PathBuf> {
    let bare = dir.join(stem);
    if is_file(&bare).await {
        return Some(bare);
    }
    for suffix in OUTPUT_SUFFIXES {
        let candidate = dir.join(format!("{}.{}", stem, suffix));
        if is_file(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Downloads `url` into `dir` as `<stem>.<ext>` and returns the produced file.
pub async fn download(
    url: &str,
    dir: &Path,
    stem: &str,
    quality: u32,
) -> Result<PathBuf, DownloadError> {
    let template = dir.join(format!("{}.%(ext)s", stem));
    process::run(YT_DLP, stream_args(url, &template, quality)).await?;

    let path = locate_output(dir, stem)
        .await
        .ok_or_else(|| DownloadError::MissingOutput(stem.to_string()))?;
    info!(url = %url, path = %path.display(), "yt-dlp download finished");
    Ok(path)
}
