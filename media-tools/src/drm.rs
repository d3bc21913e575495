//! Encrypted DASH downloads: key lookup, yt-dlp fetch, mp4decrypt, ffmpeg merge.
//!
//! The key service is queried with the manifest URL appended (percent-encoded) to its base URL
//! and answers with the playable manifest URL and the `kid:key` pairs.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use topic_upload::DownloadError;
use tracing::{info, instrument, warn};

use crate::process;
use crate::ytdlp;

pub const MP4DECRYPT: &str = "mp4decrypt";
pub const FFMPEG: &str = "ffmpeg";

/// RFC 3986 unreserved characters stay as they are.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyField {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    #[serde(alias = "MPD", alias = "mpd_url", alias = "url")]
    mpd: Option<String>,
    #[serde(alias = "KEYS")]
    keys: Option<KeyField>,
}

/// Manifest URL and decryption keys for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmKeys {
    pub mpd_url: String,
    /// `kid:key` pairs.
    pub keys: Vec<String>,
}

impl DrmKeys {
    /// mp4decrypt arguments: one `--key kid:key` pair per key.
    pub fn key_args(&self) -> Vec<String> {
        self.keys
            .iter()
            .flat_map(|k| ["--key".to_string(), k.clone()])
            .collect()
    }
}

/// Parses a key service response. Keys may be a list or one string, with or without `--key`.
pub fn parse_keys(body: &str, requested_mpd: &str) -> Result<DrmKeys, DownloadError> {
    let response: KeyResponse =
        serde_json::from_str(body).map_err(|e| DownloadError::Keys(e.to_string()))?;

    let raw: Vec<String> = match response.keys {
        Some(KeyField::List(list)) => list,
        Some(KeyField::Text(text)) => vec![text],
        None => Vec::new(),
    };
    let keys: Vec<String> = raw
        .iter()
        .flat_map(|s| s.split_whitespace())
        .filter(|token| *token != "--key")
        .filter(|token| token.contains(':'))
        .map(str::to_string)
        .collect();
    if keys.is_empty() {
        return Err(DownloadError::Keys("response carried no keys".to_string()));
    }

    Ok(DrmKeys {
        mpd_url: response
            .mpd
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| requested_mpd.to_string()),
        keys,
    })
}

/// Key service request: the manifest URL, percent-encoded, appended to the service base.
pub fn key_request_url(api_base: &str, mpd_url: &str) -> String {
    format!("{}{}", api_base, utf8_percent_encode(mpd_url, COMPONENT))
}

pub async fn fetch_keys(
    client: &reqwest::Client,
    api_base: &str,
    mpd_url: &str,
) -> Result<DrmKeys, DownloadError> {
    let request_url = key_request_url(api_base, mpd_url);
    let response = client
        .get(&request_url)
        .send()
        .await
        .map_err(|e| DownloadError::Keys(e.to_string()))?;
    if !response.status().is_success() {
        return Err(DownloadError::Keys(format!(
            "key service answered {}",
            response.status()
        )));
    }
    let body = response
        .text()
        .await
        .map_err(|e| DownloadError::Keys(e.to_string()))?;
    parse_keys(&body, mpd_url)
}

/// Downloads, decrypts and merges the asset into `<dir>/<stem>.mp4`.
#[instrument(skip(keys), fields(mpd_url = %keys.mpd_url))]
pub async fn download(
    keys: &DrmKeys,
    dir: &Path,
    stem: &str,
    quality: u32,
) -> Result<PathBuf, DownloadError> {
    let scratch = dir.join(format!("{}.parts", stem));
    tokio::fs::create_dir_all(&scratch).await?;

    let result = fetch_decrypt_merge(keys, &scratch, dir, stem, quality).await;
    if let Err(e) = tokio::fs::remove_dir_all(&scratch).await {
        warn!(error = %e, path = %scratch.display(), "Failed to remove DRM scratch directory");
    }
    result
}

async fn fetch_decrypt_merge(
    keys: &DrmKeys,
    scratch: &Path,
    dir: &Path,
    stem: &str,
    quality: u32,
) -> Result<PathBuf, DownloadError> {
    process::run(
        ytdlp::YT_DLP,
        ytdlp::encrypted_args(&keys.mpd_url, &scratch.join("file.%(ext)s"), quality),
    )
    .await?;

    let (video_in, audio_in) = encrypted_tracks(scratch).await?;
    let video = scratch.join("video.mp4");
    let audio = scratch.join("audio.m4a");
    decrypt(keys, &video_in, &video).await?;
    decrypt(keys, &audio_in, &audio).await?;

    let merged = dir.join(format!("{}.mp4", stem));
    process::run(FFMPEG, merge_args(&video, &audio, &merged)).await?;
    if !tokio::fs::try_exists(&merged).await.unwrap_or(false) {
        return Err(DownloadError::MissingOutput(merged.display().to_string()));
    }
    info!(path = %merged.display(), "Decrypted and merged");
    Ok(merged)
}

/// The first `.mp4` and `.m4a` yt-dlp wrote into `scratch`.
async fn encrypted_tracks(scratch: &Path) -> Result<(PathBuf, PathBuf), DownloadError> {
    let mut video = None;
    let mut audio = None;
    let mut dir = tokio::fs::read_dir(scratch).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some("mp4") if video.is_none() => video = Some(path),
            Some("m4a") if audio.is_none() => audio = Some(path),
            _ => {}
        }
    }
    match (video, audio) {
        (Some(v), Some(a)) => Ok((v, a)),
        _ => Err(DownloadError::MissingOutput(
            "encrypted video or audio track".to_string(),
        )),
    }
}

async fn decrypt(keys: &DrmKeys, input: &Path, output: &Path) -> Result<(), DownloadError> {
    let mut args = keys.key_args();
    args.push(input.to_string_lossy().into_owned());
    args.push(output.to_string_lossy().into_owned());
    process::run(MP4DECRYPT, args).await?;
    if !tokio::fs::try_exists(output).await.unwrap_or(false) {
        return Err(DownloadError::MissingOutput(output.display().to_string()));
    }
    Ok(())
}

pub fn merge_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().into_owned(),
        "-i".to_string(),
        audio.to_string_lossy().into_owned(),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}
