//! Upload workflow config: work directory, video quality, DRM key service, pacing.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// DOWNLOAD_DIR: manifests and media are written here
    pub download_dir: PathBuf,
    /// VIDEO_QUALITY: maximum video height requested from yt-dlp
    pub video_quality: u32,
    /// DRM_KEY_API: base URL of the key service for `.mpd` links
    pub drm_key_api: Option<String>,
    /// ENTRY_DELAY_MS
    pub entry_delay_ms: u64,
    /// CLEANUP_ON_START: wipe the download directory at startup
    pub cleanup_on_start: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            video_quality: 720,
            drm_key_api: None,
            entry_delay_ms: 1000,
            cleanup_on_start: true,
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let video_quality = match env::var("VIDEO_QUALITY") {
            Ok(v) => v
                .trim()
                .trim_end_matches('p')
                .parse()
                .with_context(|| format!("VIDEO_QUALITY is not a number: {}", v))?,
            Err(_) => defaults.video_quality,
        };
        let entry_delay_ms = match env::var("ENTRY_DELAY_MS") {
            Ok(v) => v
                .trim()
                .parse()
                .with_context(|| format!("ENTRY_DELAY_MS is not a number: {}", v))?,
            Err(_) => defaults.entry_delay_ms,
        };
        let cleanup_on_start = match env::var("CLEANUP_ON_START") {
            Ok(v) => parse_bool(&v)
                .with_context(|| format!("CLEANUP_ON_START is not a boolean: {}", v))?,
            Err(_) => defaults.cleanup_on_start,
        };

        Ok(Self {
            download_dir: env::var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            video_quality,
            drm_key_api: env::var("DRM_KEY_API").ok().filter(|s| !s.trim().is_empty()),
            entry_delay_ms,
            cleanup_on_start,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.video_quality == 0 {
            anyhow::bail!("VIDEO_QUALITY must be positive");
        }
        if self.download_dir.as_os_str().is_empty() {
            anyhow::bail!("DOWNLOAD_DIR is empty");
        }
        if let Some(ref api) = self.drm_key_api {
            if reqwest::Url::parse(api).is_err() {
                anyhow::bail!("DRM_KEY_API is set but not a valid URL: {}", api);
            }
        }
        Ok(())
    }

    pub fn entry_delay(&self) -> Duration {
        Duration::from_millis(self.entry_delay_ms)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
