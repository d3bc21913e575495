//! ffprobe duration and ffmpeg thumbnail extraction. Both are best effort.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::drm::FFMPEG;
use crate::process;

pub const FFPROBE: &str = "ffprobe";

/// Offset of the frame used as the video thumbnail.
const THUMBNAIL_AT: &str = "00:00:10";

pub fn duration_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path.to_string_lossy().into_owned(),
    ]
}

/// Parses ffprobe's `12.345000` output into whole seconds.
pub fn parse_duration(stdout: &str) -> Option<u32> {
    let secs: f64 = stdout.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs as u32)
    } else {
        None
    }
}

/// Duration of a media file in whole seconds, or `None` when ffprobe cannot tell.
pub async fn duration_secs(path: &Path) -> Option<u32> {
    match process::run(FFPROBE, duration_args(path)).await {
        Ok(output) => parse_duration(&String::from_utf8_lossy(&output.stdout)),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Could not read duration");
            None
        }
    }
}

pub fn thumbnail_path(video: &Path) -> PathBuf {
    let mut name = video.as_os_str().to_owned();
    name.push(".jpg");
    PathBuf::from(name)
}

pub fn thumbnail_args(video: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-ss".to_string(),
        THUMBNAIL_AT.to_string(),
        "-i".to_string(),
        video.to_string_lossy().into_owned(),
        "-vframes".to_string(),
        "1".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Extracts one frame as `<video>.jpg`. Returns `None` for short or unreadable videos.
pub async fn thumbnail(video: &Path) -> Option<PathBuf> {
    let output = thumbnail_path(video);
    if let Err(e) = process::run(FFMPEG, thumbnail_args(video, &output)).await {
        warn!(error = %e, path = %video.display(), "Thumbnail extraction failed");
        return None;
    }
    // ffmpeg exits 0 without writing a frame when the video is shorter than the offset.
    tokio::fs::try_exists(&output)
        .await
        .unwrap_or(false)
        .then_some(output)
}
