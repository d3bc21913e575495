//! # media-tools
//!
//! Concrete download/upload collaborators for the topic upload workflow.
//!
//! ## Modules
//!
//! - [`downloader`] – [`MediaDownloader`]: HTTP for PDFs, key service + mp4decrypt for DRM
//!   manifests, yt-dlp/aria2c for everything else
//! - [`keyed`] – `url*key` videos with an XOR-scrambled header
//! - [`uploader`] – [`BotUploader`]: video with thumbnail and duration, document fallback
//! - [`cleanup`] – startup wipe of the work directory
//! - [`format`] – file stem sanitizing, size formatting

pub mod cleanup;
pub mod downloader;
pub mod drm;
pub mod format;
pub mod http;
pub mod keyed;
pub mod media_info;
pub mod process;
pub mod uploader;
pub mod ytdlp;

pub use cleanup::clean_work_dir;
pub use downloader::{DownloaderConfig, MediaDownloader, Source};
pub use drm::DrmKeys;
pub use format::{human_readable_size, sanitize_stem};
pub use uploader::{upload_kind, BotUploader, UploadKind};
