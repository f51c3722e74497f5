//! yt-dlp and FFmpeg CLI wrappers.
//!
//! This crate provides:
//! - A process runner with per-invocation timeout, kill and output capture
//! - yt-dlp download command building behind the [`VideoDownloader`] trait
//! - FFmpeg stream-copy trimming behind the [`ClipTrimmer`] trait

pub mod command;
pub mod download;
pub mod error;
pub mod trim;

pub use command::{check_tool, FfmpegCommand, ProcessOutput, ProcessRunner};
pub use download::{VideoDownloader, YtDlp, YtDlpCommand};
pub use error::{MediaError, MediaResult};
pub use trim::{ClipTrimmer, FfmpegTrimmer, TrimRequest};
