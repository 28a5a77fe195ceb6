#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for thumbnail extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A blocking runner that always reaps the FFmpeg child process
//! - First-frame extraction into a self-deleting temporary JPEG
//! - A typed outcome that separates "no thumbnail available" from real failures

pub mod command;
pub mod error;
pub mod thumbnail;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use thumbnail::{
    extract_frame, FrameExtractor, FrameOutcome, ThumbnailArtifact, ThumbnailUnavailable,
    THUMBNAIL_PREFIX, THUMBNAIL_SUFFIX,
};
