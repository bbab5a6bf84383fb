//! Error types for the `bif2gif` crate.
//!
//! This module defines [`BifError`], the unified error type returned by all
//! fallible operations in the crate, and [`BifWarning`], the non-fatal
//! findings collected while reading a container header. Errors carry enough
//! context (file paths, frame indices, byte offsets) to diagnose a corrupt
//! file without additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `bif2gif` operations.
///
/// Every public method that can fail returns `Result<T, BifError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BifError {
    /// The input path does not exist.
    #[error("BIF file not found: {path}")]
    FileNotFound {
        /// Path that was passed to [`crate::BifFile::open`].
        path: PathBuf,
    },

    /// The buffer is shorter than the fixed 64-byte header.
    #[error("Truncated BIF file: {length} bytes is shorter than the 64-byte header")]
    TruncatedFile {
        /// Length of the buffer that was handed to the parser.
        length: usize,
    },

    /// The index table runs past the end of the buffer, or the payload
    /// ranges it describes are out of order, overlapping, or out of bounds.
    #[error("Malformed BIF index: {0}")]
    MalformedIndex(String),

    /// The header version is not the supported one and strict version
    /// checking was requested.
    #[error("Unsupported BIF version {found} (supported version is {supported})")]
    UnsupportedVersion {
        /// Version stored in the header.
        found: u32,
        /// Version this crate was written against.
        supported: u32,
    },

    /// A frame payload could not be decoded as an image.
    #[error("Failed to decode frame {frame_index}: {reason}")]
    FrameDecodeFailure {
        /// Index of the frame in the container.
        frame_index: u32,
        /// Underlying reason reported by the image decoder.
        reason: String,
    },

    /// GIF encoding failed.
    #[cfg(feature = "gif")]
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate outside of per-frame decoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

/// A non-fatal problem found in a container header.
///
/// Warnings never stop parsing. They are logged through `log::warn!` when a
/// file is opened and kept on [`BifFile`](crate::BifFile) for callers that
/// want to surface them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BifWarning {
    /// The header version differs from the supported version.
    #[error("BIF version {found} differs from supported version {supported}; parsing continues")]
    UnsupportedVersion {
        /// Version stored in the header.
        found: u32,
        /// Version this crate was written against.
        supported: u32,
    },

    /// The first eight bytes are not the Roku BIF signature.
    #[error("Unrecognized magic bytes {found:02x?}; parsing continues")]
    UnrecognizedMagic {
        /// The eight bytes found at the start of the file.
        found: [u8; 8],
    },
}
