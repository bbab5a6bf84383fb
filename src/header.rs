//! BIF header parsing.
//!
//! Every BIF container starts with a fixed 64-byte preamble:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 8    | magic bytes |
//! | 8      | 4    | version (u32 LE) |
//! | 12     | 4    | frame count (u32 LE) |
//! | 16     | 4    | timestamp multiplier / image interval (i32 LE) |
//! | 20     | 44   | reserved |
//!
//! [`BifHeader::read`] extracts these fields. Version and magic mismatches are
//! reported as [`BifWarning`]s rather than errors.
//!
//! # Example
//!
//! ```no_run
//! use bif2gif::{BifError, BifHeader};
//!
//! let buffer = std::fs::read("thumbnails.bif")?;
//! let header = BifHeader::read(&buffer)?;
//! println!("{} frames, multiplier {}", header.frame_count, header.timestamp_multiplier);
//! # Ok::<(), BifError>(())
//! ```

use crate::error::{BifError, BifWarning};
use crate::index::INDEX_ENTRY_SIZE;

/// Roku BIF signature: `\x89BIF\r\n\x1a\n`.
pub const MAGIC: [u8; 8] = [0x89, 0x42, 0x49, 0x46, 0x0d, 0x0a, 0x1a, 0x0a];

/// Size of the fixed header in bytes. The index table starts here.
pub const HEADER_SIZE: usize = 64;

/// The BIF version this crate was written against.
pub const SUPPORTED_VERSION: u32 = 0;

const VERSION_OFFSET: usize = 8;
const FRAME_COUNT_OFFSET: usize = 12;
const MULTIPLIER_OFFSET: usize = 16;

/// The fixed header of a BIF container.
///
/// Read once per buffer and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct BifHeader {
    /// The first eight bytes of the file.
    pub magic: [u8; 8],
    /// Format version.
    pub version: u32,
    /// Number of frames (index entries) in the container.
    pub frame_count: u32,
    /// Milliseconds per timestamp unit, or the fixed interval between frames
    /// in milliseconds, depending on the file variant.
    pub timestamp_multiplier: i32,
}

impl BifHeader {
    /// Parse the header from the start of `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::TruncatedFile`] if `buffer` is shorter than
    /// [`HEADER_SIZE`].
    pub fn read(buffer: &[u8]) -> Result<Self, BifError> {
        if buffer.len() < HEADER_SIZE {
            return Err(BifError::TruncatedFile {
                length: buffer.len(),
            });
        }

        let mut magic = [0_u8; 8];
        magic.copy_from_slice(&buffer[..8]);

        let field = |offset: usize| {
            let mut bytes = [0_u8; 4];
            bytes.copy_from_slice(&buffer[offset..offset + 4]);
            bytes
        };
        let header = Self {
            magic,
            version: u32::from_le_bytes(field(VERSION_OFFSET)),
            frame_count: u32::from_le_bytes(field(FRAME_COUNT_OFFSET)),
            timestamp_multiplier: i32::from_le_bytes(field(MULTIPLIER_OFFSET)),
        };

        log::debug!(
            "Read BIF header (version={}, frames={}, multiplier={})",
            header.version,
            header.frame_count,
            header.timestamp_multiplier,
        );

        Ok(header)
    }

    /// Returns `true` if the magic bytes match the Roku BIF signature.
    pub fn has_valid_magic(&self) -> bool {
        self.magic == MAGIC
    }

    /// Returns `true` if the version is [`SUPPORTED_VERSION`].
    pub fn is_supported_version(&self) -> bool {
        self.version == SUPPORTED_VERSION
    }

    /// Non-fatal findings about this header.
    pub fn warnings(&self) -> Vec<BifWarning> {
        let mut warnings = Vec::new();
        if !self.has_valid_magic() {
            warnings.push(BifWarning::UnrecognizedMagic { found: self.magic });
        }
        if !self.is_supported_version() {
            warnings.push(BifWarning::UnsupportedVersion {
                found: self.version,
                supported: SUPPORTED_VERSION,
            });
        }
        warnings
    }

    /// Byte offset one past the last of the `frame_count` index entries.
    ///
    /// Computed in `u64` so a hostile frame count cannot overflow on 32-bit
    /// targets.
    pub fn index_end(&self) -> u64 {
        HEADER_SIZE as u64 + INDEX_ENTRY_SIZE as u64 * u64::from(self.frame_count)
    }
}

/// Read a little-endian `u32` at `offset`, or `None` if it would run past the
/// end of `buffer`.
pub(crate) fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let bytes: [u8; 4] = buffer.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}
