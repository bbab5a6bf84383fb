//! Container metadata.
//!
//! [`BifMetadata`] summarizes a parsed container: its header fields, the
//! timing mode chosen for it, and the total playback duration implied by the
//! frame delays. It is returned by
//! [`BifFile::metadata`](crate::BifFile::metadata).

use std::time::Duration;

use crate::error::BifWarning;
use crate::timing::TimingMode;

/// Summary of a BIF container.
///
/// # Example
///
/// ```no_run
/// use bif2gif::{BifError, BifFile};
///
/// let bif = BifFile::open("thumbnails.bif")?;
/// let metadata = bif.metadata()?;
/// println!(
///     "{} frames over {:?} ({})",
///     metadata.frame_count, metadata.duration, metadata.timing_mode,
/// );
/// # Ok::<(), BifError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BifMetadata {
    /// Header version.
    pub version: u32,
    /// Number of frames in the index.
    pub frame_count: u32,
    /// Raw header field at byte 16.
    pub timestamp_multiplier: i32,
    /// Timing interpretation chosen for the file.
    pub timing_mode: TimingMode,
    /// Sum of every frame's display delay.
    pub duration: Duration,
    /// Size of the container in bytes.
    pub file_size: u64,
    /// Whether a sentinel entry follows the frame entries.
    pub has_terminal_entry: bool,
    /// Non-fatal header findings.
    pub warnings: Vec<BifWarning>,
}
