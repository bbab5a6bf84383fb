//! Index table walking.
//!
//! The index table follows the 64-byte header. It holds one 8-byte
//! [`IndexEntry`] per frame, each pairing a timestamp (or frame index) with
//! the byte offset of that frame's image payload. The payload of frame *i*
//! spans from its own offset to the offset of frame *i + 1*. Where the last
//! frame ends is governed by [`LastFrameEnd`].
//!
//! [`IndexTable`] checks that the table fits in the buffer up front and
//! validates every payload range as it is derived, so a corrupt file surfaces
//! as [`BifError::MalformedIndex`] instead of a truncated or overrunning
//! slice.
//!
//! # Example
//!
//! ```no_run
//! use bif2gif::{BifError, BifHeader, IndexTable, LastFrameEnd};
//!
//! let buffer = std::fs::read("thumbnails.bif")?;
//! let header = BifHeader::read(&buffer)?;
//! let table = IndexTable::new(&buffer, &header)?;
//! for range in table.payload_ranges(LastFrameEnd::EndOfBuffer)? {
//!     println!("{}..{}", range.start, range.end);
//! }
//! # Ok::<(), BifError>(())
//! ```

use std::ops::Range;

use crate::error::BifError;
use crate::header::{BifHeader, HEADER_SIZE, read_u32_le};

/// Size of one index entry in bytes.
pub const INDEX_ENTRY_SIZE: usize = 8;

/// Timestamp value marking "no further frame" on a terminal index entry.
pub const SENTINEL_TIMESTAMP: u32 = u32::MAX;

/// One record of the index table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Raw timestamp in multiplier units, or the frame index in the
    /// fixed-interval variant.
    pub timestamp: u32,
    /// Absolute byte offset of the frame's image payload.
    pub byte_offset: u32,
}

impl IndexEntry {
    /// Returns `true` if the timestamp is the 0xFFFFFFFF sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.timestamp == SENTINEL_TIMESTAMP
    }
}

/// Where the payload of the last frame ends.
///
/// Files in the wild disagree. Roku's own tooling writes one extra index
/// entry after the last frame, carrying the sentinel timestamp and the
/// offset just past the last image. Other writers omit it and let the last
/// image run to the end of the file.
///
/// Neither convention trims a byte off the end of a payload: an exclusive
/// end of `next_offset - 1` would cut the final byte of every JPEG's
/// end-of-image marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastFrameEnd {
    /// The last payload runs to the end of the buffer. This is the default.
    #[default]
    EndOfBuffer,
    /// The last payload ends at the offset stored in the sentinel entry that
    /// follows the `frame_count` entries.
    TerminalEntry,
}

/// A bounds-checked view of the index table of a buffer.
#[derive(Debug, Clone, Copy)]
pub struct IndexTable<'a> {
    buffer: &'a [u8],
    frame_count: u32,
}

impl<'a> IndexTable<'a> {
    /// Create a view over the index table described by `header`.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::MalformedIndex`] if `frame_count` entries starting
    /// at byte 64 do not fit in `buffer`.
    pub fn new(buffer: &'a [u8], header: &BifHeader) -> Result<Self, BifError> {
        let index_end = header.index_end();
        if index_end > buffer.len() as u64 {
            return Err(BifError::MalformedIndex(format!(
                "index table of {} entries ends at byte {index_end} but the file is {} bytes",
                header.frame_count,
                buffer.len(),
            )));
        }

        Ok(Self {
            buffer,
            frame_count: header.frame_count,
        })
    }

    /// Number of frame entries (excluding any terminal entry).
    pub fn len(&self) -> u32 {
        self.frame_count
    }

    /// Returns `true` if the table holds no frame entries.
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Length of the underlying buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// The entry for frame `index`, or `None` if `index >= len()`.
    pub fn entry(&self, index: u32) -> Option<IndexEntry> {
        if index >= self.frame_count {
            return None;
        }
        self.read_entry(index)
    }

    /// The sentinel entry stored right after the last frame entry, if the
    /// file has one.
    pub fn terminal_entry(&self) -> Option<IndexEntry> {
        self.read_entry(self.frame_count).filter(IndexEntry::is_sentinel)
    }

    /// Walk the `len()` frame entries in index order.
    pub fn entries(self) -> impl Iterator<Item = IndexEntry> + 'a {
        (0..self.frame_count).filter_map(move |index| self.read_entry(index))
    }

    /// Byte range of the image payload of frame `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BifError::MalformedIndex`] if `index` is out of range, the
    /// range starts inside the header or index table, is empty or reversed,
    /// runs past the end of the buffer, or (with
    /// [`LastFrameEnd::TerminalEntry`]) the file has no terminal entry.
    pub fn payload_range(
        &self,
        index: u32,
        convention: LastFrameEnd,
    ) -> Result<Range<usize>, BifError> {
        let entry = self.entry(index).ok_or_else(|| {
            BifError::MalformedIndex(format!(
                "frame {index} is outside the {}-entry index",
                self.frame_count,
            ))
        })?;

        let start = entry.byte_offset as usize;
        let end = if index + 1 < self.frame_count {
            self.read_entry(index + 1)
                .map(|next| next.byte_offset as usize)
                .ok_or_else(|| {
                    BifError::MalformedIndex(format!("index entry {} is unreadable", index + 1))
                })?
        } else {
            self.last_frame_end(convention)?
        };

        let floor = self.payload_floor(convention);
        if start < floor {
            return Err(BifError::MalformedIndex(format!(
                "frame {index} starts at byte {start}, inside the header/index region ending at byte {floor}",
            )));
        }
        if end <= start {
            return Err(BifError::MalformedIndex(format!(
                "frame {index} has an empty or reversed range {start}..{end}",
            )));
        }
        if end > self.buffer.len() {
            return Err(BifError::MalformedIndex(format!(
                "frame {index} range {start}..{end} runs past the end of the file ({} bytes)",
                self.buffer.len(),
            )));
        }

        Ok(start..end)
    }

    /// Byte ranges of every frame payload, in index order.
    ///
    /// The whole table is validated before anything is returned.
    pub fn payload_ranges(&self, convention: LastFrameEnd) -> Result<Vec<Range<usize>>, BifError> {
        (0..self.frame_count)
            .map(|index| self.payload_range(index, convention))
            .collect()
    }

    /// The image payload of frame `index` as a borrowed slice.
    pub fn payload(&self, index: u32, convention: LastFrameEnd) -> Result<&'a [u8], BifError> {
        let range = self.payload_range(index, convention)?;
        Ok(&self.buffer[range])
    }

    fn read_entry(&self, index: u32) -> Option<IndexEntry> {
        let offset = HEADER_SIZE.checked_add((index as usize).checked_mul(INDEX_ENTRY_SIZE)?)?;
        Some(IndexEntry {
            timestamp: read_u32_le(self.buffer, offset)?,
            byte_offset: read_u32_le(self.buffer, offset + 4)?,
        })
    }

    fn last_frame_end(&self, convention: LastFrameEnd) -> Result<usize, BifError> {
        match convention {
            LastFrameEnd::EndOfBuffer => Ok(self.buffer.len()),
            LastFrameEnd::TerminalEntry => self
                .terminal_entry()
                .map(|terminal| terminal.byte_offset as usize)
                .ok_or_else(|| {
                    BifError::MalformedIndex(format!(
                        "no terminal entry with sentinel timestamp after entry {}",
                        self.frame_count.saturating_sub(1),
                    ))
                }),
        }
    }

    /// First byte a payload may occupy.
    fn payload_floor(&self, convention: LastFrameEnd) -> usize {
        let entries = match convention {
            LastFrameEnd::EndOfBuffer => self.frame_count as usize,
            LastFrameEnd::TerminalEntry => self.frame_count as usize + 1,
        };
        HEADER_SIZE + INDEX_ENTRY_SIZE * entries
    }
}
