//! Lazy, single-pass frame emission.
//!
//! [`FrameIterator`] walks the index table in order and yields one [`Frame`]
//! per entry: a borrowed view of the raw image payload plus its display
//! delay. Nothing is decoded here.
//!
//! The iterator moves through `Idle → Emitting(0..frame_count) → Done`. It
//! never skips or revisits an index, and once it has returned `None` or an
//! error it stays finished. Re-emitting the frames requires a fresh call to
//! [`BifFile::frames`](crate::BifFile::frames).
//!
//! # Example
//!
//! ```no_run
//! use bif2gif::{BifError, BifFile};
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! for frame in bif.frames()? {
//!     let frame = frame?;
//!     println!("#{}: {} bytes, {} ms", frame.index, frame.data.len(), frame.delay_ms);
//! }
//! # Ok::<(), BifError>(())
//! ```

use std::borrow::Cow;
use std::io::Cursor;
use std::iter::FusedIterator;
use std::ops::Range;
use std::time::Duration;

use image::{ImageError, ImageReader};

use crate::configuration::ExtractOptions;
use crate::error::BifError;
use crate::index::{IndexTable, LastFrameEnd};
use crate::timing::TimingResolver;

/// One frame of a BIF container.
///
/// `data` borrows from the source buffer. Call
/// [`into_owned`](Frame::into_owned) to keep a frame past the buffer's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Position of the frame in the index table.
    pub index: u32,
    /// Byte range of the payload within the source buffer.
    pub range: Range<usize>,
    /// Raw encoded image payload (typically JPEG).
    pub data: Cow<'a, [u8]>,
    /// Display delay in milliseconds. Always positive.
    pub delay_ms: u32,
    /// Presentation position, if the entry carries a usable timestamp.
    pub timestamp: Option<Duration>,
}

impl<'a> Frame<'a> {
    /// Build frame `index` from a validated table.
    pub(crate) fn from_table(
        buffer: &'a [u8],
        table: &IndexTable<'a>,
        resolver: &TimingResolver,
        convention: LastFrameEnd,
        index: u32,
    ) -> Result<Self, BifError> {
        let range = table.payload_range(index, convention)?;
        let delay_ms = resolver.resolve_delay(table, index);
        let timestamp = resolver.position(table, index);

        log::trace!(
            "Frame #{index}: bytes {}..{} ({} bytes), delay {delay_ms} ms",
            range.start,
            range.end,
            range.len(),
        );

        Ok(Self {
            index,
            data: Cow::Borrowed(&buffer[range.clone()]),
            range,
            delay_ms,
            timestamp,
        })
    }

    /// Copy the payload so the frame no longer borrows the source buffer.
    pub fn into_owned(self) -> Frame<'static> {
        Frame {
            index: self.index,
            range: self.range,
            data: Cow::Owned(self.data.into_owned()),
            delay_ms: self.delay_ms,
            timestamp: self.timestamp,
        }
    }

    /// Display delay in hundredths of a second, as GIF stores it.
    ///
    /// Rounded to the nearest unit and never below 1.
    pub fn delay_centiseconds(&self) -> u16 {
        let centiseconds = (u64::from(self.delay_ms) + 5) / 10;
        centiseconds.clamp(1, u64::from(u16::MAX)) as u16
    }

    /// Width and height of the encoded image, read from its headers without
    /// decoding the pixels.
    pub fn dimensions(&self) -> Result<(u32, u32), BifError> {
        probe_dimensions(&self.data).map_err(|error| BifError::FrameDecodeFailure {
            frame_index: self.index,
            reason: error.to_string(),
        })
    }

    /// File extension matching the payload's image format, `bin` if unknown.
    pub fn extension(&self) -> &'static str {
        image::guess_format(&self.data)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("bin")
    }
}

/// Width and height of an encoded image.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EmitterState {
    Idle,
    Emitting(u32),
    Done,
}

/// A lazy iterator over the frames of a parsed buffer.
///
/// Yields `Err` at most once, after which it is finished. Frames yielded
/// before an error remain valid.
pub struct FrameIterator<'a> {
    table: IndexTable<'a>,
    buffer: &'a [u8],
    resolver: TimingResolver,
    last_frame_end: LastFrameEnd,
    options: ExtractOptions,
    state: EmitterState,
}

impl<'a> FrameIterator<'a> {
    pub(crate) fn new(
        buffer: &'a [u8],
        table: IndexTable<'a>,
        resolver: TimingResolver,
        options: ExtractOptions,
    ) -> Self {
        Self {
            table,
            buffer,
            resolver,
            last_frame_end: options.last_frame_end,
            options,
            state: EmitterState::Idle,
        }
    }

    /// The timing resolver used for this pass.
    pub fn resolver(&self) -> &TimingResolver {
        &self.resolver
    }

    /// Total number of frames this iterator will yield if nothing fails.
    pub fn frame_count(&self) -> u32 {
        self.table.len()
    }

    fn emit(&self, index: u32) -> Result<Frame<'a>, BifError> {
        if self.options.is_cancelled() {
            return Err(BifError::Cancelled);
        }
        Frame::from_table(self.buffer, &self.table, &self.resolver, self.last_frame_end, index)
    }
}

impl<'a> Iterator for FrameIterator<'a> {
    type Item = Result<Frame<'a>, BifError>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = match self.state {
            EmitterState::Done => return None,
            EmitterState::Idle if self.table.is_empty() => {
                self.state = EmitterState::Done;
                return None;
            }
            EmitterState::Idle => 0,
            EmitterState::Emitting(index) => index,
        };

        match self.emit(index) {
            Ok(frame) => {
                self.state = if index + 1 < self.table.len() {
                    EmitterState::Emitting(index + 1)
                } else {
                    EmitterState::Done
                };
                Some(Ok(frame))
            }
            Err(error) => {
                self.state = EmitterState::Done;
                Some(Err(error))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.state {
            EmitterState::Idle => self.table.len() as usize,
            EmitterState::Emitting(index) => (self.table.len() - index) as usize,
            EmitterState::Done => 0,
        };
        (0, Some(remaining))
    }
}

impl FusedIterator for FrameIterator<'_> {}
