//! Per-frame progress reporting and cooperative cancellation.
//!
//! Frame extraction and GIF export walk the index one frame at a time. After
//! every `batch_size` frames they hand a [`ProgressInfo`] to the configured
//! [`ProgressCallback`], describing the last frame handled (its index, byte
//! range, and delay) and how far through the container the walk is. A final
//! report is always sent when the walk completes.
//!
//! [`CancellationToken`] is checked by the frame iterator before each frame.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bif2gif::{BifError, BifFile, ExtractOptions, GifOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(frame) = &info.last_frame {
//!             println!(
//!                 "{}/{} frame #{} ({} bytes, {} ms)",
//!                 info.frames_done,
//!                 info.frame_count,
//!                 frame.index,
//!                 frame.range.len(),
//!                 frame.delay_ms,
//!             );
//!         }
//!     }
//! }
//!
//! let bif = BifFile::open("thumbnails.bif")?;
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! bif.export_gif_with_options("animated.gif", &GifOptions::default(), &options)?;
//! # Ok::<(), BifError>(())
//! ```

use std::ops::Range;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::configuration::ExtractOptions;
use crate::frames::Frame;

/// Which walk over the frames is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Raw payloads being written out by
    /// [`BifFile::save_frames`](crate::BifFile::save_frames).
    FrameExtraction,
    /// Frames being decoded and appended to an animated GIF.
    GifExport,
}

/// The frame a progress report was triggered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Position of the frame in the index table.
    pub index: u32,
    /// Byte range of the payload within the container.
    pub range: Range<usize>,
    /// Display delay given to the frame, in milliseconds.
    pub delay_ms: u32,
}

impl From<&Frame<'_>> for FrameReport {
    fn from(frame: &Frame<'_>) -> Self {
        Self {
            index: frame.index,
            range: frame.range.clone(),
            delay_ms: frame.delay_ms,
        }
    }
}

/// A snapshot of a frame walk.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which walk is reporting.
    pub operation: OperationType,
    /// Frames handled so far.
    pub frames_done: u32,
    /// Frames in the container.
    pub frame_count: u32,
    /// Payload bytes handled so far.
    pub bytes_done: u64,
    /// Sum of the delays of the frames handled so far.
    pub playback_done: Duration,
    /// Wall-clock time since the walk started.
    pub elapsed: Duration,
    /// The most recent frame. `None` on the final report.
    pub last_frame: Option<FrameReport>,
}

impl ProgressInfo {
    /// Share of frames handled, in `0.0..=1.0`. An empty container counts as
    /// complete.
    pub fn fraction(&self) -> f32 {
        if self.frame_count == 0 {
            return 1.0;
        }
        self.frames_done as f32 / self.frame_count as f32
    }

    /// Time left at the current per-frame rate, once at least one frame is
    /// done.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        if self.frames_done == 0 {
            return None;
        }
        let left = self.frame_count.saturating_sub(self.frames_done);
        Some(self.elapsed / self.frames_done * left)
    }

    /// `true` once every frame has been handled.
    pub fn is_complete(&self) -> bool {
        self.frames_done >= self.frame_count
    }
}

/// Receives [`ProgressInfo`] reports during a frame walk.
///
/// Callbacks are `Send + Sync` so they can be shared across rayon workers.
/// They observe the walk but cannot stop it; use [`CancellationToken`] for
/// that.
pub trait ProgressCallback: Send + Sync {
    /// Called every batch of frames and once when the walk completes.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Default callback that ignores every report.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// A shared flag that stops a frame walk before its next frame.
///
/// Clones observe the same flag.
///
/// ```
/// use bif2gif::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop every walk holding a clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](CancellationToken::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Accumulates per-frame totals and fires the callback every batch.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    batch_size: u64,
    started: Instant,
    frames_done: u32,
    frame_count: u32,
    bytes_done: u64,
    playback_ms: u64,
    unreported: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        options: &ExtractOptions,
        operation: OperationType,
        frame_count: u32,
    ) -> Self {
        Self {
            callback: options.progress.clone(),
            operation,
            batch_size: options.batch_size.max(1),
            started: Instant::now(),
            frames_done: 0,
            frame_count,
            bytes_done: 0,
            playback_ms: 0,
            unreported: 0,
        }
    }

    /// Count `frame` as handled, reporting it if a batch is full.
    pub(crate) fn record(&mut self, frame: &Frame<'_>) {
        self.frames_done += 1;
        self.bytes_done += frame.range.len() as u64;
        self.playback_ms += u64::from(frame.delay_ms);
        self.unreported += 1;

        if self.unreported >= self.batch_size {
            self.unreported = 0;
            self.emit(Some(FrameReport::from(frame)));
        }
    }

    /// Send the closing report.
    pub(crate) fn finish(&mut self) {
        self.emit(None);
    }

    fn emit(&self, last_frame: Option<FrameReport>) {
        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            frames_done: self.frames_done,
            frame_count: self.frame_count,
            bytes_done: self.bytes_done,
            playback_done: Duration::from_millis(self.playback_ms),
            elapsed: self.started.elapsed(),
            last_frame,
        });
    }
}
