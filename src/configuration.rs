//! Parse and export configuration.
//!
//! [`ExtractOptions`] is a builder that threads timing selection, the
//! last-frame convention, progress callbacks, and cancellation tokens through
//! frame extraction and GIF export without polluting every function
//! signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bif2gif::{CancellationToken, ExtractOptions, LastFrameEnd, TimingSelection};
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new()
//!     .with_timing(TimingSelection::VariableTimestamp)
//!     .with_last_frame_end(LastFrameEnd::TerminalEntry)
//!     .with_fallback_delay(100)
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::index::LastFrameEnd;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::timing::{FALLBACK_DELAY_MS, TimingSelection};

/// Configuration for frame extraction and export.
///
/// All fields have sensible defaults: automatic timing detection, the last
/// frame running to the end of the buffer, a 10 ms fallback delay, lenient
/// version checking, no progress callback, and no cancellation.
#[derive(Clone)]
pub struct ExtractOptions {
    /// How the timing mode is chosen.
    pub(crate) timing: TimingSelection,
    /// Where the last frame's payload ends.
    pub(crate) last_frame_end: LastFrameEnd,
    /// Delay of a frame with no next timestamp, in milliseconds.
    pub(crate) fallback_delay_ms: u32,
    /// Reject files whose version is not the supported one.
    pub(crate) strict_version: bool,
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N frames).
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("timing", &self.timing)
            .field("last_frame_end", &self.last_frame_end)
            .field("fallback_delay_ms", &self.fallback_delay_ms)
            .field("strict_version", &self.strict_version)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self {
            timing: TimingSelection::Auto,
            last_frame_end: LastFrameEnd::EndOfBuffer,
            fallback_delay_ms: FALLBACK_DELAY_MS,
            strict_version: false,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Choose how the timing mode is decided.
    #[must_use]
    pub fn with_timing(mut self, timing: TimingSelection) -> Self {
        self.timing = timing;
        self
    }

    /// Choose where the last frame's payload ends.
    #[must_use]
    pub fn with_last_frame_end(mut self, convention: LastFrameEnd) -> Self {
        self.last_frame_end = convention;
        self
    }

    /// Set the delay given to a frame with no next timestamp.
    ///
    /// Clamped to a minimum of 1 ms.
    #[must_use]
    pub fn with_fallback_delay(mut self, delay_ms: u32) -> Self {
        self.fallback_delay_ms = delay_ms.max(1);
        self
    }

    /// Fail with [`BifError::UnsupportedVersion`](crate::BifError::UnsupportedVersion)
    /// instead of warning when the header version is not the supported one.
    #[must_use]
    pub fn with_strict_version(mut self, strict: bool) -> Self {
        self.strict_version = strict;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the frame loop stops before the next frame
    /// and returns [`BifError::Cancelled`](crate::BifError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set how often the progress callback fires.
    ///
    /// A value of 1 means every frame; 10 means every 10th frame.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// The configured timing selection.
    pub fn timing(&self) -> TimingSelection {
        self.timing
    }

    /// The configured last-frame convention.
    pub fn last_frame_end(&self) -> LastFrameEnd {
        self.last_frame_end
    }

    /// The configured fallback delay in milliseconds.
    pub fn fallback_delay_ms(&self) -> u32 {
        self.fallback_delay_ms
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
