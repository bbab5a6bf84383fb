//! Frame timing.
//!
//! BIF files encode display timing in one of two ways:
//!
//! - **Fixed interval**: the header field at byte 16 is the delay between
//!   every pair of frames, in milliseconds.
//! - **Variable timestamp**: each index entry carries a timestamp in units of
//!   the header multiplier, and the delay of frame *i* is
//!   `(timestamp(i + 1) - timestamp(i)) * multiplier`.
//!
//! [`TimingMode`] is decided once per file, either explicitly through
//! [`TimingSelection`] or by [`TimingMode::detect`], and is then handed to a
//! [`TimingResolver`] that computes every frame's delay.
//!
//! # Example
//!
//! ```no_run
//! use bif2gif::{BifError, BifHeader, IndexTable, TimingMode, TimingResolver, FALLBACK_DELAY_MS};
//!
//! let buffer = std::fs::read("thumbnails.bif")?;
//! let header = BifHeader::read(&buffer)?;
//! let table = IndexTable::new(&buffer, &header)?;
//! let resolver = TimingResolver::new(TimingMode::detect(&header, &table), FALLBACK_DELAY_MS);
//! for index in 0..table.len() {
//!     println!("frame {index}: {} ms", resolver.resolve_delay(&table, index));
//! }
//! # Ok::<(), BifError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::header::BifHeader;
use crate::index::{IndexTable, SENTINEL_TIMESTAMP};

/// Delay given to the last frame in variable-timestamp mode, which has no
/// next timestamp to subtract from.
pub const FALLBACK_DELAY_MS: u32 = 10;

/// Smallest delay ever emitted. Non-positive computed delays are raised to
/// this value.
pub const MIN_DELAY_MS: u32 = 10;

/// Milliseconds per timestamp unit when the header multiplier is zero.
pub const DEFAULT_TIMESTAMP_MULTIPLIER: i32 = 1000;

/// How the caller wants the timing mode chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingSelection {
    /// Inspect the index and pick a mode (see [`TimingMode::detect`]).
    ///
    /// Fixed-interval files that store the frame index (0, 1, 2, ...) in the
    /// first index field look like increasing timestamps and are read as
    /// variable-timestamp, which gives their last frame the fallback delay
    /// instead of the interval. Use [`TimingSelection::FixedInterval`]
    /// (`--timing fixed` on the command line) for those files.
    #[default]
    Auto,
    /// Force [`TimingMode::FixedInterval`].
    FixedInterval,
    /// Force [`TimingMode::VariableTimestamp`].
    VariableTimestamp,
}

/// The timing interpretation of a file, decided once per parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    /// Every frame is shown for this many milliseconds.
    FixedInterval(i32),
    /// Per-entry timestamps, scaled by this many milliseconds per unit.
    VariableTimestamp(i32),
}

impl TimingMode {
    /// Resolve a [`TimingSelection`] against a header and its index.
    pub fn select(selection: TimingSelection, header: &BifHeader, table: &IndexTable<'_>) -> Self {
        match selection {
            TimingSelection::Auto => Self::detect(header, table),
            TimingSelection::FixedInterval => {
                TimingMode::FixedInterval(header.timestamp_multiplier)
            }
            TimingSelection::VariableTimestamp => {
                TimingMode::VariableTimestamp(effective_multiplier(header.timestamp_multiplier))
            }
        }
    }

    /// Pick a mode from what the index actually contains.
    ///
    /// Per-entry timestamps count as populated when they strictly increase
    /// across the frame entries (sentinels ignored). Files with fewer than two
    /// frames carry no delta to inspect and are read as variable-timestamp,
    /// which gives a lone frame the fallback delay.
    pub fn detect(header: &BifHeader, table: &IndexTable<'_>) -> Self {
        let mode = if table.len() < 2 || timestamps_populated(table) {
            TimingMode::VariableTimestamp(effective_multiplier(header.timestamp_multiplier))
        } else {
            TimingMode::FixedInterval(header.timestamp_multiplier)
        };
        log::debug!("Detected timing mode: {mode}");
        mode
    }
}

impl Display for TimingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TimingMode::FixedInterval(interval) => write!(f, "fixed interval ({interval} ms)"),
            TimingMode::VariableTimestamp(multiplier) => {
                write!(f, "variable timestamp ({multiplier} ms/unit)")
            }
        }
    }
}

/// Computes per-frame display delays for one parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingResolver {
    mode: TimingMode,
    fallback_delay_ms: u32,
}

impl TimingResolver {
    /// Create a resolver. `fallback_delay_ms` is clamped to at least 1.
    pub fn new(mode: TimingMode, fallback_delay_ms: u32) -> Self {
        Self {
            mode,
            fallback_delay_ms: fallback_delay_ms.max(1),
        }
    }

    /// The mode this resolver was built with.
    pub fn mode(&self) -> TimingMode {
        self.mode
    }

    /// Delay used when no next timestamp exists.
    pub fn fallback_delay_ms(&self) -> u32 {
        self.fallback_delay_ms
    }

    /// Display delay of frame `index`, in milliseconds. Always positive.
    ///
    /// In variable-timestamp mode the last frame, and any frame whose own or
    /// next timestamp is the sentinel, gets the fallback delay. The sentinel
    /// never takes part in the arithmetic.
    pub fn resolve_delay(&self, table: &IndexTable<'_>, index: u32) -> u32 {
        match self.mode {
            TimingMode::FixedInterval(interval) => clamp_delay(i64::from(interval), index),
            TimingMode::VariableTimestamp(multiplier) => {
                let current = table.entry(index);
                let next = index.checked_add(1).and_then(|next| table.entry(next));
                match (current, next) {
                    (Some(current), Some(next)) => {
                        match delay_between(current.timestamp, next.timestamp, multiplier) {
                            Some(raw) => clamp_delay(raw, index),
                            None => self.fallback_delay_ms,
                        }
                    }
                    _ => self.fallback_delay_ms,
                }
            }
        }
    }

    /// Presentation position of frame `index` from the start of playback.
    ///
    /// Returns `None` when the entry is missing or its timestamp is the
    /// sentinel.
    pub fn position(&self, table: &IndexTable<'_>, index: u32) -> Option<Duration> {
        let entry = table.entry(index)?;
        let millis = match self.mode {
            TimingMode::FixedInterval(interval) => {
                i64::from(interval.max(0)) * i64::from(index)
            }
            TimingMode::VariableTimestamp(multiplier) => {
                if entry.is_sentinel() {
                    return None;
                }
                i64::from(entry.timestamp) * i64::from(multiplier)
            }
        };
        Some(Duration::from_millis(millis.max(0) as u64))
    }
}

/// Raw delay between two timestamps in milliseconds, or `None` if either is
/// the sentinel. The result may be zero or negative.
pub fn delay_between(current: u32, next: u32, multiplier: i32) -> Option<i64> {
    if current == SENTINEL_TIMESTAMP || next == SENTINEL_TIMESTAMP {
        return None;
    }
    Some((i64::from(next) - i64::from(current)) * i64::from(multiplier))
}

fn effective_multiplier(multiplier: i32) -> i32 {
    if multiplier == 0 {
        DEFAULT_TIMESTAMP_MULTIPLIER
    } else {
        multiplier
    }
}

fn timestamps_populated(table: &IndexTable<'_>) -> bool {
    let mut previous: Option<u32> = None;
    for entry in table.entries().filter(|entry| !entry.is_sentinel()) {
        if previous.is_some_and(|previous| entry.timestamp <= previous) {
            return false;
        }
        previous = Some(entry.timestamp);
    }
    true
}

fn clamp_delay(raw: i64, index: u32) -> u32 {
    if raw <= 0 {
        log::warn!(
            "Frame {index}: computed delay {raw} ms is not positive, using {MIN_DELAY_MS} ms"
        );
        return MIN_DELAY_MS;
    }
    u32::try_from(raw).unwrap_or(u32::MAX)
}
